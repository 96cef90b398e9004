//! Request and response types for the hosted data and identity APIs.
//!
//! Rows coming back from the data API are kept as opaque [`Record`]s since
//! their shape varies per table. Identity responses are typed.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of domain data (player, user, competition, registration).
///
/// Field order follows the order returned by the remote API.
pub type Record = Map<String, Value>;

/// Where the rows for a table come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A plain table read with `select=*`.
    Table(&'static str),
    /// A stored procedure returning joined or aggregated rows.
    Rpc(&'static str),
}

/// The remote tables shown on the dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Players,
    Competitions,
    Registrations,
    Users,
}

impl Table {
    /// Every table, in tab order.
    pub const ALL: [Table; 4] = [
        Table::Players,
        Table::Competitions,
        Table::Registrations,
        Table::Users,
    ];

    /// The remote table name used for writes.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Players => "players",
            Table::Competitions => "competitions",
            Table::Registrations => "registrations",
            Table::Users => "profiles",
        }
    }

    /// Where reads for this table go.
    ///
    /// Registrations are read through a procedure that joins in the player
    /// and competition names.
    pub fn source(&self) -> Source {
        match self {
            Table::Registrations => Source::Rpc("registrations_with_players"),
            other => Source::Table(other.name()),
        }
    }

    /// Tab title.
    pub fn title(&self) -> &'static str {
        match self {
            Table::Players => "Players",
            Table::Competitions => "Competitions",
            Table::Registrations => "Registrations",
            Table::Users => "Users",
        }
    }

    /// Columns displayed by default, in order.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Players => &["first_name", "last_name", "birth_date", "club", "phone"],
            Table::Competitions => &["name", "location", "start_date", "end_date", "category"],
            Table::Registrations => &[
                "player_name",
                "competition_name",
                "status",
                "created_at",
            ],
            Table::Users => &["email", "full_name", "role", "created_at"],
        }
    }

    /// The primary key column.
    pub fn id_column(&self) -> &'static str {
        "id"
    }

    /// Whether only administrators may open this table.
    pub fn requires_admin(&self) -> bool {
        matches!(self, Table::Users)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// The authorization role of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// Parse a role string from user metadata.
    ///
    /// Anything other than `admin` (case-insensitive) is a regular user.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// The role string stored in user metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Check whether this role grants at least `required`.
    pub fn satisfies(&self, required: Role) -> bool {
        match required {
            Role::User => true,
            Role::Admin => *self == Role::Admin,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user as returned by the identity API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    /// The user ID.
    pub id: String,
    /// The user's email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form metadata, including the `role` field.
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl AuthUser {
    /// The user's role, read from `user_metadata.role`.
    pub fn role(&self) -> Role {
        self.user_metadata
            .get("role")
            .and_then(Value::as_str)
            .map(Role::parse)
            .unwrap_or_default()
    }

    /// A display name for the header bar.
    pub fn display_name(&self) -> &str {
        self.user_metadata
            .get("full_name")
            .and_then(Value::as_str)
            .or(self.email.as_deref())
            .unwrap_or(self.id.as_str())
    }
}

/// Token grant response from the identity API.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Absolute expiry as a Unix timestamp.
    #[serde(default)]
    pub expires_at: Option<u64>,
    pub user: AuthUser,
}

/// Body of a password sign-in request.
#[derive(Debug, Serialize)]
pub struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of a refresh-token request.
#[derive(Debug, Serialize)]
pub struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

/// Body of a user metadata update.
#[derive(Debug, Serialize)]
pub struct UserUpdate<'a> {
    pub data: &'a Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse(" ADMIN "), Role::Admin);
        assert_eq!(Role::parse("user"), Role::User);
        assert_eq!(Role::parse("coach"), Role::User);
        assert_eq!(Role::parse(""), Role::User);
    }

    #[test]
    fn test_role_satisfies() {
        assert!(Role::Admin.satisfies(Role::Admin));
        assert!(Role::Admin.satisfies(Role::User));
        assert!(Role::User.satisfies(Role::User));
        assert!(!Role::User.satisfies(Role::Admin));
    }

    #[test]
    fn test_auth_user_role_from_metadata() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": "u1",
            "email": "ana@example.com",
            "user_metadata": { "role": "admin", "full_name": "Ana Admin" }
        }))
        .unwrap();
        assert_eq!(user.role(), Role::Admin);
        assert_eq!(user.display_name(), "Ana Admin");
    }

    #[test]
    fn test_auth_user_missing_metadata() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": "u2",
            "email": "bo@example.com"
        }))
        .unwrap();
        assert_eq!(user.role(), Role::User);
        assert_eq!(user.display_name(), "bo@example.com");
    }

    #[test]
    fn test_table_sources() {
        assert_eq!(Table::Players.source(), Source::Table("players"));
        assert_eq!(Table::Users.source(), Source::Table("profiles"));
        assert_eq!(
            Table::Registrations.source(),
            Source::Rpc("registrations_with_players")
        );
    }

    #[test]
    fn test_only_users_table_requires_admin() {
        let admin_only: Vec<Table> = Table::ALL
            .iter()
            .copied()
            .filter(Table::requires_admin)
            .collect();
        assert_eq!(admin_only, vec![Table::Users]);
    }

    #[test]
    fn test_token_response_deserialize() {
        let response: TokenResponse = serde_json::from_value(json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": { "id": "u1" }
        }))
        .unwrap();
        assert_eq!(response.expires_in, Some(3600));
        assert!(response.expires_at.is_none());
        assert_eq!(response.user.id, "u1");
    }
}
