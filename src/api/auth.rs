//! Authentication against the hosted identity API.
//!
//! Sign-in uses email and password and yields a [`Session`]. The access token
//! stays in memory; the refresh token is kept in the OS keyring so the next
//! launch can resume without asking for the password again.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use reqwest::{header, Client, Method, RequestBuilder};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use super::client::{build_http_client, handle_response, normalize_base_url};
use super::error::{ApiError, Result};
use super::types::{
    AuthUser, PasswordGrant, RefreshGrant, Role, TokenResponse, UserUpdate,
};
use crate::config::Backend;

/// The keyring service name for stored refresh tokens.
const KEYRING_SERVICE: &str = "fedportal";

/// Fallback access token lifetime when neither the response nor the token
/// carries an expiry.
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Seconds before the real expiry at which a session counts as expired.
const EXPIRY_LEEWAY_SECS: u64 = 30;

/// A signed-in session.
#[derive(Clone, PartialEq)]
pub struct Session {
    access_token: String,
    refresh_token: String,
    /// Access token expiry as a Unix timestamp.
    expires_at: u64,
    user: AuthUser,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user.id)
            .field("role", &self.user.role())
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build a session from a token grant response.
    pub fn from_token_response(response: TokenResponse) -> Self {
        let expires_at = response
            .expires_at
            .or_else(|| response.expires_in.map(|secs| unix_now() + secs))
            .or_else(|| jwt_expiry(&response.access_token))
            .unwrap_or_else(|| unix_now() + DEFAULT_TOKEN_LIFETIME_SECS);

        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at,
            user: response.user,
        }
    }

    /// The bearer token for data API calls.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The refresh token.
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// The signed-in user.
    pub fn user(&self) -> &AuthUser {
        &self.user
    }

    /// Replace the cached user, e.g. after a metadata update.
    pub fn set_user(&mut self, user: AuthUser) {
        self.user = user;
    }

    /// The signed-in user's role.
    pub fn role(&self) -> Role {
        self.user.role()
    }

    /// Access token expiry as a Unix timestamp.
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// Whether the access token has expired (or is about to).
    pub fn is_expired(&self) -> bool {
        unix_now() + EXPIRY_LEEWAY_SECS >= self.expires_at
    }

    /// Check that this session's role grants `required`.
    pub fn require_role(&self, required: Role) -> Result<()> {
        if self.role().satisfies(required) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

/// Check that a session exists, is live, and grants `required`.
///
/// A missing or expired session is `Unauthorized`; a live session with the
/// wrong role is `Forbidden`.
pub fn authorize(session: Option<&Session>, required: Role) -> Result<&Session> {
    let session = session.ok_or(ApiError::Unauthorized)?;
    if session.is_expired() {
        return Err(ApiError::Unauthorized);
    }
    session.require_role(required)?;
    Ok(session)
}

/// Read the `exp` claim from a JWT without verifying it.
fn jwt_expiry(token: &str) -> Option<u64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp").and_then(Value::as_u64)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

/// The identity API client.
#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl std::fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl IdentityClient {
    /// Create a client for a configured backend.
    pub fn new(backend: &Backend, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout_secs)?,
            base_url: normalize_base_url(&backend.url),
            anon_key: backend.anon_key.clone(),
        })
    }

    /// Sign in with email and password.
    ///
    /// Calls `POST /auth/v1/token?grant_type=password`.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "email and password are required".to_string(),
            ));
        }

        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let grant = PasswordGrant { email, password };
        let response: TokenResponse =
            handle_response(self.request(Method::POST, &url, None).json(&grant).send().await?)
                .await
                .map_err(reject_credentials)?;

        let session = Session::from_token_response(response);
        info!(user_id = %session.user().id, role = %session.role(), "Signed in");
        Ok(session)
    }

    /// Exchange a refresh token for a new session.
    ///
    /// Calls `POST /auth/v1/token?grant_type=refresh_token`.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.base_url);
        let grant = RefreshGrant { refresh_token };
        let response: TokenResponse =
            handle_response(self.request(Method::POST, &url, None).json(&grant).send().await?)
                .await
                .map_err(reject_as_unauthorized)?;

        debug!("Session refreshed");
        Ok(Session::from_token_response(response))
    }

    /// Resume a stored session: exchange the refresh token, then re-read the
    /// user so metadata changed since the last sign-in (such as the role)
    /// takes effect.
    #[instrument(skip_all)]
    pub async fn resume(&self, refresh_token: &str) -> Result<Session> {
        let mut session = self.refresh(refresh_token).await?;
        let user = self
            .get_user(session.access_token())
            .await
            .map_err(reject_as_unauthorized)?;
        session.set_user(user);
        info!(user_id = %session.user().id, role = %session.role(), "Session resumed");
        Ok(session)
    }

    /// Fetch the user behind an access token.
    ///
    /// Calls `GET /auth/v1/user`.
    #[instrument(skip_all)]
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser> {
        let url = format!("{}/auth/v1/user", self.base_url);
        handle_response(
            self.request(Method::GET, &url, Some(access_token))
                .send()
                .await?,
        )
        .await
    }

    /// Merge `metadata` into the user's metadata and return the updated user.
    ///
    /// Calls `PUT /auth/v1/user`.
    #[instrument(skip_all)]
    pub async fn update_user_metadata(
        &self,
        access_token: &str,
        metadata: &Map<String, Value>,
    ) -> Result<AuthUser> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let body = UserUpdate { data: metadata };
        handle_response(
            self.request(Method::PUT, &url, Some(access_token))
                .json(&body)
                .send()
                .await?,
        )
        .await
    }

    /// Revoke the session on the server.
    ///
    /// Calls `POST /auth/v1/logout`.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .request(Method::POST, &url, Some(access_token))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(super::client::error_from_response(status, &url, &body))
        }
    }

    fn request(&self, method: Method, url: &str, access_token: Option<&str>) -> RequestBuilder {
        let bearer = access_token.unwrap_or(self.anon_key.as_str());
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
            .header(header::ACCEPT, "application/json")
    }
}

/// The token endpoint answers bad credentials with 400. For a password
/// grant the server message is shown on the sign-in screen.
fn reject_credentials(error: ApiError) -> ApiError {
    match error {
        ApiError::Validation(msg) => {
            debug!("Password grant rejected: {}", msg);
            ApiError::InvalidCredentials(msg)
        }
        ApiError::Unauthorized => ApiError::InvalidCredentials(String::new()),
        other => other,
    }
}

/// A rejected refresh token means the stored session is gone.
fn reject_as_unauthorized(error: ApiError) -> ApiError {
    match error {
        ApiError::Validation(msg) => {
            debug!("Refresh grant rejected: {}", msg);
            ApiError::Unauthorized
        }
        other => other,
    }
}

/// Store a refresh token in the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be stored in the keyring.
pub fn store_refresh_token(backend_name: &str, token: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, backend_name)
        .map_err(|e| ApiError::Keyring(format!("failed to create keyring entry: {}", e)))?;

    entry
        .set_password(token)
        .map_err(|e| ApiError::Keyring(format!("failed to store token: {}", e)))
}

/// Retrieve a refresh token from the OS keyring.
pub fn get_refresh_token(backend_name: &str) -> Result<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, backend_name)
        .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))?;

    entry
        .get_password()
        .map_err(|e| ApiError::Keyring(format!("failed to retrieve token: {}", e)))
}

/// Delete a refresh token from the OS keyring.
pub fn delete_refresh_token(backend_name: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, backend_name)
        .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))?;

    entry
        .delete_password()
        .map_err(|e| ApiError::Keyring(format!("failed to delete token: {}", e)))
}
