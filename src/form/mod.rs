//! Data entry forms.
//!
//! A [`Form`] holds local field state for one schema (player registration,
//! competition, own profile). Validation runs entirely on the client and must
//! pass before anything is sent; a valid form converts into a [`Record`].

use serde_json::{Number, Value};
use thiserror::Error;

use crate::api::types::{AuthUser, Record, Role, Table};
use crate::api::{authorize, DataClient, IdentityClient, Session};
use crate::error::{AppError, Result as AppResult};

/// Minimum number of digits in a phone number.
pub const PHONE_MIN_DIGITS: usize = 7;

/// Maximum number of digits in a phone number.
pub const PHONE_MAX_DIGITS: usize = 15;

/// A field failed client-side validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Key of the offending field.
    pub field: String,
    /// Short message for the user.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// How a field's text is checked and converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    /// `YYYY-MM-DD`.
    Date,
    Number,
}

/// One form field with its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
}

impl FormField {
    fn new(key: &'static str, label: &'static str, kind: FieldKind, required: bool) -> Self {
        Self {
            key,
            label,
            kind,
            required,
            value: String::new(),
        }
    }

    /// Validate this field's value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let value = self.value.trim();
        if value.is_empty() {
            if self.required {
                return Err(ValidationError::new(
                    self.key,
                    format!("{} is required", self.label),
                ));
            }
            return Ok(());
        }

        let ok = match self.kind {
            FieldKind::Text => true,
            FieldKind::Email => is_valid_email(value),
            FieldKind::Phone => is_valid_phone(value),
            FieldKind::Date => is_valid_date(value),
            FieldKind::Number => value.parse::<f64>().map(f64::is_finite).unwrap_or(false),
        };

        if ok {
            Ok(())
        } else {
            Err(ValidationError::new(self.key, self.invalid_message()))
        }
    }

    fn invalid_message(&self) -> String {
        match self.kind {
            FieldKind::Text => format!("{} is invalid", self.label),
            FieldKind::Email => format!("{} must be a valid email address", self.label),
            FieldKind::Phone => format!(
                "{} must contain {} to {} digits",
                self.label, PHONE_MIN_DIGITS, PHONE_MAX_DIGITS
            ),
            FieldKind::Date => format!("{} must be a date (YYYY-MM-DD)", self.label),
            FieldKind::Number => format!("{} must be a number", self.label),
        }
    }

    /// The value as JSON. Blank values become null.
    fn json_value(&self) -> Value {
        let value = self.value.trim();
        if value.is_empty() {
            return Value::Null;
        }
        match self.kind {
            FieldKind::Number => value
                .parse::<i64>()
                .map(Value::from)
                .ok()
                .or_else(|| {
                    value
                        .parse::<f64>()
                        .ok()
                        .and_then(Number::from_f64)
                        .map(Value::Number)
                })
                .unwrap_or(Value::Null),
            FieldKind::Email => Value::String(value.to_lowercase()),
            _ => Value::String(value.to_string()),
        }
    }
}

/// Count the digits in a phone number.
pub fn phone_digit_count(value: &str) -> usize {
    value.chars().filter(char::is_ascii_digit).count()
}

/// Check a phone number: 7 to 15 digits, with `+ - ( )` and spaces allowed
/// as separators.
pub fn is_valid_phone(value: &str) -> bool {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '));
    let digits = phone_digit_count(value);
    allowed && (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
}

/// Basic email shape check: `local@domain.tld`.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
            .unwrap_or(false)
}

/// Check a `YYYY-MM-DD` date, including the day-of-month bound.
pub fn is_valid_date(value: &str) -> bool {
    let parts: Vec<&str> = value.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return false;
    };
    if year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return false;
    }
    // `parse` alone would take a sign.
    if !parts.iter().all(|part| part.bytes().all(|b| b.is_ascii_digit())) {
        return false;
    }
    let (Ok(year), Ok(month), Ok(day)) =
        (year.parse::<u32>(), month.parse::<u32>(), day.parse::<u32>())
    else {
        return false;
    };

    let days_in_month = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => return false,
    };
    (1..=days_in_month).contains(&day)
}

/// Where a submitted form goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Inserted as a new row.
    Table(Table),
    /// Merged into the signed-in user's metadata.
    UserMetadata,
}

/// The available form schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    /// Register a player for a competition.
    Registration,
    /// Create a competition.
    Competition,
    /// Edit the signed-in user's own profile.
    Profile,
}

impl FormKind {
    /// Form title.
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::Registration => "Register Player",
            FormKind::Competition => "New Competition",
            FormKind::Profile => "My Profile",
        }
    }

    /// Where the form submits to.
    pub fn target(&self) -> Target {
        match self {
            FormKind::Registration => Target::Table(Table::Registrations),
            FormKind::Competition => Target::Table(Table::Competitions),
            FormKind::Profile => Target::UserMetadata,
        }
    }

    /// Role needed to submit.
    pub fn required_role(&self) -> Role {
        match self {
            FormKind::Competition => Role::Admin,
            _ => Role::User,
        }
    }

    /// Confirmation shown after a successful submit.
    pub fn success_message(&self) -> &'static str {
        match self {
            FormKind::Registration => "Registration submitted",
            FormKind::Competition => "Competition created",
            FormKind::Profile => "Profile updated",
        }
    }

    fn fields(&self) -> Vec<FormField> {
        match self {
            FormKind::Registration => vec![
                FormField::new("first_name", "First name", FieldKind::Text, true),
                FormField::new("last_name", "Last name", FieldKind::Text, true),
                FormField::new("birth_date", "Birth date", FieldKind::Date, true),
                FormField::new("club", "Club", FieldKind::Text, false),
                FormField::new("phone", "Phone", FieldKind::Phone, true),
                FormField::new("email", "Email", FieldKind::Email, false),
                FormField::new("competition_id", "Competition ID", FieldKind::Number, true),
            ],
            FormKind::Competition => vec![
                FormField::new("name", "Name", FieldKind::Text, true),
                FormField::new("location", "Location", FieldKind::Text, true),
                FormField::new("start_date", "Start date", FieldKind::Date, true),
                FormField::new("end_date", "End date", FieldKind::Date, true),
                FormField::new("category", "Category", FieldKind::Text, false),
            ],
            FormKind::Profile => vec![
                FormField::new("full_name", "Full name", FieldKind::Text, true),
                FormField::new("phone", "Phone", FieldKind::Phone, false),
            ],
        }
    }
}

/// Local state of one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    kind: FormKind,
    fields: Vec<FormField>,
}

impl Form {
    /// Create an empty form of the given kind.
    pub fn new(kind: FormKind) -> Self {
        Self {
            kind,
            fields: kind.fields(),
        }
    }

    /// The form kind.
    pub fn kind(&self) -> FormKind {
        self.kind
    }

    /// All fields in display order.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Look up a field by key.
    pub fn field(&self, key: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Current value of a field.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.field(key).map(|f| f.value.as_str())
    }

    /// Set a field's value. Returns false if the key is unknown.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|f| f.key == key) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Set a field's value by position.
    pub fn set_at(&mut self, index: usize, value: impl Into<String>) {
        if let Some(field) = self.fields.get_mut(index) {
            field.value = value.into();
        }
    }

    /// Clear every field.
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
    }

    /// Copy string values from `values` into the fields with matching keys.
    pub fn fill(&mut self, values: &Record) {
        for (key, value) in values {
            if let Some(text) = value.as_str() {
                self.set(key, text);
            }
        }
    }

    /// Validate every field and the cross-field rules.
    ///
    /// Returns the first error in field order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for field in &self.fields {
            field.validate()?;
        }

        if self.kind == FormKind::Competition {
            if let (Some(start), Some(end)) = (self.value("start_date"), self.value("end_date")) {
                if end.trim() < start.trim() {
                    return Err(ValidationError::new(
                        "end_date",
                        "End date must not be before start date",
                    ));
                }
            }
        }

        Ok(())
    }

    /// Validate and convert the form into a record.
    pub fn to_record(&self) -> Result<Record, ValidationError> {
        self.validate()?;
        Ok(self
            .fields
            .iter()
            .map(|f| (f.key.to_string(), f.json_value()))
            .collect())
    }
}

/// Result of a submit, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Confirmation text.
    Success(String),
    /// Inline error text.
    Error(String),
}

impl FormOutcome {
    /// Whether the submit succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, FormOutcome::Success(_))
    }

    /// The message to show.
    pub fn message(&self) -> &str {
        match self {
            FormOutcome::Success(msg) | FormOutcome::Error(msg) => msg,
        }
    }

    /// Turn a submit result into what the user sees.
    pub fn from_result(kind: FormKind, result: &AppResult<Submitted>) -> Self {
        match result {
            Ok(_) => FormOutcome::Success(kind.success_message().to_string()),
            Err(e) => FormOutcome::Error(e.user_message()),
        }
    }
}

/// What a successful submit produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    /// The row as stored by the backend.
    Row(Record),
    /// The user after the metadata update.
    User(AuthUser),
}

/// Validate and send a form.
///
/// Field validation and the role check are local; nothing is sent unless
/// both pass.
pub async fn submit(
    form: &Form,
    data: &DataClient,
    identity: &IdentityClient,
    session: Option<&Session>,
) -> AppResult<Submitted> {
    let record = form.to_record()?;
    let session = authorize(session, form.kind().required_role())?;

    match form.kind().target() {
        Target::Table(table) => {
            let mut client = data.clone();
            client.set_access_token(Some(session.access_token().to_string()));
            let row = client.insert(table.name(), &record).await?;
            Ok(Submitted::Row(row))
        }
        Target::UserMetadata => {
            let user = identity
                .update_user_metadata(session.access_token(), &record)
                .await
                .map_err(AppError::from)?;
            Ok(Submitted::User(user))
        }
    }
}
