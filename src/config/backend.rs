//! Backend connection configuration.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

/// A hosted backend project.
///
/// Holds the project URL and the public anon key. Session tokens are never
/// written to the config file; the refresh token lives in the OS keychain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Backend {
    /// The name of this backend.
    ///
    /// Must be non-empty and unique across all backends.
    pub name: String,

    /// The project URL (e.g., "https://abcd.supabase.co").
    pub url: String,

    /// The public API key sent as `apikey` on every request.
    pub anon_key: String,

    /// Email to prefill on the sign-in screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Backend {
    /// Create a new backend entry.
    pub fn new(name: String, url: String, anon_key: String) -> Self {
        Self {
            name,
            url,
            anon_key,
            email: None,
        }
    }

    /// Validate this backend.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "backend name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "backend name '{}' cannot contain whitespace",
                self.name
            )));
        }

        if self.url.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "backend '{}': URL cannot be empty",
                self.name
            )));
        }

        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "backend '{}': URL must start with http:// or https://",
                self.name
            )));
        }

        if self.anon_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "backend '{}': anon_key cannot be empty",
                self.name
            )));
        }

        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(ConfigError::ValidationError(format!(
                    "backend '{}': '{}' does not appear to be a valid email address",
                    self.name, email
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(name: &str, url: &str, key: &str) -> Backend {
        Backend::new(name.to_string(), url.to_string(), key.to_string())
    }

    #[test]
    fn test_valid_backend() {
        let b = backend("prod", "https://fed.supabase.co", "anon");
        assert!(b.validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = backend("", "https://fed.supabase.co", "anon").validate();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("name cannot be empty"));
    }

    #[test]
    fn test_whitespace_name_rejected() {
        let result = backend("my prod", "https://fed.supabase.co", "anon").validate();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot contain whitespace"));
    }

    #[test]
    fn test_invalid_url_scheme_rejected() {
        let result = backend("prod", "fed.supabase.co", "anon").validate();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("must start with http"));
    }

    #[test]
    fn test_http_url_accepted() {
        let b = backend("local", "http://localhost:54321", "anon");
        assert!(b.validate().is_ok());
    }

    #[test]
    fn test_empty_anon_key_rejected() {
        let result = backend("prod", "https://fed.supabase.co", " ").validate();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("anon_key cannot be empty"));
    }

    #[test]
    fn test_invalid_email_rejected() {
        let mut b = backend("prod", "https://fed.supabase.co", "anon");
        b.email = Some("not-an-email".to_string());
        assert!(b.validate().unwrap_err().to_string().contains("valid email"));
    }

    #[test]
    fn test_backend_serialization() {
        let mut b = backend("prod", "https://fed.supabase.co", "anon");
        b.email = Some("admin@fed.org".to_string());

        let toml_str = toml::to_string(&b).unwrap();
        let parsed: Backend = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed, b);
    }

    #[test]
    fn test_email_omitted_when_none() {
        let b = backend("prod", "https://fed.supabase.co", "anon");
        let toml_str = toml::to_string(&b).unwrap();
        assert!(!toml_str.contains("email"));
    }
}
