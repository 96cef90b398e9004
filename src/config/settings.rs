//! Application settings configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_TIMEOUT_SECS;
use crate::table::DEFAULT_PAGE_SIZE;

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// The name of the default backend to use.
    pub default_backend: Option<String>,
    /// Public base URL of the website, used for the sitemap and robots file.
    pub site_url: String,
    /// Directory holding the `news/` and `competitions/` content folders.
    pub content_dir: PathBuf,
    /// Rows per table page.
    pub page_size: usize,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
    /// The UI theme to use.
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_backend: None,
            site_url: "https://example.org".to_string(),
            content_dir: PathBuf::from("content"),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            theme: "dark".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.theme, "dark");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str("page_size = 10").unwrap();
        assert_eq!(settings.page_size, 10);
        assert_eq!(settings.content_dir, PathBuf::from("content"));
    }
}
