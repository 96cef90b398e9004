//! Centralized error types for fedportal.
//!
//! This module provides a unified error hierarchy for the application with
//! user-friendly error messages. All error types use `thiserror` for
//! ergonomic error handling.

use thiserror::Error;

use crate::api::error::ApiError;
use crate::config::ConfigError;
use crate::content::ContentError;
use crate::form::ValidationError;

/// The main application error type.
///
/// Every failure surfaces to the user as one flat message; the variant only
/// decides the status class and whether the user must sign in again.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Backend API errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Content file errors.
    #[error("{0}")]
    Content(#[from] ContentError),

    /// Client-side form validation failed.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// IO errors (file system, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read configuration file. Please check the file is readable."
                        .to_string()
                }
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Please check the file format.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
                ConfigError::BackendNotFound(name) => format!("Backend '{}' not found.", name),
            },
            AppError::Api(e) => match e {
                ApiError::Unauthorized => "Please sign in to continue.".to_string(),
                ApiError::InvalidCredentials(msg) if msg.trim().is_empty() => {
                    "Invalid email or password.".to_string()
                }
                ApiError::InvalidCredentials(msg) => msg.clone(),
                ApiError::Forbidden => "You don't have permission to do that.".to_string(),
                ApiError::Validation(msg) => msg.clone(),
                ApiError::NotFound(what) => format!("'{}' was not found.", what),
                ApiError::ServerError(msg) => format!("Server error: {}", msg),
                ApiError::Network(_) => {
                    "Failed to load. Please check your internet connection.".to_string()
                }
                ApiError::Keyring(_) => "Could not access secure storage.".to_string(),
                ApiError::InvalidResponse(_) => {
                    "Unexpected response from the server. Please try again.".to_string()
                }
            },
            AppError::Content(e) => e.to_string(),
            AppError::Validation(e) => e.message.clone(),
            AppError::Io(_) => "A file operation failed. Please check file permissions.".to_string(),
        }
    }

    /// The HTTP-style status class: 400 validation, 401/403 auth, 500 otherwise.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Api(e) => e.status_code(),
            AppError::Validation(_) => 400,
            _ => 500,
        }
    }

    /// Whether the user should be sent back to the sign-in screen.
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, AppError::Api(ApiError::Unauthorized))
    }

    /// Critical errors block in a dialog instead of a toast.
    pub fn is_critical(&self) -> bool {
        matches!(self, AppError::Config(_) | AppError::Content(_))
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
