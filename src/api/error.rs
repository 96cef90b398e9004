//! API error types for the data and identity clients.

use thiserror::Error;

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, invalid or expired session token.
    #[error("Authentication required: please sign in again")]
    Unauthorized,

    /// The identity service rejected the email and password.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Signed in, but the role does not allow this.
    #[error("Permission denied: you don't have access to this resource")]
    Forbidden,

    /// Request rejected because of invalid input.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The backend reported a failure.
    #[error("Server error: {0}")]
    ServerError(String),

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Keyring error when storing/retrieving tokens.
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// Response body could not be understood.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error from an HTTP status code.
    ///
    /// `context` is the message passed through from the response body, or
    /// the request URL when the body carried none.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        match status.as_u16() {
            400 | 409 | 422 => ApiError::Validation(context.to_string()),
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound(context.to_string()),
            500..=599 => ApiError::ServerError(format!("HTTP {}: {}", status, context)),
            _ => ApiError::ServerError(format!("Unexpected HTTP {}: {}", status, context)),
        }
    }

    /// The HTTP-style status class of this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Unauthorized | ApiError::InvalidCredentials(_) => 401,
            ApiError::Forbidden => 403,
            ApiError::Validation(_) => 400,
            ApiError::NotFound(_) => 404,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_from_status_401() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "test");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_error_from_status_403() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, "test");
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[test]
    fn test_error_from_status_400_keeps_message() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "phone is too short");
        match err {
            ApiError::Validation(msg) => assert_eq!(msg, "phone is too short"),
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_error_from_status_409_is_validation() {
        let err = ApiError::from_status(StatusCode::CONFLICT, "duplicate key");
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_error_from_status_404() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "table players");
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "table players"),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_error_from_status_500_passes_message_through() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "relation missing");
        assert!(matches!(err, ApiError::ServerError(_)));
        assert!(err.to_string().contains("relation missing"));
    }

    #[test]
    fn test_status_code_classes() {
        assert_eq!(ApiError::Unauthorized.status_code(), 401);
        assert_eq!(ApiError::InvalidCredentials("x".into()).status_code(), 401);
        assert_eq!(ApiError::Forbidden.status_code(), 403);
        assert_eq!(ApiError::Validation("x".into()).status_code(), 400);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ApiError::ServerError("x".into()).status_code(), 500);
        assert_eq!(ApiError::Keyring("x".into()).status_code(), 500);
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Unauthorized;
        assert_eq!(
            err.to_string(),
            "Authentication required: please sign in again"
        );

        let err = ApiError::NotFound("players".to_string());
        assert_eq!(err.to_string(), "Resource not found: players");
    }
}
