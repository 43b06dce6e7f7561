//! API client errors.

use book_kart_core::validation::ValidationError;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the Book Kart API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The session is missing or expired (401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The user may not perform this action (403).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    /// A 2xx response whose envelope reported `success: false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A form failed client-side validation and was not sent.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Map a non-success response to an error.
    ///
    /// The backend puts a human-readable `message` in error bodies; when it
    /// is missing the status reason is used instead.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Text shown to the user in a notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Rejected(message)
            | Self::Status { message, .. } => message.clone(),
            Self::Validation(err) => err.to_string(),
            Self::RateLimited(_) => "Too many requests, please try again later".to_string(),
            Self::Http(err) if err.is_timeout() => "The server took too long to respond".to_string(),
            Self::Http(_) => "Could not reach the server, please try again".to_string(),
            Self::Parse(_) => "Unexpected response from the server".to_string(),
            Self::InvalidUrl(_) => "Invalid request".to_string(),
        }
    }

    /// Whether the session is gone.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_is_kept() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"success": false, "message": "Product is out of stock"}"#,
        );
        assert!(matches!(err, ApiError::Status { status: 400, .. }));
        assert_eq!(err.user_message(), "Product is out of stock");
        assert_eq!(err.to_string(), "API error (400): Product is out of stock");
    }

    #[test]
    fn test_status_reason_fallback() {
        let err = ApiError::from_response(StatusCode::UNAUTHORIZED, "<html>nope</html>");
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Unauthorized");

        let err = ApiError::from_response(StatusCode::NOT_FOUND, r#"{"message": ""}"#);
        assert_eq!(err.user_message(), "Not Found");
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::RateLimited(30);
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");

        let err = ApiError::Rejected("Email already registered".to_string());
        assert_eq!(err.to_string(), "Request rejected: Email already registered");
        assert_eq!(err.user_message(), "Email already registered");

        let err = ApiError::from(ValidationError::field("pincode", "Pincode must be 6 digits"));
        assert_eq!(err.to_string(), "Invalid input: Pincode must be 6 digits");
    }
}
