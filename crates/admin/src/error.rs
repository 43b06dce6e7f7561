//! Admin console errors.

use book_kart_core::validation::ValidationError;
use book_kart_storefront::ApiError;
use thiserror::Error;

/// Errors from admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The signed-in account is not an admin.
    #[error("Forbidden: admin access required")]
    NotAdmin,

    /// A form failed validation and was not sent.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A filter value could not be parsed.
    #[error("Invalid filter {field}: {message}")]
    InvalidFilter {
        field: &'static str,
        message: String,
    },
}

impl AdminError {
    /// Text shown to the user in a notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::NotAdmin => "This account does not have admin access".to_string(),
            Self::Validation(err) => err.to_string(),
            Self::InvalidFilter { .. } => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AdminError::NotAdmin.to_string(),
            "Forbidden: admin access required"
        );

        let err = AdminError::from(ApiError::NotFound("Order not found".to_string()));
        assert_eq!(err.to_string(), "Not found: Order not found");
        assert_eq!(err.user_message(), "Order not found");

        let err = AdminError::InvalidFilter {
            field: "status",
            message: "unknown value 'lost'".to_string(),
        };
        assert_eq!(err.user_message(), "Invalid filter status: unknown value 'lost'");
    }
}
