//! Client-side form validation.
//!
//! Forms are checked before anything is sent; a failing form never reaches
//! the network. Each rule records a field name (the wire key) and the message
//! shown next to that field.

use crate::types::Email;

/// A form that can be checked before submission.
pub trait Validate {
    /// Check every rule of the form.
    ///
    /// # Errors
    ///
    /// Returns all failing fields at once, in declaration order.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// One failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// A form that failed validation.
///
/// Displays every failing field's message, joined with `; `.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_messages(.errors))]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    /// A single-field failure.
    #[must_use]
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field,
                message: message.into(),
            }],
        }
    }

    /// The failing fields.
    pub fn fields(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Message for one field, if it failed.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collects rule failures while a form is checked.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    fn push(&mut self, field: &'static str, message: &str) {
        self.errors.push(FieldError {
            field,
            message: message.to_owned(),
        });
    }

    /// Require at least `min` characters, ignoring surrounding whitespace.
    pub fn min_len(&mut self, field: &'static str, value: &str, min: usize, message: &str) {
        if value.trim().chars().count() < min {
            self.push(field, message);
        }
    }

    /// Require a non-blank value.
    pub fn required(&mut self, field: &'static str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.push(field, message);
        }
    }

    /// Require a present value.
    pub fn present<T>(&mut self, field: &'static str, value: Option<&T>, message: &str) {
        if value.is_none() {
            self.push(field, message);
        }
    }

    /// Require a well-formed email address.
    pub fn email(&mut self, field: &'static str, value: &str) {
        if let Err(err) = Email::parse(value) {
            self.push(field, &err.to_string());
        }
    }

    /// Finish the form.
    ///
    /// # Errors
    ///
    /// Returns the collected failures if any rule failed.
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_accumulate_in_order() {
        let mut errors = FieldErrors::default();
        errors.required("name", "  ", "Name is required");
        errors.email("email", "reader");
        errors.min_len("password", "secret", 8, "Password must be at least 8 characters");
        let err = errors.finish().unwrap_err();

        assert_eq!(err.fields().count(), 3);
        assert_eq!(err.message_for("name"), Some("Name is required"));
        assert_eq!(
            err.to_string(),
            "Name is required; email must contain a single @ symbol; Password must be at least 8 characters"
        );
    }

    #[test]
    fn test_is_a_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(ValidationError::field("items", "Your cart is empty"));
        assert_eq!(err.to_string(), "Your cart is empty");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_min_len_counts_characters() {
        let mut errors = FieldErrors::default();
        errors.min_len("city", "Āgra", 4, "City is required");
        assert!(errors.finish().is_ok());
    }

    #[test]
    fn test_present() {
        let mut errors = FieldErrors::default();
        errors.present::<String>("productId", None, "Please select a product");
        assert_eq!(
            errors.finish().unwrap_err().message_for("productId"),
            Some("Please select a product")
        );
    }
}
