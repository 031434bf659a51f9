//! Validation utilities.

use crate::{CeoError, FieldError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `CeoError` on failure.
    fn validate_request(&self) -> Result<(), CeoError> {
        self.validate().map_err(|e| validation_errors_to_ceo_error(&e))
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into field errors.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Converts `validator::ValidationErrors` to `CeoError`.
#[must_use]
pub fn validation_errors_to_ceo_error(errors: &ValidationErrors) -> CeoError {
    let message = field_errors(errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ");

    CeoError::Validation(message)
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates an E.164-style phone number such as `+14155550123`.
    pub fn phone_number(value: &str) -> Result<(), ValidationError> {
        let digits = value.strip_prefix('+').unwrap_or(value);
        if digits.len() < 8 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::new("phone_number"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;

    #[derive(Validate)]
    struct Signup {
        #[validate(email(message = "Invalid email"))]
        email: String,
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_phone_number() {
        assert!(phone_number("+14155550123").is_ok());
        assert!(phone_number("254712345678").is_ok());
        assert!(phone_number("+1-415").is_err());
        assert!(phone_number("12345").is_err());
    }

    #[test]
    fn test_validate_request_collects_fields() {
        let req = Signup {
            email: "nope".into(),
            name: String::new(),
        };
        let err = req.validate_request().unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        let msg = err.to_string();
        assert!(msg.contains("email: Invalid email"));
        assert!(msg.contains("name: Name is required"));
    }
}
