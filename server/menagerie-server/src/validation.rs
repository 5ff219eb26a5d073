//! Request validation utilities shared by the resource handlers
//!
//! Payload types implement [`RequestValidation`]; the `validate_*` macros keep
//! the rejection messages uniform. Bodies are read through [`ApiJson`] so that
//! unparsable JSON becomes an [`ApiError`] with the usual plain-text rendering.

use crate::error::ApiError;
use axum::extract::FromRequest;

/// Trait for validating request payloads
///
/// `validate` checks a body used as a full representation (POST and PUT),
/// `validate_partial` checks a body used as a PATCH.
///
/// # Example
///
/// ```rust,ignore
/// impl RequestValidation for ZooPayload {
///     fn validate(&self) -> Result<(), ApiError> {
///         let name = self.name.as_deref().unwrap_or_default();
///         validate_required!(name, "name is required");
///         self.validate_partial()
///     }
/// }
/// ```
pub trait RequestValidation {
    /// Validates a complete representation
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` naming the first offending field.
    fn validate(&self) -> Result<(), ApiError>;

    /// Validates only the fields that are present
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` naming the first offending field.
    fn validate_partial(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Macro for validating fields with custom predicates
///
/// # Usage
///
/// ```rust,ignore
/// validate_field!(self.population, self.population >= 0, "population cannot be negative");
/// ```
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Macro for validating required fields (non-blank strings)
///
/// # Usage
///
/// ```rust,ignore
/// validate_required!(species, "species is required");
/// ```
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.trim().is_empty(), $message);
    };
}

/// Trimmed copy of an optional string, with blank values treated as absent
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// JSON body extractor whose rejection renders as an [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;

    struct TestRequest {
        name: String,
        population: i64,
    }

    impl RequestValidation for TestRequest {
        fn validate(&self) -> Result<(), ApiError> {
            validate_required!(self.name, "name is required");
            validate_field!(self.population, self.population >= 0, "population cannot be negative");
            Ok(())
        }
    }

    #[test]
    fn test_validation_success() {
        let request = TestRequest {
            name: "Lion".to_string(),
            population: 3,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validation_blank_name() {
        let request = TestRequest {
            name: "   ".to_string(),
            population: 3,
        };
        let error = request.validate().unwrap_err();
        assert_eq!(error.to_string(), "Validation error: name is required");
    }

    #[test]
    fn test_validation_negative_population() {
        let request = TestRequest {
            name: "Lion".to_string(),
            population: -1,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn non_blank_trims_and_drops_empty_values() {
        assert_eq!(non_blank(Some("  Carnivore ")), Some("Carnivore".to_string()));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
