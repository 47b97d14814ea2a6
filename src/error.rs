//! Unified error handling for the inventory data layer.
//!
//! Every repository operation returns [`InventoryError`]. Validation failures
//! are raised before any storage call; storage faults wrap the engine error
//! untouched so the caller decides how to present it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    StorageFault,
}

impl ErrorCode {
    /// Get the string representation of the error code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "validation_error",
            ErrorCode::NotFound => "not_found",
            ErrorCode::StorageFault => "storage_fault",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level validation failures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: HashMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = HashMap::new();
        errors.insert(field.to_string(), vec![message.into()]);
        Self { errors }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages recorded for one field
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.len() == 1 {
            let message = self
                .errors
                .values()
                .next()
                .and_then(|v| v.first())
                .map(String::as_str)
                .unwrap_or("Validation failed");
            f.write_str(message)
        } else {
            write!(f, "Validation failed for {} fields", self.errors.len())
        }
    }
}

/// Error type shared by every repository
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// Missing or malformed input, rejected before reaching storage
    #[error("{0}")]
    Validation(ValidationErrors),

    /// A lookup that required a row found none
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Engine-level failure (open, transaction or statement error)
    #[error("storage fault: {0}")]
    Storage(#[from] sqlx::Error),
}

impl InventoryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            InventoryError::Validation(_) => ErrorCode::ValidationError,
            InventoryError::NotFound { .. } => ErrorCode::NotFound,
            InventoryError::Storage(_) => ErrorCode::StorageFault,
        }
    }

    /// Single field validation error
    pub fn validation_field(field: &str, message: impl Into<String>) -> Self {
        InventoryError::Validation(ValidationErrors::single(field, message))
    }

    pub fn not_found(entity: &'static str, key: impl fmt::Display) -> Self {
        InventoryError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self, entity: &str) -> bool {
        matches!(self, InventoryError::NotFound { entity: e, .. } if *e == entity)
    }
}

pub type Result<T, E = InventoryError> = std::result::Result<T, E>;

/// Builder for collecting multiple validation errors
#[derive(Debug, Default)]
pub struct ValidationErrorBuilder {
    errors: HashMap<String, Vec<String>>,
}

impl ValidationErrorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation error for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    /// Record the error of a `Result<_, String>` validator under `field`
    pub fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Return Ok(()) if no errors, or the collected validation error
    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(InventoryError::Validation(ValidationErrors {
                errors: self.errors,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorCode::ValidationError.as_str(), "validation_error");
        assert_eq!(ErrorCode::NotFound.as_str(), "not_found");
        assert_eq!(ErrorCode::StorageFault.as_str(), "storage_fault");
    }

    #[test]
    fn test_validation_error_single_field() {
        let err = InventoryError::validation_field("name", "Name is required");
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.to_string(), "Name is required");
    }

    #[test]
    fn test_not_found_display() {
        let err = InventoryError::not_found("user", "12345");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(err.is_not_found("user"));
        assert!(!err.is_not_found("asset"));
        assert_eq!(err.to_string(), "user not found: 12345");
    }

    #[test]
    fn test_storage_fault_from_sqlx() {
        let err: InventoryError = sqlx::Error::PoolClosed.into();
        assert_eq!(err.code(), ErrorCode::StorageFault);
    }

    #[test]
    fn test_validation_error_builder() {
        let mut builder = ValidationErrorBuilder::new();
        builder.add("name", "Name is required");
        builder.add("tax_id", "Tax ID must have exactly 14 digits");
        builder.add("name", "Name is too short");
        assert!(!builder.is_empty());

        match builder.finish() {
            Err(InventoryError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors.field("name").map(|m| m.len()), Some(2));
                assert!(errors.has_field("tax_id"));
                assert_eq!(errors.to_string(), "Validation failed for 2 fields");
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_check_passes_values_through() {
        let mut builder = ValidationErrorBuilder::new();
        let ok: Option<u8> = builder.check("a", Ok(7));
        let bad: Option<u8> = builder.check("b", Err("broken".to_string()));
        assert_eq!(ok, Some(7));
        assert_eq!(bad, None);
        assert!(builder.finish().is_err());
    }

    #[test]
    fn test_empty_builder_finishes_ok() {
        assert!(ValidationErrorBuilder::new().finish().is_ok());
    }
}
