use serde::{Deserialize, Serialize};
pub use thiserror::Error;
use tokio::time::error::Elapsed;

/// Every failure an entity operation can report.
///
/// The first six variants are validation failures, raised before the store is
/// touched. `NotFound` is the ordinary "no row with that key" answer.
/// `StoreError` wraps anything the data store itself rejected.
#[derive(Debug, Serialize, Deserialize, Error, Clone, PartialEq, Eq)]
pub enum HospitalError {
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),
    #[error("No fields to update")]
    NoFieldsProvided,
    #[error("Primary key '{0}' cannot be changed")]
    ImmutablePrimaryKey(String),
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    #[error("Invalid value for '{column}': {reason}")]
    InvalidFieldValue { column: String, reason: String },
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingRequiredFields(Vec<String>),
    #[error("{entity} with key {key} was not found")]
    NotFound { entity: String, key: String },
    #[error("Storage error: {0}")]
    StoreError(String),
}

impl HospitalError {
    pub fn invalid_value(column: impl Into<String>, reason: impl Into<String>) -> Self {
        HospitalError::InvalidFieldValue {
            column: column.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, key: impl ToString) -> Self {
        HospitalError::NotFound {
            entity: entity.into(),
            key: key.to_string(),
        }
    }
}

impl From<Elapsed> for HospitalError {
    fn from(_: Elapsed) -> Self {
        HospitalError::StoreError("operation timed out".into())
    }
}

/// A type alias for a `Result` that returns a `HospitalError` on failure.
pub type HospitalResult<T> = Result<T, HospitalError>;

#[cfg(test)]
mod tests {
    use super::HospitalError;

    #[test]
    fn not_found_renders_entity_and_key() {
        let err = HospitalError::not_found("patient", 7);
        assert_eq!(err.to_string(), "patient with key 7 was not found");
    }

    #[test]
    fn missing_fields_message_lists_names() {
        let err = HospitalError::MissingRequiredFields(vec!["first_name".into(), "gender".into()]);
        assert_eq!(err.to_string(), "Missing required fields: first_name, gender");
    }
}
