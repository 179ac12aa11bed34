use thiserror::Error;

/// Error type for schema registration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The entity declares no primary key, or names a column it does not declare.
    #[error("Entity '{entity}' has no registered primary key column '{column}'")]
    MissingPrimaryKey { entity: String, column: String },

    /// A table or column name that cannot be emitted into SQL text unquoted.
    #[error("'{0}' is not a valid SQL identifier")]
    InvalidIdentifier(String),

    #[error("Entity '{entity}' declares column '{column}' more than once")]
    DuplicateColumn { entity: String, column: String },

    #[error("Entity '{0}' is already registered")]
    DuplicateEntity(String),

    /// A lifecycle rule that refers to a column which is not an enumerated kind.
    #[error("Lifecycle rule error: {0}")]
    LifecycleRuleError(String),
}
