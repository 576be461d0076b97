//! Error types for delta application

/// Errors from strict delta application and flat-config parsing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeltaError {
    /// Deletion or update names a key absent from the configuration
    #[error("{operation} target not found: '{key}'")]
    TargetNotFound {
        /// `deletion` or `update`
        operation: &'static str,
        /// Flat key that was missing
        key: String,
    },

    /// Addition names a key the configuration already holds
    #[error("addition target already exists: '{0}'")]
    TargetAlreadyExists(String),

    /// Update's `from` value disagrees with the configuration
    #[error("update of '{key}' expected {expected}, found {actual}")]
    StaleUpdate {
        /// Flat key being updated
        key: String,
        /// The update's `from` value
        expected: serde_json::Value,
        /// Value currently held
        actual: serde_json::Value,
    },

    /// One key appears in more than one section of a delta
    #[error("key '{0}' appears in more than one delta section")]
    ConflictingKey(String),

    /// Flat configuration document is not a JSON object
    #[error("flat configuration must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Malformed JSON
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for DeltaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type for delta operations
pub type DeltaResult<T> = Result<T, DeltaError>;
