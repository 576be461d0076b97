//! Error types for schema construction
//!
//! Covers both registry build failures (structural problems in a set of
//! class specifications) and loader failures (records that cannot be read
//! or converted).

use std::path::PathBuf;

/// Errors raised while loading records or building a [`crate::SchemaRegistry`]
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Two classes share a name
    #[error("duplicate class name: '{0}'")]
    DuplicateClassName(String),

    /// No class is marked as root
    #[error("no root class declared")]
    NoRootClass,

    /// More than one class is marked as root
    #[error("multiple root classes: '{first}' and '{second}'")]
    MultipleRootClasses {
        /// Root found first in input order
        first: String,
        /// Next class claiming to be root
        second: String,
    },

    /// A containment slot names a class absent from the schema
    #[error("class '{class}': parameter '{parameter}' references unknown class '{target}'")]
    UnresolvedClassRef {
        /// Class declaring the slot
        class: String,
        /// Slot parameter name
        parameter: String,
        /// Missing target class
        target: String,
    },

    /// `max < min`
    #[error("class '{class}': max {max} is below min {min}")]
    InvalidCardinality {
        /// Offending class
        class: String,
        /// Declared lower bound
        min: u32,
        /// Declared upper bound
        max: u32,
    },

    /// Two parameters of one class share a name
    #[error("class '{class}': duplicate parameter '{parameter}'")]
    DuplicateParameter {
        /// Offending class
        class: String,
        /// Repeated parameter name
        parameter: String,
    },

    /// A `min`/`max` string is not a base-10 integer
    #[error("class '{class}': {field} bound '{value}' is not a base-10 integer")]
    InvalidBound {
        /// Class the bound belongs to
        class: String,
        /// `min` or `max`
        field: &'static str,
        /// Raw text as read
        value: String,
    },

    /// Parameter type outside uint32/string/boolean/class
    #[error("class '{class}': parameter '{parameter}' has unknown type '{type_name}'")]
    UnknownParameterType {
        /// Class declaring the parameter
        class: String,
        /// Parameter name
        parameter: String,
        /// Unrecognised type string
        type_name: String,
    },

    /// A class is aggregated into parents with different multiplicities
    #[error("class '{class}': multiplicity '{second}' conflicts with earlier '{first}'")]
    ConflictingMultiplicity {
        /// Child class
        class: String,
        /// Multiplicity seen first
        first: String,
        /// Disagreeing multiplicity
        second: String,
    },

    /// No loader for the file extension
    #[error("unsupported schema format: '{0}'")]
    UnsupportedFormat(String),

    /// Malformed JSON/YAML/XML input
    #[error("syntax error in schema records: {0}")]
    Parse(String),

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl SchemaError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error concerns the class set itself rather than reading it
    #[inline]
    #[must_use]
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            Self::UnsupportedFormat(_) | Self::Parse(_) | Self::Io { .. }
        )
    }
}

/// Result type alias for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
