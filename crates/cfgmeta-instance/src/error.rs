//! Error types for instance construction and mutation
//!
//! Every variant carries enough structure (class, parameter, offending value,
//! violated bound) for a caller to render a diagnostic without further
//! lookups. A failed operation never changes the tree.

use crate::node::NodeId;
use crate::value::ScalarValue;
use cfgmeta_schema::{Cardinality, ScalarKind};

/// Instance build and mutation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstanceError {
    /// Value type differs from the declared scalar kind
    #[error("class '{class}': parameter '{parameter}' expects {expected}, got {value}")]
    TypeMismatch {
        /// Class declaring the parameter
        class: String,
        /// Parameter name
        parameter: String,
        /// Declared kind
        expected: ScalarKind,
        /// Offending value
        value: ScalarValue,
    },

    /// A declared scalar parameter has no value
    #[error("class '{class}': missing value for parameter '{parameter}'")]
    MissingParameter {
        /// Class declaring the parameter
        class: String,
        /// Parameter without a value
        parameter: String,
    },

    /// Tree root is not the registry's root class
    #[error("'{actual}' is not the root class '{expected}'")]
    NotRootClass {
        /// Registry root class
        expected: String,
        /// Class offered as root
        actual: String,
    },

    /// Slot is not a containment slot of the parent naming the child class
    #[error("class '{class}': slot '{slot}' cannot hold class '{child_class}'")]
    SlotMismatch {
        /// Parent class
        class: String,
        /// Slot named by the caller
        slot: String,
        /// Class of the offered child
        child_class: String,
    },

    /// Child count would leave the class's bounds
    #[error("class '{parent_class}': slot '{slot}' would hold {count} '{class}' children, bounds are {bounds}")]
    CardinalityViolation {
        /// Class holding the slot
        parent_class: String,
        /// Slot name
        slot: String,
        /// Child class whose bounds apply
        class: String,
        /// Child count the operation would leave
        count: usize,
        /// Declared bounds of the child class
        bounds: Cardinality,
    },

    /// A sibling in the same slot already carries this identity
    #[error("class '{class}': identity {id} already used in slot '{slot}'")]
    DuplicateIdentity {
        /// Parent class
        class: String,
        /// Slot holding the siblings
        slot: String,
        /// Repeated identity value
        id: ScalarValue,
    },

    /// Class has no scalar parameter of this name
    #[error("class '{class}': unknown parameter '{parameter}'")]
    UnknownParameter {
        /// Class searched
        class: String,
        /// Name not declared by the class
        parameter: String,
    },

    /// No committed node has this identity
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Class absent from the registry
    #[error("unknown class: '{0}'")]
    UnknownClass(String),

    /// Node would sit deeper than the configured maximum
    #[error("class '{class}': depth {depth} exceeds maximum {max_depth}")]
    DepthExceeded {
        /// Class of the node that would be too deep
        class: String,
        /// Depth it would sit at, root at 0
        depth: usize,
        /// Configured maximum
        max_depth: usize,
    },

    /// A mandatory slot recurses into a class already being generated
    #[error("class '{class}': mandatory slot '{slot}' recurses without end")]
    UnsatisfiableContainment {
        /// Class holding the mandatory slot
        class: String,
        /// Recursive slot
        slot: String,
    },

    /// A mandatory slot needs more siblings than its boolean identity can tell apart
    #[error("class '{class}': mandatory slot '{slot}' needs {required} children, boolean identities allow 2")]
    IdentityExhausted {
        /// Class holding the mandatory slot
        class: String,
        /// Slot whose target carries a boolean identity
        slot: String,
        /// Minimum child count of the target
        required: u32,
    },
}

impl InstanceError {
    /// Whether the error reports a disagreement between input and schema
    #[inline]
    #[must_use]
    pub fn is_schema_conformance(&self) -> bool {
        !matches!(self, Self::NodeNotFound(_) | Self::DepthExceeded { .. })
    }

    /// Whether the error is a failed lookup
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound(_) | Self::UnknownClass(_))
    }
}

/// Error returned while creating a tree
pub type BuildError = InstanceError;

/// Error returned by tree mutations
pub type MutationError = InstanceError;

/// Result type alias for instance operations
pub type InstanceResult<T> = Result<T, InstanceError>;
