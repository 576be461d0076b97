//! cfgmeta Instance
//!
//! Configuration instance trees validated against a
//! [`cfgmeta_schema::SchemaRegistry`].
//!
//! # Overview
//!
//! - **InstanceDraft**: a node under construction, never visible to queries
//! - **InstanceNode**: a committed node owning its children per slot
//! - **InstanceTree**: the rooted tree with add/remove/update operations that
//!   re-check only the locally affected invariants and are all-or-nothing
//! - **Validator**: stateless type, cardinality, uniqueness and completeness checks
//! - **SharedTree**: single-lock wrapper for use across threads
//!
//! # Example
//!
//! ```rust
//! use cfgmeta_instance::{values, InstanceTree, ScalarValue};
//! use cfgmeta_schema::{ClassSpec, ParameterSpec, ScalarKind, SchemaRegistry};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(
//!     SchemaRegistry::build(vec![
//!         ClassSpec::new("HWE").root().with_parameter(ParameterSpec::slot("RU")),
//!         ClassSpec::new("RU")
//!             .with_parameter(ParameterSpec::scalar("id", ScalarKind::Uint32))
//!             .with_bounds(None, Some(1)),
//!     ])
//!     .unwrap(),
//! );
//!
//! let mut tree = InstanceTree::create(registry, "HWE", Default::default()).unwrap();
//! let root = tree.root().id();
//! let ru = tree.add_child(root, "RU", "RU", values([("id", 7u32)])).unwrap();
//!
//! assert_eq!(tree.find_by_id(&ScalarValue::Uint32(7)), Some(ru));
//! assert!(tree.add_child(root, "RU", "RU", values([("id", 8u32)])).is_err());
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod draft;
pub mod error;
pub mod index;
pub mod node;
pub mod shared;
pub mod tree;
pub mod validator;
pub mod value;

// Re-exports
pub use config::EngineConfig;
pub use draft::{skeleton, InstanceDraft};
pub use error::{BuildError, InstanceError, InstanceResult, MutationError};
pub use index::IdentityIndex;
pub use node::{InstanceNode, NodeId};
pub use shared::SharedTree;
pub use tree::InstanceTree;
pub use validator::Validator;
pub use value::{values, ScalarValue, Values};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with instance trees
    pub use crate::{
        values, EngineConfig, InstanceDraft, InstanceError, InstanceNode, InstanceTree, NodeId,
        ScalarValue, SharedTree, Values,
    };
    pub use cfgmeta_schema::SchemaRegistry;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
