//! cfgmeta Schema
//!
//! Declarative metamodel for hierarchical configuration trees.
//!
//! # Overview
//!
//! - **ParameterSpec**: one named, typed field of a class (scalar or containment slot)
//! - **ClassSpec**: one entity type with parameters, documentation, root flag
//!   and per-parent cardinality bounds
//! - **SchemaRegistry**: the validated, immutable set of classes and the
//!   containment graph between them
//! - **ClassRecord**: the loader-facing record shape (JSON/YAML, or imported from an XML model)
//!
//! # Example
//!
//! ```rust
//! use cfgmeta_schema::{ClassSpec, ParameterSpec, ScalarKind, SchemaRegistry};
//!
//! let registry = SchemaRegistry::build(vec![
//!     ClassSpec::new("BTS")
//!         .root()
//!         .with_parameter(ParameterSpec::scalar("id", ScalarKind::Uint32))
//!         .with_parameter(ParameterSpec::slot("RU")),
//!     ClassSpec::new("RU").with_bounds(None, Some(42)),
//! ])
//! .unwrap();
//!
//! assert_eq!(registry.root_class().class_name, "BTS");
//! assert_eq!(registry.cardinality_of("RU").unwrap().max, Some(42));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod record;
pub mod registry;
pub mod spec;
pub mod xml;

// Re-exports
pub use error::{SchemaError, SchemaResult};
pub use record::{load_records_json, load_records_path, load_records_yaml, ClassRecord, ParameterRecord};
pub use registry::SchemaRegistry;
pub use spec::{Cardinality, ClassSpec, ParameterKind, ParameterSpec, ScalarKind};
pub use xml::load_records_xml;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for schema work
    pub use crate::{
        Cardinality, ClassRecord, ClassSpec, ParameterKind, ParameterSpec, ScalarKind,
        SchemaError, SchemaRegistry,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
