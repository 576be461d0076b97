//! cfgmeta Delta
//!
//! Compare flat configurations and apply the resulting deltas.
//!
//! A flat configuration maps keys to JSON values; an instance tree renders
//! into one through `InstanceTree::flatten`, so two trees can be diffed and
//! patched without knowing the schema.
//!
//! # Example
//!
//! ```rust
//! use cfgmeta_delta::{ConfigDelta, FlatConfig};
//! use serde_json::json;
//!
//! let before: FlatConfig = [("BTS.name".to_string(), json!("old"))].into_iter().collect();
//! let after: FlatConfig = [("BTS.name".to_string(), json!("new"))].into_iter().collect();
//!
//! let delta = ConfigDelta::compare(&before, &after);
//! assert_eq!(delta.updates.len(), 1);
//! assert_eq!(delta.apply(&before), after);
//! ```

#![warn(missing_docs)]

pub mod delta;
pub mod error;

// Re-exports
pub use delta::{parse_flat, Addition, ConfigDelta, FlatConfig, Update};
pub use error::{DeltaError, DeltaResult};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
