//! Instance drafts
//!
//! An [`InstanceDraft`] is a node under construction: plain data, not yet
//! validated, with no identity and not visible to any tree query. Committing
//! it through [`crate::InstanceTree`] validates the whole subtree and then
//! turns it into [`crate::InstanceNode`]s in one step.
//!
//! Drafts are also the snapshot format handed to persistence layers.

use crate::config::EngineConfig;
use crate::error::{InstanceError, InstanceResult};
use crate::value::{ScalarValue, Values};
use cfgmeta_schema::{ScalarKind, SchemaRegistry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Node under construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDraft {
    /// Class to instantiate
    pub class: String,

    /// Scalar values
    #[serde(default)]
    pub values: Values,

    /// Children per slot
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub children: IndexMap<String, Vec<InstanceDraft>>,
}

impl InstanceDraft {
    /// Empty draft of `class`
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            values: Values::new(),
            children: IndexMap::new(),
        }
    }

    /// Draft with the given values and no children
    pub fn with_values(class: impl Into<String>, values: Values) -> Self {
        Self {
            class: class.into(),
            values,
            children: IndexMap::new(),
        }
    }

    /// Bind a scalar value
    #[must_use]
    pub fn value(mut self, parameter: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.values.insert(parameter.into(), value.into());
        self
    }

    /// Append a child to `slot`
    #[must_use]
    pub fn child(mut self, slot: impl Into<String>, child: InstanceDraft) -> Self {
        self.children.entry(slot.into()).or_default().push(child);
        self
    }

    /// Number of drafts in this subtree
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .values()
            .flatten()
            .map(InstanceDraft::node_count)
            .sum::<usize>()
    }

    /// Parse from JSON
    ///
    /// # Errors
    /// Returns the serde error on malformed input
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Render as pretty JSON
    ///
    /// # Errors
    /// Returns the serde error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Minimal committable draft rooted at the registry's root class
///
/// Scalars get their kind's zero value, identity parameters get
/// sibling-unique ordinals (1, 2, ...), and each slot holds exactly its
/// target's minimum number of children.
///
/// # Errors
/// [`InstanceError::UnsatisfiableContainment`] when a mandatory slot leads
/// back into a class already on the current path,
/// [`InstanceError::IdentityExhausted`] when a mandatory slot needs more than
/// two children of a class identified by a boolean, and
/// [`InstanceError::DepthExceeded`] past `config.max_depth`.
pub fn skeleton(registry: &SchemaRegistry, config: &EngineConfig) -> InstanceResult<InstanceDraft> {
    let root = registry.root_class().class_name.as_str();
    let mut path = Vec::new();
    skeleton_of(registry, config, root, 1, &mut path)
}

fn skeleton_of<'r>(
    registry: &'r SchemaRegistry,
    config: &EngineConfig,
    class: &'r str,
    ordinal: u32,
    path: &mut Vec<&'r str>,
) -> InstanceResult<InstanceDraft> {
    let spec = registry
        .lookup(class)
        .ok_or_else(|| InstanceError::UnknownClass(class.to_string()))?;

    if path.len() > config.max_depth {
        return Err(InstanceError::DepthExceeded {
            class: class.to_string(),
            depth: path.len(),
            max_depth: config.max_depth,
        });
    }

    let mut draft = InstanceDraft::new(class);
    for (name, kind) in spec.scalar_parameters() {
        let value = if name == config.identity_parameter {
            identity_ordinal(kind, ordinal)
        } else {
            ScalarValue::default_for(kind)
        };
        draft.values.insert(name.to_string(), value);
    }

    path.push(class);
    for (slot, target) in spec.slots() {
        let min = registry.cardinality_of(target).map_or(0, |c| c.min);
        if min == 0 {
            continue;
        }
        if path.contains(&target) {
            return Err(InstanceError::UnsatisfiableContainment {
                class: class.to_string(),
                slot: slot.to_string(),
            });
        }
        if min > 2 && identity_kind(registry, config, target) == Some(ScalarKind::Boolean) {
            return Err(InstanceError::IdentityExhausted {
                class: class.to_string(),
                slot: slot.to_string(),
                required: min,
            });
        }
        let children = (1..=min)
            .map(|i| skeleton_of(registry, config, target, i, path))
            .collect::<InstanceResult<Vec<_>>>()?;
        draft.children.insert(slot.to_string(), children);
    }
    path.pop();

    Ok(draft)
}

fn identity_kind(registry: &SchemaRegistry, config: &EngineConfig, class: &str) -> Option<ScalarKind> {
    registry
        .lookup(class)?
        .parameter(&config.identity_parameter)?
        .kind
        .scalar()
}

fn identity_ordinal(kind: ScalarKind, ordinal: u32) -> ScalarValue {
    match kind {
        ScalarKind::Uint32 => ScalarValue::Uint32(ordinal),
        ScalarKind::String => ScalarValue::String(ordinal.to_string()),
        ScalarKind::Boolean => ScalarValue::Boolean(ordinal % 2 == 0),
    }
}
