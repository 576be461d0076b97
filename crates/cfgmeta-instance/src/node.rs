//! Committed instance nodes
//!
//! A node exclusively owns its children: they live inside the parent's slot
//! vectors, so an instance-level cycle cannot be expressed even when the
//! schema's containment graph is recursive.

use crate::value::{ScalarValue, Values};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of a committed node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Fresh random identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Concrete, schema-conformant instantiation of a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceNode {
    pub(crate) id: NodeId,
    pub(crate) class_name: String,
    pub(crate) values: Values,
    /// One entry per declared slot, in declaration order
    pub(crate) children: IndexMap<String, Vec<InstanceNode>>,
}

impl InstanceNode {
    /// Node identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Class this node instantiates
    #[inline]
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Scalar value by parameter name
    #[inline]
    #[must_use]
    pub fn value(&self, parameter: &str) -> Option<&ScalarValue> {
        self.values.get(parameter)
    }

    /// All scalar values in binding order
    #[inline]
    #[must_use]
    pub fn values(&self) -> &Values {
        &self.values
    }

    /// Children held in `slot`; empty for unknown slots
    #[must_use]
    pub fn children(&self, slot: &str) -> &[InstanceNode] {
        self.children.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Slots with their children, in declaration order
    pub fn slots(&self) -> impl Iterator<Item = (&str, &[InstanceNode])> {
        self.children
            .iter()
            .map(|(slot, children)| (slot.as_str(), children.as_slice()))
    }

    /// Number of children in `slot`
    #[inline]
    #[must_use]
    pub fn child_count(&self, slot: &str) -> usize {
        self.children(slot).len()
    }

    /// Pre-order traversal of this node and its descendants
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }
}

/// Pre-order iterator over a subtree
#[derive(Debug)]
pub struct Iter<'a> {
    stack: Vec<&'a InstanceNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a InstanceNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        for children in node.children.values().rev() {
            self.stack.extend(children.iter().rev());
        }
        Some(node)
    }
}
