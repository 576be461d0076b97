//! Identity index
//!
//! Maps identity values to the committed nodes carrying them. Identities are
//! only unique within one slot, so a value may map to several nodes; they are
//! kept in commit order.

use crate::node::NodeId;
use crate::value::ScalarValue;
use std::collections::HashMap;

/// Identity value -> nodes, maintained incrementally by the tree
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    by_value: HashMap<ScalarValue, Vec<NodeId>>,
}

impl IdentityIndex {
    /// Create empty index
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `node` under `value`
    pub fn insert(&mut self, value: ScalarValue, node: NodeId) {
        self.by_value.entry(value).or_default().push(node);
    }

    /// Forget `node` under `value`
    pub fn remove(&mut self, value: &ScalarValue, node: NodeId) {
        if let Some(nodes) = self.by_value.get_mut(value) {
            nodes.retain(|n| *n != node);
            if nodes.is_empty() {
                self.by_value.remove(value);
            }
        }
    }

    /// Earliest-committed node carrying `value`
    #[inline]
    #[must_use]
    pub fn first(&self, value: &ScalarValue) -> Option<NodeId> {
        self.by_value.get(value).and_then(|nodes| nodes.first().copied())
    }

    /// All nodes carrying `value`, in commit order
    #[must_use]
    pub fn all(&self, value: &ScalarValue) -> &[NodeId] {
        self.by_value.get(value).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct identity values
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_value.len()
    }

    /// Check if index is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_value.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_is_commit_order() {
        let mut index = IdentityIndex::new();
        let a = NodeId::new();
        let b = NodeId::new();
        index.insert(7u32.into(), a);
        index.insert(7u32.into(), b);

        assert_eq!(index.first(&7u32.into()), Some(a));
        assert_eq!(index.all(&7u32.into()), &[a, b]);

        index.remove(&7u32.into(), a);
        assert_eq!(index.first(&7u32.into()), Some(b));
    }

    #[test]
    fn removing_last_entry_drops_value() {
        let mut index = IdentityIndex::new();
        let a = NodeId::new();
        index.insert("x".into(), a);
        assert_eq!(index.len(), 1);

        index.remove(&"x".into(), a);
        assert!(index.is_empty());
        assert_eq!(index.first(&"x".into()), None);
    }
}
