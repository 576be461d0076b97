//! Lock-guarded tree handle
//!
//! One exclusive lock per tree: every mutation holds the write lock across
//! its whole check-then-act sequence, queries share the read lock. The
//! registry itself is immutable and needs no lock.

use crate::draft::InstanceDraft;
use crate::error::InstanceResult;
use crate::node::NodeId;
use crate::tree::InstanceTree;
use crate::value::{ScalarValue, Values};
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;

/// Cloneable, thread-safe handle to one [`InstanceTree`]
#[derive(Debug, Clone)]
pub struct SharedTree {
    inner: Arc<RwLock<InstanceTree>>,
}

impl SharedTree {
    /// Wrap an owned tree
    pub fn new(tree: InstanceTree) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Read access for traversal; blocks mutations while held
    pub fn read(&self) -> RwLockReadGuard<'_, InstanceTree> {
        self.inner.read()
    }

    /// See [`InstanceTree::add_child`]
    ///
    /// # Errors
    /// As the wrapped operation
    pub fn add_child(
        &self,
        parent: NodeId,
        slot: &str,
        child_class: &str,
        child_values: Values,
    ) -> InstanceResult<NodeId> {
        self.inner
            .write()
            .add_child(parent, slot, child_class, child_values)
    }

    /// See [`InstanceTree::add_subtree`]
    ///
    /// # Errors
    /// As the wrapped operation
    pub fn add_subtree(&self, parent: NodeId, slot: &str, draft: InstanceDraft) -> InstanceResult<NodeId> {
        self.inner.write().add_subtree(parent, slot, draft)
    }

    /// See [`InstanceTree::remove_child`]
    ///
    /// # Errors
    /// As the wrapped operation
    pub fn remove_child(&self, parent: NodeId, slot: &str, child: NodeId) -> InstanceResult<()> {
        self.inner.write().remove_child(parent, slot, child)
    }

    /// See [`InstanceTree::update_scalar`]
    ///
    /// # Errors
    /// As the wrapped operation
    pub fn update_scalar(
        &self,
        node: NodeId,
        parameter: &str,
        value: impl Into<ScalarValue>,
    ) -> InstanceResult<()> {
        self.inner.write().update_scalar(node, parameter, value)
    }

    /// See [`InstanceTree::find_by_id`]
    #[must_use]
    pub fn find_by_id(&self, id: &ScalarValue) -> Option<NodeId> {
        self.inner.read().find_by_id(id)
    }

    /// See [`InstanceTree::snapshot`]
    #[must_use]
    pub fn snapshot(&self) -> InstanceDraft {
        self.inner.read().snapshot()
    }

    /// Number of committed nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Always false: a tree has at least its root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Unwrap the tree if this is the last handle
    ///
    /// # Errors
    /// Returns `self` back while other handles exist
    pub fn try_into_inner(self) -> Result<InstanceTree, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}
