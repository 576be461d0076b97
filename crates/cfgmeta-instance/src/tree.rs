//! Instance tree
//!
//! [`InstanceTree`] owns the root [`InstanceNode`] and keeps two non-owning
//! indexes next to it: child -> (parent, slot) for locating nodes, and
//! identity value -> nodes for [`InstanceTree::find_by_id`].
//!
//! Every mutation runs all of its checks before touching anything, so a
//! failed call leaves the tree exactly as it was. Mutations are
//! check-then-act sequences and need exclusive access; see
//! [`crate::SharedTree`] for a locked wrapper.

use crate::config::EngineConfig;
use crate::draft::InstanceDraft;
use crate::error::{InstanceError, InstanceResult};
use crate::index::IdentityIndex;
use crate::node::{InstanceNode, Iter, NodeId};
use crate::validator::Validator;
use crate::value::{ScalarValue, Values};
use cfgmeta_schema::{ClassSpec, ParameterKind, SchemaRegistry};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Where a committed non-root node lives
#[derive(Debug, Clone)]
struct Placement {
    parent: NodeId,
    slot: String,
}

/// Index update produced while committing a draft
struct Registration {
    node: NodeId,
    placement: Placement,
    identity: Option<ScalarValue>,
}

/// Rooted, schema-conformant tree of committed nodes
#[derive(Debug, Clone)]
pub struct InstanceTree {
    registry: Arc<SchemaRegistry>,
    config: EngineConfig,
    root: InstanceNode,
    placements: HashMap<NodeId, Placement>,
    identities: IdentityIndex,
}

impl InstanceTree {
    /// Create a tree holding only a root node
    ///
    /// # Errors
    /// [`InstanceError::NotRootClass`] unless `root_class` is the registry's
    /// root class, plus any scalar or completeness violation.
    pub fn create(
        registry: Arc<SchemaRegistry>,
        root_class: &str,
        root_values: Values,
    ) -> InstanceResult<Self> {
        Self::create_from_draft(
            registry,
            EngineConfig::default(),
            InstanceDraft::with_values(root_class, root_values),
        )
    }

    /// Validate a whole draft and commit it as a new tree
    ///
    /// This is also how a snapshot is restored.
    ///
    /// # Errors
    /// [`InstanceError::NotRootClass`] or any violation found in the draft
    pub fn create_from_draft(
        registry: Arc<SchemaRegistry>,
        config: EngineConfig,
        draft: InstanceDraft,
    ) -> InstanceResult<Self> {
        let expected = &registry.root_class().class_name;
        if &draft.class != expected {
            return Err(InstanceError::NotRootClass {
                expected: expected.clone(),
                actual: draft.class,
            });
        }

        validate_draft(&registry, &config, &draft, 0)?;

        let mut registrations = Vec::new();
        let root = commit(&registry, &config, draft, None, &mut registrations);
        let mut tree = Self {
            registry,
            config,
            root,
            placements: HashMap::new(),
            identities: IdentityIndex::new(),
        };
        if let Some(identity) = tree.identity_of(&tree.root) {
            tree.identities.insert(identity, tree.root.id);
        }
        tree.apply(registrations);

        tracing::debug!(
            root = %tree.root.id,
            class = %tree.root.class_name,
            nodes = tree.len(),
            "instance tree created"
        );
        Ok(tree)
    }

    /// Add a childless node to `slot` of `parent`
    ///
    /// # Errors
    /// See [`InstanceTree::add_subtree`]
    pub fn add_child(
        &mut self,
        parent: NodeId,
        slot: &str,
        child_class: &str,
        child_values: Values,
    ) -> InstanceResult<NodeId> {
        self.add_subtree(parent, slot, InstanceDraft::with_values(child_class, child_values))
    }

    /// Validate `draft` and attach it to `slot` of `parent`
    ///
    /// Atomic: on any failure nothing is attached or indexed.
    ///
    /// # Errors
    /// - [`InstanceError::NodeNotFound`] for an unknown parent
    /// - [`InstanceError::SlotMismatch`] unless `slot` is a containment slot
    ///   of the parent's class targeting the draft's class
    /// - [`InstanceError::CardinalityViolation`] if the slot is full
    /// - [`InstanceError::DuplicateIdentity`] if a sibling has the same id
    /// - any violation inside the draft itself
    pub fn add_subtree(
        &mut self,
        parent: NodeId,
        slot: &str,
        draft: InstanceDraft,
    ) -> InstanceResult<NodeId> {
        let parent_node = self.node(parent).ok_or(InstanceError::NodeNotFound(parent))?;
        let parent_spec = self.spec_of(parent_node)?;

        if self.registry.slot_target(&parent_spec.class_name, slot) != Some(draft.class.as_str()) {
            return Err(InstanceError::SlotMismatch {
                class: parent_spec.class_name.clone(),
                slot: slot.to_string(),
                child_class: draft.class,
            });
        }

        let bounds = self
            .registry
            .cardinality_of(&draft.class)
            .ok_or_else(|| InstanceError::UnknownClass(draft.class.clone()))?;
        let siblings = parent_node.children(slot);
        Validator::check_can_add(
            &parent_spec.class_name,
            slot,
            &draft.class,
            siblings.len(),
            bounds,
        )?;

        if let Some(candidate) = draft.values.get(&self.config.identity_parameter) {
            if self.declares_identity(&draft.class) {
                let existing: Vec<&ScalarValue> =
                    siblings.iter().filter_map(|s| self.identity_ref(s)).collect();
                Validator::check_uniqueness(&draft.class, slot, existing, candidate)?;
            }
        }

        let depth = self.depth_of(parent) + 1;
        validate_draft(&self.registry, &self.config, &draft, depth)?;

        let path = self.path_to(parent).ok_or(InstanceError::NodeNotFound(parent))?;
        let mut registrations = Vec::new();
        let placement = Placement {
            parent,
            slot: slot.to_string(),
        };
        let node = commit(
            &self.registry,
            &self.config,
            draft,
            Some(placement),
            &mut registrations,
        );
        let id = node.id;
        let class = node.class_name.clone();

        let parent_node = descend_mut(&mut self.root, &path).ok_or(InstanceError::NodeNotFound(parent))?;
        parent_node.children.entry(slot.to_string()).or_default().push(node);
        self.apply(registrations);

        tracing::debug!(node = %id, %parent, slot, %class, "child committed");
        Ok(id)
    }

    /// Detach `child` (and its subtree) from `slot` of `parent`
    ///
    /// # Errors
    /// - [`InstanceError::NodeNotFound`] for an unknown parent, or a child
    ///   not held in that slot
    /// - [`InstanceError::UnknownParameter`] if `slot` is not a containment
    ///   slot of the parent's class
    /// - [`InstanceError::CardinalityViolation`] if removal would go below the
    ///   minimum
    pub fn remove_child(&mut self, parent: NodeId, slot: &str, child: NodeId) -> InstanceResult<()> {
        let parent_node = self.node(parent).ok_or(InstanceError::NodeNotFound(parent))?;
        let parent_spec = self.spec_of(parent_node)?;
        let target = self
            .registry
            .slot_target(&parent_spec.class_name, slot)
            .ok_or_else(|| InstanceError::UnknownParameter {
                class: parent_spec.class_name.clone(),
                parameter: slot.to_string(),
            })?;

        let siblings = parent_node.children(slot);
        let position = siblings
            .iter()
            .position(|c| c.id == child)
            .ok_or(InstanceError::NodeNotFound(child))?;

        let bounds = self
            .registry
            .cardinality_of(target)
            .ok_or_else(|| InstanceError::UnknownClass(target.to_string()))?;
        Validator::check_can_remove(&parent_spec.class_name, slot, target, siblings.len(), bounds)?;

        let path = self.path_to(parent).ok_or(InstanceError::NodeNotFound(parent))?;
        let parent_node = descend_mut(&mut self.root, &path).ok_or(InstanceError::NodeNotFound(parent))?;
        let removed = match parent_node.children.get_mut(slot) {
            Some(children) => children.remove(position),
            None => return Err(InstanceError::NodeNotFound(child)),
        };

        let identity_parameter = &self.config.identity_parameter;
        for node in removed.iter() {
            self.placements.remove(&node.id);
            if let Some(identity) = node.values.get(identity_parameter) {
                self.identities.remove(identity, node.id);
            }
        }

        tracing::debug!(node = %child, %parent, slot, removed = removed.iter().count(), "child removed");
        Ok(())
    }

    /// Replace one scalar value of a committed node
    ///
    /// Changing the identity parameter re-checks sibling uniqueness and moves
    /// the node within the identity index.
    ///
    /// # Errors
    /// - [`InstanceError::NodeNotFound`]
    /// - [`InstanceError::UnknownParameter`] if the class has no such scalar
    /// - [`InstanceError::TypeMismatch`] if the value's type differs
    /// - [`InstanceError::DuplicateIdentity`] for an identity already used by
    ///   a sibling
    pub fn update_scalar(
        &mut self,
        node: NodeId,
        parameter: &str,
        value: impl Into<ScalarValue>,
    ) -> InstanceResult<()> {
        let value = value.into();
        let current = self.node(node).ok_or(InstanceError::NodeNotFound(node))?;
        let spec = self.spec_of(current)?;

        let kind = match spec.parameter(parameter).map(|p| &p.kind) {
            Some(ParameterKind::Scalar(kind)) => *kind,
            Some(ParameterKind::ClassRef(_)) | None => {
                return Err(InstanceError::UnknownParameter {
                    class: spec.class_name.clone(),
                    parameter: parameter.to_string(),
                })
            }
        };
        Validator::check_scalar_type(&spec.class_name, parameter, &value, kind)?;

        let previous = current.values.get(parameter).cloned();
        let identity_changed =
            parameter == self.config.identity_parameter && previous.as_ref() != Some(&value);
        if identity_changed {
            if let Some(Placement { parent, slot }) = self.placements.get(&node) {
                let siblings = self
                    .node(*parent)
                    .map(|p| p.children(slot))
                    .unwrap_or_default();
                let existing: Vec<&ScalarValue> = siblings
                    .iter()
                    .filter(|s| s.id != node)
                    .filter_map(|s| self.identity_ref(s))
                    .collect();
                Validator::check_uniqueness(&spec.class_name, slot, existing, &value)?;
            }
        }

        let path = self.path_to(node).ok_or(InstanceError::NodeNotFound(node))?;
        let target = descend_mut(&mut self.root, &path).ok_or(InstanceError::NodeNotFound(node))?;
        target.values.insert(parameter.to_string(), value.clone());

        if identity_changed {
            if let Some(previous) = previous {
                self.identities.remove(&previous, node);
            }
            self.identities.insert(value, node);
        }

        tracing::trace!(%node, parameter, "scalar updated");
        Ok(())
    }

    /// Earliest-committed node whose identity parameter equals `id`
    ///
    /// Direct index lookup; identities are only unique per slot, see
    /// [`InstanceTree::find_all_by_id`].
    #[must_use]
    pub fn find_by_id(&self, id: &ScalarValue) -> Option<NodeId> {
        self.identities.first(id)
    }

    /// Every node whose identity parameter equals `id`, in commit order
    #[must_use]
    pub fn find_all_by_id(&self, id: &ScalarValue) -> &[NodeId] {
        self.identities.all(id)
    }

    /// The root node
    #[inline]
    #[must_use]
    pub fn root(&self) -> &InstanceNode {
        &self.root
    }

    /// Registry this tree conforms to
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Configuration in effect
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Committed node by identity
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&InstanceNode> {
        let path = self.path_to(id)?;
        let mut node = &self.root;
        for (child, slot) in &path {
            node = node.children(slot).iter().find(|c| c.id == *child)?;
        }
        Some(node)
    }

    /// Parent of a non-root node
    #[must_use]
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.placements.get(&id).map(|p| p.parent)
    }

    /// Children of `id` held in `slot`
    #[must_use]
    pub fn children(&self, id: NodeId, slot: &str) -> Option<&[InstanceNode]> {
        self.node(id).map(|n| n.children(slot))
    }

    /// Number of committed nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len() + 1
    }

    /// Always false: a tree has at least its root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Pre-order traversal from the root
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        self.root.iter()
    }

    /// The committed tree as a draft, without node identities
    ///
    /// Empty slots are omitted.
    #[must_use]
    pub fn snapshot(&self) -> InstanceDraft {
        snapshot_of(&self.root)
    }

    /// Flat `path -> value` rendering of the tree
    ///
    /// Each node contributes `path -> class name`, each scalar
    /// `path.parameter -> value`. Paths are slot names with positions:
    /// `BTS/HWE[0]/RU[3]`.
    #[must_use]
    pub fn flatten(&self) -> BTreeMap<String, serde_json::Value> {
        let mut flat = BTreeMap::new();
        let root_path = self.root.class_name.clone();
        flatten_into(&self.root, &root_path, &mut flat);
        flat
    }

    fn spec_of(&self, node: &InstanceNode) -> InstanceResult<&ClassSpec> {
        self.registry
            .lookup(&node.class_name)
            .ok_or_else(|| InstanceError::UnknownClass(node.class_name.clone()))
    }

    fn declares_identity(&self, class: &str) -> bool {
        self.registry
            .lookup(class)
            .and_then(|spec| spec.parameter(&self.config.identity_parameter))
            .is_some_and(|p| !p.is_slot())
    }

    fn identity_of(&self, node: &InstanceNode) -> Option<ScalarValue> {
        self.identity_ref(node).cloned()
    }

    fn identity_ref<'n>(&self, node: &'n InstanceNode) -> Option<&'n ScalarValue> {
        node.values.get(&self.config.identity_parameter)
    }

    /// `(node, slot)` steps from the root down to `id`; empty for the root
    fn path_to(&self, id: NodeId) -> Option<Vec<(NodeId, String)>> {
        let mut path = Vec::new();
        let mut current = id;
        while current != self.root.id {
            let placement = self.placements.get(&current)?;
            path.push((current, placement.slot.clone()));
            current = placement.parent;
        }
        path.reverse();
        Some(path)
    }

    fn depth_of(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(placement) = self.placements.get(&current) {
            depth += 1;
            current = placement.parent;
        }
        depth
    }

    fn apply(&mut self, registrations: Vec<Registration>) {
        for registration in registrations {
            if let Some(identity) = registration.identity {
                self.identities.insert(identity, registration.node);
            }
            self.placements.insert(registration.node, registration.placement);
        }
    }
}

/// Check a draft subtree whose root would sit at `depth`
fn validate_draft(
    registry: &SchemaRegistry,
    config: &EngineConfig,
    draft: &InstanceDraft,
    depth: usize,
) -> InstanceResult<()> {
    let spec = registry
        .lookup(&draft.class)
        .ok_or_else(|| InstanceError::UnknownClass(draft.class.clone()))?;

    if depth > config.max_depth {
        return Err(InstanceError::DepthExceeded {
            class: draft.class.clone(),
            depth,
            max_depth: config.max_depth,
        });
    }

    Validator::check_parameter_completeness(spec, &draft.values)?;

    for (slot, children) in &draft.children {
        let target = registry.slot_target(&spec.class_name, slot);
        if let Some(child) = children.iter().find(|c| Some(c.class.as_str()) != target) {
            return Err(InstanceError::SlotMismatch {
                class: spec.class_name.clone(),
                slot: slot.clone(),
                child_class: child.class.clone(),
            });
        }
    }

    for (slot, target) in spec.slots() {
        let children = draft.children.get(slot).map(Vec::as_slice).unwrap_or_default();
        let bounds = registry
            .cardinality_of(target)
            .ok_or_else(|| InstanceError::UnknownClass(target.to_string()))?;
        Validator::check_cardinality(&spec.class_name, slot, target, children.len(), bounds)?;

        let mut seen: Vec<&ScalarValue> = Vec::new();
        for child in children {
            validate_draft(registry, config, child, depth + 1)?;
            if let Some(id) = child.values.get(&config.identity_parameter) {
                Validator::check_uniqueness(target, slot, seen.iter().copied(), id)?;
                seen.push(id);
            }
        }
    }

    Ok(())
}

/// Turn a validated draft into committed nodes, collecting index updates
fn commit(
    registry: &SchemaRegistry,
    config: &EngineConfig,
    draft: InstanceDraft,
    placement: Option<Placement>,
    registrations: &mut Vec<Registration>,
) -> InstanceNode {
    let id = NodeId::new();
    let InstanceDraft {
        class,
        values,
        mut children,
    } = draft;

    if let Some(placement) = placement {
        registrations.push(Registration {
            node: id,
            placement,
            identity: values.get(&config.identity_parameter).cloned(),
        });
    }

    let mut slots = IndexMap::new();
    if let Some(spec) = registry.lookup(&class) {
        for (slot, _) in spec.slots() {
            let committed = children
                .swap_remove(slot)
                .unwrap_or_default()
                .into_iter()
                .map(|child| {
                    let placement = Placement {
                        parent: id,
                        slot: slot.to_string(),
                    };
                    commit(registry, config, child, Some(placement), registrations)
                })
                .collect();
            slots.insert(slot.to_string(), committed);
        }
    }

    InstanceNode {
        id,
        class_name: class,
        values,
        children: slots,
    }
}

fn descend_mut<'t>(root: &'t mut InstanceNode, path: &[(NodeId, String)]) -> Option<&'t mut InstanceNode> {
    let mut node = root;
    for (child, slot) in path {
        node = node
            .children
            .get_mut(slot)?
            .iter_mut()
            .find(|c| c.id == *child)?;
    }
    Some(node)
}

fn snapshot_of(node: &InstanceNode) -> InstanceDraft {
    let children = node
        .children
        .iter()
        .filter(|(_, children)| !children.is_empty())
        .map(|(slot, children)| (slot.clone(), children.iter().map(snapshot_of).collect()))
        .collect();
    InstanceDraft {
        class: node.class_name.clone(),
        values: node.values.clone(),
        children,
    }
}

fn flatten_into(node: &InstanceNode, path: &str, flat: &mut BTreeMap<String, serde_json::Value>) {
    flat.insert(path.to_string(), serde_json::Value::from(node.class_name.as_str()));
    for (name, value) in &node.values {
        flat.insert(format!("{path}.{name}"), value.to_json());
    }
    for (slot, children) in &node.children {
        for (position, child) in children.iter().enumerate() {
            flatten_into(child, &format!("{path}/{slot}[{position}]"), flat);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::values;
    use cfgmeta_test_utils::{mandatory_registry, recursive_registry, sample_registry};
    use pretty_assertions::assert_eq;

    fn station() -> InstanceTree {
        InstanceTree::create(
            Arc::new(sample_registry()),
            "BTS",
            values([("id", ScalarValue::from(1u32)), ("name", ScalarValue::from("bts-1"))]),
        )
        .unwrap()
    }

    fn ru(id: u32) -> Values {
        values([
            ("id", ScalarValue::from(id)),
            ("hwRevision", ScalarValue::from("B2")),
            ("ipv4Address", ScalarValue::from("10.0.0.2")),
        ])
    }

    /// Every indexed placement must point at a live node in the named slot
    fn assert_indexes_consistent(tree: &InstanceTree) {
        assert_eq!(tree.iter().count(), tree.len());
        for node in tree.iter().skip(1) {
            let placement = &tree.placements[&node.id];
            let parent = tree.node(placement.parent).unwrap();
            assert!(parent.children(&placement.slot).iter().any(|c| c.id == node.id));
        }
        for node in tree.iter() {
            if let Some(identity) = node.value("id") {
                assert!(tree.find_all_by_id(identity).contains(&node.id));
            }
        }
    }

    #[test]
    fn create_initializes_every_slot() {
        let tree = station();
        let slots: Vec<_> = tree.root().slots().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec!["MGMT", "HWE", "COMM"]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.find_by_id(&1u32.into()), Some(tree.root().id()));
    }

    #[test]
    fn nested_adds_keep_indexes_in_step() {
        let mut tree = station();
        let root = tree.root().id();
        let hwe = tree.add_child(root, "HWE", "HWE", values([("id", 10u32)])).unwrap();
        let first = tree.add_child(hwe, "RU", "RU", ru(1)).unwrap();
        tree.add_child(hwe, "RU", "RU", ru(2)).unwrap();

        assert_eq!(tree.parent_of(first), Some(hwe));
        assert_eq!(tree.parent_of(hwe), Some(root));
        assert_eq!(tree.parent_of(root), None);
        assert_eq!(tree.depth_of(first), 2);
        assert_eq!(tree.path_to(first).unwrap().len(), 2);
        assert_indexes_consistent(&tree);

        tree.remove_child(root, "HWE", hwe).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.node(first), None);
        assert_eq!(tree.find_by_id(&2u32.into()), None);
        assert_indexes_consistent(&tree);
    }

    #[test]
    fn failed_subtree_leaves_no_trace() {
        let mut tree = station();
        let root = tree.root().id();
        let before = tree.snapshot();

        // Second RU repeats the first one's id
        let draft = InstanceDraft::new("HWE")
            .value("id", 3u32)
            .child("RU", InstanceDraft::with_values("RU", ru(1)))
            .child("RU", InstanceDraft::with_values("RU", ru(1)));
        let err = tree.add_subtree(root, "HWE", draft).unwrap_err();

        assert!(matches!(err, InstanceError::DuplicateIdentity { .. }));
        assert_eq!(tree.snapshot(), before);
        assert_eq!(tree.find_by_id(&3u32.into()), None);
        assert_indexes_consistent(&tree);
    }

    #[test]
    fn identity_update_moves_index_entry() {
        let mut tree = station();
        let root = tree.root().id();
        let hwe = tree.add_child(root, "HWE", "HWE", values([("id", 10u32)])).unwrap();

        tree.update_scalar(hwe, "id", 11u32).unwrap();
        assert_eq!(tree.find_by_id(&10u32.into()), None);
        assert_eq!(tree.find_by_id(&11u32.into()), Some(hwe));

        // Same value again is a no-op for the index
        tree.update_scalar(hwe, "id", 11u32).unwrap();
        assert_eq!(tree.find_all_by_id(&11u32.into()), &[hwe]);
        assert_indexes_consistent(&tree);
    }

    #[test]
    fn subtree_with_mandatory_children_commits_at_once() {
        let mut tree = InstanceTree::create(Arc::new(mandatory_registry()), "SITE", Values::new()).unwrap();
        let root = tree.root().id();

        let bare = tree.add_child(root, "RACK", "RACK", values([("id", 1u32)]));
        assert!(matches!(
            bare,
            Err(InstanceError::CardinalityViolation { count: 0, .. })
        ));

        let rack = InstanceDraft::new("RACK").value("id", 1u32).child(
            "PSU",
            InstanceDraft::new("PSU").value("id", 1u32).value("redundant", true),
        );
        let id = tree.add_subtree(root, "RACK", rack).unwrap();
        assert_eq!(tree.children(id, "PSU").unwrap().len(), 1);
        assert_eq!(tree.len(), 3);
        assert_indexes_consistent(&tree);
    }

    #[test]
    fn depth_is_measured_from_the_root() {
        let config = EngineConfig::new().with_max_depth(2);
        let mut tree = InstanceTree::create_from_draft(
            Arc::new(recursive_registry()),
            config,
            InstanceDraft::new("ROOT"),
        )
        .unwrap();
        let root = tree.root().id();
        let top = tree
            .add_child(root, "FOLDER", "FOLDER", values([("id", "top")]))
            .unwrap();
        let sub = tree.add_child(top, "sub", "FOLDER", values([("id", "sub")])).unwrap();

        let err = tree
            .add_child(sub, "sub", "FOLDER", values([("id", "deep")]))
            .unwrap_err();
        assert_eq!(
            err,
            InstanceError::DepthExceeded {
                class: "FOLDER".to_string(),
                depth: 3,
                max_depth: 2,
            }
        );
        assert_eq!(tree.len(), 3);
    }
}
