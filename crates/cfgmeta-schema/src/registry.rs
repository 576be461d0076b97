//! Schema registry
//!
//! Provides [`SchemaRegistry`], the validated and immutable set of class
//! specifications together with the containment graph derived from their
//! class-reference parameters.
//!
//! The containment graph may contain cycles (a class may contain itself,
//! directly or through other classes). That is never a schema error: instance
//! trees are strictly tree-shaped, so recursion is bounded where instances are
//! built, not here.

use crate::error::{SchemaError, SchemaResult};
use crate::spec::{Cardinality, ClassSpec};
use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use std::collections::{HashMap, HashSet};

/// Validated, immutable set of class specifications
///
/// Built once with [`SchemaRegistry::build`]; a registry either exists in a
/// fully valid state or not at all. Share it across trees and threads through
/// an `Arc`.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    /// Specs keyed by class name, in input order
    classes: IndexMap<String, ClassSpec>,

    /// Position of the root class in `classes`
    root: usize,

    /// Containment graph: node weight is the class name, edge weight the slot name
    graph: DiGraph<String, String>,

    /// Class name -> graph node
    nodes: HashMap<String, NodeIndex>,
}

impl SchemaRegistry {
    /// Validate `specs` and build the registry
    ///
    /// Classes are checked in input order, so the first offending name is the
    /// one reported.
    ///
    /// # Errors
    /// - [`SchemaError::DuplicateClassName`] / [`SchemaError::DuplicateParameter`]
    /// - [`SchemaError::InvalidCardinality`] if `max < min`
    /// - [`SchemaError::MultipleRootClasses`] / [`SchemaError::NoRootClass`]
    /// - [`SchemaError::UnresolvedClassRef`] for dangling slot targets
    pub fn build(specs: impl IntoIterator<Item = ClassSpec>) -> SchemaResult<Self> {
        let specs: Vec<ClassSpec> = specs.into_iter().collect();
        // Targets may be declared after the class referencing them
        let declared: HashSet<&str> = specs.iter().map(|s| s.class_name.as_str()).collect();

        let mut seen_classes = HashSet::new();
        let mut root: Option<&str> = None;
        for spec in &specs {
            if !seen_classes.insert(spec.class_name.as_str()) {
                return Err(SchemaError::DuplicateClassName(spec.class_name.clone()));
            }

            let mut seen = HashSet::new();
            for parameter in &spec.parameters {
                if !seen.insert(parameter.name.as_str()) {
                    return Err(SchemaError::DuplicateParameter {
                        class: spec.class_name.clone(),
                        parameter: parameter.name.clone(),
                    });
                }
            }

            if let (Some(min), Some(max)) = (spec.min_count, spec.max_count) {
                if max < min {
                    return Err(SchemaError::InvalidCardinality {
                        class: spec.class_name.clone(),
                        min,
                        max,
                    });
                }
            }

            if spec.is_root {
                if let Some(first) = root {
                    return Err(SchemaError::MultipleRootClasses {
                        first: first.to_string(),
                        second: spec.class_name.clone(),
                    });
                }
                root = Some(spec.class_name.as_str());
            }

            for (slot, target) in spec.slots() {
                if !declared.contains(target) {
                    return Err(SchemaError::UnresolvedClassRef {
                        class: spec.class_name.clone(),
                        parameter: slot.to_string(),
                        target: target.to_string(),
                    });
                }
            }
        }

        let root = specs
            .iter()
            .position(|s| s.is_root)
            .ok_or(SchemaError::NoRootClass)?;
        let classes: IndexMap<String, ClassSpec> = specs
            .into_iter()
            .map(|spec| (spec.class_name.clone(), spec))
            .collect();

        let mut graph = DiGraph::new();
        let nodes: HashMap<String, NodeIndex> = classes
            .keys()
            .map(|name| (name.clone(), graph.add_node(name.clone())))
            .collect();
        for spec in classes.values() {
            let from = nodes[&spec.class_name];
            for (slot, target) in spec.slots() {
                graph.add_edge(from, nodes[target], slot.to_string());
            }
        }

        tracing::debug!(
            classes = classes.len(),
            root = %classes[root].class_name,
            edges = graph.edge_count(),
            "schema registry built"
        );

        Ok(Self {
            classes,
            root,
            graph,
            nodes,
        })
    }

    /// Spec for `class_name`
    #[inline]
    #[must_use]
    pub fn lookup(&self, class_name: &str) -> Option<&ClassSpec> {
        self.classes.get(class_name)
    }

    /// The single root class
    #[inline]
    #[must_use]
    pub fn root_class(&self) -> &ClassSpec {
        &self.classes[self.root]
    }

    /// Cardinality bounds of `class_name`, `[0, ∞)` where unspecified
    #[inline]
    #[must_use]
    pub fn cardinality_of(&self, class_name: &str) -> Option<Cardinality> {
        self.lookup(class_name).map(ClassSpec::cardinality)
    }

    /// Target class of `slot` on `class_name`, if it is a containment slot
    #[must_use]
    pub fn slot_target(&self, class_name: &str, slot: &str) -> Option<&str> {
        self.lookup(class_name)?.parameter(slot)?.kind.target()
    }

    /// Containment slots of `class_name` as `(slot, target class)`
    ///
    /// Empty for unknown classes.
    #[must_use]
    pub fn slots_of(&self, class_name: &str) -> Vec<(&str, &str)> {
        self.lookup(class_name)
            .map(|spec| spec.slots().collect())
            .unwrap_or_default()
    }

    /// All specs in input order
    pub fn classes(&self) -> impl Iterator<Item = &ClassSpec> {
        self.classes.values()
    }

    /// Number of classes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Always false for a built registry; present for API symmetry
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Containment edges as `(parent class, slot, child class)`
    #[must_use]
    pub fn containment_edges(&self) -> Vec<(&str, &str, &str)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].as_str(),
                    edge.weight().as_str(),
                    self.graph[edge.target()].as_str(),
                )
            })
            .collect()
    }

    /// Classes that can contain themselves, directly or transitively
    ///
    /// Informational only. Returned in input order.
    #[must_use]
    pub fn recursive_classes(&self) -> Vec<&str> {
        let mut recursive = HashSet::new();
        for component in tarjan_scc(&self.graph) {
            let cyclic = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&n| self.graph.contains_edge(n, n));
            if cyclic {
                recursive.extend(component);
            }
        }
        self.classes
            .keys()
            .filter(|name| recursive.contains(&self.nodes[*name]))
            .map(String::as_str)
            .collect()
    }

    /// Classes that no instance tree can ever contain
    ///
    /// Returned in input order.
    #[must_use]
    pub fn unreachable_classes(&self) -> Vec<&str> {
        let start = self.nodes[&self.root_class().class_name];
        let mut reachable = HashSet::new();
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(node) = dfs.next(&self.graph) {
            reachable.insert(node);
        }
        self.classes
            .keys()
            .filter(|name| !reachable.contains(&self.nodes[*name]))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ParameterSpec, ScalarKind};

    fn station() -> Vec<ClassSpec> {
        vec![
            ClassSpec::new("BTS")
                .root()
                .with_parameter(ParameterSpec::scalar("id", ScalarKind::Uint32))
                .with_parameter(ParameterSpec::slot("HWE")),
            ClassSpec::new("HWE")
                .with_parameter(ParameterSpec::slot("RU"))
                .with_bounds(Some(0), Some(42)),
            ClassSpec::new("RU").with_bounds(None, Some(42)),
            ClassSpec::new("SPARE"),
        ]
    }

    #[test]
    fn builds_with_forward_references() {
        let registry = SchemaRegistry::build(station()).unwrap();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.root_class().class_name, "BTS");
        assert_eq!(registry.slot_target("HWE", "RU"), Some("RU"));
        assert_eq!(registry.slot_target("BTS", "id"), None);
    }

    #[test]
    fn cardinality_defaults_to_unbounded() {
        let registry = SchemaRegistry::build(station()).unwrap();
        assert_eq!(
            registry.cardinality_of("RU"),
            Some(Cardinality::new(0, Some(42)))
        );
        assert_eq!(registry.cardinality_of("SPARE"), Some(Cardinality::UNBOUNDED));
        assert_eq!(registry.cardinality_of("NOPE"), None);
    }

    #[test]
    fn rejects_duplicate_class_name() {
        let mut specs = station();
        specs.push(ClassSpec::new("RU"));
        let err = SchemaRegistry::build(specs).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateClassName(name) if name == "RU"));
    }

    #[test]
    fn rejects_duplicate_parameter() {
        let specs = vec![ClassSpec::new("BTS")
            .root()
            .with_parameter(ParameterSpec::scalar("id", ScalarKind::Uint32))
            .with_parameter(ParameterSpec::scalar("id", ScalarKind::String))];
        let err = SchemaRegistry::build(specs).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateParameter { .. }));
    }

    #[test]
    fn rejects_missing_root() {
        let specs = vec![ClassSpec::new("A"), ClassSpec::new("B")];
        let err = SchemaRegistry::build(specs).unwrap_err();
        assert!(matches!(err, SchemaError::NoRootClass));
    }

    #[test]
    fn rejects_second_root_reporting_both_names() {
        let specs = vec![
            ClassSpec::new("A").root(),
            ClassSpec::new("B"),
            ClassSpec::new("C").root(),
        ];
        let err = SchemaRegistry::build(specs).unwrap_err();
        match err {
            SchemaError::MultipleRootClasses { first, second } => {
                assert_eq!(first, "A");
                assert_eq!(second, "C");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_dangling_reference() {
        let specs = vec![ClassSpec::new("BTS")
            .root()
            .with_parameter(ParameterSpec::slot("GHOST"))];
        let err = SchemaRegistry::build(specs).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::UnresolvedClassRef { ref parameter, ref target, .. }
                if parameter == "GHOST" && target == "GHOST"
        ));
    }

    #[test]
    fn dangling_reference_reported_before_later_duplicate() {
        let specs = vec![
            ClassSpec::new("A")
                .root()
                .with_parameter(ParameterSpec::slot("GHOST")),
            ClassSpec::new("B"),
            ClassSpec::new("B"),
        ];
        let err = SchemaRegistry::build(specs).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::UnresolvedClassRef { ref class, ref target, .. }
                if class == "A" && target == "GHOST"
        ));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let specs = vec![
            ClassSpec::new("BTS").root(),
            ClassSpec::new("X").with_bounds(Some(5), Some(2)),
        ];
        let err = SchemaRegistry::build(specs).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidCardinality { min: 5, max: 2, .. }
        ));
    }

    #[test]
    fn cycles_are_allowed_and_reported() {
        let specs = vec![
            ClassSpec::new("ROOT")
                .root()
                .with_parameter(ParameterSpec::slot("FOLDER")),
            ClassSpec::new("FOLDER")
                .with_parameter(ParameterSpec::class_ref("sub", "FOLDER"))
                .with_parameter(ParameterSpec::slot("FILE")),
            ClassSpec::new("FILE"),
        ];
        let registry = SchemaRegistry::build(specs).unwrap();
        assert_eq!(registry.recursive_classes(), vec!["FOLDER"]);
        assert!(registry.unreachable_classes().is_empty());
    }

    #[test]
    fn unreachable_classes_in_input_order() {
        let registry = SchemaRegistry::build(station()).unwrap();
        assert_eq!(registry.unreachable_classes(), vec!["SPARE"]);
        assert!(registry.recursive_classes().is_empty());
    }

    #[test]
    fn containment_edges_carry_slot_names() {
        let registry = SchemaRegistry::build(station()).unwrap();
        let mut edges = registry.containment_edges();
        edges.sort_unstable();
        assert_eq!(edges, vec![("BTS", "HWE", "HWE"), ("HWE", "RU", "RU")]);
    }

    #[test]
    fn slots_of_lists_declared_slots() {
        let registry = SchemaRegistry::build(station()).unwrap();
        assert_eq!(registry.slots_of("BTS"), vec![("HWE", "HWE")]);
        assert!(registry.slots_of("RU").is_empty());
        assert!(registry.slots_of("NOPE").is_empty());
    }
}
