//! Class and parameter specifications
//!
//! Plain data describing one entity type of the metamodel. A [`ClassSpec`] is
//! a single uniform record: root and non-root classes, bounded and unbounded
//! ones, differ only in which optional fields are present.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar parameter types understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    /// Unsigned 32-bit integer
    Uint32,

    /// UTF-8 string
    String,

    /// Boolean flag
    Boolean,
}

impl ScalarKind {
    /// Type name as written in schema records
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarKind::Uint32 => "uint32",
            ScalarKind::String => "string",
            ScalarKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a declared parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    /// Typed scalar value bound on the instance itself
    Scalar(ScalarKind),

    /// Containment slot holding owned children of the named class
    ClassRef(String),
}

impl ParameterKind {
    /// Scalar kind, if this is a scalar parameter
    #[inline]
    #[must_use]
    pub fn scalar(&self) -> Option<ScalarKind> {
        match self {
            ParameterKind::Scalar(kind) => Some(*kind),
            ParameterKind::ClassRef(_) => None,
        }
    }

    /// Target class name, if this is a containment slot
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            ParameterKind::Scalar(_) => None,
            ParameterKind::ClassRef(target) => Some(target),
        }
    }
}

/// One named, typed field of a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Name, unique within the owning class
    pub name: String,

    /// Declared kind
    pub kind: ParameterKind,
}

impl ParameterSpec {
    /// Scalar parameter
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Scalar(kind),
        }
    }

    /// Containment slot targeting `target`
    pub fn class_ref(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::ClassRef(target.into()),
        }
    }

    /// Containment slot whose name is also its target class
    pub fn slot(class_name: impl Into<String>) -> Self {
        let name = class_name.into();
        Self::class_ref(name.clone(), name)
    }

    /// Whether this parameter is a containment slot
    #[inline]
    #[must_use]
    pub fn is_slot(&self) -> bool {
        matches!(self.kind, ParameterKind::ClassRef(_))
    }
}

/// Inclusive bounds on how many instances of a class one parent may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cardinality {
    /// Lower bound
    pub min: u32,

    /// Upper bound, `None` when unbounded
    pub max: Option<u32>,
}

impl Cardinality {
    /// `[0, ∞)`
    pub const UNBOUNDED: Cardinality = Cardinality { min: 0, max: None };

    /// Bounds `[min, max]`
    #[inline]
    #[must_use]
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Whether `count` lies within the bounds
    #[inline]
    #[must_use]
    pub fn admits(&self, count: usize) -> bool {
        let above_min = count >= self.min as usize;
        let below_max = self.max.map_or(true, |max| count <= max as usize);
        above_min && below_max
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "[{}, {}]", self.min, max),
            None => write!(f, "[{}, unbounded)", self.min),
        }
    }
}

/// Schema-level definition of one configuration entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSpec {
    /// Globally unique class name
    pub class_name: String,

    /// Free-form documentation
    pub documentation: String,

    /// Whether this is the tree root class
    pub is_root: bool,

    /// Declared parameters in display order
    pub parameters: Vec<ParameterSpec>,

    /// Minimum instances per parent, if constrained
    pub min_count: Option<u32>,

    /// Maximum instances per parent, if constrained
    pub max_count: Option<u32>,
}

impl ClassSpec {
    /// Create an unbounded, non-root class with no parameters
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            documentation: String::new(),
            is_root: false,
            parameters: Vec::new(),
            min_count: None,
            max_count: None,
        }
    }

    /// With documentation
    #[must_use]
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }

    /// Mark as root class
    #[must_use]
    pub fn root(mut self) -> Self {
        self.is_root = true;
        self
    }

    /// Append a parameter
    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// With cardinality bounds
    #[must_use]
    pub fn with_bounds(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_count = min;
        self.max_count = max;
        self
    }

    /// Parameter by name
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Scalar parameters in declaration order
    pub fn scalar_parameters(&self) -> impl Iterator<Item = (&str, ScalarKind)> {
        self.parameters
            .iter()
            .filter_map(|p| p.kind.scalar().map(|kind| (p.name.as_str(), kind)))
    }

    /// Containment slots in declaration order as `(slot, target)`
    pub fn slots(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters
            .iter()
            .filter_map(|p| p.kind.target().map(|target| (p.name.as_str(), target)))
    }

    /// Bounds with absent fields defaulted to `[0, ∞)`
    #[inline]
    #[must_use]
    pub fn cardinality(&self) -> Cardinality {
        Cardinality::new(self.min_count.unwrap_or(0), self.max_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinality_admits_inclusive_bounds() {
        let bounds = Cardinality::new(1, Some(3));
        assert!(!bounds.admits(0));
        assert!(bounds.admits(1));
        assert!(bounds.admits(3));
        assert!(!bounds.admits(4));
    }

    #[test]
    fn unbounded_admits_everything() {
        assert!(Cardinality::UNBOUNDED.admits(0));
        assert!(Cardinality::UNBOUNDED.admits(1_000_000));
    }

    #[test]
    fn cardinality_display() {
        assert_eq!(Cardinality::new(0, Some(42)).to_string(), "[0, 42]");
        assert_eq!(Cardinality::UNBOUNDED.to_string(), "[0, unbounded)");
    }

    #[test]
    fn class_spec_splits_scalars_and_slots() {
        let spec = ClassSpec::new("HWE")
            .with_parameter(ParameterSpec::scalar("id", ScalarKind::Uint32))
            .with_parameter(ParameterSpec::slot("RU"));

        let scalars: Vec<_> = spec.scalar_parameters().collect();
        assert_eq!(scalars, vec![("id", ScalarKind::Uint32)]);

        let slots: Vec<_> = spec.slots().collect();
        assert_eq!(slots, vec![("RU", "RU")]);
    }

    #[test]
    fn missing_bounds_default_to_unbounded() {
        let spec = ClassSpec::new("COMM");
        assert_eq!(spec.cardinality(), Cardinality::UNBOUNDED);

        let spec = ClassSpec::new("RU").with_bounds(None, Some(42));
        assert_eq!(spec.cardinality(), Cardinality::new(0, Some(42)));
    }
}
