//! Conformance checks between instance data and class specifications
//!
//! Stateless checks consumed by [`crate::InstanceTree`]. Each returns `Ok(())`
//! or the typed violation; none has side effects.

use crate::error::{InstanceError, InstanceResult};
use crate::value::{ScalarValue, Values};
use cfgmeta_schema::{Cardinality, ClassSpec, ParameterKind, ScalarKind};

/// Schema-conformance validator
#[derive(Debug, Clone, Copy)]
pub struct Validator;

impl Validator {
    /// Create new validator instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Value's runtime type must exactly match `expected`
    ///
    /// No widening between kinds: `"7"` is not a `uint32`.
    pub fn check_scalar_type(
        class: &str,
        parameter: &str,
        value: &ScalarValue,
        expected: ScalarKind,
    ) -> InstanceResult<()> {
        if value.kind() == expected {
            return Ok(());
        }
        Err(InstanceError::TypeMismatch {
            class: class.to_string(),
            parameter: parameter.to_string(),
            expected,
            value: value.clone(),
        })
    }

    /// `count` must lie within `bounds` of `class` held in `parent_class.slot`
    pub fn check_cardinality(
        parent_class: &str,
        slot: &str,
        class: &str,
        count: usize,
        bounds: Cardinality,
    ) -> InstanceResult<()> {
        if bounds.admits(count) {
            return Ok(());
        }
        Err(InstanceError::CardinalityViolation {
            parent_class: parent_class.to_string(),
            slot: slot.to_string(),
            class: class.to_string(),
            count,
            bounds,
        })
    }

    /// One more child must not exceed the upper bound
    pub fn check_can_add(
        parent_class: &str,
        slot: &str,
        class: &str,
        current: usize,
        bounds: Cardinality,
    ) -> InstanceResult<()> {
        let upper_only = Cardinality::new(0, bounds.max);
        Self::check_cardinality(parent_class, slot, class, current + 1, upper_only)
    }

    /// One fewer child must not drop below the lower bound
    pub fn check_can_remove(
        parent_class: &str,
        slot: &str,
        class: &str,
        current: usize,
        bounds: Cardinality,
    ) -> InstanceResult<()> {
        let lower_only = Cardinality::new(bounds.min, None);
        Self::check_cardinality(
            parent_class,
            slot,
            class,
            current.saturating_sub(1),
            lower_only,
        )
    }

    /// `candidate` must not equal any sibling identity in the same slot
    ///
    /// Scoped to one slot of one parent; equal identities elsewhere in the
    /// tree are fine.
    pub fn check_uniqueness<'a>(
        class: &str,
        slot: &str,
        siblings: impl IntoIterator<Item = &'a ScalarValue>,
        candidate: &ScalarValue,
    ) -> InstanceResult<()> {
        if siblings.into_iter().any(|id| id == candidate) {
            return Err(InstanceError::DuplicateIdentity {
                class: class.to_string(),
                slot: slot.to_string(),
                id: candidate.clone(),
            });
        }
        Ok(())
    }

    /// Every declared scalar has a well-typed value and nothing else is bound
    ///
    /// Containment slots are not values: binding one is an
    /// [`InstanceError::UnknownParameter`].
    pub fn check_parameter_completeness(spec: &ClassSpec, provided: &Values) -> InstanceResult<()> {
        for (name, value) in provided {
            match spec.parameter(name).map(|p| &p.kind) {
                Some(ParameterKind::Scalar(kind)) => {
                    Self::check_scalar_type(&spec.class_name, name, value, *kind)?;
                }
                Some(ParameterKind::ClassRef(_)) | None => {
                    return Err(InstanceError::UnknownParameter {
                        class: spec.class_name.clone(),
                        parameter: name.clone(),
                    });
                }
            }
        }

        for (name, _) in spec.scalar_parameters() {
            if !provided.contains_key(name) {
                return Err(InstanceError::MissingParameter {
                    class: spec.class_name.clone(),
                    parameter: name.to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
