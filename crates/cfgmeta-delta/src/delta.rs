//! Configuration deltas
//!
//! A [`ConfigDelta`] describes how one flat configuration turns into another:
//! keys added, keys deleted, and keys whose value changed. Application order
//! is fixed: deletions, then updates, then additions.

use crate::error::{DeltaError, DeltaResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Flat configuration: key -> JSON value, sorted by key
pub type FlatConfig = BTreeMap<String, serde_json::Value>;

/// Key present only in the newer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Addition {
    /// Added key
    pub key: String,
    /// Its value
    pub value: serde_json::Value,
}

/// Key present in both configurations with different values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Changed key
    pub key: String,
    /// Value before
    pub from: serde_json::Value,
    /// Value after
    pub to: serde_json::Value,
}

/// Difference between two flat configurations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDelta {
    /// Keys to add
    #[serde(default)]
    pub additions: Vec<Addition>,

    /// Keys to remove
    #[serde(default)]
    pub deletions: Vec<String>,

    /// Keys to change
    #[serde(default)]
    pub updates: Vec<Update>,
}

impl ConfigDelta {
    /// Delta turning `before` into `after`
    ///
    /// Every section is sorted by key.
    #[must_use]
    pub fn compare(before: &FlatConfig, after: &FlatConfig) -> Self {
        let mut delta = Self::default();

        for (key, old) in before {
            match after.get(key) {
                None => delta.deletions.push(key.clone()),
                Some(new) if new != old => delta.updates.push(Update {
                    key: key.clone(),
                    from: old.clone(),
                    to: new.clone(),
                }),
                Some(_) => {}
            }
        }

        delta.additions = after
            .iter()
            .filter(|(key, _)| !before.contains_key(*key))
            .map(|(key, value)| Addition {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();

        tracing::debug!(
            additions = delta.additions.len(),
            deletions = delta.deletions.len(),
            updates = delta.updates.len(),
            "configurations compared"
        );
        delta
    }

    /// Apply to `config` leniently
    ///
    /// Deleting an absent key is a no-op; updates and additions overwrite.
    #[must_use]
    pub fn apply(&self, config: &FlatConfig) -> FlatConfig {
        let mut result = config.clone();
        for key in &self.deletions {
            result.remove(key);
        }
        for update in &self.updates {
            result.insert(update.key.clone(), update.to.clone());
        }
        for addition in &self.additions {
            result.insert(addition.key.clone(), addition.value.clone());
        }
        result
    }

    /// Apply to `config`, requiring the delta to match it exactly
    ///
    /// # Errors
    /// - [`DeltaError::ConflictingKey`] if the delta itself is inconsistent
    /// - [`DeltaError::TargetNotFound`] for a deletion or update of an absent key
    /// - [`DeltaError::StaleUpdate`] if an update's `from` differs from the current value
    /// - [`DeltaError::TargetAlreadyExists`] for an addition of a present key
    pub fn apply_strict(&self, config: &FlatConfig) -> DeltaResult<FlatConfig> {
        self.check_consistent()?;

        for key in &self.deletions {
            if !config.contains_key(key) {
                return Err(DeltaError::TargetNotFound {
                    operation: "deletion",
                    key: key.clone(),
                });
            }
        }
        for update in &self.updates {
            let actual = config.get(&update.key).ok_or_else(|| DeltaError::TargetNotFound {
                operation: "update",
                key: update.key.clone(),
            })?;
            if *actual != update.from {
                return Err(DeltaError::StaleUpdate {
                    key: update.key.clone(),
                    expected: update.from.clone(),
                    actual: actual.clone(),
                });
            }
        }
        if let Some(addition) = self.additions.iter().find(|a| config.contains_key(&a.key)) {
            return Err(DeltaError::TargetAlreadyExists(addition.key.clone()));
        }

        Ok(self.apply(config))
    }

    /// No key may appear twice across or within sections
    ///
    /// # Errors
    /// [`DeltaError::ConflictingKey`] naming the first repeated key
    pub fn check_consistent(&self) -> DeltaResult<()> {
        let mut seen = BTreeSet::new();
        let keys = self
            .deletions
            .iter()
            .chain(self.updates.iter().map(|u| &u.key))
            .chain(self.additions.iter().map(|a| &a.key));
        for key in keys {
            if !seen.insert(key.as_str()) {
                return Err(DeltaError::ConflictingKey(key.clone()));
            }
        }
        Ok(())
    }

    /// Total number of changes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.additions.len() + self.deletions.len() + self.updates.len()
    }

    /// Check if the delta changes nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse from JSON
    ///
    /// # Errors
    /// [`DeltaError::Parse`] on malformed input
    pub fn from_json(content: &str) -> DeltaResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Render as pretty JSON
    ///
    /// # Errors
    /// [`DeltaError::Parse`] if serialization fails
    pub fn to_json_pretty(&self) -> DeltaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse a flat configuration document
///
/// # Errors
/// [`DeltaError::Parse`] on malformed JSON, [`DeltaError::NotAnObject`] if
/// the top level is not an object.
pub fn parse_flat(content: &str) -> DeltaResult<FlatConfig> {
    match serde_json::from_str(content)? {
        serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(DeltaError::NotAnObject(kind_of(&other))),
    }
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
