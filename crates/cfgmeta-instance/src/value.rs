//! Typed scalar values bound on instance nodes

use cfgmeta_schema::ScalarKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime value of a scalar parameter
///
/// Serialized untagged, so JSON `7`, `"7"` and `true` map to `Uint32`,
/// `String` and `Boolean` respectively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// Unsigned 32-bit integer
    Uint32(u32),

    /// UTF-8 string
    String(String),

    /// Boolean flag
    Boolean(bool),
}

impl ScalarValue {
    /// Runtime kind of this value
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ScalarKind {
        match self {
            ScalarValue::Uint32(_) => ScalarKind::Uint32,
            ScalarValue::String(_) => ScalarKind::String,
            ScalarValue::Boolean(_) => ScalarKind::Boolean,
        }
    }

    /// Zero value for `kind`
    #[must_use]
    pub fn default_for(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Uint32 => ScalarValue::Uint32(0),
            ScalarKind::String => ScalarValue::String(String::new()),
            ScalarKind::Boolean => ScalarValue::Boolean(false),
        }
    }

    /// JSON rendering
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ScalarValue::Uint32(v) => serde_json::Value::from(*v),
            ScalarValue::String(v) => serde_json::Value::from(v.as_str()),
            ScalarValue::Boolean(v) => serde_json::Value::from(*v),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Uint32(v) => write!(f, "{v}"),
            ScalarValue::String(v) => write!(f, "\"{v}\""),
            ScalarValue::Boolean(v) => write!(f, "{v}"),
        }
    }
}

impl From<u32> for ScalarValue {
    fn from(value: u32) -> Self {
        ScalarValue::Uint32(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::String(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::String(value.to_string())
    }
}

/// Scalar values of one node, keyed by parameter name
pub type Values = IndexMap<String, ScalarValue>;

/// Build [`Values`] from name/value pairs
pub fn values<I, K, V>(pairs: I) -> Values
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ScalarValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
