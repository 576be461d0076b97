//! Schema records
//!
//! The on-the-wire shape of a class definition, as supplied by a schema
//! loader:
//!
//! ```json
//! {
//!   "class": "HWE",
//!   "documentation": "Hardware equipment",
//!   "isRoot": false,
//!   "parameters": [ { "name": "RU", "type": "class" } ],
//!   "min": "0",
//!   "max": "42"
//! }
//! ```
//!
//! A `class` parameter targets the class named by its optional `target`
//! field, falling back to the parameter's own name.

use crate::error::{SchemaError, SchemaResult};
use crate::registry::SchemaRegistry;
use crate::spec::{ClassSpec, ParameterKind, ParameterSpec, ScalarKind};
use crate::xml::load_records_xml;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub(crate) const CLASS_TYPE: &str = "class";

/// One parameter entry of a [`ClassRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRecord {
    /// Parameter name
    pub name: String,

    /// `uint32`, `string`, `boolean` or `class`
    #[serde(rename = "type")]
    pub type_name: String,

    /// Explicit target class for `class` parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// One class entry as read from a schema document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Class name
    pub class: String,

    /// Documentation text
    pub documentation: String,

    /// Root marker
    #[serde(rename = "isRoot")]
    pub is_root: bool,

    /// Parameters in display order
    #[serde(default)]
    pub parameters: Vec<ParameterRecord>,

    /// Decimal lower bound, absent = 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,

    /// Decimal upper bound, absent = unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

impl ClassRecord {
    /// Convert into a [`ClassSpec`]
    ///
    /// # Errors
    /// [`SchemaError::InvalidBound`] if `min`/`max` is not a base-10 integer,
    /// [`SchemaError::UnknownParameterType`] for unrecognised parameter types.
    pub fn into_spec(self) -> SchemaResult<ClassSpec> {
        let min_count = parse_bound(&self.class, "min", self.min.as_deref())?;
        let max_count = parse_bound(&self.class, "max", self.max.as_deref())?;

        let parameters = self
            .parameters
            .into_iter()
            .map(|p| {
                let kind = match p.type_name.as_str() {
                    "uint32" => ParameterKind::Scalar(ScalarKind::Uint32),
                    "string" => ParameterKind::Scalar(ScalarKind::String),
                    "boolean" => ParameterKind::Scalar(ScalarKind::Boolean),
                    CLASS_TYPE => ParameterKind::ClassRef(p.target.unwrap_or_else(|| p.name.clone())),
                    other => {
                        return Err(SchemaError::UnknownParameterType {
                            class: self.class.clone(),
                            parameter: p.name,
                            type_name: other.to_string(),
                        })
                    }
                };
                Ok(ParameterSpec { name: p.name, kind })
            })
            .collect::<SchemaResult<Vec<_>>>()?;

        Ok(ClassSpec {
            class_name: self.class,
            documentation: self.documentation,
            is_root: self.is_root,
            parameters,
            min_count,
            max_count,
        })
    }

    /// Render a [`ClassSpec`] back into record form
    ///
    /// `target` is only written when it differs from the parameter name.
    #[must_use]
    pub fn from_spec(spec: &ClassSpec) -> Self {
        let parameters = spec
            .parameters
            .iter()
            .map(|p| match &p.kind {
                ParameterKind::Scalar(kind) => ParameterRecord {
                    name: p.name.clone(),
                    type_name: kind.as_str().to_string(),
                    target: None,
                },
                ParameterKind::ClassRef(target) => ParameterRecord {
                    name: p.name.clone(),
                    type_name: CLASS_TYPE.to_string(),
                    target: (target != &p.name).then(|| target.clone()),
                },
            })
            .collect();

        Self {
            class: spec.class_name.clone(),
            documentation: spec.documentation.clone(),
            is_root: spec.is_root,
            parameters,
            min: spec.min_count.map(|v| v.to_string()),
            max: spec.max_count.map(|v| v.to_string()),
        }
    }
}

/// Strict base-10 parse; surrounding whitespace is rejected
pub(crate) fn parse_bound(
    class: &str,
    field: &'static str,
    raw: Option<&str>,
) -> SchemaResult<Option<u32>> {
    raw.map(|value| {
        value.parse::<u32>().map_err(|_| SchemaError::InvalidBound {
            class: class.to_string(),
            field,
            value: value.to_string(),
        })
    })
    .transpose()
}

/// Parse a JSON array of class records
///
/// # Errors
/// [`SchemaError::Parse`] on malformed input
pub fn load_records_json(content: &str) -> SchemaResult<Vec<ClassRecord>> {
    serde_json::from_str(content).map_err(|e| SchemaError::Parse(format!("JSON: {e}")))
}

/// Parse a YAML sequence of class records
///
/// # Errors
/// [`SchemaError::Parse`] on malformed input
pub fn load_records_yaml(content: &str) -> SchemaResult<Vec<ClassRecord>> {
    serde_yaml::from_str(content).map_err(|e| SchemaError::Parse(format!("YAML: {e}")))
}

/// Read class records from a `.json`, `.yaml`, `.yml` or `.xml` file
///
/// # Errors
/// IO, format, and parse errors
pub fn load_records_path(path: impl AsRef<Path>) -> SchemaResult<Vec<ClassRecord>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let content = std::fs::read_to_string(path).map_err(|e| SchemaError::io_error(path, e))?;

    match extension.as_str() {
        "json" => load_records_json(&content),
        "yaml" | "yml" => load_records_yaml(&content),
        "xml" => load_records_xml(&content),
        other => Err(SchemaError::UnsupportedFormat(other.to_string())),
    }
}

impl SchemaRegistry {
    /// Convert records and build the registry
    ///
    /// # Errors
    /// Conversion errors for the first bad record, then any build error
    pub fn from_records(records: impl IntoIterator<Item = ClassRecord>) -> SchemaResult<Self> {
        let specs = records
            .into_iter()
            .map(ClassRecord::into_spec)
            .collect::<SchemaResult<Vec<_>>>()?;
        Self::build(specs)
    }

    /// Load and build from a schema file
    ///
    /// # Errors
    /// See [`load_records_path`] and [`SchemaRegistry::build`]
    pub fn from_path(path: impl AsRef<Path>) -> SchemaResult<Self> {
        Self::from_records(load_records_path(path)?)
    }

    /// Registry contents as records, in input order
    #[must_use]
    pub fn to_records(&self) -> Vec<ClassRecord> {
        self.classes().map(ClassRecord::from_spec).collect()
    }
}
