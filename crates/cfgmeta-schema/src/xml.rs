//! XML model import
//!
//! Reads the modelling tool's export format into [`ClassRecord`]s:
//!
//! ```xml
//! <Model>
//!   <Class name="BTS" isRoot="true" documentation="Base transceiver station">
//!     <Attribute name="id" type="uint32"/>
//!   </Class>
//!   <Class name="HWE" isRoot="false" documentation="Hardware equipment"/>
//!   <Aggregation source="HWE" target="BTS" sourceMultiplicity="0..42" targetMultiplicity="1"/>
//! </Model>
//! ```
//!
//! An aggregation makes `source` a containment slot of `target`, appended
//! after the target's attributes. `sourceMultiplicity` (`min..max`, a single
//! value, `*` for unbounded) becomes the source class's bounds.

use crate::error::{SchemaError, SchemaResult};
use crate::record::{parse_bound, ClassRecord, ParameterRecord, CLASS_TYPE};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;

const UNBOUNDED: &str = "*";

struct Aggregation {
    source: String,
    target: String,
    multiplicity: String,
}

fn xml_error(err: impl std::fmt::Display) -> SchemaError {
    SchemaError::Parse(format!("XML: {err}"))
}

fn attributes(element: &BytesStart<'_>) -> SchemaResult<HashMap<String, String>> {
    element
        .attributes()
        .map(|attr| {
            let attr = attr.map_err(xml_error)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(xml_error)?.into_owned();
            Ok((key, value))
        })
        .collect()
}

fn required(attrs: &mut HashMap<String, String>, element: &str, name: &str) -> SchemaResult<String> {
    attrs
        .remove(name)
        .ok_or_else(|| xml_error(format!("<{element}> without '{name}'")))
}

/// Split a multiplicity into validated `(min, max)` record strings
fn multiplicity_bounds(class: &str, raw: &str) -> SchemaResult<(String, Option<String>)> {
    let (low, high) = raw.split_once("..").unwrap_or((raw, raw));
    let min = parse_bound(class, "min", Some(low))?.unwrap_or_default();
    let max = if high == UNBOUNDED {
        None
    } else {
        parse_bound(class, "max", Some(high))?
    };
    Ok((min.to_string(), max.map(|m| m.to_string())))
}

/// Parse an XML class model into records, classes in document order
///
/// # Errors
/// - [`SchemaError::Parse`] for malformed XML, missing `name`/`type`/`source`/
///   `target` attributes, or an aggregation into an undeclared class
/// - [`SchemaError::InvalidBound`] for a multiplicity that is not `min..max`,
///   a single base-10 value, or `*` as the upper bound
/// - [`SchemaError::ConflictingMultiplicity`] if one class is aggregated with
///   two different multiplicities
pub fn load_records_xml(content: &str) -> SchemaResult<Vec<ClassRecord>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut records: Vec<ClassRecord> = Vec::new();
    let mut aggregations = Vec::new();
    let mut open_class: Option<usize> = None;

    loop {
        let (element, empty) = match reader.read_event().map_err(xml_error)? {
            Event::Start(element) => (element, false),
            Event::Empty(element) => (element, true),
            Event::End(element) => {
                if element.local_name().as_ref() == b"Class" {
                    open_class = None;
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        let mut attrs = attributes(&element)?;
        match element.local_name().as_ref() {
            b"Class" => {
                records.push(ClassRecord {
                    class: required(&mut attrs, "Class", "name")?,
                    documentation: attrs.remove("documentation").unwrap_or_default(),
                    is_root: attrs
                        .get("isRoot")
                        .is_some_and(|v| v.eq_ignore_ascii_case("true")),
                    parameters: Vec::new(),
                    min: None,
                    max: None,
                });
                if !empty {
                    open_class = Some(records.len() - 1);
                }
            }
            b"Attribute" => {
                if let Some(index) = open_class {
                    let parameter = ParameterRecord {
                        name: required(&mut attrs, "Attribute", "name")?,
                        type_name: required(&mut attrs, "Attribute", "type")?,
                        target: None,
                    };
                    records[index].parameters.push(parameter);
                }
            }
            b"Aggregation" => aggregations.push(Aggregation {
                source: required(&mut attrs, "Aggregation", "source")?,
                target: required(&mut attrs, "Aggregation", "target")?,
                multiplicity: required(&mut attrs, "Aggregation", "sourceMultiplicity")?,
            }),
            _ => {}
        }
    }

    let positions: HashMap<String, usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.class.clone(), i))
        .collect();
    let mut seen_multiplicity: HashMap<String, String> = HashMap::new();

    for aggregation in aggregations {
        let parent = *positions.get(&aggregation.target).ok_or_else(|| {
            xml_error(format!(
                "aggregation into undeclared class '{}'",
                aggregation.target
            ))
        })?;
        records[parent].parameters.push(ParameterRecord {
            name: aggregation.source.clone(),
            type_name: CLASS_TYPE.to_string(),
            target: None,
        });

        // Undeclared sources surface as UnresolvedClassRef when the registry is built
        let Some(&child) = positions.get(&aggregation.source) else {
            continue;
        };
        if let Some(first) = seen_multiplicity.get(&aggregation.source) {
            if *first != aggregation.multiplicity {
                return Err(SchemaError::ConflictingMultiplicity {
                    class: aggregation.source,
                    first: first.clone(),
                    second: aggregation.multiplicity,
                });
            }
            continue;
        }
        let (min, max) = multiplicity_bounds(&aggregation.source, &aggregation.multiplicity)?;
        records[child].min = Some(min);
        records[child].max = max;
        seen_multiplicity.insert(aggregation.source, aggregation.multiplicity);
    }

    tracing::debug!(
        classes = records.len(),
        aggregations = seen_multiplicity.len(),
        "xml model imported"
    );
    Ok(records)
}
