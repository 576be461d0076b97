//! Subcommand implementations
//!
//! Each command returns the text to print on success. Errors carry context
//! naming the file involved.

use anyhow::{Context, Result};
use cfgmeta_delta::{parse_flat, ConfigDelta, FlatConfig};
use cfgmeta_instance::{skeleton, EngineConfig, InstanceDraft, InstanceTree};
use cfgmeta_schema::SchemaRegistry;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Read an engine configuration file, or the defaults
///
/// # Errors
/// Unreadable file or malformed TOML
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read engine config {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("invalid engine config {}", path.display()))
}

fn load_registry(path: &Path) -> Result<Arc<SchemaRegistry>> {
    let registry = SchemaRegistry::from_path(path)
        .with_context(|| format!("schema {} rejected", path.display()))?;
    Ok(Arc::new(registry))
}

fn load_tree(schema: &Path, instance: &Path, config: EngineConfig) -> Result<InstanceTree> {
    let registry = load_registry(schema)?;
    let content = fs::read_to_string(instance)
        .with_context(|| format!("failed to read instance {}", instance.display()))?;
    let draft = InstanceDraft::from_json(&content)
        .with_context(|| format!("malformed instance {}", instance.display()))?;
    InstanceTree::create_from_draft(registry, config, draft)
        .with_context(|| format!("instance {} rejected", instance.display()))
}

fn load_flat(path: &Path) -> Result<FlatConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_flat(&content).with_context(|| format!("malformed flat configuration {}", path.display()))
}

fn render_list(items: &[&str]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// Build the registry and summarize it
///
/// # Errors
/// Unreadable or invalid schema
pub fn check_schema(schema: &Path) -> Result<String> {
    let registry = load_registry(schema)?;
    let mut out = String::new();
    writeln!(out, "classes: {}", registry.len())?;
    writeln!(out, "root: {}", registry.root_class().class_name)?;
    writeln!(out, "recursive: {}", render_list(&registry.recursive_classes()))?;
    writeln!(out, "unreachable: {}", render_list(&registry.unreachable_classes()))?;
    Ok(out)
}

/// Commit an instance document against a schema
///
/// # Errors
/// Invalid schema, unreadable instance, or any conformance violation
pub fn validate(schema: &Path, instance: &Path, config: EngineConfig) -> Result<String> {
    let tree = load_tree(schema, instance, config)?;
    Ok(format!("valid: {} nodes\n", tree.len()))
}

/// Minimal instance document for a schema
///
/// # Errors
/// Invalid schema or unsatisfiable mandatory containment
pub fn skeleton_document(schema: &Path, config: &EngineConfig) -> Result<String> {
    let registry = load_registry(schema)?;
    let draft = skeleton(&registry, config).context("cannot generate skeleton")?;
    Ok(draft.to_json_pretty()? + "\n")
}

/// Flat rendering of a validated instance document
///
/// # Errors
/// As [`validate`]
pub fn flatten(schema: &Path, instance: &Path, config: EngineConfig) -> Result<String> {
    let tree = load_tree(schema, instance, config)?;
    Ok(serde_json::to_string_pretty(&tree.flatten())? + "\n")
}

/// Schema re-emitted as records
///
/// # Errors
/// Unreadable or invalid schema
pub fn meta(schema: &Path) -> Result<String> {
    let registry = load_registry(schema)?;
    Ok(serde_json::to_string_pretty(&registry.to_records())? + "\n")
}

/// Delta between two flat configurations
///
/// # Errors
/// Unreadable or malformed inputs
pub fn diff(before: &Path, after: &Path) -> Result<String> {
    let delta = ConfigDelta::compare(&load_flat(before)?, &load_flat(after)?);
    Ok(delta.to_json_pretty()? + "\n")
}

/// Apply a delta to a flat configuration
///
/// # Errors
/// Unreadable or malformed inputs, or in strict mode a delta that does not
/// match the input
pub fn patch(input: &Path, delta: &Path, strict: bool) -> Result<String> {
    let config = load_flat(input)?;
    let content = fs::read_to_string(delta)
        .with_context(|| format!("failed to read delta {}", delta.display()))?;
    let delta_doc = ConfigDelta::from_json(&content)
        .with_context(|| format!("malformed delta {}", delta.display()))?;

    let patched = if strict {
        delta_doc
            .apply_strict(&config)
            .with_context(|| format!("delta {} does not apply", delta.display()))?
    } else {
        delta_doc.apply(&config)
    };
    Ok(serde_json::to_string_pretty(&patched)? + "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_lists_render_as_dash() {
        assert_eq!(render_list(&[]), "-");
        assert_eq!(render_list(&["A", "B"]), "A, B");
    }

    #[test]
    fn missing_engine_config_means_defaults() {
        assert_eq!(load_engine_config(None).unwrap(), EngineConfig::default());
    }
}
