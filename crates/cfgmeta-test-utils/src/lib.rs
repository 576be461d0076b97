//! Testing utilities for cfgmeta workspace
//!
//! Shared schema fixtures.

#![allow(missing_docs)]

use cfgmeta_schema::{
    load_records_json, ClassRecord, ClassSpec, ParameterSpec, ScalarKind, SchemaRegistry,
};

/// Seven-class base station schema in record form.
///
/// Bounds: MGMT `[0, 100]`, HWE `[0, 42]`, RU `[0, 42]`, everything else
/// unbounded. CPLANE and COMM declare no parameters.
pub const SAMPLE_SCHEMA_JSON: &str = r#"[
    {
        "class": "BTS",
        "documentation": "Base transceiver station",
        "isRoot": true,
        "parameters": [
            { "name": "id", "type": "uint32" },
            { "name": "name", "type": "string" },
            { "name": "MGMT", "type": "class" },
            { "name": "HWE", "type": "class" },
            { "name": "COMM", "type": "class" }
        ]
    },
    {
        "class": "MGMT",
        "documentation": "Management subsystem",
        "isRoot": false,
        "parameters": [
            { "name": "MetricJob", "type": "class" },
            { "name": "CPLANE", "type": "class" }
        ],
        "min": "0",
        "max": "100"
    },
    {
        "class": "MetricJob",
        "documentation": "Perfomance metric job",
        "isRoot": false,
        "parameters": [
            { "name": "id", "type": "uint32" },
            { "name": "isEnabled", "type": "boolean" }
        ]
    },
    {
        "class": "CPLANE",
        "documentation": "Perfomance metric job",
        "isRoot": false,
        "parameters": []
    },
    {
        "class": "HWE",
        "documentation": "Hardware equipment",
        "isRoot": false,
        "parameters": [
            { "name": "id", "type": "uint32" },
            { "name": "RU", "type": "class" }
        ],
        "min": "0",
        "max": "42"
    },
    {
        "class": "RU",
        "documentation": "Radio unit",
        "isRoot": false,
        "parameters": [
            { "name": "id", "type": "uint32" },
            { "name": "hwRevision", "type": "string" },
            { "name": "ipv4Address", "type": "string" }
        ],
        "min": "0",
        "max": "42"
    },
    {
        "class": "COMM",
        "documentation": "Communication services",
        "isRoot": false,
        "parameters": []
    }
]"#;

pub fn sample_records() -> Vec<ClassRecord> {
    load_records_json(SAMPLE_SCHEMA_JSON).unwrap()
}

pub fn sample_registry() -> SchemaRegistry {
    SchemaRegistry::from_records(sample_records()).unwrap()
}

/// ROOT -> FOLDER (recursive via `sub`) -> FILE
pub fn recursive_specs() -> Vec<ClassSpec> {
    vec![
        ClassSpec::new("ROOT")
            .root()
            .with_parameter(ParameterSpec::slot("FOLDER")),
        ClassSpec::new("FOLDER")
            .with_parameter(ParameterSpec::scalar("id", ScalarKind::String))
            .with_parameter(ParameterSpec::class_ref("sub", "FOLDER"))
            .with_parameter(ParameterSpec::slot("FILE")),
        ClassSpec::new("FILE")
            .with_parameter(ParameterSpec::scalar("id", ScalarKind::String))
            .with_parameter(ParameterSpec::scalar("size", ScalarKind::Uint32)),
    ]
}

pub fn recursive_registry() -> SchemaRegistry {
    SchemaRegistry::build(recursive_specs()).unwrap()
}

/// RACK requires between one and two PSU children
pub fn mandatory_specs() -> Vec<ClassSpec> {
    vec![
        ClassSpec::new("SITE")
            .root()
            .with_parameter(ParameterSpec::slot("RACK")),
        ClassSpec::new("RACK")
            .with_parameter(ParameterSpec::scalar("id", ScalarKind::Uint32))
            .with_parameter(ParameterSpec::slot("PSU")),
        ClassSpec::new("PSU")
            .with_parameter(ParameterSpec::scalar("id", ScalarKind::Uint32))
            .with_parameter(ParameterSpec::scalar("redundant", ScalarKind::Boolean))
            .with_bounds(Some(1), Some(2)),
    ]
}

pub fn mandatory_registry() -> SchemaRegistry {
    SchemaRegistry::build(mandatory_specs()).unwrap()
}
