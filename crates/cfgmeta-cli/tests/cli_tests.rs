//! End-to-end command runs over files on disk

use cfgmeta_cli::{build_cli, commands, run};
use cfgmeta_instance::EngineConfig;
use cfgmeta_test_utils::SAMPLE_SCHEMA_JSON;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let workspace = Self {
            dir: TempDir::new().unwrap(),
        };
        workspace.write("schema.json", SAMPLE_SCHEMA_JSON);
        workspace
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        let args: Vec<String> = std::iter::once("cfgmeta".to_string())
            .chain(args.iter().map(|a| {
                a.strip_prefix('@')
                    .map_or_else(|| (*a).to_string(), |name| self.path(name).display().to_string())
            }))
            .collect();
        run(&build_cli().try_get_matches_from(args).unwrap())
    }
}

const INSTANCE: &str = r#"{
    "class": "BTS",
    "values": { "id": 1, "name": "north" },
    "children": {
        "HWE": [
            {
                "class": "HWE",
                "values": { "id": 1 },
                "children": {
                    "RU": [
                        { "class": "RU", "values": { "id": 1, "hwRevision": "A", "ipv4Address": "10.0.0.1" } },
                        { "class": "RU", "values": { "id": 2, "hwRevision": "A", "ipv4Address": "10.0.0.2" } }
                    ]
                }
            }
        ],
        "COMM": [ { "class": "COMM" } ]
    }
}"#;

#[test]
fn check_schema_summarizes_sample() {
    let ws = Workspace::new();
    let out = ws.run(&["check-schema", "--schema", "@schema.json"]).unwrap();
    assert_eq!(
        out,
        "classes: 7\nroot: BTS\nrecursive: -\nunreachable: -\n"
    );
}

#[test]
fn validate_counts_nodes() {
    let ws = Workspace::new();
    ws.write("bts.json", INSTANCE);
    let out = ws
        .run(&["validate", "--schema", "@schema.json", "--instance", "@bts.json"])
        .unwrap();
    assert_eq!(out, "valid: 5 nodes\n");
}

#[test]
fn validate_reports_violations_with_context() {
    let ws = Workspace::new();
    ws.write("bad.json", &INSTANCE.replace("\"id\": 2", "\"id\": 1"));
    let err = ws
        .run(&["validate", "--schema", "@schema.json", "--instance", "@bad.json"])
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("bad.json"));
    assert!(message.contains("identity 1 already used in slot 'RU'"));
}

#[test]
fn engine_config_changes_identity_parameter() {
    let ws = Workspace::new();
    ws.write("bts.json", INSTANCE);
    ws.write("engine.toml", "identity_parameter = \"hwRevision\"\n");
    let err = ws
        .run(&[
            "validate",
            "--config",
            "@engine.toml",
            "--schema",
            "@schema.json",
            "--instance",
            "@bts.json",
        ])
        .unwrap_err();
    assert!(format!("{err:#}").contains("already used"));
}

#[test]
fn skeleton_output_validates() {
    let ws = Workspace::new();
    let skeleton = ws.run(&["skeleton", "--schema", "@schema.json"]).unwrap();
    ws.write("skeleton.json", &skeleton);
    let out = commands::validate(
        &ws.path("schema.json"),
        &ws.path("skeleton.json"),
        EngineConfig::default(),
    )
    .unwrap();
    assert_eq!(out, "valid: 1 nodes\n");
}

#[test]
fn meta_round_trips_the_schema() {
    let ws = Workspace::new();
    let meta = ws.run(&["meta", "--schema", "@schema.json"]).unwrap();
    ws.write("meta.json", &meta);
    let again = ws.run(&["meta", "--schema", "@meta.json"]).unwrap();
    assert_eq!(meta, again);
}

#[test]
fn flatten_diff_patch_pipeline() {
    let ws = Workspace::new();
    ws.write("before.json", INSTANCE);
    ws.write("after.json", &INSTANCE.replace("10.0.0.2", "10.0.0.20"));

    let before = ws
        .run(&["flatten", "--schema", "@schema.json", "--instance", "@before.json"])
        .unwrap();
    let after = ws
        .run(&["flatten", "--schema", "@schema.json", "--instance", "@after.json"])
        .unwrap();
    ws.write("before.flat.json", &before);
    ws.write("after.flat.json", &after);

    let delta = ws
        .run(&["diff", "--before", "@before.flat.json", "--after", "@after.flat.json"])
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&delta).unwrap();
    assert_eq!(parsed["updates"][0]["key"], "BTS/HWE[0]/RU[1].ipv4Address");
    ws.write("delta.json", &delta);

    let patched = ws
        .run(&["patch", "--input", "@before.flat.json", "--delta", "@delta.json", "--strict"])
        .unwrap();
    assert_eq!(patched, after);

    // The same delta no longer applies strictly to its own result
    let err = ws
        .run(&["patch", "--input", "@after.flat.json", "--delta", "@delta.json", "--strict"])
        .unwrap_err();
    assert!(format!("{err:#}").contains("expected"));
}

#[test]
fn missing_files_are_reported() {
    let ws = Workspace::new();
    let err = ws.run(&["check-schema", "--schema", "@nope.json"]).unwrap_err();
    assert!(format!("{err:#}").contains("nope.json"));
}

#[test]
fn xml_model_is_accepted_as_schema() {
    let ws = Workspace::new();
    ws.write(
        "model.xml",
        r#"<Model>
    <Class name="BTS" isRoot="true" documentation="Base transceiver station">
        <Attribute name="id" type="uint32"/>
    </Class>
    <Class name="COMM" isRoot="false" documentation="Communication services"/>
    <Aggregation source="COMM" target="BTS" sourceMultiplicity="1" targetMultiplicity="1"/>
</Model>"#,
    );
    let out = ws.run(&["check-schema", "--schema", "@model.xml"]).unwrap();
    assert_eq!(out, "classes: 2\nroot: BTS\nrecursive: -\nunreachable: -\n");

    let meta = ws.run(&["meta", "--schema", "@model.xml"]).unwrap();
    let records: serde_json::Value = serde_json::from_str(&meta).unwrap();
    assert_eq!(records[1]["min"], "1");
    assert_eq!(records[1]["max"], "1");
}
