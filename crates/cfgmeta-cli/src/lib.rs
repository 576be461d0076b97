//! cfgmeta command line
//!
//! Argument definitions and dispatch for the `cfgmeta` binary. Kept in a
//! library so the commands can be driven from tests.

#![warn(missing_docs)]

pub mod commands;

use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};

fn path_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

/// Command-line definition
#[must_use]
pub fn build_cli() -> Command {
    Command::new("cfgmeta")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Metamodel-driven configuration checker")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Engine configuration (TOML)"),
        )
        .subcommand(
            Command::new("check-schema")
                .about("Validate a schema and summarize its containment graph")
                .arg(path_arg("schema", "Schema records (.json, .yaml, .yml, .xml)")),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate an instance document against a schema")
                .arg(path_arg("schema", "Schema records (.json, .yaml, .yml, .xml)"))
                .arg(path_arg("instance", "Instance document (JSON)")),
        )
        .subcommand(
            Command::new("skeleton")
                .about("Print the minimal instance document for a schema")
                .arg(path_arg("schema", "Schema records (.json, .yaml, .yml, .xml)")),
        )
        .subcommand(
            Command::new("flatten")
                .about("Print the flat rendering of a valid instance document")
                .arg(path_arg("schema", "Schema records (.json, .yaml, .yml, .xml)"))
                .arg(path_arg("instance", "Instance document (JSON)")),
        )
        .subcommand(
            Command::new("meta")
                .about("Re-emit a validated schema as records")
                .arg(path_arg("schema", "Schema records (.json, .yaml, .yml, .xml)")),
        )
        .subcommand(
            Command::new("diff")
                .about("Compute the delta between two flat configurations")
                .arg(path_arg("before", "Original flat configuration (JSON)"))
                .arg(path_arg("after", "Changed flat configuration (JSON)")),
        )
        .subcommand(
            Command::new("patch")
                .about("Apply a delta to a flat configuration")
                .arg(path_arg("input", "Flat configuration (JSON)"))
                .arg(path_arg("delta", "Delta document (JSON)"))
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Fail unless every deletion and update target exists"),
                ),
        )
}

fn path<'a>(args: &'a ArgMatches, id: &str) -> &'a Path {
    args.get_one::<PathBuf>(id)
        .map_or_else(|| Path::new(""), PathBuf::as_path)
}

/// Run the selected subcommand, returning its output
///
/// # Errors
/// Whatever the subcommand reports
pub fn run(matches: &ArgMatches) -> Result<String> {
    let config_path = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    if let Some((name, _)) = matches.subcommand() {
        tracing::debug!(command = name, config = ?config_path, "running command");
    }

    match matches.subcommand() {
        Some(("check-schema", args)) => commands::check_schema(path(args, "schema")),
        Some(("validate", args)) => {
            let config = commands::load_engine_config(config_path)?;
            commands::validate(path(args, "schema"), path(args, "instance"), config)
        }
        Some(("skeleton", args)) => {
            let config = commands::load_engine_config(config_path)?;
            commands::skeleton_document(path(args, "schema"), &config)
        }
        Some(("flatten", args)) => {
            let config = commands::load_engine_config(config_path)?;
            commands::flatten(path(args, "schema"), path(args, "instance"), config)
        }
        Some(("meta", args)) => commands::meta(path(args, "schema")),
        Some(("diff", args)) => commands::diff(path(args, "before"), path(args, "after")),
        Some(("patch", args)) => commands::patch(
            path(args, "input"),
            path(args, "delta"),
            args.get_flag("strict"),
        ),
        _ => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn global_config_after_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(["cfgmeta", "skeleton", "--schema", "s.json", "--config", "e.toml"])
            .unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("e.toml"))
        );
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "skeleton");
        assert_eq!(path(args, "schema"), Path::new("s.json"));
    }

    #[test]
    fn required_paths_are_enforced() {
        assert!(build_cli()
            .try_get_matches_from(["cfgmeta", "validate", "--schema", "s.json"])
            .is_err());
    }
}
