//! primgen CLI — resolve which capabilities get generated for which axis
//! combinations.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use manifest::PrimgenManifest;

#[derive(Parser)]
#[command(name = "primgen", version, about = "Capability resolver for primitive collection generation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new primgen project
    Init {
        /// Project name
        name: String,
    },
    /// Seed and resolve the capability graph, then emit the enablement matrix
    Resolve {
        /// Settings file (.toml or .json; default: from primgen.toml)
        #[arg(long)]
        settings: Option<String>,
        /// Capability catalog (default: from primgen.toml, else built-in)
        #[arg(long)]
        catalog: Option<String>,
        /// Output format (text, json)
        #[arg(long)]
        format: Option<String>,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },
    /// Write a settings file with every configurable scope filled in
    Scaffold {
        /// Destination (default: the project's settings file)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show the settings lookups and final state of one capability
    Explain {
        /// Capability label (e.g. Map, Map.HashMap.LinkedHashMap)
        capability: String,
        /// Key axis tag
        #[arg(long)]
        key: String,
        /// Value axis tag (two-axis capabilities only)
        #[arg(long)]
        value: Option<String>,
    },
    /// Validate the catalog and its graph
    Check {
        /// Capability catalog (default: from primgen.toml, else built-in)
        #[arg(long)]
        catalog: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// `RUST_LOG` wins over `-v` when set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { name } => commands::init::run(&name),

        Commands::Resolve {
            settings,
            catalog,
            format,
            output,
        } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::resolve::run(
                &project_dir,
                manifest.as_ref(),
                settings.as_deref(),
                catalog.as_deref(),
                format.as_deref(),
                output.as_deref(),
            )
        }

        Commands::Scaffold { output } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::scaffold::run(&project_dir, manifest.as_ref(), output.as_deref())
        }

        Commands::Explain {
            capability,
            key,
            value,
        } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::explain::run(
                &project_dir,
                manifest.as_ref(),
                &capability,
                &key,
                value.as_deref(),
            )
        }

        Commands::Check { catalog } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::check::run(&project_dir, manifest.as_ref(), catalog.as_deref())
        }
    }
}

/// Try to load a manifest from the current directory upward. Returns (None, None) if not found.
fn load_manifest_optional(
    cwd: &Path,
) -> anyhow::Result<(Option<PrimgenManifest>, Option<PathBuf>)> {
    match PrimgenManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((Some(manifest), Some(dir))),
        None => Ok((None, None)),
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use primgen_core::{AxisTag, EnablementMatrix};
    use primgen_settings::{load_settings, save_settings};

    /// Full workflow: init → check → edit settings → resolve → explain.
    #[test]
    fn init_check_resolve_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("workflow-test");

        // 1. Init
        commands::init::create_project(&project_path, "workflow-test").unwrap();
        let (manifest, project_dir) = load_manifest_optional(&project_path).unwrap();
        let manifest = manifest.unwrap();
        assert_eq!(project_dir.as_deref(), Some(project_path.as_path()));

        // 2. Check
        commands::check::run(&project_path, Some(&manifest), None).unwrap();

        // 3. Turn Object keys off for every Map
        let settings_path = manifest.settings_path(&project_path);
        let mut settings = load_settings(&settings_path).unwrap();
        settings.set_bool(&["Object", "Map", "Enabled"], false).unwrap();
        save_settings(&settings_path, &settings).unwrap();

        // 4. Resolve to the manifest's output path
        commands::resolve::run(&project_path, Some(&manifest), None, None, Some("json"), None)
            .unwrap();
        let out = project_path.join("out/matrix.json");
        let matrix: EnablementMatrix =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();

        use AxisTag::*;
        assert_eq!(matrix.is_enabled("Map", Int, Long), Some(true));
        assert_eq!(matrix.is_enabled("Map", Object, Long), Some(false));
        assert_eq!(matrix.is_enabled("Map.HashMap.LinkedHashMap", Object, Int), Some(false));
        assert_eq!(matrix.is_enabled("Map.HashMap.LinkedHashMap", Int, Object), Some(true));
        assert_eq!(matrix.is_enabled("List", Object, Object), Some(true));
        assert!(matrix.unresolved().is_empty());

        // 5. Explain
        let explanation =
            commands::explain::explain(&project_path, Some(&manifest), "Map", "Object", Some("Int"))
                .unwrap();
        assert!(!explanation.enabled);
    }

    /// Resolution is deterministic for unchanged inputs.
    #[test]
    fn resolve_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("repeat");
        commands::init::create_project(&project_path, "repeat").unwrap();
        let (manifest, _) = PrimgenManifest::find_and_load(&project_path).unwrap().unwrap();

        let a = project_path.join("a.json");
        let b = project_path.join("b.json");
        for out in [&a, &b] {
            commands::resolve::run(
                &project_path,
                Some(&manifest),
                None,
                None,
                Some("json"),
                out.to_str(),
            )
            .unwrap();
        }
        assert_eq!(
            std::fs::read_to_string(&a).unwrap(),
            std::fs::read_to_string(&b).unwrap()
        );
    }

    /// Commands work without a project when given explicit files.
    #[test]
    fn resolve_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("settings.json");
        std::fs::write(&settings, r#"{ "Queue": { "Enabled": true } }"#).unwrap();
        let out = dir.path().join("matrix.json");

        commands::resolve::run(
            dir.path(),
            None,
            settings.to_str(),
            None,
            Some("json"),
            out.to_str(),
        )
        .unwrap();

        let matrix: EnablementMatrix =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(matrix.is_enabled("Queue", AxisTag::Char, AxisTag::Char), Some(true));
        assert_eq!(matrix.is_enabled("Collection", AxisTag::Char, AxisTag::Char), Some(true));
        assert_eq!(matrix.is_enabled("List", AxisTag::Char, AxisTag::Char), Some(false));
    }
}
