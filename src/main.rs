//! CLI entry point for the addon index.
//!
//! Provides commands for resolving addon roots, detecting layouts and scanning
//! artifact collections of a project.

use addon_index::{
    AddonRoot, ArtifactKind, IndexError, ProjectIndexer, ProjectLayout, ProjectLayoutDetector,
    RegistrySnapshot, Settings,
};
use anyhow::Context;
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Addon root resolution and artifact registry
#[derive(Parser)]
#[command(
    name = "addon-index",
    version = env!("CARGO_PKG_VERSION"),
    about = "Resolve addon roots and index project artifacts",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize project
    #[command(about = "Set up .addon-index directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings from .addon-index/settings.toml")]
    Config,

    /// List addon roots reachable through declared dependencies
    Addons {
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Folder installed packages live in (overrides config)
        #[arg(long)]
        packages_folder: Option<String>,
    },

    /// List addon roots living inside the project's workspace
    InRepo {
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Detect the directory layout of a project
    Layout {
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Scan artifact collections of a project and its addons
    #[command(
        after_help = "Examples:\n  addon-index scan . --kind component\n  addon-index scan . --kind helper --kind modifier"
    )]
    Scan {
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Artifact kinds to scan (defaults to the configured kinds)
        #[arg(short, long)]
        kind: Vec<String>,
    },

    /// Component completions for a prefix, with addon namespacing applied
    Complete {
        root: PathBuf,

        #[arg(default_value = "")]
        prefix: String,
    },

    /// Run a full resolution pass and print the registry
    Index {
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Files sharing a registry entry with a file
    Related { root: PathBuf, file: PathBuf },
}

#[derive(Serialize)]
struct IndexSummary<'a> {
    root: &'a Path,
    layout: &'a ProjectLayout,
    addon_roots: &'a [AddonRoot],
    skipped_roots: &'a [AddonRoot],
    registry: RegistrySnapshot,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(index_error) = e.downcast_ref::<IndexError>() {
                for suggestion in index_error.recovery_suggestions() {
                    eprintln!("  - {suggestion}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    // RUST_LOG wins over -v flags
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("addon_index=warn"),
        1 => EnvFilter::new("addon_index=info"),
        2 => EnvFilter::new("addon_index=debug"),
        _ => EnvFilter::new("addon_index=trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn project_root(path: &Path) -> Result<PathBuf, IndexError> {
    if !path.is_dir() {
        return Err(IndexError::InvalidRoot {
            path: path.to_path_buf(),
        });
    }
    Ok(path.to_path_buf())
}

fn parse_kinds(raw: &[String]) -> Result<Vec<ArtifactKind>, IndexError> {
    raw.iter()
        .map(|kind| {
            kind.parse::<ArtifactKind>()
                .map_err(|_| IndexError::UnknownKind { kind: kind.clone() })
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .map_err(IndexError::from)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Settings::load().unwrap_or_else(|e| {
            tracing::warn!("configuration error, using defaults: {e}");
            Settings::default()
        }),
    };

    match cli.command {
        Commands::Init { force } => {
            let cwd = std::env::current_dir().context("cannot determine current directory")?;
            let path = Settings::init_config_file(&cwd, force)?;
            println!("Created configuration file at: {}", path.display());
            println!("Edit this file to customize your settings.");
        }

        Commands::Config => {
            println!("{}", toml::to_string_pretty(&settings)?);
        }

        Commands::Addons {
            root,
            packages_folder,
        } => {
            let root = project_root(&root)?;
            if let Some(folder) = packages_folder {
                settings.resolver.packages_folder = folder;
            }
            let indexer = ProjectIndexer::new(Arc::new(settings));
            for addon in indexer.addon_roots(&root) {
                println!("{addon}");
            }
        }

        Commands::InRepo { root } => {
            let root = project_root(&root)?;
            let indexer = ProjectIndexer::new(Arc::new(settings));
            for addon in indexer.in_repo_roots(&root) {
                println!("{addon}");
            }
        }

        Commands::Layout { root } => {
            let root = project_root(&root)?;
            let layout = ProjectLayoutDetector::detect(&root);
            if let Err(e) = ProjectLayoutDetector::try_pod_module_prefix(&root) {
                tracing::debug!("{e} ({})", e.suggestion());
            }
            print_json(&layout)?;
        }

        Commands::Scan { root, kind } => {
            let root = project_root(&root)?;
            if !kind.is_empty() {
                settings.indexing.kinds = parse_kinds(&kind)?;
            }
            let indexer = ProjectIndexer::new(Arc::new(settings));
            print_json(&indexer.index(&root).descriptors)?;
        }

        Commands::Complete { root, prefix } => {
            let root = project_root(&root)?;
            let indexer = ProjectIndexer::new(Arc::new(settings));
            print_json(&indexer.complete_components(&root, &prefix))?;
        }

        Commands::Index { root, json } => {
            let root = project_root(&root)?;
            let indexer = ProjectIndexer::new(Arc::new(settings));
            let report = indexer.index(&root);

            if json {
                print_json(&IndexSummary {
                    root: &report.root,
                    layout: &report.layout,
                    addon_roots: &report.addon_roots,
                    skipped_roots: &report.skipped_roots,
                    registry: report.registry.snapshot(),
                })?;
            } else {
                println!("Project: {}", report.root.display());
                println!("Layout: {}", report.layout);
                println!("Addons scanned: {}", report.addon_roots.len());
                println!("Addons skipped: {}", report.skipped_roots.len());
                println!("Registry entries: {}", report.registry.len());
                for kind in ArtifactKind::ALL {
                    let names = report.registry.names(kind);
                    if !names.is_empty() {
                        println!("  {:<10} {}", kind.label(), names.len());
                    }
                }
            }
        }

        Commands::Related { root, file } => {
            let root = project_root(&root)?;
            let indexer = ProjectIndexer::new(Arc::new(settings));
            for path in indexer.related_files(&root, &file) {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}
