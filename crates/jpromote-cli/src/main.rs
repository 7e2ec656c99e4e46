use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use glob::Pattern;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use jpromote_core::{
    parse_source, printer, MigrationConfig, MigrationRule, PromoteExperimental, Recipe,
};

const CONFIG_FILE: &str = "jpromote.yaml";

/// jpromote - Promotes Java types out of experimental packages
#[derive(Parser, Debug, Clone)]
#[command(name = "jpromote")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source root to migrate
    #[arg(value_name = "ROOT", default_value = ".")]
    root: PathBuf,

    /// Path to jpromote.yaml configuration file
    #[arg(short, long, value_name = "FILE")]
    project: Option<PathBuf>,

    /// Old package for a single ad-hoc rule (bypasses the config file)
    #[arg(long, value_name = "PACKAGE")]
    old_package: Option<String>,

    /// Destination package for the ad-hoc rule; empty removes the package
    #[arg(long, value_name = "PACKAGE", default_value = "")]
    new_package: String,

    /// Match the old package exactly, ignoring its subpackages
    #[arg(long)]
    non_recursive: bool,

    /// Report what would change without writing any files
    #[arg(long)]
    dry_run: bool,

    /// Print a machine-readable JSON summary to stdout
    #[arg(long)]
    report_json: bool,

    /// Initialize a starter jpromote.yaml
    #[arg(long)]
    init: bool,
}

#[derive(Debug, Serialize)]
struct FileReport {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    moved_to: Option<String>,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    scanned: usize,
    changed: usize,
    moved: usize,
    skipped: usize,
    dry_run: bool,
    files: Vec<FileReport>,
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG=debug for detailed logs, RUST_LOG=info for normal output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    if cli.init {
        MigrationConfig::init_file(Path::new(CONFIG_FILE))?;
        println!("Created {CONFIG_FILE}");
        return Ok(());
    }

    let config = load_config(&cli)?;
    if config.recipes.is_empty() {
        bail!("no migration rules configured; pass --old-package or a --project file");
    }

    let files = collect_files(&cli.root, &config)?;
    info!("Input files: {} file(s)", files.len());

    let outcomes: Vec<Outcome> = files
        .par_iter()
        .map(|relative| process_file(&cli, &config, relative))
        .collect();

    let mut summary = Summary {
        dry_run: cli.dry_run,
        ..Summary::default()
    };
    for outcome in outcomes {
        summary.scanned += 1;
        match outcome {
            Outcome::Unchanged => {}
            Outcome::Skipped { path, reason } => {
                warn!("Skipping {path}: {reason}");
                summary.skipped += 1;
            }
            Outcome::Changed { path, moved_to } => {
                let action = if cli.dry_run { "Would rewrite" } else { "Rewrote" };
                match &moved_to {
                    Some(to) => info!("{action} {path} -> {to}"),
                    None => info!("{action} {path}"),
                }
                summary.changed += 1;
                if moved_to.is_some() {
                    summary.moved += 1;
                }
                summary.files.push(FileReport { path, moved_to });
            }
        }
    }

    info!(
        "Done: {} scanned, {} changed, {} moved, {} skipped",
        summary.scanned, summary.changed, summary.moved, summary.skipped
    );
    if cli.report_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

enum Outcome {
    Unchanged,
    Changed {
        path: String,
        moved_to: Option<String>,
    },
    Skipped {
        path: String,
        reason: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<MigrationConfig> {
    if let Some(old_package) = &cli.old_package {
        let rule = MigrationRule::new(old_package, &cli.new_package, !cli.non_recursive);
        return Ok(MigrationConfig {
            recipes: vec![rule],
            ..MigrationConfig::default()
        });
    }
    let path = match &cli.project {
        Some(path) => path.clone(),
        None => {
            let candidate = cli.root.join(CONFIG_FILE);
            if candidate.exists() {
                candidate
            } else {
                PathBuf::from(CONFIG_FILE)
            }
        }
    };
    MigrationConfig::from_file(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

/// Walk the source root and keep the `.java` files selected by the
/// config's include/exclude globs, as slash-normalized relative paths.
fn collect_files(root: &Path, config: &MigrationConfig) -> anyhow::Result<Vec<String>> {
    let include = compile_patterns(&config.include)?;
    let exclude = compile_patterns(&config.exclude)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = slash_path(relative);
        if !relative.ends_with(".java") {
            continue;
        }
        if !include.iter().any(|p| p.matches(&relative)) {
            continue;
        }
        if exclude.iter().any(|p| p.matches(&relative)) {
            debug!("Excluded {relative}");
            continue;
        }
        files.push(relative);
    }
    files.sort();
    Ok(files)
}

fn compile_patterns(patterns: &[String]) -> anyhow::Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("invalid glob pattern: {p}")))
        .collect()
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Run every configured rule over one file and write the result back,
/// moving the file when its package directory changed.
fn process_file(cli: &Cli, config: &MigrationConfig, relative: &str) -> Outcome {
    let full_path = cli.root.join(relative);
    let source = match fs::read_to_string(&full_path) {
        Ok(source) => source,
        Err(e) => {
            return Outcome::Skipped {
                path: relative.to_string(),
                reason: e.to_string(),
            }
        }
    };
    let mut cu = match parse_source(&source) {
        Ok(cu) => cu,
        Err(e) => {
            return Outcome::Skipped {
                path: relative.to_string(),
                reason: e.to_string(),
            }
        }
    };
    cu.source_path = relative.to_string();

    let mut changed = false;
    for rule in &config.recipes {
        changed |= PromoteExperimental::new(rule.clone()).run(&mut cu);
    }
    if !changed {
        return Outcome::Unchanged;
    }

    let moved_to = (cu.source_path != relative).then(|| cu.source_path.clone());
    if !cli.dry_run {
        if let Err(e) = write_result(cli, relative, &cu.source_path, &printer::print(&cu)) {
            return Outcome::Skipped {
                path: relative.to_string(),
                reason: e.to_string(),
            };
        }
    }
    Outcome::Changed {
        path: relative.to_string(),
        moved_to,
    }
}

fn write_result(cli: &Cli, old_relative: &str, new_relative: &str, text: &str) -> anyhow::Result<()> {
    let new_path = cli.root.join(new_relative);
    if let Some(parent) = new_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&new_path, text)?;
    if new_relative != old_relative {
        fs::remove_file(cli.root.join(old_relative))?;
    }
    Ok(())
}
