//! Klass Check Tool
//!
//! Compiles the Klass source trees of a directory and reports diagnostics.
//!
//! Usage: `klass-check <dir> [--config FILE] [--emit-model FILE]`
//!
//! Exits with status 1 when any error is reported.

use anyhow::{bail, Context};
use clap::Parser;
use klass_compiler::{compile_from_dir, CompilerConfig};
use klass_tools::ModelSummary;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "klass-check")]
#[command(about = "Compile a Klass model and report diagnostics")]
struct Args {
    /// Directory holding `*.klass.json` source trees
    dir: PathBuf,

    /// Compiler configuration (defaults to `<dir>/klass.yaml` when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the compiled model as JSON to this file
    #[arg(long)]
    emit_model: Option<PathBuf>,
}

fn main() {
    klass_tools::init_logging();

    let args = Args::parse();
    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            error!("{err:#}");
            process::exit(1);
        }
    }
}

/// Returns whether compilation succeeded.
fn run(args: &Args) -> anyhow::Result<bool> {
    if !args.dir.is_dir() {
        bail!("'{}' is not a directory", args.dir.display());
    }

    let config = args
        .config
        .as_ref()
        .map(|path| {
            CompilerConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))
        })
        .transpose()?;

    info!("Compiling model from: {}", args.dir.display());
    let result = compile_from_dir(&args.dir, config.as_ref())
        .with_context(|| format!("compiling {}", args.dir.display()))?;

    if !result.diagnostics.is_empty() {
        eprintln!("{}", result.format_diagnostics());
    }

    if result.has_errors() {
        error!("compilation failed");
        return Ok(false);
    }

    let Some(model) = result.model.as_ref() else {
        bail!("compilation reported no errors but produced no model");
    };

    let summary = ModelSummary::of(model);
    info!("Successfully compiled model");
    info!("  - Classes: {}", summary.classes);
    info!("  - Interfaces: {}", summary.interfaces);
    info!("  - Enumerations: {}", summary.enumerations);
    info!("  - Associations: {}", summary.associations);
    info!("  - Projections: {}", summary.projections);
    info!("  - Service groups: {}", summary.service_groups);

    if let Some(path) = &args.emit_model {
        let json = serde_json::to_string_pretty(model).context("serializing model")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!("Model written to {}", path.display());
    }
    Ok(true)
}
