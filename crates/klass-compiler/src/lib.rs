// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Klass Compiler
//!
//! Unified entry point for compiling Klass models. Wraps semantic analysis
//! with configuration, source loading and diagnostic reporting.
//!
//! - [`compile`] compiles in-memory source trees.
//! - [`compile_from_dir`] discovers serialized trees on disk and compiles
//!   them with the directory's `klass.yaml`, if any.

pub mod config;
pub mod load;

use std::path::Path;

use klass_ast::syntax::{Numbering, SpanMode};
use klass_ast::{SourceMap, SourceTree, UnitId};
use klass_model::DomainModel;
use klass_resolve::{
    CompilationUnit, CompileError, DiagnosticFormatter, InternalError, Severity,
};
use thiserror::Error;

pub use config::{CompilerConfig, ConfigError, InferenceConfig};
pub use load::{LoadError, LoadedSources};

/// Any failure that prevents a compilation from producing diagnostics.
#[derive(Debug, Error)]
pub enum CompilerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// Outcome of a compilation.
#[derive(Debug)]
pub struct CompilationResult {
    /// Present when no error was reported
    pub model: Option<DomainModel>,
    /// Errors and warnings, sorted by unit and position
    pub diagnostics: Vec<CompileError>,
    /// Source units followed by inferred macro units
    pub units: Vec<CompilationUnit>,
    /// Files the diagnostics' spans point into
    pub sources: SourceMap,
}

impl CompilationResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(CompileError::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &CompileError> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CompileError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// One-line count, e.g. `2 error(s), 1 warning(s)`.
    pub fn summary(&self) -> String {
        format!(
            "{} error(s), {} warning(s)",
            self.errors().count(),
            self.warnings().count()
        )
    }

    /// Diagnostics rendered with source context.
    pub fn format_diagnostics(&self) -> String {
        DiagnosticFormatter::new(&self.sources).format_all(&self.diagnostics)
    }
}

/// Compile named source trees held in memory.
///
/// Each tree gets a detached entry in the result's source map, and its spans
/// are retargeted to that entry.
///
/// # Errors
///
/// Returns [`InternalError`] when a compiler invariant breaks.
pub fn compile(
    trees: Vec<(String, SourceTree)>,
    config: &CompilerConfig,
) -> Result<CompilationResult, InternalError> {
    let mut sources = SourceMap::new();
    let units = trees
        .into_iter()
        .enumerate()
        .map(|(index, (name, mut tree))| {
            let file_id = sources.add_detached(name.clone().into());
            Numbering::new(SpanMode::Retarget { file_id }).number_tree(&mut tree);
            let id = UnitId(u32::try_from(index).unwrap_or(u32::MAX));
            CompilationUnit::from_source(id, name, tree)
        })
        .collect();
    compile_units(units, sources, config)
}

/// Compile every source tree found under `dir`.
///
/// The configuration is read from `dir/klass.yaml` when `config` is `None`.
pub fn compile_from_dir(
    dir: &Path,
    config: Option<&CompilerConfig>,
) -> Result<CompilationResult, CompilerError> {
    let _span = tracing::info_span!("compile_from_dir", dir = %dir.display()).entered();

    let loaded_config;
    let config = match config {
        Some(config) => config,
        None => {
            loaded_config = CompilerConfig::load_or_default(dir)?;
            &loaded_config
        }
    };

    let suffix = config.source_suffix();
    let paths = load::discover_sources(dir, &suffix)?;
    let LoadedSources { units, sources } = load::load_sources(dir, &paths, &suffix)?;
    Ok(compile_units(units, sources, config)?)
}

fn compile_units(
    units: Vec<CompilationUnit>,
    sources: SourceMap,
    config: &CompilerConfig,
) -> Result<CompilationResult, InternalError> {
    let compilation = klass_resolve::compile(units, &config.resolve_options())?;
    let mut result = CompilationResult {
        model: compilation.model,
        diagnostics: compilation.diagnostics,
        units: compilation.units,
        sources,
    };

    if config.warnings_as_errors {
        let mut promoted = 0usize;
        for diagnostic in &mut result.diagnostics {
            if diagnostic.severity == Severity::Warning {
                diagnostic.severity = Severity::Error;
                promoted += 1;
            }
        }
        if promoted > 0 {
            tracing::debug!(promoted, "warnings promoted to errors");
            result.model = None;
        }
    }

    for diagnostic in &result.diagnostics {
        tracing::debug!(
            code = diagnostic.kind.code(),
            severity = %diagnostic.severity,
            source = unit_name(&result.units, diagnostic.unit),
            "{}",
            diagnostic.message
        );
    }
    if !result.diagnostics.is_empty() {
        tracing::warn!("{}", result.summary());
    }
    Ok(result)
}

fn unit_name(units: &[CompilationUnit], unit: Option<UnitId>) -> &str {
    unit.and_then(|id| units.iter().find(|u| u.id == id))
        .map_or("<unknown>", |u| u.source_name.as_str())
}
