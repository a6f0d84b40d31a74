//! Integration test harness for Klass.
//!
//! This crate provides utilities for end-to-end testing of the full
//! compiler pipeline: SourceTree → Analysis → Assembly → DomainModel.

use klass_ast::{SourceTree, UnitId};
use klass_compiler::{compile, CompilationResult, CompilerConfig};
use klass_model::{ClassifierId, DomainModel, KlassId};
use klass_resolve::{analyze, CompilationUnit, CompileContext, ResolveOptions};

/// Test harness wrapping one compilation of in-memory source trees.
pub struct TestHarness {
    result: CompilationResult,
}

impl TestHarness {
    /// Compile trees named `file0.klass`, `file1.klass`, ... with the
    /// default configuration.
    pub fn compile(trees: Vec<SourceTree>) -> Self {
        Self::compile_with(trees, &CompilerConfig::default())
    }

    /// # Panics
    ///
    /// Panics if the compiler reports an internal error.
    pub fn compile_with(trees: Vec<SourceTree>, config: &CompilerConfig) -> Self {
        let named = trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| (format!("file{i}.klass"), tree))
            .collect();
        let result = match compile(named, config) {
            Ok(result) => result,
            Err(err) => panic!("internal compiler error: {err}"),
        };
        Self { result }
    }

    pub fn result(&self) -> &CompilationResult {
        &self.result
    }

    /// Diagnostic codes in report order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.result.diagnostics.iter().map(|d| d.kind.code()).collect()
    }

    /// The model of a compilation that must have succeeded.
    ///
    /// # Panics
    ///
    /// Panics with the formatted diagnostics when no model was produced.
    pub fn model(&self) -> &DomainModel {
        match &self.result.model {
            Some(model) => model,
            None => panic!(
                "compilation failed:\n{}",
                self.result.format_diagnostics()
            ),
        }
    }

    /// # Panics
    ///
    /// Panics if the class does not exist.
    pub fn klass(&self, name: &str) -> KlassId {
        match self.model().find_klass(name) {
            Some(id) => id,
            None => panic!("no class named '{name}'"),
        }
    }

    /// Declared and inherited property names of a class.
    pub fn property_names(&self, class: &str) -> Vec<String> {
        let model = self.model();
        model
            .data_type_properties(ClassifierId::Klass(self.klass(class)))
            .iter()
            .map(|id| model.property(*id).name.clone())
            .collect()
    }
}

/// Run analysis only, keeping the context for registry and state checks.
///
/// # Panics
///
/// Panics if the compiler reports an internal error.
pub fn analyze_trees(options: &ResolveOptions, trees: Vec<SourceTree>) -> CompileContext<'_> {
    let units = trees
        .into_iter()
        .enumerate()
        .map(|(i, tree)| {
            let id = UnitId(u32::try_from(i).unwrap_or(u32::MAX));
            CompilationUnit::from_source(id, format!("file{i}.klass"), tree)
        })
        .collect();
    let mut cx = CompileContext::new(options, units);
    if let Err(err) = analyze(&mut cx) {
        panic!("internal compiler error: {err}");
    }
    cx
}
