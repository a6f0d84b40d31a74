// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Semantic analysis for the Klass DSL
//!
//! This crate takes parsed [`SourceTree`](klass_ast::SourceTree)s, wrapped
//! in [`CompilationUnit`]s, resolves every name, synthesizes the members
//! that temporal and versioned declarations imply, reports semantic errors
//! and warnings, and assembles an immutable
//! [`DomainModel`](klass_model::DomainModel) when the sources are valid.
//!
//! Entry point: [`compile`].

pub mod assembly;
pub mod diagnostics;
pub mod error;
pub mod registry;
pub mod resolution;
pub mod resolve;
pub mod state;
pub mod unit;
pub mod walk;

pub use diagnostics::Diagnostics;
pub use error::{CompileError, DiagnosticFormatter, ErrorKind, InternalError, Severity};
pub use registry::SymbolRegistry;
pub use resolution::Resolution;
pub use resolve::{analyze, compile, Compilation, CompileContext, ResolveOptions};
pub use unit::{CompilationUnit, MacroKind};
