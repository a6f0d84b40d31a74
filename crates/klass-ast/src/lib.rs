#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Klass syntax foundation.
//!
//! This crate holds everything that exists before semantic analysis:
//!
//! - [`foundation`]: spans, source maps, node identity and the keyword
//!   vocabularies shared by every later stage.
//! - [`syntax`]: the typed parse tree, its numbering pass, the criteria walker
//!   and the fluent tree builder.
//!
//! Trees are plain serde values, so a front end can hand them to the compiler
//! as JSON instead of Klass text.

pub mod foundation;
pub mod syntax;

pub use foundation::{ContextKey, NodeId, SourceMap, Span, UnitId};
pub use syntax::SourceTree;
