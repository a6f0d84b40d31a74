//! Foundation types shared by the syntax tree, the compiler and the model.

pub mod ids;
pub mod span;
pub mod vocabulary;

pub use ids::{ContextKey, NodeId, UnitId};
pub use span::{SourceFile, SourceMap, Span};
pub use vocabulary::*;
