//! Typed syntax tree of the Klass language.
//!
//! # Pipeline Position
//!
//! ```text
//! Parser / JSON / Builder -> SourceTree -> Numbering -> Compiler phases -> DomainModel
//!                            ^^^^^^^^^^
//!                            YOU ARE HERE
//! ```
//!
//! Nodes mirror the grammar and carry a [`NodeId`](crate::foundation::NodeId)
//! plus a [`Span`](crate::foundation::Span). Nothing here is resolved: class
//! names, member paths and projection references are plain identifiers.

pub mod builder;
pub mod criteria;
pub mod decl;
pub mod number;
pub mod projection;
pub mod service;
pub mod walk;

pub use criteria::*;
pub use decl::*;
pub use number::{Numbering, SpanMode};
pub use projection::*;
pub use service::*;
