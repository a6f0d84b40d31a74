#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Immutable Klass domain model.
//!
//! # Pipeline Position
//!
//! ```text
//! SourceTree -> Compiler phases -> Two-pass assembly -> DomainModel -> Code generators
//!                                                       ^^^^^^^^^^^
//!                                                       YOU ARE HERE
//! ```
//!
//! The model is what code generators consume. It is produced only when
//! compilation reports no errors, it is never mutated afterwards, and it is
//! `Send + Sync` so generators can read it from several threads.
//!
//! Records live in arenas ([`ModelParts`]) and point at each other through
//! typed indices ([`ids`]).

pub mod criteria;
pub mod elements;
pub mod ids;
pub mod model;
pub mod projection;
pub mod service;

pub use criteria::{walk_criteria, Criteria, MemberPath, OrderBy, OrderByMember, Value};
pub use elements::*;
pub use ids::*;
pub use model::{DomainModel, ModelParts};
pub use projection::{Projection, ProjectionElement, ReferenceProperty};
pub use service::{Parameter, Service, ServiceCriteria, ServiceGroup, Url, UrlSegment};
