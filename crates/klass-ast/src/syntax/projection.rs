//! Projection declarations.
//!
//! ```klass
//! projection QuestionSummary on Question
//! {
//!     title: "Title",
//!     answers:
//!     {
//!         body: "Body",
//!     },
//!     author: UserSummary,
//! }
//! ```

use super::decl::Ident;
use crate::foundation::{NodeId, Span};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectionDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub class_ref: Ident,
    pub children: Vec<ProjectionElementDecl>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ProjectionElementDecl {
    /// Data-type property leaf with its column header
    Property(ProjectionPropertyDecl),
    /// Association end with an inline child list
    Reference(ProjectionReferenceDecl),
    /// Association end rendered through another projection
    Projection(ProjectionRefDecl),
}

impl ProjectionElementDecl {
    pub fn id(&self) -> NodeId {
        match self {
            ProjectionElementDecl::Property(p) => p.id,
            ProjectionElementDecl::Reference(r) => r.id,
            ProjectionElementDecl::Projection(p) => p.id,
        }
    }

    pub fn name(&self) -> &Ident {
        match self {
            ProjectionElementDecl::Property(p) => &p.name,
            ProjectionElementDecl::Reference(r) => &r.name,
            ProjectionElementDecl::Projection(p) => &p.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ProjectionElementDecl::Property(p) => p.span,
            ProjectionElementDecl::Reference(r) => r.span,
            ProjectionElementDecl::Projection(p) => p.span,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectionPropertyDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub header: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectionReferenceDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub children: Vec<ProjectionElementDecl>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectionRefDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub projection: Ident,
}
