//! Service group declarations.
//!
//! ```klass
//! service QuestionResource on Question
//! {
//!     /question/{id: Long[1..1]}?{version: Integer[0..1]}
//!         GET
//!         {
//!             multiplicity: one;
//!             criteria    : this.id == id;
//!             projection  : QuestionSummary;
//!         }
//! }
//! ```

use super::criteria::{CriteriaExpr, OrderByDecl};
use super::decl::{Ident, PropertyType};
use crate::foundation::{Multiplicity, NodeId, ServiceCriteriaKind, ServiceMultiplicity, Span, Verb};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ServiceGroupDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub class_ref: Ident,
    pub urls: Vec<UrlDecl>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UrlDecl {
    pub id: NodeId,
    pub span: Span,
    pub path: Vec<UrlSegment>,
    pub query_parameters: Vec<ParameterDecl>,
    pub services: Vec<ServiceDecl>,
}

impl UrlDecl {
    /// Path and query parameters, path first.
    pub fn parameters(&self) -> impl Iterator<Item = &ParameterDecl> {
        self.path
            .iter()
            .filter_map(|segment| match segment {
                UrlSegment::Parameter(p) => Some(p),
                UrlSegment::Constant(_) => None,
            })
            .chain(self.query_parameters.iter())
    }

    /// The path with every parameter segment replaced by `{}`.
    ///
    /// Two urls of one group collide when their normalized paths are equal.
    pub fn normalized_path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            out.push('/');
            match segment {
                UrlSegment::Constant(name) => out.push_str(&name.name),
                UrlSegment::Parameter(_) => out.push_str("{}"),
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }

    /// Source-like rendering of the path, for diagnostics.
    pub fn display_path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            out.push('/');
            match segment {
                UrlSegment::Constant(name) => out.push_str(&name.name),
                UrlSegment::Parameter(p) => {
                    out.push('{');
                    out.push_str(&p.name.name);
                    out.push('}');
                }
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum UrlSegment {
    Constant(Ident),
    Parameter(ParameterDecl),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParameterDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub parameter_type: PropertyType,
    pub multiplicity: Multiplicity,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ServiceDecl {
    pub id: NodeId,
    pub span: Span,
    pub verb: Verb,
    pub multiplicity: ServiceMultiplicity,
    pub criteria: Vec<ServiceCriteriaDecl>,
    pub projection: Option<Ident>,
    pub order_by: Option<OrderByDecl>,
}

impl ServiceDecl {
    pub fn has_criteria(&self, kind: ServiceCriteriaKind) -> bool {
        self.criteria.iter().any(|c| c.kind == kind)
    }
}

/// One named clause of a service, such as `criteria: this.id == id`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ServiceCriteriaDecl {
    pub id: NodeId,
    pub span: Span,
    pub kind: ServiceCriteriaKind,
    pub keyword_span: Span,
    pub criteria: CriteriaExpr,
}
