//! Service group, url, parameter and service state.

use super::{
    CriteriaState, ElementCore, EnumerationIdx, KlassIdx, OrderByState, ParameterIdx,
    ProjectionIdx, ServiceGroupIdx, ServiceIdx, UrlIdx,
};
use crate::resolution::Resolution;
use crate::unit::MacroKind;
use klass_ast::foundation::{
    ContextKey, Multiplicity, ServiceCriteriaKind, ServiceMultiplicity, Span, UnitId, Verb,
};
use klass_ast::syntax::{CriteriaExpr, Ident, OrderByDecl, PropertyType};

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceGroupState {
    pub core: ElementCore,
    pub class_ref: Ident,
    /// Filled by the service phase
    pub klass: Option<Resolution<KlassIdx>>,
    pub urls: Vec<UrlIdx>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UrlSegmentState {
    Constant(String),
    Parameter(ParameterIdx),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UrlState {
    pub group: ServiceGroupIdx,
    pub path: Vec<UrlSegmentState>,
    pub query_parameters: Vec<ParameterIdx>,
    pub services: Vec<ServiceIdx>,
    /// Path with every parameter segment replaced by `{}`
    pub normalized_path: String,
    pub display_path: String,
    pub ctx: ContextKey,
    pub span: Span,
}

impl UrlState {
    /// Path parameters followed by query parameters.
    pub fn parameters(&self) -> Vec<ParameterIdx> {
        self.path
            .iter()
            .filter_map(|segment| match segment {
                UrlSegmentState::Parameter(idx) => Some(*idx),
                UrlSegmentState::Constant(_) => None,
            })
            .chain(self.query_parameters.iter().copied())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterState {
    pub url: UrlIdx,
    pub name: Ident,
    pub parameter_type: PropertyType,
    pub enumeration: Option<Resolution<EnumerationIdx>>,
    pub multiplicity: Multiplicity,
    pub ctx: ContextKey,
    pub span: Span,
}

/// One criteria clause of a service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceClauseState {
    pub kind: ServiceCriteriaKind,
    pub keyword_span: Span,
    pub decl: CriteriaExpr,
    /// Filled by the criteria phase
    pub criteria: Option<CriteriaState>,
    /// Unit the clause was written in
    pub unit: UnitId,
    pub inferred: Option<MacroKind>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceState {
    pub url: UrlIdx,
    pub verb: Verb,
    pub multiplicity: ServiceMultiplicity,
    pub clauses: Vec<ServiceClauseState>,
    pub projection_ref: Option<Ident>,
    /// Filled by the service phase
    pub projection: Option<Resolution<ProjectionIdx>>,
    pub order_by_decl: Option<OrderByDecl>,
    /// Filled by the order-by phase
    pub order_by: Option<OrderByState>,
    pub ctx: ContextKey,
    pub span: Span,
}

impl ServiceState {
    pub fn has_clause(&self, kind: ServiceCriteriaKind) -> bool {
        self.clauses.iter().any(|clause| clause.kind == kind)
    }
}
