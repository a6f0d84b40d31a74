//! Resolved service groups.

use crate::criteria::{Criteria, OrderBy};
use crate::elements::{DataType, ElementInfo};
use crate::ids::{KlassId, ParameterId, ProjectionId, ServiceGroupId, ServiceId, UrlId};
use klass_ast::foundation::{Multiplicity, ServiceCriteriaKind, ServiceMultiplicity, Span, Verb};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceGroup {
    pub info: ElementInfo,
    pub klass: KlassId,
    pub urls: Vec<UrlId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Url {
    pub group: ServiceGroupId,
    pub path: Vec<UrlSegment>,
    pub query_parameters: Vec<ParameterId>,
    pub services: Vec<ServiceId>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlSegment {
    Constant(String),
    Parameter(ParameterId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub url: UrlId,
    pub data_type: DataType,
    pub multiplicity: Multiplicity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub url: UrlId,
    pub verb: Verb,
    pub multiplicity: ServiceMultiplicity,
    pub criteria: Vec<ServiceCriteria>,
    pub projection: Option<ProjectionId>,
    pub order_by: Option<OrderBy>,
    pub span: Span,
}

impl Service {
    pub fn criteria_of(&self, kind: ServiceCriteriaKind) -> Option<&ServiceCriteria> {
        self.criteria.iter().find(|c| c.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCriteria {
    pub kind: ServiceCriteriaKind,
    pub criteria: Criteria,
    /// Synthesized by service-criteria inference
    pub inferred: bool,
}
