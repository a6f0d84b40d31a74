//! Resolved projections.

use crate::elements::ElementInfo;
use crate::ids::{AssociationEndId, ClassifierId, EndSignatureId, ProjectionId, PropertyId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub info: ElementInfo,
    pub classifier: ClassifierId,
    pub children: Vec<ProjectionElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectionElement {
    Property {
        name: String,
        header: String,
        property: PropertyId,
    },
    Reference {
        name: String,
        reference: ReferenceProperty,
        children: Vec<ProjectionElement>,
    },
    Projection {
        name: String,
        reference: ReferenceProperty,
        projection: ProjectionId,
    },
}

impl ProjectionElement {
    pub fn name(&self) -> &str {
        match self {
            ProjectionElement::Property { name, .. }
            | ProjectionElement::Reference { name, .. }
            | ProjectionElement::Projection { name, .. } => name,
        }
    }
}

/// Reference member a projection node navigates through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceProperty {
    End(AssociationEndId),
    Signature(EndSignatureId),
}
