//! Projection state.

use super::{
    AssociationEndIdx, ClassifierIdx, ElementCore, EndSignatureIdx, ProjectionIdx, PropertyIdx,
};
use crate::resolution::Resolution;
use klass_ast::foundation::Span;
use klass_ast::syntax::{Ident, ProjectionElementDecl};

/// What a projection reference node navigates through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceIdx {
    /// An association end of a class
    End(AssociationEndIdx),
    /// An end signature of an interface
    Signature(EndSignatureIdx),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionState {
    pub core: ElementCore,
    pub class_ref: Ident,
    /// Filled by the projection phase
    pub classifier: Option<Resolution<ClassifierIdx>>,
    pub children_decl: Vec<ProjectionElementDecl>,
    /// Filled by the projection phase
    pub children: Vec<ProjectionElementState>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionElementState {
    Property {
        name: Ident,
        header: String,
        property: Resolution<PropertyIdx>,
        span: Span,
    },
    Reference {
        name: Ident,
        reference: Resolution<ReferenceIdx>,
        children: Vec<ProjectionElementState>,
        span: Span,
    },
    Projection {
        name: Ident,
        reference: Resolution<ReferenceIdx>,
        projection_name: Ident,
        projection: Resolution<ProjectionIdx>,
        span: Span,
    },
}

impl ProjectionElementState {
    pub fn name(&self) -> &Ident {
        match self {
            ProjectionElementState::Property { name, .. }
            | ProjectionElementState::Reference { name, .. }
            | ProjectionElementState::Projection { name, .. } => name,
        }
    }

    /// Pre-order visit of this element and its nested children.
    pub fn walk(&self, visit: &mut impl FnMut(&ProjectionElementState)) {
        visit(self);
        if let ProjectionElementState::Reference { children, .. } = self {
            for child in children {
                child.walk(visit);
            }
        }
    }
}
