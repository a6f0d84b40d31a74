//! Association state.

use super::{
    AssociationEndIdx, AssociationIdx, CriteriaState, ElementCore, KlassIdx, OrderByState,
    PropertyIdx,
};
use crate::resolution::Resolution;
use klass_ast::foundation::{ContextKey, Modifier, Multiplicity, Span};
use klass_ast::syntax::{CriteriaExpr, Ident, ModifierDecl, OrderByDecl};
use klass_model::JoinKind;

/// A foreign-key property paired with the key it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignKeyState {
    /// The to-one end navigated through the foreign key
    pub end: AssociationEndIdx,
    pub foreign_key: PropertyIdx,
    pub key: PropertyIdx,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationState {
    pub core: ElementCore,
    pub source: AssociationEndIdx,
    pub target: AssociationEndIdx,
    pub relationship_decl: CriteriaExpr,
    /// Filled by the criteria phase
    pub relationship: Option<CriteriaState>,
    /// Filled by join classification
    pub join: Option<JoinKind>,
    pub foreign_keys: Vec<ForeignKeyState>,
}

impl AssociationState {
    pub fn ends(&self) -> [AssociationEndIdx; 2] {
        [self.source, self.target]
    }
}

/// One end of an association.
///
/// An end names the class it points at. It is navigable from the class at
/// the opposite end, which owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationEndState {
    pub name: Ident,
    pub association: AssociationIdx,
    pub is_source: bool,
    pub class_ref: Ident,
    /// The class this end points at
    pub target: Resolution<KlassIdx>,
    /// The class this end is navigable from
    pub owner: Option<KlassIdx>,
    pub multiplicity: Multiplicity,
    pub modifiers: Vec<ModifierDecl>,
    pub order_by_decl: Option<OrderByDecl>,
    /// Filled by the order-by phase
    pub order_by: Option<OrderByState>,
    pub opposite: AssociationEndIdx,
    pub ctx: ContextKey,
    pub span: Span,
}

impl AssociationEndState {
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.iter().any(|m| m.modifier == modifier)
    }
}
