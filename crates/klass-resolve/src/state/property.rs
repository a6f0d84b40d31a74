//! Member state: data-type properties and association end signatures.

use super::{ClassifierIdx, EnumerationIdx};
use crate::resolution::Resolution;
use crate::unit::MacroKind;
use klass_ast::foundation::{ContextKey, Modifier, Multiplicity, PrimitiveType, Span, UnitId};
use klass_ast::syntax::{Ident, ModifierDecl, PropertyType, ValidationDecl};

/// The role a temporal property plays in its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalPart {
    Range,
    From,
    To,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyState {
    pub owner: ClassifierIdx,
    pub name: Ident,
    pub property_type: PropertyType,
    pub type_span: Span,
    /// Set by the classifier phase for enumeration-typed properties
    pub enumeration: Option<Resolution<EnumerationIdx>>,
    pub optional: bool,
    pub modifiers: Vec<ModifierDecl>,
    pub validations: Vec<ValidationDecl>,
    pub ctx: ContextKey,
    pub span: Span,
    /// The inference phase that synthesized this property, if any
    pub inferred: Option<MacroKind>,
}

impl PropertyState {
    pub fn new(
        owner: ClassifierIdx,
        name: Ident,
        property_type: PropertyType,
        ctx: ContextKey,
        span: Span,
    ) -> Self {
        Self {
            owner,
            name,
            property_type,
            type_span: span,
            enumeration: None,
            optional: false,
            modifiers: Vec::new(),
            validations: Vec::new(),
            ctx,
            span,
            inferred: None,
        }
    }

    pub fn unit(&self) -> UnitId {
        self.ctx.unit
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.iter().any(|m| m.modifier == modifier)
    }

    pub fn primitive(&self) -> Option<PrimitiveType> {
        match self.property_type {
            PropertyType::Primitive(primitive) => Some(primitive),
            PropertyType::Enumeration(_) => None,
        }
    }

    pub fn is_key(&self) -> bool {
        self.has_modifier(Modifier::Key)
    }

    pub fn is_id(&self) -> bool {
        self.has_modifier(Modifier::Id)
    }

    pub fn is_private(&self) -> bool {
        self.has_modifier(Modifier::Private)
    }

    /// `Valid` or `System` when the property belongs to a temporal family.
    pub fn temporal_family(&self) -> Option<Modifier> {
        [Modifier::Valid, Modifier::System]
            .into_iter()
            .find(|family| self.has_modifier(*family))
    }

    pub fn temporal_part(&self) -> Option<TemporalPart> {
        self.temporal_family()?;
        Some(if self.has_modifier(Modifier::From) {
            TemporalPart::From
        } else if self.has_modifier(Modifier::To) {
            TemporalPart::To
        } else {
            TemporalPart::Range
        })
    }

    /// Bookkeeping properties that are never expected to be referenced.
    pub fn is_bookkeeping(&self) -> bool {
        self.temporal_family().is_some()
            || self.has_modifier(Modifier::Version)
            || self.modifiers.iter().any(|m| m.modifier.is_audit())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndSignatureState {
    pub owner: ClassifierIdx,
    pub name: Ident,
    pub class_ref: Ident,
    /// Filled by the inheritance phase
    pub target: Option<Resolution<ClassifierIdx>>,
    pub multiplicity: Multiplicity,
    pub modifiers: Vec<ModifierDecl>,
    pub ctx: ContextKey,
    pub span: Span,
}

impl EndSignatureState {
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.iter().any(|m| m.modifier == modifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::KlassIdx;
    use klass_ast::foundation::NodeId;

    fn property(modifiers: &[Modifier]) -> PropertyState {
        let mut state = PropertyState::new(
            ClassifierIdx::Klass(KlassIdx(0)),
            Ident::new("p", Span::zero(0)),
            PropertyType::Primitive(PrimitiveType::TemporalInstant),
            ContextKey::new(UnitId(0), NodeId(1)),
            Span::zero(0),
        );
        state.modifiers = modifiers
            .iter()
            .map(|m| ModifierDecl {
                id: NodeId(2),
                span: Span::zero(0),
                modifier: *m,
            })
            .collect();
        state
    }

    #[test]
    fn test_temporal_part() {
        assert_eq!(property(&[Modifier::Valid]).temporal_part(), Some(TemporalPart::Range));
        assert_eq!(
            property(&[Modifier::System, Modifier::From]).temporal_part(),
            Some(TemporalPart::From)
        );
        assert_eq!(property(&[Modifier::To]).temporal_part(), None);
        assert_eq!(
            property(&[Modifier::System, Modifier::From]).temporal_family(),
            Some(Modifier::System)
        );
    }

    #[test]
    fn test_bookkeeping_properties() {
        assert!(property(&[Modifier::CreatedOn]).is_bookkeeping());
        assert!(property(&[Modifier::Version]).is_bookkeeping());
        assert!(!property(&[Modifier::Private]).is_bookkeeping());
    }
}
