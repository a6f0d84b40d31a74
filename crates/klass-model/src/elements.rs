//! Records of the model arenas.

use crate::criteria::{Criteria, OrderBy};
use crate::ids::{
    AssociationEndId, AssociationId, ClassifierId, EndSignatureId, EnumerationId, InterfaceId,
    KlassId, PropertyId,
};
use klass_ast::foundation::{
    InheritanceType, Modifier, Multiplicity, PrimitiveType, Span, ValidationKind,
};
use serde::{Deserialize, Serialize};

/// Data shared by all top-level elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub name: String,
    pub package: String,
    /// Position in declaration order across the whole model
    pub ordinal: u32,
    /// Name of the compilation unit that declared the element
    pub source_name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enumeration {
    pub info: ElementInfo,
    pub literals: Vec<EnumerationLiteral>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerationLiteral {
    pub name: String,
    pub pretty_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub info: ElementInfo,
    pub modifiers: Vec<Modifier>,
    /// Directly implemented interfaces, in declaration order
    pub interfaces: Vec<InterfaceId>,
    pub declared_properties: Vec<PropertyId>,
    /// Declared then inherited, deduplicated by name
    pub properties: Vec<PropertyId>,
    pub end_signatures: Vec<EndSignatureId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Klass {
    pub info: ElementInfo,
    pub is_user: bool,
    pub is_abstract: bool,
    pub inheritance: Option<InheritanceType>,
    pub superclass: Option<KlassId>,
    pub modifiers: Vec<Modifier>,
    pub interfaces: Vec<InterfaceId>,
    pub declared_properties: Vec<PropertyId>,
    /// Declared then inherited, deduplicated by name
    pub properties: Vec<PropertyId>,
    pub end_signatures: Vec<EndSignatureId>,
    /// Association ends navigable from this class
    pub association_ends: Vec<AssociationEndId>,
    pub version_end: Option<AssociationEndId>,
    pub versioned_end: Option<AssociationEndId>,
}

impl Klass {
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_transient(&self) -> bool {
        self.has_modifier(Modifier::Transient)
    }
}

/// Type of a data-type property or url parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Primitive(PrimitiveType),
    Enumeration(EnumerationId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub kind: ValidationKind,
    pub value: i64,
}

/// A primitive or enumeration typed member of a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTypeProperty {
    pub name: String,
    pub owner: ClassifierId,
    pub data_type: DataType,
    pub optional: bool,
    pub modifiers: Vec<Modifier>,
    pub validations: Vec<Validation>,
    pub span: Span,
}

impl DataTypeProperty {
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
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

    pub fn primitive(&self) -> Option<PrimitiveType> {
        match self.data_type {
            DataType::Primitive(primitive) => Some(primitive),
            DataType::Enumeration(_) => None,
        }
    }
}

/// A reference-typed member declared in a classifier body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndSignature {
    pub name: String,
    pub owner: ClassifierId,
    pub target: ClassifierId,
    pub multiplicity: Multiplicity,
    pub modifiers: Vec<Modifier>,
    pub span: Span,
}

/// Whether an association's relationship is a plain key join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    /// Equalities between this-members and members of the opposite class
    Direct,
    /// Anything else, kept as a checked predicate
    Predicate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub info: ElementInfo,
    pub source: AssociationEndId,
    pub target: AssociationEndId,
    pub criteria: Criteria,
    pub join: JoinKind,
}

/// One end of an association.
///
/// The end is navigable from `owner` and yields instances of `target`.
/// The source end of an association is owned by the target end's class and
/// the other way around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationEnd {
    pub name: String,
    pub association: AssociationId,
    pub owner: KlassId,
    pub target: KlassId,
    pub multiplicity: Multiplicity,
    pub modifiers: Vec<Modifier>,
    pub order_by: Option<OrderBy>,
    pub opposite: AssociationEndId,
    pub span: Span,
}

impl AssociationEnd {
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_owned(&self) -> bool {
        self.has_modifier(Modifier::Owned)
    }
}

/// A foreign-key property paired with the key property it matches.
///
/// `foreign_key` is declared on (or inherited by) the owner of `end`, a
/// to-one end whose target owns `key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub end: AssociationEndId,
    pub foreign_key: PropertyId,
    pub key: PropertyId,
}
