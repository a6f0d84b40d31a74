//! Top-level and member declarations.
//!
//! These are the typed parse-tree nodes for a Klass source file. They hold
//! exactly what the grammar saw: names are unresolved [`Ident`]s and no
//! cross references exist yet. Resolution happens in the compiler phases.

use super::criteria::{CriteriaExpr, OrderByDecl};
use super::projection::ProjectionDecl;
use super::service::ServiceGroupDecl;
use crate::foundation::{
    InheritanceType, Modifier, Multiplicity, NodeId, PrimitiveType, Span, ValidationKind,
};

/// An identifier occurrence with its location.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

/// One parsed source file: a package declaration followed by top-level
/// elements in source order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceTree {
    pub package: PackageDecl,
    pub elements: Vec<TopLevelDecl>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PackageDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
}

/// The six kinds of top-level element. They share one namespace.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TopLevelDecl {
    Enumeration(EnumerationDecl),
    Interface(InterfaceDecl),
    Class(ClassDecl),
    Association(AssociationDecl),
    Projection(ProjectionDecl),
    ServiceGroup(ServiceGroupDecl),
}

impl TopLevelDecl {
    pub fn id(&self) -> NodeId {
        match self {
            TopLevelDecl::Enumeration(d) => d.id,
            TopLevelDecl::Interface(d) => d.id,
            TopLevelDecl::Class(d) => d.id,
            TopLevelDecl::Association(d) => d.id,
            TopLevelDecl::Projection(d) => d.id,
            TopLevelDecl::ServiceGroup(d) => d.id,
        }
    }

    pub fn name(&self) -> &Ident {
        match self {
            TopLevelDecl::Enumeration(d) => &d.name,
            TopLevelDecl::Interface(d) => &d.name,
            TopLevelDecl::Class(d) => &d.name,
            TopLevelDecl::Association(d) => &d.name,
            TopLevelDecl::Projection(d) => &d.name,
            TopLevelDecl::ServiceGroup(d) => &d.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TopLevelDecl::Enumeration(d) => d.span,
            TopLevelDecl::Interface(d) => d.span,
            TopLevelDecl::Class(d) => d.span,
            TopLevelDecl::Association(d) => d.span,
            TopLevelDecl::Projection(d) => d.span,
            TopLevelDecl::ServiceGroup(d) => d.span,
        }
    }

    /// Keyword used in diagnostics ("class", "projection", ...).
    pub fn kind_name(&self) -> &'static str {
        match self {
            TopLevelDecl::Enumeration(_) => "enumeration",
            TopLevelDecl::Interface(_) => "interface",
            TopLevelDecl::Class(d) if d.is_user => "user",
            TopLevelDecl::Class(_) => "class",
            TopLevelDecl::Association(_) => "association",
            TopLevelDecl::Projection(_) => "projection",
            TopLevelDecl::ServiceGroup(_) => "service group",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnumerationDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub literals: Vec<EnumerationLiteralDecl>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnumerationLiteralDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub pretty_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InterfaceDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub implements: Vec<Ident>,
    pub modifiers: Vec<ModifierDecl>,
    pub members: Vec<MemberDecl>,
}

/// `class` or `user` declaration.
///
/// ```klass
/// class Question abstract(table-per-subclass) extends Post implements Audited
///     systemTemporal
/// {
///     id: Long key id;
/// }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClassDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    /// Declared with the `user` keyword instead of `class`
    pub is_user: bool,
    pub abstract_decl: Option<AbstractDecl>,
    pub extends: Option<Ident>,
    pub implements: Vec<Ident>,
    pub modifiers: Vec<ModifierDecl>,
    pub members: Vec<MemberDecl>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AbstractDecl {
    pub span: Span,
    pub inheritance: Option<InheritanceType>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModifierDecl {
    pub id: NodeId,
    pub span: Span,
    pub modifier: Modifier,
}

/// Members of a classifier body.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum MemberDecl {
    Property(PropertyDecl),
    EndSignature(AssociationEndSignatureDecl),
}

impl MemberDecl {
    pub fn name(&self) -> &Ident {
        match self {
            MemberDecl::Property(p) => &p.name,
            MemberDecl::EndSignature(s) => &s.name,
        }
    }
}

/// Primitive or enumeration typed property.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PropertyDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub property_type: PropertyType,
    pub type_span: Span,
    pub optional: bool,
    pub modifiers: Vec<ModifierDecl>,
    pub validations: Vec<ValidationDecl>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum PropertyType {
    Primitive(PrimitiveType),
    Enumeration(Ident),
}

impl PropertyType {
    pub fn type_name(&self) -> &str {
        match self {
            PropertyType::Primitive(p) => p.keyword(),
            PropertyType::Enumeration(name) => name.as_str(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationDecl {
    pub id: NodeId,
    pub span: Span,
    pub kind: ValidationKind,
    pub value: i64,
}

/// Reference-typed member of a classifier body, the interface-friendly
/// counterpart of an association end.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssociationEndSignatureDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub class_ref: Ident,
    pub multiplicity: Multiplicity,
    pub modifiers: Vec<ModifierDecl>,
}

/// ```klass
/// association QuestionHasAnswer
/// {
///     question: Question[1..1];
///     answers: Answer[0..*] owned orderBy: this.ordinal;
///
///     relationship this.id == Answer.questionId
/// }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssociationDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub source: AssociationEndDecl,
    pub target: AssociationEndDecl,
    pub relationship: CriteriaExpr,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssociationEndDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub class_ref: Ident,
    pub multiplicity: Multiplicity,
    pub modifiers: Vec<ModifierDecl>,
    pub order_by: Option<OrderByDecl>,
}
