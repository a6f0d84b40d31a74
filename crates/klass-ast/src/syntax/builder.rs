//! In-memory construction of syntax trees.
//!
//! The compiler consumes already-parsed trees. Tests, tools and the
//! inference phases build them with the fluent builders here instead of
//! writing Klass text and re-parsing it.
//!
//! Builders create nodes with [`NodeId::UNASSIGNED`] and placeholder spans.
//! [`TreeBuilder::build`] numbers the finished tree so that every top-level
//! element and member lands on its own line of a detached source file.
//!
//! # Examples
//!
//! ```
//! use klass_ast::foundation::{Multiplicity, PrimitiveType};
//! use klass_ast::syntax::builder::{eq, this_member, type_member, TreeBuilder};
//!
//! let tree = TreeBuilder::new("com.example.stackoverflow")
//!     .class("Question", |c| c.property("id", PrimitiveType::Long, |p| p.key().id()))
//!     .class("Answer", |c| {
//!         c.property("id", PrimitiveType::Long, |p| p.key().id())
//!             .property("questionId", PrimitiveType::Long, |p| p)
//!     })
//!     .association(
//!         "QuestionHasAnswers",
//!         ("question", "Question", Multiplicity::OneToOne),
//!         ("answers", "Answer", Multiplicity::ZeroToMany),
//!         eq(this_member("id"), type_member("Answer.questionId")),
//!     )
//!     .build(0);
//!
//! assert_eq!(tree.elements.len(), 3);
//! ```

use super::criteria::{
    AllCriteria, BinaryCriteria, CriteriaExpr, EdgePointCriteria, ExpressionValue, LiteralDecl,
    LiteralListDecl, OperatorCriteria, OperatorDecl, OrderByDecl, OrderByMemberDecl,
    ThisMemberPath, TypeMemberPath, UserLiteralDecl, VariableRef,
};
use super::decl::{
    AbstractDecl, AssociationDecl, AssociationEndDecl, AssociationEndSignatureDecl, ClassDecl,
    EnumerationDecl, EnumerationLiteralDecl, Ident, InterfaceDecl, MemberDecl, ModifierDecl,
    PackageDecl, PropertyDecl, PropertyType, SourceTree, TopLevelDecl, ValidationDecl,
};
use super::number::{Numbering, SpanMode};
use super::projection::{
    ProjectionDecl, ProjectionElementDecl, ProjectionPropertyDecl, ProjectionRefDecl,
    ProjectionReferenceDecl,
};
use super::service::{
    ParameterDecl, ServiceCriteriaDecl, ServiceDecl, ServiceGroupDecl, UrlDecl, UrlSegment,
};
use crate::foundation::{
    InheritanceType, LiteralValue, Modifier, Multiplicity, NodeId, OperatorKind, PrimitiveType,
    ServiceCriteriaKind, ServiceMultiplicity, SortDirection, Span, ValidationKind, Verb,
};

const PLACEHOLDER: Span = Span {
    file_id: 0,
    start: 0,
    end: 0,
    start_line: 0,
};

fn ident(name: &str) -> Ident {
    Ident::new(name, PLACEHOLDER)
}

fn modifier_decl(modifier: Modifier) -> ModifierDecl {
    ModifierDecl {
        id: NodeId::UNASSIGNED,
        span: PLACEHOLDER,
        modifier,
    }
}

/// Builds one [`SourceTree`].
#[derive(Debug)]
pub struct TreeBuilder {
    tree: SourceTree,
}

impl TreeBuilder {
    pub fn new(package: &str) -> Self {
        Self {
            tree: SourceTree {
                package: PackageDecl {
                    id: NodeId::UNASSIGNED,
                    span: PLACEHOLDER,
                    name: package.to_string(),
                },
                elements: Vec::new(),
            },
        }
    }

    pub fn enumeration(mut self, name: &str, literals: &[&str]) -> Self {
        let literals = literals
            .iter()
            .map(|literal| EnumerationLiteralDecl {
                id: NodeId::UNASSIGNED,
                span: PLACEHOLDER,
                name: ident(literal),
                pretty_name: None,
            })
            .collect();
        self.tree
            .elements
            .push(TopLevelDecl::Enumeration(EnumerationDecl {
                id: NodeId::UNASSIGNED,
                span: PLACEHOLDER,
                name: ident(name),
                literals,
            }));
        self
    }

    pub fn interface(
        mut self,
        name: &str,
        body: impl FnOnce(InterfaceBuilder) -> InterfaceBuilder,
    ) -> Self {
        let built = body(InterfaceBuilder {
            decl: InterfaceDecl {
                id: NodeId::UNASSIGNED,
                span: PLACEHOLDER,
                name: ident(name),
                implements: Vec::new(),
                modifiers: Vec::new(),
                members: Vec::new(),
            },
        });
        self.tree.elements.push(TopLevelDecl::Interface(built.decl));
        self
    }

    pub fn class(self, name: &str, body: impl FnOnce(ClassBuilder) -> ClassBuilder) -> Self {
        self.push_class(name, false, body)
    }

    /// A `user` class.
    pub fn user(self, name: &str, body: impl FnOnce(ClassBuilder) -> ClassBuilder) -> Self {
        self.push_class(name, true, body)
    }

    fn push_class(
        mut self,
        name: &str,
        is_user: bool,
        body: impl FnOnce(ClassBuilder) -> ClassBuilder,
    ) -> Self {
        let built = body(ClassBuilder {
            decl: ClassDecl {
                id: NodeId::UNASSIGNED,
                span: PLACEHOLDER,
                name: ident(name),
                is_user,
                abstract_decl: None,
                extends: None,
                implements: Vec::new(),
                modifiers: Vec::new(),
                members: Vec::new(),
            },
        });
        self.tree.elements.push(TopLevelDecl::Class(built.decl));
        self
    }

    /// An association with plain ends. Ends are `(name, class, multiplicity)`.
    pub fn association(
        self,
        name: &str,
        source: (&str, &str, Multiplicity),
        target: (&str, &str, Multiplicity),
        relationship: CriteriaExpr,
    ) -> Self {
        self.association_with(name, source, target, relationship, |a| a)
    }

    /// An association whose ends carry modifiers or order-by clauses.
    pub fn association_with(
        mut self,
        name: &str,
        source: (&str, &str, Multiplicity),
        target: (&str, &str, Multiplicity),
        relationship: CriteriaExpr,
        ends: impl FnOnce(AssociationBuilder) -> AssociationBuilder,
    ) -> Self {
        let end = |(end_name, class, multiplicity): (&str, &str, Multiplicity)| {
            AssociationEndDecl {
                id: NodeId::UNASSIGNED,
                span: PLACEHOLDER,
                name: ident(end_name),
                class_ref: ident(class),
                multiplicity,
                modifiers: Vec::new(),
                order_by: None,
            }
        };
        let built = ends(AssociationBuilder {
            decl: AssociationDecl {
                id: NodeId::UNASSIGNED,
                span: PLACEHOLDER,
                name: ident(name),
                source: end(source),
                target: end(target),
                relationship,
            },
        });
        self.tree.elements.push(TopLevelDecl::Association(built.decl));
        self
    }

    pub fn projection(
        mut self,
        name: &str,
        class: &str,
        body: impl FnOnce(ProjectionBuilder) -> ProjectionBuilder,
    ) -> Self {
        let built = body(ProjectionBuilder::default());
        self.tree
            .elements
            .push(TopLevelDecl::Projection(ProjectionDecl {
                id: NodeId::UNASSIGNED,
                span: PLACEHOLDER,
                name: ident(name),
                class_ref: ident(class),
                children: built.children,
            }));
        self
    }

    pub fn service_group(
        mut self,
        name: &str,
        class: &str,
        body: impl FnOnce(ServiceGroupBuilder) -> ServiceGroupBuilder,
    ) -> Self {
        let built = body(ServiceGroupBuilder { urls: Vec::new() });
        self.tree
            .elements
            .push(TopLevelDecl::ServiceGroup(ServiceGroupDecl {
                id: NodeId::UNASSIGNED,
                span: PLACEHOLDER,
                name: ident(name),
                class_ref: ident(class),
                urls: built.urls,
            }));
        self
    }

    /// The tree as built, with unassigned ids.
    pub fn into_tree(self) -> SourceTree {
        self.tree
    }

    /// Number the tree, placing it in the detached file `file_id`.
    pub fn build(self, file_id: u16) -> SourceTree {
        let mut tree = self.tree;
        Numbering::new(SpanMode::Lines { file_id }).number_tree(&mut tree);
        tree
    }
}

/// Members shared by classes and interfaces.
macro_rules! member_methods {
    () => {
        pub fn implements(mut self, interface: &str) -> Self {
            self.decl.implements.push(ident(interface));
            self
        }

        pub fn modifier(mut self, modifier: Modifier) -> Self {
            self.decl.modifiers.push(modifier_decl(modifier));
            self
        }

        pub fn property(
            mut self,
            name: &str,
            primitive: PrimitiveType,
            body: impl FnOnce(PropertyBuilder) -> PropertyBuilder,
        ) -> Self {
            self.decl
                .members
                .push(property(name, PropertyType::Primitive(primitive), body));
            self
        }

        pub fn enum_property(
            mut self,
            name: &str,
            enumeration: &str,
            body: impl FnOnce(PropertyBuilder) -> PropertyBuilder,
        ) -> Self {
            self.decl.members.push(property(
                name,
                PropertyType::Enumeration(ident(enumeration)),
                body,
            ));
            self
        }

        pub fn end_signature(
            mut self,
            name: &str,
            class: &str,
            multiplicity: Multiplicity,
        ) -> Self {
            self.decl
                .members
                .push(MemberDecl::EndSignature(AssociationEndSignatureDecl {
                    id: NodeId::UNASSIGNED,
                    span: PLACEHOLDER,
                    name: ident(name),
                    class_ref: ident(class),
                    multiplicity,
                    modifiers: Vec::new(),
                }));
            self
        }
    };
}

#[derive(Debug)]
pub struct InterfaceBuilder {
    decl: InterfaceDecl,
}

impl InterfaceBuilder {
    member_methods!();
}

#[derive(Debug)]
pub struct ClassBuilder {
    decl: ClassDecl,
}

impl ClassBuilder {
    member_methods!();

    pub fn abstract_class(mut self, inheritance: Option<InheritanceType>) -> Self {
        self.decl.abstract_decl = Some(AbstractDecl {
            span: PLACEHOLDER,
            inheritance,
        });
        self
    }

    pub fn extends(mut self, superclass: &str) -> Self {
        self.decl.extends = Some(ident(superclass));
        self
    }
}

/// Builds a property member outside of a classifier body.
pub fn property(
    name: &str,
    property_type: PropertyType,
    body: impl FnOnce(PropertyBuilder) -> PropertyBuilder,
) -> MemberDecl {
    let built = body(PropertyBuilder {
        decl: PropertyDecl {
            id: NodeId::UNASSIGNED,
            span: PLACEHOLDER,
            name: ident(name),
            property_type,
            type_span: PLACEHOLDER,
            optional: false,
            modifiers: Vec::new(),
            validations: Vec::new(),
        },
    });
    MemberDecl::Property(built.decl)
}

#[derive(Debug)]
pub struct PropertyBuilder {
    decl: PropertyDecl,
}

impl PropertyBuilder {
    pub fn optional(mut self) -> Self {
        self.decl.optional = true;
        self
    }

    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.decl.modifiers.push(modifier_decl(modifier));
        self
    }

    pub fn key(self) -> Self {
        self.modifier(Modifier::Key)
    }

    pub fn id(self) -> Self {
        self.modifier(Modifier::Id)
    }

    pub fn private(self) -> Self {
        self.modifier(Modifier::Private)
    }

    pub fn validation(mut self, kind: ValidationKind, value: i64) -> Self {
        self.decl.validations.push(ValidationDecl {
            id: NodeId::UNASSIGNED,
            span: PLACEHOLDER,
            kind,
            value,
        });
        self
    }
}

#[derive(Debug)]
pub struct AssociationBuilder {
    decl: AssociationDecl,
}

impl AssociationBuilder {
    pub fn source_modifier(mut self, modifier: Modifier) -> Self {
        self.decl.source.modifiers.push(modifier_decl(modifier));
        self
    }

    pub fn target_modifier(mut self, modifier: Modifier) -> Self {
        self.decl.target.modifiers.push(modifier_decl(modifier));
        self
    }

    pub fn source_order_by(mut self, order_by: OrderByDecl) -> Self {
        self.decl.source.order_by = Some(order_by);
        self
    }

    pub fn target_order_by(mut self, order_by: OrderByDecl) -> Self {
        self.decl.target.order_by = Some(order_by);
        self
    }
}

#[derive(Debug, Default)]
pub struct ProjectionBuilder {
    children: Vec<ProjectionElementDecl>,
}

impl ProjectionBuilder {
    pub fn property(mut self, name: &str, header: &str) -> Self {
        self.children
            .push(ProjectionElementDecl::Property(ProjectionPropertyDecl {
                id: NodeId::UNASSIGNED,
                span: PLACEHOLDER,
                name: ident(name),
                header: header.to_string(),
            }));
        self
    }

    pub fn reference(
        mut self,
        name: &str,
        body: impl FnOnce(ProjectionBuilder) -> ProjectionBuilder,
    ) -> Self {
        let built = body(ProjectionBuilder::default());
        self.children
            .push(ProjectionElementDecl::Reference(ProjectionReferenceDecl {
                id: NodeId::UNASSIGNED,
                span: PLACEHOLDER,
                name: ident(name),
                children: built.children,
            }));
        self
    }

    pub fn projection_ref(mut self, name: &str, projection: &str) -> Self {
        self.children
            .push(ProjectionElementDecl::Projection(ProjectionRefDecl {
                id: NodeId::UNASSIGNED,
                span: PLACEHOLDER,
                name: ident(name),
                projection: ident(projection),
            }));
        self
    }
}

#[derive(Debug)]
pub struct ServiceGroupBuilder {
    urls: Vec<UrlDecl>,
}

impl ServiceGroupBuilder {
    pub fn url(mut self, body: impl FnOnce(UrlBuilder) -> UrlBuilder) -> Self {
        let built = body(UrlBuilder {
            decl: UrlDecl {
                id: NodeId::UNASSIGNED,
                span: PLACEHOLDER,
                path: Vec::new(),
                query_parameters: Vec::new(),
                services: Vec::new(),
            },
        });
        self.urls.push(built.decl);
        self
    }
}

fn parameter(name: &str, primitive: PrimitiveType, multiplicity: Multiplicity) -> ParameterDecl {
    ParameterDecl {
        id: NodeId::UNASSIGNED,
        span: PLACEHOLDER,
        name: ident(name),
        parameter_type: PropertyType::Primitive(primitive),
        multiplicity,
    }
}

#[derive(Debug)]
pub struct UrlBuilder {
    decl: UrlDecl,
}

impl UrlBuilder {
    /// Constant path segment.
    pub fn segment(mut self, name: &str) -> Self {
        self.decl.path.push(UrlSegment::Constant(ident(name)));
        self
    }

    /// Required path parameter segment.
    pub fn path_param(mut self, name: &str, primitive: PrimitiveType) -> Self {
        self.decl.path.push(UrlSegment::Parameter(parameter(
            name,
            primitive,
            Multiplicity::OneToOne,
        )));
        self
    }

    pub fn query_param(
        mut self,
        name: &str,
        primitive: PrimitiveType,
        multiplicity: Multiplicity,
    ) -> Self {
        self.decl
            .query_parameters
            .push(parameter(name, primitive, multiplicity));
        self
    }

    pub fn service(
        mut self,
        verb: Verb,
        body: impl FnOnce(ServiceBuilder) -> ServiceBuilder,
    ) -> Self {
        let built = body(ServiceBuilder {
            decl: ServiceDecl {
                id: NodeId::UNASSIGNED,
                span: PLACEHOLDER,
                verb,
                multiplicity: ServiceMultiplicity::One,
                criteria: Vec::new(),
                projection: None,
                order_by: None,
            },
        });
        self.decl.services.push(built.decl);
        self
    }
}

#[derive(Debug)]
pub struct ServiceBuilder {
    decl: ServiceDecl,
}

impl ServiceBuilder {
    pub fn many(mut self) -> Self {
        self.decl.multiplicity = ServiceMultiplicity::Many;
        self
    }

    pub fn criteria(mut self, kind: ServiceCriteriaKind, criteria: CriteriaExpr) -> Self {
        self.decl.criteria.push(service_criteria(kind, criteria));
        self
    }

    pub fn projection(mut self, projection: &str) -> Self {
        self.decl.projection = Some(ident(projection));
        self
    }

    pub fn order_by(mut self, order_by: OrderByDecl) -> Self {
        self.decl.order_by = Some(order_by);
        self
    }
}

/// Builds a service clause outside of a service body.
pub fn service_criteria(kind: ServiceCriteriaKind, criteria: CriteriaExpr) -> ServiceCriteriaDecl {
    ServiceCriteriaDecl {
        id: NodeId::UNASSIGNED,
        span: PLACEHOLDER,
        kind,
        keyword_span: PLACEHOLDER,
        criteria,
    }
}

// Criteria helpers

fn split_path(path: &str) -> (Vec<Ident>, Ident) {
    let mut parts: Vec<Ident> = path.split('.').map(ident).collect();
    let member = parts.pop().unwrap_or_else(|| ident(path));
    (parts, member)
}

fn this_path(path: &str) -> ThisMemberPath {
    let (hops, member) = split_path(path);
    ThisMemberPath {
        id: NodeId::UNASSIGNED,
        span: PLACEHOLDER,
        hops,
        member,
    }
}

/// `this.<path>`, where `path` is dot separated: `"version.number"`.
pub fn this_member(path: &str) -> ExpressionValue {
    ExpressionValue::ThisMember(this_path(path))
}

/// `<Class>.<path>`: `"Answer.questionId"`.
pub fn type_member(path: &str) -> ExpressionValue {
    let (class, rest) = path.split_once('.').unwrap_or((path, ""));
    let (hops, member) = split_path(rest);
    ExpressionValue::TypeMember(TypeMemberPath {
        id: NodeId::UNASSIGNED,
        span: PLACEHOLDER,
        class_ref: ident(class),
        hops,
        member,
    })
}

pub fn variable(name: &str) -> ExpressionValue {
    ExpressionValue::Variable(VariableRef {
        id: NodeId::UNASSIGNED,
        span: PLACEHOLDER,
        name: ident(name),
    })
}

fn literal_decl(value: impl Into<LiteralValue>) -> LiteralDecl {
    LiteralDecl {
        id: NodeId::UNASSIGNED,
        span: PLACEHOLDER,
        value: value.into(),
    }
}

pub fn literal(value: impl Into<LiteralValue>) -> ExpressionValue {
    ExpressionValue::Literal(literal_decl(value))
}

pub fn literal_list<T: Into<LiteralValue>>(values: impl IntoIterator<Item = T>) -> ExpressionValue {
    ExpressionValue::LiteralList(LiteralListDecl {
        id: NodeId::UNASSIGNED,
        span: PLACEHOLDER,
        values: values.into_iter().map(literal_decl).collect(),
    })
}

/// The `user` literal.
pub fn user() -> ExpressionValue {
    ExpressionValue::User(UserLiteralDecl {
        id: NodeId::UNASSIGNED,
        span: PLACEHOLDER,
    })
}

pub fn op(kind: OperatorKind, source: ExpressionValue, target: ExpressionValue) -> CriteriaExpr {
    CriteriaExpr::Operator(OperatorCriteria {
        id: NodeId::UNASSIGNED,
        span: PLACEHOLDER,
        source,
        operator: OperatorDecl {
            span: PLACEHOLDER,
            kind,
        },
        target,
    })
}

pub fn eq(source: ExpressionValue, target: ExpressionValue) -> CriteriaExpr {
    op(OperatorKind::Equal, source, target)
}

fn binary(left: CriteriaExpr, right: CriteriaExpr) -> BinaryCriteria {
    BinaryCriteria {
        id: NodeId::UNASSIGNED,
        span: PLACEHOLDER,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn and(left: CriteriaExpr, right: CriteriaExpr) -> CriteriaExpr {
    CriteriaExpr::And(binary(left, right))
}

pub fn or(left: CriteriaExpr, right: CriteriaExpr) -> CriteriaExpr {
    CriteriaExpr::Or(binary(left, right))
}

pub fn all() -> CriteriaExpr {
    CriteriaExpr::All(AllCriteria {
        id: NodeId::UNASSIGNED,
        span: PLACEHOLDER,
    })
}

/// `this.<path> equalsEdgePoint`
pub fn edge_point(path: &str) -> CriteriaExpr {
    CriteriaExpr::EdgePoint(EdgePointCriteria {
        id: NodeId::UNASSIGNED,
        span: PLACEHOLDER,
        member: this_path(path),
    })
}

/// `orderBy` over zero or more `(this path, direction)` pairs.
pub fn order_by(members: &[(&str, SortDirection)]) -> OrderByDecl {
    OrderByDecl {
        id: NodeId::UNASSIGNED,
        span: PLACEHOLDER,
        members: members
            .iter()
            .map(|(path, direction)| OrderByMemberDecl {
                id: NodeId::UNASSIGNED,
                span: PLACEHOLDER,
                path: this_path(path),
                direction: *direction,
            })
            .collect(),
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        LiteralValue::Integer(value)
    }
}

impl From<i32> for LiteralValue {
    fn from(value: i32) -> Self {
        LiteralValue::Integer(i64::from(value))
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        LiteralValue::Floating(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Boolean(value)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_this_member_splits_hops() {
        let ExpressionValue::ThisMember(path) = this_member("version.number") else {
            panic!("expected this member");
        };
        assert_eq!(path.hops.len(), 1);
        assert_eq!(path.hops[0].name, "version");
        assert_eq!(path.member.name, "number");
    }

    #[test]
    fn test_type_member_splits_class() {
        let ExpressionValue::TypeMember(path) = type_member("Answer.question.id") else {
            panic!("expected type member");
        };
        assert_eq!(path.class_ref.name, "Answer");
        assert_eq!(path.hops[0].name, "question");
        assert_eq!(path.member.name, "id");
    }

    #[test]
    fn test_build_numbers_tree() {
        let tree = TreeBuilder::new("example")
            .class("Foo", |c| c.property("id", PrimitiveType::Long, |p| p.key()))
            .build(2);

        assert!(tree.package.id.is_assigned());
        assert_eq!(tree.elements[0].span().file_id, 2);
        let TopLevelDecl::Class(class) = &tree.elements[0] else {
            panic!("expected class");
        };
        assert!(matches!(&class.members[0], MemberDecl::Property(p) if p.id.is_assigned()));
    }

    #[test]
    fn test_criteria_display() {
        let criteria = and(
            eq(this_member("id"), type_member("Answer.questionId")),
            op(OperatorKind::In, this_member("status"), literal_list(["open", "closed"])),
        );
        assert_eq!(
            criteria.to_string(),
            "(this.id == Answer.questionId && this.status in (\"open\", \"closed\"))"
        );
    }

    #[test]
    fn test_url_paths() {
        let tree = TreeBuilder::new("example")
            .service_group("FooResource", "Foo", |g| {
                g.url(|u| {
                    u.segment("foo")
                        .path_param("id", PrimitiveType::Long)
                        .query_param("version", PrimitiveType::Integer, Multiplicity::ZeroToOne)
                })
            })
            .build(0);
        let TopLevelDecl::ServiceGroup(group) = &tree.elements[0] else {
            panic!("expected service group");
        };
        let url = &group.urls[0];
        assert_eq!(url.normalized_path(), "/foo/{}");
        assert_eq!(url.display_path(), "/foo/{id}");
        let names: Vec<_> = url.parameters().map(|p| p.name.name.as_str()).collect();
        assert_eq!(names, vec!["id", "version"]);
    }
}
