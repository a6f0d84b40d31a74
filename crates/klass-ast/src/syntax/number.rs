//! Node numbering.
//!
//! Later compiler phases find the state created for a node through its
//! [`ContextKey`](crate::foundation::ContextKey), so every node of a unit
//! needs a distinct [`NodeId`]. Trees deserialized from JSON or produced by
//! the builder are numbered here, in pre-order, starting at 1.
//!
//! The numbering also decides spans:
//!
//! - [`SpanMode::Keep`] leaves spans as they are (parsed trees).
//! - [`SpanMode::Retarget`] keeps offsets and lines but moves every span into
//!   another file (trees loaded from disk get the loader's file id).
//! - [`SpanMode::Lines`] gives each top-level element and each member its
//!   own line in a detached source file (built trees).
//! - [`SpanMode::Anchor`] points every node at one span (macro fragments
//!   point at the declaration that triggered them).

use super::criteria::{CriteriaExpr, ExpressionValue, OrderByDecl, ThisMemberPath};
use super::decl::{
    AssociationEndDecl, Ident, MemberDecl, ModifierDecl, PropertyDecl, PropertyType, SourceTree,
    TopLevelDecl,
};
use super::projection::ProjectionElementDecl;
use super::service::{ParameterDecl, ServiceCriteriaDecl, UrlSegment};
use crate::foundation::{NodeId, Span};

/// How [`Numbering`] treats spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanMode {
    Keep,
    Retarget { file_id: u16 },
    Lines { file_id: u16 },
    Anchor(Span),
}

/// Pre-order id (and optionally span) assignment over syntax trees.
#[derive(Debug)]
pub struct Numbering {
    next: u32,
    line: u16,
    mode: SpanMode,
}

impl Numbering {
    pub fn new(mode: SpanMode) -> Self {
        Self {
            next: 1,
            line: 0,
            mode,
        }
    }

    /// Number of ids handed out so far.
    pub fn assigned(&self) -> u32 {
        self.next - 1
    }

    /// Number a whole source tree.
    pub fn number_tree(&mut self, tree: &mut SourceTree) {
        self.new_line();
        let (id, span) = self.fresh(tree.package.span);
        tree.package.id = id;
        tree.package.span = span;

        for element in &mut tree.elements {
            self.number_top_level(element);
        }
    }

    /// Number a member list spliced into an existing classifier.
    pub fn number_members(&mut self, members: &mut [MemberDecl]) {
        for member in members {
            self.number_member(member);
        }
    }

    /// Number service clauses spliced into an existing service.
    pub fn number_service_criteria(&mut self, clauses: &mut [ServiceCriteriaDecl]) {
        for clause in clauses {
            self.new_line();
            let (id, span) = self.fresh(clause.span);
            clause.id = id;
            clause.span = span;
            clause.keyword_span = self.span_for(clause.keyword_span);
            self.number_criteria(&mut clause.criteria);
        }
    }

    fn new_line(&mut self) {
        self.line = self.line.saturating_add(1);
    }

    fn span_for(&self, existing: Span) -> Span {
        match self.mode {
            SpanMode::Keep => existing,
            SpanMode::Retarget { file_id } => Span { file_id, ..existing },
            SpanMode::Lines { file_id } => Span::new(file_id, 0, 0, self.line),
            SpanMode::Anchor(anchor) => anchor,
        }
    }

    fn fresh(&mut self, existing: Span) -> (NodeId, Span) {
        let id = NodeId(self.next);
        self.next += 1;
        (id, self.span_for(existing))
    }

    fn ident(&self, ident: &mut Ident) {
        ident.span = self.span_for(ident.span);
    }

    fn modifiers(&mut self, modifiers: &mut [ModifierDecl]) {
        for modifier in modifiers {
            let (id, span) = self.fresh(modifier.span);
            modifier.id = id;
            modifier.span = span;
        }
    }

    fn property_type(&self, property_type: &mut PropertyType) {
        if let PropertyType::Enumeration(name) = property_type {
            self.ident(name);
        }
    }

    fn number_top_level(&mut self, element: &mut TopLevelDecl) {
        self.new_line();
        match element {
            TopLevelDecl::Enumeration(decl) => {
                (decl.id, decl.span) = self.fresh(decl.span);
                self.ident(&mut decl.name);
                for literal in &mut decl.literals {
                    self.new_line();
                    (literal.id, literal.span) = self.fresh(literal.span);
                    self.ident(&mut literal.name);
                }
            }
            TopLevelDecl::Interface(decl) => {
                (decl.id, decl.span) = self.fresh(decl.span);
                self.ident(&mut decl.name);
                for name in &mut decl.implements {
                    self.ident(name);
                }
                self.modifiers(&mut decl.modifiers);
                self.number_members(&mut decl.members);
            }
            TopLevelDecl::Class(decl) => {
                (decl.id, decl.span) = self.fresh(decl.span);
                self.ident(&mut decl.name);
                if let Some(abstract_decl) = &mut decl.abstract_decl {
                    abstract_decl.span = self.span_for(abstract_decl.span);
                }
                if let Some(extends) = &mut decl.extends {
                    self.ident(extends);
                }
                for name in &mut decl.implements {
                    self.ident(name);
                }
                self.modifiers(&mut decl.modifiers);
                self.number_members(&mut decl.members);
            }
            TopLevelDecl::Association(decl) => {
                (decl.id, decl.span) = self.fresh(decl.span);
                self.ident(&mut decl.name);
                self.new_line();
                self.number_end(&mut decl.source);
                self.new_line();
                self.number_end(&mut decl.target);
                self.new_line();
                self.number_criteria(&mut decl.relationship);
            }
            TopLevelDecl::Projection(decl) => {
                (decl.id, decl.span) = self.fresh(decl.span);
                self.ident(&mut decl.name);
                self.ident(&mut decl.class_ref);
                self.number_projection_children(&mut decl.children);
            }
            TopLevelDecl::ServiceGroup(decl) => {
                (decl.id, decl.span) = self.fresh(decl.span);
                self.ident(&mut decl.name);
                self.ident(&mut decl.class_ref);
                for url in &mut decl.urls {
                    self.new_line();
                    (url.id, url.span) = self.fresh(url.span);
                    for segment in &mut url.path {
                        match segment {
                            UrlSegment::Constant(name) => self.ident(name),
                            UrlSegment::Parameter(param) => self.number_parameter(param),
                        }
                    }
                    for param in &mut url.query_parameters {
                        self.number_parameter(param);
                    }
                    for service in &mut url.services {
                        self.new_line();
                        (service.id, service.span) = self.fresh(service.span);
                        self.number_service_criteria(&mut service.criteria);
                        if let Some(projection) = &mut service.projection {
                            self.new_line();
                            self.ident(projection);
                        }
                        if let Some(order_by) = &mut service.order_by {
                            self.new_line();
                            self.number_order_by(order_by);
                        }
                    }
                }
            }
        }
    }

    fn number_member(&mut self, member: &mut MemberDecl) {
        self.new_line();
        match member {
            MemberDecl::Property(property) => self.number_property(property),
            MemberDecl::EndSignature(signature) => {
                (signature.id, signature.span) = self.fresh(signature.span);
                self.ident(&mut signature.name);
                self.ident(&mut signature.class_ref);
                self.modifiers(&mut signature.modifiers);
            }
        }
    }

    fn number_property(&mut self, property: &mut PropertyDecl) {
        (property.id, property.span) = self.fresh(property.span);
        self.ident(&mut property.name);
        self.property_type(&mut property.property_type);
        property.type_span = self.span_for(property.type_span);
        self.modifiers(&mut property.modifiers);
        for validation in &mut property.validations {
            (validation.id, validation.span) = self.fresh(validation.span);
        }
    }

    fn number_end(&mut self, end: &mut AssociationEndDecl) {
        (end.id, end.span) = self.fresh(end.span);
        self.ident(&mut end.name);
        self.ident(&mut end.class_ref);
        self.modifiers(&mut end.modifiers);
        if let Some(order_by) = &mut end.order_by {
            self.number_order_by(order_by);
        }
    }

    fn number_parameter(&mut self, param: &mut ParameterDecl) {
        (param.id, param.span) = self.fresh(param.span);
        self.ident(&mut param.name);
        self.property_type(&mut param.parameter_type);
    }

    fn number_order_by(&mut self, order_by: &mut OrderByDecl) {
        (order_by.id, order_by.span) = self.fresh(order_by.span);
        for member in &mut order_by.members {
            (member.id, member.span) = self.fresh(member.span);
            self.number_this_member(&mut member.path);
        }
    }

    fn number_projection_children(&mut self, children: &mut [ProjectionElementDecl]) {
        for child in children {
            self.new_line();
            match child {
                ProjectionElementDecl::Property(p) => {
                    (p.id, p.span) = self.fresh(p.span);
                    self.ident(&mut p.name);
                }
                ProjectionElementDecl::Reference(r) => {
                    (r.id, r.span) = self.fresh(r.span);
                    self.ident(&mut r.name);
                    self.number_projection_children(&mut r.children);
                }
                ProjectionElementDecl::Projection(p) => {
                    (p.id, p.span) = self.fresh(p.span);
                    self.ident(&mut p.name);
                    self.ident(&mut p.projection);
                }
            }
        }
    }

    fn number_this_member(&mut self, path: &mut ThisMemberPath) {
        (path.id, path.span) = self.fresh(path.span);
        for hop in &mut path.hops {
            self.ident(hop);
        }
        self.ident(&mut path.member);
    }

    fn number_criteria(&mut self, criteria: &mut CriteriaExpr) {
        match criteria {
            CriteriaExpr::All(all) => (all.id, all.span) = self.fresh(all.span),
            CriteriaExpr::And(binary) | CriteriaExpr::Or(binary) => {
                (binary.id, binary.span) = self.fresh(binary.span);
                self.number_criteria(&mut binary.left);
                self.number_criteria(&mut binary.right);
            }
            CriteriaExpr::Operator(op) => {
                (op.id, op.span) = self.fresh(op.span);
                self.number_value(&mut op.source);
                op.operator.span = self.span_for(op.operator.span);
                self.number_value(&mut op.target);
            }
            CriteriaExpr::EdgePoint(edge) => {
                (edge.id, edge.span) = self.fresh(edge.span);
                self.number_this_member(&mut edge.member);
            }
        }
    }

    fn number_value(&mut self, value: &mut ExpressionValue) {
        match value {
            ExpressionValue::ThisMember(path) => self.number_this_member(path),
            ExpressionValue::TypeMember(path) => {
                (path.id, path.span) = self.fresh(path.span);
                self.ident(&mut path.class_ref);
                for hop in &mut path.hops {
                    self.ident(hop);
                }
                self.ident(&mut path.member);
            }
            ExpressionValue::Variable(var) => {
                (var.id, var.span) = self.fresh(var.span);
                self.ident(&mut var.name);
            }
            ExpressionValue::Literal(lit) => (lit.id, lit.span) = self.fresh(lit.span),
            ExpressionValue::LiteralList(list) => {
                (list.id, list.span) = self.fresh(list.span);
                for lit in &mut list.values {
                    (lit.id, lit.span) = self.fresh(lit.span);
                }
            }
            ExpressionValue::User(user) => (user.id, user.span) = self.fresh(user.span),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{Multiplicity, PrimitiveType};
    use crate::syntax::builder::{eq, this_member, type_member, TreeBuilder};
    use std::collections::HashSet;

    fn sample_tree() -> SourceTree {
        TreeBuilder::new("sample")
            .class("Question", |c| {
                c.property("id", PrimitiveType::Long, |p| p.key().id())
                    .property("title", PrimitiveType::String, |p| p)
            })
            .class("Answer", |c| {
                c.property("id", PrimitiveType::Long, |p| p.key())
                    .property("questionId", PrimitiveType::Long, |p| p)
            })
            .association(
                "QuestionHasAnswers",
                ("question", "Question", Multiplicity::OneToOne),
                ("answers", "Answer", Multiplicity::ZeroToMany),
                eq(this_member("id"), type_member("Answer.questionId")),
            )
            .into_tree()
    }

    fn collect_ids(tree: &SourceTree) -> Vec<NodeId> {
        let json = serde_json::to_value(tree).unwrap();
        let mut ids = Vec::new();
        collect(&json, &mut ids);
        ids
    }

    fn collect(value: &serde_json::Value, out: &mut Vec<NodeId>) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, child) in map {
                    if key == "id" {
                        if let Some(n) = child.as_u64() {
                            out.push(NodeId(n as u32));
                            continue;
                        }
                    }
                    collect(child, out);
                }
            }
            serde_json::Value::Array(items) => items.iter().for_each(|i| collect(i, out)),
            _ => {}
        }
    }

    #[test]
    fn test_ids_are_unique_and_assigned() {
        let mut tree = sample_tree();
        let mut numbering = Numbering::new(SpanMode::Keep);
        numbering.number_tree(&mut tree);

        let ids = collect_ids(&tree);
        assert_eq!(ids.len() as u32, numbering.assigned());
        assert!(ids.iter().all(|id| id.is_assigned()));
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_line_mode_gives_elements_increasing_lines() {
        let mut tree = sample_tree();
        Numbering::new(SpanMode::Lines { file_id: 3 }).number_tree(&mut tree);

        let lines: Vec<u16> = tree.elements.iter().map(|e| e.span().start_line).collect();
        assert!(lines.windows(2).all(|w| w[0] < w[1]));
        assert!(tree.elements.iter().all(|e| e.span().file_id == 3));
    }

    #[test]
    fn test_retarget_keeps_lines() {
        let mut tree = sample_tree();
        Numbering::new(SpanMode::Lines { file_id: 0 }).number_tree(&mut tree);
        let before: Vec<u16> = tree.elements.iter().map(|e| e.span().start_line).collect();

        Numbering::new(SpanMode::Retarget { file_id: 5 }).number_tree(&mut tree);
        let after: Vec<u16> = tree.elements.iter().map(|e| e.span().start_line).collect();
        assert_eq!(before, after);
        assert!(tree.elements.iter().all(|e| e.span().file_id == 5));
    }

    #[test]
    fn test_anchor_mode_points_everything_at_anchor() {
        let anchor = Span::new(1, 40, 52, 7);
        let mut tree = sample_tree();
        Numbering::new(SpanMode::Anchor(anchor)).number_tree(&mut tree);

        assert!(tree.elements.iter().all(|e| e.span() == anchor));
        assert_eq!(tree.elements[0].name().span, anchor);
    }
}
