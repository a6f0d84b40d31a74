//! Member path resolution shared by criteria and order-by clauses.
//!
//! A path starts at a classifier (`this` or a named one), follows zero or
//! more association ends and ends at a data-type property. Every step is
//! kept as a [`Resolution`], and a failed step makes the rest of the path
//! fail with it, so validation can report the first broken piece.

use super::CompileContext;
use crate::resolution::Resolution;
use crate::state::{
    find_data_type_property, ClassifierIdx, HopState, MemberPathState, PathOrigin,
};
use klass_ast::foundation::{Span, UnitId};
use klass_ast::syntax::{Ident, ThisMemberPath, TypeMemberPath};

pub fn resolve_this_path(
    cx: &CompileContext<'_>,
    this: Resolution<ClassifierIdx>,
    unit: UnitId,
    path: &ThisMemberPath,
) -> MemberPathState {
    resolve_from(cx, PathOrigin::This, this, &path.hops, &path.member, unit, path.span)
}

pub fn resolve_type_path(
    cx: &CompileContext<'_>,
    unit: UnitId,
    path: &TypeMemberPath,
) -> MemberPathState {
    let classifier = cx.registry.find_classifier(&path.class_ref.name);
    resolve_from(
        cx,
        PathOrigin::Type(path.class_ref.clone()),
        classifier,
        &path.hops,
        &path.member,
        unit,
        path.span,
    )
}

fn resolve_from(
    cx: &CompileContext<'_>,
    origin: PathOrigin,
    classifier: Resolution<ClassifierIdx>,
    hops: &[Ident],
    member: &Ident,
    unit: UnitId,
    span: Span,
) -> MemberPathState {
    let mut current = classifier;
    let mut hop_states = Vec::with_capacity(hops.len());
    for hop in hops {
        let end = current.and_then(|c| match c {
            ClassifierIdx::Klass(klass) => cx.state.find_association_end(klass, &hop.name),
            ClassifierIdx::Interface(_) => Resolution::NotFound,
        });
        current = end.and_then(|e| cx.state.association_end(e).target.map(ClassifierIdx::Klass));
        hop_states.push(HopState {
            name: hop.clone(),
            end,
        });
    }
    let property = current
        .and_then(|c| find_data_type_property(&cx.state, cx.state.classifier(c), &member.name));

    MemberPathState {
        origin,
        classifier,
        hops: hop_states,
        member: member.clone(),
        property,
        unit,
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::tests::{analyzed_context, klass_named};
    use crate::resolve::ResolveOptions;
    use klass_ast::foundation::{Multiplicity, PrimitiveType};
    use klass_ast::syntax::builder::{eq, this_member, type_member, TreeBuilder};
    use klass_ast::syntax::ExpressionValue;

    fn tree() -> klass_ast::SourceTree {
        TreeBuilder::new("test")
            .class("Question", |c| {
                c.property("id", PrimitiveType::Long, |p| p.key())
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
            .build(0)
    }

    fn this_path(value: ExpressionValue) -> ThisMemberPath {
        match value {
            ExpressionValue::ThisMember(path) => path,
            other => panic!("not a this path: {other}"),
        }
    }

    #[test]
    fn test_hop_then_member() {
        let options = ResolveOptions::default();
        let cx = analyzed_context(&options, vec![tree()]);
        let answer = klass_named(&cx.state, "Answer");

        let path = resolve_this_path(
            &cx,
            Resolution::Resolved(ClassifierIdx::Klass(answer)),
            UnitId(0),
            &this_path(this_member("question.title")),
        );

        assert!(path.is_resolved());
        assert_eq!(path.hops.len(), 1);
        assert_eq!(cx.state.property(path.property.resolved().unwrap()).name.name, "title");
    }

    #[test]
    fn test_missing_hop_fails_the_member() {
        let options = ResolveOptions::default();
        let cx = analyzed_context(&options, vec![tree()]);
        let answer = klass_named(&cx.state, "Answer");

        let path = resolve_this_path(
            &cx,
            Resolution::Resolved(ClassifierIdx::Klass(answer)),
            UnitId(0),
            &this_path(this_member("author.name")),
        );

        assert!(path.hops[0].end.is_not_found());
        assert!(path.property.is_not_found());
        assert!(path.classifier.is_resolved());
    }
}
