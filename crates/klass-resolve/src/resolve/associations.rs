//! Association phase.
//!
//! Resolves the class each association end points at and makes the end
//! navigable from the class at the opposite end. The relationship criteria
//! are resolved later, once inference has added every property they may
//! name.
//!
//! # Pipeline Position
//!
//! ```text
//! Units → Classifiers → Inheritance → Associations → Inference → ... → Assembly
//!                                     ^^^^^^^^^^^^
//!                                     YOU ARE HERE
//! ```

use super::CompileContext;
use crate::state::TopLevelIdx;

pub fn resolve_associations(cx: &mut CompileContext<'_>) {
    let _span = tracing::debug_span!("resolve_associations").entered();

    // Ordinal order, so each class lists its ends in declaration order
    let associations: Vec<_> = cx
        .state
        .top_level_elements()
        .into_iter()
        .filter_map(|idx| match idx {
            TopLevelIdx::Association(idx) => Some(idx),
            _ => None,
        })
        .collect();

    for association in associations {
        let ends = cx.state.association(association).ends();
        for end in ends {
            let target = cx
                .registry
                .find_klass(&cx.state.association_end(end).class_ref.name);
            cx.state.association_end_mut(end).target = target;
        }
        for end in ends {
            let opposite = cx.state.association_end(end).opposite;
            let owner = cx.state.association_end(opposite).target.resolved();
            cx.state.association_end_mut(end).owner = owner;
            if let Some(owner) = owner {
                cx.state.klass_mut(owner).association_ends.push(end);
            }
        }
        tracing::trace!(
            association = %cx.state.association(association).core.name.name,
            "wired association ends"
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::resolve::tests::analyzed;
    use crate::state::Classifier;
    use klass_ast::foundation::{Multiplicity, PrimitiveType};
    use klass_ast::syntax::builder::{eq, this_member, type_member, TreeBuilder};

    #[test]
    fn test_ends_are_owned_by_the_opposite_class() {
        let tree = TreeBuilder::new("test")
            .class("Question", |c| c.property("id", PrimitiveType::Long, |p| p.key()))
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
            .build(0);
        let outcome = analyzed(vec![tree]);
        let state = &outcome.state;

        let answer = state
            .klass_indices()
            .find(|k| state.klass(*k).name() == "Answer")
            .unwrap();
        let question_end = state.find_association_end(answer, "question").resolved().unwrap();
        let end = state.association_end(question_end);
        assert_eq!(state.klass(end.target.resolved().unwrap()).name(), "Question");
        assert_eq!(end.owner, Some(answer));
        assert_eq!(state.association_end(end.opposite).opposite, question_end);
    }
}
