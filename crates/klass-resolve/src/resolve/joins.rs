//! Join classification.
//!
//! An association's relationship is a direct foreign-key join when it is a
//! conjunction of equalities, each comparing one `this` member with one
//! member of the class at the target end, neither path hopping through an
//! association end and every name resolved:
//!
//! ```text
//! this.id == Answer.questionId                          direct
//! this.id == Answer.questionId && Answer.flag == true   predicate
//! this.id == Answer.questionId || ...                   predicate
//! ```
//!
//! `all`, `||` and `equalsEdgePoint` make a join a predicate. A direct join
//! with a to-one end records foreign-key/key property pairs on the class
//! that navigates the to-one end.
//!
//! # Pipeline Position
//!
//! ```text
//! ... → Criteria → Joins → Duplicates → Names → Validation → Assembly
//!                  ^^^^^
//!                  YOU ARE HERE
//! ```

use super::CompileContext;
use crate::resolution::Resolution;
use crate::state::{
    AssociationIdx, ClassifierIdx, CriteriaState, ForeignKeyState, PropertyIdx, ValueState,
};
use klass_ast::foundation::OperatorKind;
use klass_model::JoinKind;

pub fn classify_joins(cx: &mut CompileContext<'_>) {
    let _span = tracing::debug_span!("classify_joins").entered();

    for association in cx.state.association_indices().collect::<Vec<_>>() {
        let state = cx.state.association(association);
        let Some(criteria) = &state.relationship else {
            continue;
        };
        let opposite = cx
            .state
            .association_end(state.target)
            .target
            .map(ClassifierIdx::Klass);
        let pairs = direct_join_pairs(criteria, opposite);
        let join = if pairs.is_some() {
            JoinKind::Direct
        } else {
            JoinKind::Predicate
        };
        let foreign_keys = pairs
            .map(|pairs| place_foreign_keys(cx, association, &pairs))
            .unwrap_or_default();

        tracing::debug!(
            association = %cx.state.association(association).core.name.name,
            ?join,
            foreign_keys = foreign_keys.len(),
            "classified join"
        );
        let state = cx.state.association_mut(association);
        state.join = Some(join);
        state.foreign_keys = foreign_keys;
    }
}

/// `(this property, type property)` pairs of a direct join, or `None` when
/// the criteria is a predicate.
pub fn direct_join_pairs(
    criteria: &CriteriaState,
    opposite: Resolution<ClassifierIdx>,
) -> Option<Vec<(PropertyIdx, PropertyIdx)>> {
    let opposite = opposite.resolved()?;
    let mut pairs = Vec::new();
    collect_pairs(criteria, opposite, &mut pairs).then_some(pairs)
}

fn collect_pairs(
    criteria: &CriteriaState,
    opposite: ClassifierIdx,
    pairs: &mut Vec<(PropertyIdx, PropertyIdx)>,
) -> bool {
    match criteria {
        CriteriaState::And(left, right) => {
            collect_pairs(left, opposite, pairs) && collect_pairs(right, opposite, pairs)
        }
        CriteriaState::Operator {
            source,
            operator: OperatorKind::Equal,
            target,
            ..
        } => {
            let (ValueState::Member(source), ValueState::Member(target)) = (source, target) else {
                return false;
            };
            let (this, other) = match (source.is_this(), target.is_this()) {
                (true, false) => (source, target),
                (false, true) => (target, source),
                _ => return false,
            };
            if !this.hops.is_empty() || !other.hops.is_empty() {
                return false;
            }
            if this.classifier.resolved().is_none()
                || other.classifier.resolved() != Some(opposite)
            {
                return false;
            }
            match (this.property.resolved(), other.property.resolved()) {
                (Some(this), Some(other)) => {
                    pairs.push((this, other));
                    true
                }
                _ => false,
            }
        }
        CriteriaState::All { .. }
        | CriteriaState::Or(..)
        | CriteriaState::Operator { .. }
        | CriteriaState::EdgePoint { .. } => false,
    }
}

fn place_foreign_keys(
    cx: &CompileContext<'_>,
    association: AssociationIdx,
    pairs: &[(PropertyIdx, PropertyIdx)],
) -> Vec<ForeignKeyState> {
    let state = cx.state.association(association);
    let source = cx.state.association_end(state.source);
    let target = cx.state.association_end(state.target);

    if source.multiplicity.is_to_one() {
        // The target class navigates the source end and holds the key
        pairs
            .iter()
            .map(|(this, other)| ForeignKeyState {
                end: state.source,
                foreign_key: *other,
                key: *this,
            })
            .collect()
    } else if target.multiplicity.is_to_one() {
        pairs
            .iter()
            .map(|(this, other)| ForeignKeyState {
                end: state.target,
                foreign_key: *this,
                key: *other,
            })
            .collect()
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::resolve::tests::analyzed;
    use klass_ast::foundation::{Multiplicity, PrimitiveType};
    use klass_ast::syntax::builder::{and, eq, literal, or, this_member, type_member, TreeBuilder};
    use klass_ast::syntax::CriteriaExpr;
    use klass_model::JoinKind;

    fn join_of(relationship: CriteriaExpr) -> (JoinKind, usize) {
        let tree = TreeBuilder::new("test")
            .class("Question", |c| c.property("id", PrimitiveType::Long, |p| p.key()))
            .class("Answer", |c| {
                c.property("id", PrimitiveType::Long, |p| p.key())
                    .property("questionId", PrimitiveType::Long, |p| p)
                    .property("flag", PrimitiveType::Boolean, |p| p)
            })
            .association(
                "QuestionHasAnswers",
                ("question", "Question", Multiplicity::OneToOne),
                ("answers", "Answer", Multiplicity::ZeroToMany),
                relationship,
            )
            .build(0);
        let outcome = analyzed(vec![tree]);
        let association = &outcome.state.associations[0];
        (association.join.unwrap(), association.foreign_keys.len())
    }

    #[test]
    fn test_equality_on_keys_is_direct() {
        let (join, foreign_keys) = join_of(eq(this_member("id"), type_member("Answer.questionId")));
        assert_eq!(join, JoinKind::Direct);
        assert_eq!(foreign_keys, 1);
    }

    #[test]
    fn test_operand_order_does_not_matter() {
        let (join, _) = join_of(eq(type_member("Answer.questionId"), this_member("id")));
        assert_eq!(join, JoinKind::Direct);
    }

    #[test]
    fn test_literal_comparison_makes_predicate() {
        let (join, foreign_keys) = join_of(and(
            eq(this_member("id"), type_member("Answer.questionId")),
            eq(type_member("Answer.flag"), literal(true)),
        ));
        assert_eq!(join, JoinKind::Predicate);
        assert_eq!(foreign_keys, 0);
    }

    #[test]
    fn test_disjunction_makes_predicate() {
        let (join, _) = join_of(or(
            eq(this_member("id"), type_member("Answer.questionId")),
            eq(this_member("id"), type_member("Answer.id")),
        ));
        assert_eq!(join, JoinKind::Predicate);
    }

    #[test]
    fn test_wrong_type_member_class_makes_predicate() {
        let (join, _) = join_of(eq(this_member("id"), type_member("Question.id")));
        assert_eq!(join, JoinKind::Predicate);
    }

    #[test]
    fn test_unresolved_member_makes_predicate() {
        let (join, _) = join_of(eq(this_member("id"), type_member("Answer.missing")));
        assert_eq!(join, JoinKind::Predicate);
    }
}
