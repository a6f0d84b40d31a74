//! Criteria tree walking utilities.
//!
//! Join inference, criteria resolution and validation all need to visit
//! every node of a criteria tree. A single closure-based pre-order walk
//! keeps the recursion in one place.
//!
//! # Examples
//!
//! ```rust,ignore
//! use klass_ast::syntax::walk::walk_criteria;
//! use klass_ast::syntax::CriteriaExpr;
//!
//! let mut disjunctions = 0;
//! walk_criteria(&relationship, &mut |node| {
//!     if matches!(node, CriteriaExpr::Or(_)) {
//!         disjunctions += 1;
//!     }
//! });
//! ```

use super::criteria::{CriteriaExpr, ExpressionValue};

/// Walk a criteria tree in pre-order, calling `visitor` for each node.
///
/// The visitor sees a node before its children; binary nodes visit the left
/// operand before the right one.
pub fn walk_criteria<V>(criteria: &CriteriaExpr, visitor: &mut V)
where
    V: FnMut(&CriteriaExpr),
{
    visitor(criteria);

    match criteria {
        CriteriaExpr::And(binary) | CriteriaExpr::Or(binary) => {
            walk_criteria(&binary.left, visitor);
            walk_criteria(&binary.right, visitor);
        }
        CriteriaExpr::All(_) | CriteriaExpr::Operator(_) | CriteriaExpr::EdgePoint(_) => {}
    }
}

/// Call `visitor` for every operand of every operator criteria, source
/// operand first.
pub fn walk_values<V>(criteria: &CriteriaExpr, visitor: &mut V)
where
    V: FnMut(&ExpressionValue),
{
    walk_criteria(criteria, &mut |node| {
        if let CriteriaExpr::Operator(op) = node {
            visitor(&op.source);
            visitor(&op.target);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::builder::{and, eq, literal, or, this_member, type_member};
    use crate::syntax::CriteriaExpr;

    #[test]
    fn test_walk_is_pre_order() {
        let criteria = and(
            eq(this_member("id"), type_member("Answer.questionId")),
            or(
                eq(type_member("Answer.deleted"), literal(false)),
                eq(type_member("Answer.ordinal"), literal(1)),
            ),
        );

        let mut kinds = Vec::new();
        walk_criteria(&criteria, &mut |node| {
            kinds.push(match node {
                CriteriaExpr::And(_) => "and",
                CriteriaExpr::Or(_) => "or",
                CriteriaExpr::Operator(_) => "op",
                CriteriaExpr::All(_) => "all",
                CriteriaExpr::EdgePoint(_) => "edge",
            });
        });

        assert_eq!(kinds, vec!["and", "op", "or", "op", "op"]);
    }

    #[test]
    fn test_walk_values_visits_both_operands() {
        let criteria = eq(this_member("id"), type_member("Answer.questionId"));
        let mut rendered = Vec::new();
        walk_values(&criteria, &mut |value| rendered.push(value.to_string()));
        assert_eq!(rendered, vec!["this.id", "Answer.questionId"]);
    }
}
