//! Resolved criteria expressions and order-by clauses.
//!
//! These mirror the syntax in `klass_ast::syntax::criteria` with every name
//! replaced by its [`Resolution`]. Failed resolutions stay in the tree so
//! validation can report them with the span of the offending path.

use super::{AssociationEndIdx, ClassifierIdx, ParameterIdx, PropertyIdx};
use crate::resolution::Resolution;
use klass_ast::foundation::{LiteralValue, OperatorKind, SortDirection, Span, UnitId};
use klass_ast::syntax::Ident;

#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaState {
    All {
        span: Span,
    },
    And(Box<CriteriaState>, Box<CriteriaState>),
    Or(Box<CriteriaState>, Box<CriteriaState>),
    Operator {
        source: ValueState,
        operator: OperatorKind,
        target: ValueState,
        span: Span,
    },
    /// `this.<member> equalsEdgePoint`
    EdgePoint {
        member: MemberPathState,
        span: Span,
    },
}

impl CriteriaState {
    /// Pre-order visit of every node.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a CriteriaState)) {
        visit(self);
        match self {
            CriteriaState::And(left, right) | CriteriaState::Or(left, right) => {
                left.walk(visit);
                right.walk(visit);
            }
            CriteriaState::All { .. }
            | CriteriaState::Operator { .. }
            | CriteriaState::EdgePoint { .. } => {}
        }
    }

    /// Every member path, in source order.
    pub fn member_paths(&self) -> Vec<&MemberPathState> {
        let mut paths = Vec::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths<'a>(&'a self, paths: &mut Vec<&'a MemberPathState>) {
        match self {
            CriteriaState::All { .. } => {}
            CriteriaState::And(left, right) | CriteriaState::Or(left, right) => {
                left.collect_paths(paths);
                right.collect_paths(paths);
            }
            CriteriaState::Operator { source, target, .. } => {
                for value in [source, target] {
                    if let ValueState::Member(path) = value {
                        paths.push(path);
                    }
                }
            }
            CriteriaState::EdgePoint { member, .. } => paths.push(member),
        }
    }

    /// Every variable reference, in source order.
    pub fn variables(&self) -> Vec<(&Ident, Resolution<ParameterIdx>)> {
        let mut variables = Vec::new();
        self.walk(&mut |node| {
            if let CriteriaState::Operator { source, target, .. } = node {
                for value in [source, target] {
                    if let ValueState::Variable { name, parameter } = value {
                        variables.push((name, *parameter));
                    }
                }
            }
        });
        variables
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueState {
    Member(MemberPathState),
    Variable {
        name: Ident,
        parameter: Resolution<ParameterIdx>,
    },
    Literal {
        value: LiteralValue,
        span: Span,
    },
    LiteralList {
        values: Vec<LiteralValue>,
        span: Span,
    },
    User {
        span: Span,
    },
}

/// Where a member path starts.
#[derive(Debug, Clone, PartialEq)]
pub enum PathOrigin {
    /// `this.`: the classifier the criteria is evaluated against
    This,
    /// `Name.`: an explicitly named classifier
    Type(Ident),
}

/// One association-end hop of a member path.
#[derive(Debug, Clone, PartialEq)]
pub struct HopState {
    pub name: Ident,
    pub end: Resolution<AssociationEndIdx>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberPathState {
    pub origin: PathOrigin,
    pub classifier: Resolution<ClassifierIdx>,
    pub hops: Vec<HopState>,
    pub member: Ident,
    pub property: Resolution<PropertyIdx>,
    /// Unit the path was written in
    pub unit: UnitId,
    pub span: Span,
}

impl MemberPathState {
    pub fn is_this(&self) -> bool {
        self.origin == PathOrigin::This
    }

    /// Whether the classifier, every hop and the member resolved.
    pub fn is_resolved(&self) -> bool {
        self.classifier.is_resolved()
            && self.hops.iter().all(|hop| hop.end.is_resolved())
            && self.property.is_resolved()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByMemberState {
    pub path: MemberPathState,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByState {
    pub members: Vec<OrderByMemberState>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str, parameter: Resolution<ParameterIdx>) -> ValueState {
        ValueState::Variable {
            name: Ident::new(name, Span::zero(0)),
            parameter,
        }
    }

    fn compare(source: ValueState, target: ValueState) -> CriteriaState {
        CriteriaState::Operator {
            source,
            operator: OperatorKind::Equal,
            target,
            span: Span::zero(0),
        }
    }

    #[test]
    fn test_variables_in_source_order() {
        let criteria = CriteriaState::Or(
            Box::new(compare(
                variable("id", Resolution::Resolved(ParameterIdx(0))),
                ValueState::Literal {
                    value: LiteralValue::Integer(1),
                    span: Span::zero(0),
                },
            )),
            Box::new(CriteriaState::And(
                Box::new(CriteriaState::All { span: Span::zero(0) }),
                Box::new(compare(
                    variable("version", Resolution::NotFound),
                    variable("other", Resolution::Ambiguous),
                )),
            )),
        );

        let found: Vec<_> = criteria
            .variables()
            .into_iter()
            .map(|(name, parameter)| (name.as_str(), parameter))
            .collect();
        assert_eq!(
            found,
            vec![
                ("id", Resolution::Resolved(ParameterIdx(0))),
                ("version", Resolution::NotFound),
                ("other", Resolution::Ambiguous),
            ]
        );
    }
}
