//! Resolved criteria expressions.
//!
//! Criteria in the model are owned trees whose leaves point into the model
//! arenas: member paths name association ends and properties by index, and
//! variables name url parameters.

use crate::ids::{AssociationEndId, ClassifierId, ParameterId, PropertyId};
use klass_ast::foundation::{LiteralValue, OperatorKind, SortDirection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Criteria {
    All,
    And(Box<Criteria>, Box<Criteria>),
    Or(Box<Criteria>, Box<Criteria>),
    Operator(OperatorCriteria),
    /// The member is compared with the temporal edge point
    EdgePoint(MemberPath),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorCriteria {
    pub source: Value,
    pub operator: OperatorKind,
    pub target: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    ThisMember(MemberPath),
    TypeMember(MemberPath),
    Variable(ParameterId),
    Literal(LiteralValue),
    LiteralList(Vec<LiteralValue>),
    User,
}

/// A path starting at `classifier`, following association-end `hops`, and
/// ending at a data-type property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPath {
    pub classifier: ClassifierId,
    pub hops: Vec<AssociationEndId>,
    pub property: PropertyId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub members: Vec<OrderByMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByMember {
    pub path: MemberPath,
    pub direction: SortDirection,
}

/// Walk a criteria tree in pre-order, calling `visitor` for each node.
pub fn walk_criteria<V>(criteria: &Criteria, visitor: &mut V)
where
    V: FnMut(&Criteria),
{
    visitor(criteria);

    match criteria {
        Criteria::And(left, right) | Criteria::Or(left, right) => {
            walk_criteria(left, visitor);
            walk_criteria(right, visitor);
        }
        Criteria::All | Criteria::Operator(_) | Criteria::EdgePoint(_) => {}
    }
}

impl Criteria {
    /// Every member path of the tree, in pre-order, source before target.
    pub fn member_paths(&self) -> Vec<&MemberPath> {
        let mut paths = Vec::new();
        collect_paths(self, &mut paths);
        paths
    }
}

fn collect_paths<'a>(criteria: &'a Criteria, out: &mut Vec<&'a MemberPath>) {
    match criteria {
        Criteria::All => {}
        Criteria::And(left, right) | Criteria::Or(left, right) => {
            collect_paths(left, out);
            collect_paths(right, out);
        }
        Criteria::Operator(op) => {
            for value in [&op.source, &op.target] {
                if let Value::ThisMember(path) | Value::TypeMember(path) = value {
                    out.push(path);
                }
            }
        }
        Criteria::EdgePoint(path) => out.push(path),
    }
}
