//! Criteria expressions, expression values and order-by clauses.
//!
//! Criteria appear in association relationships and service clauses. They
//! are boolean trees whose leaves compare two [`ExpressionValue`]s or test a
//! temporal edge point.
//!
//! ```klass
//! relationship this.id == Answer.questionId && Answer.deleted == false
//! ```

use super::decl::Ident;
use crate::foundation::{LiteralValue, NodeId, OperatorKind, SortDirection, Span};
use std::fmt;

/// A boolean criteria tree.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum CriteriaExpr {
    /// Matches every instance
    All(AllCriteria),
    And(BinaryCriteria),
    Or(BinaryCriteria),
    Operator(OperatorCriteria),
    /// `this.system equalsEdgePoint`
    EdgePoint(EdgePointCriteria),
}

impl CriteriaExpr {
    pub fn id(&self) -> NodeId {
        match self {
            CriteriaExpr::All(c) => c.id,
            CriteriaExpr::And(c) | CriteriaExpr::Or(c) => c.id,
            CriteriaExpr::Operator(c) => c.id,
            CriteriaExpr::EdgePoint(c) => c.id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            CriteriaExpr::All(c) => c.span,
            CriteriaExpr::And(c) | CriteriaExpr::Or(c) => c.span,
            CriteriaExpr::Operator(c) => c.span,
            CriteriaExpr::EdgePoint(c) => c.span,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AllCriteria {
    pub id: NodeId,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BinaryCriteria {
    pub id: NodeId,
    pub span: Span,
    pub left: Box<CriteriaExpr>,
    pub right: Box<CriteriaExpr>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OperatorCriteria {
    pub id: NodeId,
    pub span: Span,
    pub source: ExpressionValue,
    pub operator: OperatorDecl,
    pub target: ExpressionValue,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OperatorDecl {
    pub span: Span,
    pub kind: OperatorKind,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EdgePointCriteria {
    pub id: NodeId,
    pub span: Span,
    pub member: ThisMemberPath,
}

/// Operand of an operator criteria.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ExpressionValue {
    /// `this.version.number`
    ThisMember(ThisMemberPath),
    /// `Answer.questionId`
    TypeMember(TypeMemberPath),
    /// A url parameter, by name
    Variable(VariableRef),
    Literal(LiteralDecl),
    /// `(1, 2, 3)`, only valid as the target of `in`
    LiteralList(LiteralListDecl),
    /// The `user` literal
    User(UserLiteralDecl),
}

impl ExpressionValue {
    pub fn id(&self) -> NodeId {
        match self {
            ExpressionValue::ThisMember(v) => v.id,
            ExpressionValue::TypeMember(v) => v.id,
            ExpressionValue::Variable(v) => v.id,
            ExpressionValue::Literal(v) => v.id,
            ExpressionValue::LiteralList(v) => v.id,
            ExpressionValue::User(v) => v.id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ExpressionValue::ThisMember(v) => v.span,
            ExpressionValue::TypeMember(v) => v.span,
            ExpressionValue::Variable(v) => v.span,
            ExpressionValue::Literal(v) => v.span,
            ExpressionValue::LiteralList(v) => v.span,
            ExpressionValue::User(v) => v.span,
        }
    }

    pub fn is_member_path(&self) -> bool {
        matches!(
            self,
            ExpressionValue::ThisMember(_) | ExpressionValue::TypeMember(_)
        )
    }
}

/// `this` followed by zero or more association-end hops and a member name.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ThisMemberPath {
    pub id: NodeId,
    pub span: Span,
    pub hops: Vec<Ident>,
    pub member: Ident,
}

/// A class name followed by zero or more association-end hops and a member
/// name.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TypeMemberPath {
    pub id: NodeId,
    pub span: Span,
    pub class_ref: Ident,
    pub hops: Vec<Ident>,
    pub member: Ident,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariableRef {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LiteralDecl {
    pub id: NodeId,
    pub span: Span,
    pub value: LiteralValue,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LiteralListDecl {
    pub id: NodeId,
    pub span: Span,
    pub values: Vec<LiteralDecl>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UserLiteralDecl {
    pub id: NodeId,
    pub span: Span,
}

/// `orderBy: this.ordinal ascending, this.title`
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrderByDecl {
    pub id: NodeId,
    pub span: Span,
    pub members: Vec<OrderByMemberDecl>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrderByMemberDecl {
    pub id: NodeId,
    pub span: Span,
    pub path: ThisMemberPath,
    pub direction: SortDirection,
}

impl fmt::Display for ThisMemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("this")?;
        for hop in &self.hops {
            write!(f, ".{}", hop.name)?;
        }
        write!(f, ".{}", self.member.name)
    }
}

impl fmt::Display for TypeMemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class_ref.name)?;
        for hop in &self.hops {
            write!(f, ".{}", hop.name)?;
        }
        write!(f, ".{}", self.member.name)
    }
}

impl fmt::Display for ExpressionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionValue::ThisMember(path) => path.fmt(f),
            ExpressionValue::TypeMember(path) => path.fmt(f),
            ExpressionValue::Variable(var) => f.write_str(&var.name.name),
            ExpressionValue::Literal(lit) => lit.value.fmt(f),
            ExpressionValue::LiteralList(list) => {
                f.write_str("(")?;
                for (i, lit) in list.values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    lit.value.fmt(f)?;
                }
                f.write_str(")")
            }
            ExpressionValue::User(_) => f.write_str("user"),
        }
    }
}

impl fmt::Display for CriteriaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriteriaExpr::All(_) => f.write_str("all"),
            CriteriaExpr::And(c) => write!(f, "({} && {})", c.left, c.right),
            CriteriaExpr::Or(c) => write!(f, "({} || {})", c.left, c.right),
            CriteriaExpr::Operator(c) => {
                write!(f, "{} {} {}", c.source, c.operator.kind, c.target)
            }
            CriteriaExpr::EdgePoint(c) => write!(f, "{} equalsEdgePoint", c.member),
        }
    }
}
