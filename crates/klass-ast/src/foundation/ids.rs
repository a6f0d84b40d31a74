//! Identity of syntax nodes.
//!
//! Every node of a parse tree carries a [`NodeId`] that is unique within its
//! tree. Combined with the [`UnitId`] of the compilation unit that owns the
//! tree, it forms a [`ContextKey`]: the identity later compiler phases use to
//! find the state they created for a node on an earlier walk.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a syntax node within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Id carried by nodes that have not been numbered yet.
    pub const UNASSIGNED: NodeId = NodeId(0);

    /// Whether this id was assigned by a numbering pass or a parser.
    pub fn is_assigned(self) -> bool {
        self != Self::UNASSIGNED
    }
}

/// Identity of a compilation unit, source or synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// A node located in a specific compilation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextKey {
    pub unit: UnitId,
    pub node: NodeId,
}

impl ContextKey {
    pub fn new(unit: UnitId, node: NodeId) -> Self {
        Self { unit, node }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:node#{}", self.unit, self.node.0)
    }
}
