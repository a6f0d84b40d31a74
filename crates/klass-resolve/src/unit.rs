//! Compilation units.
//!
//! A unit is one tree the compiler walks: either a source file handed in by
//! the caller or a fragment synthesized by an inference phase. Every
//! diagnostic and every piece of compiler state records the unit it came
//! from.

use crate::state::{ClassifierIdx, ServiceIdx};
use klass_ast::foundation::{ContextKey, UnitId};
use klass_ast::syntax::{MemberDecl, Numbering, ServiceCriteriaDecl, SourceTree, SpanMode};
use klass_ast::Span;

/// The inference phase that synthesized a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroKind {
    TemporalProperties,
    ServiceCriteria,
}

impl MacroKind {
    pub fn name(self) -> &'static str {
        match self {
            MacroKind::TemporalProperties => "temporal property inference",
            MacroKind::ServiceCriteria => "service criteria inference",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnitOrigin {
    Source,
    Macro {
        parent: UnitId,
        kind: MacroKind,
        /// Declaration whose expansion produced the unit
        anchor: ContextKey,
    },
}

/// What a unit contains.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitBody {
    Source(SourceTree),
    /// Members spliced into an existing classifier
    ClassMembers {
        owner: ClassifierIdx,
        members: Vec<MemberDecl>,
    },
    /// Clauses spliced into an existing service
    ServiceCriteria {
        service: ServiceIdx,
        criteria: Vec<ServiceCriteriaDecl>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub id: UnitId,
    pub source_name: String,
    pub package: String,
    pub origin: UnitOrigin,
    pub body: UnitBody,
}

impl CompilationUnit {
    /// Wrap a source tree. Node ids are reassigned so that every node of the
    /// unit has a distinct id; spans are kept.
    pub fn from_source(id: UnitId, source_name: impl Into<String>, mut tree: SourceTree) -> Self {
        Numbering::new(SpanMode::Keep).number_tree(&mut tree);
        Self {
            id,
            source_name: source_name.into(),
            package: tree.package.name.clone(),
            origin: UnitOrigin::Source,
            body: UnitBody::Source(tree),
        }
    }

    /// A fragment produced by an inference phase.
    ///
    /// All nodes of the fragment point at `anchor_span`, the declaration
    /// that triggered the expansion.
    pub fn from_macro(
        id: UnitId,
        parent: &CompilationUnit,
        kind: MacroKind,
        anchor: ContextKey,
        anchor_span: Span,
        mut body: UnitBody,
    ) -> Self {
        let mut numbering = Numbering::new(SpanMode::Anchor(anchor_span));
        match &mut body {
            UnitBody::Source(tree) => numbering.number_tree(tree),
            UnitBody::ClassMembers { members, .. } => numbering.number_members(members),
            UnitBody::ServiceCriteria { criteria, .. } => {
                numbering.number_service_criteria(criteria)
            }
        }
        Self {
            id,
            source_name: format!("{} ({})", parent.source_name, kind.name()),
            package: parent.package.clone(),
            origin: UnitOrigin::Macro {
                parent: parent.id,
                kind,
                anchor,
            },
            body,
        }
    }

    pub fn is_macro(&self) -> bool {
        matches!(self.origin, UnitOrigin::Macro { .. })
    }

    pub fn source_tree(&self) -> Option<&SourceTree> {
        match &self.body {
            UnitBody::Source(tree) => Some(tree),
            UnitBody::ClassMembers { .. } | UnitBody::ServiceCriteria { .. } => None,
        }
    }

    pub fn context(&self, node: klass_ast::NodeId) -> ContextKey {
        ContextKey::new(self.id, node)
    }
}
