//! Temporal property inference.
//!
//! `validTemporal`, `systemTemporal` and `bitemporal` classifiers get the
//! members of each temporal family they lack:
//!
//! ```text
//! valid     : TemporalRange?   valid private
//! validFrom : TemporalInstant? valid from
//! validTo   : TemporalInstant? valid to
//! ```
//!
//! and the same three for `system`. A member counts as present when any
//! declared or inherited property carries the family modifier in the same
//! role, so running the phase again adds nothing. Parents are expanded
//! before their children, which lets a subclass see what its superclass
//! received.
//!
//! The missing members are built as syntax, wrapped in a macro unit and
//! merged through [`declare_members`].
//!
//! # Pipeline Position
//!
//! ```text
//! ... → Associations → Temporal → Service Criteria → Order By → ... → Assembly
//!                      ^^^^^^^^
//!                      YOU ARE HERE
//! ```

use super::classifiers::declare_members;
use super::CompileContext;
use crate::error::InternalError;
use crate::state::{all_data_type_properties, Classifier, ClassifierIdx, TemporalPart};
use crate::unit::{CompilationUnit, MacroKind, UnitBody};
use crate::walk::Frame;
use klass_ast::foundation::{Modifier, PrimitiveType};
use klass_ast::syntax::builder::property;
use klass_ast::syntax::{MemberDecl, PropertyType};
use std::collections::HashSet;

pub fn infer_temporal_properties(cx: &mut CompileContext<'_>) -> Result<(), InternalError> {
    let _span = tracing::debug_span!("infer_temporal_properties").entered();

    let mut visited = HashSet::new();
    let mut order = Vec::new();
    for classifier in cx.state.classifiers() {
        inheritance_order(cx, classifier, &mut visited, &mut order);
    }

    let mut expanded = 0usize;
    for classifier in order {
        let members = missing_members(cx, classifier);
        if members.is_empty() {
            continue;
        }
        expand(cx, classifier, members)?;
        expanded += 1;
    }
    tracing::debug!(expanded, "temporal inference done");
    Ok(())
}

/// Post-order over superclasses and interfaces.
fn inheritance_order(
    cx: &CompileContext<'_>,
    classifier: ClassifierIdx,
    visited: &mut HashSet<ClassifierIdx>,
    order: &mut Vec<ClassifierIdx>,
) {
    if !visited.insert(classifier) {
        return;
    }
    let state = cx.state.classifier(classifier);
    let parents = state
        .superclass()
        .map(ClassifierIdx::Klass)
        .into_iter()
        .chain(
            state
                .resolved_interfaces()
                .into_iter()
                .map(ClassifierIdx::Interface),
        );
    for parent in parents.collect::<Vec<_>>() {
        inheritance_order(cx, parent, visited, order);
    }
    order.push(classifier);
}

/// Families requested by a classifier's modifiers, each at most once.
fn requested_families(classifier: &dyn Classifier) -> Vec<Modifier> {
    let mut families = Vec::new();
    for modifier in &classifier.core().modifiers {
        let requested: &[Modifier] = match modifier.modifier {
            Modifier::ValidTemporal => &[Modifier::Valid],
            Modifier::SystemTemporal => &[Modifier::System],
            Modifier::Bitemporal => &[Modifier::Valid, Modifier::System],
            _ => &[],
        };
        for family in requested {
            if !families.contains(family) {
                families.push(*family);
            }
        }
    }
    families
}

fn missing_members(cx: &CompileContext<'_>, classifier: ClassifierIdx) -> Vec<MemberDecl> {
    let state = cx.state.classifier(classifier);
    let present: HashSet<(Modifier, TemporalPart)> = all_data_type_properties(&cx.state, state)
        .into_iter()
        .filter_map(|p| {
            let property = cx.state.property(p);
            Some((property.temporal_family()?, property.temporal_part()?))
        })
        .collect();

    let mut members = Vec::new();
    for family in requested_families(state) {
        for part in [TemporalPart::Range, TemporalPart::From, TemporalPart::To] {
            if !present.contains(&(family, part)) {
                members.push(temporal_member(family, part));
            }
        }
    }
    members
}

fn temporal_member(family: Modifier, part: TemporalPart) -> MemberDecl {
    let prefix = family.keyword();
    match part {
        TemporalPart::Range => property(
            prefix,
            PropertyType::Primitive(PrimitiveType::TemporalRange),
            |p| p.optional().modifier(family).private(),
        ),
        TemporalPart::From => property(
            &format!("{}From", prefix),
            PropertyType::Primitive(PrimitiveType::TemporalInstant),
            |p| p.optional().modifier(family).modifier(Modifier::From),
        ),
        TemporalPart::To => property(
            &format!("{}To", prefix),
            PropertyType::Primitive(PrimitiveType::TemporalInstant),
            |p| p.optional().modifier(family).modifier(Modifier::To),
        ),
    }
}

fn expand(
    cx: &mut CompileContext<'_>,
    classifier: ClassifierIdx,
    members: Vec<MemberDecl>,
) -> Result<(), InternalError> {
    let element = cx.state.classifier(classifier).core().element.clone();
    let Some(parent) = cx.unit(element.unit) else {
        return Err(InternalError::UnknownContext(element.ctx));
    };
    let unit = CompilationUnit::from_macro(
        cx.next_unit_id(),
        parent,
        MacroKind::TemporalProperties,
        element.ctx,
        element.span,
        UnitBody::ClassMembers {
            owner: classifier,
            members,
        },
    );
    tracing::debug!(
        classifier = %element.name.name,
        unit = %unit.id,
        "inferring temporal properties"
    );

    cx.expand_macro(unit, |cx, unit| {
        let UnitBody::ClassMembers { owner, members } = &unit.body else {
            return Ok(());
        };
        cx.in_frame(Frame::Classifier(*owner), |cx| {
            declare_members(cx, unit, *owner, members, Some(MacroKind::TemporalProperties))
        })
    })?;
    Ok(())
}
