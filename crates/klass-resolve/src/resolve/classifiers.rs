//! Classifier member phase.
//!
//! Creates property and end-signature state for every member of every class
//! and interface. [`declare_members`] is also how inferred members are
//! merged, so synthesized properties go through exactly the same path as
//! hand-written ones.
//!
//! # Pipeline Position
//!
//! ```text
//! Units → Classifiers → Inheritance → Associations → Inference → ... → Assembly
//!         ^^^^^^^^^^^
//!         YOU ARE HERE
//! ```

use super::CompileContext;
use crate::error::InternalError;
use crate::state::{ClassifierIdx, EndSignatureState, PropertyState, StateRef};
use crate::unit::{CompilationUnit, MacroKind};
use crate::walk::Frame;
use klass_ast::syntax::{MemberDecl, TopLevelDecl};

pub fn declare_classifier_members(cx: &mut CompileContext<'_>) -> Result<(), InternalError> {
    let _span = tracing::debug_span!("declare_classifier_members").entered();

    let units = std::mem::take(&mut cx.units);
    let result = units.iter().try_for_each(|unit| {
        cx.in_frame(Frame::Unit(unit.id), |cx| declare_unit_members(cx, unit))
    });
    cx.units = units;
    result?;

    tracing::debug!(
        properties = cx.state.properties.len(),
        end_signatures = cx.state.end_signatures.len(),
        "declared classifier members"
    );
    Ok(())
}

fn declare_unit_members(
    cx: &mut CompileContext<'_>,
    unit: &CompilationUnit,
) -> Result<(), InternalError> {
    let Some(tree) = unit.source_tree() else {
        return Ok(());
    };
    for element in &tree.elements {
        let members = match element {
            TopLevelDecl::Interface(decl) => &decl.members,
            TopLevelDecl::Class(decl) => &decl.members,
            _ => continue,
        };
        let owner = match cx.registry.lookup_by_context(unit.context(element.id()))? {
            StateRef::TopLevel(idx) => idx.as_classifier(),
            _ => None,
        };
        let Some(owner) = owner else {
            return Err(InternalError::UnknownContext(unit.context(element.id())));
        };
        cx.in_frame(Frame::Classifier(owner), |cx| {
            declare_members(cx, unit, owner, members, None)
        })?;
    }
    Ok(())
}

/// Create state for `members` and attach it to `owner`.
pub fn declare_members(
    cx: &mut CompileContext<'_>,
    unit: &CompilationUnit,
    owner: ClassifierIdx,
    members: &[MemberDecl],
    inferred: Option<MacroKind>,
) -> Result<(), InternalError> {
    for member in members {
        match member {
            MemberDecl::Property(decl) => {
                let ctx = unit.context(decl.id);
                let mut property = PropertyState::new(
                    owner,
                    decl.name.clone(),
                    decl.property_type.clone(),
                    ctx,
                    decl.span,
                );
                property.type_span = decl.type_span;
                property.optional = decl.optional;
                property.modifiers = decl.modifiers.clone();
                property.validations = decl.validations.clone();
                property.inferred = inferred;

                let idx = cx.state.add_property(property);
                cx.state.classifier_core_mut(owner).properties.push(idx);
                cx.registry.register_context(ctx, StateRef::Property(idx))?;
                if inferred.is_some() {
                    tracing::debug!(
                        owner = cx.state.classifier(owner).name(),
                        property = %decl.name.name,
                        "inferred property"
                    );
                }
            }
            MemberDecl::EndSignature(decl) => {
                let ctx = unit.context(decl.id);
                let idx = cx.state.add_end_signature(EndSignatureState {
                    owner,
                    name: decl.name.clone(),
                    class_ref: decl.class_ref.clone(),
                    target: None,
                    multiplicity: decl.multiplicity,
                    modifiers: decl.modifiers.clone(),
                    ctx,
                    span: decl.span,
                });
                cx.state.classifier_core_mut(owner).end_signatures.push(idx);
                cx.registry
                    .register_context(ctx, StateRef::EndSignature(idx))?;
            }
        }
    }
    Ok(())
}
