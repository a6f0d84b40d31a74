//! Projection phase.
//!
//! Resolves a projection's classifier and then each child against it:
//! property leaves by name (inherited properties included), reference nodes
//! through association ends or end signatures, and nested projection
//! references by name.
//!
//! # Pipeline Position
//!
//! ```text
//! ... → Order By → Projections → Services → Criteria → Joins → ...
//!                  ^^^^^^^^^^^
//!                  YOU ARE HERE
//! ```

use super::CompileContext;
use crate::resolution::Resolution;
use crate::state::{find_data_type_property, ClassifierIdx, ProjectionElementState, ReferenceIdx};
use klass_ast::syntax::ProjectionElementDecl;

pub fn resolve_projections(cx: &mut CompileContext<'_>) {
    let _span = tracing::debug_span!("resolve_projections").entered();

    for projection in cx.state.projection_indices().collect::<Vec<_>>() {
        let state = cx.state.projection(projection);
        let classifier = cx.registry.find_classifier(&state.class_ref.name);
        let children = resolve_children(cx, classifier, &state.children_decl);

        for child in &children {
            child.walk(&mut |element| {
                if let ProjectionElementState::Property {
                    property: Resolution::Resolved(idx),
                    ..
                } = element
                {
                    cx.state.referenced_properties.insert(*idx);
                }
            });
        }
        let state = cx.state.projection_mut(projection);
        state.classifier = Some(classifier);
        state.children = children;
    }
}

fn resolve_children(
    cx: &CompileContext<'_>,
    classifier: Resolution<ClassifierIdx>,
    decls: &[ProjectionElementDecl],
) -> Vec<ProjectionElementState> {
    decls
        .iter()
        .map(|decl| match decl {
            ProjectionElementDecl::Property(decl) => ProjectionElementState::Property {
                name: decl.name.clone(),
                header: decl.header.clone(),
                property: classifier.and_then(|c| {
                    find_data_type_property(&cx.state, cx.state.classifier(c), &decl.name.name)
                }),
                span: decl.span,
            },
            ProjectionElementDecl::Reference(decl) => {
                let reference = find_reference(cx, classifier, &decl.name.name);
                let target = reference.and_then(|r| reference_target(cx, r));
                ProjectionElementState::Reference {
                    name: decl.name.clone(),
                    reference,
                    children: resolve_children(cx, target, &decl.children),
                    span: decl.span,
                }
            }
            ProjectionElementDecl::Projection(decl) => ProjectionElementState::Projection {
                name: decl.name.clone(),
                reference: find_reference(cx, classifier, &decl.name.name),
                projection_name: decl.projection.clone(),
                projection: cx.registry.find_projection(&decl.projection.name),
                span: decl.span,
            },
        })
        .collect()
}

/// An association end of a class, or an end signature of either kind.
pub fn find_reference(
    cx: &CompileContext<'_>,
    classifier: Resolution<ClassifierIdx>,
    name: &str,
) -> Resolution<ReferenceIdx> {
    classifier.and_then(|c| {
        let ends = match c {
            ClassifierIdx::Klass(klass) => cx
                .state
                .find_association_end(klass, name)
                .map(ReferenceIdx::End),
            ClassifierIdx::Interface(_) => Resolution::NotFound,
        };
        ends.or_else(|| {
            Resolution::from_matches(
                cx.state
                    .classifier(c)
                    .core()
                    .end_signatures
                    .iter()
                    .copied()
                    .filter(|s| cx.state.end_signature(*s).name.name == name)
                    .map(ReferenceIdx::Signature),
            )
        })
    })
}

/// The classifier a reference navigates to.
pub fn reference_target(
    cx: &CompileContext<'_>,
    reference: ReferenceIdx,
) -> Resolution<ClassifierIdx> {
    match reference {
        ReferenceIdx::End(end) => cx.state.association_end(end).target.map(ClassifierIdx::Klass),
        ReferenceIdx::Signature(signature) => cx
            .state
            .end_signature(signature)
            .target
            .unwrap_or(Resolution::NotFound),
    }
}
