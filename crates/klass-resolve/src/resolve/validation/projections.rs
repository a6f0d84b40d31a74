//! Projection rules.

use super::{CompileContext, Findings};
use crate::error::ErrorKind;
use crate::resolution::Resolution;
use crate::resolve::projections::reference_target;
use crate::state::{conforms_to, ProjectionElementState};
use klass_ast::foundation::UnitId;

pub(super) fn check(cx: &CompileContext<'_>, out: &mut Findings) {
    for projection in &cx.state.projections {
        let resolved = projection.classifier.is_some_and(|c| c.is_resolved());
        children(
            cx,
            projection.core.unit,
            &projection.class_ref.name,
            resolved,
            &projection.children,
            out,
        );
    }
}

/// Checks children resolved against `owner`. Nothing is reported below an
/// owner that did not resolve.
fn children(
    cx: &CompileContext<'_>,
    unit: UnitId,
    owner: &str,
    owner_resolved: bool,
    elements: &[ProjectionElementState],
    out: &mut Findings,
) {
    if !owner_resolved {
        return;
    }
    for element in elements {
        match element {
            ProjectionElementState::Property { name, property, .. } => {
                if property.is_not_found() {
                    out.push(
                        ErrorKind::ProjectionDataTypeProperty,
                        unit,
                        name.span,
                        format!("Cannot find property '{}' on '{}'", name.name, owner),
                    );
                }
            }
            ProjectionElementState::Reference {
                name,
                reference,
                children: nested,
                ..
            } => {
                reference_rules(unit, owner, name, *reference, out);
                let target = reference.and_then(|r| reference_target(cx, r));
                if let Resolution::Resolved(target) = target {
                    let target_name = cx.state.classifier(target).name().to_string();
                    children(cx, unit, &target_name, true, nested, out);
                }
            }
            ProjectionElementState::Projection {
                name,
                reference,
                projection_name,
                projection,
                ..
            } => {
                reference_rules(unit, owner, name, *reference, out);
                match projection {
                    Resolution::NotFound => out.push(
                        ErrorKind::UnresolvedType,
                        unit,
                        projection_name.span,
                        format!("Cannot find projection '{}'", projection_name.name),
                    ),
                    Resolution::Ambiguous => {}
                    Resolution::Resolved(projection) => {
                        let end_type = reference.and_then(|r| reference_target(cx, r));
                        let projected = cx
                            .state
                            .projection(*projection)
                            .classifier
                            .unwrap_or(Resolution::NotFound);
                        if let (Resolution::Resolved(end_type), Resolution::Resolved(projected)) =
                            (end_type, projected)
                        {
                            if !conforms_to(&cx.state, end_type, projected) {
                                out.push(
                                    ErrorKind::ProjectionReferenceClass,
                                    unit,
                                    projection_name.span,
                                    format!(
                                        "Projection '{}' is on '{}', but '{}' navigates to '{}'",
                                        projection_name.name,
                                        cx.state.classifier(projected).name(),
                                        name.name,
                                        cx.state.classifier(end_type).name()
                                    ),
                                );
                            }
                        }
                    }
                }
            }
        }
    }
}

fn reference_rules<T>(
    unit: UnitId,
    owner: &str,
    name: &klass_ast::syntax::Ident,
    reference: Resolution<T>,
    out: &mut Findings,
) {
    match reference {
        Resolution::Resolved(_) => {}
        Resolution::NotFound => out.push(
            ErrorKind::ProjectionEndNotFound,
            unit,
            name.span,
            format!("Cannot find association end '{}' on '{}'", name.name, owner),
        ),
        Resolution::Ambiguous => out.push(
            ErrorKind::ProjectionEndAmbiguous,
            unit,
            name.span,
            format!("Association end '{}' on '{}' is ambiguous", name.name, owner),
        ),
    }
}
