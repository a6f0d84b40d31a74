//! Temporal, audit, version and user id property rules.

use super::{CompileContext, Findings};
use crate::error::ErrorKind;
use crate::state::{PropertyIdx, PropertyState, TemporalPart};
use klass_ast::foundation::{Modifier, PrimitiveType};

const CREATED_BY_NAME: &str = "createdById";
const LAST_UPDATED_BY_NAME: &str = "lastUpdatedById";

pub(super) fn check(cx: &CompileContext<'_>, out: &mut Findings) {
    for idx in cx.state.property_indices() {
        let property = cx.state.property(idx);
        temporal(property, out);
        audit(property, out);
        version_and_user_id(property, out);
        unreferenced(cx, idx, property, out);
    }
}

fn has_type(property: &PropertyState, expected: &[PrimitiveType]) -> bool {
    property.primitive().is_some_and(|p| expected.contains(&p))
}

fn type_name(property: &PropertyState) -> &str {
    property.property_type.type_name()
}

fn temporal(property: &PropertyState, out: &mut Findings) {
    let name = &property.name.name;
    let unit = property.unit();
    let from = property.has_modifier(Modifier::From);
    let to = property.has_modifier(Modifier::To);

    if from && to {
        out.push(
            ErrorKind::TemporalFromAndTo,
            unit,
            property.name.span,
            format!("Property '{}' may not be both 'from' and 'to'", name),
        );
    }

    if (from || to) && property.temporal_family().is_none() {
        out.push(
            ErrorKind::TemporalEndpointFamily,
            unit,
            property.name.span,
            format!(
                "Temporal endpoint '{}' must also be marked 'valid' or 'system'",
                name
            ),
        );
    }

    if from || to {
        if !has_type(property, &[PrimitiveType::TemporalInstant]) {
            out.push(
                ErrorKind::TemporalInstantType,
                unit,
                property.type_span,
                format!(
                    "Temporal endpoint '{}' must be TemporalInstant, not {}",
                    name,
                    type_name(property)
                ),
            );
        }
    } else if property.temporal_part() == Some(TemporalPart::Range)
        && !has_type(property, &[PrimitiveType::TemporalRange])
    {
        out.push(
            ErrorKind::TemporalRangeType,
            unit,
            property.type_span,
            format!(
                "Temporal property '{}' must be TemporalRange, not {}",
                name,
                type_name(property)
            ),
        );
    }
}

fn audit(property: &PropertyState, out: &mut Findings) {
    let name = &property.name.name;
    let unit = property.unit();
    let audits: Vec<Modifier> = property
        .modifiers
        .iter()
        .map(|m| m.modifier)
        .filter(|m| m.is_audit())
        .collect();
    let Some(first) = audits.first() else {
        return;
    };

    if property.is_key() {
        out.push(
            ErrorKind::AuditKey,
            unit,
            property.name.span,
            format!("Audit property '{}' may not be a key", name),
        );
    }
    if !property.is_private() {
        out.push(
            ErrorKind::AuditPrivate,
            unit,
            property.name.span,
            format!("Audit property '{}' must be private", name),
        );
    }

    let by_user = audits
        .iter()
        .any(|m| matches!(m, Modifier::CreatedBy | Modifier::LastUpdatedBy));
    let expected = if by_user {
        PrimitiveType::String
    } else {
        PrimitiveType::Instant
    };
    if !has_type(property, &[expected]) {
        out.push(
            ErrorKind::AuditDataType,
            unit,
            property.type_span,
            format!(
                "'{}' property '{}' must be {}, not {}",
                first,
                name,
                expected,
                type_name(property)
            ),
        );
    }
    if by_user && !property.has_modifier(Modifier::UserId) {
        out.push(
            ErrorKind::AuditUserId,
            unit,
            property.name.span,
            format!("'{}' property '{}' must also be 'userId'", first, name),
        );
    }

    if property.has_modifier(Modifier::CreatedBy) && name != CREATED_BY_NAME {
        out.push(
            ErrorKind::CreatedByName,
            unit,
            property.name.span,
            format!(
                "'createdBy' property '{}' should be named '{}'",
                name, CREATED_BY_NAME
            ),
        );
    }
    if property.has_modifier(Modifier::LastUpdatedBy) && name != LAST_UPDATED_BY_NAME {
        out.push(
            ErrorKind::LastUpdatedByName,
            unit,
            property.name.span,
            format!(
                "'lastUpdatedBy' property '{}' should be named '{}'",
                name, LAST_UPDATED_BY_NAME
            ),
        );
    }
}

fn version_and_user_id(property: &PropertyState, out: &mut Findings) {
    let name = &property.name.name;
    let unit = property.unit();

    if property.has_modifier(Modifier::Version)
        && !has_type(property, &[PrimitiveType::Integer, PrimitiveType::Long])
    {
        out.push(
            ErrorKind::VersionDataType,
            unit,
            property.type_span,
            format!(
                "Version property '{}' must be Integer or Long, not {}",
                name,
                type_name(property)
            ),
        );
    }

    if property.has_modifier(Modifier::UserId) {
        if !has_type(property, &[PrimitiveType::String]) {
            out.push(
                ErrorKind::UserIdDataType,
                unit,
                property.type_span,
                format!(
                    "userId property '{}' must be String, not {}",
                    name,
                    type_name(property)
                ),
            );
        }
        let explained = property.is_key()
            || property.has_modifier(Modifier::CreatedBy)
            || property.has_modifier(Modifier::LastUpdatedBy);
        if !explained {
            out.push(
                ErrorKind::AuditUserId,
                unit,
                property.name.span,
                format!(
                    "userId property '{}' must also be a key, 'createdBy' or 'lastUpdatedBy'",
                    name
                ),
            );
        }
    }
}

fn unreferenced(
    cx: &CompileContext<'_>,
    idx: PropertyIdx,
    property: &PropertyState,
    out: &mut Findings,
) {
    if !cx.options.report_unreferenced_private
        || !property.is_private()
        || property.is_bookkeeping()
        || cx.state.referenced_properties.contains(&idx)
    {
        return;
    }
    out.push(
        ErrorKind::UnreferencedPrivate,
        property.unit(),
        property.name.span,
        format!("Private property '{}' is never referenced", property.name.name),
    );
}
