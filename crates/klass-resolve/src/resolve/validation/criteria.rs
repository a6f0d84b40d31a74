//! Criteria, order-by and foreign key rules.

use super::{CompileContext, Findings};
use crate::error::ErrorKind;
use crate::resolution::Resolution;
use crate::state::{CriteriaState, MemberPathState, OrderByState, PathOrigin, ValueState};
use klass_ast::foundation::{Multiplicity, OperatorKind, UnitId};

pub(super) fn check(cx: &CompileContext<'_>, out: &mut Findings) {
    let state = &cx.state;

    for association in &state.associations {
        if let Some(criteria) = &association.relationship {
            criteria_rules(criteria, association.core.unit, out);
        }
    }
    for service in &state.services {
        for clause in &service.clauses {
            if let Some(criteria) = &clause.criteria {
                criteria_rules(criteria, clause.unit, out);
            }
        }
        if let Some(order_by) = &service.order_by {
            order_by_rules(order_by, out);
        }
    }

    for end in &state.association_ends {
        let Some(order_by) = &end.order_by else {
            continue;
        };
        if end.multiplicity.is_to_one() {
            out.push(
                ErrorKind::ToOneOrderBy,
                end.ctx.unit,
                order_by.span,
                format!(
                    "Association end '{}' is to-one ({}) and cannot be ordered",
                    end.name.name, end.multiplicity
                ),
            );
        }
        order_by_rules(order_by, out);
    }

    foreign_keys(cx, out);
}

fn criteria_rules(criteria: &CriteriaState, unit: UnitId, out: &mut Findings) {
    for path in criteria.member_paths() {
        member_path(path, out);
    }

    for (name, parameter) in criteria.variables() {
        if parameter.is_not_found() {
            out.push(
                ErrorKind::UnresolvedVariable,
                unit,
                name.span,
                format!("Cannot find parameter '{}'", name.name),
            );
        }
    }

    criteria.walk(&mut |node| {
        let CriteriaState::Operator {
            source,
            operator,
            target,
            span,
        } = node
        else {
            return;
        };
        let is_list = |value: &ValueState| matches!(value, ValueState::LiteralList { .. });
        let misused = if *operator == OperatorKind::In {
            !matches!(
                target,
                ValueState::LiteralList { .. } | ValueState::Variable { .. }
            )
        } else {
            is_list(source) || is_list(target)
        };
        if misused {
            out.push(
                ErrorKind::InOperator,
                unit,
                *span,
                format!(
                    "Operator '{}' cannot be used with these operands; \
                     'in' requires a literal list or a variable",
                    operator
                ),
            );
        }
    });
}

/// Reports the first broken step of a path.
fn member_path(path: &MemberPathState, out: &mut Findings) {
    match (&path.origin, path.classifier) {
        (PathOrigin::Type(class), Resolution::NotFound) => {
            out.push(
                ErrorKind::UnresolvedMemberType,
                path.unit,
                class.span,
                format!("Cannot find classifier '{}'", class.name),
            );
            return;
        }
        (_, Resolution::Resolved(_)) => {}
        // An unresolved `this` is reported where it was declared
        _ => return,
    }

    for hop in &path.hops {
        match hop.end {
            Resolution::Resolved(_) => {}
            Resolution::Ambiguous => return,
            Resolution::NotFound => {
                out.push(
                    ErrorKind::UnresolvedHop,
                    path.unit,
                    hop.name.span,
                    format!("Cannot find association end '{}'", hop.name.name),
                );
                return;
            }
        }
    }

    if path.property.is_not_found() {
        let (kind, origin) = match &path.origin {
            PathOrigin::This => (ErrorKind::UnresolvedThisMember, "this".to_string()),
            PathOrigin::Type(class) => (ErrorKind::UnresolvedTypeMember, class.name.clone()),
        };
        out.push(
            kind,
            path.unit,
            path.member.span,
            format!(
                "Cannot find member '{}.{}'",
                origin,
                path.hops
                    .iter()
                    .map(|h| h.name.name.as_str())
                    .chain([path.member.name.as_str()])
                    .collect::<Vec<_>>()
                    .join(".")
            ),
        );
    }
}

fn order_by_rules(order_by: &OrderByState, out: &mut Findings) {
    for member in &order_by.members {
        if let Some(first) = member.path.hops.first() {
            out.push(
                ErrorKind::OrderByHop,
                member.path.unit,
                first.name.span,
                format!(
                    "Order by '{}' goes through association end '{}'; \
                     only direct properties can be ordered by",
                    member.path.member.name, first.name.name
                ),
            );
        } else {
            member_path(&member.path, out);
        }
    }
}

fn foreign_keys(cx: &CompileContext<'_>, out: &mut Findings) {
    let state = &cx.state;
    for association in &state.associations {
        for fk in &association.foreign_keys {
            let end = state.association_end(fk.end);
            let property = state.property(fk.foreign_key);
            match (end.multiplicity, property.optional) {
                (Multiplicity::OneToOne, true) => out.push(
                    ErrorKind::ForeignKeyMultiplicity,
                    association.core.unit,
                    end.span,
                    format!(
                        "Association end '{}' is required but foreign key '{}' is optional",
                        end.name.name, property.name.name
                    ),
                ),
                (Multiplicity::ZeroToOne, false) => out.push(
                    ErrorKind::OptionalForeignKey,
                    association.core.unit,
                    end.span,
                    format!(
                        "Association end '{}' is optional but foreign key '{}' is required",
                        end.name.name, property.name.name
                    ),
                ),
                _ => {}
            }
        }
    }
}
