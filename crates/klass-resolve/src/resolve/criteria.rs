//! Criteria phase.
//!
//! Turns every criteria expression into a [`CriteriaState`]: association
//! relationships, evaluated against the class of the source end, and
//! service clauses, evaluated against the service group's class with the
//! url's parameters in scope for variables.
//!
//! Runs after inference so inferred properties and clauses resolve like
//! hand-written ones.
//!
//! # Pipeline Position
//!
//! ```text
//! ... → Services → Criteria → Joins → Duplicates → Names → Validation → ...
//!                  ^^^^^^^^
//!                  YOU ARE HERE
//! ```

use super::paths::{resolve_this_path, resolve_type_path};
use super::CompileContext;
use crate::resolution::Resolution;
use crate::state::{ClassifierIdx, CriteriaState, ParameterIdx, ValueState};
use klass_ast::foundation::UnitId;
use klass_ast::syntax::{CriteriaExpr, ExpressionValue};

/// What names in an expression resolve against.
struct Scope {
    this: Resolution<ClassifierIdx>,
    unit: UnitId,
    parameters: Vec<ParameterIdx>,
}

pub fn resolve_criteria(cx: &mut CompileContext<'_>) {
    let _span = tracing::debug_span!("resolve_criteria").entered();

    for association in cx.state.association_indices().collect::<Vec<_>>() {
        let state = cx.state.association(association);
        let scope = Scope {
            this: cx
                .state
                .association_end(state.source)
                .target
                .map(ClassifierIdx::Klass),
            unit: state.core.unit,
            parameters: Vec::new(),
        };
        let criteria = build(cx, &scope, &state.relationship_decl);
        mark_referenced(cx, &criteria);
        cx.state.association_mut(association).relationship = Some(criteria);
    }

    let mut clauses = 0usize;
    for service in cx.state.service_indices().collect::<Vec<_>>() {
        let state = cx.state.service(service);
        let url = cx.state.url(state.url);
        let this = cx
            .registry
            .find_klass(&cx.state.service_group(url.group).class_ref.name)
            .map(ClassifierIdx::Klass);
        let parameters = url.parameters();

        let resolved: Vec<_> = state
            .clauses
            .iter()
            .map(|clause| {
                let scope = Scope {
                    this,
                    unit: clause.unit,
                    parameters: parameters.clone(),
                };
                build(cx, &scope, &clause.decl)
            })
            .collect();
        for criteria in &resolved {
            mark_referenced(cx, criteria);
        }
        clauses += resolved.len();
        for (clause, criteria) in cx
            .state
            .service_mut(service)
            .clauses
            .iter_mut()
            .zip(resolved)
        {
            clause.criteria = Some(criteria);
        }
    }
    tracing::debug!(
        associations = cx.state.associations.len(),
        clauses,
        "resolved criteria"
    );
}

fn mark_referenced(cx: &mut CompileContext<'_>, criteria: &CriteriaState) {
    cx.state.referenced_properties.extend(
        criteria
            .member_paths()
            .into_iter()
            .filter_map(|path| path.property.resolved()),
    );
}

fn build(cx: &CompileContext<'_>, scope: &Scope, expr: &CriteriaExpr) -> CriteriaState {
    match expr {
        CriteriaExpr::All(all) => CriteriaState::All { span: all.span },
        CriteriaExpr::And(binary) => CriteriaState::And(
            Box::new(build(cx, scope, &binary.left)),
            Box::new(build(cx, scope, &binary.right)),
        ),
        CriteriaExpr::Or(binary) => CriteriaState::Or(
            Box::new(build(cx, scope, &binary.left)),
            Box::new(build(cx, scope, &binary.right)),
        ),
        CriteriaExpr::Operator(operator) => CriteriaState::Operator {
            source: value(cx, scope, &operator.source),
            operator: operator.operator.kind,
            target: value(cx, scope, &operator.target),
            span: operator.span,
        },
        CriteriaExpr::EdgePoint(edge) => CriteriaState::EdgePoint {
            member: resolve_this_path(cx, scope.this, scope.unit, &edge.member),
            span: edge.span,
        },
    }
}

fn value(cx: &CompileContext<'_>, scope: &Scope, value: &ExpressionValue) -> ValueState {
    match value {
        ExpressionValue::ThisMember(path) => {
            ValueState::Member(resolve_this_path(cx, scope.this, scope.unit, path))
        }
        ExpressionValue::TypeMember(path) => {
            ValueState::Member(resolve_type_path(cx, scope.unit, path))
        }
        ExpressionValue::Variable(variable) => ValueState::Variable {
            name: variable.name.clone(),
            parameter: Resolution::from_matches(
                scope
                    .parameters
                    .iter()
                    .copied()
                    .filter(|p| cx.state.parameter(*p).name.name == variable.name.name),
            ),
        },
        ExpressionValue::Literal(literal) => ValueState::Literal {
            value: literal.value.clone(),
            span: literal.span,
        },
        ExpressionValue::LiteralList(list) => ValueState::LiteralList {
            values: list.values.iter().map(|l| l.value.clone()).collect(),
            span: list.span,
        },
        ExpressionValue::User(user) => ValueState::User { span: user.span },
    }
}
