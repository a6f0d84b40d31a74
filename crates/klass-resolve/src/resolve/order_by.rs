//! Order-by phase.
//!
//! Resolves the order-by clauses of association ends and services. Inside
//! an end's clause `this` is the class the end points at; inside a service's
//! clause it is the service group's class.
//!
//! # Pipeline Position
//!
//! ```text
//! ... → Service Criteria → Order By → Projections → Services → Criteria → ...
//!                          ^^^^^^^^
//!                          YOU ARE HERE
//! ```

use super::paths::resolve_this_path;
use super::CompileContext;
use crate::resolution::Resolution;
use crate::state::{ClassifierIdx, OrderByMemberState, OrderByState};
use klass_ast::foundation::UnitId;
use klass_ast::syntax::OrderByDecl;

pub fn resolve_order_by(cx: &mut CompileContext<'_>) {
    let _span = tracing::debug_span!("resolve_order_by").entered();

    for i in 0..cx.state.association_ends.len() {
        let end = &cx.state.association_ends[i];
        let Some(decl) = end.order_by_decl.clone() else {
            continue;
        };
        let this = end.target.map(ClassifierIdx::Klass);
        let unit = end.ctx.unit;
        let order_by = resolve(cx, this, unit, &decl);
        cx.state.association_ends[i].order_by = Some(order_by);
    }

    for service in cx.state.service_indices().collect::<Vec<_>>() {
        let state = cx.state.service(service);
        let Some(decl) = state.order_by_decl.clone() else {
            continue;
        };
        let unit = state.ctx.unit;
        let group = cx.state.url(state.url).group;
        let this = cx
            .registry
            .find_klass(&cx.state.service_group(group).class_ref.name)
            .map(ClassifierIdx::Klass);
        let order_by = resolve(cx, this, unit, &decl);
        cx.state.service_mut(service).order_by = Some(order_by);
    }
}

fn resolve(
    cx: &mut CompileContext<'_>,
    this: Resolution<ClassifierIdx>,
    unit: UnitId,
    decl: &OrderByDecl,
) -> OrderByState {
    let members: Vec<_> = decl
        .members
        .iter()
        .map(|member| OrderByMemberState {
            path: resolve_this_path(cx, this, unit, &member.path),
            direction: member.direction,
        })
        .collect();
    cx.state
        .referenced_properties
        .extend(members.iter().filter_map(|m| m.path.property.resolved()));
    OrderByState {
        members,
        span: decl.span,
    }
}
