//! Service criteria inference.
//!
//! Services of a versioned class whose url takes a `version` parameter get
//! the clause that pins the requested version, unless they declare it:
//!
//! ```text
//! GET                 version:  this.system equalsEdgePoint && this.<end>.number == version
//! PUT, PATCH, DELETE  conflict: this.<end>.number == version
//! ```
//!
//! where `<end>` is the class's association end marked `version`.
//!
//! # Pipeline Position
//!
//! ```text
//! ... → Temporal → Service Criteria → Order By → Projections → ... → Assembly
//!                  ^^^^^^^^^^^^^^^^
//!                  YOU ARE HERE
//! ```

use super::units::declare_clauses;
use super::CompileContext;
use crate::error::InternalError;
use crate::state::ServiceIdx;
use crate::unit::{CompilationUnit, MacroKind, UnitBody};
use crate::walk::Frame;
use klass_ast::foundation::{Modifier, ServiceCriteriaKind, Verb};
use klass_ast::syntax::builder::{and, edge_point, eq, service_criteria, this_member, variable};
use klass_ast::syntax::ServiceCriteriaDecl;

const VERSION_PARAMETER: &str = "version";

pub fn infer_service_criteria(cx: &mut CompileContext<'_>) -> Result<(), InternalError> {
    let _span = tracing::debug_span!("infer_service_criteria").entered();

    let mut expanded = 0usize;
    for service in cx.state.service_indices().collect::<Vec<_>>() {
        if let Some(clause) = missing_clause(cx, service) {
            expand(cx, service, clause)?;
            expanded += 1;
        }
    }
    tracing::debug!(expanded, "service criteria inference done");
    Ok(())
}

fn missing_clause(cx: &CompileContext<'_>, service: ServiceIdx) -> Option<ServiceCriteriaDecl> {
    let state = &cx.state;
    let service_state = state.service(service);
    let url = state.url(service_state.url);
    let group = state.service_group(url.group);
    let klass = cx.registry.find_klass(&group.class_ref.name).resolved()?;

    let version_end = state
        .all_association_ends(klass)
        .into_iter()
        .find(|end| state.association_end(*end).has_modifier(Modifier::Version))?;
    let has_version_parameter = url
        .parameters()
        .iter()
        .any(|p| state.parameter(*p).name.name == VERSION_PARAMETER);
    if !has_version_parameter {
        return None;
    }

    let number = this_member(&format!(
        "{}.number",
        state.association_end(version_end).name.name
    ));
    let (kind, criteria) = match service_state.verb {
        Verb::Get => (
            ServiceCriteriaKind::Version,
            and(edge_point("system"), eq(number, variable(VERSION_PARAMETER))),
        ),
        Verb::Put | Verb::Patch | Verb::Delete => (
            ServiceCriteriaKind::Conflict,
            eq(number, variable(VERSION_PARAMETER)),
        ),
        Verb::Post => return None,
    };
    if service_state.has_clause(kind) {
        return None;
    }
    Some(service_criteria(kind, criteria))
}

fn expand(
    cx: &mut CompileContext<'_>,
    service: ServiceIdx,
    clause: ServiceCriteriaDecl,
) -> Result<(), InternalError> {
    let ctx = cx.state.service(service).ctx;
    let span = cx.state.service(service).span;
    let Some(parent) = cx.unit(ctx.unit) else {
        return Err(InternalError::UnknownContext(ctx));
    };
    tracing::debug!(%ctx, clause = %clause.kind, "inferring service criteria");
    let unit = CompilationUnit::from_macro(
        cx.next_unit_id(),
        parent,
        MacroKind::ServiceCriteria,
        ctx,
        span,
        UnitBody::ServiceCriteria {
            service,
            criteria: vec![clause],
        },
    );

    cx.expand_macro(unit, |cx, unit| {
        let UnitBody::ServiceCriteria { service, criteria } = &unit.body else {
            return Ok(());
        };
        cx.in_frame(Frame::Service(*service), |cx| {
            declare_clauses(cx, unit.id, *service, criteria, Some(MacroKind::ServiceCriteria));
            Ok(())
        })
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::infer_service_criteria;
    use crate::resolve::tests::{analyzed, versioned_tree};
    use crate::resolve::{CompileContext, ResolveOptions};
    use crate::unit::{CompilationUnit, MacroKind};
    use klass_ast::foundation::{ServiceCriteriaKind, Verb};

    fn inferred_clauses(verb: Verb, with_parameter: bool) -> Vec<(ServiceCriteriaKind, String)> {
        let outcome = analyzed(vec![versioned_tree(verb, with_parameter)]);
        outcome
            .state
            .services
            .iter()
            .flat_map(|s| s.clauses.iter())
            .filter(|c| c.inferred == Some(MacroKind::ServiceCriteria))
            .map(|c| (c.kind, c.decl.to_string()))
            .collect()
    }

    #[test]
    fn test_get_infers_version_clause() {
        let clauses = inferred_clauses(Verb::Get, true);
        assert_eq!(
            clauses,
            vec![(
                ServiceCriteriaKind::Version,
                "(this.system equalsEdgePoint && this.version.number == version)".to_string()
            )]
        );
    }

    #[test]
    fn test_put_infers_conflict_clause() {
        let clauses = inferred_clauses(Verb::Put, true);
        assert_eq!(
            clauses,
            vec![(
                ServiceCriteriaKind::Conflict,
                "this.version.number == version".to_string()
            )]
        );
    }

    #[test]
    fn test_no_inference_without_version_parameter() {
        assert!(inferred_clauses(Verb::Get, false).is_empty());
        assert!(inferred_clauses(Verb::Post, true).is_empty());
    }

    #[test]
    fn test_inference_is_idempotent() {
        let options = ResolveOptions::default();
        let units = vec![CompilationUnit::from_source(
            klass_ast::UnitId(0),
            "foo",
            versioned_tree(Verb::Put, true),
        )];
        let mut cx = CompileContext::new(&options, units);
        crate::resolve::analyze(&mut cx).unwrap();
        let units = cx.units.len();
        let clauses: usize = cx.state.services.iter().map(|s| s.clauses.len()).sum();

        infer_service_criteria(&mut cx).unwrap();

        assert_eq!(cx.units.len(), units);
        let after: usize = cx.state.services.iter().map(|s| s.clauses.len()).sum();
        assert_eq!(after, clauses);
    }
}
