//! Declaration phase.
//!
//! Walks every source unit in order and creates a state record for each
//! top-level declaration, drawing ordinals from the registry so they follow
//! declaration order across files. Elements whose children only make sense
//! inside them (enumeration literals, association ends, urls, parameters
//! and services) are created here as well. Classifier members are left to
//! the classifier phase, which is also the entry point for synthesized
//! members.
//!
//! # Pipeline Position
//!
//! ```text
//! Units → Classifiers → Inheritance → Associations → Inference → ... → Assembly
//! ^^^^^
//! YOU ARE HERE
//! ```

use super::CompileContext;
use crate::error::InternalError;
use crate::resolution::Resolution;
use crate::state::{
    AssociationEndIdx, AssociationEndState, AssociationIdx, AssociationState, ClassifierCore,
    ElementCore, EnumerationState, InterfaceState, KlassState, ParameterIdx, ParameterState,
    ProjectionState, ServiceClauseState, ServiceGroupIdx, ServiceGroupState, ServiceIdx,
    ServiceState, StateRef, TopLevelIdx, UrlIdx, UrlSegmentState, UrlState,
};
use crate::unit::{CompilationUnit, MacroKind};
use crate::walk::Frame;
use klass_ast::foundation::UnitId;
use klass_ast::syntax::{
    AssociationDecl, AssociationEndDecl, ParameterDecl, ServiceCriteriaDecl, ServiceGroupDecl,
    TopLevelDecl, UrlDecl, UrlSegment,
};

pub fn declare_units(cx: &mut CompileContext<'_>) -> Result<(), InternalError> {
    let _span = tracing::debug_span!("declare_units").entered();

    let units = std::mem::take(&mut cx.units);
    let result = units
        .iter()
        .try_for_each(|unit| cx.in_frame(Frame::Unit(unit.id), |cx| declare_unit(cx, unit)));
    cx.units = units;
    result?;

    tracing::debug!(
        elements = cx.state.top_level_elements().len(),
        "declared top-level elements"
    );
    Ok(())
}

fn declare_unit(cx: &mut CompileContext<'_>, unit: &CompilationUnit) -> Result<(), InternalError> {
    let Some(tree) = unit.source_tree() else {
        return Ok(());
    };
    for element in &tree.elements {
        let core = ElementCore {
            name: element.name().clone(),
            package: unit.package.clone(),
            ordinal: cx.registry.assign_ordinal(),
            unit: unit.id,
            source_name: unit.source_name.clone(),
            ctx: unit.context(element.id()),
            span: element.span(),
        };
        let ctx = core.ctx;
        let name = core.name.name.clone();

        let idx = match element {
            TopLevelDecl::Enumeration(decl) => TopLevelIdx::Enumeration(cx.state.add_enumeration(
                EnumerationState {
                    core,
                    literals: decl.literals.clone(),
                },
            )),
            TopLevelDecl::Interface(decl) => {
                let idx = cx.state.next_interface_idx();
                let mut core = ClassifierCore::new(core);
                core.modifiers = decl.modifiers.clone();
                core.declared_interfaces = decl.implements.clone();
                TopLevelIdx::Interface(cx.state.add_interface(InterfaceState { idx, core }))
            }
            TopLevelDecl::Class(decl) => {
                let idx = cx.state.next_klass_idx();
                let mut core = ClassifierCore::new(core);
                core.modifiers = decl.modifiers.clone();
                core.declared_interfaces = decl.implements.clone();
                TopLevelIdx::Klass(cx.state.add_klass(KlassState {
                    idx,
                    core,
                    is_user: decl.is_user,
                    abstract_decl: decl.abstract_decl.clone(),
                    extends: decl.extends.clone(),
                    superclass: None,
                    association_ends: Vec::new(),
                }))
            }
            TopLevelDecl::Association(decl) => {
                TopLevelIdx::Association(declare_association(cx, unit, core, decl)?)
            }
            TopLevelDecl::Projection(decl) => {
                TopLevelIdx::Projection(cx.state.add_projection(ProjectionState {
                    core,
                    class_ref: decl.class_ref.clone(),
                    classifier: None,
                    children_decl: decl.children.clone(),
                    children: Vec::new(),
                }))
            }
            TopLevelDecl::ServiceGroup(decl) => {
                TopLevelIdx::ServiceGroup(declare_service_group(cx, unit, core, decl)?)
            }
        };

        tracing::trace!(name = %name, kind = element.kind_name(), "declared");
        cx.registry.register(&name, idx, ctx)?;
    }
    Ok(())
}

fn declare_association(
    cx: &mut CompileContext<'_>,
    unit: &CompilationUnit,
    core: ElementCore,
    decl: &AssociationDecl,
) -> Result<AssociationIdx, InternalError> {
    let association = cx.state.next_association_idx();
    let source = cx.state.next_association_end_idx();
    let end_state = |end: &AssociationEndDecl, is_source: bool, opposite| AssociationEndState {
        name: end.name.clone(),
        association,
        is_source,
        class_ref: end.class_ref.clone(),
        target: Resolution::NotFound,
        owner: None,
        multiplicity: end.multiplicity,
        modifiers: end.modifiers.clone(),
        order_by_decl: end.order_by.clone(),
        order_by: None,
        opposite,
        ctx: unit.context(end.id),
        span: end.span,
    };

    let target_idx = AssociationEndIdx(source.0 + 1);
    let source_idx = cx.state.add_association_end(end_state(&decl.source, true, target_idx));
    let target_idx = cx.state.add_association_end(end_state(&decl.target, false, source_idx));

    for (idx, end) in [(source_idx, &decl.source), (target_idx, &decl.target)] {
        cx.registry
            .register_context(unit.context(end.id), StateRef::AssociationEnd(idx))?;
    }

    Ok(cx.state.add_association(AssociationState {
        core,
        source: source_idx,
        target: target_idx,
        relationship_decl: decl.relationship.clone(),
        relationship: None,
        join: None,
        foreign_keys: Vec::new(),
    }))
}

fn declare_service_group(
    cx: &mut CompileContext<'_>,
    unit: &CompilationUnit,
    core: ElementCore,
    decl: &ServiceGroupDecl,
) -> Result<ServiceGroupIdx, InternalError> {
    let group = cx.state.add_service_group(ServiceGroupState {
        core,
        class_ref: decl.class_ref.clone(),
        klass: None,
        urls: Vec::new(),
    });
    for url in &decl.urls {
        let url_idx = declare_url(cx, unit, group, url)?;
        cx.state.service_group_mut(group).urls.push(url_idx);
    }
    Ok(group)
}

fn declare_url(
    cx: &mut CompileContext<'_>,
    unit: &CompilationUnit,
    group: ServiceGroupIdx,
    decl: &UrlDecl,
) -> Result<UrlIdx, InternalError> {
    let ctx = unit.context(decl.id);
    let url = cx.state.add_url(UrlState {
        group,
        path: Vec::new(),
        query_parameters: Vec::new(),
        services: Vec::new(),
        normalized_path: decl.normalized_path(),
        display_path: decl.display_path(),
        ctx,
        span: decl.span,
    });
    cx.registry.register_context(ctx, StateRef::Url(url))?;

    for segment in &decl.path {
        let segment = match segment {
            UrlSegment::Constant(name) => UrlSegmentState::Constant(name.name.clone()),
            UrlSegment::Parameter(parameter) => {
                UrlSegmentState::Parameter(declare_parameter(cx, unit, url, parameter)?)
            }
        };
        cx.state.url_mut(url).path.push(segment);
    }
    for parameter in &decl.query_parameters {
        let idx = declare_parameter(cx, unit, url, parameter)?;
        cx.state.url_mut(url).query_parameters.push(idx);
    }

    for service in &decl.services {
        let ctx = unit.context(service.id);
        let idx = cx.state.add_service(ServiceState {
            url,
            verb: service.verb,
            multiplicity: service.multiplicity,
            clauses: Vec::new(),
            projection_ref: service.projection.clone(),
            projection: None,
            order_by_decl: service.order_by.clone(),
            order_by: None,
            ctx,
            span: service.span,
        });
        cx.registry.register_context(ctx, StateRef::Service(idx))?;
        declare_clauses(cx, unit.id, idx, &service.criteria, None);
        cx.state.url_mut(url).services.push(idx);
    }
    Ok(url)
}

fn declare_parameter(
    cx: &mut CompileContext<'_>,
    unit: &CompilationUnit,
    url: UrlIdx,
    decl: &ParameterDecl,
) -> Result<ParameterIdx, InternalError> {
    let ctx = unit.context(decl.id);
    let idx = cx.state.add_parameter(ParameterState {
        url,
        name: decl.name.clone(),
        parameter_type: decl.parameter_type.clone(),
        enumeration: None,
        multiplicity: decl.multiplicity,
        ctx,
        span: decl.span,
    });
    cx.registry.register_context(ctx, StateRef::Parameter(idx))?;
    Ok(idx)
}

/// Attach criteria clauses to a service.
///
/// Shared by hand-written services and the service criteria inference.
pub fn declare_clauses(
    cx: &mut CompileContext<'_>,
    unit: UnitId,
    service: ServiceIdx,
    clauses: &[ServiceCriteriaDecl],
    inferred: Option<MacroKind>,
) {
    let service = cx.state.service_mut(service);
    service
        .clauses
        .extend(clauses.iter().map(|clause| ServiceClauseState {
            kind: clause.kind,
            keyword_span: clause.keyword_span,
            decl: clause.criteria.clone(),
            criteria: None,
            unit,
            inferred,
            span: clause.span,
        }));
}
