//! Service phase.
//!
//! Resolves each service group's class, each service's projection and the
//! enumeration types of url parameters.
//!
//! # Pipeline Position
//!
//! ```text
//! ... → Projections → Services → Criteria → Joins → Validation → Assembly
//!                     ^^^^^^^^
//!                     YOU ARE HERE
//! ```

use super::CompileContext;
use crate::error::InternalError;
use crate::walk::Frame;
use klass_ast::syntax::PropertyType;

pub fn resolve_services(cx: &mut CompileContext<'_>) -> Result<(), InternalError> {
    let _span = tracing::debug_span!("resolve_services").entered();

    for group in cx.state.service_group_indices().collect::<Vec<_>>() {
        cx.in_frame(Frame::ServiceGroup(group), |cx| {
            let klass = cx
                .registry
                .find_klass(&cx.state.service_group(group).class_ref.name);
            cx.state.service_group_mut(group).klass = Some(klass);

            for url in cx.state.service_group(group).urls.clone() {
                for service in cx.state.url(url).services.clone() {
                    cx.in_frame(Frame::Service(service), |cx| {
                        let projection = cx
                            .state
                            .service(service)
                            .projection_ref
                            .as_ref()
                            .map(|name| cx.registry.find_projection(&name.name));
                        cx.state.service_mut(service).projection = projection;
                        Ok(())
                    })?;
                }
            }
            Ok(())
        })?;
    }

    for i in 0..cx.state.parameters.len() {
        if let PropertyType::Enumeration(name) = &cx.state.parameters[i].parameter_type {
            let enumeration = cx.registry.find_enumeration(&name.name);
            cx.state.parameters[i].enumeration = Some(enumeration);
        }
    }
    Ok(())
}
