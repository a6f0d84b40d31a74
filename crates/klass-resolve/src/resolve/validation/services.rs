//! Service group and service rules.

use super::{CompileContext, Findings};
use crate::error::ErrorKind;
use crate::resolution::Resolution;
use crate::state::{conforms_to, ClassifierIdx, ServiceGroupState, ServiceState};

pub(super) fn check(cx: &CompileContext<'_>, out: &mut Findings) {
    for group in &cx.state.service_groups {
        group_rules(cx, group, out);
        for url in group.urls.iter().map(|u| cx.state.url(*u)) {
            for service in url.services.iter().map(|s| cx.state.service(*s)) {
                clause_rules(service, out);
                projection_rules(cx, group, service, out);
            }
        }
    }
}

fn group_rules(cx: &CompileContext<'_>, group: &ServiceGroupState, out: &mut Findings) {
    let core = &group.core;
    match group.klass {
        Some(Resolution::NotFound) => {
            let message = match cx.registry.resolve(&group.class_ref.name).resolved() {
                Some(other) => format!(
                    "Service group '{}' is on '{}', which is a {} and not a class",
                    core.name.name,
                    group.class_ref.name,
                    other.kind_name()
                ),
                None => format!(
                    "Service group '{}' is on unknown class '{}'",
                    core.name.name, group.class_ref.name
                ),
            };
            out.push(
                ErrorKind::UnresolvedServiceGroupType,
                core.unit,
                group.class_ref.span,
                message,
            );
        }
        Some(Resolution::Resolved(klass)) => {
            let class = &cx.state.klass(klass).core.element;
            if class.unit == core.unit && class.ordinal > core.ordinal {
                out.push(
                    ErrorKind::ForwardReference,
                    core.unit,
                    group.class_ref.span,
                    format!(
                        "Service group '{}' refers to class '{}', \
                         which is declared later in the same file",
                        core.name.name, class.name.name
                    ),
                );
            }
        }
        Some(Resolution::Ambiguous) | None => {}
    }

    if group.urls.is_empty() {
        out.push(
            ErrorKind::EmptyServiceGroup,
            core.unit,
            core.name.span,
            format!("Service group '{}' must declare at least one url", core.name.name),
        );
    }
}

fn clause_rules(service: &ServiceState, out: &mut Findings) {
    let allowed = service.verb.allowed_criteria();
    for clause in &service.clauses {
        if !allowed.contains(&clause.kind) {
            out.push(
                ErrorKind::VerbCriteria,
                clause.unit,
                clause.keyword_span,
                format!(
                    "A {} service may not declare '{}' criteria",
                    service.verb, clause.kind
                ),
            );
        }
    }
}

fn projection_rules(
    cx: &CompileContext<'_>,
    group: &ServiceGroupState,
    service: &ServiceState,
    out: &mut Findings,
) {
    let (Some(name), Some(projection)) = (&service.projection_ref, service.projection) else {
        return;
    };
    let message = match projection {
        Resolution::Ambiguous => return,
        Resolution::NotFound => format!("Cannot find projection '{}'", name.name),
        Resolution::Resolved(projection) => {
            let Some(Resolution::Resolved(klass)) = group.klass else {
                return;
            };
            let Some(Resolution::Resolved(projected)) = cx.state.projection(projection).classifier
            else {
                return;
            };
            if conforms_to(&cx.state, ClassifierIdx::Klass(klass), projected) {
                return;
            }
            format!(
                "Projection '{}' is on '{}', not on '{}' or one of its supertypes",
                name.name,
                cx.state.classifier(projected).name(),
                group.class_ref.name
            )
        }
    };
    out.push(ErrorKind::ServiceProjection, service.ctx.unit, name.span, message);
}

#[cfg(test)]
mod tests {
    use crate::resolve::tests::{analyzed, codes};
    use klass_ast::foundation::{PrimitiveType, ServiceCriteriaKind, Verb};
    use klass_ast::syntax::builder::{eq, this_member, variable, TreeBuilder};

    fn foo() -> TreeBuilder {
        TreeBuilder::new("test").class("Foo", |c| {
            c.property("id", PrimitiveType::Long, |p| p.key())
                .property("name", PrimitiveType::String, |p| p)
        })
    }

    #[test]
    fn test_service_group_class_rules() {
        let tree = foo()
            .enumeration("Status", &["OPEN"])
            .service_group("StatusResource", "Status", |g| g)
            .service_group("BarResource", "Bar", |g| {
                g.url(|u| u.segment("bar").service(Verb::Get, |s| s))
            })
            .class("Bar", |c| c.property("id", PrimitiveType::Long, |p| p.key()))
            .build(0);
        let codes = codes(&analyzed(vec![tree]));
        assert!(codes.contains(&"ERR_SRG_TYP"));
        assert!(codes.contains(&"ERR_SER_EMP"));
        assert!(codes.contains(&"ERR_FWD_REF"));
    }

    #[test]
    fn test_verb_criteria_and_variables() {
        let tree = foo()
            .service_group("FooResource", "Foo", |g| {
                g.url(|u| {
                    u.segment("foo")
                        .path_param("id", PrimitiveType::Long)
                        .service(Verb::Post, |s| {
                            s.criteria(
                                ServiceCriteriaKind::Criteria,
                                eq(this_member("id"), variable("id")),
                            )
                        })
                        .service(Verb::Get, |s| {
                            s.criteria(
                                ServiceCriteriaKind::Criteria,
                                eq(this_member("name"), variable("name")),
                            )
                        })
                })
            })
            .build(0);
        let codes = codes(&analyzed(vec![tree]));
        assert!(codes.contains(&"ERR_VRB_CRT"));
        assert!(codes.contains(&"ERR_VAR_REF"));
    }

    #[test]
    fn test_service_projection_must_fit_class() {
        let tree = foo()
            .class("Bar", |c| c.property("id", PrimitiveType::Long, |p| p.key()))
            .projection("BarSummary", "Bar", |p| p.property("id", "Id"))
            .projection("FooSummary", "Foo", |p| p.property("name", "Name"))
            .service_group("FooResource", "Foo", |g| {
                g.url(|u| {
                    u.segment("foo")
                        .path_param("id", PrimitiveType::Long)
                        .service(Verb::Get, |s| {
                            s.criteria(
                                ServiceCriteriaKind::Criteria,
                                eq(this_member("id"), variable("id")),
                            )
                            .projection("BarSummary")
                        })
                })
                .url(|u| {
                    u.segment("foos")
                        .service(Verb::Get, |s| s.many().projection("FooSummary"))
                })
            })
            .build(0);
        let codes = codes(&analyzed(vec![tree]));
        assert_eq!(codes, vec!["ERR_SVC_PRJ"]);
    }
}
