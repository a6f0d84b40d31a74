//! Duplicate phase.
//!
//! Reports every name, modifier, validation, url, parameter and clause that
//! appears more than once where it must be unique. Each occurrence gets its
//! own diagnostic.
//!
//! # Pipeline Position
//!
//! ```text
//! ... → Joins → Duplicates → Names → Validation → Assembly
//!               ^^^^^^^^^^
//!               YOU ARE HERE
//! ```

use super::CompileContext;
use crate::error::ErrorKind;
use crate::state::{Classifier, ClassifierIdx, KlassIdx, ProjectionElementState};
use klass_ast::foundation::{Modifier, Span, UnitId};
use klass_ast::syntax::ModifierDecl;
use std::collections::HashMap;
use std::hash::Hash;

/// Every item whose key occurs more than once, in input order.
pub(crate) fn repeated<K: Eq + Hash, T>(items: impl IntoIterator<Item = (K, T)>) -> Vec<T> {
    let items: Vec<(K, T)> = items.into_iter().collect();
    let mut counts: HashMap<&K, usize> = HashMap::new();
    for (key, _) in &items {
        *counts.entry(key).or_default() += 1;
    }
    let repeated_keys: Vec<bool> = items.iter().map(|(key, _)| counts[key] > 1).collect();
    items
        .into_iter()
        .zip(repeated_keys)
        .filter_map(|((_, item), repeated)| repeated.then_some(item))
        .collect()
}

pub fn check_duplicates(cx: &mut CompileContext<'_>) {
    let _span = tracing::debug_span!("check_duplicates").entered();
    let before = cx.diagnostics.len();

    top_level_names(cx);
    user_classes(cx);
    for classifier in cx.state.classifiers() {
        classifier_members(cx, classifier);
        if let ClassifierIdx::Klass(klass) = classifier {
            version_members(cx, klass);
        }
    }
    property_details(cx);
    enumeration_literals(cx);
    service_groups(cx);
    projection_children(cx);

    tracing::debug!(reported = cx.diagnostics.len() - before, "duplicate checks done");
}

fn top_level_names(cx: &mut CompileContext<'_>) {
    let ambiguous: Vec<String> = cx
        .registry
        .names()
        .filter(|(_, resolution)| resolution.is_ambiguous())
        .map(|(name, _)| name.to_string())
        .collect();
    for element in cx.state.top_level_elements() {
        let core = cx.state.element_core(element);
        if ambiguous.contains(&core.name.name) {
            let (unit, span) = (core.unit, core.name.span);
            let message = format!(
                "Duplicate top level item name: '{}' ({})",
                core.name.name,
                element.kind_name()
            );
            cx.report(ErrorKind::DuplicateTopLevel, unit, span, message);
        }
    }
}

fn user_classes(cx: &mut CompileContext<'_>) {
    let users: Vec<KlassIdx> = cx
        .state
        .klass_indices()
        .filter(|k| cx.state.klass(*k).is_user)
        .collect();
    if users.len() < 2 {
        return;
    }
    for user in users {
        let core = &cx.state.klass(user).core.element;
        let (unit, span) = (core.unit, core.name.span);
        let message = format!("Only one 'user' class is allowed, found '{}'", core.name.name);
        cx.report(ErrorKind::DuplicateUser, unit, span, message);
    }
}

fn duplicate_modifiers(
    cx: &mut CompileContext<'_>,
    unit: UnitId,
    owner: &str,
    modifiers: &[ModifierDecl],
) {
    for modifier in repeated(modifiers.iter().map(|m| (m.modifier, m))) {
        let message = format!("Duplicate modifier '{}' on '{}'", modifier.modifier, owner);
        cx.report(ErrorKind::DuplicateModifier, unit, modifier.span, message);
    }
}

fn classifier_members(cx: &mut CompileContext<'_>, classifier: ClassifierIdx) {
    let state = cx.state.classifier(classifier);
    let core = state.core();
    let unit = core.element.unit;
    let owner = core.element.name.name.clone();

    // Properties, end signatures and navigable association ends share a namespace
    let mut members: Vec<(String, UnitId, Span)> = Vec::new();
    members.extend(core.properties.iter().map(|p| {
        let property = cx.state.property(*p);
        (property.name.name.clone(), property.ctx.unit, property.name.span)
    }));
    members.extend(core.end_signatures.iter().map(|s| {
        let signature = cx.state.end_signature(*s);
        (signature.name.name.clone(), signature.ctx.unit, signature.name.span)
    }));
    if let ClassifierIdx::Klass(klass) = classifier {
        members.extend(cx.state.klass(klass).association_ends.iter().map(|e| {
            let end = cx.state.association_end(*e);
            (end.name.name.clone(), end.ctx.unit, end.name.span)
        }));
    }
    let modifiers = core.modifiers.clone();
    let interfaces = core.declared_interfaces.clone();

    for (name, member_unit, span) in repeated(members.into_iter().map(|m| (m.0.clone(), m))) {
        let message = format!("Duplicate member: '{}.{}'", owner, name);
        cx.report(ErrorKind::DuplicateMember, member_unit, span, message);
    }
    duplicate_modifiers(cx, unit, &owner, &modifiers);
    for interface in repeated(interfaces.iter().map(|i| (i.name.as_str(), i))) {
        let message = format!(
            "Duplicate interface '{}' implemented by '{}'",
            interface.name, owner
        );
        cx.report(ErrorKind::DuplicateInterface, unit, interface.span, message);
    }

    // At most one id, createdBy and lastUpdatedBy property
    let properties = cx.state.classifier(classifier).core().properties.clone();
    for modifier in [Modifier::Id, Modifier::CreatedBy, Modifier::LastUpdatedBy] {
        let marked: Vec<_> = properties
            .iter()
            .filter(|p| cx.state.property(**p).has_modifier(modifier))
            .copied()
            .collect();
        if marked.len() < 2 {
            continue;
        }
        for property in marked {
            let property = cx.state.property(property);
            let (unit, span) = (property.ctx.unit, property.name.span);
            let message = format!(
                "Multiple '{}' properties on '{}': '{}'",
                modifier, owner, property.name.name
            );
            cx.report(ErrorKind::DuplicateModifier, unit, span, message);
        }
    }
}

fn version_members(cx: &mut CompileContext<'_>, klass: KlassIdx) {
    let state = cx.state.klass(klass);
    let owner = state.name().to_string();
    let mut spans: Vec<(UnitId, Span, String)> = Vec::new();

    let versions: Vec<_> = state
        .core
        .properties
        .iter()
        .map(|p| cx.state.property(*p))
        .filter(|p| p.has_modifier(Modifier::Version))
        .map(|p| (p.ctx.unit, p.name.span, p.name.name.clone()))
        .collect();
    if versions.len() > 1 {
        spans.extend(versions);
    }
    for modifier in [Modifier::Version, Modifier::Versioned] {
        let ends: Vec<_> = state
            .association_ends
            .iter()
            .map(|e| cx.state.association_end(*e))
            .filter(|e| e.has_modifier(modifier))
            .map(|e| (e.ctx.unit, e.name.span, e.name.name.clone()))
            .collect();
        if ends.len() > 1 {
            spans.extend(ends);
        }
    }
    for (unit, span, name) in spans {
        let message = format!("Multiple version members on '{}': '{}'", owner, name);
        cx.report(ErrorKind::DuplicateVersion, unit, span, message);
    }
}

fn property_details(cx: &mut CompileContext<'_>) {
    for idx in cx.state.property_indices().collect::<Vec<_>>() {
        let property = cx.state.property(idx);
        let unit = property.ctx.unit;
        let name = property.name.name.clone();
        let modifiers = property.modifiers.clone();
        let validations: Vec<_> = repeated(property.validations.iter().map(|v| (v.kind, v)))
            .into_iter()
            .map(|v| (v.kind, v.span))
            .collect();

        duplicate_modifiers(cx, unit, &name, &modifiers);
        for (kind, span) in validations {
            let message = format!("Duplicate validation '{}' on '{}'", kind, name);
            cx.report(ErrorKind::DuplicateValidation, unit, span, message);
        }
    }
    for i in 0..cx.state.end_signatures.len() {
        let signature = &cx.state.end_signatures[i];
        let (unit, name, modifiers) = (
            signature.ctx.unit,
            signature.name.name.clone(),
            signature.modifiers.clone(),
        );
        duplicate_modifiers(cx, unit, &name, &modifiers);
    }
    for i in 0..cx.state.association_ends.len() {
        let end = &cx.state.association_ends[i];
        let (unit, name, modifiers) = (end.ctx.unit, end.name.name.clone(), end.modifiers.clone());
        duplicate_modifiers(cx, unit, &name, &modifiers);
    }
}

fn enumeration_literals(cx: &mut CompileContext<'_>) {
    for i in 0..cx.state.enumerations.len() {
        let enumeration = &cx.state.enumerations[i];
        let unit = enumeration.core.unit;
        let owner = enumeration.core.name.name.clone();
        let literals: Vec<_> = repeated(
            enumeration
                .literals
                .iter()
                .map(|l| (l.name.name.clone(), (l.name.name.clone(), l.name.span))),
        );
        // Pretty names must be unique too
        let pretty: Vec<_> = repeated(enumeration.literals.iter().filter_map(|l| {
            l.pretty_name
                .clone()
                .map(|pretty| (pretty.clone(), (pretty, l.span)))
        }));
        for (name, span) in literals.into_iter().chain(pretty) {
            let message = format!("Duplicate enumeration literal '{}.{}'", owner, name);
            cx.report(ErrorKind::DuplicateLiteral, unit, span, message);
        }
    }
}

fn service_groups(cx: &mut CompileContext<'_>) {
    // One service group per class
    let groups: Vec<_> = cx
        .state
        .service_group_indices()
        .map(|g| {
            let group = cx.state.service_group(g);
            (
                cx.registry.find_klass(&group.class_ref.name),
                (group.core.unit, group.class_ref.clone()),
            )
        })
        .filter(|(klass, _)| klass.is_resolved())
        .collect();
    for (unit, class_ref) in repeated(groups) {
        let message = format!("Multiple service groups for class '{}'", class_ref.name);
        cx.report(ErrorKind::DuplicateServiceGroup, unit, class_ref.span, message);
    }

    for group in cx.state.service_group_indices().collect::<Vec<_>>() {
        let state = cx.state.service_group(group);
        let unit = state.core.unit;
        let urls = repeated(state.urls.iter().map(|u| {
            let url = cx.state.url(*u);
            (url.normalized_path.clone(), (url.display_path.clone(), url.span))
        }));
        for (path, span) in urls {
            let message = format!("Duplicate url '{}' in '{}'", path, state.core.name.name);
            cx.diagnostics.report(ErrorKind::DuplicateUrl, unit, span, message);
        }

        for url in state.urls.clone() {
            let parameters = repeated(cx.state.url(url).parameters().into_iter().map(|p| {
                let parameter = cx.state.parameter(p);
                (parameter.name.name.clone(), (parameter.name.clone(), parameter.ctx.unit))
            }));
            for (name, unit) in parameters {
                let message = format!(
                    "Duplicate parameter '{}' in url '{}'",
                    name.name,
                    cx.state.url(url).display_path
                );
                cx.diagnostics.report(ErrorKind::DuplicateParameter, unit, name.span, message);
            }

            for service in cx.state.url(url).services.clone() {
                let clauses = repeated(
                    cx.state
                        .service(service)
                        .clauses
                        .iter()
                        .map(|c| (c.kind, (c.kind, c.unit, c.keyword_span))),
                );
                for (kind, unit, span) in clauses {
                    let message = format!("Duplicate '{}' clause", kind);
                    cx.diagnostics.report(ErrorKind::DuplicateCriteria, unit, span, message);
                }
            }
        }
    }
}

fn projection_children(cx: &mut CompileContext<'_>) {
    fn check(
        children: &[ProjectionElementState],
        owner: &str,
        unit: UnitId,
        found: &mut Vec<(UnitId, Span, String)>,
    ) {
        for child in repeated(children.iter().map(|c| (c.name().name.as_str(), c))) {
            found.push((unit, child.name().span, format!("{}.{}", owner, child.name().name)));
        }
        for child in children {
            if let ProjectionElementState::Reference { name, children, .. } = child {
                check(children, &format!("{}.{}", owner, name.name), unit, found);
            }
        }
    }

    let mut found = Vec::new();
    for projection in &cx.state.projections {
        check(
            &projection.children,
            &projection.core.name.name,
            projection.core.unit,
            &mut found,
        );
    }
    for (unit, span, name) in found {
        let message = format!("Duplicate projection member '{}'", name);
        cx.report(ErrorKind::DuplicateProjectionMember, unit, span, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::tests::{analyzed, codes};
    use klass_ast::foundation::PrimitiveType;
    use klass_ast::syntax::builder::TreeBuilder;

    #[test]
    fn test_repeated_keeps_every_occurrence() {
        let items = vec![("a", 1), ("b", 2), ("a", 3)];
        assert_eq!(repeated(items), vec![1, 3]);
    }

    #[test]
    fn test_duplicate_top_level_names_reported_for_each() {
        let tree = TreeBuilder::new("test")
            .class("Foo", |c| c.property("id", PrimitiveType::Long, |p| p.key()))
            .enumeration("Foo", &["A"])
            .build(0);
        let outcome = analyzed(vec![tree]);

        let duplicates = codes(&outcome)
            .into_iter()
            .filter(|code| *code == "ERR_DUP_TOP")
            .count();
        assert_eq!(duplicates, 2);
        assert!(outcome.registry.resolve("Foo").is_ambiguous());
    }

    #[test]
    fn test_duplicate_member_and_validation() {
        let tree = TreeBuilder::new("test")
            .class("Foo", |c| {
                c.property("id", PrimitiveType::Long, |p| p.key())
                    .property("name", PrimitiveType::String, |p| {
                        p.validation(klass_ast::foundation::ValidationKind::MaxLength, 10)
                            .validation(klass_ast::foundation::ValidationKind::MaxLength, 20)
                    })
                    .property("name", PrimitiveType::String, |p| p)
            })
            .build(0);
        let codes = codes(&analyzed(vec![tree]));

        assert_eq!(codes.iter().filter(|c| **c == "ERR_DUP_MEM").count(), 2);
        assert!(codes.contains(&"ERR_DUP_VAL"));
    }

    #[test]
    fn test_duplicate_urls_compare_normalized_paths() {
        let tree = TreeBuilder::new("test")
            .class("Foo", |c| c.property("id", PrimitiveType::Long, |p| p.key()))
            .service_group("FooResource", "Foo", |g| {
                g.url(|u| {
                    u.segment("foo")
                        .path_param("id", PrimitiveType::Long)
                        .service(klass_ast::foundation::Verb::Get, |s| s)
                })
                .url(|u| {
                    u.segment("foo")
                        .path_param("key", PrimitiveType::Long)
                        .service(klass_ast::foundation::Verb::Delete, |s| s)
                })
            })
            .build(0);
        let codes = codes(&analyzed(vec![tree]));

        assert_eq!(codes.iter().filter(|c| **c == "ERR_DUP_URL").count(), 2);
    }
}
