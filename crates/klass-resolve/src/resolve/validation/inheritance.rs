//! Inheritance and type reference rules.

use super::{CompileContext, Findings};
use crate::error::ErrorKind;
use crate::resolution::Resolution;
use crate::state::{
    implements_interface, Classifier, ClassifierIdx, ElementCore, InterfaceIdx, KlassIdx,
    TopLevelIdx,
};
use klass_ast::foundation::UnitId;
use klass_ast::syntax::{Ident, PropertyType};
use std::collections::{HashSet, VecDeque};

pub(super) fn check(cx: &CompileContext<'_>, out: &mut Findings) {
    for classifier in cx.state.classifiers() {
        interfaces(cx, classifier, out);
        if let ClassifierIdx::Klass(klass) = classifier {
            superclass(cx, klass, out);
        }
    }
    member_types(cx, out);
}

/// The declaration `name` refers to when it is not of the expected kind.
fn other_kind(cx: &CompileContext<'_>, name: &str) -> Option<TopLevelIdx> {
    cx.registry.resolve(name).resolved()
}

fn is_forward(referrer: &ElementCore, referenced: &ElementCore) -> bool {
    referrer.unit == referenced.unit && referenced.ordinal > referrer.ordinal
}

fn unresolved_type(out: &mut Findings, unit: UnitId, name: &Ident, what: &str) {
    out.push(
        ErrorKind::UnresolvedType,
        unit,
        name.span,
        format!("Cannot find {} '{}'", what, name.name),
    );
}

fn interfaces(cx: &CompileContext<'_>, classifier: ClassifierIdx, out: &mut Findings) {
    let state = cx.state.classifier(classifier);
    let core = state.core();
    let element = &core.element;

    for (name, resolution) in core.declared_interfaces.iter().zip(&core.interfaces) {
        let interface = match resolution {
            Resolution::Resolved(interface) => *interface,
            Resolution::Ambiguous => continue,
            Resolution::NotFound => {
                match other_kind(cx, &name.name) {
                    Some(other) => out.push(
                        ErrorKind::ImplementsNonInterface,
                        element.unit,
                        name.span,
                        format!(
                            "'{}' implements '{}', which is a {} and not an interface",
                            element.name.name,
                            name.name,
                            other.kind_name()
                        ),
                    ),
                    None => unresolved_type(out, element.unit, name, "interface"),
                }
                continue;
            }
        };

        let referenced = &cx.state.interface(interface).core.element;
        if is_forward(element, referenced) {
            out.push(
                ErrorKind::ForwardReference,
                element.unit,
                name.span,
                format!(
                    "'{}' implements '{}', which is declared later in the same file",
                    element.name.name, name.name
                ),
            );
        }

        let through_sibling = core
            .interfaces
            .iter()
            .filter_map(|r| r.resolved())
            .any(|other| {
                other != interface
                    && implements_interface(&cx.state, cx.state.interface(other), interface)
            });
        let through_superclass = state.superclass().is_some_and(|parent| {
            implements_interface(&cx.state, cx.state.klass(parent), interface)
        });
        if through_sibling || through_superclass {
            out.push(
                ErrorKind::RedundantInterface,
                element.unit,
                name.span,
                format!(
                    "'{}' is already implemented by a parent of '{}'",
                    name.name, element.name.name
                ),
            );
        }
    }

    if let ClassifierIdx::Interface(interface) = classifier {
        if interface_cycle(cx, interface) {
            out.push(
                ErrorKind::CircularInheritance,
                element.unit,
                element.name.span,
                format!("Interface '{}' implements itself", element.name.name),
            );
        }
    }
}

fn interface_cycle(cx: &CompileContext<'_>, start: InterfaceIdx) -> bool {
    let mut queue: VecDeque<_> = cx.state.interface(start).resolved_interfaces().into();
    let mut seen = HashSet::new();
    while let Some(next) = queue.pop_front() {
        if next == start {
            return true;
        }
        if seen.insert(next) {
            queue.extend(cx.state.interface(next).resolved_interfaces());
        }
    }
    false
}

fn superclass(cx: &CompileContext<'_>, klass: KlassIdx, out: &mut Findings) {
    let state = cx.state.klass(klass);
    let element = &state.core.element;
    let (Some(name), Some(resolution)) = (&state.extends, state.superclass) else {
        return;
    };
    match resolution {
        Resolution::Resolved(parent) => {
            // Walk up from the parent; reaching this class again is a cycle
            let mut seen = HashSet::new();
            let mut current = Some(parent);
            while let Some(next) = current {
                if next == klass {
                    out.push(
                        ErrorKind::CircularInheritance,
                        element.unit,
                        name.span,
                        format!(
                            "Class '{}' extends '{}', which inherits from '{}'",
                            element.name.name, name.name, element.name.name
                        ),
                    );
                    break;
                }
                if !seen.insert(next) {
                    break;
                }
                current = cx.state.klass(next).superclass();
            }
        }
        Resolution::Ambiguous => {}
        Resolution::NotFound => match other_kind(cx, &name.name) {
            Some(other) => out.push(
                ErrorKind::ExtendsNonClass,
                element.unit,
                name.span,
                format!(
                    "Class '{}' extends '{}', which is a {} and not a class",
                    element.name.name,
                    name.name,
                    other.kind_name()
                ),
            ),
            None => unresolved_type(out, element.unit, name, "class"),
        },
    }
}

fn member_types(cx: &CompileContext<'_>, out: &mut Findings) {
    let state = &cx.state;
    for property in &state.properties {
        if let (PropertyType::Enumeration(name), Some(Resolution::NotFound)) =
            (&property.property_type, property.enumeration)
        {
            unresolved_type(out, property.ctx.unit, name, "enumeration");
        }
    }
    for parameter in &state.parameters {
        if let (PropertyType::Enumeration(name), Some(Resolution::NotFound)) =
            (&parameter.parameter_type, parameter.enumeration)
        {
            unresolved_type(out, parameter.ctx.unit, name, "enumeration");
        }
    }
    for signature in &state.end_signatures {
        if signature.target == Some(Resolution::NotFound) {
            unresolved_type(out, signature.ctx.unit, &signature.class_ref, "classifier");
        }
    }
    for end in &state.association_ends {
        if end.target.is_not_found() {
            unresolved_type(out, end.ctx.unit, &end.class_ref, "class");
        }
    }
    for projection in &state.projections {
        if projection.classifier == Some(Resolution::NotFound) {
            unresolved_type(out, projection.core.unit, &projection.class_ref, "classifier");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::resolve::tests::{analyzed, codes};
    use klass_ast::foundation::PrimitiveType;
    use klass_ast::syntax::builder::TreeBuilder;

    #[test]
    fn test_interface_forward_reference_in_same_file() {
        let tree = TreeBuilder::new("test")
            .class("Foo", |c| {
                c.implements("Named")
                    .property("id", PrimitiveType::Long, |p| p.key())
            })
            .interface("Named", |i| i.property("name", PrimitiveType::String, |p| p))
            .build(0);
        assert!(codes(&analyzed(vec![tree])).contains(&"ERR_FWD_REF"));
    }

    #[test]
    fn test_extends_across_files_is_not_forward_reference() {
        let first = TreeBuilder::new("test")
            .class("Leaf", |c| c.extends("Base"))
            .build(0);
        let second = TreeBuilder::new("test")
            .class("Base", |c| c.property("id", PrimitiveType::Long, |p| p.key()))
            .build(1);
        let codes = codes(&analyzed(vec![first, second]));
        assert!(!codes.contains(&"ERR_FWD_REF"));
        assert!(codes.is_empty(), "{codes:?}");
    }

    #[test]
    fn test_extends_wrong_kind_and_missing() {
        let tree = TreeBuilder::new("test")
            .interface("Named", |i| i)
            .class("Foo", |c| {
                c.extends("Named")
                    .property("id", PrimitiveType::Long, |p| p.key())
            })
            .class("Bar", |c| {
                c.extends("Missing")
                    .implements("Foo")
                    .property("id", PrimitiveType::Long, |p| p.key())
            })
            .build(0);
        let codes = codes(&analyzed(vec![tree]));
        assert!(codes.contains(&"ERR_EXT_INT"));
        assert!(codes.contains(&"ERR_REF_TYP"));
        assert!(codes.contains(&"ERR_IMP_INT"));
    }

    #[test]
    fn test_circular_inheritance() {
        let tree = TreeBuilder::new("test")
            .class("A", |c| {
                c.extends("B")
                    .property("id", PrimitiveType::Long, |p| p.key())
            })
            .class("B", |c| c.extends("A"))
            .build(0);
        let codes = codes(&analyzed(vec![tree]));
        assert_eq!(codes.iter().filter(|c| **c == "ERR_CIR_INH").count(), 2);
    }

    #[test]
    fn test_redundant_interface() {
        let tree = TreeBuilder::new("test")
            .interface("Named", |i| i)
            .interface("Titled", |i| i.implements("Named"))
            .class("Foo", |c| {
                c.implements("Titled")
                    .implements("Named")
                    .property("id", PrimitiveType::Long, |p| p.key())
            })
            .build(0);
        assert!(codes(&analyzed(vec![tree])).contains(&"ERR_RED_INT"));
    }
}
