//! Name phase.
//!
//! Checks the spelling of declared names: top-level names are UpperCamel,
//! member, end and parameter names are lowerCamel, and package segments are
//! lowercase-initial. Structural keywords are never valid names, and a
//! top-level name may not shadow a primitive type.
//!
//! # Pipeline Position
//!
//! ```text
//! ... → Duplicates → Names → Validation → Assembly
//!                    ^^^^^
//!                    YOU ARE HERE
//! ```

use super::CompileContext;
use crate::error::ErrorKind;
use klass_ast::foundation::PrimitiveType;

const LANGUAGE_KEYWORDS: &[&str] = &[
    "package",
    "enumeration",
    "interface",
    "class",
    "association",
    "projection",
    "service",
    "relationship",
    "orderBy",
    "implements",
    "extends",
    "abstract",
    "this",
    "null",
    "true",
    "false",
    "all",
    "native",
    "equalsEdgePoint",
];

fn is_keyword(name: &str) -> bool {
    LANGUAGE_KEYWORDS.contains(&name)
}

fn is_camel(name: &str, upper: bool) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let first_ok = if upper {
        first.is_ascii_uppercase()
    } else {
        first.is_ascii_lowercase()
    };
    first_ok && chars.all(|c| c.is_ascii_alphanumeric()) && !is_keyword(name)
}

pub fn is_top_level_name(name: &str) -> bool {
    is_camel(name, true) && !PrimitiveType::ALL.iter().any(|p| p.keyword() == name)
}

pub fn is_member_name(name: &str) -> bool {
    is_camel(name, false)
}

pub fn is_package_name(name: &str) -> bool {
    name.split('.').all(|segment| {
        let mut chars = segment.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
            && chars.all(|c| c.is_ascii_alphanumeric())
    })
}

pub fn check_names(cx: &mut CompileContext<'_>) {
    let _span = tracing::debug_span!("check_names").entered();
    let mut found = Vec::new();

    for unit in &cx.units {
        if let Some(tree) = unit.source_tree() {
            if !is_package_name(&tree.package.name) {
                found.push((
                    ErrorKind::PackageName,
                    unit.id,
                    tree.package.span,
                    format!("Invalid package name '{}'", tree.package.name),
                ));
            }
        }
    }
    for element in cx.state.top_level_elements() {
        let core = cx.state.element_core(element);
        if !is_top_level_name(&core.name.name) {
            found.push((
                ErrorKind::TopLevelName,
                core.unit,
                core.name.span,
                format!(
                    "Name must match pattern UpperCamelCase: {} '{}'",
                    element.kind_name(),
                    core.name.name
                ),
            ));
        }
    }
    for property in &cx.state.properties {
        if !is_member_name(&property.name.name) {
            found.push((
                ErrorKind::MemberName,
                property.ctx.unit,
                property.name.span,
                format!("Name must match pattern lowerCamelCase: '{}'", property.name.name),
            ));
        }
    }
    for parameter in &cx.state.parameters {
        if !is_member_name(&parameter.name.name) {
            found.push((
                ErrorKind::MemberName,
                parameter.ctx.unit,
                parameter.name.span,
                format!("Name must match pattern lowerCamelCase: '{}'", parameter.name.name),
            ));
        }
    }
    let ends = cx
        .state
        .end_signatures
        .iter()
        .map(|s| (&s.name, s.ctx.unit))
        .chain(cx.state.association_ends.iter().map(|e| (&e.name, e.ctx.unit)));
    for (name, unit) in ends {
        if !is_member_name(&name.name) {
            found.push((
                ErrorKind::EndName,
                unit,
                name.span,
                format!("Name must match pattern lowerCamelCase: '{}'", name.name),
            ));
        }
    }

    for (kind, unit, span, message) in found {
        cx.report(kind, unit, span, message);
    }
}
