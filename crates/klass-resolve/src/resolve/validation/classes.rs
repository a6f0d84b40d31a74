//! Class-level rules.

use super::{CompileContext, Findings};
use crate::error::ErrorKind;
use crate::state::{all_data_type_properties, Classifier};
use klass_ast::foundation::Modifier;

pub(super) fn check(cx: &CompileContext<'_>, out: &mut Findings) {
    let state = &cx.state;
    for klass in state.klass_indices() {
        let class = state.klass(klass);
        let name = &class.core.element.name;
        let unit = class.core.element.unit;
        let properties: Vec<_> = all_data_type_properties(state, class)
            .into_iter()
            .map(|p| state.property(p))
            .collect();

        if !class.is_transient() && !properties.iter().any(|p| p.is_key()) {
            out.push(
                ErrorKind::MissingKey,
                unit,
                name.span,
                format!("Class '{}' must have at least one key property", name.name),
            );
        }

        let has_ids = properties.iter().any(|p| p.is_id());
        let has_plain_keys = properties.iter().any(|p| p.is_key() && !p.is_id());
        if has_ids && has_plain_keys {
            out.push(
                ErrorKind::KeysAndIds,
                unit,
                name.span,
                format!(
                    "Class '{}' may not have both id properties and non-id key properties",
                    name.name
                ),
            );
        }

        if class.is_transient() {
            for property in class.core.properties.iter().map(|p| state.property(*p)) {
                if property.is_id() {
                    out.push(
                        ErrorKind::TransientId,
                        property.ctx.unit,
                        property.name.span,
                        format!(
                            "Transient class '{}' may not have id property '{}'",
                            name.name, property.name.name
                        ),
                    );
                }
            }
        }

        let ends: Vec<_> = class
            .association_ends
            .iter()
            .map(|e| state.association_end(*e))
            .collect();
        let version = ends.iter().find(|e| e.has_modifier(Modifier::Version));
        let versioned = ends.iter().find(|e| e.has_modifier(Modifier::Versioned));
        if let (Some(version), Some(versioned)) = (version, versioned) {
            out.push(
                ErrorKind::VersionAndVersioned,
                unit,
                name.span,
                format!(
                    "Class '{}' may not have both version end '{}' and versioned end '{}'",
                    class.name(),
                    version.name.name,
                    versioned.name.name
                ),
            );
        }
    }
}
