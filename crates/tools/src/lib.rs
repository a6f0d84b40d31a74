// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Klass Tools
//!
//! CLI tools for working with Klass models.

use klass_model::{ClassifierId, DomainModel, TopLevelId};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging with a default filter.
///
/// Use `RUST_LOG` environment variable to override the default filter.
/// Default is `info` for klass crates and `warn` for others.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("warn,klass_tools=info,klass_compiler=info,klass_resolve=info")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Element counts of a compiled model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub enumerations: usize,
    pub interfaces: usize,
    pub classes: usize,
    pub associations: usize,
    pub projections: usize,
    pub service_groups: usize,
    pub properties: usize,
    pub foreign_keys: usize,
}

impl ModelSummary {
    pub fn of(model: &DomainModel) -> Self {
        let mut summary = ModelSummary {
            foreign_keys: model.parts().foreign_keys.len(),
            ..Self::default()
        };
        for id in model.top_level_elements() {
            match id {
                TopLevelId::Enumeration(_) => summary.enumerations += 1,
                TopLevelId::Interface(_) => summary.interfaces += 1,
                TopLevelId::Klass(klass) => {
                    summary.classes += 1;
                    summary.properties += model
                        .data_type_properties(ClassifierId::Klass(klass))
                        .len();
                }
                TopLevelId::Association(_) => summary.associations += 1,
                TopLevelId::Projection(_) => summary.projections += 1,
                TopLevelId::ServiceGroup(_) => summary.service_groups += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use klass_ast::foundation::PrimitiveType;
    use klass_ast::syntax::builder::TreeBuilder;
    use klass_compiler::{compile, CompilerConfig};

    #[test]
    fn test_summary_counts_inherited_properties() {
        let tree = TreeBuilder::new("test")
            .enumeration("Color", &["RED", "GREEN"])
            .class("Base", |c| {
                c.abstract_class(None)
                    .property("id", PrimitiveType::Long, |p| p.key())
            })
            .class("Leaf", |c| {
                c.extends("Base")
                    .enum_property("color", "Color", |p| p)
            })
            .into_tree();
        let result = compile(vec![("model.klass".to_string(), tree)], &CompilerConfig::default())
            .unwrap();
        let model = result.model.unwrap();
        let summary = ModelSummary::of(&model);
        assert_eq!(summary.classes, 2);
        assert_eq!(summary.enumerations, 1);
        // Leaf inherits `id` from Base
        assert_eq!(summary.properties, 3);
        assert_eq!(summary.foreign_keys, 0);
    }
}
