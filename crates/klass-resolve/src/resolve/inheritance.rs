//! Inheritance phase.
//!
//! Resolves `extends` and `implements` clauses, and the type references of
//! classifier members (enumeration-typed properties and end signature
//! targets). Failures are stored as [`Resolution`]s and reported by the
//! reference validation phase.
//!
//! # Pipeline Position
//!
//! ```text
//! Units → Classifiers → Inheritance → Associations → Inference → ... → Assembly
//!                       ^^^^^^^^^^^
//!                       YOU ARE HERE
//! ```

use super::CompileContext;
use crate::resolution::Resolution;
use crate::state::{Classifier, ClassifierIdx};
use klass_ast::syntax::PropertyType;

pub fn resolve_inheritance(cx: &mut CompileContext<'_>) {
    let _span = tracing::debug_span!("resolve_inheritance").entered();

    for classifier in cx.state.classifiers() {
        let interfaces: Vec<_> = cx
            .state
            .classifier(classifier)
            .core()
            .declared_interfaces
            .iter()
            .map(|name| cx.registry.find_interface(&name.name))
            .collect();
        cx.state.classifier_core_mut(classifier).interfaces = interfaces;

        if let ClassifierIdx::Klass(klass) = classifier {
            let superclass = cx
                .state
                .klass(klass)
                .extends
                .as_ref()
                .map(|name| cx.registry.find_klass(&name.name));
            if let Some(Resolution::Resolved(parent)) = superclass {
                tracing::trace!(
                    class = cx.state.klass(klass).name(),
                    superclass = cx.state.klass(parent).name(),
                    "wired superclass"
                );
            }
            cx.state.klass_mut(klass).superclass = superclass;
        }
    }

    resolve_member_types(cx);
}

fn resolve_member_types(cx: &mut CompileContext<'_>) {
    for idx in cx.state.property_indices().collect::<Vec<_>>() {
        if let PropertyType::Enumeration(name) = &cx.state.property(idx).property_type {
            let resolution = cx.registry.find_enumeration(&name.name);
            cx.state.property_mut(idx).enumeration = Some(resolution);
        }
    }
    for i in 0..cx.state.end_signatures.len() {
        let signature = &mut cx.state.end_signatures[i];
        signature.target = Some(cx.registry.find_classifier(&signature.class_ref.name));
    }
}
