//! Semantic analysis pipeline.
//!
//! Turns compilation units into compiler state, reports every semantic
//! problem it finds, and assembles a [`DomainModel`] when none of them is an
//! error.
//!
//! # Pipeline Position
//!
//! ```text
//! SourceTree → CompilationUnit → Phases → Assembly → DomainModel
//!                                ^^^^^^
//!                                YOU ARE HERE
//! ```
//!
//! # Pipeline Order
//!
//! 1. **Units** - one state record per top-level declaration, ordinals
//! 2. **Classifiers** - properties and end signatures
//! 3. **Inheritance** - `extends`, `implements`, member types
//! 4. **Associations** - end targets and owners
//! 5. **Temporal** - synthesized temporal properties (optional)
//! 6. **Service Criteria** - synthesized version and conflict clauses (optional)
//! 7. **Order By**, **Projections**, **Services**, **Criteria**
//! 8. **Joins** - direct join classification and foreign keys
//! 9. **Duplicates**, **Names**, **Validation** - diagnostics
//!
//! Every phase runs even after errors were found. Only an [`InternalError`]
//! stops the pipeline.

mod associations;
mod classifiers;
mod context;
mod criteria;
mod duplicates;
mod inheritance;
mod joins;
mod names;
mod order_by;
mod paths;
mod projections;
mod service_criteria;
mod services;
mod temporal;
mod units;
mod validation;

pub use context::CompileContext;
pub use joins::direct_join_pairs;
pub use names::{is_member_name, is_package_name, is_top_level_name};

use crate::assembly::assemble;
use crate::error::{CompileError, InternalError};
use crate::unit::CompilationUnit;
use klass_model::DomainModel;

/// Switches and limits of one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Synthesize temporal properties for temporal classifiers
    pub temporal_properties: bool,
    /// Synthesize version and conflict clauses for services
    pub service_criteria: bool,
    /// How deeply macro expansions may nest
    pub max_macro_depth: u32,
    /// Warn about private properties nothing refers to
    pub report_unreferenced_private: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            temporal_properties: true,
            service_criteria: true,
            max_macro_depth: 8,
            report_unreferenced_private: true,
        }
    }
}

/// Outcome of [`compile`].
#[derive(Debug)]
pub struct Compilation {
    /// Present when no error was reported
    pub model: Option<DomainModel>,
    /// Errors and warnings, sorted by unit and position
    pub diagnostics: Vec<CompileError>,
    /// Source units followed by the macro units inference produced
    pub units: Vec<CompilationUnit>,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(CompileError::is_error)
    }

    pub fn macro_units(&self) -> impl Iterator<Item = &CompilationUnit> {
        self.units.iter().filter(|unit| unit.is_macro())
    }
}

/// Run every phase on `cx`, leaving the results in its state and
/// diagnostics.
pub fn analyze(cx: &mut CompileContext<'_>) -> Result<(), InternalError> {
    units::declare_units(cx)?;
    classifiers::declare_classifier_members(cx)?;
    inheritance::resolve_inheritance(cx);
    associations::resolve_associations(cx);

    if cx.options.temporal_properties {
        temporal::infer_temporal_properties(cx)?;
    }
    if cx.options.service_criteria {
        service_criteria::infer_service_criteria(cx)?;
    }

    order_by::resolve_order_by(cx);
    projections::resolve_projections(cx);
    services::resolve_services(cx)?;
    criteria::resolve_criteria(cx);
    joins::classify_joins(cx);

    duplicates::check_duplicates(cx);
    names::check_names(cx);
    validation::validate(cx);
    Ok(())
}

/// Compile `units` into a domain model.
///
/// Semantic problems are returned as diagnostics; the model is only
/// assembled when none of them is an error.
///
/// # Errors
///
/// Returns [`InternalError`] when a compiler invariant breaks. Such errors
/// abort the compilation.
pub fn compile(
    units: Vec<CompilationUnit>,
    options: &ResolveOptions,
) -> Result<Compilation, InternalError> {
    let _span = tracing::info_span!("compile", units = units.len()).entered();

    let mut cx = CompileContext::new(options, units);
    analyze(&mut cx)?;

    let model = if cx.diagnostics.has_errors() {
        tracing::debug!(errors = cx.diagnostics.error_count(), "skipping assembly");
        None
    } else {
        Some(assemble(&cx.state)?)
    };
    tracing::info!(
        elements = cx.state.top_level_elements().len(),
        errors = cx.diagnostics.error_count(),
        warnings = cx.diagnostics.warning_count(),
        "compilation finished"
    );

    Ok(Compilation {
        model,
        diagnostics: cx.diagnostics.into_sorted(),
        units: cx.units,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::registry::SymbolRegistry;
    use crate::state::{Classifier, CompilerState, KlassIdx};
    use klass_ast::foundation::{
        Modifier, Multiplicity, PrimitiveType, ServiceCriteriaKind, UnitId, Verb,
    };
    use klass_ast::syntax::builder::{eq, this_member, type_member, variable, TreeBuilder};
    use klass_ast::SourceTree;

    /// Everything a test may want to inspect after analysis.
    pub(crate) struct Analyzed {
        pub state: CompilerState,
        pub registry: SymbolRegistry,
        pub diagnostics: Vec<CompileError>,
        pub units: Vec<CompilationUnit>,
    }

    fn source_units(trees: Vec<SourceTree>) -> Vec<CompilationUnit> {
        trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| {
                let id = UnitId(u32::try_from(i).unwrap());
                CompilationUnit::from_source(id, format!("test{i}.klass"), tree)
            })
            .collect()
    }

    pub(crate) fn analyzed_context(
        options: &ResolveOptions,
        trees: Vec<SourceTree>,
    ) -> CompileContext<'_> {
        let mut cx = CompileContext::new(options, source_units(trees));
        analyze(&mut cx).unwrap();
        cx
    }

    pub(crate) fn analyzed(trees: Vec<SourceTree>) -> Analyzed {
        let options = ResolveOptions::default();
        let cx = analyzed_context(&options, trees);
        Analyzed {
            state: cx.state,
            registry: cx.registry,
            diagnostics: cx.diagnostics.into_sorted(),
            units: cx.units,
        }
    }

    pub(crate) fn klass_named(state: &CompilerState, name: &str) -> KlassIdx {
        state
            .klass_indices()
            .find(|k| state.klass(*k).name() == name)
            .unwrap()
    }

    pub(crate) fn codes(outcome: &Analyzed) -> Vec<&'static str> {
        outcome.diagnostics.iter().map(|d| d.kind.code()).collect()
    }

    /// `Foo` is system temporal and versioned through `FooVersion`. Its
    /// service group has one url with a single `verb` service.
    pub(crate) fn versioned_tree(verb: Verb, with_parameter: bool) -> SourceTree {
        TreeBuilder::new("test")
            .class("Foo", |c| {
                c.modifier(Modifier::SystemTemporal)
                    .property("id", PrimitiveType::Long, |p| p.key())
            })
            .class("FooVersion", |c| {
                c.property("id", PrimitiveType::Long, |p| p.key())
                    .property("number", PrimitiveType::Integer, |p| p.modifier(Modifier::Version))
            })
            .association_with(
                "FooHasVersion",
                ("foo", "Foo", Multiplicity::OneToOne),
                ("version", "FooVersion", Multiplicity::OneToOne),
                eq(this_member("id"), type_member("FooVersion.id")),
                |a| {
                    a.source_modifier(Modifier::Versioned)
                        .target_modifier(Modifier::Owned)
                        .target_modifier(Modifier::Version)
                },
            )
            .service_group("FooResource", "Foo", |g| {
                g.url(|u| {
                    let u = u.segment("foo").path_param("id", PrimitiveType::Long);
                    let u = if with_parameter {
                        u.query_param("version", PrimitiveType::Integer, Multiplicity::ZeroToOne)
                    } else {
                        u
                    };
                    u.service(verb, |s| {
                        s.criteria(
                            ServiceCriteriaKind::Criteria,
                            eq(this_member("id"), variable("id")),
                        )
                    })
                })
            })
            .build(0)
    }

    #[test]
    fn test_duplicate_names_resolve_ambiguous() {
        let tree = TreeBuilder::new("test")
            .class("Foo", |c| c.property("id", PrimitiveType::Long, |p| p.key()))
            .enumeration("Foo", &["A"])
            .build(0);
        let outcome = analyzed(vec![tree]);
        assert!(outcome.registry.resolve("Foo").is_ambiguous());
        assert_eq!(codes(&outcome), vec!["ERR_DUP_TOP", "ERR_DUP_TOP"]);
        assert!(outcome.registry.resolve("Bar").is_not_found());
    }

    #[test]
    fn test_ordinals_follow_declaration_order_across_files() {
        let first = TreeBuilder::new("test")
            .class("B", |c| c.property("id", PrimitiveType::Long, |p| p.key()))
            .enumeration("Color", &["RED"])
            .build(0);
        let second = TreeBuilder::new("test")
            .class("A", |c| c.property("id", PrimitiveType::Long, |p| p.key()))
            .build(1);
        let outcome = analyzed(vec![first, second]);
        let names: Vec<_> = outcome
            .state
            .top_level_elements()
            .into_iter()
            .map(|idx| outcome.state.element_core(idx).name.name.clone())
            .collect();
        assert_eq!(names, vec!["B", "Color", "A"]);

        let ordinals: Vec<_> = outcome
            .state
            .top_level_elements()
            .into_iter()
            .map(|idx| outcome.state.element_core(idx).ordinal)
            .collect();
        assert!(ordinals.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_compile_assembles_clean_model() {
        let units = source_units(vec![versioned_tree(Verb::Get, true)]);
        let compilation = compile(units, &ResolveOptions::default()).unwrap();

        assert!(!compilation.has_errors(), "{:?}", compilation.diagnostics);
        assert_eq!(compilation.macro_units().count(), 2);
        let model = compilation.model.unwrap();
        let foo = model.find_klass("Foo").unwrap();
        assert!(model.klass(foo).version_end.is_some());
        assert_eq!(model.foreign_keys(model.find_klass("FooVersion").unwrap()).count(), 1);
    }

    #[test]
    fn test_compile_withholds_model_on_errors() {
        let tree = TreeBuilder::new("test")
            .class("Foo", |c| c.property("name", PrimitiveType::String, |p| p))
            .build(0);
        let compilation = compile(source_units(vec![tree]), &ResolveOptions::default()).unwrap();
        assert!(compilation.model.is_none());
        assert_eq!(compilation.diagnostics[0].kind.code(), "ERR_CLS_KEY");
    }

    #[test]
    fn test_inference_can_be_disabled() {
        let options = ResolveOptions {
            temporal_properties: false,
            service_criteria: false,
            ..ResolveOptions::default()
        };
        let cx = analyzed_context(&options, vec![versioned_tree(Verb::Get, true)]);
        assert!(cx.units.iter().all(|u| !u.is_macro()));
        let foo = klass_named(&cx.state, "Foo");
        assert_eq!(cx.state.klass(foo).core.properties.len(), 1);
    }
}
