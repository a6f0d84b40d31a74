//! Integration tests for end-to-end Klass compilation.
//!
//! These tests verify the full pipeline:
//! Source trees → Analysis → Inference → Assembly → DomainModel

use klass_ast::foundation::{
    InheritanceType, Modifier, Multiplicity, PrimitiveType, ServiceCriteriaKind, Verb,
};
use klass_ast::syntax::builder::{and, eq, literal, this_member, type_member, variable, TreeBuilder};
use klass_ast::SourceTree;
use klass_compiler::{compile_from_dir, CompilerConfig};
use klass_model::{DomainModel, JoinKind, TopLevelId};
use klass_resolve::ResolveOptions;
use klass_tests::{analyze_trees, TestHarness};
use std::fs;
use tempfile::tempdir;

fn keyed(name: &str) -> impl FnOnce(TreeBuilder) -> TreeBuilder + '_ {
    move |t| t.class(name, |c| c.property("id", PrimitiveType::Long, |p| p.key()))
}

fn tree(package: &str, body: impl FnOnce(TreeBuilder) -> TreeBuilder) -> SourceTree {
    body(TreeBuilder::new(package)).into_tree()
}

fn owner_and_foo(relationship: klass_ast::syntax::CriteriaExpr) -> SourceTree {
    tree("test", |t| {
        t.class("Owner", |c| c.property("id", PrimitiveType::Long, |p| p.key()))
            .class("Foo", |c| {
                c.property("id", PrimitiveType::Long, |p| p.key())
                    .property("ownerId", PrimitiveType::Long, |p| p)
                    .property("flag", PrimitiveType::Boolean, |p| p)
            })
            .association(
                "OwnerHasFoos",
                ("owner", "Owner", Multiplicity::OneToOne),
                ("foos", "Foo", Multiplicity::ZeroToMany),
                relationship,
            )
    })
}

fn join_of(model: &DomainModel, association: &str) -> JoinKind {
    let id = model.find_association(association).unwrap();
    model.association(id).join
}

/// Every element resolves to itself; unknown names resolve to nothing.
#[test]
fn test_names_resolve_to_their_declarations() {
    let harness = TestHarness::compile(vec![tree("test", |t| {
        keyed("Question")(t).enumeration("Status", &["OPEN", "CLOSED"])
    })]);
    let model = harness.model();

    for id in model.top_level_elements() {
        let name = &model.element_info(id).name;
        assert_eq!(model.resolve(name), Some(id));
    }
    assert!(matches!(model.resolve("Status"), Some(TopLevelId::Enumeration(_))));
    assert_eq!(model.resolve("Missing"), None);

    let options = ResolveOptions::default();
    let cx = analyze_trees(&options, vec![tree("test", keyed("Question"))]);
    assert!(cx.registry.resolve("Question").is_resolved());
    assert!(cx.registry.resolve("Missing").is_not_found());
}

/// Two top-level elements with one name are both reported and ambiguous.
#[test]
fn test_duplicate_top_level_names() {
    let trees = vec![
        tree("test", keyed("Foo")),
        tree("test", |t| t.enumeration("Foo", &["A"])),
    ];
    let options = ResolveOptions::default();
    let cx = analyze_trees(&options, trees.clone());
    assert!(cx.registry.resolve("Foo").is_ambiguous());

    let harness = TestHarness::compile(trees);
    assert_eq!(harness.codes(), vec!["ERR_DUP_TOP", "ERR_DUP_TOP"]);
    assert!(harness.result().model.is_none());
}

#[test]
fn test_association_ends_are_mutual_opposites() {
    let harness = TestHarness::compile(vec![owner_and_foo(eq(
        this_member("id"),
        type_member("Foo.ownerId"),
    ))]);
    let model = harness.model();
    let association = model.association(model.find_association("OwnerHasFoos").unwrap());

    assert_eq!(model.opposite(association.source), association.target);
    assert_eq!(model.opposite(association.target), association.source);
    assert_eq!(model.association_end(association.source).owner, harness.klass("Foo"));
    assert_eq!(model.association_end(association.target).owner, harness.klass("Owner"));
}

#[test]
fn test_bitemporal_infers_each_temporal_member_once() {
    let harness = TestHarness::compile(vec![tree("test", |t| {
        t.class("Account", |c| {
            c.modifier(Modifier::Bitemporal)
                .property("id", PrimitiveType::Long, |p| p.key())
        })
    })]);
    let names = harness.property_names("Account");

    for expected in ["valid", "validFrom", "validTo", "system", "systemFrom", "systemTo"] {
        let count = names.iter().filter(|n| n.as_str() == expected).count();
        assert_eq!(count, 1, "{expected} in {names:?}");
    }
    assert_eq!(harness.result().units.iter().filter(|u| u.is_macro()).count(), 1);
}

#[test]
fn test_ordinals_increase_across_files() {
    let harness = TestHarness::compile(vec![
        tree("test", |t| keyed("Zeta")(t).enumeration("Color", &["RED"])),
        tree("test", keyed("Alpha")),
    ]);
    let model = harness.model();
    let elements: Vec<_> = model
        .top_level_elements()
        .map(|id| model.element_info(id))
        .collect();

    let names: Vec<_> = elements.iter().map(|info| info.name.as_str()).collect();
    assert_eq!(names, vec!["Zeta", "Color", "Alpha"]);
    assert!(elements.windows(2).all(|w| w[0].ordinal < w[1].ordinal));
}

/// `this.id == Foo.ownerId` is a direct join; an extra conjunct is not.
#[test]
fn test_join_classification() {
    let direct = TestHarness::compile(vec![owner_and_foo(eq(
        this_member("id"),
        type_member("Foo.ownerId"),
    ))]);
    assert_eq!(join_of(direct.model(), "OwnerHasFoos"), JoinKind::Direct);
    let foo = direct.klass("Foo");
    assert_eq!(direct.model().foreign_keys(foo).count(), 1);

    let predicate = TestHarness::compile(vec![owner_and_foo(and(
        eq(this_member("id"), type_member("Foo.ownerId")),
        eq(type_member("Foo.flag"), literal(true)),
    ))]);
    assert_eq!(join_of(predicate.model(), "OwnerHasFoos"), JoinKind::Predicate);
    assert_eq!(predicate.model().foreign_keys(predicate.klass("Foo")).count(), 0);
}

#[test]
fn test_abstract_class_needs_a_key() {
    let without_key = TestHarness::compile(vec![tree("test", |t| {
        t.class("Shape", |c| {
            c.abstract_class(Some(InheritanceType::TablePerSubclass))
                .property("name", PrimitiveType::String, |p| p)
        })
    })]);
    assert_eq!(without_key.codes(), vec!["ERR_CLS_KEY"]);

    let with_key = TestHarness::compile(vec![tree("test", |t| {
        t.class("Shape", |c| {
            c.abstract_class(Some(InheritanceType::TablePerSubclass))
                .property("id", PrimitiveType::Long, |p| p.key())
                .property("name", PrimitiveType::String, |p| p)
        })
    })]);
    assert!(with_key.codes().is_empty(), "{:?}", with_key.codes());
    assert!(with_key.model().klass(with_key.klass("Shape")).is_abstract);
}

#[test]
fn test_interface_forward_reference_in_same_file() {
    let harness = TestHarness::compile(vec![tree("test", |t| {
        t.class("Person", |c| {
            c.implements("Named")
                .property("id", PrimitiveType::Long, |p| p.key())
        })
        .interface("Named", |i| i.property("name", PrimitiveType::String, |p| p))
    })]);
    assert!(harness.codes().contains(&"ERR_FWD_REF"), "{:?}", harness.codes());
}

#[test]
fn test_superclass_declared_in_later_file() {
    let harness = TestHarness::compile(vec![
        tree("test", |t| t.class("Leaf", |c| c.extends("Base"))),
        tree("test", |t| {
            t.class("Base", |c| {
                c.abstract_class(None)
                    .property("id", PrimitiveType::Long, |p| p.key())
            })
        }),
    ]);
    assert!(harness.codes().is_empty(), "{:?}", harness.codes());
    assert_eq!(harness.property_names("Leaf"), vec!["id"]);
}

#[test]
fn test_versioned_service_gets_inferred_version_clause() {
    let source = tree("test", |t| {
        t.class("Foo", |c| {
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
                u.segment("foo")
                    .path_param("id", PrimitiveType::Long)
                    .query_param("version", PrimitiveType::Integer, Multiplicity::ZeroToOne)
                    .service(Verb::Get, |s| {
                        s.criteria(
                            ServiceCriteriaKind::Criteria,
                            eq(this_member("id"), variable("id")),
                        )
                    })
            })
        })
    });

    let harness = TestHarness::compile(vec![source.clone()]);
    let model = harness.model();
    let service = &model.parts().services[0];
    let version = service.criteria_of(ServiceCriteriaKind::Version).unwrap();
    assert!(version.inferred);
    assert!(!service.criteria_of(ServiceCriteriaKind::Criteria).unwrap().inferred);

    let config = CompilerConfig {
        inference: klass_compiler::InferenceConfig {
            temporal_properties: true,
            service_criteria: false,
        },
        ..CompilerConfig::default()
    };
    let without = TestHarness::compile_with(vec![source], &config);
    assert!(without.model().parts().services[0]
        .criteria_of(ServiceCriteriaKind::Version)
        .is_none());
}

#[test]
fn test_compile_from_directory_and_serialize_model() {
    let dir = tempdir().unwrap();
    let first = owner_and_foo(eq(this_member("id"), type_member("Foo.ownerId")));
    fs::write(
        dir.path().join("model.klass.json"),
        serde_json::to_string(&first).unwrap(),
    )
    .unwrap();

    let result = compile_from_dir(dir.path(), None).unwrap();
    assert!(!result.has_errors(), "{}", result.format_diagnostics());
    let model = result.model.unwrap();

    let json = serde_json::to_string(&model).unwrap();
    let restored: DomainModel = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.find_klass("Foo"), model.find_klass("Foo"));
    assert_eq!(join_of(&restored, "OwnerHasFoos"), JoinKind::Direct);
}
