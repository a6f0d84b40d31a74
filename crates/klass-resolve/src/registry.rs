//! Symbol registry.
//!
//! Every top-level declaration is registered by name, both in the shared
//! top-level namespace and in the map of its own kind. Every declaration,
//! top-level or member, is also registered by the context key of its syntax
//! node so a later phase can find the state an earlier phase created.
//!
//! Name collisions are not errors here: the entry becomes
//! [`Resolution::Ambiguous`] and the duplicate phase reports it. Registering
//! the same context twice is an internal error.
//!
//! The registry is append-only.

use crate::error::InternalError;
use crate::resolution::Resolution;
use crate::state::{
    AssociationIdx, ClassifierIdx, EnumerationIdx, InterfaceIdx, KlassIdx, ProjectionIdx,
    ServiceGroupIdx, StateRef, TopLevelIdx,
};
use indexmap::IndexMap;
use klass_ast::foundation::ContextKey;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SymbolRegistry {
    /// Shared namespace of all six top-level kinds
    top_level: IndexMap<String, Resolution<TopLevelIdx>>,

    enumerations: IndexMap<String, Resolution<EnumerationIdx>>,
    interfaces: IndexMap<String, Resolution<InterfaceIdx>>,
    klasses: IndexMap<String, Resolution<KlassIdx>>,
    associations: IndexMap<String, Resolution<AssociationIdx>>,
    projections: IndexMap<String, Resolution<ProjectionIdx>>,
    service_groups: IndexMap<String, Resolution<ServiceGroupIdx>>,

    contexts: HashMap<ContextKey, StateRef>,

    next_ordinal: u32,
}

fn insert<T: Copy>(map: &mut IndexMap<String, Resolution<T>>, name: &str, value: T) {
    let entry = map
        .entry(name.to_string())
        .or_insert(Resolution::NotFound);
    *entry = entry.merge(value);
}

fn lookup<T: Copy>(map: &IndexMap<String, Resolution<T>>, name: &str) -> Resolution<T> {
    map.get(name).copied().unwrap_or(Resolution::NotFound)
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the next ordinal. Ordinals are shared by every kind.
    pub fn assign_ordinal(&mut self) -> u32 {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        ordinal
    }

    /// Register a top-level declaration by name and by context.
    pub fn register(
        &mut self,
        name: &str,
        idx: TopLevelIdx,
        ctx: ContextKey,
    ) -> Result<(), InternalError> {
        self.register_context(ctx, StateRef::TopLevel(idx))?;
        insert(&mut self.top_level, name, idx);
        match idx {
            TopLevelIdx::Enumeration(i) => insert(&mut self.enumerations, name, i),
            TopLevelIdx::Interface(i) => insert(&mut self.interfaces, name, i),
            TopLevelIdx::Klass(i) => insert(&mut self.klasses, name, i),
            TopLevelIdx::Association(i) => insert(&mut self.associations, name, i),
            TopLevelIdx::Projection(i) => insert(&mut self.projections, name, i),
            TopLevelIdx::ServiceGroup(i) => insert(&mut self.service_groups, name, i),
        }
        tracing::trace!(name, kind = idx.kind_name(), %ctx, "registered");
        Ok(())
    }

    /// Register a member declaration by context only.
    pub fn register_context(
        &mut self,
        ctx: ContextKey,
        state: StateRef,
    ) -> Result<(), InternalError> {
        if self.contexts.contains_key(&ctx) {
            return Err(InternalError::DuplicateContext(ctx));
        }
        self.contexts.insert(ctx, state);
        Ok(())
    }

    pub fn lookup_by_context(&self, ctx: ContextKey) -> Result<StateRef, InternalError> {
        self.contexts
            .get(&ctx)
            .copied()
            .ok_or(InternalError::UnknownContext(ctx))
    }

    /// Resolve a name in the shared top-level namespace.
    pub fn resolve(&self, name: &str) -> Resolution<TopLevelIdx> {
        lookup(&self.top_level, name)
    }

    pub fn find_enumeration(&self, name: &str) -> Resolution<EnumerationIdx> {
        lookup(&self.enumerations, name)
    }

    pub fn find_interface(&self, name: &str) -> Resolution<InterfaceIdx> {
        lookup(&self.interfaces, name)
    }

    pub fn find_klass(&self, name: &str) -> Resolution<KlassIdx> {
        lookup(&self.klasses, name)
    }

    /// A class or an interface by name.
    pub fn find_classifier(&self, name: &str) -> Resolution<ClassifierIdx> {
        let klass = self.find_klass(name).map(ClassifierIdx::Klass);
        match (klass, self.find_interface(name)) {
            (Resolution::NotFound, interface) => interface.map(ClassifierIdx::Interface),
            (klass, Resolution::NotFound) => klass,
            _ => Resolution::Ambiguous,
        }
    }

    pub fn find_association(&self, name: &str) -> Resolution<AssociationIdx> {
        lookup(&self.associations, name)
    }

    pub fn find_projection(&self, name: &str) -> Resolution<ProjectionIdx> {
        lookup(&self.projections, name)
    }

    pub fn find_service_group(&self, name: &str) -> Resolution<ServiceGroupIdx> {
        lookup(&self.service_groups, name)
    }

    /// Every name registered in the shared namespace, in registration order.
    pub fn names(&self) -> impl Iterator<Item = (&str, Resolution<TopLevelIdx>)> {
        self.top_level.iter().map(|(name, r)| (name.as_str(), *r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use klass_ast::foundation::{NodeId, UnitId};

    fn ctx(node: u32) -> ContextKey {
        ContextKey::new(UnitId(0), NodeId(node))
    }

    #[test]
    fn test_name_registered_once_resolves() {
        let mut registry = SymbolRegistry::new();
        registry
            .register("Foo", TopLevelIdx::Klass(KlassIdx(0)), ctx(1))
            .unwrap();

        assert_eq!(
            registry.resolve("Foo"),
            Resolution::Resolved(TopLevelIdx::Klass(KlassIdx(0)))
        );
        assert_eq!(registry.find_klass("Foo"), Resolution::Resolved(KlassIdx(0)));
        assert_eq!(registry.resolve("Bar"), Resolution::NotFound);
        assert_eq!(registry.find_interface("Foo"), Resolution::NotFound);
    }

    #[test]
    fn test_name_registered_twice_is_ambiguous() {
        let mut registry = SymbolRegistry::new();
        registry
            .register("Foo", TopLevelIdx::Klass(KlassIdx(0)), ctx(1))
            .unwrap();
        registry
            .register("Foo", TopLevelIdx::Enumeration(EnumerationIdx(0)), ctx(2))
            .unwrap();

        assert_eq!(registry.resolve("Foo"), Resolution::Ambiguous);
        // Per-kind lookups still see a single declaration
        assert_eq!(registry.find_klass("Foo"), Resolution::Resolved(KlassIdx(0)));
        assert_eq!(
            registry.find_classifier("Foo"),
            Resolution::Resolved(ClassifierIdx::Klass(KlassIdx(0)))
        );
    }

    #[test]
    fn test_class_and_interface_with_same_name_are_ambiguous_classifiers() {
        let mut registry = SymbolRegistry::new();
        registry
            .register("Foo", TopLevelIdx::Klass(KlassIdx(0)), ctx(1))
            .unwrap();
        registry
            .register("Foo", TopLevelIdx::Interface(InterfaceIdx(0)), ctx(2))
            .unwrap();

        assert_eq!(registry.find_classifier("Foo"), Resolution::Ambiguous);
    }

    #[test]
    fn test_duplicate_context_is_fatal() {
        let mut registry = SymbolRegistry::new();
        registry
            .register("Foo", TopLevelIdx::Klass(KlassIdx(0)), ctx(1))
            .unwrap();
        let err = registry
            .register("Bar", TopLevelIdx::Klass(KlassIdx(1)), ctx(1))
            .unwrap_err();

        assert_eq!(err, InternalError::DuplicateContext(ctx(1)));
        // The rejected declaration leaves no name behind
        assert_eq!(registry.resolve("Bar"), Resolution::NotFound);
        assert_eq!(registry.find_klass("Bar"), Resolution::NotFound);
        assert!(matches!(
            registry.lookup_by_context(ctx(1)),
            Ok(StateRef::TopLevel(TopLevelIdx::Klass(KlassIdx(0))))
        ));
        assert!(registry.lookup_by_context(ctx(9)).is_err());
    }

    #[test]
    fn test_ordinals_increase() {
        let mut registry = SymbolRegistry::new();
        let first = registry.assign_ordinal();
        let second = registry.assign_ordinal();
        assert!(second > first);
    }
}
