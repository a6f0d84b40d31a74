//! Classifier state: classes and interfaces.
//!
//! Classes and interfaces share most of their structure. [`ClassifierCore`]
//! holds the shared part and the [`Classifier`] trait exposes it, so the
//! inheritance helpers at the bottom of this module work on either kind
//! through `&dyn Classifier`.

use super::{
    AssociationEndIdx, ClassifierIdx, CompilerState, ElementCore, EndSignatureIdx, InterfaceIdx,
    KlassIdx, PropertyIdx,
};
use crate::resolution::Resolution;
use klass_ast::foundation::Modifier;
use klass_ast::syntax::{AbstractDecl, Ident, ModifierDecl};
use std::collections::{HashSet, VecDeque};

/// State shared by classes and interfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierCore {
    pub element: ElementCore,
    pub modifiers: Vec<ModifierDecl>,
    /// `implements` clause as written
    pub declared_interfaces: Vec<Ident>,
    /// Parallel to `declared_interfaces`, filled by the inheritance phase
    pub interfaces: Vec<Resolution<InterfaceIdx>>,
    /// Declared data-type properties, hand-written and inferred
    pub properties: Vec<PropertyIdx>,
    pub end_signatures: Vec<EndSignatureIdx>,
}

impl ClassifierCore {
    pub fn new(element: ElementCore) -> Self {
        Self {
            element,
            modifiers: Vec::new(),
            declared_interfaces: Vec::new(),
            interfaces: Vec::new(),
            properties: Vec::new(),
            end_signatures: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceState {
    pub idx: InterfaceIdx,
    pub core: ClassifierCore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KlassState {
    pub idx: KlassIdx,
    pub core: ClassifierCore,
    pub is_user: bool,
    pub abstract_decl: Option<AbstractDecl>,
    /// `extends` clause as written
    pub extends: Option<Ident>,
    /// Filled by the inheritance phase when `extends` is present
    pub superclass: Option<Resolution<KlassIdx>>,
    /// Association ends navigable from this class
    pub association_ends: Vec<AssociationEndIdx>,
}

impl KlassState {
    pub fn is_transient(&self) -> bool {
        self.has_modifier(Modifier::Transient)
    }

    pub fn is_abstract(&self) -> bool {
        self.abstract_decl.is_some()
    }
}

/// Read access common to classes and interfaces.
pub trait Classifier {
    fn core(&self) -> &ClassifierCore;

    fn idx(&self) -> ClassifierIdx;

    /// Resolved superclass, for classes that have one.
    fn superclass(&self) -> Option<KlassIdx> {
        None
    }

    fn kind_name(&self) -> &'static str;

    fn name(&self) -> &str {
        &self.core().element.name.name
    }

    fn has_modifier(&self, modifier: Modifier) -> bool {
        self.core().modifiers.iter().any(|m| m.modifier == modifier)
    }

    /// Directly implemented interfaces that resolved.
    fn resolved_interfaces(&self) -> Vec<InterfaceIdx> {
        self.core()
            .interfaces
            .iter()
            .filter_map(|r| r.resolved())
            .collect()
    }
}

impl Classifier for InterfaceState {
    fn core(&self) -> &ClassifierCore {
        &self.core
    }

    fn idx(&self) -> ClassifierIdx {
        ClassifierIdx::Interface(self.idx)
    }

    fn kind_name(&self) -> &'static str {
        "interface"
    }
}

impl Classifier for KlassState {
    fn core(&self) -> &ClassifierCore {
        &self.core
    }

    fn idx(&self) -> ClassifierIdx {
        ClassifierIdx::Klass(self.idx)
    }

    fn superclass(&self) -> Option<KlassIdx> {
        self.superclass.and_then(Resolution::resolved)
    }

    fn kind_name(&self) -> &'static str {
        if self.is_user {
            "user"
        } else {
            "class"
        }
    }
}

/// Superclasses of `klass`, nearest first, stopping at the first repeat.
pub fn superclass_chain(state: &CompilerState, klass: KlassIdx) -> Vec<KlassIdx> {
    let mut chain = Vec::new();
    let mut current = state.klass(klass).superclass();
    while let Some(next) = current {
        if next == klass || chain.contains(&next) {
            break;
        }
        chain.push(next);
        current = state.klass(next).superclass();
    }
    chain
}

pub fn is_subclass_of(state: &CompilerState, klass: KlassIdx, ancestor: KlassIdx) -> bool {
    klass == ancestor || superclass_chain(state, klass).contains(&ancestor)
}

/// Whether `sub` is `sup`, one of its subclasses or one of its implementors.
pub fn conforms_to(state: &CompilerState, sub: ClassifierIdx, sup: ClassifierIdx) -> bool {
    match (sub, sup) {
        _ if sub == sup => true,
        (ClassifierIdx::Klass(sub), ClassifierIdx::Klass(sup)) => is_subclass_of(state, sub, sup),
        (_, ClassifierIdx::Interface(sup)) => {
            implements_interface(state, state.classifier(sub), sup)
        }
        (ClassifierIdx::Interface(_), ClassifierIdx::Klass(_)) => false,
    }
}

/// The classifier itself followed by its superclass chain.
fn lineage(state: &CompilerState, classifier: &dyn Classifier) -> Vec<ClassifierIdx> {
    let mut lineage = vec![classifier.idx()];
    if let ClassifierIdx::Klass(klass) = classifier.idx() {
        lineage.extend(
            superclass_chain(state, klass)
                .into_iter()
                .map(ClassifierIdx::Klass),
        );
    }
    lineage
}

/// Every interface reachable through `implements`, directly or through
/// superclasses and other interfaces, breadth-first.
pub fn all_interfaces(state: &CompilerState, classifier: &dyn Classifier) -> Vec<InterfaceIdx> {
    let mut queue: VecDeque<InterfaceIdx> = lineage(state, classifier)
        .into_iter()
        .flat_map(|c| state.classifier(c).resolved_interfaces())
        .collect();
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    while let Some(interface) = queue.pop_front() {
        if ClassifierIdx::Interface(interface) == classifier.idx() || !seen.insert(interface) {
            continue;
        }
        result.push(interface);
        queue.extend(state.interface(interface).resolved_interfaces());
    }
    result
}

pub fn implements_interface(
    state: &CompilerState,
    classifier: &dyn Classifier,
    interface: InterfaceIdx,
) -> bool {
    all_interfaces(state, classifier).contains(&interface)
}

/// Declared and inherited data-type properties.
///
/// Declared properties come first, then those of the superclass chain
/// (nearest first), then those of every implemented interface. The first
/// property with a given name wins, so declarations override inherited
/// properties.
pub fn all_data_type_properties(
    state: &CompilerState,
    classifier: &dyn Classifier,
) -> Vec<PropertyIdx> {
    let mut result = Vec::new();
    let mut names = HashSet::new();

    let sources = lineage(state, classifier).into_iter().chain(
        all_interfaces(state, classifier)
            .into_iter()
            .map(ClassifierIdx::Interface),
    );
    for source in sources {
        for property in &state.classifier(source).core().properties {
            if names.insert(state.property(*property).name.name.as_str()) {
                result.push(*property);
            }
        }
    }
    result
}

/// A data-type property by name, declared or inherited.
///
/// Two declared properties with the same name are ambiguous; inherited
/// properties never are because the nearest one wins.
pub fn find_data_type_property(
    state: &CompilerState,
    classifier: &dyn Classifier,
    name: &str,
) -> Resolution<PropertyIdx> {
    let declared = Resolution::from_matches(
        classifier
            .core()
            .properties
            .iter()
            .copied()
            .filter(|p| state.property(*p).name.name == name),
    );
    declared.or_else(|| {
        all_data_type_properties(state, classifier)
            .into_iter()
            .find(|p| state.property(*p).name.name == name)
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PropertyState;
    use klass_ast::foundation::{ContextKey, NodeId, PrimitiveType, Span, UnitId};
    use klass_ast::syntax::PropertyType;

    fn element(name: &str, ordinal: u32) -> ElementCore {
        ElementCore {
            name: Ident::new(name, Span::zero(0)),
            package: "test".to_string(),
            ordinal,
            unit: UnitId(0),
            source_name: "test".to_string(),
            ctx: ContextKey::new(UnitId(0), NodeId(ordinal + 1)),
            span: Span::zero(0),
        }
    }

    fn add_klass(state: &mut CompilerState, name: &str) -> KlassIdx {
        let idx = state.next_klass_idx();
        state.add_klass(KlassState {
            idx,
            core: ClassifierCore::new(element(name, idx.0)),
            is_user: false,
            abstract_decl: None,
            extends: None,
            superclass: None,
            association_ends: Vec::new(),
        })
    }

    fn add_interface(state: &mut CompilerState, name: &str) -> InterfaceIdx {
        let idx = state.next_interface_idx();
        state.add_interface(InterfaceState {
            idx,
            core: ClassifierCore::new(element(name, 100 + idx.0)),
        })
    }

    fn add_property(state: &mut CompilerState, owner: ClassifierIdx, name: &str) -> PropertyIdx {
        let idx = state.add_property(PropertyState::new(
            owner,
            Ident::new(name, Span::zero(0)),
            PropertyType::Primitive(PrimitiveType::Long),
            ContextKey::new(UnitId(0), NodeId(1000 + state.properties.len() as u32)),
            Span::zero(0),
        ));
        state.classifier_core_mut(owner).properties.push(idx);
        idx
    }

    #[test]
    fn test_properties_declared_then_superclass_then_interfaces() {
        let mut state = CompilerState::default();
        let base = add_klass(&mut state, "Base");
        let leaf = add_klass(&mut state, "Leaf");
        let audited = add_interface(&mut state, "Audited");
        state.klass_mut(leaf).superclass = Some(Resolution::Resolved(base));
        state.klass_mut(leaf).core.interfaces = vec![Resolution::Resolved(audited)];

        let own = add_property(&mut state, ClassifierIdx::Klass(leaf), "title");
        let inherited = add_property(&mut state, ClassifierIdx::Klass(base), "id");
        let shadowed = add_property(&mut state, ClassifierIdx::Klass(base), "title");
        let from_interface =
            add_property(&mut state, ClassifierIdx::Interface(audited), "createdOn");

        let all = all_data_type_properties(&state, state.klass(leaf));
        assert_eq!(all, vec![own, inherited, from_interface]);
        assert!(!all.contains(&shadowed));
        assert_eq!(
            find_data_type_property(&state, state.klass(leaf), "createdOn"),
            Resolution::Resolved(from_interface)
        );
        assert!(implements_interface(&state, state.klass(leaf), audited));
        assert!(!implements_interface(&state, state.klass(base), audited));
    }

    #[test]
    fn test_superclass_chain_stops_on_cycle() {
        let mut state = CompilerState::default();
        let a = add_klass(&mut state, "A");
        let b = add_klass(&mut state, "B");
        state.klass_mut(a).superclass = Some(Resolution::Resolved(b));
        state.klass_mut(b).superclass = Some(Resolution::Resolved(a));

        assert_eq!(superclass_chain(&state, a), vec![b]);
        assert!(is_subclass_of(&state, a, b));
    }

    #[test]
    fn test_duplicate_declared_property_is_ambiguous() {
        let mut state = CompilerState::default();
        let klass = add_klass(&mut state, "Foo");
        add_property(&mut state, ClassifierIdx::Klass(klass), "id");
        add_property(&mut state, ClassifierIdx::Klass(klass), "id");

        assert_eq!(
            find_data_type_property(&state, state.klass(klass), "id"),
            Resolution::Ambiguous
        );
        assert_eq!(
            find_data_type_property(&state, state.klass(klass), "missing"),
            Resolution::NotFound
        );
    }
}
