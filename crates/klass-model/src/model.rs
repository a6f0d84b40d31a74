//! The sealed domain model and its read API.

use crate::elements::{
    Association, AssociationEnd, DataTypeProperty, ElementInfo, EndSignature, Enumeration,
    ForeignKey, Interface, Klass,
};
use crate::ids::{
    AssociationEndId, AssociationId, ClassifierId, EndSignatureId, EnumerationId, InterfaceId,
    KlassId, ParameterId, ProjectionId, PropertyId, ServiceGroupId, ServiceId, TopLevelId, UrlId,
};
use crate::projection::Projection;
use crate::service::{Parameter, Service, ServiceGroup, Url};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Arenas a model is assembled from.
///
/// Records refer to each other through the typed ids of [`crate::ids`],
/// which index these vectors. Assembly fills the parts; [`DomainModel::seal`]
/// freezes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelParts {
    pub enumerations: Vec<Enumeration>,
    pub interfaces: Vec<Interface>,
    pub klasses: Vec<Klass>,
    pub properties: Vec<DataTypeProperty>,
    pub end_signatures: Vec<EndSignature>,
    pub associations: Vec<Association>,
    pub association_ends: Vec<AssociationEnd>,
    pub foreign_keys: Vec<ForeignKey>,
    pub projections: Vec<Projection>,
    pub service_groups: Vec<ServiceGroup>,
    pub urls: Vec<Url>,
    pub parameters: Vec<Parameter>,
    pub services: Vec<Service>,
}

/// A fully resolved, immutable Klass domain model.
///
/// All six top-level kinds share one namespace, so [`DomainModel::resolve`]
/// finds any element by name. Elements are enumerated in ordinal order,
/// which is declaration order across all compiled sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainModel {
    parts: ModelParts,
    names: IndexMap<String, TopLevelId>,
}

impl DomainModel {
    /// Freeze assembled parts into a model.
    ///
    /// The name index is built in ordinal order. Names are expected to be
    /// unique; a repeated name keeps the element with the lower ordinal.
    pub fn seal(parts: ModelParts) -> Self {
        let mut ordered: Vec<(u32, String, TopLevelId)> = Vec::new();
        let mut push = |info: &ElementInfo, id: TopLevelId| {
            ordered.push((info.ordinal, info.name.clone(), id));
        };
        for (i, e) in parts.enumerations.iter().enumerate() {
            push(&e.info, TopLevelId::Enumeration(EnumerationId::from_index(i)));
        }
        for (i, e) in parts.interfaces.iter().enumerate() {
            push(&e.info, TopLevelId::Interface(InterfaceId::from_index(i)));
        }
        for (i, e) in parts.klasses.iter().enumerate() {
            push(&e.info, TopLevelId::Klass(KlassId::from_index(i)));
        }
        for (i, e) in parts.associations.iter().enumerate() {
            push(&e.info, TopLevelId::Association(AssociationId::from_index(i)));
        }
        for (i, e) in parts.projections.iter().enumerate() {
            push(&e.info, TopLevelId::Projection(ProjectionId::from_index(i)));
        }
        for (i, e) in parts.service_groups.iter().enumerate() {
            push(&e.info, TopLevelId::ServiceGroup(ServiceGroupId::from_index(i)));
        }
        ordered.sort_by_key(|(ordinal, _, _)| *ordinal);

        let mut names = IndexMap::with_capacity(ordered.len());
        for (_, name, id) in ordered {
            names.entry(name).or_insert(id);
        }

        Self { parts, names }
    }

    pub fn parts(&self) -> &ModelParts {
        &self.parts
    }

    /// Any top-level element by name.
    pub fn resolve(&self, name: &str) -> Option<TopLevelId> {
        self.names.get(name).copied()
    }

    /// All top-level elements in ordinal order.
    pub fn top_level_elements(&self) -> impl Iterator<Item = TopLevelId> + '_ {
        self.names.values().copied()
    }

    pub fn element_info(&self, id: TopLevelId) -> &ElementInfo {
        match id {
            TopLevelId::Enumeration(id) => &self.enumeration(id).info,
            TopLevelId::Interface(id) => &self.interface(id).info,
            TopLevelId::Klass(id) => &self.klass(id).info,
            TopLevelId::Association(id) => &self.association(id).info,
            TopLevelId::Projection(id) => &self.projection(id).info,
            TopLevelId::ServiceGroup(id) => &self.service_group(id).info,
        }
    }

    // Lookup by name, per kind

    pub fn find_enumeration(&self, name: &str) -> Option<EnumerationId> {
        match self.resolve(name)? {
            TopLevelId::Enumeration(id) => Some(id),
            _ => None,
        }
    }

    pub fn find_interface(&self, name: &str) -> Option<InterfaceId> {
        match self.resolve(name)? {
            TopLevelId::Interface(id) => Some(id),
            _ => None,
        }
    }

    pub fn find_klass(&self, name: &str) -> Option<KlassId> {
        match self.resolve(name)? {
            TopLevelId::Klass(id) => Some(id),
            _ => None,
        }
    }

    pub fn find_classifier(&self, name: &str) -> Option<ClassifierId> {
        match self.resolve(name)? {
            TopLevelId::Klass(id) => Some(ClassifierId::Klass(id)),
            TopLevelId::Interface(id) => Some(ClassifierId::Interface(id)),
            _ => None,
        }
    }

    pub fn find_association(&self, name: &str) -> Option<AssociationId> {
        match self.resolve(name)? {
            TopLevelId::Association(id) => Some(id),
            _ => None,
        }
    }

    pub fn find_projection(&self, name: &str) -> Option<ProjectionId> {
        match self.resolve(name)? {
            TopLevelId::Projection(id) => Some(id),
            _ => None,
        }
    }

    pub fn find_service_group(&self, name: &str) -> Option<ServiceGroupId> {
        match self.resolve(name)? {
            TopLevelId::ServiceGroup(id) => Some(id),
            _ => None,
        }
    }

    /// The user class, if one is declared.
    pub fn user_klass(&self) -> Option<KlassId> {
        self.parts
            .klasses
            .iter()
            .position(|k| k.is_user)
            .map(KlassId::from_index)
    }

    // Arena access

    pub fn enumeration(&self, id: EnumerationId) -> &Enumeration {
        &self.parts.enumerations[id.index()]
    }

    pub fn interface(&self, id: InterfaceId) -> &Interface {
        &self.parts.interfaces[id.index()]
    }

    pub fn klass(&self, id: KlassId) -> &Klass {
        &self.parts.klasses[id.index()]
    }

    pub fn property(&self, id: PropertyId) -> &DataTypeProperty {
        &self.parts.properties[id.index()]
    }

    pub fn end_signature(&self, id: EndSignatureId) -> &EndSignature {
        &self.parts.end_signatures[id.index()]
    }

    pub fn association(&self, id: AssociationId) -> &Association {
        &self.parts.associations[id.index()]
    }

    pub fn association_end(&self, id: AssociationEndId) -> &AssociationEnd {
        &self.parts.association_ends[id.index()]
    }

    pub fn projection(&self, id: ProjectionId) -> &Projection {
        &self.parts.projections[id.index()]
    }

    pub fn service_group(&self, id: ServiceGroupId) -> &ServiceGroup {
        &self.parts.service_groups[id.index()]
    }

    pub fn url(&self, id: UrlId) -> &Url {
        &self.parts.urls[id.index()]
    }

    pub fn parameter(&self, id: ParameterId) -> &Parameter {
        &self.parts.parameters[id.index()]
    }

    pub fn service(&self, id: ServiceId) -> &Service {
        &self.parts.services[id.index()]
    }

    // Navigation

    pub fn classifier_name(&self, id: ClassifierId) -> &str {
        match id {
            ClassifierId::Interface(id) => &self.interface(id).info.name,
            ClassifierId::Klass(id) => &self.klass(id).info.name,
        }
    }

    /// Superclasses of `klass`, nearest first. `klass` itself is excluded.
    pub fn superclass_chain(&self, klass: KlassId) -> Vec<KlassId> {
        let mut chain = Vec::new();
        let mut current = self.klass(klass).superclass;
        while let Some(id) = current {
            if id == klass || chain.contains(&id) {
                break;
            }
            chain.push(id);
            current = self.klass(id).superclass;
        }
        chain
    }

    /// Whether `klass` is `ancestor` or one of its subclasses.
    pub fn is_subclass_of(&self, klass: KlassId, ancestor: KlassId) -> bool {
        klass == ancestor || self.superclass_chain(klass).contains(&ancestor)
    }

    /// Declared and inherited data-type properties of a classifier.
    ///
    /// Declared properties come first, then those inherited through the
    /// superclass chain, then those inherited through interfaces.
    pub fn data_type_properties(&self, classifier: ClassifierId) -> &[PropertyId] {
        match classifier {
            ClassifierId::Interface(id) => &self.interface(id).properties,
            ClassifierId::Klass(id) => &self.klass(id).properties,
        }
    }

    /// A declared or inherited data-type property by name.
    pub fn find_property(&self, classifier: ClassifierId, name: &str) -> Option<PropertyId> {
        self.data_type_properties(classifier)
            .iter()
            .copied()
            .find(|id| self.property(*id).name == name)
    }

    /// Key properties of a class, declared and inherited.
    pub fn key_properties(&self, klass: KlassId) -> Vec<PropertyId> {
        self.data_type_properties(ClassifierId::Klass(klass))
            .iter()
            .copied()
            .filter(|id| self.property(*id).is_key())
            .collect()
    }

    pub fn opposite(&self, end: AssociationEndId) -> AssociationEndId {
        self.association_end(end).opposite
    }

    /// Foreign keys held by `klass`, one entry per property pair.
    pub fn foreign_keys(&self, klass: KlassId) -> impl Iterator<Item = &ForeignKey> + '_ {
        self.parts
            .foreign_keys
            .iter()
            .filter(move |fk| self.association_end(fk.end).owner == klass)
    }

    /// Foreign keys that reference the key `property`.
    pub fn foreign_keys_matching(
        &self,
        property: PropertyId,
    ) -> impl Iterator<Item = &ForeignKey> + '_ {
        self.parts
            .foreign_keys
            .iter()
            .filter(move |fk| fk.key == property)
    }

    /// Keys matched by the foreign-key `property`.
    pub fn keys_matching(&self, property: PropertyId) -> impl Iterator<Item = &ForeignKey> + '_ {
        self.parts
            .foreign_keys
            .iter()
            .filter(move |fk| fk.foreign_key == property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::Criteria;
    use crate::elements::{DataType, JoinKind};
    use klass_ast::foundation::{Modifier, Multiplicity, PrimitiveType, Span};

    fn info(name: &str, ordinal: u32) -> ElementInfo {
        ElementInfo {
            name: name.to_string(),
            package: "test".to_string(),
            ordinal,
            source_name: "test.klass".to_string(),
            span: Span::zero(0),
        }
    }

    fn klass(name: &str, ordinal: u32, superclass: Option<KlassId>) -> Klass {
        Klass {
            info: info(name, ordinal),
            is_user: false,
            is_abstract: false,
            inheritance: None,
            superclass,
            modifiers: Vec::new(),
            interfaces: Vec::new(),
            declared_properties: Vec::new(),
            properties: Vec::new(),
            end_signatures: Vec::new(),
            association_ends: Vec::new(),
            version_end: None,
            versioned_end: None,
        }
    }

    fn property(name: &str, owner: KlassId, modifiers: Vec<Modifier>) -> DataTypeProperty {
        DataTypeProperty {
            name: name.to_string(),
            owner: ClassifierId::Klass(owner),
            data_type: DataType::Primitive(PrimitiveType::Long),
            optional: false,
            modifiers,
            validations: Vec::new(),
            span: Span::zero(0),
        }
    }

    /// Question(id key) <- Answer(id key, questionId) through QuestionHasAnswers.
    fn sample() -> DomainModel {
        let question = KlassId(0);
        let answer = KlassId(1);
        let mut parts = ModelParts::default();

        let mut q = klass("Question", 0, None);
        q.declared_properties = vec![PropertyId(0)];
        q.properties = vec![PropertyId(0)];
        q.association_ends = vec![AssociationEndId(1)];
        let mut a = klass("Answer", 1, None);
        a.declared_properties = vec![PropertyId(1), PropertyId(2)];
        a.properties = vec![PropertyId(1), PropertyId(2)];
        a.association_ends = vec![AssociationEndId(0)];
        parts.klasses = vec![q, a];
        parts.properties = vec![
            property("id", question, vec![Modifier::Key]),
            property("id", answer, vec![Modifier::Key]),
            property("questionId", answer, Vec::new()),
        ];

        let end = |name: &str, owner, target, multiplicity, opposite| AssociationEnd {
            name: name.to_string(),
            association: AssociationId(0),
            owner,
            target,
            multiplicity,
            modifiers: Vec::new(),
            order_by: None,
            opposite,
            span: Span::zero(0),
        };
        parts.association_ends = vec![
            end("question", answer, question, Multiplicity::OneToOne, AssociationEndId(1)),
            end("answers", question, answer, Multiplicity::ZeroToMany, AssociationEndId(0)),
        ];
        parts.associations = vec![Association {
            info: info("QuestionHasAnswers", 2),
            source: AssociationEndId(0),
            target: AssociationEndId(1),
            criteria: Criteria::All,
            join: JoinKind::Direct,
        }];
        parts.foreign_keys = vec![ForeignKey {
            end: AssociationEndId(0),
            foreign_key: PropertyId(2),
            key: PropertyId(0),
        }];
        DomainModel::seal(parts)
    }

    #[test]
    fn test_resolve_shared_namespace() {
        let model = sample();
        assert_eq!(model.resolve("Question"), Some(TopLevelId::Klass(KlassId(0))));
        assert_eq!(
            model.resolve("QuestionHasAnswers"),
            Some(TopLevelId::Association(AssociationId(0)))
        );
        assert_eq!(model.resolve("Missing"), None);
        assert_eq!(model.find_klass("QuestionHasAnswers"), None);
    }

    #[test]
    fn test_top_level_elements_in_ordinal_order() {
        let model = sample();
        let ordinals: Vec<u32> = model
            .top_level_elements()
            .map(|id| model.element_info(id).ordinal)
            .collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
    }

    #[test]
    fn test_opposite_is_involution() {
        let model = sample();
        for i in 0..2 {
            let end = AssociationEndId(i);
            assert_eq!(model.opposite(model.opposite(end)), end);
        }
    }

    #[test]
    fn test_foreign_key_queries() {
        let model = sample();
        let answer_fks: Vec<_> = model.foreign_keys(KlassId(1)).collect();
        assert_eq!(answer_fks.len(), 1);
        assert_eq!(model.foreign_keys(KlassId(0)).count(), 0);
        assert_eq!(model.foreign_keys_matching(PropertyId(0)).count(), 1);
        assert_eq!(model.keys_matching(PropertyId(2)).count(), 1);
    }

    #[test]
    fn test_superclass_chain_nearest_first() {
        let mut parts = ModelParts::default();
        parts.klasses = vec![
            klass("Base", 0, None),
            klass("Middle", 1, Some(KlassId(0))),
            klass("Leaf", 2, Some(KlassId(1))),
        ];
        let model = DomainModel::seal(parts);
        assert_eq!(model.superclass_chain(KlassId(2)), vec![KlassId(1), KlassId(0)]);
        assert!(model.is_subclass_of(KlassId(2), KlassId(0)));
        assert!(!model.is_subclass_of(KlassId(0), KlassId(2)));
    }

    #[test]
    fn test_seal_keeps_lower_ordinal_for_repeated_name() {
        let mut parts = ModelParts::default();
        parts.klasses = vec![klass("Foo", 3, None), klass("Foo", 1, None), klass("Bar", 2, None)];
        let model = DomainModel::seal(parts);
        assert_eq!(model.resolve("Foo"), Some(TopLevelId::Klass(KlassId(1))));
        assert_eq!(model.resolve("Bar"), Some(TopLevelId::Klass(KlassId(2))));
    }

    #[test]
    fn test_json_round_trip_keeps_name_index() {
        let model = sample();
        let json = serde_json::to_string(&model).unwrap();
        let restored: DomainModel = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.resolve("Answer"), model.resolve("Answer"));
        assert_eq!(restored.foreign_keys(KlassId(1)).count(), 1);
        let names: Vec<_> = restored
            .top_level_elements()
            .map(|id| restored.element_info(id).name.clone())
            .collect();
        assert_eq!(names, vec!["Question", "Answer", "QuestionHasAnswers"]);
    }

    #[test]
    fn test_model_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DomainModel>();
    }
}
