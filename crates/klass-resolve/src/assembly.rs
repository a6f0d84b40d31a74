//! Two-pass assembly of the domain model.
//!
//! # Pipeline Position
//!
//! ```text
//! Phases → Validation → Assembly → DomainModel
//!                       ^^^^^^^^
//!                       YOU ARE HERE
//! ```
//!
//! Assembly runs only when analysis reported no errors.
//!
//! 1. [`allocate`] gives every state record a model id, in ordinal order per
//!    kind, and builds the records that need no ids (enumerations).
//! 2. [`link`] builds the remaining records and translates every state
//!    reference through the id table. Since every id exists before linking
//!    starts, forward references need no special handling.
//! 3. [`finish`] seals the parts into an immutable [`DomainModel`].
//!
//! A reference that did not resolve, or that points at a record without an
//! id, is a [`InternalError::MissingIndex`]: validation should have
//! reported it and prevented assembly.

use crate::error::InternalError;
use crate::resolution::Resolution;
use crate::state::{
    all_data_type_properties, AssociationEndIdx, AssociationIdx, Classifier, ClassifierIdx,
    CompilerState, CriteriaState, ElementCore, EndSignatureIdx, EnumerationIdx, InterfaceIdx,
    KlassIdx, MemberPathState, OrderByState, ParameterIdx, PathOrigin, ProjectionElementState,
    ProjectionIdx, PropertyIdx, ReferenceIdx, ServiceGroupIdx, ServiceIdx, TopLevelIdx, UrlIdx,
    UrlSegmentState, ValueState,
};
use klass_ast::foundation::Modifier;
use klass_ast::syntax::{ModifierDecl, PropertyType};
use klass_model::criteria::OperatorCriteria;
use klass_model::{
    Association, AssociationEnd, AssociationEndId, AssociationId, ClassifierId, Criteria,
    DataType, DataTypeProperty, DomainModel, ElementInfo, EndSignature, EndSignatureId,
    Enumeration, EnumerationId, EnumerationLiteral, ForeignKey, Interface, InterfaceId, JoinKind,
    Klass, KlassId, MemberPath, ModelParts, OrderBy, OrderByMember, Parameter, ParameterId,
    Projection, ProjectionElement, ProjectionId, PropertyId, ReferenceProperty, Service,
    ServiceCriteria, ServiceGroup, ServiceGroupId, ServiceId, Url, UrlId, UrlSegment, Validation,
    Value,
};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Model ids of one kind, keyed by state index.
#[derive(Debug)]
struct IdTable<S, M> {
    what: &'static str,
    ids: HashMap<S, M>,
    order: Vec<S>,
}

impl<S: Copy + Eq + Hash + Debug, M: Copy> IdTable<S, M> {
    fn new(what: &'static str) -> Self {
        Self {
            what,
            ids: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn allocate(&mut self, state: S, make: fn(usize) -> M) {
        if self.ids.contains_key(&state) {
            return;
        }
        self.ids.insert(state, make(self.order.len()));
        self.order.push(state);
    }

    fn get(&self, state: S) -> Result<M, InternalError> {
        self.ids.get(&state).copied().ok_or_else(|| InternalError::MissingIndex {
            what: format!("{} {:?}", self.what, state),
        })
    }

    fn get_all(&self, states: &[S]) -> Result<Vec<M>, InternalError> {
        states.iter().map(|s| self.get(*s)).collect()
    }

    /// State indices in id order.
    fn order(&self) -> &[S] {
        &self.order
    }
}

/// Ids allocated by the first pass.
#[derive(Debug)]
pub struct Allocation {
    enumerations: IdTable<EnumerationIdx, EnumerationId>,
    interfaces: IdTable<InterfaceIdx, InterfaceId>,
    klasses: IdTable<KlassIdx, KlassId>,
    properties: IdTable<PropertyIdx, PropertyId>,
    end_signatures: IdTable<EndSignatureIdx, EndSignatureId>,
    associations: IdTable<AssociationIdx, AssociationId>,
    association_ends: IdTable<AssociationEndIdx, AssociationEndId>,
    projections: IdTable<ProjectionIdx, ProjectionId>,
    service_groups: IdTable<ServiceGroupIdx, ServiceGroupId>,
    urls: IdTable<UrlIdx, UrlId>,
    parameters: IdTable<ParameterIdx, ParameterId>,
    services: IdTable<ServiceIdx, ServiceId>,
    parts: ModelParts,
}

/// Assemble a model from analyzed state.
pub fn assemble(state: &CompilerState) -> Result<DomainModel, InternalError> {
    let _span = tracing::debug_span!("assemble").entered();
    let allocation = allocate(state);
    let parts = link(state, allocation)?;
    Ok(finish(parts))
}

/// Pass 1: ids for every record, enumerations built.
pub fn allocate(state: &CompilerState) -> Allocation {
    let mut a = Allocation {
        enumerations: IdTable::new("enumeration"),
        interfaces: IdTable::new("interface"),
        klasses: IdTable::new("class"),
        properties: IdTable::new("property"),
        end_signatures: IdTable::new("end signature"),
        associations: IdTable::new("association"),
        association_ends: IdTable::new("association end"),
        projections: IdTable::new("projection"),
        service_groups: IdTable::new("service group"),
        urls: IdTable::new("url"),
        parameters: IdTable::new("parameter"),
        services: IdTable::new("service"),
        parts: ModelParts::default(),
    };

    for element in state.top_level_elements() {
        match element {
            TopLevelIdx::Enumeration(idx) => {
                a.enumerations.allocate(idx, EnumerationId::from_index);
                let enumeration = state.enumeration(idx);
                a.parts.enumerations.push(Enumeration {
                    info: info(&enumeration.core),
                    literals: enumeration
                        .literals
                        .iter()
                        .map(|l| EnumerationLiteral {
                            name: l.name.name.clone(),
                            pretty_name: l.pretty_name.clone(),
                        })
                        .collect(),
                });
            }
            TopLevelIdx::Interface(idx) => {
                a.interfaces.allocate(idx, InterfaceId::from_index);
                allocate_members(&mut a, state.interface(idx));
            }
            TopLevelIdx::Klass(idx) => {
                a.klasses.allocate(idx, KlassId::from_index);
                allocate_members(&mut a, state.klass(idx));
            }
            TopLevelIdx::Association(idx) => {
                a.associations.allocate(idx, AssociationId::from_index);
                for end in state.association(idx).ends() {
                    a.association_ends.allocate(end, AssociationEndId::from_index);
                }
            }
            TopLevelIdx::Projection(idx) => {
                a.projections.allocate(idx, ProjectionId::from_index);
            }
            TopLevelIdx::ServiceGroup(idx) => {
                a.service_groups.allocate(idx, ServiceGroupId::from_index);
                for url in &state.service_group(idx).urls {
                    a.urls.allocate(*url, UrlId::from_index);
                    let url_state = state.url(*url);
                    for parameter in url_state.parameters() {
                        a.parameters.allocate(parameter, ParameterId::from_index);
                    }
                    for service in &url_state.services {
                        a.services.allocate(*service, ServiceId::from_index);
                    }
                }
            }
        }
    }
    tracing::debug!(
        classes = a.klasses.order().len(),
        properties = a.properties.order().len(),
        ends = a.association_ends.order().len(),
        "allocated model ids"
    );
    a
}

fn allocate_members(a: &mut Allocation, classifier: &dyn Classifier) {
    for property in &classifier.core().properties {
        a.properties.allocate(*property, PropertyId::from_index);
    }
    for signature in &classifier.core().end_signatures {
        a.end_signatures.allocate(*signature, EndSignatureId::from_index);
    }
}

fn info(core: &ElementCore) -> ElementInfo {
    ElementInfo {
        name: core.name.name.clone(),
        package: core.package.clone(),
        ordinal: core.ordinal,
        source_name: core.source_name.clone(),
        span: core.span,
    }
}

fn modifiers(decls: &[ModifierDecl]) -> Vec<Modifier> {
    decls.iter().map(|m| m.modifier).collect()
}

fn resolved<T>(
    resolution: Resolution<T>,
    what: impl FnOnce() -> String,
) -> Result<T, InternalError> {
    resolution
        .resolved()
        .ok_or_else(|| InternalError::MissingIndex { what: what() })
}

fn filled<T>(value: Option<T>, what: impl FnOnce() -> String) -> Result<T, InternalError> {
    value.ok_or_else(|| InternalError::MissingIndex { what: what() })
}

/// Pass 2: every other record, with references translated to ids.
pub fn link(state: &CompilerState, a: Allocation) -> Result<ModelParts, InternalError> {
    let linker = Linker { state, a: &a };
    let mut parts = linker.records()?;
    parts.enumerations = a.parts.enumerations;
    Ok(parts)
}

/// Pass 3: freeze.
pub fn finish(parts: ModelParts) -> DomainModel {
    DomainModel::seal(parts)
}

struct Linker<'s> {
    state: &'s CompilerState,
    a: &'s Allocation,
}

impl Linker<'_> {
    fn records(&self) -> Result<ModelParts, InternalError> {
        let a = self.a;
        let mut parts = ModelParts::default();

        for idx in a.interfaces.order() {
            parts.interfaces.push(self.interface(*idx)?);
        }
        for idx in a.klasses.order() {
            parts.klasses.push(self.klass(*idx)?);
        }
        for idx in a.properties.order() {
            parts.properties.push(self.property(*idx)?);
        }
        for idx in a.end_signatures.order() {
            let signature = self.state.end_signature(*idx);
            let target = resolved(signature.target.unwrap_or(Resolution::NotFound), || {
                format!("target of end signature '{}'", signature.name.name)
            })?;
            parts.end_signatures.push(EndSignature {
                name: signature.name.name.clone(),
                owner: self.classifier(signature.owner)?,
                target: self.classifier(target)?,
                multiplicity: signature.multiplicity,
                modifiers: modifiers(&signature.modifiers),
                span: signature.span,
            });
        }
        for idx in a.associations.order() {
            let association = self.state.association(*idx);
            let relationship = filled(association.relationship.as_ref(), || {
                format!("relationship of '{}'", association.core.name.name)
            })?;
            parts.associations.push(Association {
                info: info(&association.core),
                source: a.association_ends.get(association.source)?,
                target: a.association_ends.get(association.target)?,
                criteria: self.criteria(relationship)?,
                join: association.join.unwrap_or(JoinKind::Predicate),
            });
            for fk in &association.foreign_keys {
                parts.foreign_keys.push(ForeignKey {
                    end: a.association_ends.get(fk.end)?,
                    foreign_key: a.properties.get(fk.foreign_key)?,
                    key: a.properties.get(fk.key)?,
                });
            }
        }
        for idx in a.association_ends.order() {
            parts.association_ends.push(self.association_end(*idx)?);
        }
        for idx in a.projections.order() {
            let projection = self.state.projection(*idx);
            let classifier = resolved(projection.classifier.unwrap_or(Resolution::NotFound), || {
                format!("classifier of projection '{}'", projection.core.name.name)
            })?;
            parts.projections.push(Projection {
                info: info(&projection.core),
                classifier: self.classifier(classifier)?,
                children: self.projection_children(&projection.children)?,
            });
        }
        for idx in a.service_groups.order() {
            let group = self.state.service_group(*idx);
            let klass = resolved(group.klass.unwrap_or(Resolution::NotFound), || {
                format!("class of service group '{}'", group.core.name.name)
            })?;
            parts.service_groups.push(ServiceGroup {
                info: info(&group.core),
                klass: a.klasses.get(klass)?,
                urls: a.urls.get_all(&group.urls)?,
            });
        }
        for idx in a.urls.order() {
            let url = self.state.url(*idx);
            let path = url
                .path
                .iter()
                .map(|segment| match segment {
                    UrlSegmentState::Constant(name) => Ok(UrlSegment::Constant(name.clone())),
                    UrlSegmentState::Parameter(p) => {
                        Ok(UrlSegment::Parameter(a.parameters.get(*p)?))
                    }
                })
                .collect::<Result<_, InternalError>>()?;
            parts.urls.push(Url {
                group: a.service_groups.get(url.group)?,
                path,
                query_parameters: a.parameters.get_all(&url.query_parameters)?,
                services: a.services.get_all(&url.services)?,
                span: url.span,
            });
        }
        for idx in a.parameters.order() {
            let parameter = self.state.parameter(*idx);
            parts.parameters.push(Parameter {
                name: parameter.name.name.clone(),
                url: a.urls.get(parameter.url)?,
                data_type: self.data_type(&parameter.parameter_type, parameter.enumeration)?,
                multiplicity: parameter.multiplicity,
            });
        }
        for idx in a.services.order() {
            parts.services.push(self.service(*idx)?);
        }

        tracing::debug!(
            associations = parts.associations.len(),
            foreign_keys = parts.foreign_keys.len(),
            services = parts.services.len(),
            "linked model records"
        );
        Ok(parts)
    }

    fn classifier(&self, idx: ClassifierIdx) -> Result<ClassifierId, InternalError> {
        Ok(match idx {
            ClassifierIdx::Interface(idx) => ClassifierId::Interface(self.a.interfaces.get(idx)?),
            ClassifierIdx::Klass(idx) => ClassifierId::Klass(self.a.klasses.get(idx)?),
        })
    }

    fn interfaces(&self, classifier: &dyn Classifier) -> Result<Vec<InterfaceId>, InternalError> {
        let core = classifier.core();
        core.interfaces
            .iter()
            .zip(&core.declared_interfaces)
            .map(|(resolution, name)| {
                let idx = resolved(*resolution, || format!("interface '{}'", name.name))?;
                self.a.interfaces.get(idx)
            })
            .collect()
    }

    fn interface(&self, idx: InterfaceIdx) -> Result<Interface, InternalError> {
        let state = self.state.interface(idx);
        Ok(Interface {
            info: info(&state.core.element),
            modifiers: modifiers(&state.core.modifiers),
            interfaces: self.interfaces(state)?,
            declared_properties: self.a.properties.get_all(&state.core.properties)?,
            properties: self
                .a
                .properties
                .get_all(&all_data_type_properties(self.state, state))?,
            end_signatures: self.a.end_signatures.get_all(&state.core.end_signatures)?,
        })
    }

    fn klass(&self, idx: KlassIdx) -> Result<Klass, InternalError> {
        let state = self.state.klass(idx);
        let superclass = match state.superclass {
            Some(resolution) => {
                let parent = resolved(resolution, || {
                    format!("superclass of '{}'", state.core.element.name.name)
                })?;
                Some(self.a.klasses.get(parent)?)
            }
            None => None,
        };
        let ends = self.state.all_association_ends(idx);
        let end_with = |modifier| -> Result<Option<AssociationEndId>, InternalError> {
            ends.iter()
                .find(|end| self.state.association_end(**end).has_modifier(modifier))
                .map(|end| self.a.association_ends.get(*end))
                .transpose()
        };
        Ok(Klass {
            info: info(&state.core.element),
            is_user: state.is_user,
            is_abstract: state.is_abstract(),
            inheritance: state.abstract_decl.as_ref().and_then(|d| d.inheritance),
            superclass,
            modifiers: modifiers(&state.core.modifiers),
            interfaces: self.interfaces(state)?,
            declared_properties: self.a.properties.get_all(&state.core.properties)?,
            properties: self
                .a
                .properties
                .get_all(&all_data_type_properties(self.state, state))?,
            end_signatures: self.a.end_signatures.get_all(&state.core.end_signatures)?,
            association_ends: self.a.association_ends.get_all(&state.association_ends)?,
            version_end: end_with(Modifier::Version)?,
            versioned_end: end_with(Modifier::Versioned)?,
        })
    }

    fn data_type(
        &self,
        property_type: &PropertyType,
        enumeration: Option<Resolution<EnumerationIdx>>,
    ) -> Result<DataType, InternalError> {
        Ok(match property_type {
            PropertyType::Primitive(primitive) => DataType::Primitive(*primitive),
            PropertyType::Enumeration(name) => {
                let idx = resolved(enumeration.unwrap_or(Resolution::NotFound), || {
                    format!("enumeration '{}'", name.name)
                })?;
                DataType::Enumeration(self.a.enumerations.get(idx)?)
            }
        })
    }

    fn property(&self, idx: PropertyIdx) -> Result<DataTypeProperty, InternalError> {
        let property = self.state.property(idx);
        Ok(DataTypeProperty {
            name: property.name.name.clone(),
            owner: self.classifier(property.owner)?,
            data_type: self.data_type(&property.property_type, property.enumeration)?,
            optional: property.optional,
            modifiers: modifiers(&property.modifiers),
            validations: property
                .validations
                .iter()
                .map(|v| Validation {
                    kind: v.kind,
                    value: v.value,
                })
                .collect(),
            span: property.span,
        })
    }

    fn association_end(&self, idx: AssociationEndIdx) -> Result<AssociationEnd, InternalError> {
        let end = self.state.association_end(idx);
        let what = || format!("association end '{}'", end.name.name);
        let target = resolved(end.target, what)?;
        let owner = filled(end.owner, || format!("owner of association end '{}'", end.name.name))?;
        Ok(AssociationEnd {
            name: end.name.name.clone(),
            association: self.a.associations.get(end.association)?,
            owner: self.a.klasses.get(owner)?,
            target: self.a.klasses.get(target)?,
            multiplicity: end.multiplicity,
            modifiers: modifiers(&end.modifiers),
            order_by: end.order_by.as_ref().map(|o| self.order_by(o)).transpose()?,
            opposite: self.a.association_ends.get(end.opposite)?,
            span: end.span,
        })
    }

    fn service(&self, idx: ServiceIdx) -> Result<Service, InternalError> {
        let service = self.state.service(idx);
        let criteria = service
            .clauses
            .iter()
            .map(|clause| {
                let criteria = filled(clause.criteria.as_ref(), || {
                    format!("'{}' clause of a {} service", clause.kind, service.verb)
                })?;
                Ok(ServiceCriteria {
                    kind: clause.kind,
                    criteria: self.criteria(criteria)?,
                    inferred: clause.inferred.is_some(),
                })
            })
            .collect::<Result<_, InternalError>>()?;
        let projection = match (&service.projection_ref, service.projection) {
            (Some(name), Some(resolution)) => {
                let idx = resolved(resolution, || format!("projection '{}'", name.name))?;
                Some(self.a.projections.get(idx)?)
            }
            _ => None,
        };
        Ok(Service {
            url: self.a.urls.get(service.url)?,
            verb: service.verb,
            multiplicity: service.multiplicity,
            criteria,
            projection,
            order_by: service.order_by.as_ref().map(|o| self.order_by(o)).transpose()?,
            span: service.span,
        })
    }

    fn criteria(&self, criteria: &CriteriaState) -> Result<Criteria, InternalError> {
        Ok(match criteria {
            CriteriaState::All { .. } => Criteria::All,
            CriteriaState::And(left, right) => {
                Criteria::And(Box::new(self.criteria(left)?), Box::new(self.criteria(right)?))
            }
            CriteriaState::Or(left, right) => {
                Criteria::Or(Box::new(self.criteria(left)?), Box::new(self.criteria(right)?))
            }
            CriteriaState::Operator {
                source,
                operator,
                target,
                ..
            } => Criteria::Operator(OperatorCriteria {
                source: self.value(source)?,
                operator: *operator,
                target: self.value(target)?,
            }),
            CriteriaState::EdgePoint { member, .. } => {
                Criteria::EdgePoint(self.member_path(member)?)
            }
        })
    }

    fn value(&self, value: &ValueState) -> Result<Value, InternalError> {
        Ok(match value {
            ValueState::Member(path) => match path.origin {
                PathOrigin::This => Value::ThisMember(self.member_path(path)?),
                PathOrigin::Type(_) => Value::TypeMember(self.member_path(path)?),
            },
            ValueState::Variable { name, parameter } => {
                let idx = resolved(*parameter, || format!("variable '{}'", name.name))?;
                Value::Variable(self.a.parameters.get(idx)?)
            }
            ValueState::Literal { value, .. } => Value::Literal(value.clone()),
            ValueState::LiteralList { values, .. } => Value::LiteralList(values.clone()),
            ValueState::User { .. } => Value::User,
        })
    }

    fn member_path(&self, path: &MemberPathState) -> Result<MemberPath, InternalError> {
        let what = || format!("member path ending in '{}'", path.member.name);
        let classifier = resolved(path.classifier, what)?;
        let hops = path
            .hops
            .iter()
            .map(|hop| {
                let end = resolved(hop.end, || format!("association end '{}'", hop.name.name))?;
                self.a.association_ends.get(end)
            })
            .collect::<Result<_, InternalError>>()?;
        let property = resolved(path.property, what)?;
        Ok(MemberPath {
            classifier: self.classifier(classifier)?,
            hops,
            property: self.a.properties.get(property)?,
        })
    }

    fn order_by(&self, order_by: &OrderByState) -> Result<OrderBy, InternalError> {
        let members = order_by
            .members
            .iter()
            .map(|member| {
                Ok(OrderByMember {
                    path: self.member_path(&member.path)?,
                    direction: member.direction,
                })
            })
            .collect::<Result<_, InternalError>>()?;
        Ok(OrderBy { members })
    }

    fn reference(
        &self,
        name: &str,
        reference: Resolution<ReferenceIdx>,
    ) -> Result<ReferenceProperty, InternalError> {
        Ok(match resolved(reference, || format!("projection reference '{}'", name))? {
            ReferenceIdx::End(end) => ReferenceProperty::End(self.a.association_ends.get(end)?),
            ReferenceIdx::Signature(signature) => {
                ReferenceProperty::Signature(self.a.end_signatures.get(signature)?)
            }
        })
    }

    fn projection_children(
        &self,
        children: &[ProjectionElementState],
    ) -> Result<Vec<ProjectionElement>, InternalError> {
        children
            .iter()
            .map(|child| {
                Ok(match child {
                    ProjectionElementState::Property {
                        name,
                        header,
                        property,
                        ..
                    } => {
                        let idx = resolved(*property, || {
                            format!("projection property '{}'", name.name)
                        })?;
                        ProjectionElement::Property {
                            name: name.name.clone(),
                            header: header.clone(),
                            property: self.a.properties.get(idx)?,
                        }
                    }
                    ProjectionElementState::Reference {
                        name,
                        reference,
                        children,
                        ..
                    } => ProjectionElement::Reference {
                        name: name.name.clone(),
                        reference: self.reference(&name.name, *reference)?,
                        children: self.projection_children(children)?,
                    },
                    ProjectionElementState::Projection {
                        name,
                        reference,
                        projection_name,
                        projection,
                        ..
                    } => {
                        let idx = resolved(*projection, || {
                            format!("projection '{}'", projection_name.name)
                        })?;
                        ProjectionElement::Projection {
                            name: name.name.clone(),
                            reference: self.reference(&name.name, *reference)?,
                            projection: self.a.projections.get(idx)?,
                        }
                    }
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::tests::analyzed;
    use klass_ast::foundation::{Multiplicity, PrimitiveType};
    use klass_ast::syntax::builder::{eq, this_member, type_member, TreeBuilder};

    #[test]
    fn test_forward_references_link() {
        // The association and the projection name classes declared after them
        let tree = TreeBuilder::new("test")
            .association(
                "QuestionHasAnswers",
                ("question", "Question", Multiplicity::OneToOne),
                ("answers", "Answer", Multiplicity::ZeroToMany),
                eq(this_member("id"), type_member("Answer.questionId")),
            )
            .projection("QuestionSummary", "Question", |p| {
                p.property("id", "Id").reference("answers", |r| r.property("id", "Id"))
            })
            .class("Question", |c| c.property("id", PrimitiveType::Long, |p| p.key()))
            .class("Answer", |c| {
                c.property("id", PrimitiveType::Long, |p| p.key())
                    .property("questionId", PrimitiveType::Long, |p| p)
            })
            .build(0);
        let outcome = analyzed(vec![tree]);
        let model = assemble(&outcome.state).unwrap();

        let question = model.find_klass("Question").unwrap();
        let answer = model.find_klass("Answer").unwrap();
        let association = model.association(model.find_association("QuestionHasAnswers").unwrap());
        let source = model.association_end(association.source);
        assert_eq!(source.target, question);
        assert_eq!(source.owner, answer);
        assert_eq!(model.opposite(model.opposite(association.source)), association.source);
        assert_eq!(association.join, JoinKind::Direct);

        let fk = model.foreign_keys(answer).next().unwrap();
        assert_eq!(model.property(fk.foreign_key).name, "questionId");
        assert_eq!(model.property(fk.key).owner, ClassifierId::Klass(question));

        let projection = model.projection(model.find_projection("QuestionSummary").unwrap());
        assert_eq!(projection.classifier, ClassifierId::Klass(question));
        assert!(matches!(
            projection.children[1],
            ProjectionElement::Reference {
                reference: ReferenceProperty::End(_),
                ..
            }
        ));
    }

    #[test]
    fn test_inherited_properties_are_listed_after_declared() {
        let tree = TreeBuilder::new("test")
            .interface("Named", |i| i.property("name", PrimitiveType::String, |p| p))
            .class("Base", |c| {
                c.abstract_class(None)
                    .property("id", PrimitiveType::Long, |p| p.key())
            })
            .class("Leaf", |c| {
                c.extends("Base")
                    .implements("Named")
                    .property("size", PrimitiveType::Integer, |p| p)
            })
            .build(0);
        let model = assemble(&analyzed(vec![tree]).state).unwrap();
        let leaf = model.find_klass("Leaf").unwrap();
        let names: Vec<_> = model
            .data_type_properties(ClassifierId::Klass(leaf))
            .iter()
            .map(|p| model.property(*p).name.as_str())
            .collect();
        assert_eq!(names, vec!["size", "id", "name"]);
        assert_eq!(model.superclass_chain(leaf), vec![model.find_klass("Base").unwrap()]);
    }

    #[test]
    fn test_unresolved_reference_is_missing_index() {
        let tree = TreeBuilder::new("test")
            .class("Foo", |c| {
                c.extends("Missing")
                    .property("id", PrimitiveType::Long, |p| p.key())
            })
            .build(0);
        let outcome = analyzed(vec![tree]);
        assert!(matches!(
            assemble(&outcome.state),
            Err(InternalError::MissingIndex { .. })
        ));
    }
}
