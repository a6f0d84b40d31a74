//! Mutable compiler state.
//!
//! Phases create one state record per declaration and attach resolved
//! references to it as they run. Records live in typed arenas of
//! [`CompilerState`] and point at each other through the index types below;
//! nothing holds a reference into another record.
//!
//! Assembly reads the finished state and produces the immutable
//! [`DomainModel`](klass_model::DomainModel).

pub mod association;
pub mod classifier;
pub mod criteria;
pub mod projection;
pub mod property;
pub mod service;

pub use association::{AssociationEndState, AssociationState, ForeignKeyState};
pub use classifier::{
    all_data_type_properties, all_interfaces, conforms_to, find_data_type_property,
    implements_interface, is_subclass_of, superclass_chain, Classifier, ClassifierCore,
    InterfaceState, KlassState,
};
pub use criteria::{
    CriteriaState, HopState, MemberPathState, OrderByMemberState, OrderByState, PathOrigin,
    ValueState,
};
pub use projection::{ProjectionElementState, ProjectionState, ReferenceIdx};
pub use property::{EndSignatureState, PropertyState, TemporalPart};
pub use service::{
    ParameterState, ServiceClauseState, ServiceGroupState, ServiceState, UrlSegmentState, UrlState,
};

use crate::resolution::Resolution;
use klass_ast::foundation::{ContextKey, Span, UnitId};
use klass_ast::syntax::{EnumerationLiteralDecl, Ident};
use std::collections::HashSet;

macro_rules! define_idx {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }

            fn next(len: usize) -> Self {
                Self(u32::try_from(len).unwrap_or(u32::MAX))
            }
        }
    };
}

define_idx!(EnumerationIdx);
define_idx!(InterfaceIdx);
define_idx!(KlassIdx);
define_idx!(PropertyIdx);
define_idx!(EndSignatureIdx);
define_idx!(AssociationIdx);
define_idx!(AssociationEndIdx);
define_idx!(ProjectionIdx);
define_idx!(ServiceGroupIdx);
define_idx!(UrlIdx);
define_idx!(ParameterIdx);
define_idx!(ServiceIdx);

/// Either kind of classifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassifierIdx {
    Interface(InterfaceIdx),
    Klass(KlassIdx),
}

/// Any top-level element state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TopLevelIdx {
    Enumeration(EnumerationIdx),
    Interface(InterfaceIdx),
    Klass(KlassIdx),
    Association(AssociationIdx),
    Projection(ProjectionIdx),
    ServiceGroup(ServiceGroupIdx),
}

impl TopLevelIdx {
    pub fn as_classifier(self) -> Option<ClassifierIdx> {
        match self {
            TopLevelIdx::Interface(idx) => Some(ClassifierIdx::Interface(idx)),
            TopLevelIdx::Klass(idx) => Some(ClassifierIdx::Klass(idx)),
            _ => None,
        }
    }

    pub fn kind_name(self) -> &'static str {
        match self {
            TopLevelIdx::Enumeration(_) => "enumeration",
            TopLevelIdx::Interface(_) => "interface",
            TopLevelIdx::Klass(_) => "class",
            TopLevelIdx::Association(_) => "association",
            TopLevelIdx::Projection(_) => "projection",
            TopLevelIdx::ServiceGroup(_) => "service group",
        }
    }
}

impl From<ClassifierIdx> for TopLevelIdx {
    fn from(idx: ClassifierIdx) -> Self {
        match idx {
            ClassifierIdx::Interface(idx) => TopLevelIdx::Interface(idx),
            ClassifierIdx::Klass(idx) => TopLevelIdx::Klass(idx),
        }
    }
}

/// Any state a parse context can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateRef {
    TopLevel(TopLevelIdx),
    Property(PropertyIdx),
    EndSignature(EndSignatureIdx),
    AssociationEnd(AssociationEndIdx),
    Url(UrlIdx),
    Parameter(ParameterIdx),
    Service(ServiceIdx),
}

/// Data shared by every top-level element state.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementCore {
    pub name: Ident,
    pub package: String,
    pub ordinal: u32,
    pub unit: UnitId,
    pub source_name: String,
    pub ctx: ContextKey,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumerationState {
    pub core: ElementCore,
    pub literals: Vec<EnumerationLiteralDecl>,
}

/// All compiler state of one compilation.
#[derive(Debug, Default)]
pub struct CompilerState {
    pub enumerations: Vec<EnumerationState>,
    pub interfaces: Vec<InterfaceState>,
    pub klasses: Vec<KlassState>,
    pub properties: Vec<PropertyState>,
    pub end_signatures: Vec<EndSignatureState>,
    pub associations: Vec<AssociationState>,
    pub association_ends: Vec<AssociationEndState>,
    pub projections: Vec<ProjectionState>,
    pub service_groups: Vec<ServiceGroupState>,
    pub urls: Vec<UrlState>,
    pub parameters: Vec<ParameterState>,
    pub services: Vec<ServiceState>,
    /// Properties named by criteria, order-by clauses or projections
    pub referenced_properties: HashSet<PropertyIdx>,
}

macro_rules! arena {
    (
        $add:ident,
        $get:ident,
        $get_mut:ident,
        $next:ident,
        $field:ident,
        $idx:ident,
        $state:ty $(,)?
    ) => {
        /// Index the next record added will receive.
        pub fn $next(&self) -> $idx {
            $idx::next(self.$field.len())
        }

        pub fn $add(&mut self, state: $state) -> $idx {
            let idx = $idx::next(self.$field.len());
            self.$field.push(state);
            idx
        }

        pub fn $get(&self, idx: $idx) -> &$state {
            &self.$field[idx.index()]
        }

        pub fn $get_mut(&mut self, idx: $idx) -> &mut $state {
            &mut self.$field[idx.index()]
        }
    };
}

impl CompilerState {
    arena!(
        add_enumeration,
        enumeration,
        enumeration_mut,
        next_enumeration_idx,
        enumerations,
        EnumerationIdx,
        EnumerationState,
    );
    arena!(
        add_interface,
        interface,
        interface_mut,
        next_interface_idx,
        interfaces,
        InterfaceIdx,
        InterfaceState,
    );
    arena!(add_klass, klass, klass_mut, next_klass_idx, klasses, KlassIdx, KlassState);
    arena!(
        add_property,
        property,
        property_mut,
        next_property_idx,
        properties,
        PropertyIdx,
        PropertyState,
    );
    arena!(
        add_end_signature,
        end_signature,
        end_signature_mut,
        next_end_signature_idx,
        end_signatures,
        EndSignatureIdx,
        EndSignatureState,
    );
    arena!(
        add_association,
        association,
        association_mut,
        next_association_idx,
        associations,
        AssociationIdx,
        AssociationState,
    );
    arena!(
        add_association_end,
        association_end,
        association_end_mut,
        next_association_end_idx,
        association_ends,
        AssociationEndIdx,
        AssociationEndState,
    );
    arena!(
        add_projection,
        projection,
        projection_mut,
        next_projection_idx,
        projections,
        ProjectionIdx,
        ProjectionState,
    );
    arena!(
        add_service_group,
        service_group,
        service_group_mut,
        next_service_group_idx,
        service_groups,
        ServiceGroupIdx,
        ServiceGroupState,
    );
    arena!(add_url, url, url_mut, next_url_idx, urls, UrlIdx, UrlState);
    arena!(
        add_parameter,
        parameter,
        parameter_mut,
        next_parameter_idx,
        parameters,
        ParameterIdx,
        ParameterState,
    );
    arena!(add_service, service, service_mut, next_service_idx, services, ServiceIdx, ServiceState);

    pub fn classifier(&self, idx: ClassifierIdx) -> &dyn Classifier {
        match idx {
            ClassifierIdx::Interface(idx) => self.interface(idx),
            ClassifierIdx::Klass(idx) => self.klass(idx),
        }
    }

    pub fn classifier_core_mut(&mut self, idx: ClassifierIdx) -> &mut ClassifierCore {
        match idx {
            ClassifierIdx::Interface(idx) => &mut self.interface_mut(idx).core,
            ClassifierIdx::Klass(idx) => &mut self.klass_mut(idx).core,
        }
    }

    pub fn element_core(&self, idx: TopLevelIdx) -> &ElementCore {
        match idx {
            TopLevelIdx::Enumeration(idx) => &self.enumeration(idx).core,
            TopLevelIdx::Interface(idx) => &self.interface(idx).core.element,
            TopLevelIdx::Klass(idx) => &self.klass(idx).core.element,
            TopLevelIdx::Association(idx) => &self.association(idx).core,
            TopLevelIdx::Projection(idx) => &self.projection(idx).core,
            TopLevelIdx::ServiceGroup(idx) => &self.service_group(idx).core,
        }
    }

    /// Every top-level element, sorted by ordinal.
    pub fn top_level_elements(&self) -> Vec<TopLevelIdx> {
        let enumerations = (0..self.enumerations.len()).map(EnumerationIdx::next);
        let interfaces = (0..self.interfaces.len()).map(InterfaceIdx::next);
        let klasses = (0..self.klasses.len()).map(KlassIdx::next);
        let associations = (0..self.associations.len()).map(AssociationIdx::next);
        let projections = (0..self.projections.len()).map(ProjectionIdx::next);
        let service_groups = (0..self.service_groups.len()).map(ServiceGroupIdx::next);
        let mut all: Vec<TopLevelIdx> = enumerations
            .map(TopLevelIdx::Enumeration)
            .chain(interfaces.map(TopLevelIdx::Interface))
            .chain(klasses.map(TopLevelIdx::Klass))
            .chain(associations.map(TopLevelIdx::Association))
            .chain(projections.map(TopLevelIdx::Projection))
            .chain(service_groups.map(TopLevelIdx::ServiceGroup))
            .collect();
        all.sort_by_key(|idx| self.element_core(*idx).ordinal);
        all
    }

    /// Every classifier, sorted by ordinal.
    pub fn classifiers(&self) -> Vec<ClassifierIdx> {
        self.top_level_elements()
            .into_iter()
            .filter_map(TopLevelIdx::as_classifier)
            .collect()
    }

    pub fn klass_indices(&self) -> impl Iterator<Item = KlassIdx> {
        (0..self.klasses.len()).map(KlassIdx::next)
    }

    pub fn association_indices(&self) -> impl Iterator<Item = AssociationIdx> {
        (0..self.associations.len()).map(AssociationIdx::next)
    }

    pub fn property_indices(&self) -> impl Iterator<Item = PropertyIdx> {
        (0..self.properties.len()).map(PropertyIdx::next)
    }

    pub fn projection_indices(&self) -> impl Iterator<Item = ProjectionIdx> {
        (0..self.projections.len()).map(ProjectionIdx::next)
    }

    pub fn service_group_indices(&self) -> impl Iterator<Item = ServiceGroupIdx> {
        (0..self.service_groups.len()).map(ServiceGroupIdx::next)
    }

    pub fn service_indices(&self) -> impl Iterator<Item = ServiceIdx> {
        (0..self.services.len()).map(ServiceIdx::next)
    }

    /// Resolution of an association end name among the ends navigable from
    /// a class, inherited ends included.
    pub fn find_association_end(
        &self,
        klass: KlassIdx,
        name: &str,
    ) -> Resolution<AssociationEndIdx> {
        Resolution::from_matches(
            self.all_association_ends(klass)
                .into_iter()
                .filter(|end| self.association_end(*end).name.name == name),
        )
    }

    /// Association ends navigable from a class, including inherited ones.
    pub fn all_association_ends(&self, klass: KlassIdx) -> Vec<AssociationEndIdx> {
        let mut ends = self.klass(klass).association_ends.clone();
        for ancestor in superclass_chain(self, klass) {
            for end in &self.klass(ancestor).association_ends {
                let name = &self.association_end(*end).name.name;
                if !ends.iter().any(|e| &self.association_end(*e).name.name == name) {
                    ends.push(*end);
                }
            }
        }
        ends
    }
}
