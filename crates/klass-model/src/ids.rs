//! Typed indices into the model arenas.
//!
//! Every record of a [`DomainModel`](crate::DomainModel) lives in a `Vec`
//! arena and refers to other records through these indices. An index is only
//! meaningful for the model that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Position of the record in its arena.
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Index of the `index`-th record of an arena.
            pub fn from_index(index: usize) -> Self {
                Self(u32::try_from(index).unwrap_or(u32::MAX))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Index of an enumeration
    EnumerationId, "enumeration"
);
define_id!(
    /// Index of an interface
    InterfaceId, "interface"
);
define_id!(
    /// Index of a class
    KlassId, "class"
);
define_id!(
    /// Index of a data-type property
    PropertyId, "property"
);
define_id!(
    /// Index of an association end signature
    EndSignatureId, "signature"
);
define_id!(
    /// Index of an association
    AssociationId, "association"
);
define_id!(
    /// Index of an association end
    AssociationEndId, "end"
);
define_id!(
    /// Index of a projection
    ProjectionId, "projection"
);
define_id!(
    /// Index of a service group
    ServiceGroupId, "service group"
);
define_id!(
    /// Index of a url of a service group
    UrlId, "url"
);
define_id!(
    /// Index of a url parameter
    ParameterId, "parameter"
);
define_id!(
    /// Index of a service
    ServiceId, "service"
);

/// Either kind of classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassifierId {
    Interface(InterfaceId),
    Klass(KlassId),
}

impl ClassifierId {
    pub fn as_klass(self) -> Option<KlassId> {
        match self {
            ClassifierId::Klass(id) => Some(id),
            ClassifierId::Interface(_) => None,
        }
    }
}

impl From<KlassId> for ClassifierId {
    fn from(id: KlassId) -> Self {
        ClassifierId::Klass(id)
    }
}

impl From<InterfaceId> for ClassifierId {
    fn from(id: InterfaceId) -> Self {
        ClassifierId::Interface(id)
    }
}

/// Any element of the shared top-level namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TopLevelId {
    Enumeration(EnumerationId),
    Interface(InterfaceId),
    Klass(KlassId),
    Association(AssociationId),
    Projection(ProjectionId),
    ServiceGroup(ServiceGroupId),
}

impl From<ClassifierId> for TopLevelId {
    fn from(id: ClassifierId) -> Self {
        match id {
            ClassifierId::Interface(id) => TopLevelId::Interface(id),
            ClassifierId::Klass(id) => TopLevelId::Klass(id),
        }
    }
}
