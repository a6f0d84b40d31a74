//! Keyword vocabularies of the Klass language.
//!
//! Each enum here is the single source of truth for one closed set of
//! keywords: primitive types, modifiers, multiplicities, criteria operators,
//! service verbs and service clauses. The parser produces these values; the
//! compiler and the model reuse them so keyword spelling lives in one place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a keyword is not part of a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKeyword {
    pub vocabulary: &'static str,
    pub keyword: String,
}

impl fmt::Display for UnknownKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.vocabulary, self.keyword)
    }
}

impl std::error::Error for UnknownKeyword {}

/// Generates keyword tables, `keyword()`, `Display` and `FromStr` for a
/// fieldless enum.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $vocabulary:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $keyword:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every keyword of this vocabulary, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The source spelling of this keyword.
            pub fn keyword(self) -> &'static str {
                match self {
                    $($name::$variant => $keyword),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.keyword())
            }
        }

        impl FromStr for $name {
            type Err = UnknownKeyword;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($keyword => Ok($name::$variant),)+
                    other => Err(UnknownKeyword {
                        vocabulary: $vocabulary,
                        keyword: other.to_string(),
                    }),
                }
            }
        }
    };
}

keyword_enum! {
    /// Built-in data types of data-type properties and parameters.
    PrimitiveType, "primitive type" {
        Integer => "Integer",
        Long => "Long",
        Double => "Double",
        Float => "Float",
        Boolean => "Boolean",
        String => "String",
        Instant => "Instant",
        LocalDate => "LocalDate",
        TemporalInstant => "TemporalInstant",
        TemporalRange => "TemporalRange",
    }
}

impl PrimitiveType {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            PrimitiveType::Integer
                | PrimitiveType::Long
                | PrimitiveType::Double
                | PrimitiveType::Float
        )
    }

    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            PrimitiveType::TemporalInstant | PrimitiveType::TemporalRange
        )
    }
}

keyword_enum! {
    /// Modifiers on classifiers, data-type properties and association ends.
    Modifier, "modifier" {
        // Classifier modifiers
        SystemTemporal => "systemTemporal",
        ValidTemporal => "validTemporal",
        Bitemporal => "bitemporal",
        Audited => "audited",
        Transient => "transient",
        OptimisticallyLocked => "optimisticallyLocked",
        // Property modifiers
        Key => "key",
        Id => "id",
        Private => "private",
        UserId => "userId",
        Version => "version",
        CreatedBy => "createdBy",
        CreatedOn => "createdOn",
        LastUpdatedBy => "lastUpdatedBy",
        System => "system",
        Valid => "valid",
        From => "from",
        To => "to",
        Final => "final",
        Derived => "derived",
        // Association end modifiers
        Owned => "owned",
        Versioned => "versioned",
    }
}

impl Modifier {
    /// Classifier modifiers that trigger temporal property inference.
    pub fn is_temporal_classifier_modifier(self) -> bool {
        matches!(
            self,
            Modifier::SystemTemporal | Modifier::ValidTemporal | Modifier::Bitemporal
        )
    }

    /// Property modifiers that mark audit bookkeeping.
    pub fn is_audit(self) -> bool {
        matches!(
            self,
            Modifier::CreatedBy | Modifier::CreatedOn | Modifier::LastUpdatedBy
        )
    }
}

keyword_enum! {
    /// Inheritance mapping strategy declared by `abstract(...)`.
    InheritanceType, "inheritance type" {
        TablePerSubclass => "table-per-subclass",
        TableForAllSubclasses => "table-for-all-subclasses",
        TablePerClass => "table-per-class",
    }
}

keyword_enum! {
    /// Association end, signature and parameter multiplicities.
    Multiplicity, "multiplicity" {
        ZeroToOne => "0..1",
        OneToOne => "1..1",
        ZeroToMany => "0..*",
        OneToMany => "1..*",
    }
}

impl Multiplicity {
    pub fn is_to_one(self) -> bool {
        matches!(self, Multiplicity::ZeroToOne | Multiplicity::OneToOne)
    }

    pub fn is_to_many(self) -> bool {
        !self.is_to_one()
    }

    pub fn is_required(self) -> bool {
        matches!(self, Multiplicity::OneToOne | Multiplicity::OneToMany)
    }
}

keyword_enum! {
    /// Binary operators of operator criteria.
    OperatorKind, "operator" {
        Equal => "==",
        NotEqual => "!=",
        LessThan => "<",
        GreaterThan => ">",
        LessThanOrEqual => "<=",
        GreaterThanOrEqual => ">=",
        In => "in",
        Contains => "contains",
        StartsWith => "startsWith",
        EndsWith => "endsWith",
    }
}

impl OperatorKind {
    pub fn is_equality(self) -> bool {
        self == OperatorKind::Equal
    }
}

keyword_enum! {
    /// HTTP verbs of services.
    Verb, "verb" {
        Get => "GET",
        Post => "POST",
        Put => "PUT",
        Patch => "PATCH",
        Delete => "DELETE",
    }
}

keyword_enum! {
    /// Whether a service returns one instance or many.
    ServiceMultiplicity, "service multiplicity" {
        One => "one",
        Many => "many",
    }
}

keyword_enum! {
    /// Criteria clauses of a service.
    ServiceCriteriaKind, "service criteria" {
        Criteria => "criteria",
        Authorize => "authorize",
        Validate => "validate",
        Conflict => "conflict",
        Version => "version",
    }
}

impl Verb {
    /// Service clauses a service with this verb may declare.
    pub fn allowed_criteria(self) -> &'static [ServiceCriteriaKind] {
        use ServiceCriteriaKind::*;
        match self {
            Verb::Get => &[Criteria, Authorize, Version],
            Verb::Post => &[Authorize, Validate],
            Verb::Put | Verb::Patch | Verb::Delete => {
                &[Criteria, Authorize, Validate, Conflict, Version]
            }
        }
    }
}

keyword_enum! {
    /// Sort direction of an order-by member.
    SortDirection, "sort direction" {
        Ascending => "ascending",
        Descending => "descending",
    }
}

keyword_enum! {
    /// Length and range validations on data-type properties.
    ValidationKind, "validation" {
        MinLength => "minLength",
        MaxLength => "maxLength",
        Min => "min",
        Max => "max",
    }
}

/// Literal operand of a criteria expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Integer(i64),
    Floating(f64),
    String(String),
    Boolean(bool),
    Null,
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Integer(value) => write!(f, "{}", value),
            LiteralValue::Floating(value) => write!(f, "{}", value),
            LiteralValue::String(value) => write!(f, "\"{}\"", value),
            LiteralValue::Boolean(value) => write!(f, "{}", value),
            LiteralValue::Null => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_round_trip_through_from_str() {
        for modifier in Modifier::ALL {
            assert_eq!(modifier.keyword().parse::<Modifier>(), Ok(*modifier));
        }
        assert_eq!("table-per-subclass".parse(), Ok(InheritanceType::TablePerSubclass));
    }

    #[test]
    fn test_unknown_keyword_reports_vocabulary() {
        let err = "sometimes".parse::<Modifier>().unwrap_err();
        assert_eq!(err.to_string(), "unknown modifier 'sometimes'");
    }

    #[test]
    fn test_multiplicity_predicates() {
        assert!(Multiplicity::ZeroToOne.is_to_one());
        assert!(!Multiplicity::ZeroToOne.is_required());
        assert!(Multiplicity::OneToMany.is_to_many());
        assert!(Multiplicity::OneToMany.is_required());
    }

    #[test]
    fn test_verb_allowed_criteria() {
        assert!(Verb::Get.allowed_criteria().contains(&ServiceCriteriaKind::Version));
        assert!(!Verb::Get.allowed_criteria().contains(&ServiceCriteriaKind::Conflict));
        assert!(!Verb::Post.allowed_criteria().contains(&ServiceCriteriaKind::Criteria));
        assert!(Verb::Delete.allowed_criteria().contains(&ServiceCriteriaKind::Conflict));
    }

    #[test]
    fn test_only_equality_is_equality() {
        let equalities: Vec<_> = OperatorKind::ALL
            .iter()
            .filter(|op| op.is_equality())
            .collect();
        assert_eq!(equalities, vec![&OperatorKind::Equal]);
    }
}
