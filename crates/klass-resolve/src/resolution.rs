//! Outcome of a name lookup.
//!
//! Lookups never return "nothing" silently. A name is resolved, ambiguous
//! because several declarations claim it, or not found. Phases store the
//! outcome as-is and validation reports the failures later, so a missing or
//! duplicated name never stops the remaining phases from running.

/// Result of resolving a name against the compiler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution<T> {
    Resolved(T),
    Ambiguous,
    NotFound,
}

impl<T> Resolution<T> {
    /// Resolve from every candidate that matched.
    ///
    /// ```
    /// # use klass_resolve::Resolution;
    /// assert_eq!(Resolution::from_matches(Vec::<u32>::new()), Resolution::NotFound);
    /// assert_eq!(Resolution::from_matches([7]), Resolution::Resolved(7));
    /// assert_eq!(Resolution::from_matches([7, 8]), Resolution::Ambiguous);
    /// ```
    pub fn from_matches(matches: impl IntoIterator<Item = T>) -> Self {
        let mut iter = matches.into_iter();
        match (iter.next(), iter.next()) {
            (None, _) => Resolution::NotFound,
            (Some(only), None) => Resolution::Resolved(only),
            (Some(_), Some(_)) => Resolution::Ambiguous,
        }
    }

    /// Add one more candidate for the same name.
    pub fn merge(self, candidate: T) -> Self {
        match self {
            Resolution::NotFound => Resolution::Resolved(candidate),
            Resolution::Resolved(_) | Resolution::Ambiguous => Resolution::Ambiguous,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Resolution::Resolved(value) => Resolution::Resolved(f(value)),
            Resolution::Ambiguous => Resolution::Ambiguous,
            Resolution::NotFound => Resolution::NotFound,
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Resolution<U>) -> Resolution<U> {
        match self {
            Resolution::Resolved(value) => f(value),
            Resolution::Ambiguous => Resolution::Ambiguous,
            Resolution::NotFound => Resolution::NotFound,
        }
    }

    /// Try `f` when nothing was found. Ambiguity is kept.
    pub fn or_else(self, f: impl FnOnce() -> Resolution<T>) -> Resolution<T> {
        match self {
            Resolution::NotFound => f(),
            other => other,
        }
    }

    pub fn resolved(self) -> Option<T> {
        match self {
            Resolution::Resolved(value) => Some(value),
            Resolution::Ambiguous | Resolution::NotFound => None,
        }
    }

    pub fn as_ref(&self) -> Resolution<&T> {
        match self {
            Resolution::Resolved(value) => Resolution::Resolved(value),
            Resolution::Ambiguous => Resolution::Ambiguous,
            Resolution::NotFound => Resolution::NotFound,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Resolution::Ambiguous)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound)
    }
}

impl<T> From<Option<T>> for Resolution<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Resolution::Resolved(value),
            None => Resolution::NotFound,
        }
    }
}
