use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use crate::common::Fields;
use crate::errors::FirehoseResult;

use super::{AllFilter, AndFilter, NotFilter, OrFilter};

/// Trait for implementing filters.
///
/// A `FilterProvider` decides whether one stored document matches. Custom
/// predicates can implement it and be wrapped with [`Filter::new`].
pub trait FilterProvider: Send + Sync + Display {
    /// Applies the filter to a document and returns whether it matches.
    fn apply(&self, entry: &Fields) -> FirehoseResult<bool>;
}

/// A cloneable, shareable predicate over stored documents.
#[derive(Clone)]
pub struct Filter {
    provider: Arc<dyn FilterProvider>,
}

impl Filter {
    pub fn new<P: FilterProvider + 'static>(provider: P) -> Self {
        Filter {
            provider: Arc::new(provider),
        }
    }

    #[inline]
    pub fn apply(&self, entry: &Fields) -> FirehoseResult<bool> {
        self.provider.apply(entry)
    }

    /// Matches when both filters match.
    pub fn and(self, other: Filter) -> Filter {
        Filter::new(AndFilter::new(vec![self, other]))
    }

    /// Matches when either filter matches.
    pub fn or(self, other: Filter) -> Filter {
        Filter::new(OrFilter::new(vec![self, other]))
    }

    /// Matches when this filter does not.
    pub fn not(self) -> Filter {
        Filter::new(NotFilter::new(self))
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.provider)
    }
}

impl Debug for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter{}", self.provider)
    }
}

/// A filter matching every document.
pub fn all() -> Filter {
    Filter::new(AllFilter)
}

/// Matches when every filter matches. An empty list matches everything.
pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::new(AndFilter::new(filters))
}

/// Matches when any filter matches. An empty list matches nothing.
pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::new(OrFilter::new(filters))
}
