/// Options for point lookups.
///
/// # Examples
///
/// ```rust,ignore
/// use firehose::collection::{no_cache, FindOptions};
///
/// // served from the cache when possible
/// let user = users.find_one("1", FindOptions::default()).await?;
///
/// // always read from the store, then re-cache
/// let user = users.find_one("1", no_cache()).await?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindOptions {
    cache: bool,
}

impl FindOptions {
    pub fn new(cache: bool) -> Self {
        Self { cache }
    }

    /// Returns whether a memoized result may be used.
    pub fn is_cache(&self) -> bool {
        self.cache
    }
}

impl Default for FindOptions {
    fn default() -> Self {
        FindOptions::new(true)
    }
}

/// Creates `FindOptions` that bypass any memoized result.
pub fn no_cache() -> FindOptions {
    FindOptions::new(false)
}

/// Options for predicate queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    prime: bool,
}

impl QueryOptions {
    pub fn new(prime: bool) -> Self {
        Self { prime }
    }

    /// Returns whether query results are primed into the lookup cache.
    pub fn is_prime(&self) -> bool {
        self.prime
    }
}

/// Creates `QueryOptions` that prime every result into the lookup cache.
pub fn prime() -> QueryOptions {
    QueryOptions::new(true)
}
