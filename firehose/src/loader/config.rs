/// Tuning knobs for a [`super::BatchingCache`].
///
/// The default batches every key of a window into one fetch and memoizes
/// every outcome.
///
/// ```rust,ignore
/// let config = LoaderConfig::new().with_max_batch_size(10);
/// let users = Collection::with_config(db.collection("users")?, transform, config);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    batch: bool,
    max_batch_size: Option<usize>,
    cache: bool,
}

impl LoaderConfig {
    pub fn new() -> Self {
        LoaderConfig::default()
    }

    /// With `false`, every key is fetched on its own.
    pub fn with_batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    /// Caps the number of keys handed to one fetch. A full batch is
    /// dispatched and the next key opens a new one. Zero is treated as one.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = Some(max_batch_size.max(1));
        self
    }

    /// With `false`, nothing is memoized: each load fetches again, but
    /// repeated keys inside one batch are still fetched once.
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn batch(&self) -> bool {
        self.batch
    }

    pub fn max_batch_size(&self) -> Option<usize> {
        self.max_batch_size
    }

    pub fn cache(&self) -> bool {
        self.cache
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            batch: true,
            max_batch_size: None,
            cache: true,
        }
    }
}
