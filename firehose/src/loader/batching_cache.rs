use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures_util::future::{join_all, BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::errors::{ErrorKind, FirehoseError, FirehoseResult};

use super::{BatchLoader, LoaderConfig};

/// Bounds for keys of a [`BatchingCache`].
pub trait CacheKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> CacheKey for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// Bounds for values of a [`BatchingCache`].
pub trait CacheValue: Clone + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Clone + Send + Sync + 'static {}

type SharedOutcome<V> = Shared<BoxFuture<'static, FirehoseResult<V>>>;
type BatchResults<K, V> = Arc<HashMap<K, FirehoseResult<V>>>;
type SharedBatch<K, V> = Shared<BoxFuture<'static, BatchResults<K, V>>>;

/// A per-instance loader that batches and memoizes point lookups.
///
/// Every key requested while a batch window is open joins that batch. The
/// window closes when the batch is first polled again after one cooperative
/// yield, so callers polled together (`join!`, `join_all`, other tasks on the
/// same runtime thread) share a single call to the [`BatchLoader`]. Each
/// outcome, success or failure, is memoized until [`BatchingCache::clear`]
/// or [`BatchingCache::clear_all`]; concurrent callers of a key all observe
/// the same outcome.
///
/// The memo is unbounded. Keep one instance per unit of work, or clear it.
///
/// Once the loader has been called the fetch runs on the tokio runtime to
/// completion, even if every caller has gone away.
pub struct BatchingCache<K: CacheKey, V: CacheValue> {
    inner: Arc<CacheInner<K, V>>,
}

impl<K: CacheKey, V: CacheValue> Clone for BatchingCache<K, V> {
    fn clone(&self) -> Self {
        BatchingCache {
            inner: self.inner.clone(),
        }
    }
}

impl<K: CacheKey, V: CacheValue> BatchingCache<K, V> {
    pub fn new<L: BatchLoader<K, V> + 'static>(loader: L) -> Self {
        BatchingCache::with_config(loader, LoaderConfig::default())
    }

    pub fn with_config<L: BatchLoader<K, V> + 'static>(loader: L, config: LoaderConfig) -> Self {
        BatchingCache::from_loader(Arc::new(loader), config)
    }

    pub fn from_loader(loader: Arc<dyn BatchLoader<K, V>>, config: LoaderConfig) -> Self {
        BatchingCache {
            inner: Arc::new(CacheInner {
                loader,
                config,
                state: Mutex::new(CacheState {
                    memo: HashMap::new(),
                    open: None,
                }),
                batch_ids: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> LoaderConfig {
        self.inner.config
    }

    /// Returns the memoized outcome for `key`, or joins the open batch.
    pub async fn load(&self, key: K) -> FirehoseResult<V> {
        self.enqueue(key).await
    }

    /// Drops any memo entry for `key`, then loads it.
    pub async fn load_fresh(&self, key: K) -> FirehoseResult<V> {
        self.clear(&key);
        self.load(key).await
    }

    /// Loads several keys in one batch window, one outcome per key in order.
    pub async fn load_many(&self, keys: Vec<K>) -> Vec<FirehoseResult<V>> {
        let pending: Vec<SharedOutcome<V>> =
            keys.into_iter().map(|key| self.enqueue(key)).collect();
        join_all(pending).await
    }

    /// Memoizes `value` for `key` without a fetch.
    ///
    /// An existing entry wins: returns `false` and keeps it. Call
    /// [`BatchingCache::clear`] first to overwrite. With caching disabled
    /// nothing is stored.
    pub fn prime(&self, key: K, value: V) -> bool {
        if !self.inner.config.cache() {
            return false;
        }

        let mut state = self.inner.state.lock();
        if state.memo.contains_key(&key) {
            log::debug!("Skipping prime of {:?}, already cached", key);
            return false;
        }
        log::debug!("Priming {:?}", key);
        let outcome = futures_util::future::ready(Ok(value)).boxed().shared();
        state.memo.insert(key, outcome);
        true
    }

    /// Removes the memo entry for `key`. Returns `true` if there was one.
    pub fn clear(&self, key: &K) -> bool {
        let removed = self.inner.state.lock().memo.remove(key).is_some();
        if removed {
            log::debug!("Cleared {:?}", key);
        }
        removed
    }

    pub fn clear_all(&self) {
        let mut state = self.inner.state.lock();
        log::debug!("Clearing {} cached entries", state.memo.len());
        state.memo.clear();
    }

    /// Number of memoized keys, pending ones included.
    pub fn len(&self) -> usize {
        self.inner.state.lock().memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn enqueue(&self, key: K) -> SharedOutcome<V> {
        let cache = self.inner.config.cache();
        let mut state = self.inner.state.lock();
        if cache {
            if let Some(outcome) = state.memo.get(&key) {
                log::debug!("Cache hit for {:?}", key);
                return outcome.clone();
            }
        }

        let batch = self.join_batch(&mut state, &key);
        let outcome = key_outcome(batch, key.clone());
        if cache {
            state.memo.insert(key, outcome.clone());
        }
        outcome
    }

    fn join_batch(&self, state: &mut CacheState<K, V>, key: &K) -> SharedBatch<K, V> {
        let config = self.inner.config;
        if config.batch() {
            if let Some(open) = &state.open {
                let mut keys = open.keys.lock();
                if keys.contains(key) {
                    return open.outcome.clone();
                }
                let full = config
                    .max_batch_size()
                    .map(|max| keys.len() >= max)
                    .unwrap_or(false);
                if !full {
                    keys.push(key.clone());
                    return open.outcome.clone();
                }
            }
        }

        let batch = self.new_batch(key.clone());
        let outcome = batch.outcome.clone();
        if config.batch() {
            // a full batch is left to its waiters, new keys go here
            state.open = Some(batch);
        }
        outcome
    }

    fn new_batch(&self, first: K) -> OpenBatch<K, V> {
        let id = self.inner.batch_ids.fetch_add(1, Ordering::Relaxed);
        let keys = Arc::new(Mutex::new(vec![first]));
        let outcome = dispatch(Arc::downgrade(&self.inner), id, keys.clone())
            .boxed()
            .shared();
        OpenBatch { id, keys, outcome }
    }
}

impl<K: CacheKey, V: CacheValue> Debug for BatchingCache<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchingCache")
            .field("len", &self.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

struct CacheInner<K: CacheKey, V: CacheValue> {
    loader: Arc<dyn BatchLoader<K, V>>,
    config: LoaderConfig,
    state: Mutex<CacheState<K, V>>,
    batch_ids: AtomicU64,
}

struct CacheState<K: CacheKey, V: CacheValue> {
    memo: HashMap<K, SharedOutcome<V>>,
    open: Option<OpenBatch<K, V>>,
}

struct OpenBatch<K: CacheKey, V: CacheValue> {
    id: u64,
    keys: Arc<Mutex<Vec<K>>>,
    outcome: SharedBatch<K, V>,
}

fn key_outcome<K: CacheKey, V: CacheValue>(batch: SharedBatch<K, V>, key: K) -> SharedOutcome<V> {
    batch
        .map(move |results| match results.get(&key) {
            Some(result) => result.clone(),
            None => {
                log::error!("Batch finished without a result for {:?}", key);
                Err(FirehoseError::new(
                    &format!("Batch finished without a result for {:?}", key),
                    ErrorKind::InternalError,
                ))
            }
        })
        .boxed()
        .shared()
}

async fn dispatch<K: CacheKey, V: CacheValue>(
    inner: Weak<CacheInner<K, V>>,
    id: u64,
    keys: Arc<Mutex<Vec<K>>>,
) -> BatchResults<K, V> {
    // let every caller polled in this tick join the batch
    tokio::task::yield_now().await;

    let inner = match inner.upgrade() {
        Some(inner) => inner,
        None => return Arc::new(HashMap::new()),
    };
    let (loader, keys) = {
        let mut state = inner.state.lock();
        if state.open.as_ref().map(|open| open.id == id).unwrap_or(false) {
            state.open = None;
        }
        let keys = std::mem::take(&mut *keys.lock());
        (inner.loader.clone(), keys)
    };
    drop(inner);

    log::debug!("Dispatching batch {} with {} key(s)", id, keys.len());
    let results = fetch(loader, keys.clone()).await;
    Arc::new(keys.into_iter().zip(results).collect())
}

async fn fetch<K: CacheKey, V: CacheValue>(
    loader: Arc<dyn BatchLoader<K, V>>,
    keys: Vec<K>,
) -> Vec<FirehoseResult<V>> {
    let expected = keys.len();
    let task = async move { loader.load(&keys).await };
    let results = match tokio::runtime::Handle::try_current() {
        Ok(handle) => match handle.spawn(task).await {
            Ok(results) => results,
            Err(err) => {
                log::error!("Batch loader task failed: {}", err);
                let error = FirehoseError::new(
                    &format!("Batch loader task failed: {}", err),
                    ErrorKind::InternalError,
                );
                return fail_all(expected, error);
            }
        },
        Err(_) => task.await,
    };

    if results.len() != expected {
        log::error!(
            "Batch loader returned {} result(s) for {} key(s)",
            results.len(),
            expected
        );
        let error = FirehoseError::new(
            &format!(
                "Batch loader returned {} result(s) for {} key(s)",
                results.len(),
                expected
            ),
            ErrorKind::InternalError,
        );
        return fail_all(expected, error);
    }
    results
}

fn fail_all<V>(count: usize, error: FirehoseError) -> Vec<FirehoseResult<V>> {
    (0..count).map(|_| Err(error.clone())).collect()
}
