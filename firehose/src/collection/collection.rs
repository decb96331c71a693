use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::document::{CollectionLocation, Document};
use crate::errors::{ErrorKind, FirehoseError, FirehoseResult};
use crate::loader::{BatchLoader, BatchingCache, LoaderConfig};
use crate::store::{CollectionRef, DocumentRef, Query, Snapshot};

use super::{ensure_same_scope, DocumentLookup, FindOptions, QueryOptions, Transform};

/// Cached lookups over one physical collection.
///
/// The cache is keyed by document id and lives as long as the collection
/// instance; clones share it. Results go through the transform on every
/// call, so the cache only ever holds raw snapshots.
///
/// # Examples
///
/// ```rust,ignore
/// let users: Collection<UserData, Document<UserData>> =
///     Collection::new(db.collection("users")?, Document::hydrate);
///
/// let (a, b) = tokio::join!(
///     users.find_one("1", FindOptions::default()),
///     users.find_one("2", FindOptions::default()),
/// );
/// let adults = users
///     .find_many_by_query(|q| q.filter(field("age").gte(18)), prime())
///     .await?;
/// ```
pub struct Collection<T, R> {
    inner: Arc<CollectionInner<R>>,
    _fields: PhantomData<fn() -> T>,
}

struct CollectionInner<R> {
    location: CollectionRef,
    transform: Transform<R>,
    cache: BatchingCache<String, Snapshot>,
}

impl<T, R> Collection<T, R>
where
    R: Send + 'static,
{
    pub fn new<F>(location: CollectionRef, transform: F) -> Self
    where
        F: Fn(Snapshot) -> FirehoseResult<R> + Send + Sync + 'static,
    {
        Collection::with_config(location, transform, LoaderConfig::default())
    }

    pub fn with_config<F>(location: CollectionRef, transform: F, config: LoaderConfig) -> Self
    where
        F: Fn(Snapshot) -> FirehoseResult<R> + Send + Sync + 'static,
    {
        let loader = DocumentLoader {
            location: location.clone(),
        };
        Collection {
            inner: Arc::new(CollectionInner {
                location,
                transform: Arc::new(transform),
                cache: BatchingCache::with_config(loader, config),
            }),
            _fields: PhantomData,
        }
    }

    pub fn location(&self) -> &CollectionRef {
        &self.inner.location
    }

    pub fn cache(&self) -> &BatchingCache<String, Snapshot> {
        &self.inner.cache
    }

    /// Forgets the cached outcome for `id`.
    pub fn clear(&self, id: &str) -> bool {
        self.inner.cache.clear(&id.to_string())
    }

    pub fn clear_all(&self) {
        self.inner.cache.clear_all()
    }

    pub fn doc(&self, id: &str) -> FirehoseResult<DocumentRef> {
        self.inner.location.doc(id)
    }

    pub fn new_doc(&self) -> DocumentRef {
        self.inner.location.new_doc()
    }
}

impl<T, R> Collection<T, R>
where
    T: Serialize + DeserializeOwned,
    R: Send + 'static,
{
    /// Builds an unpersisted document in this collection.
    pub fn create(&self, id: Option<&str>, fields: T) -> FirehoseResult<Document<T>> {
        Document::create(self, id, fields)
    }
}

#[async_trait]
impl<T, R> DocumentLookup<R> for Collection<T, R>
where
    R: Send + 'static,
{
    async fn find_one(&self, id: &str, options: FindOptions) -> FirehoseResult<R> {
        let snapshot = if options.is_cache() {
            self.inner.cache.load(id.to_string()).await?
        } else {
            self.inner.cache.load_fresh(id.to_string()).await?
        };
        (self.inner.transform)(snapshot)
    }

    async fn find_many_by_query<F>(
        &self,
        builder: F,
        options: QueryOptions,
    ) -> FirehoseResult<Vec<R>>
    where
        F: FnOnce(Query) -> Query + Send + 'static,
    {
        let base = self.inner.location.query();
        let query = builder(base.clone());
        ensure_same_scope(&base, &query, &self.inner.location)?;

        let snapshots = query.get().await?;
        let results = snapshots
            .iter()
            .map(|snapshot| (self.inner.transform)(snapshot.clone()))
            .collect::<FirehoseResult<Vec<R>>>()?;

        // prime only once every result has been transformed
        if options.is_prime() {
            for snapshot in snapshots {
                self.inner.cache.prime(snapshot.id().to_string(), snapshot);
            }
        }
        Ok(results)
    }
}

impl<T, R> CollectionLocation for Collection<T, R> {
    fn location(&self) -> &CollectionRef {
        &self.inner.location
    }
}

impl<T, R> Clone for Collection<T, R> {
    fn clone(&self) -> Self {
        Collection {
            inner: self.inner.clone(),
            _fields: PhantomData,
        }
    }
}

impl<T, R> Debug for Collection<T, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("location", &self.inner.location.path())
            .field("cache", &self.inner.cache)
            .finish()
    }
}

/// Reads documents of one collection by id.
struct DocumentLoader {
    location: CollectionRef,
}

impl DocumentLoader {
    async fn read(&self, id: &str) -> FirehoseResult<Snapshot> {
        let snapshot = self.location.doc(id)?.get().await?;
        if !snapshot.exists() {
            log::error!("Document {} not found", snapshot.locator());
            return Err(FirehoseError::new(
                &format!("Document {} not found", snapshot.locator()),
                ErrorKind::NotFound,
            ));
        }
        Ok(snapshot)
    }
}

#[async_trait]
impl BatchLoader<String, Snapshot> for DocumentLoader {
    async fn load(&self, ids: &[String]) -> Vec<FirehoseResult<Snapshot>> {
        log::debug!("Reading {} document(s) from {}", ids.len(), self.location);
        join_all(ids.iter().map(|id| self.read(id))).await
    }
}
