use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::Value;

use crate::common::{split_field_path, RESERVED_FIELDS};
use crate::errors::{ErrorKind, FirehoseError, FirehoseResult};
use crate::filter::field;
use crate::loader::{BatchLoader, BatchingCache, LoaderConfig};
use crate::store::{CollectionGroupRef, Query, Snapshot};

use super::{ensure_same_scope, DocumentLookup, FindOptions, QueryOptions, Transform};

/// Cached lookups across every collection with the same id, keyed by a
/// logical id field instead of the physical document id.
///
/// `users/1/posts/a` and `users/2/posts/b` both belong to the `posts` group,
/// and their physical ids need not be unique. Each lookup resolves
/// `id_field == key` with a group query and takes the first match. When two
/// documents share a logical id only the first one the store returns is
/// ever observed; keeping the field unique is up to the caller.
///
/// The id field must hold strings. Results whose field is missing or not a
/// string are still returned by queries but never primed.
pub struct CollectionGroup<T, R> {
    inner: Arc<GroupInner<R>>,
    _fields: PhantomData<fn() -> T>,
}

struct GroupInner<R> {
    group: CollectionGroupRef,
    id_field: String,
    transform: Transform<R>,
    cache: BatchingCache<String, Snapshot>,
}

impl<T, R> CollectionGroup<T, R>
where
    R: Send + 'static,
{
    /// # Errors
    ///
    /// [`ErrorKind::InvalidIdField`] if `id_field` is empty, has an empty
    /// path segment or names a reserved field.
    pub fn new<F>(group: CollectionGroupRef, id_field: &str, transform: F) -> FirehoseResult<Self>
    where
        F: Fn(Snapshot) -> FirehoseResult<R> + Send + Sync + 'static,
    {
        CollectionGroup::with_config(group, id_field, transform, LoaderConfig::default())
    }

    pub fn with_config<F>(
        group: CollectionGroupRef,
        id_field: &str,
        transform: F,
        config: LoaderConfig,
    ) -> FirehoseResult<Self>
    where
        F: Fn(Snapshot) -> FirehoseResult<R> + Send + Sync + 'static,
    {
        validate_id_field(id_field)?;
        let loader = GroupLoader {
            group: group.clone(),
            id_field: id_field.to_string(),
        };
        Ok(CollectionGroup {
            inner: Arc::new(GroupInner {
                group,
                id_field: id_field.to_string(),
                transform: Arc::new(transform),
                cache: BatchingCache::with_config(loader, config),
            }),
            _fields: PhantomData,
        })
    }

    pub fn group(&self) -> &CollectionGroupRef {
        &self.inner.group
    }

    pub fn id_field(&self) -> &str {
        &self.inner.id_field
    }

    pub fn cache(&self) -> &BatchingCache<String, Snapshot> {
        &self.inner.cache
    }

    /// Forgets the cached outcome for the logical id `id`.
    pub fn clear(&self, id: &str) -> bool {
        self.inner.cache.clear(&id.to_string())
    }

    pub fn clear_all(&self) {
        self.inner.cache.clear_all()
    }
}

#[async_trait]
impl<T, R> DocumentLookup<R> for CollectionGroup<T, R>
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
        let base = self.inner.group.query();
        let query = builder(base.clone());
        let owner = format!("collection group {}", self.inner.group.collection_id());
        ensure_same_scope(&base, &query, &owner)?;

        let snapshots = query.get().await?;
        let results = snapshots
            .iter()
            .map(|snapshot| (self.inner.transform)(snapshot.clone()))
            .collect::<FirehoseResult<Vec<R>>>()?;

        // prime only once every result has been transformed
        if options.is_prime() {
            for snapshot in &snapshots {
                self.prime(snapshot);
            }
        }
        Ok(results)
    }
}

impl<T, R> CollectionGroup<T, R> {
    fn prime(&self, snapshot: &Snapshot) {
        match snapshot.get(&self.inner.id_field) {
            Some(Value::String(key)) => {
                self.inner.cache.prime(key.clone(), snapshot.clone());
            }
            _ => log::warn!(
                "Not priming {}, {} is missing or not a string",
                snapshot.locator(),
                self.inner.id_field
            ),
        }
    }
}

impl<T, R> Clone for CollectionGroup<T, R> {
    fn clone(&self) -> Self {
        CollectionGroup {
            inner: self.inner.clone(),
            _fields: PhantomData,
        }
    }
}

impl<T, R> Debug for CollectionGroup<T, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionGroup")
            .field("collection_id", &self.inner.group.collection_id())
            .field("id_field", &self.inner.id_field)
            .field("cache", &self.inner.cache)
            .finish()
    }
}

fn validate_id_field(id_field: &str) -> FirehoseResult<()> {
    if let Err(err) = split_field_path(id_field) {
        log::error!("Invalid id field {:?}: {}", id_field, err);
        return Err(FirehoseError::new_with_cause(
            &format!("Invalid id field {:?}", id_field),
            ErrorKind::InvalidIdField,
            err,
        ));
    }
    if RESERVED_FIELDS.contains(&id_field) {
        log::error!("Id field {} is reserved", id_field);
        return Err(FirehoseError::new(
            &format!("Id field {} is reserved", id_field),
            ErrorKind::InvalidIdField,
        ));
    }
    Ok(())
}

/// Resolves logical ids with one filtered group query per key.
struct GroupLoader {
    group: CollectionGroupRef,
    id_field: String,
}

impl GroupLoader {
    async fn resolve(&self, key: &str) -> FirehoseResult<Snapshot> {
        let matches = self
            .group
            .query()
            .filter(field(&self.id_field).eq(key))
            .limit(1)
            .get()
            .await?;
        match matches.into_iter().next() {
            Some(snapshot) => Ok(snapshot),
            None => {
                log::error!(
                    "No document in group {} with {} == {}",
                    self.group.collection_id(),
                    self.id_field,
                    key
                );
                Err(FirehoseError::new(
                    &format!(
                        "No document in group {} with {} == {}",
                        self.group.collection_id(),
                        self.id_field,
                        key
                    ),
                    ErrorKind::NotFound,
                ))
            }
        }
    }
}

#[async_trait]
impl BatchLoader<String, Snapshot> for GroupLoader {
    async fn load(&self, keys: &[String]) -> Vec<FirehoseResult<Snapshot>> {
        log::debug!(
            "Resolving {} key(s) in group {}",
            keys.len(),
            self.group.collection_id()
        );
        join_all(keys.iter().map(|key| self.resolve(key))).await
    }
}
