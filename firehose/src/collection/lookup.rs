use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{ErrorKind, FirehoseError, FirehoseResult};
use crate::store::{Query, Snapshot};

use super::{FindOptions, QueryOptions};

/// Converts a raw snapshot into the caller's result type.
///
/// Usually [`crate::document::Document::hydrate`], possibly followed by
/// attaching child collections. Tests often drop fields they do not need.
pub type Transform<R> = Arc<dyn Fn(Snapshot) -> FirehoseResult<R> + Send + Sync>;

/// The lookup contract shared by [`super::Collection`] and
/// [`super::CollectionGroup`].
#[async_trait]
pub trait DocumentLookup<R: Send + 'static>: Send + Sync {
    /// Looks up one document by key.
    ///
    /// With [`FindOptions::is_cache`] the memoized outcome is used when
    /// present; otherwise the key is re-read. A missing document fails with
    /// [`crate::errors::ErrorKind::NotFound`].
    async fn find_one(&self, id: &str, options: FindOptions) -> FirehoseResult<R>;

    /// Like [`DocumentLookup::find_one`], but any failure is `None`.
    async fn find_one_by_id(&self, id: &str, options: FindOptions) -> Option<R> {
        match self.find_one(id, options).await {
            Ok(result) => Some(result),
            Err(err) => {
                log::debug!("Lookup of {} came back empty: {}", id, err);
                None
            }
        }
    }

    /// Runs the query produced by `builder` and transforms every result, in
    /// the store's order. With [`QueryOptions::is_prime`] each result is
    /// also primed into the lookup cache.
    async fn find_many_by_query<F>(
        &self,
        builder: F,
        options: QueryOptions,
    ) -> FirehoseResult<Vec<R>>
    where
        F: FnOnce(Query) -> Query + Send + 'static;
}

/// Fails unless `query` still runs over the same target and store as `base`.
///
/// Results of a foreign query would otherwise be primed under keys of the
/// wrong collection.
pub(crate) fn ensure_same_scope(
    base: &Query,
    query: &Query,
    owner: &dyn Display,
) -> FirehoseResult<()> {
    if query.target() != base.target() {
        log::error!("Query over {:?} cannot run on {}", query.target(), owner);
        return Err(FirehoseError::new(
            &format!("Query over {:?} cannot run on {}", query.target(), owner),
            ErrorKind::InvalidOperation,
        ));
    }
    if !query.database().same_store(base.database()) {
        log::error!("Query for {} is bound to another database", owner);
        return Err(FirehoseError::new(
            &format!("Query for {} is bound to another database", owner),
            ErrorKind::InvalidOperation,
        ));
    }
    Ok(())
}
