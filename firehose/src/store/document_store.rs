use async_trait::async_trait;

use crate::common::Fields;
use crate::errors::FirehoseResult;
use crate::store::{DocumentRef, Query, Snapshot};

/// Trait implemented by the underlying document database.
///
/// Implementations report their own failures as
/// [`crate::errors::ErrorKind::StorageRead`] or
/// [`crate::errors::ErrorKind::StorageWrite`]; this crate never retries them.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads one document. A missing document is a snapshot without data,
    /// not an error.
    async fn get(&self, locator: &DocumentRef) -> FirehoseResult<Snapshot>;

    /// Runs a predicate query and returns the matches in the store's
    /// natural order (or the query's explicit ordering).
    async fn query(&self, query: &Query) -> FirehoseResult<Vec<Snapshot>>;

    /// Overwrites the document at `locator` with `data`.
    async fn set(&self, locator: &DocumentRef, data: Fields) -> FirehoseResult<()>;

    /// Removes the document at `locator`. Deleting a missing document succeeds.
    async fn delete(&self, locator: &DocumentRef) -> FirehoseResult<()>;

    /// Applies all `writes` atomically: either every write lands or none does.
    async fn commit(&self, writes: Vec<WriteOp>) -> FirehoseResult<()>;
}

/// One write of an atomic multi-write.
#[derive(Clone, Debug)]
pub enum WriteOp {
    Set { locator: DocumentRef, data: Fields },
    Delete { locator: DocumentRef },
}

impl WriteOp {
    pub fn locator(&self) -> &DocumentRef {
        match self {
            WriteOp::Set { locator, .. } => locator,
            WriteOp::Delete { locator } => locator,
        }
    }
}
