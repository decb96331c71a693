//! An in-process [`DocumentStore`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::common::{atomic, Atomic, Fields, LockExt};
use crate::errors::{ErrorKind, FirehoseError, FirehoseResult};
use crate::store::{DocumentRef, DocumentStore, Query, Snapshot, WriteOp};

/// Document store keeping every document in a sorted in-memory map.
///
/// Documents are keyed by full path, so the natural order of query results
/// is path order. Clones share the same data.
///
/// A closed store fails every read with [`ErrorKind::StorageRead`] and every
/// write with [`ErrorKind::StorageWrite`], which makes it handy for
/// exercising error paths.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }

    /// Removes every document.
    pub fn clear(&self) {
        self.inner.documents.write_with(|documents| documents.clear());
    }

    /// Number of stored documents across all collections.
    pub fn len(&self) -> usize {
        self.inner.documents.read_with(|documents| documents.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Relaxed);
    }

    pub fn reopen(&self) {
        self.inner.closed.store(false, Ordering::Relaxed);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }
}

struct InMemoryStoreInner {
    documents: Atomic<BTreeMap<String, Fields>>,
    closed: AtomicBool,
}

impl Default for InMemoryStoreInner {
    fn default() -> Self {
        InMemoryStoreInner {
            documents: atomic(BTreeMap::new()),
            closed: AtomicBool::new(false),
        }
    }
}

impl InMemoryStoreInner {
    fn check_opened(&self, kind: ErrorKind) -> FirehoseResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("Store is closed");
            return Err(FirehoseError::new("Store is closed", kind));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get(&self, locator: &DocumentRef) -> FirehoseResult<Snapshot> {
        self.inner.check_opened(ErrorKind::StorageRead)?;
        let data = self
            .inner
            .documents
            .read_with(|documents| documents.get(locator.path()).cloned());
        Ok(Snapshot::new(locator.clone(), data))
    }

    async fn query(&self, query: &Query) -> FirehoseResult<Vec<Snapshot>> {
        self.inner.check_opened(ErrorKind::StorageRead)?;
        let candidates: Vec<Snapshot> = self.inner.documents.read_with(|documents| {
            documents
                .iter()
                .filter(|(path, _)| query.target().contains(path))
                .map(|(path, data)| {
                    let locator = DocumentRef::new(query.database().clone(), path.clone());
                    Snapshot::found(locator, data.clone())
                })
                .collect()
        });
        query.evaluate(candidates)
    }

    async fn set(&self, locator: &DocumentRef, data: Fields) -> FirehoseResult<()> {
        self.inner.check_opened(ErrorKind::StorageWrite)?;
        self.inner.documents.write_with(|documents| {
            documents.insert(locator.path().to_string(), data);
        });
        Ok(())
    }

    async fn delete(&self, locator: &DocumentRef) -> FirehoseResult<()> {
        self.inner.check_opened(ErrorKind::StorageWrite)?;
        self.inner.documents.write_with(|documents| {
            documents.remove(locator.path());
        });
        Ok(())
    }

    async fn commit(&self, writes: Vec<WriteOp>) -> FirehoseResult<()> {
        self.inner.check_opened(ErrorKind::StorageWrite)?;
        // single write lock, so readers see all of the batch or none of it
        self.inner.documents.write_with(|documents| {
            for write in writes {
                match write {
                    WriteOp::Set { locator, data } => {
                        documents.insert(locator.path().to_string(), data);
                    }
                    WriteOp::Delete { locator } => {
                        documents.remove(locator.path());
                    }
                }
            }
        });
        Ok(())
    }
}
