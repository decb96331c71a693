use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::common::Fields;
use crate::errors::{ErrorKind, FirehoseError, FirehoseResult};
use crate::store::path::{validate_path, validate_segment};
use crate::store::{CollectionGroupRef, CollectionRef, DocumentRef, DocumentStore, WriteOp};

/// Entry point handing out locators bound to one [`DocumentStore`].
///
/// `Database` is a cheap handle: clones share the same store.
///
/// # Examples
///
/// ```rust,ignore
/// use firehose::store::{Database, memory::InMemoryStore};
///
/// let db = Database::new(InMemoryStore::new());
/// let users = db.collection("users")?;
/// let posts = db.collection_group("posts")?;
/// let taro = users.doc("1")?;
/// ```
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn DocumentStore>,
}

impl Database {
    pub fn new<S: DocumentStore + 'static>(store: S) -> Self {
        Database {
            store: Arc::new(store),
        }
    }

    pub fn from_store(store: Arc<dyn DocumentStore>) -> Self {
        Database { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Returns `true` if both handles talk to the same store instance.
    pub fn same_store(&self, other: &Database) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    /// Returns the collection at `path`, e.g. `users` or `users/1/posts`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidPath`] if a segment is empty or the path
    /// names a document (even segment count).
    pub fn collection(&self, path: &str) -> FirehoseResult<CollectionRef> {
        let segments = validate_path(path)?;
        if segments % 2 == 0 {
            log::error!("{} is a document path, not a collection path", path);
            return Err(FirehoseError::new(
                &format!("{} is a document path, not a collection path", path),
                ErrorKind::InvalidPath,
            ));
        }
        Ok(CollectionRef::new(self.clone(), path.to_string()))
    }

    /// Returns the group of every collection whose id is `collection_id`.
    pub fn collection_group(&self, collection_id: &str) -> FirehoseResult<CollectionGroupRef> {
        validate_segment(collection_id)?;
        Ok(CollectionGroupRef::new(self.clone(), collection_id.to_string()))
    }

    /// Returns the document at `path`, e.g. `users/1`.
    pub fn doc(&self, path: &str) -> FirehoseResult<DocumentRef> {
        let segments = validate_path(path)?;
        if segments % 2 != 0 {
            log::error!("{} is a collection path, not a document path", path);
            return Err(FirehoseError::new(
                &format!("{} is a collection path, not a document path", path),
                ErrorKind::InvalidPath,
            ));
        }
        Ok(DocumentRef::new(self.clone(), path.to_string()))
    }

    /// Starts an empty atomic multi-write.
    pub fn batch(&self) -> WriteBatch {
        WriteBatch {
            db: self.clone(),
            writes: Vec::new(),
        }
    }
}

impl Debug for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Database")
    }
}

/// Atomic multi-document write assembled by the caller.
///
/// Documents contribute through [`crate::document::Document::batch_input`]:
///
/// ```rust,ignore
/// let mut batch = db.batch();
/// batch.set(user1.batch_input()?).set(user2.batch_input()?);
/// batch.commit().await?;
/// ```
pub struct WriteBatch {
    db: Database,
    writes: Vec<WriteOp>,
}

impl WriteBatch {
    /// Queues a full overwrite of `locator` with `data`.
    pub fn set(&mut self, input: (DocumentRef, Fields)) -> &mut Self {
        let (locator, data) = input;
        self.writes.push(WriteOp::Set { locator, data });
        self
    }

    /// Queues a delete of `locator`.
    pub fn delete(&mut self, locator: DocumentRef) -> &mut Self {
        self.writes.push(WriteOp::Delete { locator });
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Applies every queued write atomically. An empty batch is a no-op.
    pub async fn commit(self) -> FirehoseResult<()> {
        if self.writes.is_empty() {
            return Ok(());
        }
        log::debug!("Committing batch of {} write(s)", self.writes.len());
        self.db.store().commit(self.writes).await
    }
}
