use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

use crate::common::{auto_id, Fields, PATH_SEPARATOR};
use crate::errors::{ErrorKind, FirehoseError, FirehoseResult};
use crate::store::{Database, Query, QueryTarget, Snapshot};

/// Validates a single path segment: a collection id or a document id.
pub(crate) fn validate_segment(segment: &str) -> FirehoseResult<()> {
    if segment.is_empty() || segment == "." || segment == ".." {
        log::error!("Invalid path segment {:?}", segment);
        return Err(FirehoseError::new(
            &format!("Invalid path segment {:?}", segment),
            ErrorKind::InvalidPath,
        ));
    }
    if segment.contains(PATH_SEPARATOR) {
        log::error!("Path segment {} cannot contain {}", segment, PATH_SEPARATOR);
        return Err(FirehoseError::new(
            &format!("Path segment {} cannot contain {}", segment, PATH_SEPARATOR),
            ErrorKind::InvalidPath,
        ));
    }
    Ok(())
}

/// Validates a full path and returns its segment count.
pub(crate) fn validate_path(path: &str) -> FirehoseResult<usize> {
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    for segment in &segments {
        validate_segment(segment)?;
    }
    Ok(segments.len())
}

/// Locator of a single document, e.g. `users/1` or `users/1/posts/a`.
///
/// Two refs are equal when their paths are equal.
#[derive(Clone)]
pub struct DocumentRef {
    db: Database,
    path: String,
}

impl DocumentRef {
    pub(crate) fn new(db: Database, path: String) -> Self {
        DocumentRef { db, path }
    }

    /// The last path segment.
    pub fn id(&self) -> &str {
        self.path
            .rsplit(PATH_SEPARATOR)
            .next()
            .unwrap_or(self.path.as_str())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The collection this document belongs to.
    pub fn parent(&self) -> CollectionRef {
        let parent = self
            .path
            .rsplit_once(PATH_SEPARATOR)
            .map(|(parent, _)| parent)
            .unwrap_or_default();
        CollectionRef::new(self.db.clone(), parent.to_string())
    }

    /// A sub-collection rooted at this document.
    pub fn collection(&self, collection_id: &str) -> FirehoseResult<CollectionRef> {
        validate_segment(collection_id)?;
        Ok(CollectionRef::new(
            self.db.clone(),
            format!("{}{}{}", self.path, PATH_SEPARATOR, collection_id),
        ))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn get(&self) -> FirehoseResult<Snapshot> {
        self.db.store().get(self).await
    }

    pub async fn set(&self, data: Fields) -> FirehoseResult<()> {
        self.db.store().set(self, data).await
    }

    pub async fn delete(&self) -> FirehoseResult<()> {
        self.db.store().delete(self).await
    }
}

impl PartialEq for DocumentRef {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for DocumentRef {}

impl Hash for DocumentRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl Debug for DocumentRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "DocumentRef({})", self.path)
    }
}

impl Display for DocumentRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Locator of one physical collection, e.g. `users` or `users/1/posts`.
#[derive(Clone)]
pub struct CollectionRef {
    db: Database,
    path: String,
}

impl CollectionRef {
    pub(crate) fn new(db: Database, path: String) -> Self {
        CollectionRef { db, path }
    }

    /// The last path segment.
    pub fn id(&self) -> &str {
        self.path
            .rsplit(PATH_SEPARATOR)
            .next()
            .unwrap_or(self.path.as_str())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The document owning this collection, `None` for root collections.
    pub fn parent(&self) -> Option<DocumentRef> {
        self.path
            .rsplit_once(PATH_SEPARATOR)
            .map(|(parent, _)| DocumentRef::new(self.db.clone(), parent.to_string()))
    }

    /// Binds `id` to a locator under this collection.
    pub fn doc(&self, id: &str) -> FirehoseResult<DocumentRef> {
        validate_segment(id)?;
        Ok(DocumentRef::new(
            self.db.clone(),
            format!("{}{}{}", self.path, PATH_SEPARATOR, id),
        ))
    }

    /// Allocates a fresh locator with an auto generated id.
    pub fn new_doc(&self) -> DocumentRef {
        DocumentRef::new(
            self.db.clone(),
            format!("{}{}{}", self.path, PATH_SEPARATOR, auto_id()),
        )
    }

    /// A query over this collection only.
    pub fn query(&self) -> Query {
        Query::new(self.db.clone(), QueryTarget::Collection(self.path.clone()))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl PartialEq for CollectionRef {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for CollectionRef {}

impl Debug for CollectionRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CollectionRef({})", self.path)
    }
}

impl Display for CollectionRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Every collection with the same collection id, wherever it is nested.
///
/// `users/1/posts` and `users/2/posts` both belong to the group `posts`.
#[derive(Clone)]
pub struct CollectionGroupRef {
    db: Database,
    collection_id: String,
}

impl CollectionGroupRef {
    pub(crate) fn new(db: Database, collection_id: String) -> Self {
        CollectionGroupRef { db, collection_id }
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    /// A query across every member collection of the group.
    pub fn query(&self) -> Query {
        Query::new(self.db.clone(), QueryTarget::Group(self.collection_id.clone()))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl Debug for CollectionGroupRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CollectionGroupRef({})", self.collection_id)
    }
}
