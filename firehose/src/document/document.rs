use std::any::Any;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::common::Fields;
use crate::errors::{ErrorKind, FirehoseError, FirehoseResult};
use crate::store::{CollectionRef, DocumentRef, Snapshot};

use super::Patch;

/// Anything that names the physical collection new documents go into.
pub trait CollectionLocation {
    fn location(&self) -> &CollectionRef;
}

impl CollectionLocation for CollectionRef {
    fn location(&self) -> &CollectionRef {
        self
    }
}

/// Where a document's persistence lifecycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistState {
    /// Created in memory, never written.
    Pending,
    /// Read from, or written to, the store.
    Persisted,
    /// Deleted through this instance.
    Deleted,
}

/// The two ways a [`Document`] comes into being.
#[derive(Debug, Clone)]
pub enum DocumentSource<T> {
    /// Fresh domain fields bound to a locator, not yet written.
    Unpersisted {
        locator: DocumentRef,
        id: String,
        fields: T,
    },
    /// A stored snapshot.
    Hydrated(Snapshot),
}

type ChildHandle = Arc<dyn Any + Send + Sync>;

/// A typed, mutable projection of one stored record.
///
/// Domain fields live in `T`; the id, the locator and any attached child
/// handles sit beside them and never reach storage. [`Document::data`] is
/// always exactly `T` serialized.
///
/// ```rust,ignore
/// let mut user = Document::create(&users, Some("1"), UserData::new("Taro"))?;
/// user.save().await?;
/// user.edit(Patch::new().set("name", "Jiro"))?.save().await?;
/// user.delete().await?;
/// ```
pub struct Document<T> {
    id: String,
    locator: DocumentRef,
    fields: T,
    state: PersistState,
    dirty: bool,
    children: HashMap<String, ChildHandle>,
}

impl<T> Document<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Builds an unpersisted document. Without `id`, or with an empty one, an
    /// auto id is allocated under `location`. Nothing is written.
    pub fn create<L: CollectionLocation + ?Sized>(
        location: &L,
        id: Option<&str>,
        fields: T,
    ) -> FirehoseResult<Self> {
        let locator = match id.filter(|id| !id.is_empty()) {
            Some(id) => location.location().doc(id)?,
            None => location.location().new_doc(),
        };
        let id = locator.id().to_string();
        Document::from_source(DocumentSource::Unpersisted {
            locator,
            id,
            fields,
        })
    }

    /// Builds a document from a stored snapshot.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::NotFound`] if the snapshot carries no data, and
    /// [`ErrorKind::ObjectMapping`] if the data does not fit `T`.
    pub fn hydrate(snapshot: Snapshot) -> FirehoseResult<Self> {
        Document::from_source(DocumentSource::Hydrated(snapshot))
    }

    pub fn from_source(source: DocumentSource<T>) -> FirehoseResult<Self> {
        match source {
            DocumentSource::Unpersisted {
                locator,
                id,
                fields,
            } => Ok(Document::new(id, locator, fields, PersistState::Pending)),
            DocumentSource::Hydrated(snapshot) => {
                let (locator, data) = snapshot.into_parts();
                let data = match data {
                    Some(data) => data,
                    None => {
                        log::error!("Document {} not found", locator);
                        return Err(FirehoseError::new(
                            &format!("Document {} not found", locator),
                            ErrorKind::NotFound,
                        ));
                    }
                };
                let fields = from_fields(&locator, data)?;
                let id = locator.id().to_string();
                Ok(Document::new(id, locator, fields, PersistState::Persisted))
            }
        }
    }

    /// The serializable projection: `T` as stored, recomputed on every call.
    pub fn data(&self) -> FirehoseResult<Fields> {
        to_fields(&self.locator, &self.fields)
    }

    /// Merges `patch` into the fields. No I/O.
    ///
    /// The patched projection has to deserialize back into `T`; otherwise
    /// this fails with [`ErrorKind::ObjectMapping`] and nothing changes.
    pub fn edit(&mut self, patch: Patch) -> FirehoseResult<&mut Self> {
        let mut data = self.data()?;
        patch.apply(&mut data)?;
        self.fields = from_fields(&self.locator, data)?;
        self.dirty = true;
        Ok(self)
    }

    /// Mutates the typed fields in place. No I/O.
    pub fn edit_with<F: FnOnce(&mut T)>(&mut self, edit: F) -> &mut Self {
        edit(&mut self.fields);
        self.dirty = true;
        self
    }

    /// Overwrites the stored record with [`Document::data`].
    ///
    /// A failed write is returned as [`ErrorKind::StorageWrite`] and is not
    /// retried.
    pub async fn save(&mut self) -> FirehoseResult<&mut Self> {
        let data = self.data()?;
        if self.state == PersistState::Deleted {
            log::warn!("Saving deleted document {} re-creates it", self.locator);
        }

        if let Err(err) = self.locator.set(data).await {
            log::error!("Failed to save document {}: {}", self.locator, err);
            return Err(FirehoseError::new_with_cause(
                &format!("Failed to save document {}", self.locator),
                ErrorKind::StorageWrite,
                err,
            ));
        }
        self.state = PersistState::Persisted;
        self.dirty = false;
        Ok(self)
    }

    /// Removes the stored record. The instance stays usable but stale.
    pub async fn delete(&mut self) -> FirehoseResult<&mut Self> {
        if let Err(err) = self.locator.delete().await {
            log::error!("Failed to delete document {}: {}", self.locator, err);
            return Err(FirehoseError::new_with_cause(
                &format!("Failed to delete document {}", self.locator),
                ErrorKind::StorageWrite,
                err,
            ));
        }
        self.state = PersistState::Deleted;
        Ok(self)
    }

    /// The `(locator, data)` pair for [`crate::store::WriteBatch::set`].
    pub fn batch_input(&self) -> FirehoseResult<(DocumentRef, Fields)> {
        Ok((self.locator.clone(), self.data()?))
    }
}

impl<T> Document<T> {
    fn new(id: String, locator: DocumentRef, fields: T, state: PersistState) -> Self {
        Document {
            id,
            locator,
            fields,
            state,
            dirty: false,
            children: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn locator(&self) -> &DocumentRef {
        &self.locator
    }

    pub fn fields(&self) -> &T {
        &self.fields
    }

    /// Mutable access to the fields; marks the document dirty.
    pub fn fields_mut(&mut self) -> &mut T {
        self.dirty = true;
        &mut self.fields
    }

    pub fn into_fields(self) -> T {
        self.fields
    }

    pub fn state(&self) -> PersistState {
        self.state
    }

    /// `true` after an edit that has not been saved yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Attaches a handle, typically a sub-collection rooted at this
    /// document. Handles are never part of [`Document::data`].
    pub fn attach<H: Any + Send + Sync>(&mut self, name: &str, handle: H) -> &mut Self {
        self.children.insert(name.to_string(), Arc::new(handle));
        self
    }

    /// Returns the handle attached under `name` if it is an `H`.
    pub fn child<H: Any + Send + Sync>(&self, name: &str) -> Option<&H> {
        self.children.get(name)?.downcast_ref::<H>()
    }

    pub fn detach(&mut self, name: &str) -> bool {
        self.children.remove(name).is_some()
    }

    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }
}

impl<T: Clone> Clone for Document<T> {
    fn clone(&self) -> Self {
        Document {
            id: self.id.clone(),
            locator: self.locator.clone(),
            fields: self.fields.clone(),
            state: self.state,
            dirty: self.dirty,
            children: self.children.clone(),
        }
    }
}

impl<T: Debug> Debug for Document<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut children: Vec<&String> = self.children.keys().collect();
        children.sort();
        f.debug_struct("Document")
            .field("path", &self.locator.path())
            .field("state", &self.state)
            .field("dirty", &self.dirty)
            .field("fields", &self.fields)
            .field("children", &children)
            .finish()
    }
}

fn to_fields<T: Serialize>(locator: &DocumentRef, fields: &T) -> FirehoseResult<Fields> {
    match serde_json::to_value(fields) {
        Ok(Value::Object(data)) => Ok(data),
        Ok(other) => {
            log::error!("Fields of {} serialize to {}, not an object", locator, other);
            Err(FirehoseError::new(
                &format!("Fields of {} must serialize to an object", locator),
                ErrorKind::ObjectMapping,
            ))
        }
        Err(err) => {
            log::error!("Failed to serialize fields of {}: {}", locator, err);
            Err(FirehoseError::from(err))
        }
    }
}

fn from_fields<T: DeserializeOwned>(locator: &DocumentRef, data: Fields) -> FirehoseResult<T> {
    serde_json::from_value(Value::Object(data)).map_err(|err| {
        log::error!("Failed to map data of {}: {}", locator, err);
        FirehoseError::new(
            &format!("Failed to map data of {}: {}", locator, err),
            ErrorKind::ObjectMapping,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use crate::store::Database;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Address {
        city: String,
        zip: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct UserData {
        name: String,
        age: u32,
        nickname: Option<String>,
        address: Option<Address>,
    }

    fn taro() -> UserData {
        UserData {
            name: "Taro".to_string(),
            age: 30,
            nickname: Some("T".to_string()),
            address: Some(Address {
                city: "Tokyo".to_string(),
                zip: "100".to_string(),
            }),
        }
    }

    fn setup() -> (InMemoryStore, CollectionRef) {
        let store = InMemoryStore::new();
        let users = Database::new(store.clone()).collection("users").unwrap();
        (store, users)
    }

    #[test]
    fn test_create_does_no_io() {
        let (store, users) = setup();
        let user = Document::create(&users, Some("1"), taro()).unwrap();
        assert_eq!(user.id(), "1");
        assert_eq!(user.locator().path(), "users/1");
        assert_eq!(user.state(), PersistState::Pending);
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_without_id_allocates_one() {
        let (_, users) = setup();
        let user = Document::create(&users, None, taro()).unwrap();
        assert_eq!(user.id().len(), crate::common::AUTO_ID_LENGTH);
        assert_eq!(user.locator().parent(), users);
    }

    #[test]
    fn test_create_with_empty_id_allocates_one() {
        let (_, users) = setup();
        let user = Document::create(&users, Some(""), taro()).unwrap();
        assert_eq!(user.id().len(), crate::common::AUTO_ID_LENGTH);
        assert_eq!(user.state(), PersistState::Pending);

        let err = Document::create(&users, Some("a/b"), taro()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidPath);
    }

    #[test]
    fn test_data_is_fields_only() {
        let (_, users) = setup();
        let mut user = Document::create(&users, Some("1"), taro()).unwrap();
        let posts = user.locator().collection("posts").unwrap();
        user.attach("posts", posts.clone());

        let data = user.data().unwrap();
        assert_eq!(Value::Object(data), serde_json::to_value(taro()).unwrap());
        assert_eq!(user.child::<CollectionRef>("posts"), Some(&posts));
        assert!(user.child::<String>("posts").is_none());
        assert!(user.detach("posts"));
    }

    #[test]
    fn test_edit_merge_rules() {
        let (_, users) = setup();
        let mut user = Document::create(&users, Some("1"), taro()).unwrap();
        user.edit(
            Patch::new()
                .set("name", "Jiro")
                .set("address.city", "Osaka")
                .unchanged("age")
                .delete("nickname"),
        )
        .unwrap();

        assert_eq!(user.fields().name, "Jiro");
        assert_eq!(user.fields().age, 30);
        assert_eq!(user.fields().nickname, None);
        assert_eq!(
            user.fields().address,
            Some(Address {
                city: "Osaka".to_string(),
                zip: "100".to_string()
            })
        );
        assert!(user.is_dirty());
    }

    #[test]
    fn test_edit_top_level_replaces_object() {
        let (_, users) = setup();
        let mut user = Document::create(&users, Some("1"), taro()).unwrap();
        let err = user
            .edit(Patch::new().set("address", json!({ "city": "Nara" })))
            .unwrap_err();
        // zip is required, so the replaced object no longer fits
        assert_eq!(err.kind(), &ErrorKind::ObjectMapping);
        assert_eq!(user.fields(), &taro());
        assert!(!user.is_dirty());
    }

    #[test]
    fn test_edit_is_chainable() {
        let (_, users) = setup();
        let mut user = Document::create(&users, Some("1"), taro()).unwrap();
        user.edit(Patch::new().set("age", 31))
            .unwrap()
            .edit_with(|fields| fields.name.push_str("!"));
        assert_eq!(user.fields().age, 31);
        assert_eq!(user.fields().name, "Taro!");
    }

    #[tokio::test]
    async fn test_save_and_hydrate() {
        let (store, users) = setup();
        let mut user = Document::create(&users, Some("1"), taro()).unwrap();
        user.edit_with(|fields| fields.age = 31);
        user.save().await.unwrap();
        assert_eq!(user.state(), PersistState::Persisted);
        assert!(!user.is_dirty());
        assert_eq!(store.len(), 1);

        let snapshot = users.doc("1").unwrap().get().await.unwrap();
        let loaded: Document<UserData> = Document::hydrate(snapshot).unwrap();
        assert_eq!(loaded.id(), "1");
        assert_eq!(loaded.fields().age, 31);
        assert_eq!(loaded.state(), PersistState::Persisted);
    }

    #[tokio::test]
    async fn test_delete() {
        let (store, users) = setup();
        let mut user = Document::create(&users, Some("1"), taro()).unwrap();
        user.save().await.unwrap().delete().await.unwrap();
        assert_eq!(user.state(), PersistState::Deleted);
        assert!(store.is_empty());

        user.save().await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_hydrate_missing_and_malformed() {
        let (_, users) = setup();
        let missing = users.doc("9").unwrap().get().await.unwrap();
        let err = Document::<UserData>::hydrate(missing).unwrap_err();
        assert!(err.is_not_found());

        let locator = users.doc("2").unwrap();
        locator
            .set(json!({ "name": 42 }).as_object().cloned().unwrap())
            .await
            .unwrap();
        let malformed = locator.get().await.unwrap();
        let err = Document::<UserData>::hydrate(malformed).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMapping);
    }

    #[tokio::test]
    async fn test_save_failure_is_storage_write() {
        let (store, users) = setup();
        let mut user = Document::create(&users, Some("1"), taro()).unwrap();
        store.close();
        let err = user.save().await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::StorageWrite);
        assert_eq!(user.state(), PersistState::Pending);
    }

    #[test]
    fn test_batch_input() {
        let (_, users) = setup();
        let user = Document::create(&users, Some("1"), taro()).unwrap();
        let (locator, data) = user.batch_input().unwrap();
        assert_eq!(locator.path(), "users/1");
        assert_eq!(data.get("name"), Some(&json!("Taro")));
    }
}
