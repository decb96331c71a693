use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use firehose::collection::{Collection, CollectionGroup};
use firehose::common::Fields;
use firehose::document::Document;
use firehose::errors::FirehoseResult;
use firehose::store::memory::InMemoryStore;
use firehose::store::{Database, DocumentRef, DocumentStore, Query, Snapshot, WriteOp};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub name: String,
}

impl UserData {
    pub fn new(name: &str) -> Self {
        UserData {
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostData {
    #[serde(rename = "__id")]
    pub id: String,
    pub content: String,
}

impl PostData {
    pub fn new(id: &str, content: &str) -> Self {
        PostData {
            id: id.to_string(),
            content: content.to_string(),
        }
    }
}

pub type UserDoc = Document<UserData>;
pub type PostDoc = Document<PostData>;
pub type UsersCollection = Collection<UserData, UserDoc>;
pub type PostsCollection = Collection<PostData, PostDoc>;
pub type PostsCollectionGroup = CollectionGroup<PostData, PostDoc>;

pub const POSTS: &str = "posts";

/// A [`DocumentStore`] that counts reads before handing them to an
/// [`InMemoryStore`].
#[derive(Clone, Default)]
pub struct CountingStore {
    backing: InMemoryStore,
    gets: Arc<Mutex<HashMap<String, usize>>>,
    queries: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new() -> Self {
        CountingStore::default()
    }

    pub fn backing(&self) -> &InMemoryStore {
        &self.backing
    }

    /// Number of point reads of `path`.
    pub fn gets(&self, path: &str) -> usize {
        self.gets.lock().get(path).copied().unwrap_or(0)
    }

    pub fn total_gets(&self) -> usize {
        self.gets.lock().values().sum()
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn reset_counts(&self) {
        self.gets.lock().clear();
        self.queries.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn get(&self, locator: &DocumentRef) -> FirehoseResult<Snapshot> {
        *self.gets.lock().entry(locator.path().to_string()).or_insert(0) += 1;
        self.backing.get(locator).await
    }

    async fn query(&self, query: &Query) -> FirehoseResult<Vec<Snapshot>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.backing.query(query).await
    }

    async fn set(&self, locator: &DocumentRef, data: Fields) -> FirehoseResult<()> {
        self.backing.set(locator, data).await
    }

    async fn delete(&self, locator: &DocumentRef) -> FirehoseResult<()> {
        self.backing.delete(locator).await
    }

    async fn commit(&self, writes: Vec<WriteOp>) -> FirehoseResult<()> {
        self.backing.commit(writes).await
    }
}

#[derive(Clone)]
pub struct TestContext {
    store: CountingStore,
    db: Database,
}

impl TestContext {
    pub fn store(&self) -> &CountingStore {
        &self.store
    }

    pub fn db(&self) -> Database {
        self.db.clone()
    }

    pub fn users(&self) -> FirehoseResult<UsersCollection> {
        Ok(Collection::new(self.db.collection("users")?, user_transform))
    }

    pub fn posts_group(&self) -> FirehoseResult<PostsCollectionGroup> {
        CollectionGroup::new(self.db.collection_group(POSTS)?, "__id", Document::hydrate)
    }

    /// Raw stored data at `path`, bypassing every cache.
    pub async fn stored(&self, path: &str) -> FirehoseResult<Option<Value>> {
        let snapshot = self.db.doc(path)?.get().await?;
        Ok(snapshot.data().cloned().map(Value::Object))
    }

    /// Writes `value` straight to the store.
    pub async fn put(&self, path: &str, value: Value) -> FirehoseResult<()> {
        let data = match value {
            Value::Object(data) => data,
            _ => Fields::new(),
        };
        self.db.doc(path)?.set(data).await
    }
}

pub fn create_test_context() -> TestContext {
    let store = CountingStore::new();
    let db = Database::new(store.clone());
    TestContext { store, db }
}

pub fn cleanup(ctx: TestContext) {
    ctx.store.backing().clear();
    ctx.store.reset_counts();
}

/// Hydrates a user and attaches its `posts` sub-collection.
pub fn user_transform(snapshot: Snapshot) -> FirehoseResult<UserDoc> {
    let mut user = Document::hydrate(snapshot)?;
    attach_posts(&mut user)?;
    Ok(user)
}

pub fn create_user(
    users: &UsersCollection,
    id: Option<&str>,
    data: UserData,
) -> FirehoseResult<UserDoc> {
    let mut user = users.create(id, data)?;
    attach_posts(&mut user)?;
    Ok(user)
}

fn attach_posts(user: &mut UserDoc) -> FirehoseResult<()> {
    let location = user.locator().collection(POSTS)?;
    let posts: PostsCollection = Collection::new(location, Document::hydrate);
    user.attach(POSTS, posts);
    Ok(())
}

pub fn posts_of(user: &UserDoc) -> Option<&PostsCollection> {
    user.child::<PostsCollection>(POSTS)
}

/// Seeds `users/1..3` the same way for every collection test.
pub async fn seed_users(ctx: &TestContext) -> FirehoseResult<()> {
    for (id, name) in [("1", "Ant Man"), ("2", "Bird Man"), ("3", "Cat Man")] {
        ctx.put(&format!("users/{}", id), serde_json::json!({ "name": name }))
            .await?;
    }
    ctx.store().reset_counts();
    Ok(())
}

/// Seeds posts under two users with logical ids `p1`..`p3`.
pub async fn seed_posts(ctx: &TestContext) -> FirehoseResult<()> {
    let seed = [
        ("users/1/posts/a", "p1", "first"),
        ("users/1/posts/b", "p2", "second"),
        ("users/2/posts/a", "p3", "third"),
    ];
    for (path, id, content) in seed {
        ctx.put(path, serde_json::json!({ "__id": id, "content": content }))
            .await?;
    }
    ctx.store().reset_counts();
    Ok(())
}
