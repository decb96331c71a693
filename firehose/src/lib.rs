//! # Firehose
//!
//! Typed documents and cached lookups on top of a schemaless document
//! store.
//!
//! ## Key Features
//!
//! - **Typed documents**: [`Document<T>`] keeps domain fields in `T` and
//!   persists them with full overwrites
//! - **Explicit merges**: [`Patch`] edits with a [`FieldValue`] sentinel for
//!   "leave unchanged" and "delete"
//! - **Batched lookups**: point lookups issued together are fetched together
//!   through a per-instance [`loader::BatchingCache`]
//! - **Collection groups**: lookups by a logical id field across every
//!   collection sharing an id
//! - **Pluggable storage**: anything implementing [`store::DocumentStore`];
//!   [`store::memory::InMemoryStore`] ships with the crate
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use firehose::collection::{prime, DocumentLookup, FindOptions};
//! use firehose::filter::field;
//! use firehose::store::{memory::InMemoryStore, Database};
//! use firehose::{Collection, Document, Patch};
//!
//! let db = Database::new(InMemoryStore::new());
//! let users: Collection<UserData, Document<UserData>> =
//!     Collection::new(db.collection("users")?, Document::hydrate);
//!
//! let mut taro = users.create(Some("1"), UserData::new("Taro"))?;
//! taro.save().await?;
//!
//! let mut found = users.find_one("1", FindOptions::default()).await?;
//! found.edit(Patch::new().set("name", "Jiro"))?.save().await?;
//!
//! let adults = users
//!     .find_many_by_query(|q| q.filter(field("age").gte(18)), prime())
//!     .await?;
//! ```

pub mod collection;
pub mod common;
pub mod document;
pub mod errors;
pub mod filter;
pub mod loader;
pub mod store;

pub use collection::{Collection, CollectionGroup, DocumentLookup, FindOptions, QueryOptions};
pub use document::{Document, FieldValue, Patch, PersistState};
pub use errors::{ErrorKind, FirehoseError, FirehoseResult};
pub use store::{Database, DocumentRef, Snapshot};
