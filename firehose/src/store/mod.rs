//! The storage boundary.
//!
//! Everything this crate needs from the underlying document database goes
//! through the [`DocumentStore`] trait: keyed reads, predicate queries, full
//! overwrites, deletes and atomic multi-writes. [`Database`] hands out the
//! locator types ([`CollectionRef`], [`DocumentRef`], [`CollectionGroupRef`])
//! that address documents by slash separated paths such as `users/1/posts/a`.
//!
//! [`memory::InMemoryStore`] is a complete in-process implementation used by
//! the tests and usable as a local stand-in for a real database.

mod database;
mod document_store;
pub mod memory;
mod path;
mod query;
mod snapshot;

pub use database::*;
pub use document_store::*;
pub use path::*;
pub use query::*;
pub use snapshot::*;
