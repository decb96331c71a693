//! Cached lookups over one collection or a collection group.
//!
//! [`Collection`] resolves ids against a single physical collection.
//! [`CollectionGroup`] spans every collection sharing an id and resolves a
//! *logical* id field with a filtered query. Both share the
//! [`DocumentLookup`] contract and run point lookups through a per-instance
//! [`crate::loader::BatchingCache`], so lookups issued together are fetched
//! together and repeated lookups are served from memory until cleared.

mod collection;
mod collection_group;
mod lookup;
mod options;

pub use collection::*;
pub use collection_group::*;
pub use lookup::*;
pub use options::*;
