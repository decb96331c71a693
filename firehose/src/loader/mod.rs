//! Batched, memoized point lookups.
//!
//! A [`BatchingCache`] collects every key requested while a batch window is
//! open, hands the distinct keys to its [`BatchLoader`] in one call, and
//! memoizes each outcome (value or failure) under its key until cleared.
//!
//! ```rust,ignore
//! let cache = BatchingCache::new(UserLoader::new(db));
//! // both lookups end up in one call to UserLoader::load
//! let (a, b) = tokio::join!(cache.load("1".into()), cache.load("2".into()));
//! ```

mod batch_loader;
mod batching_cache;
mod config;

pub use batch_loader::*;
pub use batching_cache::*;
pub use config::*;
