use async_trait::async_trait;

use crate::errors::FirehoseResult;

/// Performs the underlying fetch for a [`super::BatchingCache`].
///
/// `load` receives the distinct keys of one batch and must return exactly
/// one result per key, in the same order. Returning a different number of
/// results fails every key of the batch with
/// [`crate::errors::ErrorKind::InternalError`].
#[async_trait]
pub trait BatchLoader<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send,
{
    async fn load(&self, keys: &[K]) -> Vec<FirehoseResult<V>>;
}
