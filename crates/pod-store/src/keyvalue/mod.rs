//! Key-value storage used to look up auxiliary documents such as shape
//! definitions.

pub mod memory;
pub mod web;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreResult;

/// Asynchronous key-value storage.
#[async_trait]
pub trait KeyValueStorage<K, V>: Send + Sync
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// The value stored under `key`, if any.
    async fn get(&self, key: &K) -> StoreResult<Option<V>>;

    /// Whether a value is stored under `key`.
    async fn has(&self, key: &K) -> StoreResult<bool>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: K, value: V) -> StoreResult<()>;

    /// Remove `key`. Returns `true` if it was present.
    async fn delete(&self, key: &K) -> StoreResult<bool>;
}

#[async_trait]
impl<K, V, T> KeyValueStorage<K, V> for Arc<T>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
    T: KeyValueStorage<K, V> + ?Sized,
{
    async fn get(&self, key: &K) -> StoreResult<Option<V>> {
        (**self).get(key).await
    }

    async fn has(&self, key: &K) -> StoreResult<bool> {
        (**self).has(key).await
    }

    async fn set(&self, key: K, value: V) -> StoreResult<()> {
        (**self).set(key, value).await
    }

    async fn delete(&self, key: &K) -> StoreResult<bool> {
        (**self).delete(key).await
    }
}
