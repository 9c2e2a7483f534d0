use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::keyvalue::KeyValueStorage;

/// `HashMap`-backed key-value storage behind a `RwLock`.
pub struct MemoryKeyValueStorage<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> MemoryKeyValueStorage<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, V> Default for MemoryKeyValueStorage<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for MemoryKeyValueStorage<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: RwLock::new(iter.into_iter().collect()),
        }
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Internal("lock poisoned".into())
}

#[async_trait]
impl<K, V> KeyValueStorage<K, V> for MemoryKeyValueStorage<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> StoreResult<Option<V>> {
        Ok(self.entries.read().map_err(poisoned)?.get(key).cloned())
    }

    async fn has(&self, key: &K) -> StoreResult<bool> {
        Ok(self.entries.read().map_err(poisoned)?.contains_key(key))
    }

    async fn set(&self, key: K, value: V) -> StoreResult<()> {
        self.entries.write().map_err(poisoned)?.insert(key, value);
        Ok(())
    }

    async fn delete(&self, key: &K) -> StoreResult<bool> {
        Ok(self.entries.write().map_err(poisoned)?.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let storage: MemoryKeyValueStorage<String, String> = MemoryKeyValueStorage::new();
        let key = "https://shapes.example/note".to_string();
        assert!(!storage.has(&key).await.unwrap());

        storage.set(key.clone(), "shape text".into()).await.unwrap();
        assert_eq!(storage.get(&key).await.unwrap().as_deref(), Some("shape text"));
        assert_eq!(storage.len(), 1);

        assert!(storage.delete(&key).await.unwrap());
        assert!(!storage.delete(&key).await.unwrap());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn collects_from_pairs() {
        let storage: MemoryKeyValueStorage<&'static str, u32> =
            [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(storage.get(&"b").await.unwrap(), Some(2));
        assert_eq!(storage.get(&"c").await.unwrap(), None);
    }
}
