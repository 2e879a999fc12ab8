//! In-memory DataStore implementation for tests and local runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{DataStore, Result, validate_key};

/// Stores documents in a sorted map guarded by an async lock.
#[derive(Debug, Default)]
pub struct InMemoryDataStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl InMemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        validate_key(key)?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<()> {
        validate_key(key)?;
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_get_delete() {
        let store = InMemoryDataStore::new();
        store.put("vars/veteran/0", json!({"wins": 2})).await.unwrap();

        assert_eq!(
            store.get("vars/veteran/0").await.unwrap(),
            Some(json!({"wins": 2}))
        );
        assert_eq!(store.get("vars/veteran/1").await.unwrap(), None);

        assert!(store.delete("vars/veteran/0").await.unwrap());
        assert!(!store.delete("vars/veteran/0").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn keys_filter_by_prefix() {
        let store = InMemoryDataStore::new();
        for key in ["snapshot/a/1", "snapshot/a/2", "snapshot/b/1", "vars/x/0"] {
            store.put(key, Value::Null).await.unwrap();
        }
        assert_eq!(
            store.keys("snapshot/a/").await.unwrap(),
            ["snapshot/a/1", "snapshot/a/2"]
        );
        assert_eq!(store.keys("").await.unwrap().len(), 4);
    }
}
