//! Key → JSON storage collaborator.
//!
//! The engine is storage-agnostic: permanent ability variables and persisted
//! snapshots go through [`DataStore`], and any backend that can map string
//! keys to JSON documents will do. Two backends ship with the crate:
//!
//! - [`InMemoryDataStore`] for tests and throwaway sessions
//! - [`FileDataStore`] storing one `.json` file per key under a base directory
//!
//! Keys are `/`-separated paths such as `vars/berserk/0` or
//! `snapshot/duel/3`; see [`validate_key`].

mod error;
mod file;
mod memory;

pub use error::{Result, StoreError};
pub use file::FileDataStore;
pub use memory::InMemoryDataStore;

use async_trait::async_trait;
use serde_json::Value;

/// Injected storage backend.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Returns the document stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous document.
    async fn put(&self, key: &str, value: Value) -> Result<()>;

    /// Removes `key`. Returns false if nothing was stored.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Lists stored keys starting with `prefix`, sorted.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Checks that `key` is a relative path of plain segments.
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('\\'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_validation() {
        assert!(validate_key("vars/berserk/0").is_ok());
        assert!(validate_key("snapshot/duel/12").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/abs").is_err());
        assert!(validate_key("a//b").is_err());
        assert!(validate_key("a/../b").is_err());
    }
}
