//! File-based DataStore implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;

use super::{DataStore, Result, validate_key};

const EXTENSION: &str = "json";

/// Stores each key as a pretty-printed JSON file under a base directory.
///
/// Key segments map to directories: `snapshot/duel/3` lives at
/// `<base>/snapshot/duel/3.json`. Writes go to a temporary file first and are
/// renamed into place, so a crash never leaves a half-written document.
#[derive(Debug, Clone)]
pub struct FileDataStore {
    base_dir: PathBuf,
}

impl FileDataStore {
    /// Opens (and creates if needed) a store rooted at `base_dir`.
    pub async fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).await?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let (dirs, file) = key.rsplit_once('/').unwrap_or(("", key));
        let mut path = self.base_dir.clone();
        path.extend(dirs.split('/').filter(|segment| !segment.is_empty()));
        path.push(format!("{file}.{EXTENSION}"));
        path
    }

    async fn collect_keys(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        let mut pending = vec![(self.base_dir.clone(), String::new())];
        while let Some((dir, prefix)) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                    continue;
                };
                if entry.file_type().await?.is_dir() {
                    pending.push((path.clone(), format!("{prefix}{name}/")));
                } else if let Some(stem) = name.strip_suffix(".json") {
                    out.push(format!("{prefix}{stem}"));
                }
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl DataStore for FileDataStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        validate_key(key)?;
        let path = self.path_for(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let value = serde_json::from_slice(&bytes)?;
        tracing::debug!(target: "arena::store", key, path = %path.display(), "loaded document");
        Ok(Some(value))
    }

    async fn put(&self, key: &str, value: Value) -> Result<()> {
        validate_key(key)?;
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let temp_path = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(&value)?;

        fs::write(&temp_path, bytes).await?;
        fs::rename(&temp_path, &path).await?;

        tracing::debug!(target: "arena::store", key, path = %path.display(), "stored document");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = self.collect_keys().await?;
        keys.retain(|key| key.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }
}
