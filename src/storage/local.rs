//! Local filesystem storage implementation.
//!
//! Writes go to a sibling `.tmp` file that is renamed over the store, so an
//! interrupted run never leaves a half-written array behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Listing;
use crate::storage::ListingStore;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore backed by the given JSON file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl ListingStore for LocalStore {
    async fn load_checked(&self) -> Result<Vec<Listing>> {
        match self.read_bytes().await? {
            Some(bytes) => {
                serde_json::from_slice(&bytes).map_err(|source| AppError::CorruptStore {
                    path: self.path.clone(),
                    source,
                })
            }
            None => {
                log::debug!("No store found at {}", self.path.display());
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, listings: &[Listing]) -> Result<()> {
        let bytes = serde_json::to_vec(listings)?;
        self.write_bytes(&bytes).await
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Vec<Listing> {
        vec![
            Listing::new("Apartment Biltstraat", "https://www.pararius.com/a/1"),
            Listing::new("Room Nobelstraat", "https://www.pararius.com/a/2"),
        ]
    }

    #[tokio::test]
    async fn test_missing_store_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path().join("previous_results.json"));

        assert!(store.load_checked().await.unwrap().is_empty());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path().join("previous_results.json"));

        store.save(&sample()).await.unwrap();
        let loaded = store.load_checked().await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].content, "Apartment Biltstraat");
        assert_eq!(loaded[1].href, "https://www.pararius.com/a/2");
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_save_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path().join("state/nested/seen.json"));

        store.save(&sample()).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path().join("previous_results.json"));

        store.save(&sample()).await.unwrap();
        store.save(&sample()[..1]).await.unwrap();
        assert_eq!(store.load_checked().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reads_plain_json_array() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("previous_results.json");
        std::fs::write(
            &path,
            r#"[{"content": "Studio", "href": "https://www.pararius.com/s/1"}]"#,
        )
        .unwrap();

        let loaded = LocalStore::new(path).load_checked().await.unwrap();
        assert_eq!(loaded, vec![Listing::new("Studio", "https://www.pararius.com/s/1")]);
    }

    #[tokio::test]
    async fn test_corrupt_store() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("previous_results.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = LocalStore::new(&path);

        match store.load_checked().await {
            Err(AppError::CorruptStore { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected corrupt store, got {other:?}"),
        }
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_store_is_io_error() {
        let tmp = TempDir::new().unwrap();
        // A directory cannot be read as a file
        let store = LocalStore::new(tmp.path());

        assert!(matches!(store.load_checked().await, Err(AppError::Io(_))));
        assert!(store.load().await.is_empty());
    }
}
