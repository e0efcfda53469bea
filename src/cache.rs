//! Last-upload cache
//!
//! A single slot holding the most recent successful extraction. It seeds the
//! workflow on start and is cleared when an upload fails.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::extraction::ExtractionResult;
use crate::fs::FileSystemOperations;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O failed for {path}: {message}")]
    Io { path: String, message: String },
    #[error("Cached result at {path} is unreadable: {message}")]
    Corrupt { path: String, message: String },
}

pub struct ResultCache {
    fs: Arc<dyn FileSystemOperations>,
    path: PathBuf,
}

impl ResultCache {
    pub fn new(fs: Arc<dyn FileSystemOperations>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    fn io_error(&self, error: anyhow::Error) -> CacheError {
        CacheError::Io {
            path: self.path_str(),
            message: error.to_string(),
        }
    }

    pub async fn save(&self, result: &ExtractionResult) -> Result<(), CacheError> {
        let contents = serde_json::to_vec_pretty(result).map_err(|e| CacheError::Corrupt {
            path: self.path_str(),
            message: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs
                .create_dir_all(&parent.to_string_lossy())
                .await
                .map_err(|e| self.io_error(e))?;
        }
        self.fs
            .write(&self.path_str(), &contents)
            .await
            .map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), "Cached extraction result");
        Ok(())
    }

    /// The cached result, `None` when the slot is empty
    pub async fn load(&self) -> Result<Option<ExtractionResult>, CacheError> {
        let path = self.path_str();
        if !self.fs.exists(&path) {
            return Ok(None);
        }

        let contents = self.fs.read(&path).await.map_err(|e| self.io_error(e))?;
        let result = serde_json::from_slice(&contents).map_err(|e| CacheError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;
        info!(path = %path, "Restored cached extraction result");
        Ok(Some(result))
    }

    pub async fn clear(&self) -> Result<(), CacheError> {
        let path = self.path_str();
        if !self.fs.exists(&path) {
            return Ok(());
        }
        self.fs.remove_file(&path).await.map_err(|e| self.io_error(e))?;
        debug!(path = %path, "Cleared cached extraction result");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystemOperations;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_load_from_empty_slot_reads_nothing() {
        let mut fs = MockFileSystemOperations::new();
        fs.expect_exists().with(eq("cache/last.json")).return_const(false);
        fs.expect_read().never();

        let cache = ResultCache::new(Arc::new(fs), "cache/last.json");
        assert!(cache.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_creates_parent_directory() {
        let mut fs = MockFileSystemOperations::new();
        fs.expect_create_dir_all()
            .with(eq("cache"))
            .times(1)
            .returning(|_| Ok(()));
        fs.expect_write()
            .withf(|path, contents| path == "cache/last.json" && !contents.is_empty())
            .times(1)
            .returning(|_, _| Ok(()));

        let cache = ResultCache::new(Arc::new(fs), "cache/last.json");
        cache.save(&ExtractionResult::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_slot_is_reported() {
        let mut fs = MockFileSystemOperations::new();
        fs.expect_exists().return_const(true);
        fs.expect_read().returning(|_| Ok(b"{not json".to_vec()));

        let cache = ResultCache::new(Arc::new(fs), "last.json");
        assert!(matches!(cache.load().await, Err(CacheError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_write_failure_is_io_error() {
        let mut fs = MockFileSystemOperations::new();
        fs.expect_write()
            .returning(|_, _| Err(anyhow::anyhow!("disk full")));

        let cache = ResultCache::new(Arc::new(fs), "last.json");
        let err = cache.save(&ExtractionResult::default()).await.unwrap_err();
        assert!(err.to_string().contains("disk full"));
    }
}
