//! File system operations abstraction for testing
//!
//! The last-upload cache goes through this trait so it can be exercised
//! against `MockFileSystemOperations` as well as a real temporary directory.
//!
//! # Examples
//!
//! ```rust,no_run
//! use employment_verifier::fs::{FileSystemOperations, StandardFileSystem};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fs_ops: Arc<dyn FileSystemOperations> = Arc::new(StandardFileSystem);
//!
//!     fs_ops.create_dir_all(".employment-verifier").await?;
//!     fs_ops.write(".employment-verifier/note.txt", b"hello").await?;
//!
//!     if fs_ops.exists(".employment-verifier/note.txt") {
//!         println!("File was created successfully");
//!     }
//!
//!     Ok(())
//! }
//! ```

use anyhow::Result;
use std::path::Path;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Trait for file system operations that can be mocked in tests
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait::async_trait]
pub trait FileSystemOperations: Send + Sync {
    /// Create a directory and all its parent directories
    async fn create_dir_all(&self, path: &str) -> Result<()>;

    /// Write data to a file, creating the file if it doesn't exist
    async fn write(&self, path: &str, contents: &[u8]) -> Result<()>;

    /// Read a whole file
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Remove a file
    async fn remove_file(&self, path: &str) -> Result<()>;

    /// Check if a path exists
    fn exists(&self, path: &str) -> bool;
}

/// Standard implementation that uses actual file system operations
pub struct StandardFileSystem;

#[async_trait::async_trait]
impl FileSystemOperations for StandardFileSystem {
    async fn create_dir_all(&self, path: &str) -> Result<()> {
        tokio::fs::create_dir_all(path).await.map_err(Into::into)
    }

    async fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        tokio::fs::write(path, contents).await.map_err(Into::into)
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(Into::into)
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        tokio::fs::remove_file(path).await.map_err(Into::into)
    }

    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_standard_file_system_round_trip() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");
        let file = nested.join("data.bin");
        let fs_ops = StandardFileSystem;

        fs_ops.create_dir_all(nested.to_str().unwrap()).await.unwrap();
        fs_ops.write(file.to_str().unwrap(), b"payload").await.unwrap();
        assert!(fs_ops.exists(file.to_str().unwrap()));
        assert_eq!(fs_ops.read(file.to_str().unwrap()).await.unwrap(), b"payload");

        fs_ops.remove_file(file.to_str().unwrap()).await.unwrap();
        assert!(!fs_ops.exists(file.to_str().unwrap()));
    }
}
