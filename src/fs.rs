//! Filesystem capability used by the resolver and the data path deriver.
//!
//! The walk and path logic never touches `std::fs` directly. It only reads
//! marker files and creates directories through these traits, so the same
//! algorithm runs over a blocking adapter ([`StdFs`]) or an async one
//! ([`TokioFs`]), and tests can substitute their own.

use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Blocking filesystem primitives.
pub trait FileSystem {
    /// Read a regular file. Returns `Ok(None)` when nothing (or something
    /// other than a regular file) exists at `path`.
    fn read_file(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;

    /// Create `path` and any missing parents. Succeeds if it already exists
    /// as a directory, including when another caller created it concurrently.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Async twin of [`FileSystem`] with the same contract.
#[async_trait]
pub trait AsyncFileSystem: Send + Sync {
    async fn read_file(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn read_file(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        (**self).read_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        (**self).create_dir_all(path)
    }
}

#[async_trait]
impl<T: AsyncFileSystem + ?Sized> AsyncFileSystem for &T {
    async fn read_file(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        (**self).read_file(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        (**self).create_dir_all(path).await
    }
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl FileSystem for StdFs {
    fn read_file(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        }
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            // removed between the metadata check and the read
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// [`AsyncFileSystem`] backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

#[async_trait]
impl AsyncFileSystem for TokioFs {
    async fn read_file(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        }
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }
}
