// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distributed filesystem adapters
//!
//! Paths are absolute within the filesystem (`/ferry/apps/...`) and are
//! resolved by the adapter against its own root.

mod local;

pub use local::{LocalFileSystem, LocalFileSystemProvider};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeFileSystem, FakeFileSystemProvider};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from filesystem operations
#[derive(Debug, Error)]
pub enum FsError {
    #[error("filesystem handle is closed")]
    Closed,
    #[error("path escapes filesystem root: {}", .0.display())]
    InvalidPath(PathBuf),
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("directory not empty: {}", .0.display())]
    NotEmpty(PathBuf),
    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Failed(String),
}

/// Metadata for one filesystem entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    pub path: PathBuf,
    pub len: u64,
    /// Epoch milliseconds
    pub modified_ms: u64,
    pub is_dir: bool,
}

impl FileStatus {
    pub fn name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Handle to the distributed filesystem.
///
/// Clones share the handle; after `close` every operation on any clone
/// fails with [`FsError::Closed`].
#[async_trait]
pub trait FileSystem: Clone + Send + Sync + 'static {
    /// Service address used when requesting delegation tokens
    fn uri(&self) -> String;

    async fn exists(&self, path: &Path) -> Result<bool, FsError>;

    async fn status(&self, path: &Path) -> Result<FileStatus, FsError>;

    /// Entries directly under `path`, sorted by name
    async fn list(&self, path: &Path) -> Result<Vec<FileStatus>, FsError>;

    async fn mkdirs(&self, path: &Path) -> Result<(), FsError>;

    /// Upload a local file, replacing any existing file at `path`
    async fn copy_from_local(&self, local: &Path, path: &Path) -> Result<(), FsError>;

    async fn copy_to_local(&self, path: &Path, local: &Path) -> Result<(), FsError>;

    async fn read(&self, path: &Path) -> Result<Vec<u8>, FsError>;

    async fn write(&self, path: &Path, data: &[u8]) -> Result<(), FsError>;

    /// Delete `path`. Returns false when nothing existed there.
    async fn delete(&self, path: &Path, recursive: bool) -> Result<bool, FsError>;

    async fn close(&self) -> Result<(), FsError>;
}

/// Opens independent filesystem handles.
///
/// Each connection can be closed without affecting the others.
pub trait FileSystemProvider: Clone + Send + Sync + 'static {
    type Fs: FileSystem;

    fn connect(&self) -> Result<Self::Fs, FsError>;
}
