// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem adapter over a local (or locally mounted) directory tree

use super::{FileStatus, FileSystem, FileSystemProvider, FsError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

fn io_error<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(std::io::Error) -> FsError + 'a {
    move |source| {
        if source.kind() == ErrorKind::NotFound {
            FsError::NotFound(path.to_path_buf())
        } else {
            FsError::Io {
                op,
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

fn modified_ms(meta: &std::fs::Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Filesystem rooted at a local directory
#[derive(Clone, Debug)]
pub struct LocalFileSystem {
    root: PathBuf,
    closed: Arc<AtomicBool>,
}

impl LocalFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Map a filesystem path onto the local tree, rejecting `..`
    fn resolve(&self, path: &Path) -> Result<PathBuf, FsError> {
        if self.is_closed() {
            return Err(FsError::Closed);
        }
        let mut resolved = self.root.clone();
        for component in path.components() {
            match component {
                Component::RootDir | Component::CurDir => {}
                Component::Normal(part) => resolved.push(part),
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(FsError::InvalidPath(path.to_path_buf()))
                }
            }
        }
        Ok(resolved)
    }

    fn status_of(path: &Path, meta: &std::fs::Metadata) -> FileStatus {
        FileStatus {
            path: path.to_path_buf(),
            len: if meta.is_dir() { 0 } else { meta.len() },
            modified_ms: modified_ms(meta),
            is_dir: meta.is_dir(),
        }
    }

    async fn ensure_parent(target: &Path) -> Result<(), FsError> {
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(io_error("mkdirs", parent))?;
        }
        Ok(())
    }

    /// Temp sibling of `target`, renamed over it once complete
    fn staging_path(target: &Path) -> PathBuf {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        target.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()))
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    fn uri(&self) -> String {
        format!("file://{}", self.root.display())
    }

    async fn exists(&self, path: &Path) -> Result<bool, FsError> {
        let local = self.resolve(path)?;
        tokio::fs::try_exists(&local)
            .await
            .map_err(io_error("exists", path))
    }

    async fn status(&self, path: &Path) -> Result<FileStatus, FsError> {
        let local = self.resolve(path)?;
        let meta = tokio::fs::metadata(&local)
            .await
            .map_err(io_error("status", path))?;
        Ok(Self::status_of(path, &meta))
    }

    async fn list(&self, path: &Path) -> Result<Vec<FileStatus>, FsError> {
        let local = self.resolve(path)?;
        let mut entries = tokio::fs::read_dir(&local)
            .await
            .map_err(io_error("list", path))?;
        let mut statuses = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error("list", path))? {
            let name = entry.file_name();
            if name.to_string_lossy().ends_with(".tmp") {
                continue;
            }
            let meta = entry.metadata().await.map_err(io_error("list", path))?;
            statuses.push(Self::status_of(&path.join(name), &meta));
        }
        statuses.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(statuses)
    }

    async fn mkdirs(&self, path: &Path) -> Result<(), FsError> {
        let local = self.resolve(path)?;
        tokio::fs::create_dir_all(&local)
            .await
            .map_err(io_error("mkdirs", path))
    }

    async fn copy_from_local(&self, local: &Path, path: &Path) -> Result<(), FsError> {
        let target = self.resolve(path)?;
        Self::ensure_parent(&target).await?;
        let staging = Self::staging_path(&target);
        if let Err(e) = tokio::fs::copy(local, &staging).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(io_error("upload", local)(e));
        }
        tokio::fs::rename(&staging, &target)
            .await
            .map_err(io_error("upload", path))
    }

    async fn copy_to_local(&self, path: &Path, local: &Path) -> Result<(), FsError> {
        let source = self.resolve(path)?;
        Self::ensure_parent(local).await?;
        tokio::fs::copy(&source, local)
            .await
            .map(|_| ())
            .map_err(io_error("download", path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        let local = self.resolve(path)?;
        tokio::fs::read(&local).await.map_err(io_error("read", path))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        let target = self.resolve(path)?;
        Self::ensure_parent(&target).await?;
        let staging = Self::staging_path(&target);
        tokio::fs::write(&staging, data)
            .await
            .map_err(io_error("write", path))?;
        tokio::fs::rename(&staging, &target)
            .await
            .map_err(io_error("write", path))
    }

    async fn delete(&self, path: &Path, recursive: bool) -> Result<bool, FsError> {
        let local = self.resolve(path)?;
        let meta = match tokio::fs::symlink_metadata(&local).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(io_error("delete", path)(e)),
        };
        let result = if meta.is_dir() && recursive {
            tokio::fs::remove_dir_all(&local).await
        } else if meta.is_dir() {
            tokio::fs::remove_dir(&local).await
        } else {
            tokio::fs::remove_file(&local).await
        };
        match result {
            Ok(()) => Ok(true),
            Err(e) if meta.is_dir() && !recursive && e.kind() != ErrorKind::NotFound => {
                Err(FsError::NotEmpty(path.to_path_buf()))
            }
            Err(e) => Err(io_error("delete", path)(e)),
        }
    }

    async fn close(&self) -> Result<(), FsError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Opens [`LocalFileSystem`] handles on one root
#[derive(Clone, Debug)]
pub struct LocalFileSystemProvider {
    root: PathBuf,
}

impl LocalFileSystemProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileSystemProvider for LocalFileSystemProvider {
    type Fs = LocalFileSystem;

    fn connect(&self) -> Result<LocalFileSystem, FsError> {
        Ok(LocalFileSystem::new(self.root.clone()))
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
