// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory filesystem for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{FileStatus, FileSystem, FileSystemProvider, FsError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Node {
    Dir { modified_ms: u64 },
    File { data: Vec<u8>, modified_ms: u64 },
}

impl Node {
    fn modified_ms(&self) -> u64 {
        match self {
            Node::Dir { modified_ms } | Node::File { modified_ms, .. } => *modified_ms,
        }
    }
}

struct FakeFsState {
    nodes: BTreeMap<PathBuf, Node>,
    tick: u64,
    fail_delete: HashSet<PathBuf>,
    upload_failures: usize,
    uploads: Vec<PathBuf>,
    deletes: Vec<PathBuf>,
    connects: usize,
}

impl FakeFsState {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn mkdirs(&mut self, path: &Path) {
        for ancestor in path.ancestors().collect::<Vec<_>>().into_iter().rev() {
            if !self.nodes.contains_key(ancestor) {
                let modified_ms = self.next_tick();
                self.nodes
                    .insert(ancestor.to_path_buf(), Node::Dir { modified_ms });
            }
        }
    }

    fn put_file(&mut self, path: &Path, data: Vec<u8>) {
        if let Some(parent) = path.parent() {
            self.mkdirs(parent);
        }
        let modified_ms = self.next_tick();
        self.nodes
            .insert(path.to_path_buf(), Node::File { data, modified_ms });
    }

    fn status(&self, path: &Path) -> Option<FileStatus> {
        self.nodes.get(path).map(|node| FileStatus {
            path: path.to_path_buf(),
            len: match node {
                Node::File { data, .. } => data.len() as u64,
                Node::Dir { .. } => 0,
            },
            modified_ms: node.modified_ms(),
            is_dir: matches!(node, Node::Dir { .. }),
        })
    }
}

/// Normalize to an absolute path with only normal components
fn normalize(path: &Path) -> Result<PathBuf, FsError> {
    let mut out = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::RootDir | Component::CurDir => {}
            Component::Normal(part) => out.push(part),
            _ => return Err(FsError::InvalidPath(path.to_path_buf())),
        }
    }
    Ok(out)
}

/// In-memory filesystem for testing.
///
/// Clones share the tree and the open/closed state; handles from
/// [`FakeFileSystemProvider::connect`] share the tree but can be closed
/// independently.
#[derive(Clone)]
pub struct FakeFileSystem {
    inner: Arc<Mutex<FakeFsState>>,
    closed: Arc<AtomicBool>,
}

impl Default for FakeFileSystem {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeFsState {
                nodes: BTreeMap::new(),
                tick: 0,
                fail_delete: HashSet::new(),
                upload_failures: 0,
                uploads: Vec::new(),
                deletes: Vec::new(),
                connects: 0,
            })),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl FakeFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory with an explicit modification time
    pub fn add_dir(&self, path: &str, modified_ms: u64) {
        let path = PathBuf::from(path);
        let mut state = self.inner.lock();
        if let Some(parent) = path.parent() {
            state.mkdirs(parent);
        }
        state.nodes.insert(path, Node::Dir { modified_ms });
    }

    pub fn add_file(&self, path: &str, data: &[u8]) {
        self.inner.lock().put_file(Path::new(path), data.to_vec());
    }

    /// Make every delete of `path` fail
    pub fn fail_delete_of(&self, path: &str) {
        self.inner.lock().fail_delete.insert(PathBuf::from(path));
    }

    /// Fail the next `count` uploads
    pub fn fail_next_uploads(&self, count: usize) {
        self.inner.lock().upload_failures = count;
    }

    pub fn contains(&self, path: &str) -> bool {
        self.inner.lock().nodes.contains_key(Path::new(path))
    }

    pub fn file_contents(&self, path: &str) -> Option<Vec<u8>> {
        match self.inner.lock().nodes.get(Path::new(path)) {
            Some(Node::File { data, .. }) => Some(data.clone()),
            _ => None,
        }
    }

    /// Every file path in the tree
    pub fn files(&self) -> Vec<PathBuf> {
        self.inner
            .lock()
            .nodes
            .iter()
            .filter(|(_, node)| matches!(node, Node::File { .. }))
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Upload attempts in order, including failed ones
    pub fn uploads(&self) -> Vec<PathBuf> {
        self.inner.lock().uploads.clone()
    }

    /// Delete attempts in order, including failed ones
    pub fn deletes(&self) -> Vec<PathBuf> {
        self.inner.lock().deletes.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn open(&self, path: &Path) -> Result<PathBuf, FsError> {
        if self.is_closed() {
            return Err(FsError::Closed);
        }
        normalize(path)
    }
}

#[async_trait]
impl FileSystem for FakeFileSystem {
    fn uri(&self) -> String {
        "fake://namenode:8020".to_string()
    }

    async fn exists(&self, path: &Path) -> Result<bool, FsError> {
        let path = self.open(path)?;
        Ok(self.inner.lock().nodes.contains_key(&path))
    }

    async fn status(&self, path: &Path) -> Result<FileStatus, FsError> {
        let path = self.open(path)?;
        self.inner
            .lock()
            .status(&path)
            .ok_or(FsError::NotFound(path))
    }

    async fn list(&self, path: &Path) -> Result<Vec<FileStatus>, FsError> {
        let path = self.open(path)?;
        let state = self.inner.lock();
        match state.nodes.get(&path) {
            None => Err(FsError::NotFound(path)),
            Some(Node::File { .. }) => Ok(state.status(&path).into_iter().collect()),
            Some(Node::Dir { .. }) => Ok(state
                .nodes
                .keys()
                .filter(|p| p.parent() == Some(path.as_path()))
                .filter_map(|p| state.status(p))
                .collect()),
        }
    }

    async fn mkdirs(&self, path: &Path) -> Result<(), FsError> {
        let path = self.open(path)?;
        self.inner.lock().mkdirs(&path);
        Ok(())
    }

    async fn copy_from_local(&self, local: &Path, path: &Path) -> Result<(), FsError> {
        let path = self.open(path)?;
        {
            let mut state = self.inner.lock();
            state.uploads.push(path.clone());
            if state.upload_failures > 0 {
                state.upload_failures -= 1;
                return Err(FsError::Failed(format!(
                    "injected upload failure for {}",
                    path.display()
                )));
            }
        }
        let data = tokio::fs::read(local).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FsError::NotFound(local.to_path_buf())
            } else {
                FsError::Io {
                    op: "upload",
                    path: local.to_path_buf(),
                    source,
                }
            }
        })?;
        self.inner.lock().put_file(&path, data);
        Ok(())
    }

    async fn copy_to_local(&self, path: &Path, local: &Path) -> Result<(), FsError> {
        let data = self.read(path).await?;
        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| FsError::Io {
                    op: "download",
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(local, data)
            .await
            .map_err(|source| FsError::Io {
                op: "download",
                path: local.to_path_buf(),
                source,
            })
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        let path = self.open(path)?;
        match self.inner.lock().nodes.get(&path) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Dir { .. }) => Err(FsError::Failed(format!(
                "{} is a directory",
                path.display()
            ))),
            None => Err(FsError::NotFound(path)),
        }
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        let path = self.open(path)?;
        self.inner.lock().put_file(&path, data.to_vec());
        Ok(())
    }

    async fn delete(&self, path: &Path, recursive: bool) -> Result<bool, FsError> {
        let path = self.open(path)?;
        let mut state = self.inner.lock();
        state.deletes.push(path.clone());
        if state.fail_delete.contains(&path) {
            return Err(FsError::Failed(format!(
                "injected delete failure for {}",
                path.display()
            )));
        }
        if !state.nodes.contains_key(&path) {
            return Ok(false);
        }
        let has_children = state
            .nodes
            .keys()
            .any(|p| p != &path && p.starts_with(&path));
        if has_children && !recursive {
            return Err(FsError::NotEmpty(path));
        }
        state.nodes.retain(|p, _| !p.starts_with(&path));
        Ok(true)
    }

    async fn close(&self) -> Result<(), FsError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out [`FakeFileSystem`] handles over one shared tree
#[derive(Clone, Default)]
pub struct FakeFileSystemProvider {
    tree: FakeFileSystem,
}

impl FakeFileSystemProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// An open handle for inspecting and seeding the shared tree
    pub fn tree(&self) -> FakeFileSystem {
        FakeFileSystem {
            inner: Arc::clone(&self.tree.inner),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of handles opened through `connect`
    pub fn connects(&self) -> usize {
        self.tree.inner.lock().connects
    }
}

impl FileSystemProvider for FakeFileSystemProvider {
    type Fs = FakeFileSystem;

    fn connect(&self) -> Result<FakeFileSystem, FsError> {
        self.tree.inner.lock().connects += 1;
        Ok(self.tree())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
