// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent key/value state store with aliases.
//!
//! Layout: `<root>/<store>/<key>.json` holds a value, and
//! `<root>/<store>/<alias>.alias` holds the key it points at.

use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from state store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid name {0:?}")]
    InvalidName(String),
    #[error("alias {alias} targets missing key {key}")]
    MissingTarget { alias: String, key: String },
}

pub trait StateStore: Send + Sync + 'static {
    /// Value stored under `key`, or under the key `key` aliases
    fn get(&self, store: &str, key: &str) -> Result<Option<Value>, StoreError>;

    fn put(&self, store: &str, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Make `alias` resolve to `key`; `key` must exist
    fn create_alias(&self, store: &str, key: &str, alias: &str) -> Result<(), StoreError>;
}

/// State store backed by JSON files in a directory
#[derive(Debug, Clone)]
pub struct FsStateStore {
    root: PathBuf,
}

fn check_name(name: &str) -> Result<&str, StoreError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);
    if valid {
        Ok(name)
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

/// Write to a temp sibling, sync, then rename over `path`
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl FsStateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn value_path(&self, store: &str, key: &str) -> Result<PathBuf, StoreError> {
        Ok(self
            .root
            .join(check_name(store)?)
            .join(format!("{}.json", check_name(key)?)))
    }

    fn alias_path(&self, store: &str, alias: &str) -> Result<PathBuf, StoreError> {
        Ok(self
            .root
            .join(check_name(store)?)
            .join(format!("{}.alias", check_name(alias)?)))
    }
}

impl StateStore for FsStateStore {
    fn get(&self, store: &str, key: &str) -> Result<Option<Value>, StoreError> {
        if let Some(bytes) = read_optional(&self.value_path(store, key)?)? {
            return Ok(Some(serde_json::from_slice(&bytes)?));
        }
        let Some(target) = read_optional(&self.alias_path(store, key)?)? else {
            return Ok(None);
        };
        let target = String::from_utf8_lossy(&target).trim().to_string();
        match read_optional(&self.value_path(store, &target)?)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put(&self, store: &str, key: &str, value: &Value) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        write_atomic(&self.value_path(store, key)?, &bytes)
    }

    fn create_alias(&self, store: &str, key: &str, alias: &str) -> Result<(), StoreError> {
        if !self.value_path(store, key)?.exists() {
            return Err(StoreError::MissingTarget {
                alias: alias.to_string(),
                key: key.to_string(),
            });
        }
        write_atomic(&self.alias_path(store, alias)?, key.as_bytes())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
