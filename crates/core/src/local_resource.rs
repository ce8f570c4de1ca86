// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local resources staged on distributed storage for container startup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// How the container runtime materializes a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocalResourceKind {
    /// Copied as-is
    File,
    /// Unpacked into a directory named after the resource
    Archive,
}

/// One staged resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalResource {
    /// Local file it was uploaded from. `None` for resources that already
    /// lived on distributed storage.
    pub source: Option<PathBuf>,
    /// Location on distributed storage
    pub destination: PathBuf,
    pub kind: LocalResourceKind,
    /// Size in bytes, read back after upload
    pub size: u64,
    /// Modification time (epoch ms), read back after upload
    pub modified_ms: u64,
}

/// Resources attached to a launch request, keyed by the name the container
/// sees them under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalResourceManifest {
    entries: BTreeMap<String, LocalResource>,
}

impl LocalResourceManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource, replacing any earlier entry with the same name.
    pub fn insert(&mut self, name: impl Into<String>, resource: LocalResource) {
        self.entries.insert(name.into(), resource);
    }

    pub fn get(&self, name: &str) -> Option<&LocalResource> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LocalResource)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
