// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container resource capability.

use serde::{Deserialize, Serialize};

/// Memory and CPU of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resource {
    pub memory_mbs: u32,
    pub vcores: u32,
}

/// Result of fitting a request into the cluster's maximum capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clamped {
    pub resource: Resource,
    pub memory_clamped: bool,
    pub vcores_clamped: bool,
}

impl Resource {
    pub fn new(memory_mbs: u32, vcores: u32) -> Self {
        Self { memory_mbs, vcores }
    }

    /// Clamp each dimension independently to `maximum`.
    pub fn clamp_to(self, maximum: Resource) -> Clamped {
        Clamped {
            resource: Resource {
                memory_mbs: self.memory_mbs.min(maximum.memory_mbs),
                vcores: self.vcores.min(maximum.vcores),
            },
            memory_clamped: self.memory_mbs > maximum.memory_mbs,
            vcores_clamped: self.vcores > maximum.vcores,
        }
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
