// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container resource negotiation

use ferry_core::Resource;

/// Clamp the requested master resources to the cluster's advertised
/// maximum. Each dimension is clamped independently; never fails.
pub fn negotiate(requested: Resource, maximum: Resource) -> Resource {
    let clamped = requested.clamp_to(maximum);
    if clamped.memory_clamped {
        tracing::info!(
            requested_mbs = requested.memory_mbs,
            maximum_mbs = maximum.memory_mbs,
            "requested master memory exceeds cluster maximum, using maximum"
        );
    }
    if clamped.vcores_clamped {
        tracing::info!(
            requested = requested.vcores,
            maximum = maximum.vcores,
            "requested master vcores exceed cluster maximum, using maximum"
        );
    }
    clamped.resource
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod tests;
