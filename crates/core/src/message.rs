// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control messages sent to the running application through the cluster
//! coordinator.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClusterMessage {
    /// Ask the application master to shut down and release its containers.
    ApplicationMasterShutdown,
    /// The delegation token file on distributed storage was rewritten.
    TokenFileUpdated,
}
