// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch request sent to the resource manager.

use crate::id::ApplicationId;
use crate::local_resource::LocalResourceManifest;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Application type tag the launcher submits under and reconnects by.
pub const APPLICATION_TYPE: &str = "FERRY_CLUSTER";

/// Response to a create-application call. The id is valid immediately,
/// before anything is submitted under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApplication {
    pub application_id: ApplicationId,
    pub maximum_capability: Resource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessType {
    ViewApp,
    ModifyApp,
}

/// What the resource manager needs to start the application master.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchContext {
    pub local_resources: LocalResourceManifest,
    pub environment: BTreeMap<String, String>,
    pub commands: Vec<String>,
    pub acls: BTreeMap<AccessType, String>,
    /// Serialized credential bundle, present only on secure clusters
    pub tokens: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionContext {
    pub application_id: ApplicationId,
    pub application_name: String,
    pub application_type: String,
    pub queue: String,
    pub priority: u32,
    pub max_attempts: u32,
    pub tags: BTreeSet<String>,
    pub resource: Resource,
    pub master: LaunchContext,
}
