// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ferry-core: data model shared by the ferry cluster launcher

pub mod application;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod id;
pub mod local_resource;
pub mod message;
pub mod resource;
pub mod submission;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use application::{
    ApplicationReport, ApplicationState, FinalStatus, ResourceUsage, RECONNECTABLE_STATES,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{split_list, ConfigError, LauncherConfig};
pub use credentials::{
    Credentials, CredentialsError, Token, FS_DELEGATION_TOKEN, RM_DELEGATION_TOKEN,
};
pub use id::{ApplicationId, Endpoint};
pub use local_resource::{LocalResource, LocalResourceKind, LocalResourceManifest};
pub use message::ClusterMessage;
pub use resource::{Clamped, Resource};
pub use submission::{
    AccessType, LaunchContext, NewApplication, SubmissionContext, APPLICATION_TYPE,
};
pub use time_fmt::{format_epoch_ms, format_run_time};
