// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Ferry launcher engine

mod bundler;
mod client_pool;
mod closer;
mod command;
pub mod env;
mod error;
pub mod jar_cache;
mod launcher;
mod log_copier;
mod notification;
pub mod refresher;
mod resources;
mod security;
mod services;
pub mod timeout;

pub use bundler::{BundleDirs, MasterBundle, ResourceBundler, MAX_UPLOAD_ATTEMPTS};
pub use client_pool::ClientPool;
pub use closer::{Closeable, Closer};
pub use command::build_master_command;
pub use error::LauncherError;
pub use launcher::{FailureCounter, Launcher, LauncherDeps, LauncherEvent, LauncherPhase};
pub use log_copier::LogCopier;
pub use notification::{shutdown_body, shutdown_subject};
pub use refresher::{
    FileTokenRefresher, RefresherArgs, RefresherError, RefresherRegistry, TokenRefresher,
};
pub use resources::negotiate;
pub use security::{fetch_filesystem_tokens, setup_security_tokens};
pub use services::{PeriodicTask, Service, ServiceError, ServiceSet};
pub use timeout::{run_with_timeout, TimeoutError};
