// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the launcher

use crate::refresher::RefresherError;
use crate::services::ServiceError;
use crate::timeout::TimeoutError;
use ferry_adapters::{FsError, RmError, SecurityError};
use ferry_core::{ConfigError, CredentialsError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while launching, monitoring or stopping an application
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid configuration: {0}")]
    InvalidSetting(String),
    #[error("resource manager error: {0}")]
    Rm(#[from] RmError),
    #[error("filesystem error: {0}")]
    Fs(#[from] FsError),
    #[error("upload of {} failed after {attempts} attempts: {message}", source_path.display())]
    Upload {
        source_path: PathBuf,
        attempts: u32,
        message: String,
    },
    #[error("library directory {} not found", .0.display())]
    MissingLibDir(PathBuf),
    #[error("packaging {} failed: {message}", path.display())]
    Package { path: PathBuf, message: String },
    #[error("security error: {0}")]
    Security(#[from] SecurityError),
    #[error("token file {}: {source}", path.display())]
    TokenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("credentials error: {0}")]
    Credentials(#[from] CredentialsError),
    #[error("token refresher error: {0}")]
    Refresher(#[from] RefresherError),
    #[error(transparent)]
    Timeout(#[from] TimeoutError),
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
    #[error("launcher already started")]
    AlreadyStarted,
}
