// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the launcher's external collaborators

pub mod coordinator;
pub mod fs;
pub mod notify;
pub mod rm;
pub mod security;
pub mod store;
pub mod subprocess;
pub mod traced;

pub use coordinator::{ClusterCoordinator, CoordinatorError, LocalCoordinator};
pub use fs::{
    FileStatus, FileSystem, FileSystemProvider, FsError, LocalFileSystem,
    LocalFileSystemProvider,
};
pub use notify::{CommandNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError};
pub use rm::{BridgeResourceManager, ResourceManagerClient, RmError};
pub use security::{BridgeSecurityPlatform, InsecurePlatform, SecurityError, SecurityPlatform};
pub use store::{FsStateStore, StateStore, StoreError};
pub use traced::TracedResourceManager;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use coordinator::FakeCoordinator;
#[cfg(any(test, feature = "test-support"))]
pub use fs::{FakeFileSystem, FakeFileSystemProvider};
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use rm::{FakeResourceManager, RmCall};
#[cfg(any(test, feature = "test-support"))]
pub use security::FakeSecurityPlatform;
