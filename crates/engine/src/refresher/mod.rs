// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pluggable delegation-token refreshers.
//!
//! Refreshers are resolved by name from a [`RefresherRegistry`]: a short
//! alias (`file`) or the full name (`FileTokenRefresher`). Each entry may
//! offer a plain constructor, a constructor that also receives the cluster
//! coordinator, or both.

mod file;

pub use file::FileTokenRefresher;

use crate::services::Service;
use async_trait::async_trait;
use ferry_adapters::{ClusterCoordinator, FileSystem, SecurityPlatform};
use ferry_core::LauncherConfig;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefresherError {
    #[error("unknown token refresher {0:?}")]
    Unknown(String),
    #[error("token refresher {name} cannot be built {mode}")]
    NoConstructor { name: String, mode: &'static str },
    #[error("token refresher {name} failed to construct: {message}")]
    Construct { name: String, message: String },
    #[error("login failed: {0}")]
    Login(String),
    #[error("token renewal failed: {0}")]
    Renewal(String),
}

/// Service that keeps the application's delegation tokens fresh
#[async_trait]
pub trait TokenRefresher: Service {
    async fn login(&self) -> Result<(), RefresherError>;

    /// Begin periodic renewal. Scheduling twice is a no-op.
    fn schedule_token_renewal(&self);

    async fn login_and_schedule(&self) -> Result<(), RefresherError> {
        self.login().await?;
        self.schedule_token_renewal();
        Ok(())
    }

    fn into_service(self: Arc<Self>) -> Arc<dyn Service>;
}

/// Everything a refresher constructor may use
pub struct RefresherArgs<F: FileSystem> {
    pub config: Arc<LauncherConfig>,
    pub fs: F,
    pub token_file: PathBuf,
    pub security: Arc<dyn SecurityPlatform>,
}

impl<F: FileSystem> Clone for RefresherArgs<F> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            fs: self.fs.clone(),
            token_file: self.token_file.clone(),
            security: Arc::clone(&self.security),
        }
    }
}

type BuildResult = Result<Arc<dyn TokenRefresher>, RefresherError>;
type PlainCtor<F> = Box<dyn Fn(RefresherArgs<F>) -> BuildResult + Send + Sync>;
type CoordinatedCtor<F> =
    Box<dyn Fn(RefresherArgs<F>, Arc<dyn ClusterCoordinator>) -> BuildResult + Send + Sync>;

struct Entry<F: FileSystem> {
    plain: Option<PlainCtor<F>>,
    coordinated: Option<CoordinatedCtor<F>>,
}

impl<F: FileSystem> Default for Entry<F> {
    fn default() -> Self {
        Self {
            plain: None,
            coordinated: None,
        }
    }
}

pub struct RefresherRegistry<F: FileSystem> {
    aliases: HashMap<String, String>,
    entries: HashMap<String, Entry<F>>,
}

impl<F: FileSystem> RefresherRegistry<F> {
    /// A registry with no refreshers
    pub fn empty() -> Self {
        Self {
            aliases: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    /// A registry holding the built-in refreshers
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register_alias("file", FileTokenRefresher::<F>::NAME);
        registry.register(FileTokenRefresher::<F>::NAME, |args| {
            Ok(Arc::new(FileTokenRefresher::new(args)))
        });
        registry.register_with_coordinator(FileTokenRefresher::<F>::NAME, |args, coordinator| {
            Ok(Arc::new(FileTokenRefresher::with_coordinator(args, coordinator)))
        });
        registry
    }

    /// Make `alias` (matched case-insensitively) resolve to `name`
    pub fn register_alias(&mut self, alias: &str, name: &str) {
        self.aliases
            .insert(alias.to_ascii_lowercase(), name.to_string());
    }

    pub fn register<C>(&mut self, name: &str, ctor: C)
    where
        C: Fn(RefresherArgs<F>) -> BuildResult + Send + Sync + 'static,
    {
        self.entries.entry(name.to_string()).or_default().plain = Some(Box::new(ctor));
    }

    pub fn register_with_coordinator<C>(&mut self, name: &str, ctor: C)
    where
        C: Fn(RefresherArgs<F>, Arc<dyn ClusterCoordinator>) -> BuildResult
            + Send
            + Sync
            + 'static,
    {
        self.entries.entry(name.to_string()).or_default().coordinated = Some(Box::new(ctor));
    }

    /// Full name for an alias; other names are returned unchanged
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
            .unwrap_or(name)
    }

    /// Construct the refresher named `name`.
    ///
    /// With a coordinator, the coordinator-aware constructor is preferred
    /// and the plain one is the fallback.
    pub fn build(
        &self,
        name: &str,
        args: RefresherArgs<F>,
        coordinator: Option<Arc<dyn ClusterCoordinator>>,
    ) -> BuildResult {
        let resolved = self.resolve(name);
        let entry = self
            .entries
            .get(resolved)
            .ok_or_else(|| RefresherError::Unknown(name.to_string()))?;

        match (coordinator, &entry.coordinated, &entry.plain) {
            (Some(coordinator), Some(ctor), _) => ctor(args, coordinator),
            (_, _, Some(ctor)) => ctor(args),
            _ => Err(RefresherError::NoConstructor {
                name: resolved.to_string(),
                mode: "without a coordinator",
            }),
        }
    }
}

impl<F: FileSystem> Default for RefresherRegistry<F> {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
#[path = "../refresher_tests.rs"]
mod tests;
