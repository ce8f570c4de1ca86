// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, launcher wiring, shutdown.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use ferry_adapters::{
    BridgeResourceManager, BridgeSecurityPlatform, ClusterCoordinator, CommandNotifyAdapter,
    FsStateStore, InsecurePlatform, LocalCoordinator, LocalFileSystemProvider, NoOpNotifyAdapter,
    NotifyAdapter, NotifyError, RmError, SecurityError, SecurityPlatform, StateStore,
    TracedResourceManager,
};
use ferry_core::{ConfigError, LauncherConfig, SystemClock};
use ferry_engine::{ClientPool, Launcher, LauncherDeps, LauncherError, RefresherRegistry};
use fs2::FileExt;
use thiserror::Error;
use tracing::{info, warn};

/// Launcher with concrete adapter types (resource manager calls traced)
pub type DaemonLauncher = Launcher<
    TracedResourceManager<BridgeResourceManager>,
    LocalFileSystemProvider,
    DaemonNotifier,
    SystemClock,
>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/ferry)
    pub state_dir: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Launcher configuration file
    pub launcher_config_path: PathBuf,
}

impl Config {
    /// Resolve daemon paths. The launcher config comes from `arg`, falling
    /// back to `FERRY_CONFIG`.
    pub fn load(arg: Option<PathBuf>) -> Result<Self, LifecycleError> {
        let launcher_config_path = arg
            .or_else(crate::env::config_path)
            .ok_or(LifecycleError::NoConfig)?;
        Ok(Self::with_state_dir(crate::env::state_dir()?, launcher_config_path))
    }

    pub fn with_state_dir(state_dir: PathBuf, launcher_config_path: PathBuf) -> Self {
        Self {
            lock_path: state_dir.join("ferryd.pid"),
            log_path: state_dir.join("ferryd.log"),
            launcher_config_path,
            state_dir,
        }
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("No launcher config given (pass a path or set {})", crate::env::CONFIG_ENV)]
    NoConfig,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Resource manager error: {0}")]
    Rm(#[from] RmError),

    #[error("Security error: {0}")]
    Security(#[from] SecurityError),

    #[error("Launcher error: {0}")]
    Launcher(#[from] LauncherError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shutdown notifier: a configured command, or nothing
#[derive(Clone, Debug)]
pub enum DaemonNotifier {
    Command(CommandNotifyAdapter),
    Disabled(NoOpNotifyAdapter),
}

impl DaemonNotifier {
    pub fn from_config(config: &LauncherConfig) -> Self {
        match config.notify_command.as_deref().map(str::trim) {
            Some(command) if !command.is_empty() => {
                DaemonNotifier::Command(CommandNotifyAdapter::new(command))
            }
            _ => DaemonNotifier::Disabled(NoOpNotifyAdapter::new()),
        }
    }
}

#[async_trait]
impl NotifyAdapter for DaemonNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        match self {
            DaemonNotifier::Command(adapter) => adapter.notify(title, message).await,
            DaemonNotifier::Disabled(adapter) => adapter.notify(title, message).await,
        }
    }
}

/// Daemon state during operation.
pub struct DaemonState {
    /// Configuration
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub launcher: DaemonLauncher,
}

impl DaemonState {
    /// Release daemon files. The lock itself is released when the state
    /// is dropped.
    pub fn shutdown(&mut self) {
        info!("Shutting down daemon...");
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }
        info!("Daemon shutdown complete");
    }
}

/// Take the daemon lock, load the launcher config and wire the launcher
pub fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config) {
        Ok(state) => Ok(state),
        Err(e) => {
            // The lock file belongs to the running daemon when locking failed
            if !matches!(e, LifecycleError::LockFailed(_)) && config.lock_path.exists() {
                let _ = std::fs::remove_file(&config.lock_path);
            }
            Err(e)
        }
    }
}

fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Open without truncating so a running daemon's PID survives
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    use std::io::Write;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    let launcher_config = LauncherConfig::load(&config.launcher_config_path)?;
    info!(
        application = %launcher_config.application_name,
        config = %config.launcher_config_path.display(),
        "loaded launcher config"
    );
    let launcher = build_launcher(launcher_config)?;

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        launcher,
    })
}

/// Wire production adapters into a launcher
pub fn build_launcher(config: LauncherConfig) -> Result<DaemonLauncher, LifecycleError> {
    let rpc_timeout = config.rpc_timeout();
    let clients = ClientPool::from_endpoints(&config.resource_manager_endpoints(), |endpoint| {
        BridgeResourceManager::new(&config.rm_bridge_command, endpoint.clone(), rpc_timeout)
            .map(TracedResourceManager::new)
    })?;

    let security: Arc<dyn SecurityPlatform> = if config.security_enabled {
        Arc::new(BridgeSecurityPlatform::new(
            &config.rm_bridge_command,
            config.resource_manager_address.clone(),
            rpc_timeout,
        )?)
    } else {
        Arc::new(InsecurePlatform)
    };

    let coordinator = config.coordinator_enabled.then(|| {
        Arc::new(LocalCoordinator::new(config.application_name.clone()))
            as Arc<dyn ClusterCoordinator>
    });
    let state_store = config
        .state_store_dir
        .as_ref()
        .map(|dir| Arc::new(FsStateStore::new(dir)) as Arc<dyn StateStore>);

    let deps = LauncherDeps {
        clients,
        filesystems: LocalFileSystemProvider::new(&config.filesystem_root),
        notifier: DaemonNotifier::from_config(&config),
        security,
        coordinator,
        state_store,
        refreshers: RefresherRegistry::with_builtins(),
        token_file_location: ferry_engine::env::token_file_location(),
        clock: SystemClock,
    };
    Ok(Launcher::new(config, deps)?)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
