// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launcher for one named cluster application.
//!
//! [`Launcher::start`] reconnects to a live application of the same name or
//! submits a new one, then polls its report on a fixed interval until the
//! application completes, report fetches keep failing, or [`Launcher::stop`]
//! is called from outside.

mod monitor;
mod shutdown;
mod submit;

pub use monitor::{FailureCounter, LauncherEvent};

use crate::bundler::APP_LOGS_DIR;
use crate::client_pool::ClientPool;
use crate::closer::{Closer, CoordinatorHandle, FsHandle};
use crate::error::LauncherError;
use crate::log_copier::LogCopier;
use crate::refresher::{RefresherArgs, RefresherRegistry, TokenRefresher};
use crate::services::ServiceSet;
use ferry_adapters::{
    ClusterCoordinator, FileSystem, FileSystemProvider, NotifyAdapter, ResourceManagerClient,
    SecurityPlatform, StateStore,
};
use ferry_core::{ApplicationId, Clock, LauncherConfig};
use monitor::Poller;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Bounded queue between the poller and the event handler
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Where the launcher is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherPhase {
    Idle,
    Discovering,
    Reconnected,
    Submitting,
    Monitoring,
    ShuttingDown,
    Stopped,
}

impl std::fmt::Display for LauncherPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LauncherPhase::Idle => "idle",
            LauncherPhase::Discovering => "discovering",
            LauncherPhase::Reconnected => "reconnected",
            LauncherPhase::Submitting => "submitting",
            LauncherPhase::Monitoring => "monitoring",
            LauncherPhase::ShuttingDown => "shutting down",
            LauncherPhase::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Launcher adapter dependencies
pub struct LauncherDeps<R: ResourceManagerClient, P: FileSystemProvider, N, C> {
    pub clients: ClientPool<R>,
    pub filesystems: P,
    pub notifier: N,
    pub security: Arc<dyn SecurityPlatform>,
    pub coordinator: Option<Arc<dyn ClusterCoordinator>>,
    pub state_store: Option<Arc<dyn StateStore>>,
    pub refreshers: RefresherRegistry<P::Fs>,
    /// Externally supplied credential file merged into secure submissions
    pub token_file_location: Option<PathBuf>,
    pub clock: C,
}

pub(crate) struct Inner<R: ResourceManagerClient, P: FileSystemProvider, N, C> {
    pub(crate) config: Arc<LauncherConfig>,
    pub(crate) clients: ClientPool<R>,
    pub(crate) filesystems: P,
    pub(crate) notifier: N,
    pub(crate) security: Arc<dyn SecurityPlatform>,
    pub(crate) coordinator: Option<Arc<dyn ClusterCoordinator>>,
    pub(crate) state_store: Option<Arc<dyn StateStore>>,
    pub(crate) refreshers: RefresherRegistry<P::Fs>,
    pub(crate) token_file_location: Option<PathBuf>,
    pub(crate) clock: C,
    pub(crate) closer: Closer,
    pub(crate) application_id: Mutex<Option<ApplicationId>>,
    /// Work dir the submitted resources were uploaded under
    pub(crate) staged_work_dir: Mutex<Option<PathBuf>>,
    pub(crate) completed: AtomicBool,
    /// Shared with the coordinator when there is one
    pub(crate) running: Arc<AtomicBool>,
    pub(crate) failures: FailureCounter,
    pub(crate) phase: Mutex<LauncherPhase>,
    pub(crate) started: AtomicBool,
    pub(crate) stop_claimed: Mutex<bool>,
    pub(crate) stopped: watch::Sender<bool>,
    pub(crate) notified: AtomicBool,
    pub(crate) poller: Mutex<Option<Poller>>,
    pub(crate) handler: Mutex<Option<JoinHandle<()>>>,
    pub(crate) services: Mutex<Option<ServiceSet>>,
    pub(crate) refresher: Mutex<Option<Arc<dyn TokenRefresher>>>,
}

/// Launches and supervises one cluster application.
///
/// Cheap to clone; clones share state.
pub struct Launcher<R: ResourceManagerClient, P: FileSystemProvider, N, C> {
    pub(crate) inner: Arc<Inner<R, P, N, C>>,
}

impl<R: ResourceManagerClient, P: FileSystemProvider, N, C> Clone for Launcher<R, P, N, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, P, N, C> Launcher<R, P, N, C>
where
    R: ResourceManagerClient,
    P: FileSystemProvider,
    N: NotifyAdapter,
    C: Clock,
{
    /// Create a launcher. The configuration is validated before anything
    /// touches the cluster.
    pub fn new(config: LauncherConfig, deps: LauncherDeps<R, P, N, C>) -> Result<Self, LauncherError> {
        config.validate()?;
        if deps.clients.is_empty() {
            return Err(LauncherError::InvalidSetting(
                "no resource manager endpoints configured".to_string(),
            ));
        }
        let running = deps
            .coordinator
            .as_ref()
            .map(|c| c.running_flag())
            .unwrap_or_else(|| Arc::new(AtomicBool::new(false)));
        let (stopped, _) = watch::channel(false);

        Ok(Self {
            inner: Arc::new(Inner {
                config: Arc::new(config),
                clients: deps.clients,
                filesystems: deps.filesystems,
                notifier: deps.notifier,
                security: deps.security,
                coordinator: deps.coordinator,
                state_store: deps.state_store,
                refreshers: deps.refreshers,
                token_file_location: deps.token_file_location,
                clock: deps.clock,
                closer: Closer::new(),
                application_id: Mutex::new(None),
                staged_work_dir: Mutex::new(None),
                completed: AtomicBool::new(false),
                running,
                failures: FailureCounter::new(),
                phase: Mutex::new(LauncherPhase::Idle),
                started: AtomicBool::new(false),
                stop_claimed: Mutex::new(false),
                stopped,
                notified: AtomicBool::new(false),
                poller: Mutex::new(None),
                handler: Mutex::new(None),
                services: Mutex::new(None),
                refresher: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.inner.config
    }

    pub fn phase(&self) -> LauncherPhase {
        *self.inner.phase.lock()
    }

    pub fn application_id(&self) -> Option<ApplicationId> {
        self.inner.application_id.lock().clone()
    }

    /// Consecutive report-fetch failures since the last successful fetch
    pub fn report_failures(&self) -> u32 {
        self.inner.failures.get()
    }

    /// An application is known, has not completed, and will not be left
    /// running on exit.
    pub fn is_application_running(&self) -> bool {
        self.inner.application_id.lock().is_some()
            && !self.inner.completed.load(Ordering::SeqCst)
            && !self.inner.config.detach_on_exit
    }

    pub(crate) fn set_phase(&self, phase: LauncherPhase) {
        let mut current = self.inner.phase.lock();
        if *current != phase {
            tracing::debug!(from = %*current, to = %phase, "launcher phase");
            *current = phase;
        }
    }

    /// Start the launcher.
    ///
    /// Reconnects to a live application of the configured name if any
    /// resource manager knows one, otherwise submits a new application.
    /// Then begins polling its report and starts the auxiliary services.
    pub async fn start(&self) -> Result<(), LauncherError> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(LauncherError::AlreadyStarted);
        }
        let config = Arc::clone(&self.inner.config);
        tracing::info!(application = %config.application_name, "starting launcher");
        self.set_phase(LauncherPhase::Discovering);

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let fs = self.inner.filesystems.connect()?;
        self.inner.closer.register(Arc::new(FsHandle(fs.clone())));
        if let Some(coordinator) = &self.inner.coordinator {
            self.inner
                .closer
                .register(Arc::new(CoordinatorHandle(Arc::clone(coordinator))));
        }

        if config.key_management_enabled {
            let refresher = self.build_refresher(&fs)?;
            refresher.login_and_schedule().await?;
            *self.inner.refresher.lock() = Some(refresher);
        }

        self.inner.clients.start_all().await?;

        let reconnected = self
            .inner
            .clients
            .find_reconnectable(&config.application_name, config.rpc_timeout())
            .await;
        let application_id = match reconnected {
            Some(id) => {
                tracing::info!(
                    application_id = %config.loggable_id(id.as_str()),
                    "reconnected to existing application"
                );
                self.set_phase(LauncherPhase::Reconnected);
                id
            }
            None => {
                self.inner.clients.reset_active();
                self.set_phase(LauncherPhase::Submitting);
                self.submit(&fs).await?
            }
        };
        *self.inner.application_id.lock() = Some(application_id.clone());

        if self.inner.coordinator.is_some() {
            let _ = self.inner.running.compare_exchange(
                false,
                self.is_application_running(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            );
        }

        let handler = tokio::spawn(monitor::run_handler(self.clone(), event_rx));
        *self.inner.handler.lock() = Some(handler);
        if let Some(client) = self.inner.clients.active() {
            let poller = Poller::spawn(
                client.clone(),
                application_id.clone(),
                config.poll_interval(),
                config.rpc_timeout(),
                event_tx,
            );
            *self.inner.poller.lock() = Some(poller);
        }
        self.set_phase(LauncherPhase::Monitoring);

        let services = self.build_services(&fs, &application_id).await?;
        if !services.is_empty() {
            tracing::info!(services = ?services.names(), "starting services");
        }
        let started = services.start_all().await;
        *self.inner.services.lock() = Some(services);
        started?;
        Ok(())
    }

    fn build_refresher(&self, fs: &P::Fs) -> Result<Arc<dyn TokenRefresher>, LauncherError> {
        let config = &self.inner.config;
        let args = RefresherArgs {
            config: Arc::clone(config),
            fs: fs.clone(),
            token_file: config.token_file_path(),
            security: Arc::clone(&self.inner.security),
        };
        let refresher =
            self.inner
                .refreshers
                .build(&config.token_refresher, args, self.inner.coordinator.clone())?;
        tracing::info!(refresher = %self.inner.refreshers.resolve(&config.token_refresher), "built token refresher");
        Ok(refresher)
    }

    async fn build_services(
        &self,
        fs: &P::Fs,
        application_id: &ApplicationId,
    ) -> Result<ServiceSet, LauncherError> {
        let config = &self.inner.config;
        let mut services = ServiceSet::new();
        let refresher = self.inner.refresher.lock().take();
        if let Some(refresher) = refresher {
            services.push(refresher.into_service());
        }

        if config.log_copier_disabled {
            return Ok(services);
        }
        if let Some(sink_root) = &config.log_sink_root_dir {
            let app_logs = config
                .app_work_dir(application_id.as_str())
                .join(APP_LOGS_DIR);
            if !fs.exists(&app_logs).await? {
                fs.mkdirs(&app_logs).await?;
            }
            let sink = sink_root
                .join(&config.application_name)
                .join(application_id.as_str());
            services.push(Arc::new(LogCopier::new(
                fs.clone(),
                app_logs,
                sink,
                config.log_copy_interval(),
            )));
        }
        Ok(services)
    }
}

#[cfg(test)]
#[path = "../launcher_tests/mod.rs"]
mod tests;
