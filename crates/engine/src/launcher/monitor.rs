// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Report polling and the reactions to each poll outcome.

use super::Launcher;
use crate::notification::{shutdown_body, shutdown_subject};
use crate::services::PeriodicTask;
use crate::timeout::{run_with_timeout, TimeoutError};
use ferry_adapters::{FileSystemProvider, NotifyAdapter, ResourceManagerClient};
use ferry_core::{ApplicationId, ApplicationReport, Clock, FinalStatus};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;

/// Outcome of one report poll
#[derive(Debug, Clone)]
pub enum LauncherEvent {
    ReportArrived(Box<ApplicationReport>),
    ReportFailed(String),
}

/// Consecutive report-fetch failures
#[derive(Debug, Default)]
pub struct FailureCounter(AtomicU32);

impl FailureCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }

    /// Count one more failure and return the new total
    pub fn increment(&self) -> u32 {
        self.0.fetch_add(1, Ordering::SeqCst).saturating_add(1)
    }
}

/// Fixed-rate report fetcher feeding the event handler
pub(crate) struct Poller(PeriodicTask);

impl Poller {
    /// Spawn the poll loop. The first fetch happens immediately.
    ///
    /// An event the handler has not taken within one period is dropped.
    pub(crate) fn spawn<R: ResourceManagerClient>(
        client: R,
        application_id: ApplicationId,
        period: Duration,
        rpc_timeout: Duration,
        events: mpsc::Sender<LauncherEvent>,
    ) -> Self {
        let task = PeriodicTask::spawn("report-poller", period, move || {
            let client = client.clone();
            let application_id = application_id.clone();
            let events = events.clone();
            async move {
                let event = poll_once(&client, &application_id, rpc_timeout).await;
                if let Err(SendTimeoutError::Timeout(_)) = events.send_timeout(event, period).await {
                    tracing::warn!(application_id = %application_id, "event handler is behind, dropping report");
                }
            }
        });
        Self(task)
    }

    /// Stop polling, waiting up to `timeout` for an in-flight fetch
    pub(crate) async fn stop(self, timeout: Duration) -> Result<(), TimeoutError> {
        self.0.stop_within(timeout).await
    }
}

async fn poll_once<R: ResourceManagerClient>(
    client: &R,
    application_id: &ApplicationId,
    rpc_timeout: Duration,
) -> LauncherEvent {
    let fetched = run_with_timeout(
        client.application_report(application_id),
        rpc_timeout,
        "fetching application report",
    )
    .await;
    match fetched {
        Ok(Ok(report)) => LauncherEvent::ReportArrived(Box::new(report)),
        Ok(Err(e)) => {
            tracing::error!(application_id = %application_id, error = %e, "failed to get application report");
            LauncherEvent::ReportFailed(e.to_string())
        }
        Err(e) => {
            tracing::error!(application_id = %application_id, error = %e, "failed to get application report");
            LauncherEvent::ReportFailed(e.to_string())
        }
    }
}

/// Handle poll events one at a time until the poller goes away
pub(crate) async fn run_handler<R, P, N, C>(
    launcher: Launcher<R, P, N, C>,
    mut events: mpsc::Receiver<LauncherEvent>,
) where
    R: ResourceManagerClient,
    P: FileSystemProvider,
    N: NotifyAdapter,
    C: Clock,
{
    while let Some(event) = events.recv().await {
        launcher.handle_event(event).await;
    }
}

impl<R, P, N, C> Launcher<R, P, N, C>
where
    R: ResourceManagerClient,
    P: FileSystemProvider,
    N: NotifyAdapter,
    C: Clock,
{
    pub(crate) async fn handle_event(&self, event: LauncherEvent) {
        match event {
            LauncherEvent::ReportArrived(report) => self.on_report(*report).await,
            LauncherEvent::ReportFailed(error) => self.on_report_failure(&error).await,
        }
    }

    async fn on_report(&self, report: ApplicationReport) {
        let config = &self.inner.config;
        tracing::info!(
            application_id = %config.loggable_id(report.application_id.as_str()),
            state = %report.state,
            "application report"
        );
        self.inner.failures.reset();

        if report.state.is_terminal() {
            self.inner.completed.store(true, Ordering::SeqCst);
        }
        // Teardown owns the flag once it has begun
        if self.inner.coordinator.is_some() && !*self.inner.stop_claimed.lock() {
            self.inner
                .running
                .store(self.is_application_running(), Ordering::SeqCst);
        }
        if !self.inner.completed.load(Ordering::SeqCst) {
            return;
        }

        tracing::info!(
            application_id = %config.loggable_id(report.application_id.as_str()),
            final_status = %report.final_status,
            "application completed"
        );
        if report.final_status == FinalStatus::Failed {
            tracing::error!(diagnostics = %report.diagnostics, "application failed");
        }
        if let Err(e) = self.stop().await {
            tracing::error!(error = %e, "failed to stop launcher");
        }
        self.notify_shutdown(Some(&report)).await;
    }

    async fn on_report_failure(&self, error: &str) {
        let failures = self.inner.failures.increment();
        let max = self.inner.config.max_report_failures;
        if failures <= max {
            tracing::warn!(failures, max, error, "application report fetch failed");
            return;
        }
        tracing::warn!(
            failures,
            max,
            "too many consecutive report fetch failures, initiating shutdown"
        );
        if let Err(e) = self.stop().await {
            tracing::error!(error = %e, "failed to stop launcher");
        }
        self.notify_shutdown(None).await;
    }

    /// Send the shutdown notification, at most once per launcher.
    ///
    /// `None` sends the `Not available` body, for shutdowns that happen
    /// without a final report (such as a signal).
    pub async fn notify_shutdown(&self, report: Option<&ApplicationReport>) {
        if !self.inner.config.email_notification_on_shutdown {
            return;
        }
        if self.inner.notified.swap(true, Ordering::SeqCst) {
            return;
        }
        let subject = shutdown_subject(&self.inner.config.application_name);
        let body = shutdown_body(report);
        match self.inner.notifier.notify(&subject, &body).await {
            Ok(()) => tracing::info!(subject = %subject, "sent shutdown notification"),
            Err(e) => tracing::error!(error = %e, "failed to send shutdown notification"),
        }
    }
}
