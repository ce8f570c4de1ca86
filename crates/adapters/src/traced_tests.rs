// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::rm::{FakeResourceManager, RmCall};
use ferry_core::test_support::report;
use ferry_core::{LaunchContext, Resource, APPLICATION_TYPE};
use serial_test::{parallel, serial};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

/// Assert that captured logs contain the expected substring
fn assert_log(logs: &str, label: &str, expected: &str) {
    assert!(logs.contains(expected), "Should log {label}. Logs:\n{logs}",);
}

async fn started() -> (FakeResourceManager, TracedResourceManager<FakeResourceManager>) {
    let fake = FakeResourceManager::default();
    let traced = TracedResourceManager::new(fake.clone());
    traced.start().await.unwrap();
    (fake, traced)
}

fn context(id: &ApplicationId) -> SubmissionContext {
    SubmissionContext {
        application_id: id.clone(),
        application_name: "demo".to_string(),
        application_type: APPLICATION_TYPE.to_string(),
        queue: "default".to_string(),
        priority: 0,
        max_attempts: 1,
        tags: BTreeSet::new(),
        resource: Resource::new(1024, 1),
        master: LaunchContext::default(),
    }
}

#[test]
#[serial(tracing)]
fn create_logs_span_and_timing() {
    let (logs, result) = with_tracing(|| async {
        let (_, traced) = started().await;
        traced.create_application().await
    });

    assert!(result.is_ok());
    assert_log(&logs, "span name", "rm.create");
    assert_log(&logs, "endpoint", "rm-a:8032");
    assert_log(&logs, "completion", "application created");
    assert_log(&logs, "timing", "elapsed_ms");
}

#[test]
#[serial(tracing)]
fn submit_logs_entry_and_completion() {
    let (logs, result) = with_tracing(|| async {
        let (_, traced) = started().await;
        let app = traced.create_application().await.unwrap();
        traced.submit_application(&context(&app.application_id)).await
    });

    assert!(result.is_ok());
    assert_log(&logs, "span name", "rm.submit");
    assert_log(&logs, "entry", "submitting");
    assert_log(&logs, "completion", "application submitted");
}

#[test]
#[serial(tracing)]
fn failed_report_logs_warning() {
    let (logs, result) = with_tracing(|| async {
        let (fake, traced) = started().await;
        fake.push_report(Err("connection refused".to_string()));
        traced
            .application_report(&ApplicationId::new("application_1_0001"))
            .await
    });

    assert!(result.is_err());
    assert_log(&logs, "failure", "report fetch failed");
    assert_log(&logs, "cause", "connection refused");
}

#[test]
#[serial(tracing)]
fn start_failure_logs_error() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeResourceManager::default();
        fake.fail_start("unreachable");
        TracedResourceManager::new(fake).start().await
    });

    assert!(result.is_err());
    assert_log(&logs, "span name", "rm.start");
    assert_log(&logs, "failure", "start failed");
}

#[tokio::test]
#[parallel(tracing)]
async fn delegates_to_inner() {
    let (fake, traced) = started().await;
    let id = ApplicationId::new("application_1_0001");
    fake.add_application(report(id.as_str(), "demo", ApplicationState::Running));

    let fetched = traced.application_report(&id).await.unwrap();
    assert_eq!(fetched.state, ApplicationState::Running);
    let listed = traced
        .list_applications(&[APPLICATION_TYPE], &[ApplicationState::Running])
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    traced.stop().await.unwrap();

    assert_eq!(
        fake.calls(),
        vec![RmCall::Start, RmCall::Report(id), RmCall::List, RmCall::Stop]
    );
    assert_eq!(traced.endpoint().as_str(), "rm-a:8032");
}
