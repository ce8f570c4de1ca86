// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake resource manager for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ResourceManagerClient, RmError};
use async_trait::async_trait;
use ferry_core::{
    ApplicationId, ApplicationReport, ApplicationState, Endpoint, NewApplication, Resource,
    SubmissionContext,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Recorded resource manager call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RmCall {
    Start,
    Stop,
    CreateApplication,
    Submit(ApplicationId),
    Report(ApplicationId),
    List,
}

struct FakeRmState {
    started: bool,
    calls: Vec<RmCall>,
    next_sequence: u32,
    maximum_capability: Resource,
    applications: HashMap<ApplicationId, ApplicationReport>,
    /// Applications that become visible once submitted under their id
    pending: HashMap<ApplicationId, ApplicationReport>,
    /// Scripted responses consumed by `application_report` before falling
    /// back to `applications`
    scripted_reports: VecDeque<Result<ApplicationReport, String>>,
    submissions: Vec<SubmissionContext>,
    submit_id_override: Option<ApplicationId>,
    fail_start: Option<String>,
    fail_create: Option<String>,
    fail_submit: Option<String>,
    fail_list: Option<String>,
}

/// Fake resource manager for testing
#[derive(Clone)]
pub struct FakeResourceManager {
    endpoint: Endpoint,
    inner: Arc<Mutex<FakeRmState>>,
}

impl Default for FakeResourceManager {
    fn default() -> Self {
        Self::new("rm-a:8032")
    }
}

impl FakeResourceManager {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: Endpoint::new(endpoint),
            inner: Arc::new(Mutex::new(FakeRmState {
                started: false,
                calls: Vec::new(),
                next_sequence: 1,
                maximum_capability: Resource::new(8192, 8),
                applications: HashMap::new(),
                pending: HashMap::new(),
                scripted_reports: VecDeque::new(),
                submissions: Vec::new(),
                submit_id_override: None,
                fail_start: None,
                fail_create: None,
                fail_submit: None,
                fail_list: None,
            })),
        }
    }

    pub fn set_maximum_capability(&self, resource: Resource) {
        self.inner.lock().maximum_capability = resource;
    }

    /// Register an application visible to reports and listings
    pub fn add_application(&self, report: ApplicationReport) {
        self.inner
            .lock()
            .applications
            .insert(report.application_id.clone(), report);
    }

    /// Register an application that only becomes visible to reports and
    /// listings once it is submitted under its id
    pub fn add_application_on_submit(&self, report: ApplicationReport) {
        self.inner
            .lock()
            .pending
            .insert(report.application_id.clone(), report);
    }

    /// Queue a report response (`Err` fails the fetch with that message)
    pub fn push_report(&self, response: Result<ApplicationReport, String>) {
        self.inner.lock().scripted_reports.push_back(response);
    }

    /// Make `submit_application` answer with `id` instead of the submitted one
    pub fn set_submit_id(&self, id: ApplicationId) {
        self.inner.lock().submit_id_override = Some(id);
    }

    pub fn fail_start(&self, message: &str) {
        self.inner.lock().fail_start = Some(message.to_string());
    }

    pub fn fail_create(&self, message: &str) {
        self.inner.lock().fail_create = Some(message.to_string());
    }

    pub fn fail_submit(&self, message: &str) {
        self.inner.lock().fail_submit = Some(message.to_string());
    }

    pub fn fail_list(&self, message: &str) {
        self.inner.lock().fail_list = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<RmCall> {
        self.inner.lock().calls.clone()
    }

    pub fn submissions(&self) -> Vec<SubmissionContext> {
        self.inner.lock().submissions.clone()
    }

    pub fn is_started(&self) -> bool {
        self.inner.lock().started
    }

    /// Number of report fetches so far
    pub fn report_count(&self) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, RmCall::Report(_)))
            .count()
    }

    fn rpc_error(&self, message: String) -> RmError {
        RmError::Rpc {
            endpoint: self.endpoint.clone(),
            message,
        }
    }

    fn check_started(&self, state: &FakeRmState) -> Result<(), RmError> {
        if state.started {
            Ok(())
        } else {
            Err(RmError::NotStarted(self.endpoint.clone()))
        }
    }
}

#[async_trait]
impl ResourceManagerClient for FakeResourceManager {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn start(&self) -> Result<(), RmError> {
        let mut state = self.inner.lock();
        state.calls.push(RmCall::Start);
        if let Some(message) = state.fail_start.clone() {
            return Err(self.rpc_error(message));
        }
        state.started = true;
        Ok(())
    }

    async fn stop(&self) -> Result<(), RmError> {
        let mut state = self.inner.lock();
        state.calls.push(RmCall::Stop);
        state.started = false;
        Ok(())
    }

    async fn create_application(&self) -> Result<NewApplication, RmError> {
        let mut state = self.inner.lock();
        state.calls.push(RmCall::CreateApplication);
        self.check_started(&state)?;
        if let Some(message) = state.fail_create.clone() {
            return Err(self.rpc_error(message));
        }
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        Ok(NewApplication {
            application_id: ApplicationId::from_parts(1_700_000_000_000, sequence),
            maximum_capability: state.maximum_capability,
        })
    }

    async fn submit_application(
        &self,
        context: &SubmissionContext,
    ) -> Result<ApplicationId, RmError> {
        let mut state = self.inner.lock();
        state
            .calls
            .push(RmCall::Submit(context.application_id.clone()));
        self.check_started(&state)?;
        if let Some(message) = state.fail_submit.clone() {
            return Err(self.rpc_error(message));
        }
        state.submissions.push(context.clone());
        let accepted = state
            .submit_id_override
            .clone()
            .unwrap_or_else(|| context.application_id.clone());
        if let Some(report) = state.pending.remove(&accepted) {
            state.applications.insert(accepted.clone(), report);
        }
        Ok(accepted)
    }

    async fn application_report(
        &self,
        id: &ApplicationId,
    ) -> Result<ApplicationReport, RmError> {
        let mut state = self.inner.lock();
        state.calls.push(RmCall::Report(id.clone()));
        self.check_started(&state)?;
        match state.scripted_reports.pop_front() {
            Some(Ok(report)) => Ok(report),
            Some(Err(message)) => Err(self.rpc_error(message)),
            None => state
                .applications
                .get(id)
                .cloned()
                .ok_or_else(|| RmError::UnknownApplication(id.clone())),
        }
    }

    async fn list_applications(
        &self,
        types: &[&str],
        states: &[ApplicationState],
    ) -> Result<Vec<ApplicationReport>, RmError> {
        let mut state = self.inner.lock();
        state.calls.push(RmCall::List);
        self.check_started(&state)?;
        if let Some(message) = state.fail_list.clone() {
            return Err(self.rpc_error(message));
        }
        let mut reports: Vec<ApplicationReport> = state
            .applications
            .values()
            .filter(|r| types.contains(&r.application_type.as_str()) && states.contains(&r.state))
            .cloned()
            .collect();
        reports.sort_by(|a, b| a.application_id.cmp(&b.application_id));
        Ok(reports)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
