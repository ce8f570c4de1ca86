// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One resource-manager client per candidate endpoint.
//!
//! Discovery reads from every client; submission and monitoring go through
//! the single active client.

use crate::timeout::run_with_timeout;
use ferry_adapters::{ResourceManagerClient, RmError};
use ferry_core::{ApplicationId, Endpoint, APPLICATION_TYPE, RECONNECTABLE_STATES};
use parking_lot::Mutex;
use std::time::Duration;

pub struct ClientPool<R: ResourceManagerClient> {
    clients: Vec<R>,
    active: Mutex<usize>,
}

impl<R: ResourceManagerClient> ClientPool<R> {
    /// Pool over `clients`; the first is the primary and starts out active
    pub fn new(clients: Vec<R>) -> Self {
        Self {
            clients,
            active: Mutex::new(0),
        }
    }

    /// Build one client per endpoint, primary first
    pub fn from_endpoints<E>(
        endpoints: &[Endpoint],
        mut connect: impl FnMut(&Endpoint) -> Result<R, E>,
    ) -> Result<Self, E> {
        let clients = endpoints
            .iter()
            .map(&mut connect)
            .collect::<Result<Vec<_>, E>>()?;
        Ok(Self::new(clients))
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.clients.iter().map(|c| c.endpoint().clone()).collect()
    }

    pub fn primary(&self) -> Option<&R> {
        self.clients.first()
    }

    pub fn active(&self) -> Option<&R> {
        self.clients.get(*self.active.lock())
    }

    /// Make the primary client active again
    pub fn reset_active(&self) {
        *self.active.lock() = 0;
    }

    /// Start every client. The first failure aborts.
    pub async fn start_all(&self) -> Result<(), RmError> {
        for client in &self.clients {
            client.start().await?;
        }
        Ok(())
    }

    /// Stop every client, logging failures. Returns the first failure.
    pub async fn stop_all(&self) -> Result<(), RmError> {
        let mut first_error = None;
        for client in &self.clients {
            if let Err(e) = client.stop().await {
                tracing::warn!(endpoint = %client.endpoint(), error = %e, "failed to stop client");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Find a live application named `name` submitted by an earlier
    /// launcher.
    ///
    /// Clients are queried in order; the first match wins and its client
    /// becomes active. A client whose listing fails is skipped.
    pub async fn find_reconnectable(
        &self,
        name: &str,
        rpc_timeout: Duration,
    ) -> Option<ApplicationId> {
        for (index, client) in self.clients.iter().enumerate() {
            let listed = run_with_timeout(
                client.list_applications(&[APPLICATION_TYPE], &RECONNECTABLE_STATES),
                rpc_timeout,
                "listing applications",
            )
            .await;
            let reports = match listed {
                Ok(Ok(reports)) => reports,
                Ok(Err(e)) => {
                    tracing::warn!(endpoint = %client.endpoint(), error = %e, "failed to list applications");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(endpoint = %client.endpoint(), error = %e, "listing applications timed out");
                    continue;
                }
            };
            let found = reports
                .into_iter()
                .find(|r| r.name == name && r.state.is_reconnectable());
            if let Some(report) = found {
                tracing::info!(
                    endpoint = %client.endpoint(),
                    state = %report.state,
                    "found reconnectable application"
                );
                *self.active.lock() = index;
                return Some(report.application_id);
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "client_pool_tests.rs"]
mod tests;
