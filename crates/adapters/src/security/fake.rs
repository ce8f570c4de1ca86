// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake security platform for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{SecurityError, SecurityPlatform};
use async_trait::async_trait;
use ferry_core::{Credentials, Token};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

struct FakeSecurityState {
    enabled: bool,
    principal: String,
    credentials: Credentials,
    tokens: HashMap<String, Vec<Token>>,
    failing_services: Vec<String>,
    logins: usize,
    fetches: Vec<(String, String)>,
}

/// Fake security platform for testing
#[derive(Clone)]
pub struct FakeSecurityPlatform {
    inner: Arc<Mutex<FakeSecurityState>>,
}

impl FakeSecurityPlatform {
    /// A platform with security enabled and no tokens
    pub fn secure(principal: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeSecurityState {
                enabled: true,
                principal: principal.to_string(),
                credentials: Credentials::new(),
                tokens: HashMap::new(),
                failing_services: Vec::new(),
                logins: 0,
                fetches: Vec::new(),
            })),
        }
    }

    pub fn insecure() -> Self {
        let platform = Self::secure("");
        platform.inner.lock().enabled = false;
        platform
    }

    pub fn add_ambient_token(&self, token: Token) {
        self.inner.lock().credentials.add_token(token);
    }

    /// Tokens returned for `service`
    pub fn set_delegation_tokens(&self, service: &str, tokens: Vec<Token>) {
        self.inner.lock().tokens.insert(service.to_string(), tokens);
    }

    pub fn fail_fetch_for(&self, service: &str) {
        self.inner.lock().failing_services.push(service.to_string());
    }

    pub fn logins(&self) -> usize {
        self.inner.lock().logins
    }

    /// (service, renewer) pairs fetched so far
    pub fn fetches(&self) -> Vec<(String, String)> {
        self.inner.lock().fetches.clone()
    }
}

#[async_trait]
impl SecurityPlatform for FakeSecurityPlatform {
    fn is_security_enabled(&self) -> bool {
        self.inner.lock().enabled
    }

    async fn login(&self) -> Result<(), SecurityError> {
        self.inner.lock().logins += 1;
        Ok(())
    }

    async fn current_credentials(&self) -> Result<Credentials, SecurityError> {
        Ok(self.inner.lock().credentials.clone())
    }

    async fn resource_manager_principal(&self) -> Result<String, SecurityError> {
        Ok(self.inner.lock().principal.clone())
    }

    async fn delegation_tokens(
        &self,
        service: &str,
        renewer: &str,
    ) -> Result<Vec<Token>, SecurityError> {
        let mut state = self.inner.lock();
        state
            .fetches
            .push((service.to_string(), renewer.to_string()));
        if state.failing_services.iter().any(|s| s == service) {
            return Err(SecurityError::TokenFetch {
                service: service.to_string(),
                message: "injected failure".to_string(),
            });
        }
        Ok(state.tokens.get(service).cloned().unwrap_or_default())
    }
}
