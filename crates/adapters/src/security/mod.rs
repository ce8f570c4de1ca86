// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Security platform adapters (principal, ambient credentials, delegation tokens)

mod bridge;

pub use bridge::BridgeSecurityPlatform;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSecurityPlatform;

use async_trait::async_trait;
use ferry_core::{Credentials, Token};
use thiserror::Error;

/// Errors from security platform operations
#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("login failed: {0}")]
    Login(String),
    #[error("credential lookup failed: {0}")]
    Lookup(String),
    #[error("delegation token fetch for {service} failed: {message}")]
    TokenFetch { service: String, message: String },
    #[error("malformed security response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid bridge command: {0:?}")]
    InvalidCommand(String),
}

/// The cluster's authentication platform
#[async_trait]
pub trait SecurityPlatform: Send + Sync + 'static {
    fn is_security_enabled(&self) -> bool;

    async fn login(&self) -> Result<(), SecurityError>;

    /// Tokens held by the current principal
    async fn current_credentials(&self) -> Result<Credentials, SecurityError>;

    /// Principal used as renewer for delegation tokens
    async fn resource_manager_principal(&self) -> Result<String, SecurityError>;

    /// Fetch delegation tokens for a filesystem service
    async fn delegation_tokens(
        &self,
        service: &str,
        renewer: &str,
    ) -> Result<Vec<Token>, SecurityError>;
}

/// Platform for clusters without authentication
#[derive(Clone, Copy, Debug, Default)]
pub struct InsecurePlatform;

#[async_trait]
impl SecurityPlatform for InsecurePlatform {
    fn is_security_enabled(&self) -> bool {
        false
    }

    async fn login(&self) -> Result<(), SecurityError> {
        Ok(())
    }

    async fn current_credentials(&self) -> Result<Credentials, SecurityError> {
        Ok(Credentials::new())
    }

    async fn resource_manager_principal(&self) -> Result<String, SecurityError> {
        Ok(String::new())
    }

    async fn delegation_tokens(
        &self,
        _service: &str,
        _renewer: &str,
    ) -> Result<Vec<Token>, SecurityError> {
        Ok(Vec::new())
    }
}
