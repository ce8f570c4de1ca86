// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Security platform reached through the resource manager bridge program.
//!
//! Verbs: `login`, `whoami` (`{"principal": ...}`), `credentials` and
//! `delegation-tokens --service S --renewer R` (JSON token arrays).

use super::{SecurityError, SecurityPlatform};
use crate::subprocess::{failure_detail, run_with_timeout, split_command};
use async_trait::async_trait;
use ferry_core::{Credentials, Endpoint, Token};
use serde::Deserialize;
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, Deserialize)]
struct WhoAmI {
    principal: String,
}

#[derive(Clone, Debug)]
pub struct BridgeSecurityPlatform {
    program: String,
    args: Vec<String>,
    endpoint: Endpoint,
    timeout: Duration,
}

impl BridgeSecurityPlatform {
    pub fn new(command: &str, endpoint: Endpoint, timeout: Duration) -> Result<Self, SecurityError> {
        let (program, args) = split_command(command)
            .ok_or_else(|| SecurityError::InvalidCommand(command.to_string()))?;
        Ok(Self {
            program,
            args,
            endpoint,
            timeout,
        })
    }

    async fn run(&self, verb: &str, extra: &[&str]) -> Result<Vec<u8>, String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--rm")
            .arg(self.endpoint.as_str())
            .arg(verb)
            .args(extra);
        let output = run_with_timeout(cmd, self.timeout, &format!("security {}", verb)).await?;
        if !output.status.success() {
            return Err(failure_detail(&output));
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl SecurityPlatform for BridgeSecurityPlatform {
    fn is_security_enabled(&self) -> bool {
        true
    }

    async fn login(&self) -> Result<(), SecurityError> {
        self.run("login", &[]).await.map(|_| ()).map_err(SecurityError::Login)
    }

    async fn current_credentials(&self) -> Result<Credentials, SecurityError> {
        let stdout = self
            .run("credentials", &[])
            .await
            .map_err(SecurityError::Lookup)?;
        let tokens: Vec<Token> = serde_json::from_slice(&stdout)?;
        Ok(tokens.into_iter().collect())
    }

    async fn resource_manager_principal(&self) -> Result<String, SecurityError> {
        let stdout = self.run("whoami", &[]).await.map_err(SecurityError::Lookup)?;
        let who: WhoAmI = serde_json::from_slice(&stdout)?;
        Ok(who.principal)
    }

    async fn delegation_tokens(
        &self,
        service: &str,
        renewer: &str,
    ) -> Result<Vec<Token>, SecurityError> {
        let stdout = self
            .run(
                "delegation-tokens",
                &["--service", service, "--renewer", renewer],
            )
            .await
            .map_err(|message| SecurityError::TokenFetch {
                service: service.to_string(),
                message,
            })?;
        Ok(serde_json::from_slice(&stdout)?)
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
