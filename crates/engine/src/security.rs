// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Security token provisioning for the launch request

use crate::error::LauncherError;
use ferry_adapters::{SecurityError, SecurityPlatform};
use ferry_core::{Credentials, Endpoint};
use std::path::Path;

/// Fetch delegation tokens for every filesystem service, with `renewer`
/// as the renewing principal.
pub async fn fetch_filesystem_tokens(
    platform: &dyn SecurityPlatform,
    services: &[String],
    renewer: &str,
) -> Result<Credentials, SecurityError> {
    let mut credentials = Credentials::new();
    for service in services {
        let tokens = platform.delegation_tokens(service, renewer).await?;
        tracing::debug!(service = %service, count = tokens.len(), "fetched delegation tokens");
        for token in tokens {
            credentials.add_token(token);
        }
    }
    Ok(credentials)
}

/// Assemble the serialized credential bundle attached to the master's
/// launch context.
///
/// Ambient credentials are merged with the token file (which wins on
/// collision) and fresh filesystem tokens. Resource-manager tokens for
/// any endpoint other than `rm_endpoint` are dropped.
pub async fn setup_security_tokens(
    platform: &dyn SecurityPlatform,
    fs_services: &[String],
    rm_endpoint: &Endpoint,
    token_file: Option<&Path>,
) -> Result<Vec<u8>, LauncherError> {
    tracing::info!("setting up security tokens for the application master");
    let mut credentials = platform.current_credentials().await?;

    if let Some(path) = token_file {
        tracing::info!(path = %path.display(), "reading tokens from token file");
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| LauncherError::TokenFile {
                path: path.to_path_buf(),
                source,
            })?;
        credentials.merge(Credentials::decode(&bytes)?);
    }

    let renewer = platform.resource_manager_principal().await?;
    credentials.merge(fetch_filesystem_tokens(platform, fs_services, &renewer).await?);

    let credentials = credentials.retain_for_resource_manager(rm_endpoint.as_str());
    tracing::info!(
        tokens = ?credentials.tokens().map(|t| format!("{}@{}", t.kind, t.service)).collect::<Vec<_>>(),
        "attaching credential tokens"
    );
    Ok(credentials.encode())
}

#[cfg(test)]
#[path = "security_tests.rs"]
mod tests;
