// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Building and submitting a new application.

use super::Launcher;
use crate::bundler::ResourceBundler;
use crate::command::build_master_command;
use crate::env::master_environment;
use crate::error::LauncherError;
use crate::jar_cache::{per_month_cache_path, period_name, retain_k_latest};
use crate::resources::negotiate;
use crate::security::setup_security_tokens;
use crate::timeout::run_with_timeout;
use ferry_adapters::{FileSystem, FileSystemProvider, NotifyAdapter, ResourceManagerClient};
use ferry_core::{
    AccessType, ApplicationId, Clock, LaunchContext, Resource, SubmissionContext,
    APPLICATION_TYPE,
};
use serde_json::json;
use std::collections::BTreeMap;

/// Launch records, keyed by application id and aliased by application name
pub(crate) const LAUNCHES_STORE: &str = "launches";

impl<R, P, N, C> Launcher<R, P, N, C>
where
    R: ResourceManagerClient,
    P: FileSystemProvider,
    N: NotifyAdapter,
    C: Clock,
{
    /// Submit a new application through the active client and return the
    /// id the resource manager accepted it under.
    pub(crate) async fn submit(&self, fs: &P::Fs) -> Result<ApplicationId, LauncherError> {
        let config = &self.inner.config;
        let client = self.inner.clients.active().cloned().ok_or_else(|| {
            LauncherError::InvalidSetting("no resource manager endpoints configured".to_string())
        })?;
        let rpc_timeout = config.rpc_timeout();

        let created = run_with_timeout(
            client.create_application(),
            rpc_timeout,
            "creating application",
        )
        .await??;
        let application_id = created.application_id;
        let loggable_id = config.loggable_id(application_id.as_str());
        tracing::info!(application_id = %loggable_id, endpoint = %client.endpoint(), "created application");

        let resource = negotiate(
            Resource::new(config.master_memory_mbs, config.master_vcores),
            created.maximum_capability,
        );

        let now = self.inner.clock.now();
        let work_dir = config.app_work_dir(application_id.as_str());
        let jars_root = if config.jar_cache_enabled {
            per_month_cache_path(&config.jar_cache_root, now)
        } else {
            work_dir.clone()
        };
        let bundler = ResourceBundler::new(fs, config.jar_cache_enabled);
        let master = bundler.bundle_master(config, &work_dir, &jars_root).await?;

        let command = build_master_command(
            config,
            application_id.as_str(),
            resource.memory_mbs,
            &master.lib_jar_names,
            self.inner.clock.epoch_ms(),
        )?;

        if config.jar_cache_enabled {
            let retained = retain_k_latest(
                fs,
                &config.jar_cache_root,
                config.jar_cache_retained_periods,
                &period_name(now),
            )
            .await;
            if !retained {
                tracing::warn!(root = %config.jar_cache_root.display(), "failed to delete older jar cache directories");
            }
        }

        let acls = BTreeMap::from([(AccessType::ViewApp, config.view_acl.clone())]);

        let tokens = if self.inner.security.is_security_enabled() {
            let mut services = vec![fs.uri()];
            services.extend(config.other_namenodes.iter().cloned());
            let tokens = setup_security_tokens(
                self.inner.security.as_ref(),
                &services,
                client.endpoint(),
                self.inner.token_file_location.as_deref(),
            )
            .await?;
            Some(tokens)
        } else {
            None
        };

        let context = SubmissionContext {
            application_id: application_id.clone(),
            application_name: config.application_name.clone(),
            application_type: APPLICATION_TYPE.to_string(),
            queue: config.queue.clone(),
            priority: 0,
            max_attempts: config.max_attempts,
            tags: config.application_tags(),
            resource,
            master: LaunchContext {
                local_resources: master.manifest,
                environment: master_environment(&config.application_name, application_id.as_str()),
                commands: vec![command],
                acls,
                tokens,
            },
        };

        bundler
            .bundle_containers(config, &work_dir, &jars_root)
            .await?;

        tracing::info!(application_id = %loggable_id, "submitting application");
        let submitted = run_with_timeout(
            client.submit_application(&context),
            rpc_timeout,
            "submitting application",
        )
        .await??;
        if submitted != application_id {
            tracing::error!(
                created = %application_id,
                submitted = %submitted,
                "resource manager returned a different application id"
            );
        }

        // Resources were staged under the created id
        *self.inner.staged_work_dir.lock() = Some(work_dir);

        let report = run_with_timeout(
            client.application_report(&submitted),
            rpc_timeout,
            "fetching application report",
        )
        .await??;
        if report.application_id != application_id {
            tracing::error!(
                created = %application_id,
                reported = %report.application_id,
                "application report carries a different application id"
            );
        }
        tracing::info!(
            name = %report.name,
            tracking_url = %report.tracking_url,
            user = %report.user,
            queue = %report.queue,
            "application submitted"
        );

        self.record_launch(&submitted, client.endpoint().as_str());
        Ok(submitted)
    }

    /// Remember the submission in the state store. Failures are logged.
    fn record_launch(&self, application_id: &ApplicationId, endpoint: &str) {
        let Some(store) = &self.inner.state_store else {
            return;
        };
        let name = &self.inner.config.application_name;
        let record = json!({
            "application_id": application_id.as_str(),
            "application_name": name,
            "resource_manager": endpoint,
            "submitted_at_ms": self.inner.clock.epoch_ms(),
        });
        let key = application_id.as_str();
        let recorded = store
            .put(LAUNCHES_STORE, key, &record)
            .and_then(|()| store.create_alias(LAUNCHES_STORE, key, name));
        if let Err(e) = recorded {
            tracing::warn!(error = %e, "failed to record launch");
        }
    }
}
