// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource bundler: stages jars and files on distributed storage and
//! builds the local-resource manifest attached to a launch request.
//!
//! Layout under the application work dir (`<work_dir_root>/<name>/<id>`):
//!
//! ```text
//! _libjars/              shared library jars (private copy)
//! _appfiles/             master local files and the job-conf package
//! _appmaster/_appjars/   master jars (private copy)
//! _container/_appjars/   container jars (private copy)
//! _container/_appfiles/  container local files
//! _applogs/              container logs, collected by the log copier
//! ```
//!
//! With the jar cache enabled, jars go to the same relative paths under
//! the current cache period instead and are shared across launches.

use crate::error::LauncherError;
use ferry_adapters::FileSystem;
use ferry_core::{
    split_list, LauncherConfig, LocalResource, LocalResourceKind, LocalResourceManifest,
};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tar::Builder;
use walkdir::WalkDir;
use zstd::stream::Encoder;

/// Upload attempts per file before giving up
pub const MAX_UPLOAD_ATTEMPTS: u32 = 5;

pub const APP_MASTER_DIR: &str = "_appmaster";
pub const CONTAINER_DIR: &str = "_container";
pub const LIB_JARS_DIR: &str = "_libjars";
pub const APP_JARS_DIR: &str = "_appjars";
pub const APP_FILES_DIR: &str = "_appfiles";
pub const APP_LOGS_DIR: &str = "_applogs";

const JOB_CONF_PACKAGE_SUFFIX: &str = ".tar.zst";

/// Destination pair for one class of jars
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleDirs {
    /// Shared jar cache directory, used when the cache is enabled
    pub cache: PathBuf,
    /// Execution-private directory under the application work dir
    pub private: PathBuf,
}

impl BundleDirs {
    pub fn new(cache: impl Into<PathBuf>, private: impl Into<PathBuf>) -> Self {
        Self {
            cache: cache.into(),
            private: private.into(),
        }
    }
}

/// Resources staged for the application master
#[derive(Debug, Clone, Default)]
pub struct MasterBundle {
    pub manifest: LocalResourceManifest,
    /// Names of the shared library jars, passed to the master's classpath
    pub lib_jar_names: BTreeSet<String>,
}

/// Stages local and remote resources on one filesystem handle
pub struct ResourceBundler<'a, F: FileSystem> {
    fs: &'a F,
    jar_cache_enabled: bool,
}

impl<'a, F: FileSystem> ResourceBundler<'a, F> {
    pub fn new(fs: &'a F, jar_cache_enabled: bool) -> Self {
        Self {
            fs,
            jar_cache_enabled,
        }
    }

    /// Stage everything the application master needs.
    ///
    /// `jars_root` is the current cache period when the jar cache is
    /// enabled, otherwise the application work dir.
    pub async fn bundle_master(
        &self,
        config: &LauncherConfig,
        app_work_dir: &Path,
        jars_root: &Path,
    ) -> Result<MasterBundle, LauncherError> {
        let mut bundle = MasterBundle::default();
        let manifest = &mut bundle.manifest;
        let master_dirs = BundleDirs::new(
            jars_root.join(APP_MASTER_DIR).join(APP_JARS_DIR),
            app_work_dir.join(APP_MASTER_DIR).join(APP_JARS_DIR),
        );
        let files_dir = app_work_dir.join(APP_FILES_DIR);

        if let Some(lib_dir) = &config.lib_jars_dir {
            let dirs = BundleDirs::new(
                jars_root.join(LIB_JARS_DIR),
                app_work_dir.join(LIB_JARS_DIR),
            );
            let names = self.add_lib_jars(lib_dir, &dirs, Some(&mut *manifest)).await?;
            tracing::info!(
                count = names.len(),
                cache = %dirs.cache.display(),
                private = %dirs.private.display(),
                "added lib jars"
            );
            bundle.lib_jar_names.extend(names);
        }
        if let Some(jars) = &config.master_jars {
            self.add_app_jars(jars, &master_dirs, Some(&mut *manifest))
                .await?;
        }
        if let Some(files) = &config.master_files_local {
            self.add_local_files(files, &files_dir, Some(&mut *manifest))
                .await?;
        }
        if let Some(files) = &config.master_files_remote {
            self.add_remote_files(files, LocalResourceKind::File, manifest)
                .await?;
        }
        if let Some(zips) = &config.master_zips_remote {
            self.add_remote_files(zips, LocalResourceKind::Archive, manifest)
                .await?;
        }
        if let Some(conf) = &config.job_conf_path {
            self.add_job_conf_package(conf, &files_dir, manifest).await?;
        }
        Ok(bundle)
    }

    /// Stage container jars and files. Containers find them by convention,
    /// so nothing is registered.
    pub async fn bundle_containers(
        &self,
        config: &LauncherConfig,
        app_work_dir: &Path,
        jars_root: &Path,
    ) -> Result<(), LauncherError> {
        let container_dir = app_work_dir.join(CONTAINER_DIR);
        if let Some(jars) = &config.container_jars {
            let dirs = BundleDirs::new(
                jars_root.join(CONTAINER_DIR).join(APP_JARS_DIR),
                container_dir.join(APP_JARS_DIR),
            );
            self.add_app_jars(jars, &dirs, None).await?;
        }
        if let Some(files) = &config.container_files_local {
            self.add_local_files(files, &container_dir.join(APP_FILES_DIR), None)
                .await?;
        }
        Ok(())
    }

    /// Upload every file in `src_dir`. The directory itself is required.
    ///
    /// Returns the names of the jars that were registered.
    pub async fn add_lib_jars(
        &self,
        src_dir: &Path,
        dirs: &BundleDirs,
        mut manifest: Option<&mut LocalResourceManifest>,
    ) -> Result<Vec<String>, LauncherError> {
        if !tokio::fs::try_exists(src_dir).await.unwrap_or(false) {
            return Err(LauncherError::MissingLibDir(src_dir.to_path_buf()));
        }
        let mut jars = Vec::new();
        let mut entries = tokio::fs::read_dir(src_dir)
            .await
            .map_err(|e| local_io(src_dir, e))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| local_io(src_dir, e))? {
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if is_file {
                jars.push(entry.path());
            }
        }
        jars.sort();

        let mut names = Vec::new();
        for jar in jars {
            let Some(name) = file_name(&jar) else { continue };
            let dest = self.jar_destination(&name, dirs);
            self.upload_jar(&jar, &dest).await?;
            if let Some(manifest) = manifest.as_deref_mut() {
                self.register(manifest, &name, Some(&jar), &dest, LocalResourceKind::File)
                    .await?;
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Upload a comma-separated list of local jars. Missing or
    /// unuploadable jars are logged and skipped.
    pub async fn add_app_jars(
        &self,
        jar_list: &str,
        dirs: &BundleDirs,
        mut manifest: Option<&mut LocalResourceManifest>,
    ) -> Result<(), LauncherError> {
        for jar in split_list(jar_list).map(PathBuf::from) {
            let Some(name) = file_name(&jar) else { continue };
            if !is_local_file(&jar).await {
                tracing::warn!(path = %jar.display(), "app jar does not exist, skipping");
                continue;
            }
            let dest = self.jar_destination(&name, dirs);
            if let Err(e) = self.upload_jar(&jar, &dest).await {
                tracing::warn!(path = %jar.display(), error = %e, "failed to upload app jar");
                continue;
            }
            if let Some(manifest) = manifest.as_deref_mut() {
                self.register(manifest, &name, Some(&jar), &dest, LocalResourceKind::File)
                    .await?;
            }
        }
        Ok(())
    }

    /// Upload a comma-separated list of local files into `dest_dir`.
    ///
    /// A file already present at the destination is not uploaded again.
    pub async fn add_local_files(
        &self,
        file_list: &str,
        dest_dir: &Path,
        mut manifest: Option<&mut LocalResourceManifest>,
    ) -> Result<(), LauncherError> {
        for file in split_list(file_list).map(PathBuf::from) {
            let Some(name) = file_name(&file) else { continue };
            if !is_local_file(&file).await {
                tracing::warn!(path = %file.display(), "requested file does not exist, skipping");
                continue;
            }
            let dest = dest_dir.join(&name);
            if self.fs.exists(&dest).await? {
                tracing::info!(path = %dest.display(), "destination exists, skipping upload");
            } else {
                self.fs.copy_from_local(&file, &dest).await?;
            }
            if let Some(manifest) = manifest.as_deref_mut() {
                self.register(manifest, &name, Some(&file), &dest, LocalResourceKind::File)
                    .await?;
            }
        }
        Ok(())
    }

    /// Register files that already live on distributed storage
    pub async fn add_remote_files(
        &self,
        path_list: &str,
        kind: LocalResourceKind,
        manifest: &mut LocalResourceManifest,
    ) -> Result<(), LauncherError> {
        for path in split_list(path_list).map(PathBuf::from) {
            let Some(name) = file_name(&path) else { continue };
            self.register(manifest, &name, None, &path, kind).await?;
        }
        Ok(())
    }

    /// Archive the job configuration at `src` and register it as an
    /// archive resource named `<src name>.tar.zst`.
    pub async fn add_job_conf_package(
        &self,
        src: &Path,
        dest_dir: &Path,
        manifest: &mut LocalResourceManifest,
    ) -> Result<(), LauncherError> {
        let Some(src_name) = file_name(src) else {
            return Err(package_error(src, "job configuration path has no file name"));
        };
        let name = format!("{src_name}{JOB_CONF_PACKAGE_SUFFIX}");
        let staging = std::env::temp_dir().join(format!("ferry-{}-{}", uuid::Uuid::new_v4(), name));

        let (src_owned, staging_owned, root) = (src.to_path_buf(), staging.clone(), src_name.clone());
        let packaged = tokio::task::spawn_blocking(move || {
            create_package(&src_owned, &root, &staging_owned)
        })
        .await
        .map_err(|e| package_error(src, &e.to_string()))?;

        let dest = dest_dir.join(&name);
        let uploaded = match packaged {
            Ok(()) => self.fs.copy_from_local(&staging, &dest).await.map_err(Into::into),
            Err(e) => Err(e),
        };
        let _ = tokio::fs::remove_file(&staging).await;
        uploaded?;

        self.register(manifest, &name, Some(src), &dest, LocalResourceKind::Archive)
            .await
    }

    fn jar_destination(&self, name: &str, dirs: &BundleDirs) -> PathBuf {
        if self.jar_cache_enabled {
            dirs.cache.join(name)
        } else {
            dirs.private.join(name)
        }
    }

    /// Upload with bounded retry. A destination of the same size is reused.
    async fn upload_jar(&self, src: &Path, dest: &Path) -> Result<(), LauncherError> {
        let local_len = tokio::fs::metadata(src)
            .await
            .map_err(|e| local_io(src, e))?
            .len();
        if let Ok(existing) = self.fs.status(dest).await {
            if existing.len == local_len {
                tracing::debug!(path = %dest.display(), "jar already staged, skipping upload");
                return Ok(());
            }
        }

        let mut last_error = String::new();
        for attempt in 1..=MAX_UPLOAD_ATTEMPTS {
            match self.fs.copy_from_local(src, dest).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        path = %src.display(),
                        dest = %dest.display(),
                        attempt,
                        error = %e,
                        "jar upload failed"
                    );
                    last_error = e.to_string();
                }
            }
        }
        Err(LauncherError::Upload {
            source_path: src.to_path_buf(),
            attempts: MAX_UPLOAD_ATTEMPTS,
            message: last_error,
        })
    }

    async fn register(
        &self,
        manifest: &mut LocalResourceManifest,
        name: &str,
        source: Option<&Path>,
        dest: &Path,
        kind: LocalResourceKind,
    ) -> Result<(), LauncherError> {
        let status = self.fs.status(dest).await?;
        manifest.insert(
            name,
            LocalResource {
                source: source.map(Path::to_path_buf),
                destination: dest.to_path_buf(),
                kind,
                size: status.len,
                modified_ms: status.modified_ms,
            },
        );
        Ok(())
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

async fn is_local_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

fn local_io(path: &Path, e: std::io::Error) -> LauncherError {
    package_error(path, &e.to_string())
}

fn package_error(path: &Path, message: &str) -> LauncherError {
    LauncherError::Package {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Write a zstd-compressed tarball of `src` (file or directory) with
/// every entry under `root_name/`.
fn create_package(src: &Path, root_name: &str, out: &Path) -> Result<(), LauncherError> {
    let file = File::create(out).map_err(|e| local_io(out, e))?;
    let encoder = Encoder::new(file, 0).map_err(|e| local_io(out, e))?;
    let mut builder = Builder::new(encoder);

    if src.is_file() {
        builder
            .append_path_with_name(src, root_name)
            .map_err(|e| local_io(src, e))?;
    } else if src.is_dir() {
        let mut entries: Vec<(PathBuf, bool)> = Vec::new();
        for entry in WalkDir::new(src).follow_links(false) {
            let entry = entry.map_err(|e| package_error(src, &e.to_string()))?;
            let Ok(rel) = entry.path().strip_prefix(src) else { continue };
            if rel.as_os_str().is_empty() || entry.file_type().is_symlink() {
                continue;
            }
            entries.push((rel.to_path_buf(), entry.file_type().is_dir()));
        }
        entries.sort();

        builder
            .append_dir(root_name, src)
            .map_err(|e| local_io(src, e))?;
        for (rel, is_dir) in entries {
            let dest = Path::new(root_name).join(&rel);
            let path = src.join(&rel);
            let appended = if is_dir {
                builder.append_dir(dest, &path)
            } else {
                builder.append_path_with_name(&path, dest)
            };
            appended.map_err(|e| local_io(&path, e))?;
        }
    } else {
        return Err(package_error(src, "job configuration path does not exist"));
    }

    let encoder = builder.into_inner().map_err(|e| local_io(out, e))?;
    encoder.finish().map_err(|e| local_io(out, e))?;
    Ok(())
}

#[cfg(test)]
#[path = "bundler_tests.rs"]
mod tests;
