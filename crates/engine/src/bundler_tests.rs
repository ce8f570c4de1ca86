// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ferry_adapters::FakeFileSystem;
use ferry_core::test_support::config;
use std::io::Read;
use tempfile::TempDir;

const WORK: &str = "/ferry/apps/ingest/application_1_0001";
const CACHE: &str = "/ferry/jar-cache/2026-02";

fn local_files(names: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in names {
        let path = dir.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }
    dir
}

fn lib_dirs() -> BundleDirs {
    BundleDirs::new(format!("{CACHE}/_libjars"), format!("{WORK}/_libjars"))
}

#[tokio::test]
async fn missing_lib_dir_fails_before_any_upload() {
    let fs = FakeFileSystem::new();
    let bundler = ResourceBundler::new(&fs, false);
    let mut manifest = LocalResourceManifest::new();

    let err = bundler
        .add_lib_jars(Path::new("/nonexistent/lib"), &lib_dirs(), Some(&mut manifest))
        .await
        .unwrap_err();

    assert!(matches!(err, LauncherError::MissingLibDir(_)));
    assert!(fs.uploads().is_empty());
    assert!(manifest.is_empty());
}

#[tokio::test]
async fn lib_jars_go_to_private_dir_without_cache() {
    let lib = local_files(&[("a.jar", "aaa"), ("b.jar", "bb")]);
    let fs = FakeFileSystem::new();
    let bundler = ResourceBundler::new(&fs, false);
    let mut manifest = LocalResourceManifest::new();

    let names = bundler
        .add_lib_jars(lib.path(), &lib_dirs(), Some(&mut manifest))
        .await
        .unwrap();

    assert_eq!(names, vec!["a.jar", "b.jar"]);
    let entry = manifest.get("a.jar").unwrap();
    assert_eq!(entry.destination, PathBuf::from(format!("{WORK}/_libjars/a.jar")));
    assert_eq!(entry.kind, LocalResourceKind::File);
    assert_eq!(entry.size, 3);
    assert!(entry.modified_ms > 0);
    assert_eq!(entry.source.as_deref(), Some(lib.path().join("a.jar").as_path()));
}

#[tokio::test]
async fn cached_jar_of_same_size_is_not_uploaded_again() {
    let lib = local_files(&[("a.jar", "aaa")]);
    let fs = FakeFileSystem::new();
    fs.add_file(&format!("{CACHE}/_libjars/a.jar"), b"aaa");
    let bundler = ResourceBundler::new(&fs, true);
    let mut manifest = LocalResourceManifest::new();

    bundler
        .add_lib_jars(lib.path(), &lib_dirs(), Some(&mut manifest))
        .await
        .unwrap();

    assert!(fs.uploads().is_empty());
    assert_eq!(
        manifest.get("a.jar").unwrap().destination,
        PathBuf::from(format!("{CACHE}/_libjars/a.jar"))
    );
}

#[tokio::test]
async fn upload_retries_until_success() {
    let lib = local_files(&[("a.jar", "aaa")]);
    let fs = FakeFileSystem::new();
    fs.fail_next_uploads(MAX_UPLOAD_ATTEMPTS as usize - 1);
    let bundler = ResourceBundler::new(&fs, false);

    bundler
        .add_lib_jars(lib.path(), &lib_dirs(), None)
        .await
        .unwrap();

    assert_eq!(fs.uploads().len(), MAX_UPLOAD_ATTEMPTS as usize);
    assert!(fs.contains(&format!("{WORK}/_libjars/a.jar")));
}

#[tokio::test]
async fn lib_jar_upload_gives_up_after_max_attempts() {
    let lib = local_files(&[("a.jar", "aaa")]);
    let fs = FakeFileSystem::new();
    fs.fail_next_uploads(100);
    let bundler = ResourceBundler::new(&fs, false);

    let err = bundler
        .add_lib_jars(lib.path(), &lib_dirs(), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LauncherError::Upload { attempts: MAX_UPLOAD_ATTEMPTS, .. }
    ));
    assert_eq!(fs.uploads().len(), MAX_UPLOAD_ATTEMPTS as usize);
}

#[tokio::test]
async fn missing_app_jar_is_skipped() {
    let jars = local_files(&[("app.jar", "app")]);
    let fs = FakeFileSystem::new();
    let bundler = ResourceBundler::new(&fs, false);
    let mut manifest = LocalResourceManifest::new();
    let list = format!(
        "{}, /nonexistent/missing.jar",
        jars.path().join("app.jar").display()
    );
    let dirs = BundleDirs::new("/cache/_appjars", "/private/_appjars");

    bundler
        .add_app_jars(&list, &dirs, Some(&mut manifest))
        .await
        .unwrap();

    assert_eq!(manifest.names().collect::<Vec<_>>(), vec!["app.jar"]);
}

#[tokio::test]
async fn app_jar_that_fails_to_upload_is_skipped() {
    let jars = local_files(&[("app.jar", "app")]);
    let fs = FakeFileSystem::new();
    fs.fail_next_uploads(100);
    let bundler = ResourceBundler::new(&fs, false);
    let mut manifest = LocalResourceManifest::new();
    let list = jars.path().join("app.jar").display().to_string();
    let dirs = BundleDirs::new("/cache/_appjars", "/private/_appjars");

    bundler
        .add_app_jars(&list, &dirs, Some(&mut manifest))
        .await
        .unwrap();

    assert_eq!(fs.uploads().len(), MAX_UPLOAD_ATTEMPTS as usize);
    assert_eq!(manifest.names().count(), 0);
    assert!(!fs.contains("/private/_appjars/app.jar"));
}

#[tokio::test]
async fn existing_local_file_destination_is_reused() {
    let files = local_files(&[("job.conf", "new contents")]);
    let fs = FakeFileSystem::new();
    fs.add_file(&format!("{WORK}/_appfiles/job.conf"), b"old");
    let bundler = ResourceBundler::new(&fs, false);
    let mut manifest = LocalResourceManifest::new();

    bundler
        .add_local_files(
            &files.path().join("job.conf").display().to_string(),
            Path::new(&format!("{WORK}/_appfiles")),
            Some(&mut manifest),
        )
        .await
        .unwrap();

    assert!(fs.uploads().is_empty());
    assert_eq!(
        fs.file_contents(&format!("{WORK}/_appfiles/job.conf")).unwrap(),
        b"old"
    );
    assert_eq!(manifest.get("job.conf").unwrap().size, 3);
}

#[tokio::test]
async fn remote_files_are_registered_without_upload() {
    let fs = FakeFileSystem::new();
    fs.add_file("/shared/conf/site.xml", b"<xml/>");
    fs.add_file("/shared/py/env.zip", b"zip");
    let bundler = ResourceBundler::new(&fs, false);
    let mut manifest = LocalResourceManifest::new();

    bundler
        .add_remote_files("/shared/conf/site.xml", LocalResourceKind::File, &mut manifest)
        .await
        .unwrap();
    bundler
        .add_remote_files("/shared/py/env.zip", LocalResourceKind::Archive, &mut manifest)
        .await
        .unwrap();

    assert!(fs.uploads().is_empty());
    assert_eq!(manifest.get("site.xml").unwrap().source, None);
    assert_eq!(manifest.get("env.zip").unwrap().kind, LocalResourceKind::Archive);
}

#[tokio::test]
async fn missing_remote_file_is_an_error() {
    let fs = FakeFileSystem::new();
    let bundler = ResourceBundler::new(&fs, false);
    let mut manifest = LocalResourceManifest::new();

    let err = bundler
        .add_remote_files("/shared/missing.xml", LocalResourceKind::File, &mut manifest)
        .await
        .unwrap_err();
    assert!(matches!(err, LauncherError::Fs(_)));
}

#[tokio::test]
async fn job_conf_directory_is_packaged_as_archive() {
    let conf = local_files(&[("jobs/a.pull", "a=1"), ("jobs/nested/b.pull", "b=2")]);
    let fs = FakeFileSystem::new();
    let bundler = ResourceBundler::new(&fs, false);
    let mut manifest = LocalResourceManifest::new();

    bundler
        .add_job_conf_package(
            &conf.path().join("jobs"),
            Path::new(&format!("{WORK}/_appfiles")),
            &mut manifest,
        )
        .await
        .unwrap();

    let entry = manifest.get("jobs.tar.zst").unwrap();
    assert_eq!(entry.kind, LocalResourceKind::Archive);
    let packaged = fs
        .file_contents(&format!("{WORK}/_appfiles/jobs.tar.zst"))
        .unwrap();
    let decoder = zstd::stream::Decoder::new(packaged.as_slice()).unwrap();
    let mut archive = tar::Archive::new(decoder);
    let mut found = Vec::new();
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        let path = entry.path().unwrap().display().to_string();
        if path == "jobs/nested/b.pull" {
            let mut body = String::new();
            entry.read_to_string(&mut body).unwrap();
            assert_eq!(body, "b=2");
        }
        found.push(path);
    }
    assert!(found.iter().any(|p| p == "jobs/a.pull"), "{found:?}");
    assert!(found.iter().any(|p| p == "jobs/nested/b.pull"), "{found:?}");
}

#[tokio::test]
async fn missing_job_conf_is_a_package_error() {
    let fs = FakeFileSystem::new();
    let bundler = ResourceBundler::new(&fs, false);
    let mut manifest = LocalResourceManifest::new();

    let err = bundler
        .add_job_conf_package(
            Path::new("/nonexistent/jobs"),
            Path::new("/ferry/_appfiles"),
            &mut manifest,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LauncherError::Package { .. }));
    assert!(fs.uploads().is_empty());
}

#[tokio::test]
async fn master_bundle_uses_cache_for_jars_and_work_dir_for_files() {
    let local = local_files(&[("lib/core.jar", "core"), ("master.jar", "m"), ("app.conf", "c")]);
    let fs = FakeFileSystem::new();
    let mut config = config("ingest");
    config.jar_cache_enabled = true;
    config.lib_jars_dir = Some(local.path().join("lib"));
    config.master_jars = Some(local.path().join("master.jar").display().to_string());
    config.master_files_local = Some(local.path().join("app.conf").display().to_string());
    let bundler = ResourceBundler::new(&fs, true);

    let bundle = bundler
        .bundle_master(&config, Path::new(WORK), Path::new(CACHE))
        .await
        .unwrap();

    assert_eq!(
        bundle.lib_jar_names.iter().collect::<Vec<_>>(),
        vec!["core.jar"]
    );
    let dest = |name: &str| bundle.manifest.get(name).unwrap().destination.clone();
    assert_eq!(dest("core.jar"), PathBuf::from(format!("{CACHE}/_libjars/core.jar")));
    assert_eq!(
        dest("master.jar"),
        PathBuf::from(format!("{CACHE}/_appmaster/_appjars/master.jar"))
    );
    assert_eq!(dest("app.conf"), PathBuf::from(format!("{WORK}/_appfiles/app.conf")));
}

#[tokio::test]
async fn container_bundle_uploads_without_registering() {
    let local = local_files(&[("worker.jar", "w"), ("worker.conf", "c")]);
    let fs = FakeFileSystem::new();
    let mut config = config("ingest");
    config.container_jars = Some(local.path().join("worker.jar").display().to_string());
    config.container_files_local = Some(local.path().join("worker.conf").display().to_string());
    let bundler = ResourceBundler::new(&fs, false);

    bundler
        .bundle_containers(&config, Path::new(WORK), Path::new(WORK))
        .await
        .unwrap();

    assert!(fs.contains(&format!("{WORK}/_container/_appjars/worker.jar")));
    assert!(fs.contains(&format!("{WORK}/_container/_appfiles/worker.conf")));
}
