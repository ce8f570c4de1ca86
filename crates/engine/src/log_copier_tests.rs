// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ferry_adapters::FakeFileSystem;

const LOGS: &str = "/ferry/apps/ingest/application_1_0001/_applogs";

fn copier(fs: &FakeFileSystem, sink: &Path) -> LogCopier<FakeFileSystem> {
    LogCopier::new(fs.clone(), LOGS, sink, Duration::from_secs(60))
}

#[tokio::test]
async fn copies_only_log_files_preserving_layout() {
    let fs = FakeFileSystem::new();
    fs.add_file(&format!("{LOGS}/container_01/ClusterMaster.stdout"), b"out");
    fs.add_file(&format!("{LOGS}/container_01/ClusterMaster.stderr"), b"err");
    fs.add_file(&format!("{LOGS}/container_01/gc.log"), b"gc");
    let sink = tempfile::tempdir().unwrap();

    assert_eq!(copier(&fs, sink.path()).copy_once().await.unwrap(), 2);

    let copied = sink.path().join("container_01/ClusterMaster.stdout");
    assert_eq!(std::fs::read(copied).unwrap(), b"out");
    assert!(!sink.path().join("container_01/gc.log").exists());
}

#[tokio::test]
async fn unchanged_files_are_not_copied_again() {
    let fs = FakeFileSystem::new();
    fs.add_file(&format!("{LOGS}/a.stdout"), b"one");
    let sink = tempfile::tempdir().unwrap();
    let copier = copier(&fs, sink.path());

    assert_eq!(copier.copy_once().await.unwrap(), 1);
    assert_eq!(copier.copy_once().await.unwrap(), 0);

    fs.add_file(&format!("{LOGS}/a.stdout"), b"one two");
    assert_eq!(copier.copy_once().await.unwrap(), 1);
    assert_eq!(std::fs::read(sink.path().join("a.stdout")).unwrap(), b"one two");
}

#[tokio::test]
async fn missing_log_dir_copies_nothing() {
    let fs = FakeFileSystem::new();
    let sink = tempfile::tempdir().unwrap();
    assert_eq!(copier(&fs, sink.path()).copy_once().await.unwrap(), 0);
}

#[tokio::test]
async fn stop_makes_a_final_pass() {
    let fs = FakeFileSystem::new();
    let sink = tempfile::tempdir().unwrap();
    let copier = copier(&fs, sink.path());

    copier.start().await.unwrap();
    fs.add_file(&format!("{LOGS}/late.stderr"), b"bye");
    copier.stop().await.unwrap();

    assert_eq!(std::fs::read(sink.path().join("late.stderr")).unwrap(), b"bye");
}

#[yare::parameterized(
    stdout = { "x/Master.stdout", true },
    stderr = { "Master.stderr", true },
    plain  = { "Master.log", false },
    none   = { "stdout", false },
)]
fn log_file_filter(path: &str, expected: bool) {
    assert_eq!(is_log_file(Path::new(path)), expected);
}
