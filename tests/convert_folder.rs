//! End-to-end conversion of download folders with a fake remux engine
//!
//! These tests exercise discovery, decryption, naming and failure isolation
//! together. The remux engine concatenates decrypted fragments so outputs can
//! be compared byte for byte without ffmpeg.

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use bili_remux::{Converter, Event, TaskOptions};
use common::*;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn options(out: &Path, scratch: &Path) -> TaskOptions {
    TaskOptions {
        output_dir: out.to_path_buf(),
        scratch_dir: Some(scratch.to_path_buf()),
        ..Default::default()
    }
}

#[tokio::test]
async fn converts_collection_with_and_without_sidecars() {
    let downloads = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();

    TaskDir::create(downloads.path(), "61142298")
        .fragment("61142298_da2-1-30080.m4s", b"video-track")
        .fragment("61142298_da2-1-30280.m4s", b"audio-track")
        .caption("dm1");
    TaskDir::create(downloads.path(), "70000001")
        .fragment("1-30080.m4s", b"ownership")
        .sidecar(EPISODE_SIDECAR);

    let remuxer = Arc::new(ConcatRemuxer::default());
    let converter = Converter::with_remuxer(
        TaskOptions {
            page_number: true,
            ..options(out.path(), scratch.path())
        },
        remuxer.clone(),
    )
    .unwrap();

    let report = converter.convert_folder(downloads.path()).await.unwrap();
    assert!(report.is_success(), "failures: {:?}", report.failures);
    assert_eq!(report.succeeded.len(), 2);

    assert_file_contents(
        &out.path().join("61142298/61142298.mp4"),
        b"video-trackaudio-track",
    );
    assert_file_contents(&out.path().join("Rust in Action/2Ownership.mp4"), b"ownership");
    assert_eq!(
        files_under(out.path()),
        vec!["61142298/61142298.mp4", "Rust in Action/2Ownership.mp4"]
    );

    let calls = remuxer.calls();
    let names: Vec<String> = calls[0]
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["61142298_da2-1-30080.m4s", "61142298_da2-1-30280.m4s"]);
}

#[tokio::test]
async fn one_broken_task_does_not_stop_the_others() {
    let downloads = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();

    TaskDir::create(downloads.path(), "100").sidecar(NO_FRAGMENTS_SIDECAR);
    TaskDir::create(downloads.path(), "200").fragment("v.m4s", b"fine");

    let converter =
        Converter::with_remuxer(options(out.path(), scratch.path()), Arc::new(ConcatRemuxer::default()))
            .unwrap();
    let report = converter.convert_folder(downloads.path()).await.unwrap();

    assert_failed_ids(&report, &["100"]);
    assert_eq!(report.failures[0].code, "no_fragments");
    assert_eq!(report.succeeded.len(), 1);
    assert_file_contents(&out.path().join("200/200.mp4"), b"fine");
}

#[tokio::test]
async fn remux_failure_is_isolated_to_its_task() {
    let downloads = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();

    for id in ["1", "2", "3"] {
        TaskDir::create(downloads.path(), id).fragment("a.m4s", id.as_bytes());
    }

    let converter = Converter::with_remuxer(
        options(out.path(), scratch.path()),
        Arc::new(ConcatRemuxer::failing_on("2.mp4")),
    )
    .unwrap();
    let report = converter.convert_folder(downloads.path()).await.unwrap();

    assert_failed_ids(&report, &["2"]);
    assert_eq!(report.failures[0].code, "external_tool_error");
    let ok: Vec<&str> = report.succeeded.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ok, vec!["1", "3"]);
}

#[tokio::test]
async fn rerunning_overwrites_with_identical_output() {
    let downloads = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();

    TaskDir::create(downloads.path(), "42")
        .fragment("a.m4s", &[7u8; 70_000])
        .fragment("b.m4s", b"tail");

    let converter = Converter::with_remuxer(
        TaskOptions {
            buffer_size: 4096,
            ..options(out.path(), scratch.path())
        },
        Arc::new(ConcatRemuxer::default()),
    )
    .unwrap();

    let first = converter.convert_folder(downloads.path()).await.unwrap();
    let first_bytes = std::fs::read(&first.succeeded[0].1).unwrap();
    let second = converter.convert_folder(downloads.path()).await.unwrap();
    let second_bytes = std::fs::read(&second.succeeded[0].1).unwrap();

    assert_eq!(first.succeeded, second.succeeded);
    assert_eq!(first_bytes, second_bytes);
    assert_eq!(first_bytes.len(), 70_000 + 4);
    assert_eq!(files_under(out.path()), vec!["42/42.mp4"]);
}

#[tokio::test]
async fn root_holding_fragments_is_converted_as_one_task() {
    let parent = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();

    let task = TaskDir::at(&parent.path().join("61142298"))
        .fragment("2.m4s", b"second")
        .fragment("1.m4s", b"first");

    let converter =
        Converter::with_remuxer(options(out.path(), scratch.path()), Arc::new(ConcatRemuxer::default()))
            .unwrap();
    let report = converter.convert_folder(task.path()).await.unwrap();

    assert_eq!(report.total(), 1);
    assert_file_contents(&out.path().join("61142298/61142298.mp4"), b"firstsecond");
}

#[tokio::test]
async fn skip_completed_only_trusts_sidecar_status() {
    let downloads = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();

    TaskDir::create(downloads.path(), "61142298").fragment("a.m4s", b"no sidecar");
    TaskDir::create(downloads.path(), "3")
        .fragment("a.m4s", b"finished")
        .sidecar(EPISODE_SIDECAR);
    TaskDir::create(downloads.path(), "2")
        .fragment("a.m4s", b"partial")
        .sidecar(DOWNLOADING_SIDECAR);

    let converter = Converter::with_remuxer(
        TaskOptions {
            skip_completed: true,
            ..options(out.path(), scratch.path())
        },
        Arc::new(ConcatRemuxer::default()),
    )
    .unwrap();
    let report = converter.convert_folder(downloads.path()).await.unwrap();

    let skipped: Vec<&str> = report.skipped.iter().map(|id| id.as_str()).collect();
    assert_eq!(skipped, vec!["3"]);
    assert_eq!(
        files_under(out.path()),
        vec!["2/Half done.mp4", "61142298/61142298.mp4"]
    );
    assert_file_contents(&out.path().join("61142298/61142298.mp4"), b"no sidecar");
}

#[tokio::test]
async fn silence_suppresses_progress_but_not_outcomes() {
    let downloads = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();

    TaskDir::create(downloads.path(), "1").fragment("a.m4s", b"x");
    TaskDir::create(downloads.path(), "2").sidecar(NO_FRAGMENTS_SIDECAR);

    let converter = Converter::with_remuxer(
        TaskOptions {
            silence: true,
            ..options(out.path(), scratch.path())
        },
        Arc::new(ConcatRemuxer::default()),
    )
    .unwrap();
    let mut events = converter.subscribe();
    converter.convert_folder(downloads.path()).await.unwrap();

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(
        !seen
            .iter()
            .any(|e| matches!(e, Event::TaskStarted { .. } | Event::TaskComplete { .. }))
    );
    assert!(seen.iter().any(|e| matches!(e, Event::TaskFailed { .. })));
    assert!(matches!(
        seen.last(),
        Some(Event::RunComplete {
            succeeded: 1,
            failed: 1,
            skipped: 0
        })
    ));
}

#[tokio::test]
async fn scratch_space_is_removed_after_the_run() {
    let downloads = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();

    TaskDir::create(downloads.path(), "1").fragment("a.m4s", b"x");

    let converter =
        Converter::with_remuxer(options(out.path(), scratch.path()), Arc::new(ConcatRemuxer::default()))
            .unwrap();
    converter.convert_folder(downloads.path()).await.unwrap();

    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}
