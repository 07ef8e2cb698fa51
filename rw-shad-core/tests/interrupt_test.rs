//! Ctrl-C handling around external processes
//!
//! These tests signal the test process itself, so they live in their own
//! binary and run serially.

#![cfg(unix)]

mod common;

use common::init_test_logging;
use rw_shad_core::process::{
    watch_interrupts, CommandRunner, CommandSpec, TokioRunner, INTERRUPTED_EXIT_CODE,
};
use serial_test::serial;
use std::time::Duration;
use tempfile::TempDir;

fn send_sigint_to_self() {
    let status = std::process::Command::new("kill")
        .args(["-INT", &std::process::id().to_string()])
        .status()
        .expect("failed to run kill");
    assert!(status.success());
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn test_ctrl_c_after_a_child_run_reaches_the_watcher() {
    init_test_logging();
    let temp_dir = TempDir::new().unwrap();

    // The runner starts listening for SIGINT, which disables the default handler
    TokioRunner
        .run(&CommandSpec::new("true", temp_dir.path()))
        .await
        .unwrap();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let watcher = tokio::spawn(watch_interrupts(move || {
        let _ = tx.send(());
    }));
    tokio::time::sleep(Duration::from_millis(200)).await;

    send_sigint_to_self();

    let received = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
    assert!(
        matches!(received, Ok(Some(()))),
        "Ctrl-C between child runs was not delivered to the watcher"
    );
    watcher.abort();
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn test_ctrl_c_during_a_child_run_kills_the_child() {
    init_test_logging();
    let temp_dir = TempDir::new().unwrap();
    let command = CommandSpec::new("sh", temp_dir.path()).args(["-c", "echo started; sleep 30"]);

    let run = tokio::spawn(async move { TokioRunner.run(&command).await });
    tokio::time::sleep(Duration::from_millis(500)).await;

    send_sigint_to_self();

    let result = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("child was not killed")
        .unwrap();
    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), Some(INTERRUPTED_EXIT_CODE));
    assert!(err.to_string().contains("was interrupted"));
}
