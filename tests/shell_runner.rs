//! Shell execution of real commands.
#![cfg(unix)]

use std::fs;

use test_forge::{Framework, ScriptExecutor, ShellExecutor, run_shell};

#[tokio::test]
async fn test_success_captures_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_shell("echo '2 passed'", dir.path()).await;

    assert!(result.success);
    assert_eq!(result.output, "2 passed\n");
    assert_eq!(result.exit_code, Some(0));
}

#[tokio::test]
async fn test_failure_captures_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_shell("echo progress; echo 'Timeout 30000ms exceeded' 1>&2; exit 3", dir.path()).await;

    assert!(!result.success);
    assert_eq!(result.output, "Timeout 30000ms exceeded\n");
    assert_eq!(result.exit_code, Some(3));
}

#[tokio::test]
async fn test_failure_without_stderr_falls_back_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_shell("echo '1 failed'; exit 1", dir.path()).await;

    assert!(!result.success);
    assert_eq!(result.output, "1 failed\n");
}

#[tokio::test]
async fn test_runs_in_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("marker.txt"), "here").unwrap();

    let result = run_shell("cat marker.txt", dir.path()).await;
    assert!(result.success);
    assert_eq!(result.output, "here");
}

#[tokio::test]
async fn test_missing_working_directory_reports_spawn_error() {
    let dir = tempfile::tempdir().unwrap();
    let executor = ShellExecutor::new(dir.path().join("absent"));
    let script = Framework::Playwright.output_path(&dir.path().join("absent"));

    let result = executor.execute(Framework::Playwright, &script).await;

    assert!(!result.success);
    assert_eq!(result.exit_code, None);
    assert!(result.output.contains("npx playwright test generated.spec.ts"));
}
