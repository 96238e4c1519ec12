//! Execution of generated scripts through each framework's CLI.
//!
//! Commands run to completion with no timeout. A test runner that never exits
//! blocks the repair loop, and with it the whole driver.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::framework::Framework;

/// Outcome of one external run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Whether the process exited with status zero
    pub success: bool,

    /// Stdout on success; stderr (or the spawn error) on failure
    pub output: String,

    /// Exit code, when the process ran and exited normally
    pub exit_code: Option<i32>,
}

impl ExecutionResult {
    pub fn passed(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            exit_code: Some(0),
        }
    }

    pub fn failed(output: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self {
            success: false,
            output: output.into(),
            exit_code,
        }
    }
}

/// Trait for script executors
///
/// Implementations:
/// - `ShellExecutor` runs the framework's CLI
/// - scripted executors in tests
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    /// Run the script at `script_path` for `framework` and wait for it
    async fn execute(&self, framework: Framework, script_path: &Path) -> ExecutionResult;
}

/// Runs each framework's command through the system shell
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    script_dir: PathBuf,
}

impl ShellExecutor {
    /// `script_dir` is the directory holding the per-framework subdirectories
    pub fn new(script_dir: impl Into<PathBuf>) -> Self {
        Self {
            script_dir: script_dir.into(),
        }
    }
}

#[async_trait]
impl ScriptExecutor for ShellExecutor {
    async fn execute(&self, framework: Framework, script_path: &Path) -> ExecutionResult {
        let file_name = script_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| framework.spec().output_file.to_string());
        let command = framework.run_command(&file_name);
        let working_dir = framework.working_dir(&self.script_dir);

        info!("Running `{}` in {}", command, working_dir.display());
        run_shell(&command, &working_dir).await
    }
}

/// Run a shell command in `working_dir` and capture its result.
///
/// Failure output is stderr, falling back to stdout when stderr is empty.
pub async fn run_shell(command: &str, working_dir: &Path) -> ExecutionResult {
    let output = shell_command(command)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match output {
        Ok(output) => output,
        Err(e) => {
            return ExecutionResult::failed(
                format!("Failed to run `{}` in {}: {}", command, working_dir.display(), e),
                None,
            );
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    debug!(
        "`{}` exited with {:?} ({} bytes stdout, {} bytes stderr)",
        command,
        output.status.code(),
        stdout.len(),
        stderr.len()
    );

    if output.status.success() {
        ExecutionResult::passed(stdout)
    } else {
        let text = if stderr.trim().is_empty() { stdout } else { stderr };
        let text = if text.trim().is_empty() {
            format!("`{}` exited with {}", command, output.status)
        } else {
            text
        };
        ExecutionResult::failed(text, output.status.code())
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_constructors() {
        let ok = ExecutionResult::passed("1 passed");
        assert!(ok.success);
        assert_eq!(ok.exit_code, Some(0));

        let err = ExecutionResult::failed("boom", Some(1));
        assert!(!err.success);
        assert_eq!(err.output, "boom");
    }

    #[test]
    fn test_result_serializes() {
        let json = serde_json::to_value(ExecutionResult::failed("x", None)).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["exit_code"].is_null());
    }
}
