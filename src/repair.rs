//! Generate → execute → repair loop for a single framework.
//!
//! ```text
//!   Idle ──► Generating ──► Executing ──► Succeeded
//!               ▲   │           │
//!               │   ▼ (fail)    ▼ (fail)
//!               └── attempts left? ──no──► ExhaustedAttempts
//! ```
//!
//! Each failed attempt, whether generation or execution failed, hands its error
//! text verbatim to the next prompt. Errors never escape the loop; the caller
//! always gets a [`FrameworkOutcome`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::framework::Framework;
use crate::prompt::{GenerationRequest, build_prompt};
use crate::runner::ScriptExecutor;
use crate::synth::Synthesizer;

/// Controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Generating,
    Executing,
    Succeeded,
    ExhaustedAttempts,
}

/// Why an attempt failed. The message is fed to the next prompt as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum AttemptFailure {
    /// The model call failed or produced no usable script
    Generation(String),
    /// The script could not be written, or its run exited non-zero
    Execution(String),
}

impl AttemptFailure {
    pub fn message(&self) -> &str {
        match self {
            AttemptFailure::Generation(msg) | AttemptFailure::Execution(msg) => msg,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AttemptFailure::Generation(_) => "generation",
            AttemptFailure::Execution(_) => "execution",
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.kind(), self.message())
    }
}

/// Terminal status of a framework's loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Succeeded,
    ExhaustedAttempts,
}

/// What happened for one framework
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworkOutcome {
    pub framework: Framework,

    pub status: OutcomeStatus,

    /// Number of attempts started (1-based count)
    pub attempts: u32,

    /// Captured stdout of the passing run
    pub output: Option<String>,

    /// Every failed attempt, oldest first
    pub failures: Vec<AttemptFailure>,

    /// Fixed location of the framework's script
    pub script_path: PathBuf,
}

impl FrameworkOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == OutcomeStatus::Succeeded
    }

    pub fn last_failure(&self) -> Option<&AttemptFailure> {
        self.failures.last()
    }
}

/// Runs the repair loop for one framework at a time
pub struct RepairLoop {
    synthesizer: Synthesizer,
    executor: Arc<dyn ScriptExecutor>,
    /// Where scripts are written
    script_dir: PathBuf,
    /// How the script location is described to the model
    prompt_dir: PathBuf,
    max_attempts: u32,
}

impl RepairLoop {
    /// `max_attempts` below 1 is treated as 1
    pub fn new(
        synthesizer: Synthesizer,
        executor: Arc<dyn ScriptExecutor>,
        script_dir: impl Into<PathBuf>,
        max_attempts: u32,
    ) -> Self {
        let script_dir = script_dir.into();
        Self {
            synthesizer,
            executor,
            prompt_dir: script_dir.clone(),
            script_dir,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Describe the script location to the model relative to this directory
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = dir.into();
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn model_name(&self) -> &str {
        self.synthesizer.model_name()
    }

    pub fn script_path(&self, framework: Framework) -> PathBuf {
        framework.output_path(&self.script_dir)
    }

    /// Run attempts until one passes or the limit is reached
    #[tracing::instrument(name = "repair", skip_all, fields(framework = %framework))]
    pub async fn run(&self, framework: Framework, scenario: &str, manifest: &str) -> FrameworkOutcome {
        let script_path = self.script_path(framework);
        let mut state = LoopState::Idle;
        let mut failures: Vec<AttemptFailure> = Vec::new();

        for attempt in 0..self.max_attempts {
            advance(&mut state, LoopState::Generating, attempt);
            info!(
                "{}: attempt {}/{} using {}",
                framework.display_name(),
                attempt + 1,
                self.max_attempts,
                self.synthesizer.model_name()
            );

            let mut request = GenerationRequest::new(framework, scenario);
            if let Some(previous) = failures.last() {
                request = request.with_prior_error(previous.message());
            }

            match self.attempt(&request, manifest, &script_path, &mut state, attempt).await {
                Ok(output) => {
                    advance(&mut state, LoopState::Succeeded, attempt);
                    info!(
                        "{}: tests passed on attempt {}\n{}",
                        framework.display_name(),
                        attempt + 1,
                        output.trim_end()
                    );
                    return FrameworkOutcome {
                        framework,
                        status: OutcomeStatus::Succeeded,
                        attempts: attempt + 1,
                        output: Some(output),
                        failures,
                        script_path,
                    };
                }
                Err(failure) => {
                    warn!(
                        "{}: attempt {} {}",
                        framework.display_name(),
                        attempt + 1,
                        failure
                    );
                    failures.push(failure);
                }
            }
        }

        advance(&mut state, LoopState::ExhaustedAttempts, self.max_attempts - 1);
        if let Some(last) = failures.last() {
            error!(
                "{}: giving up after {} attempts; last {}",
                framework.display_name(),
                self.max_attempts,
                last
            );
        }

        FrameworkOutcome {
            framework,
            status: OutcomeStatus::ExhaustedAttempts,
            attempts: self.max_attempts,
            output: None,
            failures,
            script_path,
        }
    }

    /// One generate → write → execute cycle
    async fn attempt(
        &self,
        request: &GenerationRequest,
        manifest: &str,
        script_path: &Path,
        state: &mut LoopState,
        attempt: u32,
    ) -> Result<String, AttemptFailure> {
        let prompt = build_prompt(request, manifest, &self.prompt_dir);
        debug!("Prompt ({} bytes):\n{}", prompt.len(), prompt);

        let script = match self.synthesizer.synthesize(request, &prompt).await {
            Ok(script) => script,
            Err(e) => {
                // Keep an earlier attempt's script from outliving this attempt
                remove_stale(script_path).await;
                return Err(AttemptFailure::Generation(e.to_string()));
            }
        };

        if let Err(e) = script.persist(script_path).await {
            // A partial or earlier script must not stay behind
            remove_stale(script_path).await;
            return Err(AttemptFailure::Execution(format!(
                "Failed to write script {}: {}",
                script_path.display(),
                e
            )));
        }
        debug!("Wrote {} bytes to {}", script.body.len(), script_path.display());

        advance(state, LoopState::Executing, attempt);
        let result = self.executor.execute(request.framework, script_path).await;
        if result.success {
            Ok(result.output)
        } else {
            Err(AttemptFailure::Execution(result.output))
        }
    }
}

fn advance(state: &mut LoopState, next: LoopState, attempt: u32) {
    debug!("state {:?} -> {:?} (attempt index {})", state, next, attempt);
    *state = next;
}

async fn remove_stale(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed stale script {}", path.display()),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {}
        Err(e) => warn!("Could not remove stale script {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_and_kind() {
        let f = AttemptFailure::Execution("Timeout 30000ms exceeded".into());
        assert_eq!(f.message(), "Timeout 30000ms exceeded");
        assert_eq!(f.kind(), "execution");
        assert_eq!(f.to_string(), "execution failed: Timeout 30000ms exceeded");
    }

    #[test]
    fn test_failure_serialization() {
        let json = serde_json::to_value(AttemptFailure::Generation("quota".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "generation", "message": "quota" }));
    }

    #[test]
    fn test_advance_sets_state() {
        let mut state = LoopState::Idle;
        advance(&mut state, LoopState::Generating, 0);
        assert_eq!(state, LoopState::Generating);
    }
}
