//! Run reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::ForgeResult;
use crate::repair::{FrameworkOutcome, OutcomeStatus};

/// Result of a complete multi-framework run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,

    /// Machine the run happened on
    pub host: String,

    /// Model identifier used for generation
    pub model: String,

    pub scenario: String,

    /// One entry per framework, in run order
    pub outcomes: Vec<FrameworkOutcome>,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(FrameworkOutcome::succeeded)
    }

    pub fn current_host() -> String {
        hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Write the report as pretty JSON, creating parent directories
    pub fn write_json(&self, path: &Path) -> ForgeResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Human-readable summary, one block per framework
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Run finished in {}s on {} ({})",
            (self.finished_at - self.started_at).num_seconds(),
            self.host,
            self.model
        );

        for outcome in &self.outcomes {
            let status = match outcome.status {
                OutcomeStatus::Succeeded => "PASSED",
                OutcomeStatus::ExhaustedAttempts => "FAILED",
            };
            let _ = writeln!(
                out,
                "  {:<20} {} after {} attempt(s): {}",
                outcome.framework.display_name(),
                status,
                outcome.attempts,
                outcome.script_path.display()
            );
            if let (OutcomeStatus::ExhaustedAttempts, Some(last)) = (outcome.status, outcome.last_failure()) {
                // First 300 chars of the last error
                let preview: String = last.message().chars().take(300).collect();
                let _ = writeln!(out, "    last {} error: {}", last.kind(), preview.trim_end());
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::Framework;
    use crate::repair::AttemptFailure;
    use std::path::PathBuf;

    fn outcome(framework: Framework, status: OutcomeStatus) -> FrameworkOutcome {
        FrameworkOutcome {
            framework,
            status,
            attempts: 3,
            output: None,
            failures: vec![AttemptFailure::Execution("element not found".into())],
            script_path: PathBuf::from("generated-tests/x"),
        }
    }

    fn report(outcomes: Vec<FrameworkOutcome>) -> RunReport {
        let now = Utc::now();
        RunReport {
            started_at: now,
            finished_at: now,
            host: "ci".into(),
            model: "gemini-test".into(),
            scenario: "login".into(),
            outcomes,
        }
    }

    #[test]
    fn test_all_succeeded() {
        let ok = report(vec![outcome(Framework::Playwright, OutcomeStatus::Succeeded)]);
        assert!(ok.all_succeeded());

        let mixed = report(vec![
            outcome(Framework::Playwright, OutcomeStatus::Succeeded),
            outcome(Framework::Selenium, OutcomeStatus::ExhaustedAttempts),
        ]);
        assert!(!mixed.all_succeeded());
    }

    #[test]
    fn test_summary_mentions_failures() {
        let summary = report(vec![outcome(Framework::Selenium, OutcomeStatus::ExhaustedAttempts)]).summary();
        assert!(summary.contains("Selenium WebDriver"));
        assert!(summary.contains("FAILED"));
        assert!(summary.contains("element not found"));
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");
        report(vec![outcome(Framework::TestCafe, OutcomeStatus::Succeeded)])
            .write_json(&path)
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["outcomes"][0]["framework"], "testcafe");
        assert_eq!(json["outcomes"][0]["status"], "succeeded");
    }
}
