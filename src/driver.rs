//! Runs the repair loop for each framework in turn.

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::Config;
use crate::context::{ScanOptions, scan_project_with};
use crate::error::ForgeResult;
use crate::framework::Framework;
use crate::model::Generator;
use crate::repair::RepairLoop;
use crate::report::RunReport;
use crate::runner::{ScriptExecutor, ShellExecutor};
use crate::synth::Synthesizer;

/// Sequential multi-framework driver
pub struct Driver {
    repair: RepairLoop,
    project_root: PathBuf,
    scan_options: ScanOptions,
    /// Generated-script directory, relative to the project root, kept out of the manifest
    output_dir: Option<PathBuf>,
    scenario: String,
}

impl Driver {
    pub fn new(repair: RepairLoop, project_root: impl Into<PathBuf>, scenario: impl Into<String>) -> Self {
        Self {
            repair,
            project_root: project_root.into(),
            scan_options: ScanOptions::default(),
            output_dir: None,
            scenario: scenario.into(),
        }
    }

    /// Wire a driver from configuration, running scripts through the shell
    pub fn from_config(config: &Config, generator: Arc<dyn Generator>, scenario: impl Into<String>) -> Self {
        let executor: Arc<dyn ScriptExecutor> = Arc::new(ShellExecutor::new(config.paths.script_dir()));
        Self::with_executor(config, generator, executor, scenario)
    }

    /// Wire a driver from configuration with a custom executor
    pub fn with_executor(
        config: &Config,
        generator: Arc<dyn Generator>,
        executor: Arc<dyn ScriptExecutor>,
        scenario: impl Into<String>,
    ) -> Self {
        let synthesizer = Synthesizer::new(generator, config.repair.max_script_bytes);
        let repair = RepairLoop::new(
            synthesizer,
            executor,
            config.paths.script_dir(),
            config.repair.max_attempts,
        )
        .prompt_dir(&config.paths.output_dir);

        let output_dir = if config.paths.output_dir.is_absolute() {
            config
                .paths
                .output_dir
                .strip_prefix(&config.paths.project_root)
                .ok()
                .map(PathBuf::from)
        } else {
            Some(config.paths.output_dir.clone())
        };

        let mut driver = Self::new(repair, &config.paths.project_root, scenario);
        driver.output_dir = output_dir;
        driver
    }

    pub fn scan_options(mut self, options: ScanOptions) -> Self {
        self.scan_options = options;
        self
    }

    /// Keep a directory under the project root out of the manifest
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Scan the project once, then run every framework's loop in order.
    ///
    /// Only a failed scan is returned as an error. A framework that exhausts
    /// its attempts is recorded in the report and the next one still runs.
    pub async fn run(&self, frameworks: &[Framework]) -> ForgeResult<RunReport> {
        let started_at = Utc::now();
        let options = match &self.output_dir {
            Some(dir) => self.scan_options.clone().exclude_path(dir),
            None => self.scan_options.clone(),
        };
        let manifest = scan_project_with(&self.project_root, &options)?;
        info!(
            "Project context: {} entries from {}",
            manifest.lines().count(),
            self.project_root.display()
        );

        let mut outcomes = Vec::with_capacity(frameworks.len());
        for &framework in frameworks {
            let outcome = self.repair.run(framework, &self.scenario, &manifest).await;
            if !outcome.succeeded() {
                error!("{}: no passing script; moving on", framework.display_name());
            }
            outcomes.push(outcome);
        }

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            host: RunReport::current_host(),
            model: self.repair.model_name().to_string(),
            scenario: self.scenario.clone(),
            outcomes,
        })
    }
}
