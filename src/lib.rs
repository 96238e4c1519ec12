//! test-forge - generate and self-repair end-to-end browser tests.
//!
//! This crate provides:
//! - Project context scanning to ground generation in the real layout
//! - Per-framework prompt templates (Playwright, Selenium, TestCafe)
//! - A generative model client with code-execution responses
//! - A bounded generate → execute → repair loop per framework
//! - A sequential multi-framework driver with JSON run reports
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use test_forge::{Config, Driver, Framework, GeminiClient, DEFAULT_SCENARIO};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env();
//! let client = GeminiClient::new(config.require_api_key()?, &config.model)?;
//! let driver = Driver::from_config(&config, Arc::new(client), DEFAULT_SCENARIO);
//! let report = driver.run(&Framework::ALL).await?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod framework;
pub mod model;
pub mod prompt;
pub mod repair;
pub mod report;
pub mod runner;
pub mod synth;

pub use config::Config;
pub use context::{ScanOptions, scan_project, scan_project_with};
pub use driver::Driver;
pub use error::{ForgeError, ForgeResult};
pub use framework::{Framework, FrameworkSpec};
pub use model::{ContentPart, GeminiClient, Generator, ModelError, ModelRequest, ModelResult};
pub use prompt::{DEFAULT_SCENARIO, GenerationRequest, build_prompt};
pub use repair::{AttemptFailure, FrameworkOutcome, LoopState, OutcomeStatus, RepairLoop};
pub use report::RunReport;
pub use runner::{ExecutionResult, ScriptExecutor, ShellExecutor, run_shell};
pub use synth::{GeneratedScript, PROVENANCE_HEADER, Synthesizer, assemble_code};
