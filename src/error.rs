//! Error types for test generation and repair.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ModelError;

/// Result type for crate-level operations
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Errors surfaced by the forge pipeline.
///
/// `MissingCredential` and `ProjectRoot` are fatal and stop the run before any
/// repair loop starts. Everything else is caught at the attempt boundary and
/// turned into feedback for the next prompt.
#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("No API credential configured. Set TEST_FORGE_API_KEY or GEMINI_API_KEY")]
    MissingCredential,

    #[error("Project root {path} is not readable: {reason}")]
    ProjectRoot { path: PathBuf, reason: String },

    #[error("Unknown framework '{0}'. Expected one of: playwright, selenium, testcafe")]
    UnknownFramework(String),

    #[error("Generation failed: {0}")]
    Model(#[from] ModelError),

    #[error("Model returned no usable code")]
    EmptyScript,

    #[error("Generated script is {size} bytes, exceeding the {limit} byte limit")]
    ScriptTooLarge { size: usize, limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
