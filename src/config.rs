//! Configuration management with environment variable support.
//!
//! This module provides centralized configuration for test-forge, supporting:
//! - Environment variables for all configurable values
//! - Sensible defaults for everything except the API credential
//! - Builder pattern for programmatic configuration
//!
//! Configuration is built once at startup and passed explicitly to the
//! components that need it. Nothing here is process-global.
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TEST_FORGE_API_KEY` | Generative service credential (required for `run`) | none |
//! | `TEST_FORGE_MODEL` | Model identifier | `gemini-2.0-flash` |
//! | `TEST_FORGE_ENDPOINT` | API base URL | `https://generativelanguage.googleapis.com/v1beta` |
//! | `TEST_FORGE_REQUEST_TIMEOUT` | HTTP request timeout in seconds | `300` |
//! | `TEST_FORGE_MAX_ATTEMPTS` | Attempts per framework | `3` |
//! | `TEST_FORGE_PROJECT_ROOT` | Project root scanned for context | `.` |
//! | `TEST_FORGE_OUTPUT_DIR` | Directory generated scripts are written to | `generated-tests` |
//! | `TEST_FORGE_MAX_SCRIPT_BYTES` | Largest script accepted from the model | `524288` |
//!
//! # Example
//!
//! ```bash
//! export TEST_FORGE_API_KEY="..."
//! export TEST_FORGE_MAX_ATTEMPTS=5
//! test-forge run --framework playwright
//! ```

use std::env;
use std::path::PathBuf;

use crate::error::{ForgeError, ForgeResult};

// ============================================================================
// Default Values
// ============================================================================

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default API base URL
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default HTTP request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 300;

/// Default number of attempts per framework
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default project root
pub const DEFAULT_PROJECT_ROOT: &str = ".";

/// Default output directory for generated scripts
pub const DEFAULT_OUTPUT_DIR: &str = "generated-tests";

/// Default upper bound on generated script size (bytes)
pub const DEFAULT_MAX_SCRIPT_BYTES: usize = 512 * 1024;

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Environment variable for the API credential
pub const ENV_API_KEY: &str = "TEST_FORGE_API_KEY";

/// Fallback environment variable for the API credential
pub const ENV_API_KEY_FALLBACK: &str = "GEMINI_API_KEY";

/// Environment variable for the model identifier
pub const ENV_MODEL: &str = "TEST_FORGE_MODEL";

/// Environment variable for the API base URL
pub const ENV_ENDPOINT: &str = "TEST_FORGE_ENDPOINT";

/// Environment variable for the HTTP request timeout
pub const ENV_REQUEST_TIMEOUT: &str = "TEST_FORGE_REQUEST_TIMEOUT";

/// Environment variable for the attempt limit
pub const ENV_MAX_ATTEMPTS: &str = "TEST_FORGE_MAX_ATTEMPTS";

/// Environment variable for the project root
pub const ENV_PROJECT_ROOT: &str = "TEST_FORGE_PROJECT_ROOT";

/// Environment variable for the output directory
pub const ENV_OUTPUT_DIR: &str = "TEST_FORGE_OUTPUT_DIR";

/// Environment variable for the script size guard
pub const ENV_MAX_SCRIPT_BYTES: &str = "TEST_FORGE_MAX_SCRIPT_BYTES";

/// Centralized configuration for test-forge
#[derive(Debug, Clone)]
pub struct Config {
    /// Generative service configuration
    pub model: ModelSettings,
    /// Repair loop configuration
    pub repair: RepairSettings,
    /// Filesystem layout
    pub paths: PathSettings,
}

/// Generative-service settings
#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// API credential (required before any generation request)
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// API base URL
    pub endpoint: String,
    /// HTTP request timeout (seconds)
    pub request_timeout: u64,
}

/// Repair-loop settings
#[derive(Debug, Clone)]
pub struct RepairSettings {
    /// Attempts per framework before giving up
    pub max_attempts: u32,
    /// Largest script accepted from the model (bytes)
    pub max_script_bytes: usize,
}

/// Filesystem layout settings
#[derive(Debug, Clone)]
pub struct PathSettings {
    /// Root of the project under test
    pub project_root: PathBuf,
    /// Directory (relative to the project root) receiving generated scripts
    pub output_dir: PathBuf,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// `from_env` is this with `std::env::var`; tests pass a map instead.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            model: ModelSettings::from_lookup(&lookup),
            repair: RepairSettings::from_lookup(&lookup),
            paths: PathSettings::from_lookup(&lookup),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            model: ModelSettings::defaults(),
            repair: RepairSettings::defaults(),
            paths: PathSettings::defaults(),
        }
    }

    /// Set the API credential
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.model.api_key = Some(key.into());
        self
    }

    /// Set the attempt limit
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.repair.max_attempts = attempts;
        self
    }

    /// Set the project root
    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.paths.project_root = root.into();
        self
    }

    /// Set the output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.paths.output_dir = dir.into();
        self
    }

    /// Fail with `MissingCredential` unless a non-empty credential is set
    pub fn require_api_key(&self) -> ForgeResult<&str> {
        match self.model.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ForgeError::MissingCredential),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ModelSettings {
    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_key: lookup(ENV_API_KEY).or_else(|| lookup(ENV_API_KEY_FALLBACK)),
            model: lookup(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: lookup(ENV_ENDPOINT).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            request_timeout: parse_or(lookup(ENV_REQUEST_TIMEOUT), DEFAULT_REQUEST_TIMEOUT),
        }
    }

    /// Create model settings with defaults
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl RepairSettings {
    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            max_attempts: parse_or(lookup(ENV_MAX_ATTEMPTS), DEFAULT_MAX_ATTEMPTS),
            max_script_bytes: parse_or(lookup(ENV_MAX_SCRIPT_BYTES), DEFAULT_MAX_SCRIPT_BYTES),
        }
    }

    /// Create repair settings with defaults
    pub fn defaults() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_script_bytes: DEFAULT_MAX_SCRIPT_BYTES,
        }
    }
}

impl PathSettings {
    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            project_root: lookup(ENV_PROJECT_ROOT)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROJECT_ROOT)),
            output_dir: lookup(ENV_OUTPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        }
    }

    /// Create path settings with defaults
    pub fn defaults() -> Self {
        Self {
            project_root: PathBuf::from(DEFAULT_PROJECT_ROOT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }

    /// Absolute-or-relative directory the scripts land in
    pub fn script_dir(&self) -> PathBuf {
        self.project_root.join(&self.output_dir)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse an optional string, keeping the default when absent or malformed
fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}
