//! Prompt composition for script generation.
//!
//! Every framework uses the same composition rule:
//!
//! 1. the framework's instruction template
//! 2. the project context manifest
//! 3. where the script will be written and run from
//! 4. on retry, the previous failure verbatim
//!
//! The scenario itself travels as a separate request part (see `crate::synth`).

use std::path::Path;

use crate::framework::Framework;

/// Scenario used when none is supplied on the command line
pub const DEFAULT_SCENARIO: &str = "\
Open the application's home page. Navigate to the login page, sign in with the \
username 'demo@example.com' and password 'demo-password', and verify that the \
dashboard is shown with a greeting that contains the user's name. Then sign out \
and verify that the login form is visible again.";

/// Inputs of a single generation attempt. A fresh request is built every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Target framework
    pub framework: Framework,
    /// Natural-language scenario to automate
    pub scenario: String,
    /// Error text from the previous attempt, if any
    pub prior_error: Option<String>,
}

impl GenerationRequest {
    pub fn new(framework: Framework, scenario: impl Into<String>) -> Self {
        Self {
            framework,
            scenario: scenario.into(),
            prior_error: None,
        }
    }

    /// Attach the previous attempt's error text
    pub fn with_prior_error(mut self, error: impl Into<String>) -> Self {
        self.prior_error = Some(error.into());
        self
    }
}

/// Build the prompt text for a generation request.
///
/// `script_dir` is the output directory relative to the project root; it is
/// only rendered into the text.
pub fn build_prompt(request: &GenerationRequest, manifest: &str, script_dir: &Path) -> String {
    let spec = request.framework.spec();
    let output_path = request.framework.output_path(script_dir);
    let working_dir = request.framework.working_dir(script_dir);

    let mut prompt = String::with_capacity(spec.template.len() + manifest.len() + 512);
    prompt.push_str(spec.template);

    prompt.push_str("\nProject structure ([DIR] = directory, [FILE] = source file):\n");
    if manifest.trim().is_empty() {
        prompt.push_str("(no source files found)\n");
    } else {
        prompt.push_str(manifest);
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "\nThe test will be saved as {} and run with `{}` from the directory {}.\n",
        output_path.display(),
        request.framework.run_command(spec.output_file),
        working_dir.display(),
    ));

    if let Some(error) = &request.prior_error {
        prompt.push_str(&feedback_suffix(error));
    }

    prompt
}

/// Retry suffix embedding the previous failure verbatim
pub fn feedback_suffix(error: &str) -> String {
    format!(
        "\nThe previous attempt failed with the following error:\n{}\nCorrect the script and regenerate it in full.\n",
        error
    )
}
