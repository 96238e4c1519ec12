//! Script synthesis from model responses.

use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tracing::debug;

use crate::error::{ForgeError, ForgeResult};
use crate::framework::Framework;
use crate::model::{ContentPart, Generator, ModelRequest};
use crate::prompt::GenerationRequest;

/// First line of every generated script
pub const PROVENANCE_HEADER: &str = "// Auto-generated by test-forge. Manual edits will be overwritten.";

/// Markdown code-fence delimiter stripped from text parts
const CODE_FENCE: &str = "```";

/// A generated script, owned by the attempt that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedScript {
    pub framework: Framework,
    /// Provenance header followed by the concatenated code
    pub body: String,
}

impl GeneratedScript {
    /// Overwrite `path` with this script, creating parent directories
    pub async fn persist(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, &self.body).await
    }
}

/// Turns prompts into scripts through a `Generator`
#[derive(Clone)]
pub struct Synthesizer {
    generator: Arc<dyn Generator>,
    max_script_bytes: usize,
}

impl Synthesizer {
    pub fn new(generator: Arc<dyn Generator>, max_script_bytes: usize) -> Self {
        Self {
            generator,
            max_script_bytes,
        }
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// Send exactly one request (prompt, then scenario) and assemble the script.
    ///
    /// Model errors propagate unchanged. An empty or oversized result is
    /// rejected; nothing else about the code is checked.
    pub async fn synthesize(&self, request: &GenerationRequest, prompt: &str) -> ForgeResult<GeneratedScript> {
        let model_request = ModelRequest::new(vec![prompt.to_string(), request.scenario.clone()]);
        let parts = self.generator.generate(&model_request).await?;
        debug!("Model returned {} content parts", parts.len());

        let code = assemble_code(&parts);
        if code.trim().is_empty() {
            return Err(ForgeError::EmptyScript);
        }
        if code.len() > self.max_script_bytes {
            return Err(ForgeError::ScriptTooLarge {
                size: code.len(),
                limit: self.max_script_bytes,
            });
        }

        Ok(GeneratedScript {
            framework: request.framework,
            body: with_provenance(&code),
        })
    }
}

/// Concatenate response parts into code, in order.
///
/// Text parts lose every line containing a code fence; code parts are kept
/// verbatim.
pub fn assemble_code(parts: &[ContentPart]) -> String {
    parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => strip_fence_lines(text),
            ContentPart::Code(code) => code.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefix the provenance header
pub fn with_provenance(code: &str) -> String {
    format!("{}\n{}", PROVENANCE_HEADER, code)
}

fn strip_fence_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.contains(CODE_FENCE))
        .collect::<Vec<_>>()
        .join("\n")
}
