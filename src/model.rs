//! Generative model client.
//!
//! Provides the `Generator` seam the synthesizer talks to, and `GeminiClient`,
//! the HTTP implementation against the Generative Language API:
//! - One `generateContent` call per request, no streaming
//! - Code-execution tool enabled so the model may answer with executable code parts
//! - Credential passed in explicitly, never read from the environment here
//!
//! Responses are reduced to an ordered list of [`ContentPart`]s. Parts that are
//! neither text nor executable code are dropped.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::ModelSettings;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while talking to the generative service
#[derive(Error, Debug)]
pub enum ModelError {
    /// Transport failure (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// One piece of a model response, in response order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Plain text, possibly wrapping code in markdown fences
    Text(String),
    /// Structured executable code
    Code(String),
}

/// A single generation request
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// User-role text parts, sent in order
    pub parts: Vec<String>,
    /// Whether to enable the code-execution tool
    pub code_execution: bool,
}

impl ModelRequest {
    pub fn new(parts: Vec<String>) -> Self {
        Self {
            parts,
            code_execution: true,
        }
    }
}

/// Trait for generative backends
///
/// Implementations:
/// - `GeminiClient` for the real service
/// - scripted generators in tests
#[async_trait]
pub trait Generator: Send + Sync {
    /// Send one request and return its content parts
    async fn generate(&self, request: &ModelRequest) -> ModelResult<Vec<ContentPart>>;

    /// Model identifier, for logs and reports
    fn model_name(&self) -> &str;
}

/// HTTP client for the Generative Language API
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl GeminiClient {
    /// Create a client from explicit settings and credential
    pub fn new(api_key: impl Into<String>, settings: &ModelSettings) -> ModelResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        })
    }

    /// Full URL of the generateContent call
    pub fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, request: &ModelRequest) -> ModelResult<Vec<ContentPart>> {
        let body = build_request_body(request);
        debug!("Sending generateContent request to {}", self.url());

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        extract_parts(payload)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Build the JSON body for a generateContent call
pub fn build_request_body(request: &ModelRequest) -> serde_json::Value {
    let parts: Vec<serde_json::Value> = request
        .parts
        .iter()
        .map(|text| serde_json::json!({ "text": text }))
        .collect();

    let mut body = serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": parts
        }]
    });

    if request.code_execution {
        body["tools"] = serde_json::json!([{ "code_execution": {} }]);
    }

    body
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<RawPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPart {
    text: Option<String>,
    executable_code: Option<ExecutableCode>,
}

#[derive(Debug, Deserialize)]
struct ExecutableCode {
    code: String,
}

/// Reduce a response to its text and code parts
fn extract_parts(response: GenerateResponse) -> ModelResult<Vec<ContentPart>> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ModelError::InvalidResponse("response has no candidates".to_string()))?;

    let content = candidate
        .content
        .ok_or_else(|| ModelError::InvalidResponse("candidate has no content".to_string()))?;

    let mut parts = Vec::with_capacity(content.parts.len());
    for raw in content.parts {
        match (raw.text, raw.executable_code) {
            (_, Some(exec)) => parts.push(ContentPart::Code(exec.code)),
            (Some(text), None) => parts.push(ContentPart::Text(text)),
            (None, None) => debug!("Ignoring response part with no text or executable code"),
        }
    }

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> ModelResult<Vec<ContentPart>> {
        extract_parts(serde_json::from_value(json).unwrap())
    }

    #[test]
    fn test_request_body_shape() {
        let request = ModelRequest::new(vec!["prompt".into(), "scenario".into()]);
        let body = build_request_body(&request);

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(body["contents"][0]["parts"][1]["text"], "scenario");
        assert!(body["tools"][0]["code_execution"].is_object());
    }

    #[test]
    fn test_request_body_without_tools() {
        let mut request = ModelRequest::new(vec!["p".into()]);
        request.code_execution = false;
        assert!(build_request_body(&request).get("tools").is_none());
    }

    #[test]
    fn test_extract_mixed_parts_in_order() {
        let parts = parse(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "intro" },
                        { "executableCode": { "language": "PYTHON", "code": "print(1)" } },
                        { "codeExecutionResult": { "outcome": "OUTCOME_OK", "output": "1" } },
                        { "text": "outro" }
                    ]
                }
            }]
        }))
        .unwrap();

        assert_eq!(
            parts,
            vec![
                ContentPart::Text("intro".into()),
                ContentPart::Code("print(1)".into()),
                ContentPart::Text("outro".into()),
            ]
        );
    }

    #[test]
    fn test_extract_no_candidates() {
        let err = parse(serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } })).unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }

    #[test]
    fn test_client_url() {
        let settings = ModelSettings {
            api_key: None,
            model: "gemini-test".into(),
            endpoint: "http://localhost:9999/v1beta/".into(),
            request_timeout: 5,
        };
        let client = GeminiClient::new("key", &settings).unwrap();
        assert_eq!(client.url(), "http://localhost:9999/v1beta/models/gemini-test:generateContent");
        assert_eq!(client.model_name(), "gemini-test");
    }
}
