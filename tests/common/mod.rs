//! Scripted generator and executor shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use test_forge::{ContentPart, ExecutionResult, Framework, Generator, ModelError, ModelRequest, ModelResult, ScriptExecutor};

/// Generator replaying queued responses and recording every request
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<ModelResult<Vec<ContentPart>>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response consisting of one fenced text part
    pub fn reply_text(self, text: &str) -> Self {
        self.push(Ok(vec![ContentPart::Text(format!("```typescript\n{}\n```", text))]))
    }

    pub fn reply_parts(self, parts: Vec<ContentPart>) -> Self {
        self.push(Ok(parts))
    }

    pub fn reply_error(self, error: ModelError) -> Self {
        self.push(Err(error))
    }

    fn push(self, response: ModelResult<Vec<ContentPart>>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Prompt text (first part) of every request, in order
    pub fn prompts(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.parts[0].clone()).collect()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: &ModelRequest) -> ModelResult<Vec<ContentPart>> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::InvalidResponse("no scripted response left".into())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// One recorded execution: which framework, which file, and what the file held
#[derive(Debug, Clone)]
pub struct Execution {
    pub framework: Framework,
    pub path: PathBuf,
    pub content: String,
}

/// Executor replaying queued results per framework
#[derive(Default)]
pub struct ScriptedExecutor {
    results: Mutex<HashMap<Framework, VecDeque<ExecutionResult>>>,
    executions: Mutex<Vec<Execution>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pass(self, framework: Framework, output: &str) -> Self {
        self.push(framework, ExecutionResult::passed(output))
    }

    pub fn fail(self, framework: Framework, output: &str) -> Self {
        self.push(framework, ExecutionResult::failed(output, Some(1)))
    }

    fn push(self, framework: Framework, result: ExecutionResult) -> Self {
        self.results
            .lock()
            .unwrap()
            .entry(framework)
            .or_default()
            .push_back(result);
        self
    }

    pub fn executions(&self) -> Vec<Execution> {
        self.executions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptExecutor for ScriptedExecutor {
    async fn execute(&self, framework: Framework, script_path: &Path) -> ExecutionResult {
        let content = std::fs::read_to_string(script_path).unwrap_or_default();
        self.executions.lock().unwrap().push(Execution {
            framework,
            path: script_path.to_path_buf(),
            content,
        });
        self.results
            .lock()
            .unwrap()
            .get_mut(&framework)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| ExecutionResult::failed("no scripted result left", Some(1)))
    }
}
