//! Execution callbacks and the events they receive.
//!
//! Callbacks are plain values passed into `execute` for the lifetime of one
//! run. They are never stored on agents and nothing in the core keeps a
//! reference to them afterwards — the WebSocket/UI layer that forwards
//! these to a browser lives outside this crate.

use serde::Serialize;

/// Step lifecycle phase reported through `on_step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Started,
    Completed,
    Failed,
}

/// One observable unit of run progress: the planning step, a node dispatch,
/// a node completion, a node failure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEvent {
    pub name: String,
    pub description: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepEvent {
    pub fn started(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            status: StepStatus::Started,
            output: None,
            error: None,
        }
    }

    pub fn completed(
        name: impl Into<String>,
        description: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            status: StepStatus::Completed,
            output: Some(output.into()),
            error: None,
        }
    }

    pub fn failed(
        name: impl Into<String>,
        description: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            status: StepStatus::Failed,
            output: None,
            error: Some(error.into()),
        }
    }
}

/// Reported through `on_tool_use` whenever the adapter invokes a tool.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUseEvent {
    pub tool_name: String,
    pub input: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

type StartFn = Box<dyn Fn() + Send + Sync>;
type StepFn = Box<dyn Fn(&StepEvent) + Send + Sync>;
type ToolUseFn = Box<dyn Fn(&ToolUseEvent) + Send + Sync>;
type CompleteFn = Box<dyn Fn(&crate::scheduler::ExecutionResponse) + Send + Sync>;
type ErrorFn = Box<dyn Fn(&crate::error::CoreError) + Send + Sync>;

/// Optional observers for one run.
#[derive(Default)]
pub struct ExecutionCallbacks {
    on_start: Option<StartFn>,
    on_step: Option<StepFn>,
    on_tool_use: Option<ToolUseFn>,
    on_complete: Option<CompleteFn>,
    on_error: Option<ErrorFn>,
}

impl ExecutionCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    pub fn on_step(mut self, f: impl Fn(&StepEvent) + Send + Sync + 'static) -> Self {
        self.on_step = Some(Box::new(f));
        self
    }

    pub fn on_tool_use(mut self, f: impl Fn(&ToolUseEvent) + Send + Sync + 'static) -> Self {
        self.on_tool_use = Some(Box::new(f));
        self
    }

    pub fn on_complete(
        mut self,
        f: impl Fn(&crate::scheduler::ExecutionResponse) + Send + Sync + 'static,
    ) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_error(
        mut self,
        f: impl Fn(&crate::error::CoreError) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub(crate) fn fire_start(&self) {
        if let Some(f) = &self.on_start {
            f();
        }
    }

    pub(crate) fn fire_step(&self, event: &StepEvent) {
        if let Some(f) = &self.on_step {
            f(event);
        }
    }

    pub(crate) fn fire_tool_use(&self, event: &ToolUseEvent) {
        if let Some(f) = &self.on_tool_use {
            f(event);
        }
    }

    pub(crate) fn fire_complete(&self, response: &crate::scheduler::ExecutionResponse) {
        if let Some(f) = &self.on_complete {
            f(response);
        }
    }

    pub(crate) fn fire_error(&self, error: &crate::error::CoreError) {
        if let Some(f) = &self.on_error {
            f(error);
        }
    }
}
