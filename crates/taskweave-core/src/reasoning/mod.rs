//! The reasoning capability — the opaque external function an agent
//! consults to decide how to act.
//!
//! The scheduler core only ever sees `predict(prompt) -> text`. The HTTP
//! backend lives in [`http`]; the backends here are deterministic and run
//! offline, which is what the scenario tests and the CLI's dry runs use.

pub mod http;

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::CoreError;

#[async_trait]
pub trait Reasoning: Send + Sync {
    async fn predict(&self, prompt: &str) -> Result<String, CoreError>;
}

/// Replays a fixed queue of canned replies in call order. When the queue
/// runs dry it keeps returning a benign completed reply, so a run never
/// stalls on an exhausted script.
pub struct ScriptedReasoning {
    replies: Mutex<VecDeque<String>>,
    exhausted_reply: String,
}

impl ScriptedReasoning {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            exhausted_reply: r#"{"summary": "done", "status": "completed"}"#.to_string(),
        }
    }

    pub fn with_exhausted_reply(mut self, reply: impl Into<String>) -> Self {
        self.exhausted_reply = reply.into();
        self
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|q| q.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Reasoning for ScriptedReasoning {
    async fn predict(&self, _prompt: &str) -> Result<String, CoreError> {
        let mut queue = self
            .replies
            .lock()
            .map_err(|_| CoreError::Reasoning("script lock poisoned".to_string()))?;
        Ok(queue
            .pop_front()
            .unwrap_or_else(|| self.exhausted_reply.clone()))
    }
}

/// Always succeeds with a completed reply echoing a prefix of the prompt.
/// The offline demo backend.
pub struct EchoReasoning;

#[async_trait]
impl Reasoning for EchoReasoning {
    async fn predict(&self, prompt: &str) -> Result<String, CoreError> {
        let preview: String = prompt.chars().take(120).collect();
        Ok(serde_json::json!({
            "summary": format!("Echo: {}", preview.trim()),
            "status": "completed"
        })
        .to_string())
    }
}
