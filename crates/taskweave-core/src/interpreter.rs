//! Response interpretation strategies.
//!
//! The reasoning capability returns free text. The scheduler never touches
//! parsing details; it holds a `ResponseInterpreter` and gets back an
//! `AgentDecision`. Two strategies ship: strict JSON (whole reply must
//! parse) and the default heuristic (strict, then first balanced `{...}`
//! block, then a synthesized minimal decision carrying the raw text).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::message::{AgentId, NodeOutcome};

/// A tool invocation requested inside an agent's reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDirective {
    pub name: String,
    #[serde(default)]
    pub input: serde_json::Value,
}

/// What an agent decided after processing one message.
#[derive(Debug, Clone)]
pub struct AgentDecision {
    /// The primary result text for the node.
    pub summary: String,
    pub outcome: NodeOutcome,
    pub tool: Option<ToolDirective>,
    /// Agent ids to share the finding with via NOTIFICATION.
    pub notify: Vec<AgentId>,
}

impl AgentDecision {
    /// Minimal valid decision wrapping an unparsable reply. Completed by
    /// default so benign free-text backends still drive runs forward.
    pub fn from_raw_text(raw: &str) -> Self {
        Self {
            summary: raw.trim().to_string(),
            outcome: NodeOutcome::Completed,
            tool: None,
            notify: Vec::new(),
        }
    }
}

/// Serde shape the reasoning capability is asked to produce.
#[derive(Debug, Deserialize)]
struct RawDecision {
    #[serde(default, alias = "result", alias = "output")]
    summary: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    tool: Option<ToolDirective>,
    #[serde(default, alias = "shareWith", alias = "share_with")]
    notify: Vec<AgentId>,
}

impl RawDecision {
    fn into_decision(self, raw: &str) -> AgentDecision {
        let outcome = match self.status.as_deref() {
            Some("failed") | Some("error") | Some("FAILED") => NodeOutcome::Failed,
            _ => NodeOutcome::Completed,
        };
        AgentDecision {
            summary: self
                .summary
                .unwrap_or_else(|| raw.trim().to_string()),
            outcome,
            tool: self.tool,
            notify: self.notify,
        }
    }
}

pub trait ResponseInterpreter: Send + Sync {
    fn interpret(&self, raw: &str) -> Result<AgentDecision, CoreError>;
}

/// Accepts only replies that are JSON in their entirety.
pub struct StrictJsonInterpreter;

impl ResponseInterpreter for StrictJsonInterpreter {
    fn interpret(&self, raw: &str) -> Result<AgentDecision, CoreError> {
        let parsed: RawDecision = serde_json::from_str(raw.trim())
            .map_err(|e| CoreError::Interpretation(e.to_string()))?;
        Ok(parsed.into_decision(raw))
    }
}

/// Strict first, then the first balanced JSON object embedded in the text,
/// then a synthesized decision. Never fails.
pub struct HeuristicInterpreter;

impl ResponseInterpreter for HeuristicInterpreter {
    fn interpret(&self, raw: &str) -> Result<AgentDecision, CoreError> {
        if let Ok(decision) = StrictJsonInterpreter.interpret(raw) {
            return Ok(decision);
        }

        if let Some(block) = extract_json_block(raw) {
            if let Ok(parsed) = serde_json::from_str::<RawDecision>(block) {
                return Ok(parsed.into_decision(raw));
            }
        }

        tracing::debug!("[Interpreter] Synthesizing decision from free text");
        Ok(AgentDecision::from_raw_text(raw))
    }
}

/// Locate the first balanced `{...}` block, respecting JSON strings and
/// escapes.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_parses_well_formed_reply() {
        let raw = r#"{"summary": "found 3 sources", "status": "completed", "notify": ["executor"]}"#;
        let decision = StrictJsonInterpreter.interpret(raw).unwrap();
        assert_eq!(decision.summary, "found 3 sources");
        assert_eq!(decision.outcome, NodeOutcome::Completed);
        assert_eq!(decision.notify, vec!["executor".to_string()]);
    }

    #[test]
    fn test_strict_rejects_prose() {
        assert!(StrictJsonInterpreter
            .interpret("Sure! Here is my answer.")
            .is_err());
    }

    #[test]
    fn test_heuristic_finds_embedded_block() {
        let raw = r#"Here is my structured answer:
{"summary": "compiled the report", "status": "completed", "tool": {"name": "web_search", "input": {"q": "x"}}}
Hope that helps!"#;
        let decision = HeuristicInterpreter.interpret(raw).unwrap();
        assert_eq!(decision.summary, "compiled the report");
        assert_eq!(decision.tool.unwrap().name, "web_search");
    }

    #[test]
    fn test_heuristic_synthesizes_from_free_text() {
        let raw = "I believe the answer is 42, based on prior work.";
        let decision = HeuristicInterpreter.interpret(raw).unwrap();
        assert_eq!(decision.summary, raw);
        assert_eq!(decision.outcome, NodeOutcome::Completed);
        assert!(decision.tool.is_none());
        assert!(decision.notify.is_empty());
    }

    #[test]
    fn test_failed_status_maps_to_failed_outcome() {
        let raw = r#"{"summary": "cannot proceed", "status": "failed"}"#;
        let decision = HeuristicInterpreter.interpret(raw).unwrap();
        assert_eq!(decision.outcome, NodeOutcome::Failed);
    }

    #[test]
    fn test_extract_json_block_handles_braces_in_strings() {
        let text = r#"noise {"a": "value with } brace", "b": {"c": 1}} trailing"#;
        let block = extract_json_block(text).unwrap();
        assert_eq!(block, r#"{"a": "value with } brace", "b": {"c": 1}}"#);
    }

    #[test]
    fn test_extract_json_block_none_when_unbalanced() {
        assert!(extract_json_block("no json here").is_none());
        assert!(extract_json_block(r#"{"open": true"#).is_none());
    }
}
