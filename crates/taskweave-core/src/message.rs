//! Message model — the immutable, addressed, prioritized unit of
//! communication between agents and the scheduler.
//!
//! The wire shape (used for the execution log and any external rendering)
//! is this record serialized as JSON: camelCase fields, SCREAMING_SNAKE
//! kinds, with the payload as a tagged union keyed by `kind`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tools::ToolCallRecord;

/// Agents are addressed by plain string ids.
pub type AgentId = String;

/// Sentinel recipient: the message is for the scheduler's graph bookkeeping,
/// not for any agent's inbox.
pub const SERVER: &str = "server";

/// Priorities range 0..=10; higher is dequeued first.
pub const MAX_PRIORITY: u8 = 10;

/// Message categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    Command,
    Response,
    Notification,
    Error,
    System,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "COMMAND",
            Self::Response => "RESPONSE",
            Self::Notification => "NOTIFICATION",
            Self::Error => "ERROR",
            Self::System => "SYSTEM",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "COMMAND" => Some(Self::Command),
            "RESPONSE" => Some(Self::Response),
            "NOTIFICATION" => Some(Self::Notification),
            "ERROR" => Some(Self::Error),
            "SYSTEM" => Some(Self::System),
            _ => None,
        }
    }
}

/// Terminal outcome a response reports for its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeOutcome {
    Completed,
    Failed,
}

/// Message content, tagged by the message kind. Each variant carries its own
/// explicit payload shape instead of an untyped blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Payload {
    /// Work assignment for one TaskNode, dispatched by the scheduler.
    Command { task: String, node_id: String },
    /// An agent reporting the outcome of one node back to the scheduler.
    Response {
        node_id: String,
        status: NodeOutcome,
        result: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_call: Option<ToolCallRecord>,
    },
    /// Agent-to-agent information sharing.
    Notification { information: String },
    /// A processing failure captured in-band.
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        original_message_id: Option<u64>,
    },
    /// Run-level lifecycle notices appended to the log by the scheduler.
    System { action: String, detail: String },
}

impl Payload {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Command { .. } => MessageKind::Command,
            Self::Response { .. } => MessageKind::Response,
            Self::Notification { .. } => MessageKind::Notification,
            Self::Error { .. } => MessageKind::Error,
            Self::System { .. } => MessageKind::System,
        }
    }
}

/// An immutable message. Constructed by the `MessageBus` (which assigns the
/// unique, monotonic id) and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    pub sender: AgentId,
    pub recipients: Vec<AgentId>,
    #[serde(flatten)]
    pub payload: Payload,
    pub timestamp: DateTime<Utc>,
    pub priority: u8,
}

impl Message {
    pub(crate) fn new(
        id: u64,
        sender: impl Into<AgentId>,
        recipients: Vec<AgentId>,
        payload: Payload,
        priority: u8,
    ) -> Self {
        Self {
            id,
            sender: sender.into(),
            recipients,
            payload,
            timestamp: Utc::now(),
            priority: priority.min(MAX_PRIORITY),
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            MessageKind::Command,
            MessageKind::Response,
            MessageKind::Notification,
            MessageKind::Error,
            MessageKind::System,
        ] {
            assert_eq!(MessageKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(MessageKind::from_str("bogus"), None);
    }

    #[test]
    fn test_wire_shape() {
        let msg = Message::new(
            7,
            SERVER,
            vec!["researcher".to_string()],
            Payload::Command {
                task: "Find prior art".to_string(),
                node_id: "research".to_string(),
            },
            5,
        );

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["kind"], "COMMAND");
        assert_eq!(json["payload"]["nodeId"], "research");
        assert_eq!(json["priority"], 5);

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), MessageKind::Command);
    }

    #[test]
    fn test_priority_is_clamped() {
        let msg = Message::new(
            1,
            "a",
            vec![SERVER.to_string()],
            Payload::Notification {
                information: "hi".to_string(),
            },
            42,
        );
        assert_eq!(msg.priority, MAX_PRIORITY);
    }

    #[test]
    fn test_response_omits_empty_tool_call() {
        let msg = Message::new(
            2,
            "executor",
            vec![SERVER.to_string()],
            Payload::Response {
                node_id: "execute".to_string(),
                status: NodeOutcome::Completed,
                result: "done".to_string(),
                tool_call: None,
            },
            5,
        );
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["payload"]["status"], "completed");
        assert!(json["payload"].get("toolCall").is_none());
    }
}
