//! Agent model and state machine.
//!
//! An agent owns zero or more TaskNodes and communicates exclusively through
//! its inbox and outbox; only the bus's delivery and flush steps touch those
//! queues from outside.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::message::{AgentId, Message};

/// Agent lifecycle states. `Thinking` and `Executing` are logical sub-phases
/// of processing one message within a round; they are never observed across
/// a round boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentState {
    Idle,
    Waiting,
    Thinking,
    Executing,
    Completed,
    Failed,
}

impl AgentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Waiting => "WAITING",
            Self::Thinking => "THINKING",
            Self::Executing => "EXECUTING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// The closed transition set. Terminal states are never left.
    pub fn can_transition_to(&self, next: AgentState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, AgentState::Waiting)
                | (Self::Waiting, AgentState::Thinking)
                | (Self::Waiting, AgentState::Completed)
                | (Self::Thinking, AgentState::Executing)
                | (Self::Executing, AgentState::Waiting)
                | (Self::Executing, AgentState::Failed)
        )
    }
}

/// Priority inbox: highest priority first, FIFO among equal priorities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Inbox {
    queue: VecDeque<Message>,
}

impl Inbox {
    pub fn push(&mut self, message: Message) {
        self.queue.push_back(message);
    }

    /// Remove and return the highest-priority pending message. Scanning
    /// front-to-back with a strict comparison keeps arrival order among
    /// equal priorities.
    pub fn take_next(&mut self) -> Option<Message> {
        let mut best: Option<(usize, u8)> = None;
        for (idx, msg) in self.queue.iter().enumerate() {
            match best {
                Some((_, priority)) if msg.priority <= priority => {}
                _ => best = Some((idx, msg.priority)),
            }
        }
        best.and_then(|(idx, _)| self.queue.remove(idx))
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// A stateful unit owning TaskNodes, with exclusive inbox/outbox queues and
/// a private key-value memory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    pub description: String,
    pub capabilities: HashSet<String>,
    pub state: AgentState,
    pub inbox: Inbox,
    pub outbox: Vec<Message>,
    pub memory: HashMap<String, serde_json::Value>,
}

impl Agent {
    pub fn new(
        id: impl Into<AgentId>,
        name: impl Into<String>,
        role: impl Into<String>,
        description: impl Into<String>,
        capabilities: HashSet<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
            description: description.into(),
            capabilities,
            state: AgentState::Idle,
            inbox: Inbox::default(),
            outbox: Vec::new(),
            memory: HashMap::new(),
        }
    }

    pub fn remember(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.memory.insert(key.into(), value);
    }

    /// Append a notification's information under the shared `notifications`
    /// memory key so later prompts can surface what peers shared.
    pub fn absorb_notification(&mut self, from: &str, information: &str) {
        let entry = serde_json::json!({ "from": from, "information": information });
        match self.memory.get_mut("notifications") {
            Some(serde_json::Value::Array(items)) => items.push(entry),
            _ => {
                self.memory
                    .insert("notifications".to_string(), serde_json::Value::Array(vec![entry]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Payload, SERVER};

    fn notification(id: u64, priority: u8) -> Message {
        Message::new(
            id,
            SERVER,
            vec!["a".to_string()],
            Payload::Notification {
                information: format!("n{}", id),
            },
            priority,
        )
    }

    #[test]
    fn test_transitions_follow_the_machine() {
        use AgentState::*;
        assert!(Idle.can_transition_to(Waiting));
        assert!(Waiting.can_transition_to(Thinking));
        assert!(Thinking.can_transition_to(Executing));
        assert!(Executing.can_transition_to(Waiting));
        assert!(Executing.can_transition_to(Failed));
        assert!(Waiting.can_transition_to(Completed));

        assert!(!Idle.can_transition_to(Thinking));
        assert!(!Idle.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Waiting));
        assert!(!Failed.can_transition_to(Waiting));
        assert!(!Waiting.can_transition_to(Failed));
    }

    #[test]
    fn test_inbox_priority_descending_fifo_ties() {
        let mut inbox = Inbox::default();
        inbox.push(notification(1, 3));
        inbox.push(notification(2, 7));
        inbox.push(notification(3, 7));
        inbox.push(notification(4, 9));

        let order: Vec<u64> = std::iter::from_fn(|| inbox.take_next().map(|m| m.id)).collect();
        assert_eq!(order, vec![4, 2, 3, 1]);
        assert!(inbox.is_empty());
    }

    #[test]
    fn test_absorb_notification_accumulates() {
        let mut agent = Agent::new("a", "A", "researcher", "", HashSet::new());
        agent.absorb_notification("b", "first");
        agent.absorb_notification("c", "second");

        let notes = agent.memory.get("notifications").unwrap().as_array().unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[1]["from"], "c");
    }
}
