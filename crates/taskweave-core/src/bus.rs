//! MessageBus — construction, inbox delivery, and outbox flush.
//!
//! The bus is a plain object owned by the scheduler: no listeners, no
//! handler registry, no shared mutable state beyond the id counter.
//! Delivery within a round is not global-priority across agents; each
//! agent drains only its own highest-priority pending message per round,
//! which bounds per-round latency per agent.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::ExecutionContext;
use crate::message::{AgentId, Message, NodeOutcome, Payload, SERVER};

/// Outcome of one outbox flush.
#[derive(Debug, Default)]
pub struct FlushSummary {
    /// Messages appended to the global log.
    pub flushed: usize,
    /// `(node_id, owner_agent_id, result)` for responses that marked a node
    /// completed during this flush.
    pub completions: Vec<(String, AgentId, String)>,
    /// `(node_id, owner_agent_id, result)` for failed-node responses.
    pub failures: Vec<(String, AgentId, String)>,
}

pub struct MessageBus {
    next_id: AtomicU64,
    default_priority: u8,
}

impl MessageBus {
    pub fn new(default_priority: u8) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            default_priority,
        }
    }

    /// Construct a message with a fresh monotonic id. Messages are
    /// immutable from here on.
    pub fn compose(
        &self,
        sender: impl Into<AgentId>,
        recipients: Vec<AgentId>,
        payload: Payload,
        priority: Option<u8>,
    ) -> Message {
        Message::new(
            self.next_id.fetch_add(1, Ordering::Relaxed),
            sender,
            recipients,
            payload,
            priority.unwrap_or(self.default_priority),
        )
    }

    /// Append a message to each named recipient's inbox. The `"server"`
    /// sentinel is bookkeeping, not an agent; it is skipped here.
    pub fn deliver(&self, ctx: &mut ExecutionContext, message: &Message) -> usize {
        let mut delivered = 0;
        for recipient in &message.recipients {
            if recipient == SERVER {
                continue;
            }
            match ctx.registry.get_mut(recipient) {
                Some(agent) => {
                    agent.inbox.push(message.clone());
                    delivered += 1;
                }
                None => {
                    tracing::warn!(
                        "[Bus] Dropping message {} for unknown recipient: {}",
                        message.id,
                        recipient
                    );
                }
            }
        }
        delivered
    }

    /// Flush every agent's outbox: append each message to the global log,
    /// apply `"server"` graph bookkeeping for completed/failed node
    /// responses, and route everything else to the named inboxes.
    pub fn flush_outboxes(&self, ctx: &mut ExecutionContext) -> FlushSummary {
        let mut summary = FlushSummary::default();

        // Drain in registry (plan) order so routing is deterministic.
        let ids: Vec<AgentId> = ctx.registry.ids().cloned().collect();
        let mut pending: Vec<Message> = Vec::new();
        for id in &ids {
            if let Some(agent) = ctx.registry.get_mut(id) {
                pending.append(&mut agent.outbox);
            }
        }

        for message in pending {
            ctx.log.push(message.clone());
            summary.flushed += 1;

            for recipient in message.recipients.clone() {
                if recipient == SERVER {
                    self.apply_server_bookkeeping(ctx, &message, &mut summary);
                } else {
                    self.deliver_to(ctx, &recipient, &message);
                }
            }
        }

        summary
    }

    fn deliver_to(&self, ctx: &mut ExecutionContext, recipient: &str, message: &Message) {
        match ctx.registry.get_mut(recipient) {
            Some(agent) => agent.inbox.push(message.clone()),
            None => tracing::warn!(
                "[Bus] Dropping message {} for unknown recipient: {}",
                message.id,
                recipient
            ),
        }
    }

    fn apply_server_bookkeeping(
        &self,
        ctx: &mut ExecutionContext,
        message: &Message,
        summary: &mut FlushSummary,
    ) {
        let Payload::Response {
            node_id,
            status,
            result,
            ..
        } = &message.payload
        else {
            // ERROR and SYSTEM traffic to the server is log-only.
            return;
        };

        let Some(owner) = ctx.graph.node(node_id).map(|n| n.agent_id.clone()) else {
            tracing::warn!("[Bus] Response for unknown node: {}", node_id);
            return;
        };

        match status {
            NodeOutcome::Completed => {
                if ctx.completed.insert(node_id.clone()) {
                    ctx.variables
                        .insert(node_id.clone(), serde_json::Value::String(result.clone()));
                    summary
                        .completions
                        .push((node_id.clone(), owner, result.clone()));
                }
            }
            NodeOutcome::Failed => {
                summary
                    .failures
                    .push((node_id.clone(), owner, result.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionContext;
    use crate::planner::fallback_plan;

    fn test_ctx() -> ExecutionContext {
        ExecutionContext::new("goal", fallback_plan("goal"))
    }

    #[test]
    fn test_ids_are_unique_and_monotonic() {
        let bus = MessageBus::new(5);
        let a = bus.compose(SERVER, vec![], Payload::System {
            action: "tick".to_string(),
            detail: String::new(),
        }, None);
        let b = bus.compose(SERVER, vec![], Payload::System {
            action: "tick".to_string(),
            detail: String::new(),
        }, None);
        assert!(b.id > a.id);
        assert_eq!(a.priority, 5);
    }

    #[test]
    fn test_deliver_skips_server_and_unknown() {
        let bus = MessageBus::new(5);
        let mut ctx = test_ctx();
        let msg = bus.compose(
            SERVER,
            vec![
                SERVER.to_string(),
                "researcher".to_string(),
                "nobody".to_string(),
            ],
            Payload::Notification {
                information: "hi".to_string(),
            },
            None,
        );
        assert_eq!(bus.deliver(&mut ctx, &msg), 1);
        assert_eq!(ctx.registry.get("researcher").unwrap().inbox.len(), 1);
    }

    #[test]
    fn test_flush_marks_completion_and_routes_rest() {
        let bus = MessageBus::new(5);
        let mut ctx = test_ctx();

        let response = bus.compose(
            "coordinator",
            vec![SERVER.to_string()],
            Payload::Response {
                node_id: "plan".to_string(),
                status: NodeOutcome::Completed,
                result: "three steps".to_string(),
                tool_call: None,
            },
            None,
        );
        let note = bus.compose(
            "coordinator",
            vec!["researcher".to_string()],
            Payload::Notification {
                information: "heads up".to_string(),
            },
            Some(3),
        );
        let agent = ctx.registry.get_mut("coordinator").unwrap();
        agent.outbox.push(response);
        agent.outbox.push(note);

        let summary = bus.flush_outboxes(&mut ctx);
        assert_eq!(summary.flushed, 2);
        assert_eq!(summary.completions.len(), 1);
        assert_eq!(summary.completions[0].0, "plan");
        assert_eq!(summary.completions[0].1, "coordinator");
        assert!(ctx.completed.contains("plan"));
        assert_eq!(ctx.variables["plan"], "three steps");
        assert_eq!(ctx.log.len(), 2);
        assert_eq!(ctx.registry.get("researcher").unwrap().inbox.len(), 1);
        assert!(ctx.registry.get("coordinator").unwrap().outbox.is_empty());
    }

    #[test]
    fn test_duplicate_completion_is_idempotent() {
        let bus = MessageBus::new(5);
        let mut ctx = test_ctx();

        for _ in 0..2 {
            let response = bus.compose(
                "coordinator",
                vec![SERVER.to_string()],
                Payload::Response {
                    node_id: "plan".to_string(),
                    status: NodeOutcome::Completed,
                    result: "r".to_string(),
                    tool_call: None,
                },
                None,
            );
            ctx.registry
                .get_mut("coordinator")
                .unwrap()
                .outbox
                .push(response);
        }

        let summary = bus.flush_outboxes(&mut ctx);
        assert_eq!(summary.flushed, 2);
        assert_eq!(summary.completions.len(), 1);
    }

    #[test]
    fn test_failed_response_does_not_complete_node() {
        let bus = MessageBus::new(5);
        let mut ctx = test_ctx();
        let response = bus.compose(
            "coordinator",
            vec![SERVER.to_string()],
            Payload::Response {
                node_id: "plan".to_string(),
                status: NodeOutcome::Failed,
                result: "broken".to_string(),
                tool_call: None,
            },
            None,
        );
        ctx.registry
            .get_mut("coordinator")
            .unwrap()
            .outbox
            .push(response);

        let summary = bus.flush_outboxes(&mut ctx);
        assert!(summary.completions.is_empty());
        assert_eq!(summary.failures.len(), 1);
        assert!(!ctx.completed.contains("plan"));
    }
}
