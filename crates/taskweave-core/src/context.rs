//! Per-run execution context.
//!
//! Created once per task submission, owned exclusively by the scheduler for
//! the run's lifetime, and discarded once the terminal response has been
//! assembled. Nothing here survives a run.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::agent::Agent;
use crate::graph::TaskGraph;
use crate::message::Message;
use crate::planner::Plan;
use crate::registry::AgentRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

/// One human-readable line in the execution log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionLogEntry {
    pub round: u32,
    pub event: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

pub struct ExecutionContext {
    pub run_id: String,
    pub goal: String,
    pub registry: AgentRegistry,
    pub graph: TaskGraph,
    /// Append-only log of every routed message.
    pub log: Vec<Message>,
    /// Node ids with a routed completed response.
    pub completed: HashSet<String>,
    /// Node ids a COMMAND has been dispatched for. Never removed.
    pub dispatched: HashSet<String>,
    /// Shared results, keyed by node id. Dependent prompts read these.
    pub variables: HashMap<String, serde_json::Value>,
    pub execution_log: Vec<ExecutionLogEntry>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub failure_reason: Option<String>,
}

impl ExecutionContext {
    /// Build a context from a plan. Agents owning no nodes are dropped: the
    /// state machine has no Idle -> Completed edge, so they could never
    /// terminate and would force every run into the timeout path.
    pub fn new(goal: impl Into<String>, plan: Plan) -> Self {
        let goal = goal.into();
        let owners = plan.graph.owner_ids();
        let mut registry = AgentRegistry::new();
        for spec in plan.agents {
            if !owners.contains(spec.id.as_str()) {
                tracing::warn!("[Context] Dropping agent with no owned nodes: {}", spec.id);
                continue;
            }
            registry.insert(Agent::new(
                spec.id,
                spec.name,
                spec.role,
                spec.description,
                spec.capabilities.into_iter().collect(),
            ));
        }

        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            goal,
            registry,
            graph: plan.graph,
            log: Vec::new(),
            completed: HashSet::new(),
            dispatched: HashSet::new(),
            variables: HashMap::new(),
            execution_log: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            status: RunStatus::Running,
            failure_reason: None,
        }
    }

    pub fn record(&mut self, round: u32, event: impl Into<String>, detail: impl Into<String>) {
        self.execution_log.push(ExecutionLogEntry {
            round,
            event: event.into(),
            detail: detail.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn finish(&mut self, status: RunStatus, reason: Option<String>) {
        self.status = status;
        self.failure_reason = reason;
        self.finished_at = Some(Utc::now());
    }

    /// Completed node results in plan order.
    pub fn completed_results(&self) -> Vec<(&str, &serde_json::Value)> {
        self.graph
            .nodes()
            .iter()
            .filter(|n| self.completed.contains(&n.id))
            .filter_map(|n| self.variables.get(&n.id).map(|v| (n.id.as_str(), v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{fallback_plan, AgentSpec, Plan};

    #[test]
    fn test_context_from_fallback_plan() {
        let ctx = ExecutionContext::new("goal", fallback_plan("goal"));
        assert_eq!(ctx.registry.len(), 3);
        assert_eq!(ctx.graph.len(), 3);
        assert_eq!(ctx.status, RunStatus::Running);
        assert!(ctx.log.is_empty());
    }

    #[test]
    fn test_zero_node_agents_are_dropped() {
        let mut plan = fallback_plan("goal");
        plan.agents.push(AgentSpec {
            id: "observer".to_string(),
            name: "Observer".to_string(),
            role: "observer".to_string(),
            description: String::new(),
            capabilities: Vec::new(),
        });
        let ctx = ExecutionContext::new("goal", Plan {
            agents: plan.agents,
            graph: plan.graph,
        });
        assert_eq!(ctx.registry.len(), 3);
        assert!(!ctx.registry.contains("observer"));
    }
}
