//! Agent registry — ordered agent storage plus the state transition trace.
//!
//! Iteration order is plan order, which is what makes rounds deterministic
//! given the same reasoning outputs. Every transition is validated against
//! the state machine and recorded; the trace feeds the execution
//! visualization layer and the scenario tests.

use std::collections::HashMap;

use serde::Serialize;

use crate::agent::{Agent, AgentState};
use crate::error::CoreError;
use crate::message::AgentId;

/// One recorded state change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTransition {
    pub agent_id: AgentId,
    pub from: AgentState,
    pub to: AgentState,
    pub round: u32,
}

#[derive(Default)]
pub struct AgentRegistry {
    order: Vec<AgentId>,
    agents: HashMap<AgentId, Agent>,
    trace: Vec<StateTransition>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, agent: Agent) {
        if self.agents.contains_key(&agent.id) {
            tracing::warn!("[Registry] Replacing agent: {}", agent.id);
        } else {
            self.order.push(agent.id.clone());
        }
        self.agents.insert(agent.id.clone(), agent);
    }

    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }

    /// Agent ids in insertion (plan) order.
    pub fn ids(&self) -> impl Iterator<Item = &AgentId> {
        self.order.iter()
    }

    /// Agents in insertion (plan) order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.order.iter().filter_map(|id| self.agents.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Apply a validated state transition and record it in the trace.
    pub fn transition(
        &mut self,
        id: &str,
        to: AgentState,
        round: u32,
    ) -> Result<(), CoreError> {
        let agent = self
            .agents
            .get_mut(id)
            .ok_or_else(|| CoreError::InvalidTransition {
                agent: id.to_string(),
                from: "<unknown>".to_string(),
                to: to.as_str().to_string(),
            })?;

        let from = agent.state;
        if !from.can_transition_to(to) {
            return Err(CoreError::InvalidTransition {
                agent: id.to_string(),
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }

        agent.state = to;
        tracing::debug!(
            "[Registry] {}: {} -> {} (round {})",
            id,
            from.as_str(),
            to.as_str(),
            round
        );
        self.trace.push(StateTransition {
            agent_id: id.to_string(),
            from,
            to,
            round,
        });
        Ok(())
    }

    pub fn all_terminal(&self) -> bool {
        !self.is_empty() && self.agents.values().all(|a| a.state.is_terminal())
    }

    pub fn failed_ids(&self) -> Vec<AgentId> {
        self.agents()
            .filter(|a| a.state == AgentState::Failed)
            .map(|a| a.id.clone())
            .collect()
    }

    pub fn trace(&self) -> &[StateTransition] {
        &self.trace
    }

    /// The sequence of states one agent has visited, starting from Idle.
    pub fn state_trace(&self, id: &str) -> Vec<AgentState> {
        let mut states = vec![AgentState::Idle];
        for t in &self.trace {
            if t.agent_id == id {
                states.push(t.to);
            }
        }
        states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn registry_with(ids: &[&str]) -> AgentRegistry {
        let mut registry = AgentRegistry::new();
        for id in ids {
            registry.insert(Agent::new(*id, *id, "worker", "", HashSet::new()));
        }
        registry
    }

    #[test]
    fn test_iteration_preserves_insertion_order() {
        let registry = registry_with(&["c", "a", "b"]);
        let ids: Vec<&str> = registry.ids().map(|s| s.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_illegal_transition_is_rejected() {
        let mut registry = registry_with(&["a"]);
        let err = registry.transition("a", AgentState::Completed, 0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert_eq!(registry.get("a").unwrap().state, AgentState::Idle);
        assert!(registry.trace().is_empty());
    }

    #[test]
    fn test_trace_records_full_path() {
        let mut registry = registry_with(&["a"]);
        registry.transition("a", AgentState::Waiting, 0).unwrap();
        registry.transition("a", AgentState::Thinking, 1).unwrap();
        registry.transition("a", AgentState::Executing, 1).unwrap();
        registry.transition("a", AgentState::Waiting, 1).unwrap();
        registry.transition("a", AgentState::Completed, 1).unwrap();

        use AgentState::*;
        assert_eq!(
            registry.state_trace("a"),
            vec![Idle, Waiting, Thinking, Executing, Waiting, Completed]
        );
        assert!(registry.all_terminal());
    }
}
