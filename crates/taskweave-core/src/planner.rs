//! Planner-output interpretation.
//!
//! The planning collaborator (the same opaque reasoning capability, given a
//! planning prompt) returns text describing agents and a task graph. This
//! module turns that text into a validated `Plan` — or, when the output is
//! malformed in any way, substitutes the fallback linear chain. Forward
//! progress is prioritized over plan fidelity: planning problems are never
//! fatal.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::graph::{TaskGraph, TaskNode};
use crate::interpreter::extract_json_block;
use crate::message::AgentId;

/// Agent roster entry produced by planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpec {
    pub id: AgentId,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// A validated plan: the agent roster plus the dependency graph.
#[derive(Debug, Clone)]
pub struct Plan {
    pub agents: Vec<AgentSpec>,
    pub graph: TaskGraph,
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(default)]
    agents: Vec<AgentSpec>,
    #[serde(default, alias = "tasks")]
    nodes: Vec<TaskNode>,
}

/// The prompt handed to the reasoning capability for the planning step.
pub fn planning_prompt(goal: &str) -> String {
    format!(
        "Decompose the following goal into a dependency graph of sub-tasks, \
         each owned by one agent.\n\n\
         Goal: {}\n\n\
         Reply with JSON only:\n\
         {{\"agents\": [{{\"id\", \"name\", \"role\", \"description\", \"capabilities\": []}}],\n \
         \"nodes\": [{{\"id\", \"agentId\", \"task\", \"dependencies\": []}}]}}",
        goal
    )
}

/// Interpret planner output, substituting the fallback chain on any defect.
pub fn interpret_plan(raw: &str, goal: &str) -> Plan {
    match try_parse(raw) {
        Ok(plan) => {
            tracing::info!(
                "[Planner] Parsed plan: {} agents, {} nodes",
                plan.agents.len(),
                plan.graph.len()
            );
            plan
        }
        Err(reason) => {
            tracing::warn!("[Planner] {} — substituting fallback chain", reason);
            fallback_plan(goal)
        }
    }
}

fn try_parse(raw: &str) -> Result<Plan, String> {
    let candidate = strip_code_fences(raw);
    let block = extract_json_block(&candidate)
        .ok_or_else(|| "no JSON object in planner output".to_string())?;
    let parsed: RawPlan =
        serde_json::from_str(block).map_err(|e| format!("unparsable plan JSON: {}", e))?;
    validate(parsed)
}

fn validate(raw: RawPlan) -> Result<Plan, String> {
    if raw.nodes.is_empty() {
        return Err("plan has no nodes".to_string());
    }
    if raw.agents.is_empty() {
        return Err("plan has no agents".to_string());
    }

    let agent_ids: HashSet<&str> = raw.agents.iter().map(|a| a.id.as_str()).collect();
    let mut node_ids: HashSet<&str> = HashSet::new();
    for node in &raw.nodes {
        if !node_ids.insert(node.id.as_str()) {
            return Err(format!("duplicate node id: {}", node.id));
        }
        if !agent_ids.contains(node.agent_id.as_str()) {
            return Err(format!(
                "node {} assigned to unknown agent {}",
                node.id, node.agent_id
            ));
        }
    }
    for node in &raw.nodes {
        for dep in &node.dependencies {
            if !node_ids.contains(dep.as_str()) {
                return Err(format!(
                    "node {} depends on unknown node {}",
                    node.id, dep
                ));
            }
        }
    }

    Ok(Plan {
        agents: raw.agents,
        graph: TaskGraph::new(raw.nodes),
    })
}

/// The fallback linear chain: plan (coordinator) → research (researcher) →
/// execute (executor). The final response routes back through the server
/// bookkeeping to close out the coordinator's run.
pub fn fallback_plan(goal: &str) -> Plan {
    let agents = vec![
        AgentSpec {
            id: "coordinator".to_string(),
            name: "Coordinator".to_string(),
            role: "coordinator".to_string(),
            description: "Breaks the goal down and owns the final synthesis".to_string(),
            capabilities: Vec::new(),
        },
        AgentSpec {
            id: "researcher".to_string(),
            name: "Researcher".to_string(),
            role: "researcher".to_string(),
            description: "Gathers the information the goal needs".to_string(),
            capabilities: Vec::new(),
        },
        AgentSpec {
            id: "executor".to_string(),
            name: "Executor".to_string(),
            role: "executor".to_string(),
            description: "Carries out the goal using the research".to_string(),
            capabilities: Vec::new(),
        },
    ];

    let nodes = vec![
        TaskNode {
            id: "plan".to_string(),
            agent_id: "coordinator".to_string(),
            task: format!("Break down the goal into concrete steps: {}", goal),
            dependencies: Vec::new(),
        },
        TaskNode {
            id: "research".to_string(),
            agent_id: "researcher".to_string(),
            task: format!("Gather the information needed for: {}", goal),
            dependencies: vec!["plan".to_string()],
        },
        TaskNode {
            id: "execute".to_string(),
            agent_id: "executor".to_string(),
            task: format!("Carry out the goal using the research: {}", goal),
            dependencies: vec!["research".to_string()],
        },
    ];

    Plan {
        agents,
        graph: TaskGraph::new(nodes),
    }
}

/// Remove markdown code fences so fenced JSON parses like bare JSON.
fn strip_code_fences(text: &str) -> String {
    let re = Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("static regex");
    match re.captures(text) {
        Some(caps) => caps[1].to_string(),
        None => text.to_string(),
    }
}
