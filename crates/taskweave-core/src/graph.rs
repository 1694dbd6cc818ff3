//! Task dependency graph and readiness queries.
//!
//! The readiness path is deliberately cycle-blind: a cyclic plan simply
//! never yields its stuck nodes and is caught by the scheduler's step
//! budget. `find_cycle` exists only to annotate that timeout afterwards.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::message::AgentId;

/// One unit of work, owned by exactly one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNode {
    pub id: String,
    pub agent_id: AgentId,
    pub task: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// `target` depends on `source`. Derived from node dependencies; used by
/// external rendering (the canvas draws these as arrows).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEdge {
    pub source: String,
    pub target: String,
}

/// The dependency DAG. Node order is plan order and drives deterministic
/// dispatch order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskGraph {
    nodes: Vec<TaskNode>,
}

impl TaskGraph {
    pub fn new(nodes: Vec<TaskNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[TaskNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&TaskNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edges(&self) -> Vec<TaskEdge> {
        self.nodes
            .iter()
            .flat_map(|n| {
                n.dependencies.iter().map(|dep| TaskEdge {
                    source: dep.clone(),
                    target: n.id.clone(),
                })
            })
            .collect()
    }

    /// Nodes with no incoming edges — the initial dispatch set.
    pub fn root_nodes(&self) -> Vec<&TaskNode> {
        self.nodes
            .iter()
            .filter(|n| n.dependencies.is_empty())
            .collect()
    }

    /// Nodes whose every dependency is completed and which have not yet
    /// been dispatched.
    pub fn ready_nodes(
        &self,
        completed: &HashSet<String>,
        dispatched: &HashSet<String>,
    ) -> Vec<&TaskNode> {
        self.nodes
            .iter()
            .filter(|n| {
                !dispatched.contains(&n.id)
                    && n.dependencies.iter().all(|dep| completed.contains(dep))
            })
            .collect()
    }

    pub fn is_complete(&self, completed: &HashSet<String>) -> bool {
        self.nodes.iter().all(|n| completed.contains(&n.id))
    }

    pub fn nodes_owned_by(&self, agent_id: &str) -> Vec<&TaskNode> {
        self.nodes.iter().filter(|n| n.agent_id == agent_id).collect()
    }

    pub fn has_unfinished_owned(&self, agent_id: &str, completed: &HashSet<String>) -> bool {
        self.nodes
            .iter()
            .any(|n| n.agent_id == agent_id && !completed.contains(&n.id))
    }

    /// Ids of all owning agents.
    pub fn owner_ids(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.agent_id.as_str()).collect()
    }

    /// DFS cycle probe over the dependency relation. Returns the offending
    /// path when a cycle exists. Only called after a timeout, to tell a
    /// cyclic plan apart from one that was merely too large for the budget.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let deps: HashMap<&str, &[String]> = self
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.dependencies.as_slice()))
            .collect();

        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: HashSet<&str> = HashSet::new();
        let mut path: Vec<String> = Vec::new();

        for node in &self.nodes {
            if dfs(node.id.as_str(), &deps, &mut visited, &mut stack, &mut path) {
                return Some(path);
            }
        }
        None
    }
}

fn dfs<'a>(
    node: &'a str,
    deps: &HashMap<&'a str, &'a [String]>,
    visited: &mut HashSet<&'a str>,
    stack: &mut HashSet<&'a str>,
    path: &mut Vec<String>,
) -> bool {
    if stack.contains(node) {
        path.push(node.to_string());
        return true;
    }
    if visited.contains(node) {
        return false;
    }

    visited.insert(node);
    stack.insert(node);
    path.push(node.to_string());

    if let Some(node_deps) = deps.get(node) {
        for dep in node_deps.iter() {
            if deps.contains_key(dep.as_str())
                && dfs(dep.as_str(), deps, visited, stack, path)
            {
                return true;
            }
        }
    }

    stack.remove(node);
    path.pop();
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, agent: &str, deps: &[&str]) -> TaskNode {
        TaskNode {
            id: id.to_string(),
            agent_id: agent.to_string(),
            task: format!("task {}", id),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn diamond() -> TaskGraph {
        TaskGraph::new(vec![
            node("a", "x", &[]),
            node("b", "y", &["a"]),
            node("c", "y", &["a"]),
            node("d", "z", &["b", "c"]),
        ])
    }

    #[test]
    fn test_roots_and_edges() {
        let graph = diamond();
        let roots: Vec<&str> = graph.root_nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(roots, vec!["a"]);
        assert_eq!(graph.edges().len(), 4);
    }

    #[test]
    fn test_ready_nodes_respect_dependencies_and_dispatch() {
        let graph = diamond();
        let mut completed = HashSet::new();
        let mut dispatched = HashSet::new();

        dispatched.insert("a".to_string());
        assert!(graph.ready_nodes(&completed, &dispatched).is_empty());

        completed.insert("a".to_string());
        let ready: Vec<&str> = graph
            .ready_nodes(&completed, &dispatched)
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ready, vec!["b", "c"]);

        dispatched.insert("b".to_string());
        dispatched.insert("c".to_string());
        completed.insert("b".to_string());
        // d still blocked on c
        assert!(graph.ready_nodes(&completed, &dispatched).is_empty());

        completed.insert("c".to_string());
        let ready: Vec<&str> = graph
            .ready_nodes(&completed, &dispatched)
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ready, vec!["d"]);
    }

    #[test]
    fn test_is_complete_requires_every_node() {
        let graph = diamond();
        let mut completed: HashSet<String> =
            ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert!(!graph.is_complete(&completed));
        completed.insert("d".to_string());
        assert!(graph.is_complete(&completed));
    }

    #[test]
    fn test_ownership_queries() {
        let graph = diamond();
        assert_eq!(graph.nodes_owned_by("y").len(), 2);
        let completed: HashSet<String> = ["b"].iter().map(|s| s.to_string()).collect();
        assert!(graph.has_unfinished_owned("y", &completed));
        let completed: HashSet<String> = ["b", "c"].iter().map(|s| s.to_string()).collect();
        assert!(!graph.has_unfinished_owned("y", &completed));
    }

    #[test]
    fn test_acyclic_graph_has_no_cycle() {
        assert!(diamond().find_cycle().is_none());
    }

    #[test]
    fn test_two_node_cycle_is_found() {
        let graph = TaskGraph::new(vec![node("a", "x", &["b"]), node("b", "y", &["a"])]);
        assert!(graph.root_nodes().is_empty());
        let cycle = graph.find_cycle().expect("cycle expected");
        assert!(cycle.len() >= 2);
    }

    #[test]
    fn test_self_cycle_is_found() {
        let graph = TaskGraph::new(vec![node("a", "x", &["a"])]);
        assert!(graph.find_cycle().is_some());
    }
}
