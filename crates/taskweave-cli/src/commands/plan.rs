//! `taskweave plan` — print the planner's task graph without executing it.

use taskweave_core::planner::{interpret_plan, planning_prompt};

use crate::commands::{build_backend, truncate, BackendConfig};

pub async fn plan(goal: &str, backend_config: BackendConfig) -> Result<(), String> {
    let reasoning = build_backend(&backend_config).map_err(|e| e.to_string())?;

    let raw = match reasoning.predict(&planning_prompt(goal)).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Planning call failed ({}), showing the fallback plan", e);
            String::new()
        }
    };
    let plan = interpret_plan(&raw, goal);

    println!("Plan for: {}", truncate(goal, 70));
    println!();
    println!("Agents:");
    for agent in &plan.agents {
        let detail = if agent.description.is_empty() {
            agent.role.clone()
        } else {
            format!("{} — {}", agent.role, truncate(&agent.description, 50))
        };
        println!("  {} ({})", agent.id, detail);
    }
    println!();
    println!("Nodes:");
    for node in plan.graph.nodes() {
        let deps = if node.dependencies.is_empty() {
            "root".to_string()
        } else {
            format!("after {}", node.dependencies.join(", "))
        };
        println!(
            "  {} → {}  [{}]  {}",
            node.id,
            node.agent_id,
            deps,
            truncate(&node.task, 50)
        );
    }
    Ok(())
}
