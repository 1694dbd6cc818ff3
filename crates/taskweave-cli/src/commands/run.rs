//! `taskweave run` — execute a goal and render the report.

use taskweave_core::events::{ExecutionCallbacks, StepStatus};
use taskweave_core::{RunStatus, Scheduler, SchedulerConfig};

use crate::commands::{build_backend, truncate, BackendConfig};

pub async fn run(
    goal: &str,
    backend_config: BackendConfig,
    max_steps: u32,
    json: bool,
) -> Result<(), String> {
    let reasoning = build_backend(&backend_config).map_err(|e| e.to_string())?;
    let config = SchedulerConfig {
        max_steps,
        ..Default::default()
    };
    let scheduler = Scheduler::builder(config)
        .reasoning(reasoning)
        .build()
        .map_err(|e| e.to_string())?;

    if !json {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║  Taskweave Scheduler                                     ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║  Goal    : {:<45} ║", truncate(goal, 45));
        println!("║  Backend : {:<45} ║", truncate(&backend_config.backend, 45));
        println!("║  Budget  : {:<45} ║", format!("{} rounds", max_steps));
        println!("╚══════════════════════════════════════════════════════════╝");
        println!();
    }

    let callbacks = if json {
        ExecutionCallbacks::new()
    } else {
        ExecutionCallbacks::new()
            .on_step(|event| match event.status {
                StepStatus::Started => {
                    println!("── {} ── {}", event.name, truncate(&event.description, 60));
                }
                StepStatus::Completed => {
                    let output = event.output.as_deref().unwrap_or("");
                    println!("   ✅ {} — {}", event.name, truncate(output, 60));
                }
                StepStatus::Failed => {
                    let error = event.error.as_deref().unwrap_or("unknown");
                    println!("   ❌ {} — {}", event.name, truncate(error, 60));
                }
            })
            .on_tool_use(|event| match &event.error {
                Some(error) => println!("   🔧 {} failed: {}", event.tool_name, truncate(error, 50)),
                None => println!("   🔧 {} ok", event.tool_name),
            })
    };

    let (response, ctx) = scheduler.execute_detailed(goal, &callbacks, None).await;

    if json {
        let dump = serde_json::json!({
            "response": serde_json::to_value(&response).map_err(|e| e.to_string())?,
            "messages": serde_json::to_value(&ctx.log).map_err(|e| e.to_string())?,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&dump).map_err(|e| e.to_string())?
        );
        return Ok(());
    }

    // The human-readable report, built from the spent execution context.
    println!();
    println!("═══════════════════════════════════════════════════════════");
    println!("  Run {}", response.metadata.run_id);
    println!(
        "  Status: {}",
        match response.metadata.status {
            RunStatus::Completed => "✅ COMPLETED",
            RunStatus::Failed => "❌ FAILED",
            RunStatus::Running => "… RUNNING",
        }
    );
    if let Some(reason) = &response.metadata.reason {
        println!("  Reason: {}", reason);
    }
    println!(
        "  Rounds: {}/{}   Nodes: {}/{} completed   Messages: {}",
        response.metadata.rounds,
        response.metadata.max_steps,
        response.metadata.completed_nodes,
        response.metadata.total_nodes,
        response.metadata.message_count,
    );
    for node in ctx.graph.nodes() {
        let icon = if ctx.completed.contains(&node.id) {
            "✅"
        } else if ctx.dispatched.contains(&node.id) {
            "⏳"
        } else {
            "–"
        };
        println!("    {} {} ({})", icon, node.id, node.agent_id);
    }
    if !response.tool_calls.is_empty() {
        println!("  Tool calls: {}", response.tool_calls.len());
    }
    println!("═══════════════════════════════════════════════════════════");

    if !response.content.is_empty() {
        println!();
        println!("{}", response.content);
    }

    if response.metadata.status == RunStatus::Failed {
        return Err(response
            .metadata
            .reason
            .unwrap_or_else(|| "run failed".to_string()));
    }
    Ok(())
}
