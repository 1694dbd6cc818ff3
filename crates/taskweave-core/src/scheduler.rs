//! The scheduler — a single-threaded, round-based simulation driving agents
//! to completion, failure, or timeout.
//!
//! Each round: (1) every non-terminal agent with pending mail processes
//! exactly one highest-priority message, (2) outboxes are flushed through
//! the bus, (3) newly-unlocked nodes are dispatched. Reasoning calls for
//! distinct agents are issued concurrently but their results apply only at
//! a synchronization barrier, so rounds stay deterministic given the same
//! reasoning outputs.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;

use crate::agent::{Agent, AgentState};
use crate::bus::MessageBus;
use crate::cancel::CancelToken;
use crate::config::SchedulerConfig;
use crate::context::{ExecutionContext, RunStatus};
use crate::error::CoreError;
use crate::events::{ExecutionCallbacks, StepEvent, ToolUseEvent};
use crate::graph::TaskNode;
use crate::interpreter::{HeuristicInterpreter, ResponseInterpreter};
use crate::message::{AgentId, NodeOutcome, Payload, SERVER};
use crate::planner::{interpret_plan, planning_prompt};
use crate::reasoning::Reasoning;
use crate::tools::{ToolCallRecord, ToolRegistry};

/// Run summary attached to every response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub run_id: String,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub rounds: u32,
    pub max_steps: u32,
    pub total_nodes: usize,
    pub dispatched_nodes: usize,
    pub completed_nodes: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_agents: Vec<AgentId>,
    pub message_count: usize,
    pub duration_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadlock_cycle: Option<Vec<String>>,
}

/// What `execute` hands back to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    pub content: String,
    pub metadata: ResponseMetadata,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Assembles a scheduler, validating the configuration and required
/// capabilities up front. A missing reasoning backend is a configuration
/// error here, before any round runs.
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    reasoning: Option<Arc<dyn Reasoning>>,
    interpreter: Option<Arc<dyn ResponseInterpreter>>,
    tools: ToolRegistry,
}

impl SchedulerBuilder {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            reasoning: None,
            interpreter: None,
            tools: ToolRegistry::new(),
        }
    }

    pub fn reasoning(mut self, backend: Arc<dyn Reasoning>) -> Self {
        self.reasoning = Some(backend);
        self
    }

    pub fn interpreter(mut self, interpreter: Arc<dyn ResponseInterpreter>) -> Self {
        self.interpreter = Some(interpreter);
        self
    }

    pub fn tool<T: crate::tools::Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn build(self) -> Result<Scheduler, CoreError> {
        self.config.validate()?;
        let reasoning = self.reasoning.ok_or_else(|| {
            CoreError::Configuration("no reasoning backend configured".to_string())
        })?;
        Ok(Scheduler {
            bus: MessageBus::new(self.config.default_priority),
            config: self.config,
            reasoning,
            interpreter: self
                .interpreter
                .unwrap_or_else(|| Arc::new(HeuristicInterpreter)),
            tools: Arc::new(self.tools),
        })
    }
}

/// One COMMAND selected for processing this round.
struct PreparedWork {
    agent_id: AgentId,
    node_id: String,
    task: String,
    message_id: u64,
    prompt: String,
}

enum WorkOutcome {
    Responded {
        decision: crate::interpreter::AgentDecision,
        tool_record: Option<ToolCallRecord>,
    },
    Errored {
        error: String,
    },
}

pub struct Scheduler {
    config: SchedulerConfig,
    reasoning: Arc<dyn Reasoning>,
    interpreter: Arc<dyn ResponseInterpreter>,
    tools: Arc<ToolRegistry>,
    bus: MessageBus,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    pub fn builder(config: SchedulerConfig) -> SchedulerBuilder {
        SchedulerBuilder::new(config)
    }

    /// Run a goal to a terminal response. Planning errors, agent errors,
    /// tool errors, and deadlock timeouts are all absorbed into the
    /// response; this never returns an error to the caller.
    pub async fn execute(
        &self,
        goal: &str,
        callbacks: &ExecutionCallbacks,
    ) -> ExecutionResponse {
        let (response, _ctx) = self.execute_detailed(goal, callbacks, None).await;
        response
    }

    /// Like `execute`, but cancellable via an external token.
    pub async fn execute_with_cancel(
        &self,
        goal: &str,
        callbacks: &ExecutionCallbacks,
        cancel: CancelToken,
    ) -> ExecutionResponse {
        let (response, _ctx) = self.execute_detailed(goal, callbacks, Some(cancel)).await;
        response
    }

    /// Full-fat entry point: also returns the spent ExecutionContext so the
    /// owning protocol module can build its human-readable report before
    /// the context is dropped.
    pub async fn execute_detailed(
        &self,
        goal: &str,
        callbacks: &ExecutionCallbacks,
        mut cancel: Option<CancelToken>,
    ) -> (ExecutionResponse, ExecutionContext) {
        callbacks.fire_start();
        tracing::info!("[Scheduler] Run started: {}", goal);

        // ─── Planning ───────────────────────────────────────────────────
        let plan_description = "Decompose the goal into agents and a task graph";
        callbacks.fire_step(&StepEvent::started("plan", plan_description));
        let planning = match cancel.as_mut() {
            Some(token) => {
                let prompt = planning_prompt(goal);
                tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    result = self.reasoning.predict(&prompt) => Some(result),
                }
            }
            None => Some(self.reasoning.predict(&planning_prompt(goal)).await),
        };
        let cancelled_early = planning.is_none();
        let raw_plan = match planning {
            Some(Ok(text)) => text,
            Some(Err(e)) => {
                tracing::warn!(
                    "[Scheduler] Planning call failed ({}) — fallback plan will be used",
                    e
                );
                String::new()
            }
            None => String::new(),
        };
        let plan = interpret_plan(&raw_plan, goal);
        let mut ctx = ExecutionContext::new(goal, plan);
        callbacks.fire_step(&StepEvent::completed(
            "plan",
            plan_description,
            format!("{} agents, {} nodes", ctx.registry.len(), ctx.graph.len()),
        ));
        ctx.record(
            0,
            "plan",
            format!("{} agents, {} nodes", ctx.registry.len(), ctx.graph.len()),
        );

        let mut tool_calls: Vec<ToolCallRecord> = Vec::new();
        let mut rounds_used: u32 = 0;
        let mut deadlock_cycle: Option<Vec<String>> = None;

        if cancelled_early {
            let reason = "run cancelled by external signal".to_string();
            ctx.record(0, "cancelled", &reason);
            ctx.finish(RunStatus::Failed, Some(reason.clone()));
            callbacks.fire_error(&CoreError::Cancelled(reason));
            let response = self.assemble_response(&ctx, rounds_used, deadlock_cycle, tool_calls);
            return (response, ctx);
        }

        // ─── Seed the graph roots ───────────────────────────────────────
        let roots: Vec<TaskNode> = ctx.graph.root_nodes().into_iter().cloned().collect();
        for node in &roots {
            self.dispatch_command(&mut ctx, node, 0, callbacks);
        }

        // ─── Round loop ─────────────────────────────────────────────────
        'rounds: for round in 1..=self.config.max_steps {
            rounds_used = round;

            let work = self.select_work(&mut ctx, round);

            let reasoning = Arc::clone(&self.reasoning);
            let interpreter = Arc::clone(&self.interpreter);
            let tools = Arc::clone(&self.tools);
            let futures_vec: Vec<_> = work
                .into_iter()
                .map(|w| {
                    let reasoning = Arc::clone(&reasoning);
                    let interpreter = Arc::clone(&interpreter);
                    let tools = Arc::clone(&tools);
                    async move {
                        let outcome = match reasoning.predict(&w.prompt).await {
                            Err(e) => WorkOutcome::Errored {
                                error: e.to_string(),
                            },
                            Ok(text) => match interpreter.interpret(&text) {
                                Err(e) => WorkOutcome::Errored {
                                    error: e.to_string(),
                                },
                                Ok(decision) => {
                                    let tool_record = match &decision.tool {
                                        Some(directive) => Some(
                                            tools
                                                .invoke(&directive.name, directive.input.clone())
                                                .await,
                                        ),
                                        None => None,
                                    };
                                    WorkOutcome::Responded {
                                        decision,
                                        tool_record,
                                    }
                                }
                            },
                        };
                        (w, outcome)
                    }
                })
                .collect();

            // Barrier: all in-flight calls resolve (or the run is
            // cancelled) before any result is applied.
            let results = match cancel.as_mut() {
                Some(token) => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => None,
                        results = join_all(futures_vec) => Some(results),
                    }
                }
                None => Some(join_all(futures_vec).await),
            };

            let Some(results) = results else {
                let reason = "run cancelled by external signal".to_string();
                let notice = self.bus.compose(
                    SERVER,
                    vec![SERVER.to_string()],
                    Payload::System {
                        action: "cancelled".to_string(),
                        detail: reason.clone(),
                    },
                    None,
                );
                ctx.log.push(notice);
                ctx.record(round, "cancelled", &reason);
                ctx.finish(RunStatus::Failed, Some(reason.clone()));
                callbacks.fire_error(&CoreError::Cancelled(reason));
                break 'rounds;
            };

            self.apply_outcomes(&mut ctx, results, round, callbacks, &mut tool_calls);

            // Flush, then account completions/failures.
            let flush = self.bus.flush_outboxes(&mut ctx);
            for (node_id, owner, result) in &flush.completions {
                callbacks.fire_step(&StepEvent::completed(
                    node_id,
                    format!("completed by {}", owner),
                    result.clone(),
                ));
                ctx.record(round, "node_completed", format!("{} by {}", node_id, owner));
            }
            for (node_id, owner, result) in &flush.failures {
                callbacks.fire_step(&StepEvent::failed(
                    node_id,
                    format!("failed by {}", owner),
                    result.clone(),
                ));
                ctx.record(round, "node_failed", format!("{} by {}", node_id, owner));
            }

            // Agents whose last owned node just routed complete.
            let ids: Vec<AgentId> = ctx.registry.ids().cloned().collect();
            for id in &ids {
                let waiting = ctx.registry.get(id).map(|a| a.state) == Some(AgentState::Waiting);
                if waiting && !ctx.graph.has_unfinished_owned(id, &ctx.completed) {
                    if let Err(e) = ctx.registry.transition(id, AgentState::Completed, round) {
                        tracing::warn!("[Scheduler] {}", e);
                    } else {
                        ctx.record(round, "agent_completed", id.clone());
                    }
                }
            }

            // Dispatch newly-unlocked nodes.
            let ready: Vec<TaskNode> = ctx
                .graph
                .ready_nodes(&ctx.completed, &ctx.dispatched)
                .into_iter()
                .cloned()
                .collect();
            for node in &ready {
                self.dispatch_command(&mut ctx, node, round, callbacks);
            }

            if ctx.registry.all_terminal() {
                ctx.record(round, "terminal", "all agents terminal");
                ctx.finish(RunStatus::Completed, None);
                break 'rounds;
            }
        }

        // ─── Timeout / deadlock ─────────────────────────────────────────
        if ctx.status == RunStatus::Running {
            deadlock_cycle = ctx.graph.find_cycle();
            let mut reason = format!(
                "step budget ({}) exhausted before completion",
                self.config.max_steps
            );
            if let Some(path) = &deadlock_cycle {
                reason.push_str(&format!(" (dependency cycle: {})", path.join(" -> ")));
            }
            let notice = self.bus.compose(
                SERVER,
                vec![SERVER.to_string()],
                Payload::System {
                    action: "timeout".to_string(),
                    detail: reason.clone(),
                },
                None,
            );
            ctx.log.push(notice);
            ctx.record(rounds_used, "timeout", &reason);
            ctx.finish(RunStatus::Failed, Some(reason.clone()));
            callbacks.fire_error(&CoreError::DeadlockTimeout(reason));
        }

        let response = self.assemble_response(&ctx, rounds_used, deadlock_cycle, tool_calls);
        if ctx.status == RunStatus::Completed {
            callbacks.fire_complete(&response);
        }
        tracing::info!(
            "[Scheduler] Run {} finished: {} in {} rounds",
            ctx.run_id,
            ctx.status.as_str(),
            rounds_used
        );

        (response, ctx)
    }

    fn assemble_response(
        &self,
        ctx: &ExecutionContext,
        rounds_used: u32,
        deadlock_cycle: Option<Vec<String>>,
        tool_calls: Vec<ToolCallRecord>,
    ) -> ExecutionResponse {
        let content = {
            let results = ctx.completed_results();
            if results.is_empty() {
                ctx.failure_reason.clone().unwrap_or_default()
            } else {
                results
                    .iter()
                    .map(|(id, value)| {
                        let text = match value {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        format!("## {}\n\n{}", id, text)
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n")
            }
        };

        ExecutionResponse {
            content,
            metadata: ResponseMetadata {
                run_id: ctx.run_id.clone(),
                status: ctx.status,
                reason: ctx.failure_reason.clone(),
                rounds: rounds_used,
                max_steps: self.config.max_steps,
                total_nodes: ctx.graph.len(),
                dispatched_nodes: ctx.dispatched.len(),
                completed_nodes: ctx.completed.len(),
                failed_agents: ctx.registry.failed_ids(),
                message_count: ctx.log.len(),
                duration_ms: (Utc::now() - ctx.started_at).num_milliseconds(),
                deadlock_cycle,
            },
            tool_calls,
        }
    }

    /// Phase 1 of a round: each Waiting agent with pending mail takes its
    /// highest-priority message. COMMANDs become prepared work for the
    /// concurrent phase; notifications are absorbed into memory on the
    /// spot.
    fn select_work(&self, ctx: &mut ExecutionContext, round: u32) -> Vec<PreparedWork> {
        let mut work = Vec::new();
        let ids: Vec<AgentId> = ctx.registry.ids().cloned().collect();

        for id in &ids {
            let eligible = ctx
                .registry
                .get(id)
                .map(|a| a.state == AgentState::Waiting && !a.inbox.is_empty())
                .unwrap_or(false);
            if !eligible {
                continue;
            }
            if let Err(e) = ctx.registry.transition(id, AgentState::Thinking, round) {
                tracing::warn!("[Scheduler] {}", e);
                continue;
            }

            let Some(message) = ctx
                .registry
                .get_mut(id)
                .and_then(|a| a.inbox.take_next())
            else {
                continue;
            };

            match &message.payload {
                Payload::Command { task, node_id } => {
                    let deps = self.dependency_results(ctx, node_id);
                    let prompt = ctx
                        .registry
                        .get(id)
                        .map(|agent| {
                            processing_prompt(agent, task, &ctx.goal, &deps, &self.tools.names())
                        })
                        .unwrap_or_default();
                    work.push(PreparedWork {
                        agent_id: id.clone(),
                        node_id: node_id.clone(),
                        task: task.clone(),
                        message_id: message.id,
                        prompt,
                    });
                }
                Payload::Notification { information } => {
                    if let Some(agent) = ctx.registry.get_mut(id) {
                        agent.absorb_notification(&message.sender, information);
                    }
                    ctx.record(round, "notification_absorbed", id.clone());
                    self.pass_through(ctx, id, round);
                }
                other => {
                    tracing::debug!(
                        "[Scheduler] {} ignoring {} message {}",
                        id,
                        other.kind().as_str(),
                        message.id
                    );
                    self.pass_through(ctx, id, round);
                }
            }
        }

        work
    }

    /// Walk an agent through Thinking -> Executing -> Waiting for messages
    /// that need no reasoning.
    fn pass_through(&self, ctx: &mut ExecutionContext, id: &str, round: u32) {
        for state in [AgentState::Executing, AgentState::Waiting] {
            if let Err(e) = ctx.registry.transition(id, state, round) {
                tracing::warn!("[Scheduler] {}", e);
                return;
            }
        }
    }

    /// Phase 3 of a round: apply barrier-collected outcomes in agent order.
    fn apply_outcomes(
        &self,
        ctx: &mut ExecutionContext,
        results: Vec<(PreparedWork, WorkOutcome)>,
        round: u32,
        callbacks: &ExecutionCallbacks,
        tool_calls: &mut Vec<ToolCallRecord>,
    ) {
        for (work, outcome) in results {
            if let Err(e) = ctx.registry.transition(&work.agent_id, AgentState::Executing, round)
            {
                tracing::warn!("[Scheduler] {}", e);
                continue;
            }

            match outcome {
                WorkOutcome::Responded {
                    decision,
                    tool_record,
                } => {
                    if let Some(record) = &tool_record {
                        callbacks.fire_tool_use(&ToolUseEvent {
                            tool_name: record.tool.clone(),
                            input: record.input.clone(),
                            output: record.output.clone(),
                            error: record.error.clone(),
                        });
                        tool_calls.push(record.clone());
                    }

                    let mut outgoing = vec![self.bus.compose(
                        work.agent_id.clone(),
                        vec![SERVER.to_string()],
                        Payload::Response {
                            node_id: work.node_id.clone(),
                            status: decision.outcome,
                            result: decision.summary.clone(),
                            tool_call: tool_record,
                        },
                        None,
                    )];
                    for target in &decision.notify {
                        if target == &work.agent_id || !ctx.registry.contains(target) {
                            continue;
                        }
                        outgoing.push(self.bus.compose(
                            work.agent_id.clone(),
                            vec![target.clone()],
                            Payload::Notification {
                                information: decision.summary.clone(),
                            },
                            Some(self.config.notification_priority),
                        ));
                    }
                    if let Some(agent) = ctx.registry.get_mut(&work.agent_id) {
                        agent.outbox.extend(outgoing);
                    }

                    let next = match decision.outcome {
                        NodeOutcome::Completed => AgentState::Waiting,
                        NodeOutcome::Failed => AgentState::Failed,
                    };
                    if let Err(e) = ctx.registry.transition(&work.agent_id, next, round) {
                        tracing::warn!("[Scheduler] {}", e);
                    }
                    if next == AgentState::Failed {
                        ctx.record(
                            round,
                            "agent_failed",
                            format!("{} on node {}", work.agent_id, work.node_id),
                        );
                    }
                }
                WorkOutcome::Errored { error } => {
                    tracing::warn!(
                        "[Scheduler] {} errored on node {}: {}",
                        work.agent_id,
                        work.node_id,
                        error
                    );
                    let message = self.bus.compose(
                        work.agent_id.clone(),
                        vec![SERVER.to_string()],
                        Payload::Error {
                            message: error.clone(),
                            original_message_id: Some(work.message_id),
                        },
                        None,
                    );
                    if let Some(agent) = ctx.registry.get_mut(&work.agent_id) {
                        agent.outbox.push(message);
                    }
                    // Recoverable: back to Waiting, not Failed.
                    if let Err(e) =
                        ctx.registry.transition(&work.agent_id, AgentState::Waiting, round)
                    {
                        tracing::warn!("[Scheduler] {}", e);
                    }
                    callbacks.fire_step(&StepEvent::failed(&work.node_id, &work.task, &error));
                    ctx.record(
                        round,
                        "agent_error",
                        format!("{} on node {}: {}", work.agent_id, work.node_id, error),
                    );
                }
            }
        }
    }

    /// Dispatch one COMMAND for a ready node: log it, deliver it, mark the
    /// node dispatched, wake an Idle owner.
    fn dispatch_command(
        &self,
        ctx: &mut ExecutionContext,
        node: &TaskNode,
        round: u32,
        callbacks: &ExecutionCallbacks,
    ) {
        let command = self.bus.compose(
            SERVER,
            vec![node.agent_id.clone()],
            Payload::Command {
                task: node.task.clone(),
                node_id: node.id.clone(),
            },
            Some(self.config.command_priority),
        );
        ctx.log.push(command.clone());
        self.bus.deliver(ctx, &command);
        ctx.dispatched.insert(node.id.clone());

        if ctx.registry.get(&node.agent_id).map(|a| a.state) == Some(AgentState::Idle) {
            if let Err(e) = ctx.registry.transition(&node.agent_id, AgentState::Waiting, round) {
                tracing::warn!("[Scheduler] {}", e);
            }
        }

        callbacks.fire_step(&StepEvent::started(&node.id, &node.task));
        ctx.record(
            round,
            "dispatch",
            format!("{} -> {}", node.id, node.agent_id),
        );
        tracing::debug!(
            "[Scheduler] Dispatched node {} to {} (round {})",
            node.id,
            node.agent_id,
            round
        );
    }

    fn dependency_results(&self, ctx: &ExecutionContext, node_id: &str) -> Vec<(String, String)> {
        let Some(node) = ctx.graph.node(node_id) else {
            return Vec::new();
        };
        node.dependencies
            .iter()
            .map(|dep| {
                let text = match ctx.variables.get(dep) {
                    Some(serde_json::Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                };
                (dep.clone(), text)
            })
            .collect()
    }
}

/// The prompt an agent consults the reasoning capability with for one
/// COMMAND. Protocol-specific prompt text is out of scope; this is the
/// minimal scaffold naming the task, upstream results, shared
/// notifications, and the reply contract.
fn processing_prompt(
    agent: &Agent,
    task: &str,
    goal: &str,
    deps: &[(String, String)],
    tool_names: &[&str],
) -> String {
    let mut prompt = format!(
        "You are {} ({}). {}\n\nOverall goal: {}\n\nYour task: {}\n",
        agent.name, agent.role, agent.description, goal, task
    );

    if !deps.is_empty() {
        prompt.push_str("\nResults from prerequisite tasks:\n");
        for (dep, result) in deps {
            prompt.push_str(&format!("- {}: {}\n", dep, result));
        }
    }

    if let Some(notes) = agent.memory.get("notifications") {
        prompt.push_str(&format!("\nShared notes from other agents: {}\n", notes));
    }

    if !tool_names.is_empty() {
        prompt.push_str(&format!("\nAvailable tools: {}\n", tool_names.join(", ")));
    }

    prompt.push_str(
        "\nReply with JSON only: {\"summary\": \"...\", \"status\": \"completed\"|\"failed\", \
         \"tool\": {\"name\", \"input\"}?, \"notify\": [\"agentId\"]?}",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reasoning::ScriptedReasoning;

    #[test]
    fn test_missing_reasoning_backend_fails_at_build() {
        let err = Scheduler::builder(SchedulerConfig::default())
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
    }

    #[test]
    fn test_invalid_config_fails_at_build() {
        let config = SchedulerConfig {
            max_steps: 0,
            ..Default::default()
        };
        let err = Scheduler::builder(config)
            .reasoning(Arc::new(ScriptedReasoning::new(Vec::new())))
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
    }

    #[test]
    fn test_processing_prompt_mentions_task_and_deps() {
        let agent = Agent::new(
            "researcher",
            "Researcher",
            "researcher",
            "Gathers information",
            Default::default(),
        );
        let prompt = processing_prompt(
            &agent,
            "find sources",
            "write a survey",
            &[("plan".to_string(), "three steps".to_string())],
            &["web_search"],
        );
        assert!(prompt.contains("find sources"));
        assert!(prompt.contains("three steps"));
        assert!(prompt.contains("web_search"));
        assert!(prompt.contains("Reply with JSON"));
    }
}
