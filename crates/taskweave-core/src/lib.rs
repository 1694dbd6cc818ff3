//! Taskweave Core — the multi-agent message-passing scheduler.
//!
//! A task is decomposed into a dependency graph of sub-tasks, each owned by
//! a stateful in-process agent. Agents communicate through per-agent
//! inboxes/outboxes over a message bus, and a bounded, round-based step
//! loop drives the system to completion, failure, or timeout. What an agent
//! actually *thinks* is an opaque external capability behind the
//! [`reasoning::Reasoning`] trait.
//!
//! This crate has no transport, no persistence, and no UI dependency: the
//! canvas front-end, WebSocket delivery, and protocol prompt text all live
//! with the embedding application.

pub mod agent;
pub mod bus;
pub mod cancel;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod graph;
pub mod interpreter;
pub mod message;
pub mod planner;
pub mod reasoning;
pub mod registry;
pub mod scheduler;
pub mod tools;

// Convenience re-exports
pub use cancel::{CancelHandle, CancelToken};
pub use config::SchedulerConfig;
pub use context::{ExecutionContext, RunStatus};
pub use error::CoreError;
pub use events::{ExecutionCallbacks, StepEvent, StepStatus, ToolUseEvent};
pub use scheduler::{ExecutionResponse, ResponseMetadata, Scheduler, SchedulerBuilder};
