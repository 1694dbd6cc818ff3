//! Core error type for the Taskweave scheduler.
//!
//! Only `Configuration` is ever surfaced as a hard failure (synchronously,
//! when the scheduler is built). Everything else is absorbed during a run:
//! planning errors fall back to a substitute plan, agent and tool errors are
//! captured as messages, and deadlock/cancellation are reported through the
//! response metadata and the `on_error` callback.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Planning error: {0}")]
    Planning(String),

    #[error("Reasoning backend error: {0}")]
    Reasoning(String),

    #[error("Unparsable response: {0}")]
    Interpretation(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Invalid state transition for agent {agent}: {from} -> {to}")]
    InvalidTransition {
        agent: String,
        from: String,
        to: String,
    },

    #[error("Deadlock timeout: {0}")]
    DeadlockTimeout(String),

    #[error("Execution cancelled: {0}")]
    Cancelled(String),
}
