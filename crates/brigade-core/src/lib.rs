//! Core types and error definitions for the Brigade orchestration layer.
//!
//! This crate provides the foundational types shared across all Brigade
//! crates: the error taxonomy, the task model, the agent-facing message
//! envelopes, and agent configuration.
//!
//! # Main types
//!
//! - [`BrigadeError`] — Unified error enum for all Brigade subsystems.
//! - [`BrigadeResult`] — Convenience alias for `Result<T, BrigadeError>`.
//! - [`Task`] — A unit of asynchronous work with priority and lifecycle.
//! - [`Message`] — An envelope exchanged between the orchestrator and agents.
//! - [`AgentConfig`] — Static configuration of one agent.

/// Agent configuration and runtime status.
pub mod agent;
/// Message envelopes and wire payloads.
pub mod message;
/// The task model: priority, lifecycle status, and the task record.
pub mod task;

pub use agent::{AgentConfig, AgentStatus};
pub use message::{
    envelope, InitConfig, Message, ReadyPayload, TaskAssignment, TaskCompletion, TaskEnvelope,
};
pub use task::{Task, TaskPriority, TaskStatus, DEFAULT_TASK_TIMEOUT_MS};

use uuid::Uuid;

/// Top-level error type for the Brigade orchestration layer.
///
/// Each variant corresponds to a failure class defined by the scheduler's
/// error-handling contract.
#[derive(Debug, thiserror::Error)]
pub enum BrigadeError {
    /// A call was made against a scheduler that is not started, or with
    /// arguments that cannot be accepted.
    #[error("Submission error: {0}")]
    Submission(String),

    /// No registered agent exposes the capability a task requires.
    #[error("No agent available for capability '{0}'")]
    NoAgentAvailable(String),

    /// A waiting caller's deadline elapsed. The underlying task record is
    /// untouched and may still complete later without an observer.
    #[error("Task {0} did not complete within {1} ms")]
    TaskTimeout(Uuid, u64),

    /// An agent reported a task failure; recorded on the task record.
    #[error("Agent execution failed: {0}")]
    AgentExecution(String),

    /// An agent's execution context itself failed, distinct from a normal
    /// task failure. Handled internally via unregister + restart.
    #[error("Agent fault: {0}")]
    AgentFault(String),

    /// An error from the message bus (unknown target, closed inbox).
    #[error("Bus error: {0}")]
    Bus(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`BrigadeError`].
pub type BrigadeResult<T> = Result<T, BrigadeError>;
