//! The Brigade task scheduler.
//!
//! Owns the task lifecycle: a priority queue drained by a single cooperative
//! loop, capability-based agent selection with scoring-based load balancing,
//! asynchronous result resolution with timeouts, agent fault recovery, and
//! the fixed coordination workflows that compose several tasks into one
//! business result.
//!
//! # Main types
//!
//! - [`TaskScheduler`] — submission, delegation, result resolution, status.
//! - [`SchedulerConfig`] — capability table + restart backoff.
//! - [`CapabilityTable`] — the static task-type → capability mapping.
//! - [`CoordinationScenario`] — the fixed multi-task workflows.

/// The static task-type → capability table.
pub mod capability;
/// Candidate scoring for agent selection.
pub mod scoring;
/// Coordination workflows composing several tasks into one result.
pub mod workflows;

mod queue;
mod scheduler;

pub use capability::{CapabilityTable, DEFAULT_CAPABILITY};
pub use scheduler::{
    AgentFactory, SchedulerConfig, SystemStatus, TaskCounts, TaskScheduler,
    COMPLETION_ROUTE_PRIORITY,
};
pub use workflows::CoordinationScenario;
