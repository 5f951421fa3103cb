use crate::message::InitConfig;
use serde::{Deserialize, Serialize};

/// Static configuration of one agent, provided at registration time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Unique agent id.
    pub id: String,
    /// Capability tags this agent exposes for task routing.
    pub capabilities: Vec<String>,
    /// Scoring weight; higher wins ties between equally loaded agents.
    #[serde(default)]
    pub priority: i64,
    /// Concurrency hint forwarded in the init handshake.
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: u32,
    /// Whether the scheduler should restart this agent after a fault.
    #[serde(default)]
    pub restart_on_error: bool,
}

fn default_max_concurrent_tasks() -> u32 {
    1
}

impl AgentConfig {
    /// Create a config with weight 0, one concurrent task, and no restart.
    pub fn new(id: impl Into<String>, capabilities: Vec<String>) -> Self {
        Self {
            id: id.into(),
            capabilities,
            priority: 0,
            max_concurrent_tasks: default_max_concurrent_tasks(),
            restart_on_error: false,
        }
    }

    /// Set the scoring weight.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Set the concurrency hint.
    pub fn with_max_concurrent_tasks(mut self, max: u32) -> Self {
        self.max_concurrent_tasks = max;
        self
    }

    /// Enable or disable restart-after-fault.
    pub fn with_restart_on_error(mut self, restart: bool) -> Self {
        self.restart_on_error = restart;
        self
    }

    /// The wire payload for this agent's init handshake.
    pub fn init_payload(&self) -> InitConfig {
        InitConfig {
            agent_id: self.id.clone(),
            capabilities: self.capabilities.clone(),
            max_concurrent_tasks: self.max_concurrent_tasks,
        }
    }
}

/// Live status of a registered agent, held by the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Registered and not processing anything.
    Idle,
    /// Has at least one delegated task outstanding.
    Busy,
    /// The execution context failed; not selectable until restarted.
    Error,
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStatus::Idle => write!(f, "idle"),
            AgentStatus::Busy => write!(f, "busy"),
            AgentStatus::Error => write!(f, "error"),
        }
    }
}
