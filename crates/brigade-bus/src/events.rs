use brigade_core::AgentStatus;
use std::sync::Arc;
use uuid::Uuid;

/// Event name for agent registrations.
pub const AGENT_REGISTERED: &str = "agent_registered";
/// Event name for agent unregistrations.
pub const AGENT_UNREGISTERED: &str = "agent_unregistered";
/// Event name for agent status changes.
pub const AGENT_STATUS: &str = "agent_status";

/// A lifecycle event emitted by the bus, independent of message routing.
#[derive(Debug, Clone)]
pub enum BusEvent {
    /// An agent was added to the registry.
    AgentRegistered {
        /// The registered agent.
        agent_id: String,
    },
    /// An agent was removed from the registry and every capability bucket.
    AgentUnregistered {
        /// The removed agent.
        agent_id: String,
    },
    /// An agent's live status changed.
    AgentStatusChanged {
        /// The affected agent.
        agent_id: String,
        /// The new status.
        status: AgentStatus,
    },
}

impl BusEvent {
    /// The pub/sub topic this event is delivered on.
    pub fn name(&self) -> &'static str {
        match self {
            BusEvent::AgentRegistered { .. } => AGENT_REGISTERED,
            BusEvent::AgentUnregistered { .. } => AGENT_UNREGISTERED,
            BusEvent::AgentStatusChanged { .. } => AGENT_STATUS,
        }
    }
}

/// A lifecycle listener registered with [`MessageBus::on`](crate::MessageBus::on).
pub type BusListener = Arc<dyn Fn(&BusEvent) + Send + Sync>;

/// Token returned by `on`, required by `off`.
pub type ListenerId = Uuid;
