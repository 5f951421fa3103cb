use crate::task::TaskPriority;
use crate::BrigadeResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Well-known envelope types exchanged between the orchestrator and agents.
pub mod envelope {
    /// Orchestrator → agent: initialization handshake.
    pub const INIT: &str = "init";
    /// Agent → orchestrator: reply to [`INIT`].
    pub const READY: &str = "ready";
    /// Orchestrator → agent: a delegated task.
    pub const TASK: &str = "task";
    /// Agent → orchestrator: the outcome of a delegated task, exactly once.
    pub const TASK_COMPLETE: &str = "task_complete";
    /// Orchestrator → agent: stop processing and exit.
    pub const SHUTDOWN: &str = "shutdown";
}

/// A message routed through the bus. Ephemeral; never persisted.
///
/// An absent `target` means broadcast to every registered agent. Payloads
/// cross the agent boundary as JSON only, so a faulting agent cannot corrupt
/// orchestrator state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Envelope type; routes match against this.
    #[serde(rename = "type")]
    pub message_type: String,
    /// Identifier of the sender ("scheduler", "bus", or an agent id).
    pub source: String,
    /// Recipient agent id; `None` broadcasts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// JSON payload.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Delivery priority (informational; delivery itself is FIFO per agent).
    #[serde(default)]
    pub priority: TaskPriority,
}

impl Message {
    /// Create a broadcast message with the given type and payload.
    pub fn new(
        message_type: impl Into<String>,
        source: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            message_type: message_type.into(),
            source: source.into(),
            target: None,
            payload,
            priority: TaskPriority::default(),
        }
    }

    /// Address the message to a single agent.
    pub fn to_agent(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Override the delivery priority.
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Build the `init` handshake addressed to one agent.
    pub fn init(
        source: impl Into<String>,
        target: impl Into<String>,
        config: &InitConfig,
    ) -> BrigadeResult<Self> {
        let payload = serde_json::json!({ "config": serde_json::to_value(config)? });
        Ok(Self::new(envelope::INIT, source, payload)
            .to_agent(target)
            .with_priority(TaskPriority::High))
    }

    /// Build the `ready` reply an agent sends after initialization.
    pub fn ready(agent_id: impl Into<String>) -> Self {
        let agent_id = agent_id.into();
        let payload = serde_json::json!({ "agentId": agent_id });
        Self::new(envelope::READY, agent_id, payload)
    }

    /// Build a `task` delegation addressed to one agent. The message priority
    /// mirrors the task's.
    pub fn task(
        source: impl Into<String>,
        target: impl Into<String>,
        task: TaskEnvelope,
    ) -> BrigadeResult<Self> {
        let priority = task.priority;
        let payload = serde_json::to_value(TaskAssignment { task })?;
        Ok(Self::new(envelope::TASK, source, payload)
            .to_agent(target)
            .with_priority(priority))
    }

    /// Build a `task_complete` report from an agent.
    pub fn task_complete(
        source: impl Into<String>,
        completion: &TaskCompletion,
    ) -> BrigadeResult<Self> {
        let payload = serde_json::to_value(completion)?;
        Ok(Self::new(envelope::TASK_COMPLETE, source, payload).with_priority(TaskPriority::High))
    }

    /// Build a `shutdown` envelope addressed to one agent.
    pub fn shutdown(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(envelope::SHUTDOWN, source, serde_json::Value::Null)
            .to_agent(target)
            .with_priority(TaskPriority::Critical)
    }
}

/// Payload of the `init` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitConfig {
    /// The id the agent must report back in `ready`.
    pub agent_id: String,
    /// Capabilities the orchestrator registered for this agent.
    pub capabilities: Vec<String>,
    /// Concurrency hint; agents process their inbox serially regardless.
    pub max_concurrent_tasks: u32,
}

/// Payload of the `ready` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyPayload {
    /// The agent confirming initialization.
    pub agent_id: String,
}

/// The task fields an agent needs; a projection of the scheduler's record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEnvelope {
    /// Task id, echoed back in `task_complete`.
    pub id: Uuid,
    /// Task type.
    #[serde(rename = "type")]
    pub task_type: String,
    /// Opaque task payload.
    pub data: serde_json::Value,
    /// Task priority.
    pub priority: TaskPriority,
}

/// Payload of the `task` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssignment {
    /// The delegated task.
    pub task: TaskEnvelope,
}

/// Payload of the `task_complete` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletion {
    /// Id of the task this outcome belongs to.
    pub task_id: Uuid,
    /// Whether the agent succeeded.
    pub success: bool,
    /// Result payload when `success` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error description when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock execution time in milliseconds, as measured by the agent.
    #[serde(rename = "executionTime")]
    pub execution_time_ms: u64,
}

impl TaskCompletion {
    /// Build a success report.
    pub fn success(task_id: Uuid, result: serde_json::Value, execution_time_ms: u64) -> Self {
        Self {
            task_id,
            success: true,
            result: Some(result),
            error: None,
            execution_time_ms,
        }
    }

    /// Build a failure report.
    pub fn failure(task_id: Uuid, error: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            task_id,
            success: false,
            result: None,
            error: Some(error.into()),
            execution_time_ms,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_broadcast_has_no_target() {
        let msg = Message::new("menu_updated", "scheduler", json!({"items": 3}));
        assert!(msg.target.is_none());
        assert_eq!(msg.priority, TaskPriority::Medium);
    }

    #[test]
    fn test_init_wire_format() {
        let config = InitConfig {
            agent_id: "inventory-agent".into(),
            capabilities: vec!["inventory_forecasting".into()],
            max_concurrent_tasks: 1,
        };
        let msg = Message::init("scheduler", "inventory-agent", &config).unwrap();
        assert_eq!(msg.message_type, envelope::INIT);
        assert_eq!(msg.target.as_deref(), Some("inventory-agent"));
        assert_eq!(
            msg.payload["config"]["agentId"],
            json!("inventory-agent"),
            "init config must use camelCase on the wire"
        );
        assert_eq!(msg.payload["config"]["maxConcurrentTasks"], json!(1));
    }

    #[test]
    fn test_task_wire_format() {
        let envelope = TaskEnvelope {
            id: Uuid::new_v4(),
            task_type: "optimize_orders".into(),
            data: json!({"orders": []}),
            priority: TaskPriority::High,
        };
        let msg = Message::task("scheduler", "order-agent", envelope).unwrap();
        assert_eq!(msg.message_type, "task");
        assert_eq!(msg.priority, TaskPriority::High);
        assert_eq!(msg.payload["task"]["type"], json!("optimize_orders"));
    }

    #[test]
    fn test_completion_wire_format() {
        let id = Uuid::new_v4();
        let completion = TaskCompletion::success(id, json!({"batches": 2}), 42);
        let msg = Message::task_complete("order-agent", &completion).unwrap();
        assert_eq!(msg.payload["taskId"], json!(id.to_string()));
        assert_eq!(msg.payload["executionTime"], json!(42));
        assert!(msg.payload.get("error").is_none());

        let parsed: TaskCompletion = serde_json::from_value(msg.payload).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.task_id, id);
    }

    #[test]
    fn test_failure_completion_roundtrip() {
        let completion = TaskCompletion::failure(Uuid::new_v4(), "missing inventory data", 7);
        let value = serde_json::to_value(&completion).unwrap();
        assert!(value.get("result").is_none());
        let parsed: TaskCompletion = serde_json::from_value(value).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.error.as_deref(), Some("missing inventory data"));
    }

    #[test]
    fn test_ready_identifies_agent() {
        let msg = Message::ready("order-agent");
        let payload: ReadyPayload = serde_json::from_value(msg.payload).unwrap();
        assert_eq!(payload.agent_id, "order-agent");
        assert_eq!(msg.source, "order-agent");
    }
}
