use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default per-task timeout in milliseconds, used when a submission does not
/// provide one and as the default wait for result resolution.
pub const DEFAULT_TASK_TIMEOUT_MS: u64 = 30_000;

/// Priority of a task in the scheduling queue.
///
/// Ordering is by [`rank`](Self::rank): critical > high > medium > low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Background work, dequeued last.
    Low,
    /// The default priority.
    Medium,
    /// Dequeued before medium and low.
    High,
    /// Dequeued before everything else.
    Critical,
}

impl TaskPriority {
    /// Numeric rank used for queue ordering: critical=4, high=3, medium=2, low=1.
    pub fn rank(self) -> u8 {
        match self {
            TaskPriority::Low => 1,
            TaskPriority::Medium => 2,
            TaskPriority::High => 3,
            TaskPriority::Critical => 4,
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "low"),
            TaskPriority::Medium => write!(f, "medium"),
            TaskPriority::High => write!(f, "high"),
            TaskPriority::Critical => write!(f, "critical"),
        }
    }
}

/// Lifecycle status of a task. Transitions move forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Queued, not yet matched to an agent.
    Pending,
    /// Matched to an agent, delegation in progress.
    Assigned,
    /// Delegated; the agent is (or will be) computing.
    Running,
    /// Terminal: the agent reported success.
    Completed,
    /// Terminal: no agent was available or the agent reported failure.
    Failed,
}

impl TaskStatus {
    fn stage(self) -> u8 {
        match self {
            TaskStatus::Pending => 0,
            TaskStatus::Assigned => 1,
            TaskStatus::Running => 2,
            TaskStatus::Completed | TaskStatus::Failed => 3,
        }
    }

    /// Whether this status is terminal (completed or failed).
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Assigned => write!(f, "assigned"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A unit of asynchronous work owned by the scheduler.
///
/// Created on submission, mutated only by the scheduler and its completion
/// route, and retained in memory after completion for later status and
/// result queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, generated on submission.
    pub id: Uuid,
    /// The task type, resolved to a required capability before dispatch.
    pub task_type: String,
    /// Opaque JSON payload handed to the agent.
    pub data: serde_json::Value,
    /// Queue priority.
    pub priority: TaskPriority,
    /// Per-task timeout in milliseconds, used by result waits and workflows.
    pub timeout_ms: u64,
    /// Requested retry budget. Recorded on the task; the scheduler does not
    /// resubmit automatically (status transitions are monotonic).
    pub retries: u32,
    /// The agent the task was delegated to, if any. At most one at a time.
    pub assigned_agent: Option<String>,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// When the task was submitted.
    pub created_at: DateTime<Utc>,
    /// When the task was delegated to an agent.
    pub started_at: Option<DateTime<Utc>>,
    /// When the task reached a terminal status.
    pub completed_at: Option<DateTime<Utc>>,
    /// Result payload on success.
    pub result: Option<serde_json::Value>,
    /// Error description on failure.
    pub error: Option<String>,
}

impl Task {
    /// Create a pending task with default timeout and no retries.
    pub fn new(
        task_type: impl Into<String>,
        data: serde_json::Value,
        priority: TaskPriority,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_type: task_type.into(),
            data,
            priority,
            timeout_ms: DEFAULT_TASK_TIMEOUT_MS,
            retries: 0,
            assigned_agent: None,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        }
    }

    /// Set the per-task timeout in milliseconds.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the recorded retry budget.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Advance the lifecycle status. Returns `false` (without mutating) if
    /// the transition would regress or leave a terminal state.
    pub fn advance_status(&mut self, next: TaskStatus) -> bool {
        if self.status.is_terminal() || next.stage() <= self.status.stage() {
            return false;
        }
        self.status = next;
        true
    }
}
