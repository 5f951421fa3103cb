use crate::capability::CapabilityTable;
use crate::queue::TaskQueue;
use crate::scoring::score_candidate;
use brigade_bus::{AgentHandle, BusEvent, MessageBus, RouteMatcher, AGENT_STATUS};
use brigade_core::{
    envelope, AgentConfig, AgentStatus, BrigadeError, BrigadeResult, Message, Task, TaskCompletion,
    TaskEnvelope, TaskPriority, TaskStatus,
};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Priority of the scheduler's completion route; observer routes on the same
/// message type must register below it.
pub const COMPLETION_ROUTE_PRIORITY: i64 = 10;

/// Creates a fresh execution context for an agent. Invoked at registration
/// and again on every restart after a fault.
pub type AgentFactory = Arc<dyn Fn(&AgentConfig) -> AgentHandle + Send + Sync>;

/// Scheduler construction parameters.
#[derive(Clone)]
pub struct SchedulerConfig {
    /// The static task-type → capability table.
    pub capability_table: CapabilityTable,
    /// Fixed delay before a faulted agent with `restart_on_error` is
    /// re-registered.
    pub restart_backoff_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            capability_table: CapabilityTable::new(),
            restart_backoff_ms: 1_000,
        }
    }
}

/// Why a task failed; refines the public error string into the right
/// taxonomy variant when a waiter resolves.
enum FailureKind {
    NoAgent(String),
    Execution,
}

struct TaskEntry {
    task: Task,
    done: watch::Sender<bool>,
    failure: Option<FailureKind>,
}

#[derive(Clone)]
struct ManagedAgent {
    config: AgentConfig,
    factory: AgentFactory,
}

struct SchedulerInner {
    bus: Arc<MessageBus>,
    config: SchedulerConfig,
    tasks: RwLock<HashMap<Uuid, TaskEntry>>,
    queue: Mutex<TaskQueue>,
    queue_signal: Notify,
    managed: RwLock<HashMap<String, ManagedAgent>>,
    started: AtomicBool,
    shutting_down: AtomicBool,
}

/// The task scheduler: owns the task lifecycle, the priority queue,
/// capability-based agent selection, coordination workflows, and agent fault
/// recovery.
///
/// Constructed with its collaborators injected; nothing here is a global.
/// All interior mutation happens in short lock scopes that never cross an
/// await point, and the drain loop guarantees at most one in-flight dequeue
/// at a time.
pub struct TaskScheduler {
    inner: Arc<SchedulerInner>,
    drain: Mutex<Option<JoinHandle<()>>>,
}

impl TaskScheduler {
    /// Create a scheduler over the given bus. Call [`start`](Self::start)
    /// before submitting work.
    pub fn new(bus: Arc<MessageBus>, config: SchedulerConfig) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                bus,
                config,
                tasks: RwLock::new(HashMap::new()),
                queue: Mutex::new(TaskQueue::new()),
                queue_signal: Notify::new(),
                managed: RwLock::new(HashMap::new()),
                started: AtomicBool::new(false),
                shutting_down: AtomicBool::new(false),
            }),
            drain: Mutex::new(None),
        }
    }

    /// Wire the completion route and the fault listener, and spawn the drain
    /// loop. Must be called from within a Tokio runtime.
    pub fn start(&self) -> BrigadeResult<()> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(BrigadeError::Submission(
                "Scheduler is already started".into(),
            ));
        }

        let completion = Arc::clone(&self.inner);
        self.inner.bus.add_route(
            RouteMatcher::exact(envelope::TASK_COMPLETE),
            Arc::new(move |msg| completion.on_task_complete(msg)),
            COMPLETION_ROUTE_PRIORITY,
        );

        let fault = Arc::clone(&self.inner);
        self.inner.bus.on(
            AGENT_STATUS,
            Arc::new(move |event| {
                if let BusEvent::AgentStatusChanged {
                    agent_id,
                    status: AgentStatus::Error,
                } = event
                {
                    SchedulerInner::handle_agent_fault(&fault, agent_id);
                }
            }),
        );

        let drain = Arc::clone(&self.inner);
        *self.drain.lock() = Some(tokio::spawn(SchedulerInner::drain_loop(drain)));

        info!("Task scheduler started");
        Ok(())
    }

    /// Stop the drain loop and shut the bus (and every agent) down.
    pub fn shutdown(&self) {
        self.inner.shutting_down.store(true, Ordering::SeqCst);
        self.inner.queue_signal.notify_one();
        if let Some(handle) = self.drain.lock().take() {
            handle.abort();
        }
        self.inner.bus.shutdown();
        info!("Task scheduler shut down");
    }

    // -----------------------------------------------------------------------
    // Task submission and observation
    // -----------------------------------------------------------------------

    /// Submit a task with the default timeout and no retry budget.
    ///
    /// Non-blocking: the task is queued, the queue re-sorted, and the drain
    /// loop signalled. Returns the generated task id.
    pub fn submit_task(
        &self,
        task_type: &str,
        data: serde_json::Value,
        priority: TaskPriority,
    ) -> BrigadeResult<Uuid> {
        self.submit_task_with(task_type, data, priority, brigade_core::DEFAULT_TASK_TIMEOUT_MS, 0)
    }

    /// Submit a task with an explicit timeout and retry budget.
    pub fn submit_task_with(
        &self,
        task_type: &str,
        data: serde_json::Value,
        priority: TaskPriority,
        timeout_ms: u64,
        retries: u32,
    ) -> BrigadeResult<Uuid> {
        self.inner.ensure_started()?;
        let task = Task::new(task_type, data, priority)
            .with_timeout_ms(timeout_ms)
            .with_retries(retries);
        let id = task.id;
        let created_at = task.created_at;

        {
            let (done, _) = watch::channel(false);
            self.inner.tasks.write().insert(
                id,
                TaskEntry {
                    task,
                    done,
                    failure: None,
                },
            );
        }
        {
            let mut queue = self.inner.queue.lock();
            queue.push(id, priority, created_at);
            debug!(
                task_id = %id,
                task_type = %task_type,
                priority = %priority,
                queue_len = queue.len(),
                "Task submitted"
            );
        }
        self.inner.queue_signal.notify_one();
        Ok(id)
    }

    /// Snapshot of a task record, or `None` for an unknown id.
    pub fn task_status(&self, id: Uuid) -> Option<Task> {
        self.inner.tasks.read().get(&id).map(|e| e.task.clone())
    }

    /// Await a task's outcome for up to `timeout`.
    ///
    /// Resolves immediately when the task is already terminal. A timeout
    /// fails the caller with [`BrigadeError::TaskTimeout`] and leaves the
    /// task untouched: a late completion is still recorded on the record,
    /// just with no remaining observer.
    pub async fn task_result(&self, id: Uuid, timeout: Duration) -> BrigadeResult<serde_json::Value> {
        self.inner.ensure_started()?;
        let mut done = {
            let tasks = self.inner.tasks.read();
            let entry = tasks
                .get(&id)
                .ok_or_else(|| BrigadeError::Submission(format!("Unknown task {id}")))?;
            if entry.task.status.is_terminal() {
                return resolve_terminal(entry);
            }
            entry.done.subscribe()
        };

        let result = match tokio::time::timeout(timeout, done.wait_for(|resolved| *resolved)).await {
            Ok(Ok(_)) => {
                let tasks = self.inner.tasks.read();
                let entry = tasks
                    .get(&id)
                    .ok_or_else(|| BrigadeError::Submission(format!("Unknown task {id}")))?;
                resolve_terminal(entry)
            }
            Ok(Err(_)) => Err(BrigadeError::Bus(format!(
                "Scheduler dropped state for task {id}"
            ))),
            Err(_) => Err(BrigadeError::TaskTimeout(id, timeout.as_millis() as u64)),
        };
        result
    }

    /// Fire-and-forget broadcast to every registered agent, medium priority.
    pub fn broadcast_update(
        &self,
        message_type: &str,
        data: serde_json::Value,
    ) -> BrigadeResult<()> {
        self.inner.ensure_started()?;
        self.inner
            .bus
            .send_message(Message::new(message_type, "scheduler", data).with_priority(TaskPriority::Medium))
    }

    /// Aggregate view of agents, queues, task counters, and capabilities.
    pub fn system_status(&self) -> SystemStatus {
        let mut counts = TaskCounts::default();
        {
            let tasks = self.inner.tasks.read();
            counts.total = tasks.len();
            for entry in tasks.values() {
                match entry.task.status {
                    TaskStatus::Pending => counts.pending += 1,
                    TaskStatus::Assigned | TaskStatus::Running => counts.running += 1,
                    TaskStatus::Completed => counts.completed += 1,
                    TaskStatus::Failed => counts.failed += 1,
                }
            }
        }
        SystemStatus {
            agents: self.inner.bus.agent_status(),
            queues: self.inner.bus.queue_status(),
            tasks: counts,
            capabilities: self.inner.bus.capability_map(),
        }
    }

    // -----------------------------------------------------------------------
    // Agent management
    // -----------------------------------------------------------------------

    /// Spawn an execution context via `factory`, register it with the bus,
    /// and send the init handshake. The pair is retained so the agent can be
    /// restarted from scratch after a fault.
    pub fn register_agent(&self, config: AgentConfig, factory: AgentFactory) -> BrigadeResult<()> {
        self.inner.ensure_started()?;
        self.inner.managed.write().insert(
            config.id.clone(),
            ManagedAgent {
                config: config.clone(),
                factory: Arc::clone(&factory),
            },
        );
        self.inner.spawn_and_register(&config, &factory)
    }

    /// Remove an agent from the managed set and the bus.
    pub fn unregister_agent(&self, id: &str) -> BrigadeResult<()> {
        self.inner.managed.write().remove(id);
        self.inner.bus.unregister_agent(id)
    }
}

fn resolve_terminal(entry: &TaskEntry) -> BrigadeResult<serde_json::Value> {
    match entry.task.status {
        TaskStatus::Completed => Ok(entry
            .task
            .result
            .clone()
            .unwrap_or(serde_json::Value::Null)),
        TaskStatus::Failed => match &entry.failure {
            Some(FailureKind::NoAgent(capability)) => {
                Err(BrigadeError::NoAgentAvailable(capability.clone()))
            }
            _ => Err(BrigadeError::AgentExecution(
                entry
                    .task
                    .error
                    .clone()
                    .unwrap_or_else(|| "Task failed without error detail".into()),
            )),
        },
        _ => Err(BrigadeError::Bus(format!(
            "Task {} resolved while non-terminal",
            entry.task.id
        ))),
    }
}

impl SchedulerInner {
    fn ensure_started(&self) -> BrigadeResult<()> {
        if self.started.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BrigadeError::Submission(
                "Scheduler not started; call start() first".into(),
            ))
        }
    }

    /// The single drain loop: one in-flight dequeue at a time, a cooperative
    /// yield after every delegation so message handling is never starved.
    async fn drain_loop(inner: Arc<SchedulerInner>) {
        loop {
            if inner.shutting_down.load(Ordering::SeqCst) {
                break;
            }
            let next = { inner.queue.lock().pop() };
            match next {
                Some(task_id) => {
                    inner.dispatch(task_id);
                    tokio::task::yield_now().await;
                }
                None => inner.queue_signal.notified().await,
            }
        }
        debug!("Drain loop stopped");
    }

    /// Route one dequeued task to the best-scoring capable agent, or fail it.
    fn dispatch(&self, task_id: Uuid) {
        let task_type = {
            match self.tasks.read().get(&task_id) {
                Some(entry) => entry.task.task_type.clone(),
                None => {
                    warn!(task_id = %task_id, "Dequeued unknown task");
                    return;
                }
            }
        };

        let capability = self.config.capability_table.resolve(&task_type).to_string();
        let candidates = self.bus.find_agents_by_capability(&capability);
        if candidates.is_empty() {
            warn!(task_id = %task_id, capability = %capability, "No capable agent registered");
            self.fail_task(
                task_id,
                FailureKind::NoAgent(capability.clone()),
                format!("No agent available for capability '{capability}'"),
            );
            return;
        }

        let statuses = self.bus.agent_status();
        let depths = self.bus.queue_status();
        let capability_map = self.bus.capability_map();

        let mut best: Option<(String, i64)> = None;
        for candidate in candidates {
            let status = statuses
                .get(&candidate)
                .copied()
                .unwrap_or(AgentStatus::Idle);
            let depth = depths.get(&candidate).copied().unwrap_or(0);
            let weight = {
                self.managed
                    .read()
                    .get(&candidate)
                    .map_or(0, |m| m.config.priority)
            };
            let declared: Vec<String> = capability_map
                .iter()
                .filter(|(_, ids)| ids.iter().any(|id| id == &candidate))
                .map(|(capability, _)| capability.clone())
                .collect();
            let score = score_candidate(weight, status, depth, &declared, &task_type);
            // Strictly-greater keeps the first-encountered candidate on ties.
            if best.as_ref().map_or(true, |(_, b)| score > *b) {
                best = Some((candidate, score));
            }
        }

        let Some((agent_id, score)) = best else {
            return;
        };

        let task_envelope = {
            let mut tasks = self.tasks.write();
            let Some(entry) = tasks.get_mut(&task_id) else {
                return;
            };
            entry.task.advance_status(TaskStatus::Assigned);
            entry.task.advance_status(TaskStatus::Running);
            entry.task.assigned_agent = Some(agent_id.clone());
            entry.task.started_at = Some(Utc::now());
            TaskEnvelope {
                id: entry.task.id,
                task_type: entry.task.task_type.clone(),
                data: entry.task.data.clone(),
                priority: entry.task.priority,
            }
        };

        debug!(task_id = %task_id, agent_id = %agent_id, score, "Delegating task");
        let delivery = Message::task("scheduler", &agent_id, task_envelope)
            .and_then(|msg| self.bus.send_message(msg));
        if let Err(e) = delivery {
            warn!(task_id = %task_id, agent_id = %agent_id, error = %e, "Delegation failed");
            self.fail_task(
                task_id,
                FailureKind::Execution,
                format!("Delegation to '{agent_id}' failed: {e}"),
            );
        }
    }

    fn fail_task(&self, task_id: Uuid, kind: FailureKind, error: String) {
        let mut tasks = self.tasks.write();
        if let Some(entry) = tasks.get_mut(&task_id) {
            if entry.task.advance_status(TaskStatus::Failed) {
                entry.task.error = Some(error);
                entry.task.completed_at = Some(Utc::now());
                entry.failure = Some(kind);
                entry.done.send_replace(true);
            }
        }
    }

    /// The completion route: records the agent-reported outcome and wakes
    /// any waiters. Status monotonicity makes duplicates harmless.
    fn on_task_complete(&self, msg: &Message) {
        let completion: TaskCompletion = match serde_json::from_value(msg.payload.clone()) {
            Ok(completion) => completion,
            Err(e) => {
                warn!(source = %msg.source, error = %e, "Malformed task_complete payload");
                return;
            }
        };

        let recorded = {
            let mut tasks = self.tasks.write();
            match tasks.get_mut(&completion.task_id) {
                Some(entry) => {
                    let next = if completion.success {
                        TaskStatus::Completed
                    } else {
                        TaskStatus::Failed
                    };
                    if entry.task.advance_status(next) {
                        entry.task.completed_at = Some(Utc::now());
                        if completion.success {
                            entry.task.result = completion.result.clone();
                        } else {
                            entry.task.error = completion
                                .error
                                .clone()
                                .or_else(|| Some("Agent reported failure".into()));
                            entry.failure = Some(FailureKind::Execution);
                        }
                        entry.done.send_replace(true);
                        true
                    } else {
                        false
                    }
                }
                None => false,
            }
        };

        if recorded {
            info!(
                task_id = %completion.task_id,
                success = completion.success,
                execution_time_ms = completion.execution_time_ms,
                agent_id = %msg.source,
                "Task resolved"
            );
        } else {
            debug!(task_id = %completion.task_id, "Ignoring completion for unknown or terminal task");
        }
    }

    fn spawn_and_register(&self, config: &AgentConfig, factory: &AgentFactory) -> BrigadeResult<()> {
        let handle = factory(config);
        self.bus
            .register_agent(&config.id, handle, config.capabilities.clone())?;
        self.bus
            .send_message(Message::init("scheduler", &config.id, &config.init_payload())?)?;
        Ok(())
    }

    /// React to an agent execution-context fault: unregister, and when the
    /// config allows it, re-register from scratch after the fixed backoff.
    /// Tasks in flight on the agent are left as-is for operators to query.
    fn handle_agent_fault(inner: &Arc<SchedulerInner>, agent_id: &str) {
        warn!(agent_id = %agent_id, "Agent fault detected");
        if let Err(e) = inner.bus.unregister_agent(agent_id) {
            debug!(agent_id = %agent_id, error = %e, "Fault unregistration skipped");
        }

        let managed = { inner.managed.read().get(agent_id).cloned() };
        let Some(managed) = managed else {
            return;
        };
        if !managed.config.restart_on_error {
            inner.managed.write().remove(agent_id);
            info!(agent_id = %agent_id, "Agent removed; restart_on_error is disabled");
            return;
        }

        let inner = Arc::clone(inner);
        let backoff = inner.config.restart_backoff_ms;
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(backoff)).await;
            if inner.shutting_down.load(Ordering::SeqCst) {
                return;
            }
            info!(agent_id = %managed.config.id, backoff_ms = backoff, "Restarting agent after fault");
            if let Err(e) = inner.spawn_and_register(&managed.config, &managed.factory) {
                error!(agent_id = %managed.config.id, error = %e, "Agent restart failed");
            }
        });
    }
}

/// Task counters by lifecycle bucket. Assigned tasks count as running.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TaskCounts {
    /// All tasks the scheduler has ever accepted this process.
    pub total: usize,
    /// Queued, not yet delegated.
    pub pending: usize,
    /// Delegated and awaiting an outcome.
    pub running: usize,
    /// Terminal, successful.
    pub completed: usize,
    /// Terminal, failed.
    pub failed: usize,
}

/// Read-only aggregate of scheduler and bus state.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    /// Status per registered agent.
    pub agents: HashMap<String, AgentStatus>,
    /// Queue depth per registered agent.
    pub queues: HashMap<String, usize>,
    /// Task counters.
    pub tasks: TaskCounts,
    /// The capability index.
    pub capabilities: HashMap<String, Vec<String>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use brigade_core::TaskAssignment;
    use serde_json::json;
    use tokio::sync::mpsc;

    /// Inline execution context echoing every task back as a success.
    fn echo_factory() -> AgentFactory {
        Arc::new(|config: &AgentConfig| {
            let (in_tx, mut in_rx) = mpsc::unbounded_channel::<Message>();
            let (out_tx, out_rx) = mpsc::unbounded_channel::<Message>();
            let agent_id = config.id.clone();
            let join = tokio::spawn(async move {
                while let Some(msg) = in_rx.recv().await {
                    match msg.message_type.as_str() {
                        envelope::INIT => {
                            let _ = out_tx.send(Message::ready(&agent_id));
                        }
                        envelope::TASK => {
                            let assignment: TaskAssignment =
                                serde_json::from_value(msg.payload.clone()).unwrap();
                            let completion = TaskCompletion::success(
                                assignment.task.id,
                                json!({"echo": assignment.task.data}),
                                1,
                            );
                            let _ = out_tx
                                .send(Message::task_complete(&agent_id, &completion).unwrap());
                        }
                        envelope::SHUTDOWN => break,
                        _ => {}
                    }
                }
            });
            AgentHandle::new(in_tx, out_rx, join)
        })
    }

    /// Execution context that swallows tasks without ever completing them.
    fn silent_factory() -> AgentFactory {
        Arc::new(|config: &AgentConfig| {
            let (in_tx, mut in_rx) = mpsc::unbounded_channel::<Message>();
            let (out_tx, out_rx) = mpsc::unbounded_channel::<Message>();
            let agent_id = config.id.clone();
            let join = tokio::spawn(async move {
                while let Some(msg) = in_rx.recv().await {
                    if msg.message_type == envelope::INIT {
                        let _ = out_tx.send(Message::ready(&agent_id));
                    } else if msg.message_type == envelope::SHUTDOWN {
                        break;
                    }
                }
            });
            AgentHandle::new(in_tx, out_rx, join)
        })
    }

    fn started_scheduler() -> TaskScheduler {
        let bus = Arc::new(MessageBus::new());
        let scheduler = TaskScheduler::new(bus, SchedulerConfig::default());
        scheduler.start().unwrap();
        scheduler
    }

    #[tokio::test]
    async fn test_submit_before_start_is_rejected() {
        let scheduler = TaskScheduler::new(Arc::new(MessageBus::new()), SchedulerConfig::default());
        let result = scheduler.submit_task("optimize_orders", json!({}), TaskPriority::High);
        assert!(matches!(result, Err(BrigadeError::Submission(_))));
    }

    #[tokio::test]
    async fn test_task_completes_end_to_end() {
        let scheduler = started_scheduler();
        scheduler
            .register_agent(
                AgentConfig::new("order-agent", vec!["order_optimization".into()]),
                echo_factory(),
            )
            .unwrap();

        let id = scheduler
            .submit_task("optimize_orders", json!({"orders": [1, 2]}), TaskPriority::High)
            .unwrap();
        let result = scheduler
            .task_result(id, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(result["echo"]["orders"], json!([1, 2]));

        let task = scheduler.task_status(id).unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.assigned_agent.as_deref(), Some("order-agent"));
        assert!(task.started_at.is_some());
        assert!(task.completed_at.is_some());
        scheduler.shutdown();
    }

    #[tokio::test]
    async fn test_no_capable_agent_fails_task() {
        let scheduler = started_scheduler();
        let id = scheduler
            .submit_task("optimize_orders", json!({}), TaskPriority::Medium)
            .unwrap();

        let result = scheduler.task_result(id, Duration::from_secs(2)).await;
        match result {
            Err(BrigadeError::NoAgentAvailable(capability)) => {
                assert_eq!(capability, "order_optimization");
            }
            other => panic!("expected NoAgentAvailable, got {other:?}"),
        }
        let task = scheduler.task_status(id).unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error.as_deref().unwrap_or_default().contains("order_optimization"));
        scheduler.shutdown();
    }

    #[tokio::test]
    async fn test_result_timeout_leaves_task_running() {
        let scheduler = started_scheduler();
        scheduler
            .register_agent(
                AgentConfig::new("slow-agent", vec!["inventory_forecasting".into()]),
                silent_factory(),
            )
            .unwrap();

        let id = scheduler
            .submit_task("check_inventory", json!({}), TaskPriority::Medium)
            .unwrap();
        let result = scheduler.task_result(id, Duration::from_millis(50)).await;
        assert!(matches!(result, Err(BrigadeError::TaskTimeout(_, _))));

        let task = scheduler.task_status(id).unwrap();
        assert_eq!(task.status, TaskStatus::Running);
        assert!(task.error.is_none());
        scheduler.shutdown();
    }

    #[tokio::test]
    async fn test_result_on_terminal_task_is_immediate() {
        let scheduler = started_scheduler();
        scheduler
            .register_agent(
                AgentConfig::new("order-agent", vec!["order_optimization".into()]),
                echo_factory(),
            )
            .unwrap();

        let id = scheduler
            .submit_task("optimize_orders", json!({}), TaskPriority::High)
            .unwrap();
        scheduler.task_result(id, Duration::from_secs(2)).await.unwrap();

        // Even a zero wait must succeed now.
        let again = scheduler.task_result(id, Duration::from_millis(0)).await;
        assert!(again.is_ok());
        scheduler.shutdown();
    }

    #[tokio::test]
    async fn test_system_status_counts() {
        let scheduler = started_scheduler();
        scheduler
            .register_agent(
                AgentConfig::new("order-agent", vec!["order_optimization".into()]),
                echo_factory(),
            )
            .unwrap();

        let ok = scheduler
            .submit_task("optimize_orders", json!({}), TaskPriority::High)
            .unwrap();
        scheduler.task_result(ok, Duration::from_secs(2)).await.unwrap();
        let failed = scheduler
            .submit_task("analyze_feedback", json!({}), TaskPriority::Low)
            .unwrap();
        let _ = scheduler.task_result(failed, Duration::from_secs(2)).await;

        let status = scheduler.system_status();
        assert_eq!(status.tasks.total, 2);
        assert_eq!(status.tasks.completed, 1);
        assert_eq!(status.tasks.failed, 1);
        assert_eq!(
            status.capabilities.get("order_optimization"),
            Some(&vec!["order-agent".to_string()])
        );
        assert_eq!(status.agents.get("order-agent"), Some(&AgentStatus::Idle));
        scheduler.shutdown();
    }

    #[tokio::test]
    async fn test_unknown_task_result_is_submission_error() {
        let scheduler = started_scheduler();
        let result = scheduler
            .task_result(Uuid::new_v4(), Duration::from_millis(10))
            .await;
        assert!(matches!(result, Err(BrigadeError::Submission(_))));
        scheduler.shutdown();
    }
}
