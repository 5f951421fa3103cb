use async_trait::async_trait;
use brigade_bus::AgentHandle;
use brigade_core::{
    envelope, AgentConfig, BrigadeError, BrigadeResult, Message, TaskAssignment, TaskCompletion,
    TaskEnvelope,
};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Domain logic of one agent.
///
/// The runtime drives the wire protocol; a behavior only sees delegated
/// tasks. Returning [`BrigadeError::AgentFault`] kills the execution context
/// itself (no completion is emitted), which the bus surfaces as an agent
/// fault; any other error becomes a normal `success: false` completion.
#[async_trait]
pub trait AgentBehavior: Send + 'static {
    /// Process one delegated task and produce its result payload.
    async fn handle(&mut self, task: TaskEnvelope) -> BrigadeResult<serde_json::Value>;

    /// Observe a broadcast or other non-protocol message. Default: ignore.
    async fn on_broadcast(&mut self, _message: &Message) {}
}

/// Spawn an execution context for `behavior` and return its handle for bus
/// registration.
///
/// The context owns a FIFO inbox and processes one message at a time, so
/// tasks delegated to a single agent are handled in delegation order.
pub fn spawn_agent(config: &AgentConfig, behavior: impl AgentBehavior) -> AgentHandle {
    let (in_tx, mut in_rx) = mpsc::unbounded_channel::<Message>();
    let (out_tx, out_rx) = mpsc::unbounded_channel::<Message>();
    let agent_id = config.id.clone();

    let join = tokio::spawn(async move {
        let mut behavior = behavior;
        while let Some(msg) = in_rx.recv().await {
            match msg.message_type.as_str() {
                envelope::INIT => {
                    let _ = out_tx.send(Message::ready(&agent_id));
                }
                envelope::SHUTDOWN => {
                    debug!(agent_id = %agent_id, "Agent shutting down");
                    break;
                }
                envelope::TASK => {
                    let assignment: TaskAssignment = match serde_json::from_value(msg.payload.clone())
                    {
                        Ok(assignment) => assignment,
                        Err(e) => {
                            warn!(agent_id = %agent_id, error = %e, "Malformed task payload");
                            continue;
                        }
                    };
                    let task_id = assignment.task.id;
                    let started = Instant::now();

                    let completion = match behavior.handle(assignment.task).await {
                        Ok(result) => TaskCompletion::success(
                            task_id,
                            result,
                            started.elapsed().as_millis() as u64,
                        ),
                        Err(BrigadeError::AgentFault(reason)) => {
                            error!(agent_id = %agent_id, reason = %reason, "Execution context fault");
                            return;
                        }
                        Err(e) => TaskCompletion::failure(
                            task_id,
                            e.to_string(),
                            started.elapsed().as_millis() as u64,
                        ),
                    };
                    match Message::task_complete(&agent_id, &completion) {
                        Ok(report) => {
                            let _ = out_tx.send(report);
                        }
                        Err(e) => {
                            warn!(agent_id = %agent_id, error = %e, "Could not encode completion");
                        }
                    }
                }
                _ => behavior.on_broadcast(&msg).await,
            }
        }
    });

    AgentHandle::new(in_tx, out_rx, join)
}
