use crate::events::{BusEvent, BusListener, ListenerId};
use crate::handle::AgentHandle;
use crate::route::RouteMatcher;
use brigade_core::{envelope, AgentStatus, BrigadeError, BrigadeResult, Message};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A handler invoked for every inbound agent message whose type matches a
/// registered route.
pub type RouteHandler = Arc<dyn Fn(&Message) + Send + Sync>;

struct RegisteredAgent {
    inbox: UnboundedSender<Message>,
    join: JoinHandle<()>,
    status: AgentStatus,
    queue_depth: usize,
    generation: u64,
}

struct Route {
    matcher: RouteMatcher,
    handler: RouteHandler,
    priority: i64,
}

struct BusInner {
    agents: RwLock<HashMap<String, RegisteredAgent>>,
    capability_index: RwLock<HashMap<String, Vec<String>>>,
    routes: RwLock<Vec<Route>>,
    listeners: RwLock<HashMap<String, Vec<(ListenerId, BusListener)>>>,
    generations: AtomicU64,
}

/// Registry of agents, their capabilities, and their live status; routes
/// point-to-point and broadcast messages and dispatches prioritized handler
/// routes for inbound message types.
///
/// All interior state sits behind short [`parking_lot`] critical sections
/// that never cross an await point; handlers and listeners are always
/// invoked with no lock held, so they may call back into the bus.
#[derive(Clone)]
pub struct MessageBus {
    inner: Arc<BusInner>,
}

impl MessageBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                agents: RwLock::new(HashMap::new()),
                capability_index: RwLock::new(HashMap::new()),
                routes: RwLock::new(Vec::new()),
                listeners: RwLock::new(HashMap::new()),
                generations: AtomicU64::new(1),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Agent registry
    // -----------------------------------------------------------------------

    /// Register an agent's execution handle under `id` with the given
    /// capabilities.
    ///
    /// The agent starts with status idle and queue depth 0; its outgoing
    /// messages are wired into route dispatch. Registering an id that already
    /// exists replaces the previous registration (the old execution context
    /// is terminated) without duplicating capability-index entries.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn register_agent(
        &self,
        id: &str,
        mut handle: AgentHandle,
        capabilities: Vec<String>,
    ) -> BrigadeResult<()> {
        let outbox = handle.take_outbox().ok_or_else(|| {
            BrigadeError::Bus(format!("Handle for agent '{id}' was already registered"))
        })?;
        let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed);

        let replaced = {
            let mut agents = self.inner.agents.write();
            agents.insert(
                id.to_string(),
                RegisteredAgent {
                    inbox: handle.inbox(),
                    join: handle.into_join(),
                    status: AgentStatus::Idle,
                    queue_depth: 0,
                    generation,
                },
            )
        };
        if let Some(old) = replaced {
            warn!(agent_id = %id, "Re-registering agent; terminating previous context");
            old.join.abort();
        }

        {
            let mut index = self.inner.capability_index.write();
            for bucket in index.values_mut() {
                bucket.retain(|a| a != id);
            }
            index.retain(|_, bucket| !bucket.is_empty());
            for capability in &capabilities {
                let bucket = index.entry(capability.clone()).or_default();
                if !bucket.iter().any(|a| a == id) {
                    bucket.push(id.to_string());
                }
            }
        }

        let inner = Arc::clone(&self.inner);
        let agent_id = id.to_string();
        tokio::spawn(forward_outbox(inner, agent_id, generation, outbox));

        info!(agent_id = %id, capabilities = ?capabilities, "Agent registered");
        self.emit(&BusEvent::AgentRegistered {
            agent_id: id.to_string(),
        });
        Ok(())
    }

    /// Remove an agent from the registry and every capability bucket, and
    /// terminate its execution handle.
    pub fn unregister_agent(&self, id: &str) -> BrigadeResult<()> {
        let removed = { self.inner.agents.write().remove(id) };
        let Some(agent) = removed else {
            return Err(BrigadeError::Bus(format!("Unknown agent '{id}'")));
        };

        {
            let mut index = self.inner.capability_index.write();
            for bucket in index.values_mut() {
                bucket.retain(|a| a != id);
            }
            index.retain(|_, bucket| !bucket.is_empty());
        }

        // Best-effort shutdown envelope before the context is torn down.
        let _ = agent.inbox.send(Message::shutdown("bus", id));
        agent.join.abort();

        info!(agent_id = %id, "Agent unregistered");
        self.emit(&BusEvent::AgentUnregistered {
            agent_id: id.to_string(),
        });
        Ok(())
    }

    /// Terminate every execution handle and clear all bus state.
    pub fn shutdown(&self) {
        let drained: Vec<(String, RegisteredAgent)> =
            { self.inner.agents.write().drain().collect() };
        for (id, agent) in drained {
            let _ = agent.inbox.send(Message::shutdown("bus", &id));
            agent.join.abort();
        }
        self.inner.capability_index.write().clear();
        self.inner.routes.write().clear();
        self.inner.listeners.write().clear();
        info!("Message bus shut down");
    }

    // -----------------------------------------------------------------------
    // Delivery
    // -----------------------------------------------------------------------

    /// Deliver a message: to its target agent's inbox when addressed, to
    /// every registered agent otherwise. Delivery is asynchronous and
    /// unacknowledged.
    ///
    /// A targeted `task` envelope counts against the agent's queue depth and
    /// marks it busy.
    pub fn send_message(&self, msg: Message) -> BrigadeResult<()> {
        match msg.target.clone() {
            Some(target) => self.send_to_agent(&target, msg),
            None => {
                self.broadcast(msg);
                Ok(())
            }
        }
    }

    fn send_to_agent(&self, target: &str, msg: Message) -> BrigadeResult<()> {
        let is_task = msg.message_type == envelope::TASK;
        let event = {
            let mut agents = self.inner.agents.write();
            let agent = agents
                .get_mut(target)
                .ok_or_else(|| BrigadeError::Bus(format!("Unknown agent '{target}'")))?;
            agent
                .inbox
                .send(msg)
                .map_err(|_| BrigadeError::Bus(format!("Inbox of agent '{target}' is closed")))?;
            if is_task {
                agent.queue_depth += 1;
                if agent.status == AgentStatus::Idle {
                    agent.status = AgentStatus::Busy;
                    Some(BusEvent::AgentStatusChanged {
                        agent_id: target.to_string(),
                        status: AgentStatus::Busy,
                    })
                } else {
                    None
                }
            } else {
                None
            }
        };
        if let Some(event) = event {
            self.emit(&event);
        }
        Ok(())
    }

    fn broadcast(&self, msg: Message) {
        let recipients: Vec<(String, UnboundedSender<Message>)> = {
            self.inner
                .agents
                .read()
                .iter()
                .map(|(id, a)| (id.clone(), a.inbox.clone()))
                .collect()
        };
        debug!(message_type = %msg.message_type, recipients = recipients.len(), "Broadcasting");
        for (id, inbox) in recipients {
            if inbox.send(msg.clone()).is_err() {
                warn!(agent_id = %id, "Broadcast dropped; agent inbox closed");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Routes
    // -----------------------------------------------------------------------

    /// Register a handler invoked for every inbound agent message whose type
    /// satisfies `matcher`. Handlers for the same message run in descending
    /// priority order; equal priorities keep registration order.
    pub fn add_route(&self, matcher: RouteMatcher, handler: RouteHandler, priority: i64) {
        let mut routes = self.inner.routes.write();
        routes.push(Route {
            matcher,
            handler,
            priority,
        });
        routes.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    fn dispatch_routes(&self, msg: &Message) {
        let handlers: Vec<RouteHandler> = {
            self.inner
                .routes
                .read()
                .iter()
                .filter(|r| r.matcher.matches(&msg.message_type))
                .map(|r| Arc::clone(&r.handler))
                .collect()
        };
        for handler in handlers {
            handler(msg);
        }
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Ids of agents exposing the given capability, in registration order.
    pub fn find_agents_by_capability(&self, capability: &str) -> Vec<String> {
        self.inner
            .capability_index
            .read()
            .get(capability)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of every agent's status.
    pub fn agent_status(&self) -> HashMap<String, AgentStatus> {
        self.inner
            .agents
            .read()
            .iter()
            .map(|(id, a)| (id.clone(), a.status))
            .collect()
    }

    /// Snapshot of every agent's queue depth.
    pub fn queue_status(&self) -> HashMap<String, usize> {
        self.inner
            .agents
            .read()
            .iter()
            .map(|(id, a)| (id.clone(), a.queue_depth))
            .collect()
    }

    /// Snapshot of the capability index.
    pub fn capability_map(&self) -> HashMap<String, Vec<String>> {
        self.inner.capability_index.read().clone()
    }

    // -----------------------------------------------------------------------
    // Lifecycle pub/sub
    // -----------------------------------------------------------------------

    /// Subscribe a listener to a lifecycle event name (see [`crate::events`]).
    pub fn on(&self, event: &str, listener: BusListener) -> ListenerId {
        let id = Uuid::new_v4();
        self.inner
            .listeners
            .write()
            .entry(event.to_string())
            .or_default()
            .push((id, listener));
        id
    }

    /// Remove a listener previously registered with [`on`](Self::on).
    pub fn off(&self, event: &str, id: ListenerId) {
        let mut listeners = self.inner.listeners.write();
        if let Some(entries) = listeners.get_mut(event) {
            entries.retain(|(lid, _)| *lid != id);
            if entries.is_empty() {
                listeners.remove(event);
            }
        }
    }

    fn emit(&self, event: &BusEvent) {
        let handlers: Vec<BusListener> = {
            self.inner
                .listeners
                .read()
                .get(event.name())
                .map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
                .unwrap_or_default()
        };
        for handler in handlers {
            handler(event);
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Inbound forwarding
// ---------------------------------------------------------------------------

/// Drain one agent's outbound channel into bookkeeping and route dispatch.
///
/// The channel closing while the agent is still registered under the same
/// generation means the execution context died without being unregistered:
/// the agent is marked errored so fault recovery can react.
async fn forward_outbox(
    inner: Arc<BusInner>,
    agent_id: String,
    generation: u64,
    mut outbox: UnboundedReceiver<Message>,
) {
    let bus = MessageBus { inner };
    while let Some(msg) = outbox.recv().await {
        bus.handle_inbound(&agent_id, msg);
    }

    let faulted = {
        let mut agents = bus.inner.agents.write();
        match agents.get_mut(&agent_id) {
            Some(agent) if agent.generation == generation => {
                agent.status = AgentStatus::Error;
                true
            }
            _ => false,
        }
    };
    if faulted {
        warn!(agent_id = %agent_id, "Agent execution context terminated unexpectedly");
        bus.emit(&BusEvent::AgentStatusChanged {
            agent_id,
            status: AgentStatus::Error,
        });
    }
}

impl MessageBus {
    fn handle_inbound(&self, agent_id: &str, msg: Message) {
        let event = match msg.message_type.as_str() {
            envelope::READY => {
                let mut agents = self.inner.agents.write();
                match agents.get_mut(agent_id) {
                    Some(agent) if agent.status != AgentStatus::Idle => {
                        agent.status = AgentStatus::Idle;
                        Some(BusEvent::AgentStatusChanged {
                            agent_id: agent_id.to_string(),
                            status: AgentStatus::Idle,
                        })
                    }
                    _ => None,
                }
            }
            envelope::TASK_COMPLETE => {
                let mut agents = self.inner.agents.write();
                match agents.get_mut(agent_id) {
                    Some(agent) => {
                        agent.queue_depth = agent.queue_depth.saturating_sub(1);
                        let next = if agent.queue_depth == 0 {
                            AgentStatus::Idle
                        } else {
                            AgentStatus::Busy
                        };
                        if agent.status == AgentStatus::Busy && next != agent.status {
                            agent.status = next;
                            Some(BusEvent::AgentStatusChanged {
                                agent_id: agent_id.to_string(),
                                status: next,
                            })
                        } else {
                            None
                        }
                    }
                    None => None,
                }
            }
            _ => None,
        };
        if let Some(event) = event {
            self.emit(&event);
        }
        self.dispatch_routes(&msg);
    }
}
