//! The Brigade message bus: agent registry, capability index, and routing.
//!
//! The bus is the only path between the scheduler and agents. It owns the
//! registry of live agents (status + queue depth), the capability index used
//! for task routing, an ordered list of prioritized message routes, and a
//! small lifecycle pub/sub used for fault detection.
//!
//! # Main types
//!
//! - [`MessageBus`] — the registry and routing layer.
//! - [`AgentHandle`] — channel ends of one agent's execution context.
//! - [`RouteMatcher`] — exact or pattern matching over message types.
//! - [`BusEvent`] — lifecycle notifications (registration, status changes).

/// Lifecycle events and listener types.
pub mod events;
/// Channel handle to an agent execution context.
pub mod handle;
/// Prioritized message routes.
pub mod route;

mod bus;

pub use bus::{MessageBus, RouteHandler};
pub use events::{BusEvent, BusListener, ListenerId, AGENT_REGISTERED, AGENT_STATUS, AGENT_UNREGISTERED};
pub use handle::AgentHandle;
pub use route::RouteMatcher;
