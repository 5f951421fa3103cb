//! Agent execution contexts and the built-in restaurant-operations agents.
//!
//! An agent is an isolated execution unit with its own serial FIFO inbox,
//! reachable only through messages. [`spawn_agent`] wraps an
//! [`AgentBehavior`] in the wire protocol: it answers `init` with `ready`,
//! runs one task at a time, emits exactly one `task_complete` per delegated
//! task, and exits on `shutdown`.
//!
//! The built-in behaviors keep their domain logic deliberately small; the
//! orchestration layer only cares that they eventually report an outcome.

/// Numeric and satisfaction aggregation.
pub mod aggregator;
/// Feedback and satisfaction analysis.
pub mod analytics;
/// Inventory checks, depletion forecasts, and cost summaries.
pub mod inventory;
/// Order batching and revenue summaries.
pub mod orders;

mod runtime;

pub use aggregator::AggregatorAgent;
pub use analytics::AnalyticsAgent;
pub use inventory::InventoryAgent;
pub use orders::OrderAgent;
pub use runtime::{spawn_agent, AgentBehavior};
