//! `brigade` — operator CLI for the restaurant-operations orchestration layer.
//!
//! Loads a TOML config describing the agent roster and scheduler tuning,
//! wires the bus + scheduler + built-in agents together, and runs a named
//! coordination scenario end to end.

use anyhow::{bail, Context};
use brigade_agents::{spawn_agent, AggregatorAgent, AnalyticsAgent, InventoryAgent, OrderAgent};
use brigade_bus::MessageBus;
use brigade_core::AgentConfig;
use brigade_orchestrator::{AgentFactory, CapabilityTable, SchedulerConfig, TaskScheduler};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "brigade", about = "Brigade — restaurant operations task orchestration")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "brigade.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a coordination scenario with the configured agents
    Run {
        /// Scenario name (order-processing, feedback-analysis,
        /// inventory-alert, revenue-analysis)
        scenario: String,
        /// Scenario context as inline JSON
        #[arg(long, default_value = "{}")]
        context: String,
    },
    /// List the configured agent roster
    Agents,
}

// ---------------------------------------------------------------------------
// Config file
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct BrigadeConfig {
    #[serde(default)]
    scheduler: SchedulerSection,
    /// Task-type → capability overrides merged over the built-in table.
    #[serde(default)]
    capabilities: HashMap<String, String>,
    #[serde(default = "default_roster")]
    agents: Vec<AgentEntry>,
}

impl Default for BrigadeConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerSection::default(),
            capabilities: HashMap::new(),
            agents: default_roster(),
        }
    }
}

#[derive(Deserialize)]
struct SchedulerSection {
    #[serde(default = "default_backoff_ms")]
    restart_backoff_ms: u64,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            restart_backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_backoff_ms() -> u64 {
    1_000
}

#[derive(Clone, Deserialize)]
struct AgentEntry {
    id: String,
    /// One of: inventory, orders, analytics, aggregator.
    kind: String,
    /// Capability override; empty keeps the kind's defaults.
    #[serde(default)]
    capabilities: Vec<String>,
    #[serde(default)]
    priority: i64,
    #[serde(default = "default_max_concurrent")]
    max_concurrent_tasks: u32,
    #[serde(default = "default_true")]
    restart_on_error: bool,
}

fn default_max_concurrent() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_roster() -> Vec<AgentEntry> {
    let entry = |id: &str, kind: &str, priority: i64| AgentEntry {
        id: id.to_string(),
        kind: kind.to_string(),
        capabilities: Vec::new(),
        priority,
        max_concurrent_tasks: 1,
        restart_on_error: true,
    };
    vec![
        entry("inventory-agent", "inventory", 2),
        entry("order-agent", "orders", 2),
        entry("analytics-agent", "analytics", 1),
        entry("aggregator-agent", "aggregator", 1),
    ]
}

fn default_capabilities(kind: &str) -> Vec<&'static str> {
    match kind {
        "inventory" => vec!["inventory_forecasting"],
        "orders" => vec!["order_optimization", "kitchen_scheduling"],
        "analytics" => vec!["text_analysis", "customer_analytics"],
        "aggregator" => vec!["data_aggregation", "general_processing"],
        _ => vec![],
    }
}

fn builtin_factory(kind: &str) -> anyhow::Result<AgentFactory> {
    let factory: AgentFactory = match kind {
        "inventory" => Arc::new(|config: &AgentConfig| spawn_agent(config, InventoryAgent)),
        "orders" => Arc::new(|config: &AgentConfig| spawn_agent(config, OrderAgent)),
        "analytics" => Arc::new(|config: &AgentConfig| spawn_agent(config, AnalyticsAgent)),
        "aggregator" => Arc::new(|config: &AgentConfig| spawn_agent(config, AggregatorAgent)),
        other => bail!("Unknown agent kind '{other}'"),
    };
    Ok(factory)
}

fn load_config(path: &PathBuf) -> anyhow::Result<BrigadeConfig> {
    if !path.exists() {
        info!(path = %path.display(), "No config file; using the default roster");
        return Ok(BrigadeConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Reading config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Parsing config {}", path.display()))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Agents => {
            for agent in &config.agents {
                let capabilities = if agent.capabilities.is_empty() {
                    default_capabilities(&agent.kind).join(", ")
                } else {
                    agent.capabilities.join(", ")
                };
                println!(
                    "{:<20} kind={:<12} weight={:<3} restart={:<5} [{capabilities}]",
                    agent.id, agent.kind, agent.priority, agent.restart_on_error
                );
            }
            Ok(())
        }
        Commands::Run { scenario, context } => {
            let context: serde_json::Value =
                serde_json::from_str(&context).context("Parsing --context JSON")?;

            let mut table = CapabilityTable::new();
            table.extend(config.capabilities.clone());

            let bus = Arc::new(MessageBus::new());
            let scheduler = TaskScheduler::new(
                Arc::clone(&bus),
                SchedulerConfig {
                    capability_table: table,
                    restart_backoff_ms: config.scheduler.restart_backoff_ms,
                },
            );
            scheduler.start().context("Starting scheduler")?;

            for entry in &config.agents {
                let capabilities = if entry.capabilities.is_empty() {
                    default_capabilities(&entry.kind)
                        .into_iter()
                        .map(String::from)
                        .collect()
                } else {
                    entry.capabilities.clone()
                };
                let agent_config = AgentConfig::new(&entry.id, capabilities)
                    .with_priority(entry.priority)
                    .with_max_concurrent_tasks(entry.max_concurrent_tasks)
                    .with_restart_on_error(entry.restart_on_error);
                scheduler
                    .register_agent(agent_config, builtin_factory(&entry.kind)?)
                    .with_context(|| format!("Registering agent '{}'", entry.id))?;
            }

            let result = scheduler.coordinate_agents(&scenario, context).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);

            let status = scheduler.system_status();
            info!(
                completed = status.tasks.completed,
                failed = status.tasks.failed,
                agents = status.agents.len(),
                "Scenario finished"
            );
            scheduler.shutdown();
            Ok(())
        }
    }
}
