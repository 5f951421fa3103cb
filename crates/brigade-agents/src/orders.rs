use crate::runtime::AgentBehavior;
use async_trait::async_trait;
use brigade_core::{BrigadeError, BrigadeResult, TaskEnvelope};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Minutes of prep attributed to each item in a batch estimate.
const MINUTES_PER_ITEM: f64 = 2.5;

#[derive(Debug, Deserialize)]
struct Order {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    items: Vec<OrderItem>,
    #[serde(default)]
    total: f64,
}

#[derive(Debug, Deserialize)]
struct OrderItem {
    name: String,
    #[serde(default = "default_station")]
    station: String,
    #[serde(default = "default_count")]
    count: u32,
}

fn default_station() -> String {
    "kitchen".to_string()
}

fn default_count() -> u32 {
    1
}

/// Order optimization agent: groups open orders into per-station batches and
/// summarizes revenue.
pub struct OrderAgent;

impl OrderAgent {
    fn orders(data: &Value) -> BrigadeResult<Vec<Order>> {
        let raw = data.get("orders").cloned().unwrap_or_else(|| json!([]));
        serde_json::from_value(raw)
            .map_err(|e| BrigadeError::AgentExecution(format!("Bad orders payload: {e}")))
    }

    fn optimize(data: &Value) -> BrigadeResult<Value> {
        let orders = Self::orders(data)?;

        // Group by station; BTreeMap keeps batch order stable.
        let mut stations: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        for order in &orders {
            for item in &order.items {
                stations.entry(item.station.clone()).or_default().push(json!({
                    "name": item.name.clone(),
                    "count": item.count,
                    "order_id": order.id.clone(),
                }));
            }
        }

        let mut total_minutes = 0.0;
        let batches: Vec<Value> = stations
            .into_iter()
            .map(|(station, items)| {
                let minutes = items.len() as f64 * MINUTES_PER_ITEM;
                total_minutes += minutes;
                json!({
                    "station": station,
                    "items": items,
                    "estimated_minutes": minutes,
                })
            })
            .collect();

        Ok(json!({
            "total_orders": orders.len(),
            "batches": batches,
            "estimated_minutes": total_minutes,
        }))
    }

    fn revenue(data: &Value) -> BrigadeResult<Value> {
        let orders = Self::orders(data)?;
        let revenue: f64 = orders.iter().map(|o| o.total).sum();
        Ok(json!({
            "revenue": revenue,
            "orders": orders.len(),
        }))
    }
}

#[async_trait]
impl AgentBehavior for OrderAgent {
    async fn handle(&mut self, task: TaskEnvelope) -> BrigadeResult<Value> {
        match task.task_type.as_str() {
            "optimize_orders" | "batch_orders" | "schedule_kitchen" => Self::optimize(&task.data),
            "order_revenue" => Self::revenue(&task.data),
            other => Err(BrigadeError::AgentExecution(format!(
                "Unsupported task type '{other}'"
            ))),
        }
    }
}
