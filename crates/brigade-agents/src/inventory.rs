use crate::runtime::AgentBehavior;
use async_trait::async_trait;
use brigade_core::{BrigadeError, BrigadeResult, TaskEnvelope};
use serde::Deserialize;
use serde_json::{json, Value};

/// Days of cover at or below which an item's alert is urgent.
const URGENT_DAYS: f64 = 1.0;
/// Days of cover at or below which an item's alert is a warning.
const WARNING_DAYS: f64 = 3.0;

#[derive(Debug, Deserialize)]
struct StockItem {
    item: String,
    #[serde(default)]
    quantity: f64,
    #[serde(default)]
    par_level: f64,
    #[serde(default)]
    daily_usage: f64,
    #[serde(default)]
    unit_cost: f64,
}

/// Inventory forecasting agent: stock checks against par levels, depletion
/// projections, and cost summaries.
pub struct InventoryAgent;

impl InventoryAgent {
    fn items(data: &Value) -> BrigadeResult<Vec<StockItem>> {
        let raw = data
            .get("inventory")
            .cloned()
            .unwrap_or_else(|| json!([]));
        serde_json::from_value(raw)
            .map_err(|e| BrigadeError::AgentExecution(format!("Bad inventory payload: {e}")))
    }

    fn check(data: &Value) -> BrigadeResult<Value> {
        let items = Self::items(data)?;
        let low_stock: Vec<Value> = items
            .iter()
            .filter(|i| i.par_level > 0.0 && i.quantity < i.par_level)
            .map(|i| {
                json!({
                    "item": i.item,
                    "quantity": i.quantity,
                    "par_level": i.par_level,
                })
            })
            .collect();
        let status = if low_stock.is_empty() { "ok" } else { "restock" };
        Ok(json!({
            "checked": items.len(),
            "low_stock": low_stock,
            "status": status,
        }))
    }

    fn predict(data: &Value) -> BrigadeResult<Value> {
        let items = Self::items(data)?;
        let horizon_days = data
            .get("horizon_days")
            .and_then(Value::as_f64)
            .unwrap_or(7.0);

        let mut alerts = Vec::new();
        for item in &items {
            if item.daily_usage <= 0.0 {
                continue;
            }
            let days_left = item.quantity / item.daily_usage;
            let severity = if days_left <= URGENT_DAYS {
                "urgent"
            } else if days_left <= WARNING_DAYS {
                "warning"
            } else {
                continue;
            };
            alerts.push(json!({
                "item": item.item,
                "days_left": days_left,
                "severity": severity,
            }));
        }

        Ok(json!({
            "horizon_days": horizon_days,
            "items": items.len(),
            "alerts": alerts,
        }))
    }

    fn costs(data: &Value) -> BrigadeResult<Value> {
        let items = Self::items(data)?;
        let total: f64 = items.iter().map(|i| i.quantity * i.unit_cost).sum();
        Ok(json!({
            "total_cost": total,
            "items": items.len(),
        }))
    }
}

#[async_trait]
impl AgentBehavior for InventoryAgent {
    async fn handle(&mut self, task: TaskEnvelope) -> BrigadeResult<Value> {
        match task.task_type.as_str() {
            "check_inventory" => Self::check(&task.data),
            "predict_inventory" => Self::predict(&task.data),
            "inventory_costs" => Self::costs(&task.data),
            other => Err(BrigadeError::AgentExecution(format!(
                "Unsupported task type '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn stock(item: &str, quantity: f64, daily_usage: f64) -> Value {
        json!({"item": item, "quantity": quantity, "daily_usage": daily_usage})
    }

    #[test]
    fn test_predict_flags_urgent_and_warning() {
        let data = json!({"inventory": [
            stock("tomatoes", 2.0, 4.0),   // half a day left: urgent
            stock("flour", 6.0, 3.0),      // two days left: warning
            stock("salt", 100.0, 1.0),     // plenty
        ]});
        let result = InventoryAgent::predict(&data).unwrap();
        let alerts = result["alerts"].as_array().unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0]["severity"], json!("urgent"));
        assert_eq!(alerts[1]["severity"], json!("warning"));
    }

    #[test]
    fn test_predict_without_usage_has_no_alerts() {
        let data = json!({"inventory": [ {"item": "napkins", "quantity": 0.0} ]});
        let result = InventoryAgent::predict(&data).unwrap();
        assert!(result["alerts"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_check_reports_low_stock() {
        let data = json!({"inventory": [
            {"item": "basil", "quantity": 1.0, "par_level": 5.0},
            {"item": "rice", "quantity": 20.0, "par_level": 10.0},
        ]});
        let result = InventoryAgent::check(&data).unwrap();
        assert_eq!(result["status"], json!("restock"));
        assert_eq!(result["low_stock"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_costs_sum() {
        let data = json!({"inventory": [
            {"item": "beef", "quantity": 10.0, "unit_cost": 8.0},
            {"item": "buns", "quantity": 40.0, "unit_cost": 0.5},
        ]});
        let result = InventoryAgent::costs(&data).unwrap();
        assert_eq!(result["total_cost"], json!(100.0));
    }

    #[tokio::test]
    async fn test_unsupported_type_fails() {
        let mut agent = InventoryAgent;
        let task = TaskEnvelope {
            id: uuid::Uuid::new_v4(),
            task_type: "translate_menu".into(),
            data: json!({}),
            priority: brigade_core::TaskPriority::Low,
        };
        assert!(agent.handle(task).await.is_err());
    }
}
