use crate::runtime::AgentBehavior;
use async_trait::async_trait;
use brigade_core::{BrigadeResult, TaskEnvelope};
use serde_json::{json, Value};

/// Aggregation agent: merges branch results into summary reports. Also the
/// workhorse behind the `general_processing` fallback capability, where it
/// acknowledges whatever it is handed.
pub struct AggregatorAgent;

impl AggregatorAgent {
    fn aggregate_revenue(data: &Value) -> Value {
        let revenue = data
            .pointer("/order_revenue/revenue")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let costs = data
            .pointer("/inventory_costs/total_cost")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let satisfaction = data
            .pointer("/customer_satisfaction/score")
            .and_then(Value::as_f64);
        let errors = data
            .get("errors")
            .cloned()
            .unwrap_or_else(|| json!([]));

        json!({
            "gross_revenue": revenue,
            "inventory_costs": costs,
            "margin": revenue - costs,
            "customer_satisfaction": satisfaction,
            "partial": !errors.as_array().map_or(true, Vec::is_empty),
            "errors": errors,
        })
    }
}

#[async_trait]
impl AgentBehavior for AggregatorAgent {
    async fn handle(&mut self, task: TaskEnvelope) -> BrigadeResult<Value> {
        match task.task_type.as_str() {
            "aggregate_revenue" => Ok(Self::aggregate_revenue(&task.data)),
            // Fallback-capability work: acknowledge and echo.
            other => Ok(json!({
                "task_type": other,
                "received": task.data,
            })),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_revenue_margin() {
        let data = json!({
            "order_revenue": {"revenue": 1200.0},
            "inventory_costs": {"total_cost": 450.0},
            "customer_satisfaction": {"score": 4.2},
            "errors": [],
        });
        let result = AggregatorAgent::aggregate_revenue(&data);
        assert_eq!(result["gross_revenue"], json!(1200.0));
        assert_eq!(result["margin"], json!(750.0));
        assert_eq!(result["customer_satisfaction"], json!(4.2));
        assert_eq!(result["partial"], json!(false));
    }

    #[test]
    fn test_aggregate_revenue_partial() {
        let data = json!({
            "order_revenue": {"revenue": 300.0},
            "errors": ["inventory_costs: No agent available"],
        });
        let result = AggregatorAgent::aggregate_revenue(&data);
        assert_eq!(result["margin"], json!(300.0));
        assert_eq!(result["partial"], json!(true));
        assert!(result["customer_satisfaction"].is_null());
    }

    #[tokio::test]
    async fn test_fallback_echoes_unknown_types() {
        let mut agent = AggregatorAgent;
        let task = TaskEnvelope {
            id: uuid::Uuid::new_v4(),
            task_type: "reindex_menu".into(),
            data: json!({"menu": ["pizza"]}),
            priority: brigade_core::TaskPriority::Low,
        };
        let result = agent.handle(task).await.unwrap();
        assert_eq!(result["task_type"], json!("reindex_menu"));
        assert_eq!(result["received"]["menu"][0], json!("pizza"));
    }
}
