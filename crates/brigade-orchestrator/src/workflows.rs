use crate::scheduler::TaskScheduler;
use brigade_core::{BrigadeError, BrigadeResult, TaskPriority, DEFAULT_TASK_TIMEOUT_MS};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

/// The fixed cross-agent business scenarios the scheduler can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinationScenario {
    /// Order optimization and inventory check in parallel, tolerant of
    /// either branch failing.
    OrderProcessing,
    /// Text analysis whose output feeds a satisfaction analysis.
    FeedbackAnalysis,
    /// Inventory prediction; urgent alerts are broadcast before returning.
    InventoryAlert,
    /// Three tolerant parallel analyses feeding one final aggregation.
    RevenueAnalysis,
}

impl CoordinationScenario {
    /// Parse a scenario name; `-` and `_` separators are both accepted.
    pub fn parse(name: &str) -> BrigadeResult<Self> {
        match name.replace('-', "_").as_str() {
            "order_processing" => Ok(CoordinationScenario::OrderProcessing),
            "feedback_analysis" => Ok(CoordinationScenario::FeedbackAnalysis),
            "inventory_alert" => Ok(CoordinationScenario::InventoryAlert),
            "revenue_analysis" => Ok(CoordinationScenario::RevenueAnalysis),
            _ => Err(BrigadeError::Submission(format!(
                "Unknown coordination scenario '{name}'"
            ))),
        }
    }

    /// Canonical scenario name.
    pub fn name(self) -> &'static str {
        match self {
            CoordinationScenario::OrderProcessing => "order_processing",
            CoordinationScenario::FeedbackAnalysis => "feedback_analysis",
            CoordinationScenario::InventoryAlert => "inventory_alert",
            CoordinationScenario::RevenueAnalysis => "revenue_analysis",
        }
    }
}

impl TaskScheduler {
    /// Run a named coordination scenario and return its aggregated result.
    ///
    /// Parallel fan-outs suspend on the slowest branch; sequential chains
    /// suspend on each step.
    pub async fn coordinate_agents(&self, scenario: &str, context: Value) -> BrigadeResult<Value> {
        let scenario = CoordinationScenario::parse(scenario)?;
        info!(scenario = scenario.name(), "Coordinating agents");
        match scenario {
            CoordinationScenario::OrderProcessing => self.order_processing(context).await,
            CoordinationScenario::FeedbackAnalysis => self.feedback_analysis(context).await,
            CoordinationScenario::InventoryAlert => self.inventory_alert(context).await,
            CoordinationScenario::RevenueAnalysis => self.revenue_analysis(context).await,
        }
    }

    /// Submit one task and await its result with the default branch timeout.
    async fn run_branch(
        &self,
        task_type: &str,
        data: Value,
        priority: TaskPriority,
    ) -> BrigadeResult<Value> {
        let id = self.submit_task(task_type, data, priority)?;
        self.task_result(id, Duration::from_millis(DEFAULT_TASK_TIMEOUT_MS))
            .await
    }

    async fn order_processing(&self, context: Value) -> BrigadeResult<Value> {
        let orders = context.get("orders").cloned().unwrap_or_else(|| json!([]));
        let inventory = context.get("inventory").cloned().unwrap_or(Value::Null);

        let (optimization, inventory_check) = tokio::join!(
            self.run_branch(
                "optimize_orders",
                json!({ "orders": orders.clone() }),
                TaskPriority::High,
            ),
            self.run_branch(
                "check_inventory",
                json!({ "orders": orders, "inventory": inventory }),
                TaskPriority::High,
            ),
        );

        let mut recommendations = Vec::new();
        let mut errors = Vec::new();
        match &optimization {
            Ok(result) => recommendations.push(json!({
                "kind": "order_batching",
                "detail": result,
            })),
            Err(e) => {
                warn!(error = %e, "Order optimization branch failed");
                errors.push(format!("optimize_orders: {e}"));
            }
        }
        match &inventory_check {
            Ok(result) => recommendations.push(json!({
                "kind": "inventory",
                "detail": result,
            })),
            Err(e) => {
                warn!(error = %e, "Inventory check branch failed");
                errors.push(format!("check_inventory: {e}"));
            }
        }

        Ok(json!({
            "scenario": "order_processing",
            "optimization": optimization.ok(),
            "inventory": inventory_check.ok(),
            "recommendations": recommendations,
            "errors": errors,
        }))
    }

    async fn feedback_analysis(&self, context: Value) -> BrigadeResult<Value> {
        let analysis = self
            .run_branch("analyze_feedback", context.clone(), TaskPriority::Medium)
            .await?;

        // The first step's sentiment/intent output becomes part of the
        // second step's input.
        let mut input = context.as_object().cloned().unwrap_or_default();
        input.insert("analysis".into(), analysis.clone());
        let satisfaction = self
            .run_branch(
                "analyze_satisfaction",
                Value::Object(input),
                TaskPriority::Medium,
            )
            .await?;

        Ok(json!({
            "scenario": "feedback_analysis",
            "analysis": analysis,
            "satisfaction": satisfaction,
        }))
    }

    async fn inventory_alert(&self, context: Value) -> BrigadeResult<Value> {
        let prediction = self
            .run_branch("predict_inventory", context, TaskPriority::High)
            .await?;

        let urgent: Vec<Value> = prediction
            .get("alerts")
            .and_then(Value::as_array)
            .map(|alerts| {
                alerts
                    .iter()
                    .filter(|alert| {
                        alert.get("severity").and_then(Value::as_str) == Some("urgent")
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if !urgent.is_empty() {
            info!(count = urgent.len(), "Broadcasting urgent inventory alerts");
            self.broadcast_update("inventory_alert", json!({ "alerts": urgent }))?;
        }

        Ok(prediction)
    }

    async fn revenue_analysis(&self, context: Value) -> BrigadeResult<Value> {
        let (orders, costs, satisfaction) = tokio::join!(
            self.run_branch("order_revenue", context.clone(), TaskPriority::Medium),
            self.run_branch("inventory_costs", context.clone(), TaskPriority::Medium),
            self.run_branch("customer_satisfaction", context.clone(), TaskPriority::Medium),
        );

        let mut errors = Vec::new();
        for (branch, outcome) in [
            ("order_revenue", &orders),
            ("inventory_costs", &costs),
            ("customer_satisfaction", &satisfaction),
        ] {
            if let Err(e) = outcome {
                warn!(branch, error = %e, "Revenue branch failed");
                errors.push(format!("{branch}: {e}"));
            }
        }

        self.run_branch(
            "aggregate_revenue",
            json!({
                "order_revenue": orders.ok(),
                "inventory_costs": costs.ok(),
                "customer_satisfaction": satisfaction.ok(),
                "errors": errors,
            }),
            TaskPriority::High,
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_both_separators() {
        assert_eq!(
            CoordinationScenario::parse("order-processing").unwrap(),
            CoordinationScenario::OrderProcessing
        );
        assert_eq!(
            CoordinationScenario::parse("order_processing").unwrap(),
            CoordinationScenario::OrderProcessing
        );
        assert_eq!(
            CoordinationScenario::parse("inventory_alert").unwrap(),
            CoordinationScenario::InventoryAlert
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let result = CoordinationScenario::parse("table_reservation");
        assert!(matches!(result, Err(BrigadeError::Submission(_))));
    }

    #[test]
    fn test_canonical_names() {
        for scenario in [
            CoordinationScenario::OrderProcessing,
            CoordinationScenario::FeedbackAnalysis,
            CoordinationScenario::InventoryAlert,
            CoordinationScenario::RevenueAnalysis,
        ] {
            assert_eq!(CoordinationScenario::parse(scenario.name()).unwrap(), scenario);
        }
    }
}
