use std::collections::HashMap;

/// Capability resolved for task types with no explicit mapping. Agents that
/// accept arbitrary work declare it.
pub const DEFAULT_CAPABILITY: &str = "general_processing";

/// The static task-type → capability table consulted before every dispatch.
///
/// The mapping is total: unknown task types resolve to
/// [`DEFAULT_CAPABILITY`] rather than failing at lookup time.
#[derive(Debug, Clone)]
pub struct CapabilityTable {
    entries: HashMap<String, String>,
}

impl CapabilityTable {
    /// The built-in restaurant-operations mapping.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        for (task_type, capability) in [
            ("optimize_orders", "order_optimization"),
            ("batch_orders", "order_optimization"),
            ("schedule_kitchen", "kitchen_scheduling"),
            ("check_inventory", "inventory_forecasting"),
            ("predict_inventory", "inventory_forecasting"),
            ("inventory_costs", "inventory_forecasting"),
            ("analyze_feedback", "text_analysis"),
            ("analyze_satisfaction", "customer_analytics"),
            ("customer_satisfaction", "customer_analytics"),
            ("order_revenue", "order_optimization"),
            ("aggregate_revenue", "data_aggregation"),
        ] {
            entries.insert(task_type.to_string(), capability.to_string());
        }
        Self { entries }
    }

    /// Add or override one mapping.
    pub fn with_mapping(
        mut self,
        task_type: impl Into<String>,
        capability: impl Into<String>,
    ) -> Self {
        self.entries.insert(task_type.into(), capability.into());
        self
    }

    /// Merge a set of overrides (e.g. from a config file).
    pub fn extend(&mut self, overrides: HashMap<String, String>) {
        self.entries.extend(overrides);
    }

    /// Resolve the capability a task type requires. Total: unknown types
    /// fall back to [`DEFAULT_CAPABILITY`].
    pub fn resolve(&self, task_type: &str) -> &str {
        self.entries
            .get(task_type)
            .map_or(DEFAULT_CAPABILITY, String::as_str)
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_mappings() {
        let table = CapabilityTable::new();
        assert_eq!(table.resolve("optimize_orders"), "order_optimization");
        assert_eq!(table.resolve("predict_inventory"), "inventory_forecasting");
        assert_eq!(table.resolve("analyze_feedback"), "text_analysis");
        assert_eq!(table.resolve("aggregate_revenue"), "data_aggregation");
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let table = CapabilityTable::new();
        assert_eq!(table.resolve("translate_menu"), DEFAULT_CAPABILITY);
        assert_eq!(table.resolve(""), DEFAULT_CAPABILITY);
    }

    #[test]
    fn test_overrides_win() {
        let mut table = CapabilityTable::new().with_mapping("translate_menu", "text_analysis");
        assert_eq!(table.resolve("translate_menu"), "text_analysis");

        let mut overrides = HashMap::new();
        overrides.insert("optimize_orders".to_string(), "kitchen_scheduling".to_string());
        table.extend(overrides);
        assert_eq!(table.resolve("optimize_orders"), "kitchen_scheduling");
    }
}
