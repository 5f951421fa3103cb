use brigade_core::AgentStatus;

/// Score one candidate agent for a task.
///
/// `weight + status_bonus − 2×queue_depth + name_bonus`, where the status
/// bonus is +10 idle / +5 busy / −20 errored, and the name bonus is +5 when
/// the task type is itself one of the agent's declared capability names.
pub fn score_candidate(
    weight: i64,
    status: AgentStatus,
    queue_depth: usize,
    capabilities: &[String],
    task_type: &str,
) -> i64 {
    let status_bonus = match status {
        AgentStatus::Idle => 10,
        AgentStatus::Busy => 5,
        AgentStatus::Error => -20,
    };
    let name_bonus = if capabilities.iter().any(|c| c == task_type) {
        5
    } else {
        0
    };
    weight + status_bonus - 2 * queue_depth as i64 + name_bonus
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn caps(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_idle_lightweight_beats_busy_heavyweight() {
        // weight 1, idle, empty queue: 1 + 10 = 11
        let idle = score_candidate(
            1,
            AgentStatus::Idle,
            0,
            &caps(&["order_optimization"]),
            "optimize_orders",
        );
        // weight 3, busy, two queued: 3 + 5 − 4 = 4
        let busy = score_candidate(
            3,
            AgentStatus::Busy,
            2,
            &caps(&["order_optimization"]),
            "optimize_orders",
        );
        assert_eq!(idle, 11);
        assert_eq!(busy, 4);
        assert!(idle > busy);
    }

    #[test]
    fn test_weight_breaks_even_load() {
        let light = score_candidate(1, AgentStatus::Idle, 0, &caps(&["text_analysis"]), "analyze");
        let heavy = score_candidate(3, AgentStatus::Idle, 0, &caps(&["text_analysis"]), "analyze");
        assert!(heavy > light);
    }

    #[test]
    fn test_errored_agent_scores_low() {
        let errored = score_candidate(5, AgentStatus::Error, 0, &caps(&[]), "optimize_orders");
        assert_eq!(errored, -15);
    }

    #[test]
    fn test_capability_name_bonus() {
        let without = score_candidate(
            0,
            AgentStatus::Idle,
            0,
            &caps(&["order_optimization"]),
            "optimize_orders",
        );
        let with = score_candidate(
            0,
            AgentStatus::Idle,
            0,
            &caps(&["optimize_orders"]),
            "optimize_orders",
        );
        assert_eq!(without, 10);
        assert_eq!(with, 15);
    }
}
