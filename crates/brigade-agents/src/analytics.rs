use crate::runtime::AgentBehavior;
use async_trait::async_trait;
use brigade_core::{BrigadeError, BrigadeResult, TaskEnvelope};
use serde_json::{json, Value};

const POSITIVE_WORDS: &[&str] = &[
    "great", "good", "excellent", "delicious", "friendly", "fast", "amazing", "love",
];
const NEGATIVE_WORDS: &[&str] = &[
    "bad", "cold", "slow", "rude", "awful", "terrible", "wrong", "late",
];

/// Customer analytics agent: keyword sentiment over feedback text and
/// satisfaction scoring.
pub struct AnalyticsAgent;

impl AnalyticsAgent {
    fn analyze_feedback(data: &Value) -> BrigadeResult<Value> {
        let text = data
            .get("feedback")
            .and_then(Value::as_str)
            .ok_or_else(|| BrigadeError::AgentExecution("Missing 'feedback' text".into()))?
            .to_lowercase();

        let positive = POSITIVE_WORDS.iter().filter(|w| text.contains(*w)).count() as i64;
        let negative = NEGATIVE_WORDS.iter().filter(|w| text.contains(*w)).count() as i64;
        let score = positive - negative;
        let sentiment = if score > 0 {
            "positive"
        } else if score < 0 {
            "negative"
        } else {
            "neutral"
        };

        let intent = if text.contains("refund") || text.contains("complain") {
            "complaint"
        } else if text.contains('?') {
            "question"
        } else {
            "comment"
        };

        Ok(json!({
            "sentiment": sentiment,
            "score": score,
            "intent": intent,
        }))
    }

    fn analyze_satisfaction(data: &Value) -> BrigadeResult<Value> {
        // Start from a neutral baseline, pull by sentiment and rating.
        let mut score: f64 = 50.0;
        let mut drivers = Vec::new();

        match data
            .pointer("/analysis/sentiment")
            .and_then(Value::as_str)
        {
            Some("positive") => {
                score += 30.0;
                drivers.push("positive feedback");
            }
            Some("negative") => {
                score -= 30.0;
                drivers.push("negative feedback");
            }
            _ => {}
        }
        if let Some(rating) = data.get("rating").and_then(Value::as_f64) {
            score += (rating - 3.0) * 10.0;
            drivers.push("star rating");
        }

        Ok(json!({
            "satisfaction_score": score.clamp(0.0, 100.0),
            "drivers": drivers,
        }))
    }

    fn customer_satisfaction(data: &Value) -> BrigadeResult<Value> {
        let ratings: Vec<f64> = data
            .get("ratings")
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(Value::as_f64).collect())
            .unwrap_or_default();
        let average = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().sum::<f64>() / ratings.len() as f64
        };
        Ok(json!({
            "score": average,
            "samples": ratings.len(),
        }))
    }
}

#[async_trait]
impl AgentBehavior for AnalyticsAgent {
    async fn handle(&mut self, task: TaskEnvelope) -> BrigadeResult<Value> {
        match task.task_type.as_str() {
            "analyze_feedback" => Self::analyze_feedback(&task.data),
            "analyze_satisfaction" => Self::analyze_satisfaction(&task.data),
            "customer_satisfaction" => Self::customer_satisfaction(&task.data),
            other => Err(BrigadeError::AgentExecution(format!(
                "Unsupported task type '{other}'"
            ))),
        }
    }
}
