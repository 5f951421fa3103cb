use brigade_core::{BrigadeError, BrigadeResult};
use regex::Regex;

/// Matches message types for route dispatch.
///
/// Exact matching and pattern matching sit behind the single
/// [`matches`](Self::matches) interface so handlers never care which kind
/// they were registered with.
#[derive(Debug, Clone)]
pub enum RouteMatcher {
    /// Matches one message type verbatim.
    Exact(String),
    /// Matches any message type the regex accepts.
    Pattern(Regex),
}

impl RouteMatcher {
    /// An exact-type matcher.
    pub fn exact(message_type: impl Into<String>) -> Self {
        RouteMatcher::Exact(message_type.into())
    }

    /// A pattern matcher compiled from a regex.
    pub fn pattern(pattern: &str) -> BrigadeResult<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| BrigadeError::Config(format!("Invalid route pattern '{pattern}': {e}")))?;
        Ok(RouteMatcher::Pattern(regex))
    }

    /// Whether the given message type satisfies this matcher.
    pub fn matches(&self, message_type: &str) -> bool {
        match self {
            RouteMatcher::Exact(t) => t == message_type,
            RouteMatcher::Pattern(re) => re.is_match(message_type),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let matcher = RouteMatcher::exact("task_complete");
        assert!(matcher.matches("task_complete"));
        assert!(!matcher.matches("task_completed"));
        assert!(!matcher.matches("task"));
    }

    #[test]
    fn test_pattern_match() {
        let matcher = RouteMatcher::pattern("^task_").unwrap();
        assert!(matcher.matches("task_complete"));
        assert!(matcher.matches("task_progress"));
        assert!(!matcher.matches("inventory_alert"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = RouteMatcher::pattern("(unclosed");
        assert!(matches!(result, Err(BrigadeError::Config(_))));
    }
}
