use brigade_core::TaskPriority;
use chrono::{DateTime, Utc};
use uuid::Uuid;

struct QueueEntry {
    id: Uuid,
    rank: u8,
    created_at: DateTime<Utc>,
}

/// The pending-task queue: priority rank descending, creation time ascending
/// within a rank (FIFO). Re-sorted on every push.
pub(crate) struct TaskQueue {
    entries: Vec<QueueEntry>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a task and restore the queue ordering.
    pub fn push(&mut self, id: Uuid, priority: TaskPriority, created_at: DateTime<Utc>) {
        self.entries.push(QueueEntry {
            id,
            rank: priority.rank(),
            created_at,
        });
        self.entries
            .sort_by(|a, b| b.rank.cmp(&a.rank).then(a.created_at.cmp(&b.created_at)));
    }

    /// Dequeue the highest-ranked, oldest task.
    pub fn pop(&mut self) -> Option<Uuid> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0).id)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(base: DateTime<Utc>, offset_ms: i64) -> DateTime<Utc> {
        base + Duration::milliseconds(offset_ms)
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = TaskQueue::new();
        assert_eq!(queue.len(), 0);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_higher_priority_dequeued_first() {
        let base = Utc::now();
        let mut queue = TaskQueue::new();
        let low = Uuid::new_v4();
        let critical = Uuid::new_v4();

        // The low task is submitted first, the critical one later.
        queue.push(low, TaskPriority::Low, at(base, 0));
        queue.push(critical, TaskPriority::Critical, at(base, 10));

        assert_eq!(queue.pop(), Some(critical));
        assert_eq!(queue.pop(), Some(low));
    }

    #[test]
    fn test_equal_priority_is_fifo() {
        let base = Utc::now();
        let mut queue = TaskQueue::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let third = Uuid::new_v4();

        queue.push(first, TaskPriority::Medium, at(base, 0));
        queue.push(second, TaskPriority::Medium, at(base, 1));
        queue.push(third, TaskPriority::Medium, at(base, 2));

        assert_eq!(queue.pop(), Some(first));
        assert_eq!(queue.pop(), Some(second));
        assert_eq!(queue.pop(), Some(third));
    }

    #[test]
    fn test_mixed_priorities_full_ordering() {
        let base = Utc::now();
        let mut queue = TaskQueue::new();
        let medium = Uuid::new_v4();
        let high_a = Uuid::new_v4();
        let high_b = Uuid::new_v4();
        let low = Uuid::new_v4();

        queue.push(medium, TaskPriority::Medium, at(base, 0));
        queue.push(high_a, TaskPriority::High, at(base, 1));
        queue.push(low, TaskPriority::Low, at(base, 2));
        queue.push(high_b, TaskPriority::High, at(base, 3));

        assert_eq!(queue.pop(), Some(high_a));
        assert_eq!(queue.pop(), Some(high_b));
        assert_eq!(queue.pop(), Some(medium));
        assert_eq!(queue.pop(), Some(low));
        assert_eq!(queue.len(), 0);
    }
}
