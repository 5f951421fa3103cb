use brigade_core::Message;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Channel ends of one agent's execution context.
///
/// An agent runs as an independent task with no shared mutable state; the
/// handle is the only way to reach it. `inbox` carries messages to the agent,
/// `outbox` carries the agent's outgoing messages, and `join` allows the bus
/// to terminate the context.
pub struct AgentHandle {
    inbox: UnboundedSender<Message>,
    outbox: Option<UnboundedReceiver<Message>>,
    join: JoinHandle<()>,
}

impl AgentHandle {
    /// Wrap the channel ends of a spawned execution context.
    pub fn new(
        inbox: UnboundedSender<Message>,
        outbox: UnboundedReceiver<Message>,
        join: JoinHandle<()>,
    ) -> Self {
        Self {
            inbox,
            outbox: Some(outbox),
            join,
        }
    }

    /// A clone of the inbox sender.
    pub fn inbox(&self) -> UnboundedSender<Message> {
        self.inbox.clone()
    }

    /// Take the outbound receiver. The bus claims it at registration, so a
    /// handle can only be registered once; tests drive contexts through this
    /// directly.
    pub fn take_outbox(&mut self) -> Option<UnboundedReceiver<Message>> {
        self.outbox.take()
    }

    /// Detach the join handle for termination bookkeeping.
    pub(crate) fn into_join(self) -> JoinHandle<()> {
        self.join
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_outbox_taken_once() {
        let (in_tx, _in_rx) = mpsc::unbounded_channel();
        let (_out_tx, out_rx) = mpsc::unbounded_channel();
        let join = tokio::spawn(async {});
        let mut handle = AgentHandle::new(in_tx, out_rx, join);
        assert!(handle.take_outbox().is_some());
        assert!(handle.take_outbox().is_none());
    }
}
