use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::models::AgentMessage;

/// Maximum number of retained messages.
pub const MAX_MESSAGES: usize = 50;

/// Bounded, ordered log of agent messages for client polling.
///
/// Append-only with oldest-eviction. Appends are atomic with respect to
/// concurrent watchers writing completion and expiry notices.
#[derive(Clone, Default)]
pub struct MessageLog {
    inner: Arc<Mutex<VecDeque<AgentMessage>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, agent_name: &str, message: impl Into<String>) {
        let mut log = self.inner.lock().await;
        log.push_back(AgentMessage::new(agent_name, message));
        while log.len() > MAX_MESSAGES {
            log.pop_front();
        }
    }

    /// Snapshot of the current log, oldest first.
    pub async fn snapshot(&self) -> Vec<AgentMessage> {
        self.inner.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_preserve_order() {
        let log = MessageLog::new();
        log.push("copybot", "first").await;
        log.push("copybot", "second").await;

        let messages = log.snapshot().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message, "first");
        assert_eq!(messages[1].message, "second");
    }

    #[tokio::test]
    async fn capacity_evicts_oldest() {
        let log = MessageLog::new();
        for i in 0..(MAX_MESSAGES + 10) {
            log.push("copybot", format!("msg {i}")).await;
        }

        let messages = log.snapshot().await;
        assert_eq!(messages.len(), MAX_MESSAGES);
        assert_eq!(messages[0].message, "msg 10");
        assert_eq!(messages.last().unwrap().message, format!("msg {}", MAX_MESSAGES + 9));
    }
}
