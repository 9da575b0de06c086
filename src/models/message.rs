use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in the rolling agent message log, polled by clients
/// via `GET /agent_messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    pub agent_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl AgentMessage {
    pub fn new(agent_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}
