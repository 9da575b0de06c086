use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::models::AgentMessage;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AgentMessagesResponse {
    pub messages: Vec<AgentMessage>,
}

/// `GET /agent_messages`: rolling log for frontend polling, oldest first.
pub async fn list(State(state): State<AppState>) -> Json<AgentMessagesResponse> {
    Json(AgentMessagesResponse {
        messages: state.messages.snapshot().await,
    })
}
