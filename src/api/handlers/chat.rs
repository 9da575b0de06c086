use axum::extract::State;
use axum::Json;
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::agent;
use crate::{AppState, AGENT_NAME};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// `POST /chat`: classify the message and run the matching flow. The reply
/// is always prose with HTTP 200; it is also appended to the agent message
/// log for clients that poll instead of reading the response body.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    counter!("chat_requests_total").increment(1);

    let response = agent::handle_message(&state, &req.message).await;
    state.messages.push(AGENT_NAME, response.clone()).await;

    Json(ChatResponse { response })
}
