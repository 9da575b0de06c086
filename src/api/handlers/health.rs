use axum::Json;

use super::chat::ChatResponse;

pub async fn health_check() -> Json<ChatResponse> {
    Json(ChatResponse {
        response: "copybot agent is healthy!".into(),
    })
}
