use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Liveness message; no auth, no rate limit.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "API Mensageria rodando" }))
}
