use crate::api::AppState;
use crate::api::middleware::ApiKey;
use crate::api::schemas::messages::CreateMessageRequest;
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// Validates, stores and announces a new message.
///
/// # Errors
/// Returns `AppError::Validation` if the body is malformed or breaks a field constraint.
/// Returns `AppError::Upstream` if the data store rejects the insert.
pub async fn create_message(
    _auth: ApiKey,
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(req) = payload.map_err(|e| AppError::invalid_field("body", e.body_text()))?;

    let record = state.message_service.create_message(req.into()).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Lists every stored message.
///
/// # Errors
/// Returns `AppError::Upstream` if the data store rejects the query.
pub async fn list_messages(_auth: ApiKey, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let records = state.message_service.list_messages().await?;

    Ok(Json(records))
}

/// Fetches a single message by id.
///
/// # Errors
/// Returns `AppError::Validation` if `id` is not a UUID; the store is not contacted.
/// Returns `AppError::NotFound` if no message has this id.
pub async fn get_message(
    _auth: ApiKey,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = Uuid::parse_str(&id).map_err(|e| AppError::invalid_field("id", format!("must be a valid UUID: {e}")))?;

    let record = state.message_service.get_message(id).await?;

    Ok(Json(record))
}
