use crate::adapters::store::StoreError;
use crate::domain::message::FieldViolation;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

pub const RATE_LIMIT_DETAIL: &str = "Too many requests, try again later.";
pub const NOT_FOUND_DETAIL: &str = "Mensagem não encontrada";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldViolation>),
    #[error("Not found")]
    NotFound,
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error("Data store returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("Bad gateway: {0}")]
    BadGateway(String),
    #[error("Internal server error")]
    Internal,
}

impl AppError {
    #[must_use]
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation { field, message: message.into() }])
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Status { status, body } => Self::Upstream { status, body },
            StoreError::Transport(e) => Self::BadGateway(e.to_string()),
            StoreError::Decode(e) => Self::BadGateway(format!("invalid JSON from data store: {e}")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Unauthorized => {
                tracing::debug!("Authorization failed");
                (StatusCode::UNAUTHORIZED, Value::from("Unauthorized"))
            }
            Self::Validation(violations) => {
                tracing::debug!(violations = ?violations, "Validation failed");
                (StatusCode::UNPROCESSABLE_ENTITY, json!(violations))
            }
            Self::NotFound => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, Value::from(NOT_FOUND_DETAIL))
            }
            Self::RateLimited { retry_after_secs } => {
                let body = Json(json!({ "detail": RATE_LIMIT_DETAIL }));
                let mut resp = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
                resp.headers_mut().insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                return resp;
            }
            Self::Upstream { status, body } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                if status.is_server_error() {
                    tracing::error!(status = %status.as_u16(), body = %body, "Data store error");
                } else {
                    tracing::warn!(status = %status.as_u16(), body = %body, "Data store rejected request");
                }
                (status, Value::from(body))
            }
            Self::BadGateway(msg) => {
                tracing::error!(error = %msg, "Data store unreachable");
                (StatusCode::BAD_GATEWAY, Value::from("Bad gateway"))
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Value::from("Internal server error"))
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
