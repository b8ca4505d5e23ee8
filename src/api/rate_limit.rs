use crate::api::AppState;
use crate::error::AppError;
use crate::services::rate_limit_service::Decision;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

/// Charges the request against the client's window before any handler logic runs.
///
/// Requires the server to be run with `into_make_service_with_connect_info::<SocketAddr>()`.
pub async fn enforce_rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(ConnectInfo(peer)) = req.extensions().get::<ConnectInfo<SocketAddr>>().copied() else {
        tracing::error!("Peer address missing; rate limiting needs connect info");
        return AppError::Internal.into_response();
    };

    let client = state.rate_limit_service.client_ip(req.headers(), peer.ip());
    match state.rate_limit_service.check(client) {
        Decision::Allowed => next.run(req).await,
        Decision::Throttled { retry_after } => {
            // Round up so clients never retry while still inside the window.
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            AppError::RateLimited { retry_after_secs: secs.max(1) }.into_response()
        }
    }
}
