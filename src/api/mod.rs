use crate::api::rate_limit::enforce_rate_limit;
use crate::config::Config;
use crate::services::message_service::MessageService;
use crate::services::rate_limit_service::RateLimitService;
use axum::body::Body;
use axum::http::Request;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod health;
pub mod messages;
pub mod middleware;
pub mod rate_limit;
pub mod schemas;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub message_service: MessageService,
    pub rate_limit_service: RateLimitService,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub message_service: MessageService,
    pub rate_limit_service: RateLimitService,
}

/// Configures and returns the application router.
///
/// Serve it with connect info so the rate limiter can see peer addresses.
pub fn app_router(config: Config, services: ServiceContainer) -> Router {
    let state = AppState {
        config,
        message_service: services.message_service,
        rate_limit_service: services.rate_limit_service,
    };

    let message_routes = Router::new()
        .route("/messages", post(messages::create_message).get(messages::list_messages))
        .route("/messages/{id}", get(messages::get_message))
        .route_layer(from_fn_with_state(state.clone(), enforce_rate_limit));

    Router::new()
        .route("/", get(health::root))
        .merge(message_routes)
        .layer(PropagateRequestIdLayer::new(axum::http::HeaderName::from_static("x-request-id")))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(
            axum::http::HeaderName::from_static("x-request-id"),
            tower_http::request_id::MakeRequestUuid,
        ))
        .with_state(state)
}
