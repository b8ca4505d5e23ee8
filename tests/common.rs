#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    missing_debug_implementations,
    unreachable_pub,
    dead_code
)]
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use ipnetwork::IpNetwork;
use mensageria_server::AppBuilder;
use mensageria_server::config::{
    AuthConfig, Config, EmailConfig, LogFormat, RateLimitConfig, ServerConfig, StoreConfig, TelemetryConfig,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

pub const API_SECRET: &str = "test_api_secret";
pub const STORE_KEY: &str = "test_store_key";
pub const EMAIL_KEY: &str = "test_email_key";

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("mensageria_server=debug".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

/// In-memory stand-in for the data store's REST interface.
#[derive(Debug)]
pub struct MockStore {
    pub records: Mutex<Vec<Value>>,
    pub calls: AtomicUsize,
    /// When set, inserts fail with this status and raw body.
    pub reject_insert: Mutex<Option<(u16, String)>>,
    /// When false, inserts answer with an empty array instead of the stored representation.
    pub return_representation: AtomicBool,
    pub last_headers: Mutex<Option<HeaderMap>>,
    pub last_query: Mutex<Option<HashMap<String, String>>>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            reject_insert: Mutex::new(None),
            return_representation: AtomicBool::new(true),
            last_headers: Mutex::new(None),
            last_query: Mutex::new(None),
        }
    }
}

impl MockStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn store_insert(
    State(store): State<Arc<MockStore>>,
    headers: HeaderMap,
    Json(record): Json<Value>,
) -> impl IntoResponse {
    store.calls.fetch_add(1, Ordering::SeqCst);
    *store.last_headers.lock().unwrap() = Some(headers);

    if let Some((status, body)) = store.reject_insert.lock().unwrap().clone() {
        return (StatusCode::from_u16(status).unwrap(), body).into_response();
    }

    store.records.lock().unwrap().push(record.clone());
    let reply = if store.return_representation.load(Ordering::SeqCst) { json!([record]) } else { json!([]) };
    (StatusCode::CREATED, Json(reply)).into_response()
}

async fn store_select(
    State(store): State<Arc<MockStore>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    store.calls.fetch_add(1, Ordering::SeqCst);
    *store.last_headers.lock().unwrap() = Some(headers);
    *store.last_query.lock().unwrap() = Some(query.clone());

    let records = store.records.lock().unwrap().clone();
    let matching: Vec<Value> = match query.get("id").and_then(|f| f.strip_prefix("eq.")) {
        Some(id) => records.into_iter().filter(|r| r["id"] == id).collect(),
        None => records,
    };
    Json(Value::Array(matching))
}

/// Stand-in for the transactional email provider.
#[derive(Debug, Default)]
pub struct MockEmail {
    pub sent: Mutex<Vec<Value>>,
    pub fail: AtomicBool,
    pub last_api_key: Mutex<Option<String>>,
}

impl MockEmail {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

async fn email_send(
    State(email): State<Arc<MockEmail>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    *email.last_api_key.lock().unwrap() =
        headers.get("api-key").and_then(|v| v.to_str().ok()).map(ToString::to_string);
    email.sent.lock().unwrap().push(payload);

    if email.fail.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "code": "internal_error" }))).into_response();
    }
    (StatusCode::CREATED, Json(json!({ "messageId": "<mock@smtp>" }))).into_response()
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await.unwrap();
    });
    addr
}

pub fn get_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            trusted_proxies: vec!["127.0.0.1/32".parse::<IpNetwork>().unwrap(), "::1/128".parse().unwrap()],
            shutdown_timeout_secs: 1,
        },
        auth: AuthConfig { api_secret: API_SECRET.to_string() },
        rate_limit: RateLimitConfig { requests: 10_000, window_secs: 1 },
        store: StoreConfig {
            url: "http://127.0.0.1:9".to_string(),
            key: STORE_KEY.to_string(),
            table: "messages".to_string(),
            timeout_secs: 2,
        },
        email: EmailConfig {
            api_key: EMAIL_KEY.to_string(),
            api_url: "http://127.0.0.1:9/v3/smtp/email".to_string(),
            sender_name: "Mensageria API".to_string(),
            sender_address: "no-reply@example.com".to_string(),
            recipient: "inbox@example.com".to_string(),
            timeout_secs: 2,
        },
        telemetry: TelemetryConfig { log_format: LogFormat::Text, otlp_endpoint: None },
    }
}

pub struct TestApp {
    pub server_url: String,
    pub client: reqwest::Client,
    pub store: Arc<MockStore>,
    pub email: Arc<MockEmail>,
    pub config: Config,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_config(get_test_config()).await
    }

    /// Starts the mock upstreams, points `config` at them and serves the real router.
    pub async fn spawn_with_config(mut config: Config) -> Self {
        setup_tracing();

        let store = Arc::new(MockStore::default());
        let store_addr = serve(
            Router::new()
                .route("/rest/v1/messages", post(store_insert).get(store_select))
                .with_state(Arc::clone(&store)),
        )
        .await;

        let email = Arc::new(MockEmail::default());
        let email_addr =
            serve(Router::new().route("/v3/smtp/email", post(email_send)).with_state(Arc::clone(&email))).await;

        config.store.url = format!("http://{store_addr}");
        config.email.api_url = format!("http://{email_addr}/v3/smtp/email");

        let services = AppBuilder::new(config.clone()).build().unwrap();
        let router = mensageria_server::api::app_router(config.clone(), services);
        let addr = serve(router).await;

        Self { server_url: format!("http://{addr}"), client: reqwest::Client::new(), store, email, config }
    }

    pub fn authed(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.server_url, path))
            .header("Authorization", format!("Bearer {API_SECRET}"))
    }
}

pub fn valid_payload() -> Value {
    json!({
        "sender_name": "Maria Silva",
        "sender_email": "maria.silva@example.com",
        "content": "m".repeat(600),
    })
}
