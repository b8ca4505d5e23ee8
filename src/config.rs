use clap::{Args, Parser, ValueEnum};
use ipnetwork::IpNetwork;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub auth: AuthConfig,

    #[command(flatten)]
    pub rate_limit: RateLimitConfig,

    #[command(flatten)]
    pub store: StoreConfig,

    #[command(flatten)]
    pub email: EmailConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "MENSAGERIA_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Comma-separated list of CIDRs to trust for X-Forwarded-For IP extraction
    #[arg(
        long,
        env = "MENSAGERIA_TRUSTED_PROXIES",
        default_value = "10.0.0.0/8,172.16.0.0/12,192.168.0.0/16,127.0.0.1/32",
        value_delimiter = ','
    )]
    pub trusted_proxies: Vec<IpNetwork>,

    /// Seconds to wait for in-flight work after a shutdown signal
    #[arg(long, env = "MENSAGERIA_SHUTDOWN_TIMEOUT_SECS", default_value_t = 10)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct AuthConfig {
    /// Shared secret clients send as `Authorization: Bearer <secret>`
    #[arg(long, env = "API_SECRET", hide_env_values = true)]
    pub api_secret: String,
}

#[derive(Clone, Debug, Args)]
pub struct RateLimitConfig {
    /// Requests allowed per client IP within one window
    #[arg(
        long = "rate-limit-requests",
        env = "MENSAGERIA_RATE_LIMIT_REQUESTS",
        default_value_t = 15,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub requests: u32,

    /// Length of the rate limit window in seconds
    #[arg(
        long = "rate-limit-window-secs",
        env = "MENSAGERIA_RATE_LIMIT_WINDOW_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub window_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct StoreConfig {
    /// Base URL of the hosted data store (the REST API lives under /rest/v1)
    #[arg(long = "store-url", env = "SUPABASE_URL")]
    pub url: String,

    /// API key of the data store
    #[arg(long = "store-key", env = "SUPABASE_KEY", hide_env_values = true)]
    pub key: String,

    /// Table holding the messages
    #[arg(long = "store-table", env = "MENSAGERIA_STORE_TABLE", default_value = "messages")]
    pub table: String,

    /// Timeout for a single call to the data store
    #[arg(id = "store_timeout_secs", long = "store-timeout-secs", env = "MENSAGERIA_STORE_TIMEOUT_SECS", default_value_t = 5)]
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct EmailConfig {
    /// API key of the transactional email provider
    #[arg(long = "email-api-key", env = "BREVO_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Transactional send endpoint of the email provider
    #[arg(long = "email-api-url", env = "MENSAGERIA_EMAIL_API_URL", default_value = "https://api.brevo.com/v3/smtp/email")]
    pub api_url: String,

    /// Display name used as the notification sender
    #[arg(long = "email-sender-name", env = "MENSAGERIA_EMAIL_SENDER_NAME", default_value = "Mensageria API")]
    pub sender_name: String,

    /// Address used as the notification sender
    #[arg(long = "email-sender-address", env = "MENSAGERIA_EMAIL_SENDER_ADDRESS", default_value = "no-reply@seudominio.com")]
    pub sender_address: String,

    /// Address that receives every notification
    #[arg(
        long = "email-recipient",
        env = "MENSAGERIA_EMAIL_RECIPIENT",
        default_value = "stafproject125bpm@gmail.com"
    )]
    pub recipient: String,

    /// Timeout for a single call to the email provider
    #[arg(id = "email_timeout_secs", long = "email-timeout-secs", env = "MENSAGERIA_EMAIL_TIMEOUT_SECS", default_value_t = 5)]
    pub timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "MENSAGERIA_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; traces and metrics are only exported when set
    #[arg(long, env = "MENSAGERIA_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
