#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::email::{BrevoEmailProvider, EmailProvider};
use crate::adapters::store::{MessageRepository, RestClient};
use crate::api::ServiceContainer;
use crate::config::Config;
use crate::services::message_service::MessageService;
use crate::services::notification_service::NotificationService;
use crate::services::rate_limit_service::RateLimitService;
use std::sync::Arc;
use tokio::sync::watch;

/// Wires the outbound clients and services from a loaded configuration.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    email_provider: Option<Arc<dyn EmailProvider>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, email_provider: None }
    }

    /// Overrides the email provider; defaults to Brevo built from `config.email`.
    #[must_use]
    pub fn with_email_provider(mut self, provider: Arc<dyn EmailProvider>) -> Self {
        self.email_provider = Some(provider);
        self
    }

    /// # Errors
    /// Returns an error if an outbound HTTP client cannot be constructed.
    pub fn build(self) -> anyhow::Result<ServiceContainer> {
        let email_provider: Arc<dyn EmailProvider> = match self.email_provider {
            Some(provider) => provider,
            None => Arc::new(BrevoEmailProvider::new(&self.config.email)?),
        };

        let rest_client = RestClient::new(&self.config.store)?;
        let repo = MessageRepository::new(rest_client, self.config.store.table.clone());
        let notifier = NotificationService::new(email_provider, &self.config.email);

        Ok(ServiceContainer {
            message_service: MessageService::new(repo, notifier),
            rate_limit_service: RateLimitService::new(&self.config.rate_limit, &self.config.server),
        })
    }
}

/// Flips `shutdown_tx` on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}
