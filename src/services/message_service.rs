use crate::adapters::store::MessageRepository;
use crate::domain::message::NewMessage;
use crate::error::{AppError, Result};
use crate::services::notification_service::NotificationService;
use opentelemetry::{global, metrics::Counter};
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    created_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("mensageria-server");
        Self {
            created_total: meter
                .u64_counter("messages_created_total")
                .with_description("Total messages persisted in the data store")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MessageService {
    repo: MessageRepository,
    notifier: NotificationService,
    metrics: Metrics,
}

impl MessageService {
    #[must_use]
    pub fn new(repo: MessageRepository, notifier: NotificationService) -> Self {
        Self { repo, notifier, metrics: Metrics::new() }
    }

    /// Validates and persists a new message, then sends the email notification.
    ///
    /// The notification is best-effort: a persisted message is never rolled back.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if any field fails its constraint; the store is not contacted.
    /// Returns `AppError::Upstream` or `AppError::BadGateway` if the store insert fails.
    #[tracing::instrument(skip(self, draft))]
    pub async fn create_message(&self, draft: NewMessage) -> Result<Value> {
        let message = draft.into_message().map_err(AppError::Validation)?;

        let stored = self.repo.create(&message).await?;
        self.metrics.created_total.add(1, &[]);
        tracing::info!(message_id = %message.id, "Message stored");

        self.notifier.notify(&message).await;

        match stored {
            Some(record) => Ok(record),
            None => serde_json::to_value(&message).map_err(|e| {
                tracing::error!(error = %e, "Failed to serialize message");
                AppError::Internal
            }),
        }
    }

    /// Returns every stored message as the store reported them.
    ///
    /// # Errors
    /// Returns `AppError::Upstream` or `AppError::BadGateway` if the store query fails.
    pub async fn list_messages(&self) -> Result<Value> {
        Ok(self.repo.list().await?)
    }

    /// # Errors
    /// Returns `AppError::NotFound` if no message has this id.
    /// Returns `AppError::Upstream` or `AppError::BadGateway` if the store query fails.
    pub async fn get_message(&self, id: Uuid) -> Result<Value> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)
    }
}
