use crate::adapters::store::{RestClient, StoreError};
use crate::domain::message::Message;
use reqwest::Method;
use serde_json::Value;
use uuid::Uuid;

/// Message records kept in the data store table.
///
/// Records are handed back as the store returned them; the repository does not
/// reshape or filter them.
#[derive(Clone, Debug)]
pub struct MessageRepository {
    client: RestClient,
    table: String,
}

impl MessageRepository {
    #[must_use]
    pub const fn new(client: RestClient, table: String) -> Self {
        Self { client, table }
    }

    /// Inserts a message and returns the stored representation, if the store sent one back.
    ///
    /// # Errors
    /// Returns `StoreError` if the store rejects the insert or cannot be reached.
    #[tracing::instrument(level = "debug", skip(self, message), fields(message_id = %message.id))]
    pub(crate) async fn create(&self, message: &Message) -> Result<Option<Value>, StoreError> {
        let body = serde_json::to_value(message)?;
        let result = self.client.request(Method::POST, &self.table, Some(&body)).await?;

        Ok(first_record(result))
    }

    /// Fetches every stored message, unfiltered and unpaginated.
    ///
    /// # Errors
    /// Returns `StoreError` if the store rejects the query or cannot be reached.
    #[tracing::instrument(level = "debug", skip(self))]
    pub(crate) async fn list(&self) -> Result<Value, StoreError> {
        let result = self.client.request(Method::GET, &self.table, None).await?;

        Ok(if result.is_null() { Value::Array(Vec::new()) } else { result })
    }

    /// Looks up a single message by id using an equality filter.
    ///
    /// # Errors
    /// Returns `StoreError` if the store rejects the query or cannot be reached.
    #[tracing::instrument(level = "debug", skip(self))]
    pub(crate) async fn find_by_id(&self, id: Uuid) -> Result<Option<Value>, StoreError> {
        let path = format!("{}?id=eq.{id}", self.table);
        let result = self.client.request(Method::GET, &path, None).await?;

        Ok(first_record(result))
    }
}

fn first_record(result: Value) -> Option<Value> {
    match result {
        Value::Array(records) => records.into_iter().next(),
        Value::Null => None,
        Value::Object(_) => Some(result),
        _ => None,
    }
}
