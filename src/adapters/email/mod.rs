pub mod brevo;

use async_trait::async_trait;
use thiserror::Error;

pub use brevo::BrevoEmailProvider;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email provider rejected the request with {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Email provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A single transactional email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub sender_name: String,
    pub sender_address: String,
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait EmailProvider: Send + Sync + std::fmt::Debug {
    /// Sends one email in a single attempt.
    ///
    /// # Errors
    /// Returns `EmailError::Rejected` if the provider answers with an error status.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}
