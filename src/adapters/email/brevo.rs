use crate::adapters::email::{EmailError, EmailProvider, OutgoingEmail};
use crate::config::EmailConfig;
use async_trait::async_trait;
use reqwest::header;
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct Contact<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendSmtpEmail<'a> {
    sender: Contact<'a>,
    to: [Contact<'a>; 1],
    subject: &'a str,
    html_content: &'a str,
}

impl<'a> From<&'a OutgoingEmail> for SendSmtpEmail<'a> {
    fn from(email: &'a OutgoingEmail) -> Self {
        Self {
            sender: Contact { name: Some(email.sender_name.as_str()), email: &email.sender_address },
            to: [Contact { name: None, email: &email.recipient }],
            subject: &email.subject,
            html_content: &email.html_body,
        }
    }
}

/// Brevo transactional email API (`/v3/smtp/email`).
#[derive(Debug, Clone)]
pub struct BrevoEmailProvider {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl BrevoEmailProvider {
    /// # Errors
    /// Returns `EmailError::Transport` if the HTTP client cannot be constructed.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;

        Ok(Self { http, api_url: config.api_url.clone(), api_key: config.api_key.clone() })
    }
}

#[async_trait]
impl EmailProvider for BrevoEmailProvider {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let resp = self
            .http
            .post(&self.api_url)
            .header(header::ACCEPT, "application/json")
            .header("api-key", &self.api_key)
            .json(&SendSmtpEmail::from(email))
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() >= 400 {
            let body = resp.text().await.unwrap_or_default();
            return Err(EmailError::Rejected { status: status.as_u16(), body });
        }

        tracing::debug!(status = %status.as_u16(), "Email accepted by provider");
        Ok(())
    }
}
