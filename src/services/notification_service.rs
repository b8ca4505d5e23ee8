use crate::adapters::email::{EmailProvider, OutgoingEmail};
use crate::config::EmailConfig;
use crate::domain::message::Message;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::fmt::Write as _;
use std::sync::Arc;

pub const NOTIFICATION_SUBJECT: &str = "Nova mensagem recebida";

#[derive(Clone, Debug)]
struct Metrics {
    notifications_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("mensageria-server");
        Self {
            notifications_total: meter
                .u64_counter("email_notifications_total")
                .with_description("Email notifications attempted, by outcome")
                .build(),
        }
    }
}

/// Sends the "new message" email. Failures never reach the caller.
#[derive(Clone, Debug)]
pub struct NotificationService {
    provider: Arc<dyn EmailProvider>,
    sender_name: String,
    sender_address: String,
    recipient: String,
    metrics: Metrics,
}

impl NotificationService {
    #[must_use]
    pub fn new(provider: Arc<dyn EmailProvider>, config: &EmailConfig) -> Self {
        Self {
            provider,
            sender_name: config.sender_name.clone(),
            sender_address: config.sender_address.clone(),
            recipient: config.recipient.clone(),
            metrics: Metrics::new(),
        }
    }

    /// Sends the notification for `message`, logging instead of returning any error.
    #[tracing::instrument(skip(self, message), fields(message_id = %message.id))]
    pub async fn notify(&self, message: &Message) {
        let email = OutgoingEmail {
            sender_name: self.sender_name.clone(),
            sender_address: self.sender_address.clone(),
            recipient: self.recipient.clone(),
            subject: NOTIFICATION_SUBJECT.to_string(),
            html_body: render_html(message),
        };

        let outcome = match self.provider.send(&email).await {
            Ok(()) => "sent",
            Err(e) => {
                tracing::error!(error = %e, "Failed to send email notification");
                "failed"
            }
        };

        self.metrics.notifications_total.add(1, &[KeyValue::new("outcome", outcome)]);
    }
}

fn render_html(message: &Message) -> String {
    let mut html = String::from("<h3>Nova mensagem recebida</h3>\n");
    let _ = writeln!(html, "<p><strong>Nome:</strong> {}</p>", escape_html(&message.sender_name));
    let _ = writeln!(html, "<p><strong>Email:</strong> {}</p>", escape_html(&message.sender_email));
    let _ = writeln!(html, "<p><strong>Mensagem:</strong> {}</p>", escape_html(&message.content));
    html
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
