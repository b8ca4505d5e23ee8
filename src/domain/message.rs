use email_address::{EmailAddress, Options};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_SENDER_NAME_CHARS: usize = 10;
pub const MIN_CONTENT_CHARS: usize = 600;

/// A stored contact message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_name: String,
    pub sender_email: String,
    pub content: String,
}

/// Submission that has not been validated yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub sender_name: String,
    pub sender_email: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

/// A bare `local@domain.tld` address: no display name, no `[ip]` literal, TLD required.
fn strict_address() -> Options {
    Options::default().without_display_text().without_domain_literal().with_required_tld()
}

impl NewMessage {
    /// Checks every constraint and reports all failing fields, in field order.
    ///
    /// # Errors
    /// Returns the list of violations when any constraint fails.
    pub fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();

        if self.sender_name.chars().count() < MIN_SENDER_NAME_CHARS {
            violations.push(FieldViolation::new(
                "sender_name",
                format!("must be at least {MIN_SENDER_NAME_CHARS} characters long"),
            ));
        }

        if EmailAddress::parse_with_options(&self.sender_email, strict_address()).is_err() {
            violations.push(FieldViolation::new("sender_email", "must be a valid email address"));
        }

        if self.content.chars().count() < MIN_CONTENT_CHARS {
            violations.push(FieldViolation::new(
                "content",
                format!("must be at least {MIN_CONTENT_CHARS} characters long"),
            ));
        }

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Validates the submission and assigns it a fresh id.
    ///
    /// # Errors
    /// Returns the list of violations when any constraint fails.
    pub fn into_message(self) -> Result<Message, Vec<FieldViolation>> {
        self.validate()?;

        Ok(Message {
            id: Uuid::new_v4(),
            sender_name: self.sender_name,
            sender_email: self.sender_email,
            content: self.content,
        })
    }
}
