use crate::domain::message::NewMessage;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub sender_name: String,
    pub sender_email: String,
    pub content: String,
}

impl From<CreateMessageRequest> for NewMessage {
    fn from(req: CreateMessageRequest) -> Self {
        Self { sender_name: req.sender_name, sender_email: req.sender_email, content: req.content }
    }
}
