pub mod message_service;
pub mod notification_service;
pub mod rate_limit_service;
