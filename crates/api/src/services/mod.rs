pub mod notification_service;

pub use notification_service::{LogNotifier, MemoryNotifier, Notifier, WebhookNotifier};
