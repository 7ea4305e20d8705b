pub mod client;
pub mod messages;

pub use client::{notify_subject, NatsClient, NatsNotifier, VOICE_STATE_SUBJECT};
pub use messages::{NotificationMessage, VoiceStateMessage};
