//! Delivery of study-hall announcements to the chat platform

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::display;
use crate::session::{CompletedSession, NotifyTarget};

/// Announcement produced when a session ends without a command reply
#[derive(Debug, Clone)]
pub enum Notification {
    /// Reminder fired; announced in the session's channel with the seat grid
    TimeUp(CompletedSession),
    /// Reminder fired; private heads-up to the user
    TimeUpDirect(CompletedSession),
    /// The user left voice and the session was closed
    LeftVoice(CompletedSession),
}

impl Notification {
    pub fn completed(&self) -> &CompletedSession {
        match self {
            Notification::TimeUp(done)
            | Notification::TimeUpDirect(done)
            | Notification::LeftVoice(done) => done,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notification::TimeUp(_) => "time_up",
            Notification::TimeUpDirect(_) => "time_up_direct",
            Notification::LeftVoice(_) => "left_voice",
        }
    }

    /// Human-readable message body
    pub fn text(&self) -> String {
        match self {
            Notification::TimeUp(done) => display::time_up_message(done),
            Notification::TimeUpDirect(done) => display::time_up_direct_message(done),
            Notification::LeftVoice(done) => display::left_voice_message(done),
        }
    }
}

/// Sink for announcements; the platform adapter implements this
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, target: NotifyTarget, notification: Notification) -> Result<()>;
}

/// Writes announcements to the tracing log
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, target: NotifyTarget, notification: Notification) -> Result<()> {
        info!(
            "Notify {:?} ({}): {}",
            target,
            notification.kind(),
            notification.text()
        );
        Ok(())
    }
}
