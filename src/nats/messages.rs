use serde::{Deserialize, Serialize};

use crate::notify::Notification;
use crate::session::{ChannelId, Member, NotifyTarget, UserId, VoiceStateUpdate};

/// Announcement published to NATS for the chat adapter to deliver
#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub target: NotifyTarget,
    pub kind: String,
    pub user_id: UserId,
    pub minutes: i64,
    pub text: String,
    pub timestamp: String, // RFC3339 timestamp
}

impl NotificationMessage {
    pub fn new(target: NotifyTarget, notification: &Notification) -> Self {
        let record = &notification.completed().record;
        Self {
            target,
            kind: notification.kind().to_string(),
            user_id: record.user_id,
            minutes: record.minutes,
            text: notification.text(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Voice-state change forwarded by the chat adapter
#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceStateMessage {
    pub member_id: UserId,
    #[serde(default)]
    pub member_name: String,
    pub before_channel: Option<ChannelId>,
    pub after_channel: Option<ChannelId>,
}

impl From<VoiceStateMessage> for VoiceStateUpdate {
    fn from(msg: VoiceStateMessage) -> Self {
        VoiceStateUpdate {
            member: Member::new(msg.member_id, msg.member_name),
            before: msg.before_channel,
            after: msg.after_channel,
        }
    }
}
