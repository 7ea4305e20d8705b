use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use super::reminder::ReminderHandle;

/// Platform user identifier
pub type UserId = u64;

/// Platform channel identifier
pub type ChannelId = u64;

/// A platform user as seen by the study hall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: UserId,
    /// Display name, used for log records and seat labels
    pub name: String,
}

impl Member {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Platform mention markup for announcements
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// Where completion and interruption announcements are delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NotifyTarget {
    /// A text channel the session was started from
    Channel(ChannelId),
    /// Direct message to a user
    User(UserId),
}

/// An active study session
///
/// `started` and `deadline` live on the tokio clock so that timers and
/// elapsed-time accounting agree; `started_at` is the wall-clock anchor
/// used for log records.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub member: Member,
    pub project: Option<String>,
    pub notify_target: NotifyTarget,
    pub started_at: DateTime<Utc>,
    pub started: Instant,
    pub deadline: Instant,
    pub(crate) reminder: Option<ReminderHandle>,
}

impl Session {
    pub(crate) fn new(
        member: Member,
        project: Option<String>,
        notify_target: NotifyTarget,
        duration: Duration,
    ) -> Option<Self> {
        let started = Instant::now();
        Some(Self {
            id: Uuid::new_v4(),
            member,
            project,
            notify_target,
            started_at: Utc::now(),
            started,
            deadline: started.checked_add(duration)?,
            reminder: None,
        })
    }

    /// Planned length from start to the current deadline
    pub fn planned(&self) -> Duration {
        self.deadline.saturating_duration_since(self.started)
    }

    /// Time until the deadline, zero once it has passed
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.started)
    }

    /// Wall-clock time the session is scheduled to end
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.wall_clock_after(self.planned())
    }

    /// Wall-clock time `offset` after the start, clamped to the representable range
    pub fn wall_clock_after(&self, offset: Duration) -> DateTime<Utc> {
        chrono::Duration::from_std(offset)
            .ok()
            .and_then(|offset| self.started_at.checked_add_signed(offset))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Generation of the currently armed reminder, if any
    pub(crate) fn reminder_generation(&self) -> Option<u64> {
        self.reminder.as_ref().map(ReminderHandle::generation)
    }
}

/// Whole minutes, rounded down, never less than one
pub fn billed_minutes(elapsed: Duration) -> i64 {
    ((elapsed.as_secs() / 60) as i64).max(1)
}

/// Longest planned session, one year
pub const MAX_SESSION_MINUTES: i64 = 365 * 24 * 60;

pub(crate) const MAX_SESSION: Duration = Duration::from_secs(MAX_SESSION_MINUTES as u64 * 60);

/// `count` minutes, or `None` for negative or overflowing counts
pub(crate) fn minutes(count: i64) -> Option<Duration> {
    let secs = u64::try_from(count).ok()?.checked_mul(60)?;
    Some(Duration::from_secs(secs))
}
