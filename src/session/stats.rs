use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::seats::{Seat, SeatMap};
use super::session::{Member, NotifyTarget};
use crate::log::LogRecord;

/// Point-in-time view of an active session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub member: Member,
    pub project: Option<String>,
    pub seat: Option<Seat>,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,

    /// Planned length from start to the current deadline
    pub planned_minutes: i64,

    /// Whole minutes left before the reminder fires
    pub remaining_minutes: i64,
}

/// Result of starting a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartOutcome {
    pub session: SessionSnapshot,
    pub seat_map: SeatMap,
}

/// Result of extending a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendOutcome {
    pub session: SessionSnapshot,
    pub added_minutes: i64,
}

/// How a session came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The user finished it
    Finished,
    /// The user left voice
    LeftVoice,
    /// The reminder fired at the deadline
    TimeUp,
}

/// A finalized session and the record written for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedSession {
    pub record: LogRecord,
    pub reason: EndReason,
    pub notify_target: NotifyTarget,

    /// Seat released by this session
    pub seat: Option<Seat>,

    /// Occupancy after the seat was released
    pub seat_map: SeatMap,

    /// False when the log write failed
    pub persisted: bool,
}
