use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::UserId;

/// One completed study session. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub user_id: UserId,
    pub username: String,
    pub project: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,

    /// Whole minutes studied, at least 1
    pub minutes: i64,
}
