use thiserror::Error;

use crate::session::UserId;

/// Errors surfaced to the invoking user by study commands.
///
/// None of these are fatal: the command boundary turns them into a
/// user-visible message and the process keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudyError {
    /// Durations and extensions must be a positive number of minutes, and a
    /// session may not be planned longer than `MAX_SESSION_MINUTES`
    #[error("duration must be a positive number of minutes within the session limit (got {0})")]
    InvalidDuration(i64),

    #[error("user {0} is already studying; extend or finish the current session instead")]
    AlreadyActive(UserId),

    #[error("user {0} has no active study session")]
    NoActiveSession(UserId),

    /// Starting requires presence in a voice channel when the hall is configured so
    #[error("user {0} must join a voice channel before starting a session")]
    NotInVoice(UserId),
}
