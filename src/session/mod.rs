//! Study session coordination
//!
//! This module provides the `StudyHall` that manages:
//! - One timed session per user
//! - Seat assignment from a fixed pool
//! - Cancellable completion reminders
//! - Voice-leave interruption
//! - Writing exactly one log record per session

mod manager;
mod reminder;
mod seats;
mod session;
mod stats;
mod store;
mod voice;

pub use manager::StudyHall;
pub use reminder::{ReminderHandle, ReminderScheduler, ReminderState};
pub use seats::{Seat, SeatAllocator, SeatCell, SeatMap, MAX_SEATS};
pub use session::{
    billed_minutes, ChannelId, Member, NotifyTarget, Session, UserId, MAX_SESSION_MINUTES,
};
pub use stats::{CompletedSession, EndReason, ExtendOutcome, SessionSnapshot, StartOutcome};
pub use store::SessionStore;
pub use voice::{VoicePresence, VoiceStateUpdate};
