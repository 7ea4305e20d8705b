pub mod config;
pub mod display;
pub mod error;
pub mod http;
pub mod log;
pub mod nats;
pub mod notify;
pub mod session;

pub use config::{Config, StudyConfig};
pub use error::StudyError;
pub use http::{create_router, AppState};
pub use log::{JsonLogStore, LogRecord, LogStore, MemoryLogStore};
pub use nats::{NatsClient, NatsNotifier};
pub use notify::{Notification, Notifier, TracingNotifier};
pub use session::{
    CompletedSession, EndReason, Member, NotifyTarget, Seat, SeatMap, SessionSnapshot,
    StudyHall, UserId, VoiceStateUpdate,
};
