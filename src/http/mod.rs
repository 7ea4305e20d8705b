//! HTTP command surface for the chat adapter
//!
//! - POST /learning/start - Start a study session
//! - POST /learning/extend - Add minutes to the running session
//! - POST /learning/edit - Change duration or project
//! - POST /learning/finish - Finish and log the session
//! - GET /learning/status/:user_id - Remaining time
//! - GET /seatmap - Current seat grid
//! - POST /voice/state - Voice-state change events
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{CommandResponse, ErrorResponse, SeatMapResponse, VoiceStateResponse};
pub use routes::create_router;
pub use state::AppState;
