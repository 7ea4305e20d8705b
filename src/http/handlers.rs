use super::state::AppState;
use crate::display;
use crate::error::StudyError;
use crate::session::{
    ChannelId, CompletedSession, Member, NotifyTarget, SeatMap, SessionSnapshot, UserId,
    VoiceStateUpdate,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartLearningRequest {
    pub user_id: UserId,

    /// Display name used in the study log and on the seat grid
    #[serde(default)]
    pub user_name: String,

    /// Channel to announce completion in; defaults to a direct message
    pub channel_id: Option<ChannelId>,

    /// Planned duration in minutes
    pub duration: i64,

    pub project: Option<String>,

    /// Voice channel the user is in right now, as seen by the chat adapter
    pub voice_channel: Option<ChannelId>,
}

#[derive(Debug, Deserialize)]
pub struct AddLearningTimeRequest {
    pub user_id: UserId,

    /// Minutes to add
    pub time: i64,
}

#[derive(Debug, Deserialize)]
pub struct EditInformationRequest {
    pub user_id: UserId,
    pub duration: Option<i64>,
    pub project: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FinishLearningRequest {
    pub user_id: UserId,
}

/// Reply to a command, ready for the chat adapter to post
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub message: String,

    /// Show only to the invoking user
    pub ephemeral: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionSnapshot>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<CompletedSession>,
}

impl CommandResponse {
    fn public(message: String) -> Self {
        Self {
            message,
            ephemeral: false,
            session: None,
            completed: None,
        }
    }

    fn ephemeral(message: String) -> Self {
        Self {
            ephemeral: true,
            ..Self::public(message)
        }
    }

    fn with_session(mut self, session: SessionSnapshot) -> Self {
        self.session = Some(session);
        self
    }

    fn with_completed(mut self, completed: CompletedSession) -> Self {
        self.completed = Some(completed);
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeatMapResponse {
    pub message: String,
    pub seats: SeatMap,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceStateResponse {
    pub interrupted: bool,
}

fn status_for(err: &StudyError) -> StatusCode {
    match err {
        StudyError::InvalidDuration(_) => StatusCode::BAD_REQUEST,
        StudyError::AlreadyActive(_) => StatusCode::CONFLICT,
        StudyError::NoActiveSession(_) => StatusCode::NOT_FOUND,
        StudyError::NotInVoice(_) => StatusCode::FORBIDDEN,
    }
}

fn error_response(err: StudyError) -> Response {
    warn!("Command refused: {}", err);
    (
        status_for(&err),
        Json(ErrorResponse {
            error: err.to_string(),
            message: display::error_message(&err),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /learning/start
pub async fn start_learning(
    State(state): State<AppState>,
    Json(req): Json<StartLearningRequest>,
) -> Response {
    info!("start_learning from user {}", req.user_id);

    let target = match req.channel_id {
        Some(channel) => NotifyTarget::Channel(channel),
        None => NotifyTarget::User(req.user_id),
    };
    let member = Member::new(req.user_id, req.user_name);

    match state
        .hall
        .start(member, req.duration, req.project, target, req.voice_channel)
    {
        Ok(outcome) => {
            let reply = CommandResponse::public(display::start_message(&outcome))
                .with_session(outcome.session);
            (StatusCode::OK, Json(reply)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// POST /learning/extend
pub async fn add_learning_time(
    State(state): State<AppState>,
    Json(req): Json<AddLearningTimeRequest>,
) -> Response {
    info!("add_learning_time from user {}", req.user_id);

    match state.hall.extend(req.user_id, req.time) {
        Ok(outcome) => {
            let reply = CommandResponse::public(display::extend_message(&outcome))
                .with_session(outcome.session);
            (StatusCode::OK, Json(reply)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// POST /learning/edit
pub async fn edit_information(
    State(state): State<AppState>,
    Json(req): Json<EditInformationRequest>,
) -> Response {
    info!("edit_information from user {}", req.user_id);

    match state.hall.edit(req.user_id, req.duration, req.project) {
        Ok(session) => {
            let reply = CommandResponse::public(display::edit_message(&session))
                .with_session(session);
            (StatusCode::OK, Json(reply)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// POST /learning/finish
pub async fn finish_learning(
    State(state): State<AppState>,
    Json(req): Json<FinishLearningRequest>,
) -> Response {
    info!("finish_learning from user {}", req.user_id);

    match state.hall.finish(req.user_id).await {
        Ok(done) => {
            let reply = CommandResponse::public(display::finish_message(&done))
                .with_completed(done);
            (StatusCode::OK, Json(reply)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET /learning/status/:user_id
pub async fn status(State(state): State<AppState>, Path(user_id): Path<UserId>) -> Response {
    match state.hall.status(user_id) {
        Ok(session) => {
            let reply = CommandResponse::ephemeral(display::status_message(&session))
                .with_session(session);
            (StatusCode::OK, Json(reply)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET /seatmap
pub async fn seatmap(State(state): State<AppState>) -> impl IntoResponse {
    let seats = state.hall.seat_map();
    Json(SeatMapResponse {
        message: display::seat_map_message(&seats),
        seats,
    })
}

/// POST /voice/state
/// Voice-state change from the chat adapter
pub async fn voice_state(
    State(state): State<AppState>,
    Json(update): Json<VoiceStateUpdate>,
) -> impl IntoResponse {
    let interrupted = state.hall.handle_voice_state(update).await.is_some();
    Json(VoiceStateResponse { interrupted })
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
