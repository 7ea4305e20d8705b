use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Study commands
        .route("/learning/start", post(handlers::start_learning))
        .route("/learning/extend", post(handlers::add_learning_time))
        .route("/learning/edit", post(handlers::edit_information))
        .route("/learning/finish", post(handlers::finish_learning))
        .route("/learning/status/:user_id", get(handlers::status))
        .route("/seatmap", get(handlers::seatmap))
        // Platform events
        .route("/voice/state", post(handlers::voice_state))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
