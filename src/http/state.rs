use crate::session::StudyHall;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub hall: StudyHall,
}

impl AppState {
    pub fn new(hall: StudyHall) -> Self {
        Self { hall }
    }
}
