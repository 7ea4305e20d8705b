use std::collections::HashMap;
use std::time::Duration;

use super::session::{Member, NotifyTarget, Session, UserId};
use crate::error::StudyError;

/// Registry of active sessions, at most one per user
///
/// The store is plain data. The study hall owns it behind its state lock,
/// so every read-modify-write here is already serialized.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<UserId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session ending `duration` from now
    pub fn create(
        &mut self,
        member: Member,
        project: Option<String>,
        notify_target: NotifyTarget,
        duration: Duration,
    ) -> Result<&mut Session, StudyError> {
        let user_id = member.id;
        if self.sessions.contains_key(&user_id) {
            return Err(StudyError::AlreadyActive(user_id));
        }

        let session = Session::new(member, project, notify_target, duration)
            .ok_or(StudyError::InvalidDuration((duration.as_secs() / 60) as i64))?;
        Ok(self.sessions.entry(user_id).or_insert(session))
    }

    pub fn get(&self, user_id: UserId) -> Option<&Session> {
        self.sessions.get(&user_id)
    }

    pub fn get_mut(&mut self, user_id: UserId) -> Option<&mut Session> {
        self.sessions.get_mut(&user_id)
    }

    /// Take the session out of the store. Only the first caller gets it,
    /// which makes this the gate every termination path goes through.
    pub fn remove(&mut self, user_id: UserId) -> Option<Session> {
        self.sessions.remove(&user_id)
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.sessions.contains_key(&user_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.sessions.values_mut()
    }
}
