use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::reminder::ReminderScheduler;
use super::seats::{SeatAllocator, SeatMap};
use super::session::{
    billed_minutes, minutes, ChannelId, Member, NotifyTarget, Session, UserId, MAX_SESSION,
};
use super::stats::{CompletedSession, EndReason, ExtendOutcome, SessionSnapshot, StartOutcome};
use super::store::SessionStore;
use super::voice::{VoicePresence, VoiceStateUpdate};
use crate::config::StudyConfig;
use crate::display::seat_label;
use crate::error::StudyError;
use crate::log::{LogRecord, LogStore};
use crate::notify::{Notification, Notifier};

/// Session lifecycle coordinator
///
/// Owns the session registry, seat pool and voice presence behind one lock.
/// Every lifecycle step runs to completion under that lock without awaiting,
/// so operations on the same user never interleave. Termination goes through
/// [`SessionStore::remove`], which hands the session to exactly one caller no
/// matter whether finish, a voice leave or the reminder got there first.
///
/// Cloning is cheap and shares the same hall.
#[derive(Clone)]
pub struct StudyHall {
    inner: Arc<HallInner>,
}

struct HallInner {
    state: Mutex<HallState>,
    scheduler: ReminderScheduler,
    log: Arc<dyn LogStore>,
    notifier: Arc<dyn Notifier>,
    require_voice: bool,
}

struct HallState {
    sessions: SessionStore,
    seats: SeatAllocator,
    voice: VoicePresence,
}

impl HallState {
    fn seat_map(&self) -> SeatMap {
        self.seats.snapshot(|user_id| {
            let name = self
                .sessions
                .get(user_id)
                .map(|s| s.member.name.as_str())
                .unwrap_or("");
            seat_label(user_id, name)
        })
    }

    fn snapshot(&self, user_id: UserId) -> Result<SessionSnapshot, StudyError> {
        let session = self
            .sessions
            .get(user_id)
            .ok_or(StudyError::NoActiveSession(user_id))?;

        Ok(SessionSnapshot {
            member: session.member.clone(),
            project: session.project.clone(),
            seat: self.seats.seat_of(user_id),
            started_at: session.started_at,
            ends_at: session.ends_at(),
            planned_minutes: billed_minutes(session.planned()),
            remaining_minutes: (session.remaining().as_secs() / 60) as i64,
        })
    }
}

impl StudyHall {
    pub fn new(
        config: &StudyConfig,
        log: Arc<dyn LogStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let seats = SeatAllocator::new(config.rows, config.columns)?;
        info!(
            "Study hall ready: {} seats ({}x{}), voice required: {}",
            seats.capacity(),
            config.rows,
            config.columns,
            config.require_voice
        );

        Ok(Self {
            inner: Arc::new(HallInner {
                state: Mutex::new(HallState {
                    sessions: SessionStore::new(),
                    seats,
                    voice: VoicePresence::default(),
                }),
                scheduler: ReminderScheduler::new(),
                log,
                notifier,
                require_voice: config.require_voice,
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, HallState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a session of `duration` minutes, seat the user if a seat is free
    /// and arm the completion reminder.
    ///
    /// `voice_channel` is the channel the command layer currently sees the
    /// user in. When it is `None`, presence learned from voice events decides.
    pub fn start(
        &self,
        member: Member,
        duration: i64,
        project: Option<String>,
        notify_target: NotifyTarget,
        voice_channel: Option<ChannelId>,
    ) -> Result<StartOutcome, StudyError> {
        let user_id = member.id;
        let mut state = self.state();

        if voice_channel.is_some() {
            state.voice.mark_connected(user_id);
        }
        if self.inner.require_voice && !state.voice.is_connected(user_id) {
            return Err(StudyError::NotInVoice(user_id));
        }
        let span = session_span(duration)?;

        state
            .sessions
            .create(member, normalize_project(project), notify_target, span)?;

        match state.seats.assign(user_id) {
            Some(seat) => info!("User {} started {}m session in seat {}", user_id, duration, seat),
            None => warn!("User {} started {}m session, no seat free", user_id, duration),
        }

        self.arm(&mut state, user_id);

        Ok(StartOutcome {
            session: state.snapshot(user_id)?,
            seat_map: state.seat_map(),
        })
    }

    /// Push the deadline back by `extra` minutes
    pub fn extend(&self, user_id: UserId, extra: i64) -> Result<ExtendOutcome, StudyError> {
        let mut state = self.state();

        let session = state
            .sessions
            .get_mut(user_id)
            .ok_or(StudyError::NoActiveSession(user_id))?;
        let deadline = session
            .deadline
            .checked_add(session_span(extra)?)
            .filter(|deadline| deadline.saturating_duration_since(session.started) <= MAX_SESSION)
            .ok_or(StudyError::InvalidDuration(extra))?;
        session.deadline = deadline;

        info!("User {} extended session by {}m", user_id, extra);
        self.arm(&mut state, user_id);

        Ok(ExtendOutcome {
            session: state.snapshot(user_id)?,
            added_minutes: extra,
        })
    }

    /// Change the planned duration (measured from the original start) and/or
    /// the project label. An empty label clears it.
    pub fn edit(
        &self,
        user_id: UserId,
        duration: Option<i64>,
        project: Option<String>,
    ) -> Result<SessionSnapshot, StudyError> {
        let mut state = self.state();

        let session = state
            .sessions
            .get_mut(user_id)
            .ok_or(StudyError::NoActiveSession(user_id))?;

        if let Some(duration) = duration {
            session.deadline = session
                .started
                .checked_add(session_span(duration)?)
                .ok_or(StudyError::InvalidDuration(duration))?;
        }
        if project.is_some() {
            session.project = normalize_project(project);
        }

        info!(
            "User {} edited session: duration={:?}, project={:?}",
            user_id, duration, session.project
        );
        self.arm(&mut state, user_id);

        state.snapshot(user_id)
    }

    /// End the session at the user's request
    pub async fn finish(&self, user_id: UserId) -> Result<CompletedSession, StudyError> {
        self.finalize(user_id, EndReason::Finished, None)
            .await
            .ok_or(StudyError::NoActiveSession(user_id))
    }

    /// End the session because the user left voice, and announce it
    pub async fn interrupt(&self, user_id: UserId) -> Option<CompletedSession> {
        let done = self.finalize(user_id, EndReason::LeftVoice, None).await?;
        self.announce(done.notify_target, Notification::LeftVoice(done.clone()))
            .await;
        Some(done)
    }

    /// Track voice presence; a full departure interrupts an active session
    pub async fn handle_voice_state(&self, update: VoiceStateUpdate) -> Option<CompletedSession> {
        let active = {
            let mut state = self.state();
            state.voice.apply(&update);
            state.sessions.contains(update.member.id)
        };

        if active && update.is_leave() {
            info!("User {} left voice during a session", update.member.id);
            self.interrupt(update.member.id).await
        } else {
            None
        }
    }

    pub fn status(&self, user_id: UserId) -> Result<SessionSnapshot, StudyError> {
        self.state().snapshot(user_id)
    }

    pub fn seat_map(&self) -> SeatMap {
        self.state().seat_map()
    }

    pub fn is_active(&self, user_id: UserId) -> bool {
        self.state().sessions.contains(user_id)
    }

    pub fn active_sessions(&self) -> usize {
        self.state().sessions.len()
    }

    /// Cancel every armed reminder. Sessions are not logged.
    pub fn shutdown(&self) {
        let mut state = self.state();
        let mut cancelled = 0;
        for session in state.sessions.iter_mut() {
            if let Some(reminder) = session.reminder.take() {
                if reminder.cancel() {
                    cancelled += 1;
                }
            }
        }
        info!("Study hall shut down, {} reminders cancelled", cancelled);
    }

    /// (Re)arm the user's reminder against the session's current deadline
    fn arm(&self, state: &mut HallState, user_id: UserId) {
        let Some(session) = state.sessions.get_mut(user_id) else {
            return;
        };

        let hall: Weak<HallInner> = Arc::downgrade(&self.inner);
        let previous = session.reminder.take();
        let reminder =
            self.inner
                .scheduler
                .arm(user_id, session.deadline, previous, move |generation| async move {
                    if let Some(inner) = hall.upgrade() {
                        StudyHall { inner }.complete_on_time(user_id, generation).await;
                    }
                });
        session.reminder = Some(reminder);
    }

    async fn complete_on_time(&self, user_id: UserId, generation: u64) {
        let Some(done) = self
            .finalize(user_id, EndReason::TimeUp, Some(generation))
            .await
        else {
            return;
        };

        let target = done.notify_target;
        self.announce(target, Notification::TimeUp(done.clone())).await;
        if target != NotifyTarget::User(user_id) {
            self.announce(NotifyTarget::User(user_id), Notification::TimeUpDirect(done))
                .await;
        }
    }

    /// The single termination path. `generation` is set when the reminder
    /// fires; a reminder that has since been replaced is ignored.
    async fn finalize(
        &self,
        user_id: UserId,
        reason: EndReason,
        generation: Option<u64>,
    ) -> Option<CompletedSession> {
        let (session, seat, seat_map) = {
            let mut state = self.state();

            if let Some(generation) = generation {
                let current = state
                    .sessions
                    .get(user_id)
                    .and_then(Session::reminder_generation);
                if current != Some(generation) {
                    debug!(
                        "Ignoring stale reminder {} for user {}",
                        generation, user_id
                    );
                    return None;
                }
            }

            let session = state.sessions.remove(user_id)?;
            if let Some(reminder) = &session.reminder {
                reminder.cancel();
            }
            let seat = state.seats.release(user_id);
            (session, seat, state.seat_map())
        };

        let elapsed = session.elapsed();
        let record = LogRecord {
            user_id,
            username: session.member.name.clone(),
            project: session.project.clone(),
            start: session.started_at,
            end: session.wall_clock_after(elapsed),
            minutes: billed_minutes(elapsed),
        };

        let log = Arc::clone(&self.inner.log);
        let entry = record.clone();
        let persisted = match tokio::task::spawn_blocking(move || log.append(&entry)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!("Failed to save study log for user {}: {:#}", user_id, e);
                false
            }
            Err(e) => {
                error!("Study log task for user {} failed: {}", user_id, e);
                false
            }
        };

        info!(
            "Session {} for user {} ended ({:?}) after {}m",
            session.id, user_id, reason, record.minutes
        );

        Some(CompletedSession {
            record,
            reason,
            notify_target: session.notify_target,
            seat,
            seat_map,
            persisted,
        })
    }

    async fn announce(&self, target: NotifyTarget, notification: Notification) {
        let kind = notification.kind();
        if let Err(e) = self.inner.notifier.notify(target, notification).await {
            warn!("Failed to deliver {} notification to {:?}: {:#}", kind, target, e);
        }
    }
}

/// Validated length of a `count`-minute span
fn session_span(count: i64) -> Result<Duration, StudyError> {
    minutes(count)
        .filter(|span| !span.is_zero() && *span <= MAX_SESSION)
        .ok_or(StudyError::InvalidDuration(count))
}

fn normalize_project(project: Option<String>) -> Option<String> {
    project
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}
