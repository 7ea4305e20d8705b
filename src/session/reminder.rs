//! Per-user deadline timers
//!
//! Every armed reminder is a spawned task racing its deadline against a
//! cancellation token. A shared state word moves `Armed -> Fired` or
//! `Armed -> Cancelled` exactly once, so a reminder whose `cancel()` won
//! can never run its callback.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::session::UserId;

const ARMED: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Lifecycle of a single armed reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    Armed,
    Fired,
    Cancelled,
}

/// Handle to an armed reminder
///
/// Dropping the handle does not cancel the timer; call [`cancel`](Self::cancel).
#[derive(Debug)]
pub struct ReminderHandle {
    generation: u64,
    state: Arc<AtomicU8>,
    token: CancellationToken,
}

impl ReminderHandle {
    /// Monotonic arm counter, unique across all users
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> ReminderState {
        match self.state.load(Ordering::SeqCst) {
            ARMED => ReminderState::Armed,
            FIRED => ReminderState::Fired,
            _ => ReminderState::Cancelled,
        }
    }

    /// Stop the reminder if it has not fired yet. Never blocks, and is a
    /// no-op on a reminder that already fired or was cancelled.
    pub fn cancel(&self) -> bool {
        let cancelled = self
            .state
            .compare_exchange(ARMED, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        self.token.cancel();
        cancelled
    }
}

/// Spawns and replaces per-user reminders on the tokio runtime
#[derive(Debug, Default)]
pub struct ReminderScheduler {
    generations: AtomicU64,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a reminder for `deadline`, cancelling `previous` first.
    ///
    /// `on_fire` receives the new reminder's generation and runs at most
    /// once. Must be called from within a tokio runtime.
    pub fn arm<F, Fut>(
        &self,
        user_id: UserId,
        deadline: Instant,
        previous: Option<ReminderHandle>,
        on_fire: F,
    ) -> ReminderHandle
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if let Some(previous) = previous {
            if previous.cancel() {
                debug!(
                    "Cancelled reminder {} for user {}",
                    previous.generation, user_id
                );
            }
        }

        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let state = Arc::new(AtomicU8::new(ARMED));
        let token = CancellationToken::new();

        let task_state = Arc::clone(&state);
        let task_token = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = task_token.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => {
                    let won = task_state
                        .compare_exchange(ARMED, FIRED, Ordering::SeqCst, Ordering::SeqCst)
                        .is_ok();
                    if won {
                        debug!("Reminder {} fired for user {}", generation, user_id);
                        on_fire(generation).await;
                    }
                }
            }
        });

        debug!(
            "Armed reminder {} for user {} ({}s from now)",
            generation,
            user_id,
            deadline.saturating_duration_since(Instant::now()).as_secs()
        );

        ReminderHandle {
            generation,
            state,
            token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce(u64) -> futures::future::Ready<()> + Send) {
        let fired = Arc::new(AtomicUsize::new(0));
        let hits = Arc::clone(&fired);
        (fired, move |_: u64| {
            hits.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(())
        })
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reminder_fires_at_deadline() {
        let scheduler = ReminderScheduler::new();
        let (fired, on_fire) = counter();

        let handle = scheduler.arm(1, Instant::now() + Duration::from_secs(60), None, on_fire);
        assert_eq!(handle.state(), ReminderState::Armed);

        tokio::time::advance(Duration::from_secs(59)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(handle.state(), ReminderState::Fired);

        // Cancelling after the fact changes nothing
        assert!(!handle.cancel());
        assert_eq!(handle.state(), ReminderState::Fired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_reminder_never_fires() {
        let scheduler = ReminderScheduler::new();
        let (fired, on_fire) = counter();

        let handle = scheduler.arm(1, Instant::now() + Duration::from_secs(30), None, on_fire);
        assert!(handle.cancel());
        assert!(!handle.cancel());

        tokio::time::advance(Duration::from_secs(120)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(handle.state(), ReminderState::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_previous_reminder() {
        let scheduler = ReminderScheduler::new();
        let (first_fired, first) = counter();
        let (second_fired, second) = counter();

        let old = scheduler.arm(1, Instant::now() + Duration::from_secs(60), None, first);
        let old_generation = old.generation();
        let old_state = Arc::clone(&old.state);

        let new = scheduler.arm(1, Instant::now() + Duration::from_secs(90), Some(old), second);
        assert!(new.generation() > old_generation);
        assert_eq!(old_state.load(Ordering::SeqCst), CANCELLED);

        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(first_fired.load(Ordering::SeqCst), 0);
        assert_eq!(second_fired.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(first_fired.load(Ordering::SeqCst), 0);
        assert_eq!(second_fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timers_for_different_users_are_independent() {
        let scheduler = ReminderScheduler::new();
        let (a_fired, a) = counter();
        let (b_fired, b) = counter();

        let _a = scheduler.arm(1, Instant::now() + Duration::from_secs(10), None, a);
        let b = scheduler.arm(2, Instant::now() + Duration::from_secs(20), None, b);
        b.cancel();

        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(a_fired.load(Ordering::SeqCst), 1);
        assert_eq!(b_fired.load(Ordering::SeqCst), 0);
    }
}
