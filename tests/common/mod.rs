// Shared fixtures for study hall integration tests

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use study_mate::{
    MemoryLogStore, Member, Notification, Notifier, NotifyTarget, StudyConfig, StudyHall,
};
use tokio::sync::mpsc;

pub const CHANNEL: NotifyTarget = NotifyTarget::Channel(500);

/// Forwards every announcement to a channel the test can await
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<(NotifyTarget, Notification)>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(NotifyTarget, Notification)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, target: NotifyTarget, notification: Notification) -> Result<()> {
        self.tx.send((target, notification)).ok();
        Ok(())
    }
}

pub struct Fixture {
    pub hall: StudyHall,
    pub log: Arc<MemoryLogStore>,
    pub notifications: mpsc::UnboundedReceiver<(NotifyTarget, Notification)>,
}

pub fn config(require_voice: bool) -> StudyConfig {
    StudyConfig {
        require_voice,
        ..StudyConfig::default()
    }
}

pub fn fixture_with(config: StudyConfig) -> Fixture {
    let log = Arc::new(MemoryLogStore::new());
    let (notifier, notifications) = ChannelNotifier::new();
    let hall = StudyHall::new(&config, log.clone(), Arc::new(notifier))
        .expect("valid seat layout");

    Fixture {
        hall,
        log,
        notifications,
    }
}

pub fn fixture() -> Fixture {
    fixture_with(config(false))
}

pub fn member(id: u64) -> Member {
    Member::new(id, format!("student{}", id))
}

pub fn minutes(count: u64) -> Duration {
    Duration::from_secs(count * 60)
}

/// Let spawned reminder tasks run
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
