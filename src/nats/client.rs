use anyhow::{Context, Result};
use async_nats::Client;
use async_trait::async_trait;
use futures::stream::StreamExt;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::messages::{NotificationMessage, VoiceStateMessage};
use crate::notify::{Notification, Notifier};
use crate::session::{NotifyTarget, StudyHall, VoiceStateUpdate};

/// Subject the chat adapter publishes voice-state changes on
pub const VOICE_STATE_SUBJECT: &str = "study.voice.state";

/// Subject a notification for `target` is published on
pub fn notify_subject(target: NotifyTarget) -> String {
    match target {
        NotifyTarget::Channel(id) => format!("study.notify.channel.{}", id),
        NotifyTarget::User(id) => format!("study.notify.user.{}", id),
    }
}

pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Connect to NATS server
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client })
    }

    /// Publish an announcement for the chat adapter
    pub async fn publish_notification(
        &self,
        target: NotifyTarget,
        notification: &Notification,
    ) -> Result<()> {
        let subject = notify_subject(target);
        let message = NotificationMessage::new(target, notification);
        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish notification")?;

        info!("Published {} notification to {}", message.kind, subject);

        Ok(())
    }

    /// Subscribe to voice-state changes
    pub async fn subscribe_voice_states(&self) -> Result<async_nats::Subscriber> {
        info!("Subscribing to voice states on {}", VOICE_STATE_SUBJECT);

        let subscriber = self
            .client
            .subscribe(VOICE_STATE_SUBJECT)
            .await
            .context("Failed to subscribe to voice states")?;

        Ok(subscriber)
    }

    /// Feed voice-state changes into the hall until the subscription ends
    pub async fn spawn_voice_listener(&self, hall: StudyHall) -> Result<JoinHandle<()>> {
        let mut subscriber = self.subscribe_voice_states().await?;

        Ok(tokio::spawn(async move {
            info!("Voice state listener started");

            while let Some(msg) = subscriber.next().await {
                match serde_json::from_slice::<VoiceStateMessage>(&msg.payload) {
                    Ok(message) => {
                        let update: VoiceStateUpdate = message.into();
                        hall.handle_voice_state(update).await;
                    }
                    Err(e) => {
                        warn!("Failed to parse voice state message: {}", e);
                    }
                }
            }

            error!("Voice state subscription closed");
        }))
    }
}

/// Delivers hall announcements over NATS
pub struct NatsNotifier {
    client: NatsClient,
}

impl NatsNotifier {
    pub fn new(client: NatsClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &NatsClient {
        &self.client
    }
}

#[async_trait]
impl Notifier for NatsNotifier {
    async fn notify(&self, target: NotifyTarget, notification: Notification) -> Result<()> {
        self.client.publish_notification(target, &notification).await
    }
}
