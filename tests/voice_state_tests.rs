// Integration tests for voice presence handling
//
// A session is interrupted only when its owner goes from some voice
// channel to none. Moving between channels keeps the session running.

mod common;

use anyhow::Result;
use common::{config, fixture, fixture_with, member, minutes, CHANNEL};
use study_mate::{EndReason, LogStore, Notification, StudyError, VoiceStateUpdate};

fn voice(user_id: u64, before: Option<u64>, after: Option<u64>) -> VoiceStateUpdate {
    VoiceStateUpdate {
        member: member(user_id),
        before,
        after,
    }
}

#[tokio::test(start_paused = true)]
async fn test_start_requires_voice_when_configured() -> Result<()> {
    let fx = fixture_with(config(true));

    let err = fx.hall.start(member(1), 25, None, CHANNEL, None).unwrap_err();
    assert_eq!(err, StudyError::NotInVoice(1));

    fx.hall.handle_voice_state(voice(1, None, Some(100))).await;
    fx.hall.start(member(1), 25, None, CHANNEL, None)?;
    assert!(fx.hall.is_active(1));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_reported_voice_channel_satisfies_requirement() -> Result<()> {
    let mut fx = fixture_with(config(true));

    // No voice event has been seen for this user yet
    let started = fx.hall.start(member(1), 25, None, CHANNEL, Some(100))?;
    assert_eq!(started.session.planned_minutes, 25);
    assert!(fx.hall.is_active(1));

    tokio::time::advance(minutes(3)).await;
    let done = fx
        .hall
        .handle_voice_state(voice(1, Some(100), None))
        .await
        .expect("session interrupted");
    assert_eq!(done.reason, EndReason::LeftVoice);
    assert_eq!(done.record.minutes, 3);

    let (_, notification) = fx.notifications.recv().await.expect("announcement");
    assert!(matches!(notification, Notification::LeftVoice(_)));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_leaving_voice_interrupts_session() -> Result<()> {
    let mut fx = fixture_with(config(true));
    fx.hall.handle_voice_state(voice(1, None, Some(100))).await;
    fx.hall.start(member(1), 25, Some("math".into()), CHANNEL, None)?;

    tokio::time::advance(minutes(7)).await;
    let done = fx
        .hall
        .handle_voice_state(voice(1, Some(100), None))
        .await
        .expect("session interrupted");

    assert_eq!(done.reason, EndReason::LeftVoice);
    assert_eq!(done.record.minutes, 7);
    assert_eq!(fx.log.records()?, vec![done.record.clone()]);

    let (target, notification) = fx.notifications.recv().await.expect("announcement");
    assert_eq!(target, CHANNEL);
    assert!(matches!(notification, Notification::LeftVoice(_)));
    assert!(notification.text().contains("left voice"));

    // The interrupted session's reminder never fires
    tokio::time::advance(minutes(30)).await;
    common::settle().await;
    assert_eq!(fx.log.records()?.len(), 1);
    assert!(fx.notifications.try_recv().is_err());

    // Presence is gone too
    assert_eq!(
        fx.hall.start(member(1), 25, None, CHANNEL, None).unwrap_err(),
        StudyError::NotInVoice(1)
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_switching_channels_keeps_session() -> Result<()> {
    let fx = fixture_with(config(true));
    fx.hall.handle_voice_state(voice(1, None, Some(100))).await;
    fx.hall.start(member(1), 25, None, CHANNEL, None)?;

    let result = fx.hall.handle_voice_state(voice(1, Some(100), Some(200))).await;

    assert!(result.is_none());
    assert!(fx.hall.is_active(1));
    assert!(fx.log.records()?.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_events_without_prior_presence_do_not_interrupt() -> Result<()> {
    let fx = fixture();
    fx.hall.start(member(1), 25, None, CHANNEL, None)?;

    assert!(fx.hall.handle_voice_state(voice(1, None, None)).await.is_none());
    assert!(fx.hall.handle_voice_state(voice(1, None, Some(100))).await.is_none());
    assert!(fx.hall.is_active(1));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_leave_without_session_is_ignored() -> Result<()> {
    let fx = fixture();

    assert!(fx.hall.handle_voice_state(voice(2, Some(100), None)).await.is_none());
    assert!(fx.log.records()?.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_leave_after_finish_logs_once() -> Result<()> {
    let fx = fixture();
    fx.hall.start(member(1), 25, None, CHANNEL, None)?;

    fx.hall.finish(1).await?;
    assert!(fx.hall.handle_voice_state(voice(1, Some(100), None)).await.is_none());

    assert_eq!(fx.log.records()?.len(), 1);
    Ok(())
}
