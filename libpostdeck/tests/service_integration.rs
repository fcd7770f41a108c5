//! Integration tests for committing posts through sinks
//!
//! Covers the assembler and the session together with the mock sink:
//! - Successful saves and the completion event
//! - Failed saves that keep the composition
//! - The in-flight guard
//! - Caption reports and JSON output of the assembled post

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use libpostdeck::catalog::OptionValue;
use libpostdeck::composer::{Composer, ComposerAction, ScheduleField};
use libpostdeck::error::{PostdeckError, SinkError};
use libpostdeck::media_source::{MediaSource, MockMediaSource};
use libpostdeck::service::{CaptionReport, ComposerEvent, ComposerSession, PostAssembler};
use libpostdeck::sinks::mock::MockSink;
use libpostdeck::sinks::PostSink;
use libpostdeck::types::{Post, PostMode, PostStatus};

fn scheduled_composer() -> Result<Composer> {
    let mut composer = Composer::with_defaults();
    composer.add_master_media(MockMediaSource::seeded(9).random_items(2));
    composer.set_master_caption("Summer collection is live");
    composer.add_channel("instagram", Some("Post".to_string()))?;
    composer.add_channel("pinterest", Some("Pin".to_string()))?;
    composer.set_option_from_str("pinterest", "board", "Products")?;
    composer.set_schedule_field(
        "pinterest",
        ScheduleField::Date(NaiveDate::from_ymd_opt(2024, 7, 4)),
    )?;
    composer.set_schedule_field("pinterest", ScheduleField::Mode(PostMode::ReminderOnly))?;
    Ok(composer)
}

#[tokio::test]
async fn test_scheduled_commit_reaches_sink() -> Result<()> {
    let mut assembler = PostAssembler::new(scheduled_composer()?);
    let sink = MockSink::success();
    let mut events = assembler.subscribe();

    let post = assembler.commit(PostStatus::Scheduled, &sink).await?;

    assert_eq!(post.status, PostStatus::Scheduled);
    assert_eq!(post.master_media.len(), 2);
    let pinterest = post.channel("pinterest").unwrap();
    assert_eq!(pinterest.post_type.as_deref(), Some("Pin"));
    assert_eq!(
        pinterest.options.get("board"),
        Some(&OptionValue::Choice("Products".to_string()))
    );
    assert_eq!(pinterest.scheduling.mode, Some(PostMode::ReminderOnly));
    assert_eq!(
        pinterest.scheduling.date,
        NaiveDate::from_ymd_opt(2024, 7, 4)
    );
    assert_eq!(post.channel("instagram").unwrap().resolved_media.len(), 2);

    let submitted = sink.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0], (PostStatus::Scheduled, post.clone()));

    assert!(matches!(
        events.recv().await?,
        ComposerEvent::CommitStarted {
            status: PostStatus::Scheduled,
            ..
        }
    ));
    assert_eq!(
        events.recv().await?,
        ComposerEvent::CommitCompleted {
            post_id: post.id.clone(),
            status: PostStatus::Scheduled,
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_failed_commit_keeps_composition_for_retry() -> Result<()> {
    let mut assembler = PostAssembler::new(scheduled_composer()?);
    let failing = MockSink::failing(SinkError::Network("timed out".to_string()));

    let err = assembler
        .commit(PostStatus::Published, &failing)
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("timed out"));
    assert!(assembler.has_unsaved_changes());

    // retry against a working sink succeeds with the same content
    let sink = MockSink::success();
    let post = assembler.commit(PostStatus::Published, &sink).await?;
    assert_eq!(post.master_caption, "Summer collection is live");
    assert_eq!(post.channels.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_begin_finish_with_edits_in_between() -> Result<()> {
    let mut assembler = PostAssembler::new(scheduled_composer()?);
    let sink = MockSink::with_delay(Duration::from_millis(20));

    let pending = assembler.begin_commit(PostStatus::Draft)?;
    let submit = sink.submit(&pending.post, pending.status);

    assembler.composer_mut().remove_channel("pinterest");
    assert!(matches!(
        assembler.begin_commit(PostStatus::Draft),
        Err(PostdeckError::CommitInFlight)
    ));

    let outcome = submit.await;
    let post = assembler.finish_commit(pending, sink.name(), outcome)?;
    assert_eq!(post.channels.len(), 2);
    assert_eq!(assembler.composer().channels().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_session_round_trip() -> Result<()> {
    let session = ComposerSession::spawn(Composer::with_defaults());
    let mut events = session.subscribe();

    for action in [
        ComposerAction::SetMasterCaption("Hello".to_string()),
        ComposerAction::AddChannel {
            platform_id: "instagram".to_string(),
            post_type: Some("Reel".to_string()),
        },
        ComposerAction::AddChannel {
            platform_id: "tiktok".to_string(),
            post_type: None,
        },
        ComposerAction::EditChannelCaption {
            platform_id: "tiktok".to_string(),
            text: "Hello TikTok".to_string(),
        },
    ] {
        session.dispatch(action).await?;
    }

    let sink = Arc::new(MockSink::success());
    let post = session
        .commit(PostStatus::Draft, sink.clone() as Arc<dyn PostSink>)
        .await?;

    assert_eq!(post.channel("instagram").unwrap().resolved_caption, "Hello");
    assert_eq!(post.channel("tiktok").unwrap().resolved_caption, "Hello TikTok");
    assert_eq!(sink.call_count(), 1);

    let mut completed = None;
    while let Ok(event) = events.try_recv() {
        if let ComposerEvent::CommitCompleted { post_id, .. } = event {
            completed = Some(post_id);
        }
    }
    assert_eq!(completed, Some(post.id));
    Ok(())
}

#[tokio::test]
async fn test_session_validation_error_surfaces() -> Result<()> {
    let session = ComposerSession::spawn(Composer::with_defaults());
    let sink: Arc<dyn PostSink> = Arc::new(MockSink::success());

    let err = session.commit(PostStatus::Draft, sink).await.unwrap_err();
    assert!(matches!(err, PostdeckError::Validation(_)));
    assert_eq!(err.exit_code(), 3);
    Ok(())
}

#[test]
fn test_caption_report_for_assembled_channels() -> Result<()> {
    let mut composer = scheduled_composer()?;
    composer.edit_channel_caption("instagram", "x".repeat(300))?;

    let report = CaptionReport::for_composer(&composer);
    assert_eq!(report.soft_limit, 280);
    assert!(report.channel("instagram").unwrap().over_limit);
    assert!(!report.channel("pinterest").unwrap().over_limit);
    Ok(())
}

#[test]
fn test_assembled_post_serializes_to_json() -> Result<()> {
    let assembler = PostAssembler::new(scheduled_composer()?);
    let post = assembler.assemble(PostStatus::Scheduled);

    let json = serde_json::to_value(&post)?;
    assert_eq!(json["status"], "scheduled");
    assert_eq!(json["channels"][1]["platform_id"], "pinterest");
    assert_eq!(json["channels"][1]["scheduling"]["date"], "2024-07-04");

    let parsed: Post = serde_json::from_value(json)?;
    assert_eq!(parsed, post);
    Ok(())
}
