//! End-to-end job lifecycle runs over the in-memory adapters.

use std::time::Duration;

use imagine_relay::job::{
    domain::{ChannelMessage, CompletionEvent, ImageAttachment, JobStatus},
    services::{
        CandidateRejection, CompletionOutcome, JobLifecycleError, LifecycleConfig,
        MatcherConfig, NotificationOutcome, SubmitJobRequest,
    },
};
use rstest::rstest;

use super::helpers::{
    CALLBACK, CHANNEL, GENERATOR, RELAY_ACCOUNT, Relay, epoch, final_render, relay,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn render_progress_then_final_image_completes_once(
    relay: Relay,
) -> Result<(), eyre::Report> {
    let job_id = relay.submit("a red bicycle").await?;
    let posted = relay.last_posted()?;
    let echoed = posted.trim_start_matches("/imagine prompt:");
    let preview = ImageAttachment::new(
        "https://cdn.example/preview.webp",
        Some("image/webp".to_owned()),
    );
    let progress = [
        format!("**{echoed}** - <@{RELAY_ACCOUNT}> (Waiting to start)"),
        format!("**{echoed}** - <@{RELAY_ACCOUNT}> (31%) (fast)"),
        format!("**{echoed}** - <@{RELAY_ACCOUNT}> (93%) (fast)"),
    ];

    for text in progress {
        let event = CompletionEvent::new(GENERATOR, CHANNEL, text).with_attachment(preview.clone());
        let outcome = relay.service.on_completion_event(&event).await;
        eyre::ensure!(
            outcome == CompletionOutcome::Ignored(CandidateRejection::InProgress),
            "progress update should be ignored, got {outcome:?}"
        );
    }
    relay.clock.advance(Duration::from_secs(80));
    let outcome = relay
        .service
        .on_completion_event(&final_render(&posted, "https://cdn.example/bike.png"))
        .await;

    assert_eq!(
        outcome,
        CompletionOutcome::Completed {
            job_id,
            notification: NotificationOutcome::Delivered,
        }
    );
    let attempts = relay.notifier.attempts();
    eyre::ensure!(attempts.len() == 1, "expected one webhook, got {}", attempts.len());
    let sent = attempts
        .first()
        .ok_or_else(|| eyre::eyre!("missing webhook"))?;
    assert_eq!(sent.target.as_str(), CALLBACK);
    assert_eq!(
        serde_json::to_value(&sent.notification)?,
        serde_json::json!({
            "jobId": job_id.to_string(),
            "prompt": "a red bicycle",
            "imageUrl": "https://cdn.example/bike.png",
            "status": "completed",
            "timestamp": "2026-01-01T00:01:20.000Z",
        })
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_job_remains_queryable_until_grace_ends(
    relay: Relay,
) -> Result<(), eyre::Report> {
    let job_id = relay.submit("a red bicycle").await?;
    let posted = relay.last_posted()?;
    relay
        .service
        .on_completion_event(&final_render(&posted, "https://cdn.example/bike.png"))
        .await;

    relay.clock.advance(Duration::from_secs(59 * 60));
    relay.service.run_sweep_now().await;
    let job = relay
        .service
        .query(job_id)
        .await?
        .ok_or_else(|| eyre::eyre!("job should still be tracked"))?;
    assert_eq!(job.status(), JobStatus::Completed);

    relay.clock.advance(Duration::from_secs(60));
    let report = relay.service.run_sweep_now().await;

    assert_eq!(report.expired, vec![job_id]);
    assert!(relay.service.query(job_id).await?.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn abandoned_job_is_swept_and_late_result_unmatched(
    relay: Relay,
) -> Result<(), eyre::Report> {
    let job_id = relay.submit("a red bicycle").await?;
    let posted = relay.last_posted()?;

    relay.clock.advance(Duration::from_secs(31 * 60));
    let report = relay.service.run_sweep_now().await;
    assert_eq!(report.stale, vec![job_id]);

    let outcome = relay
        .service
        .on_completion_event(&final_render(&posted, "https://cdn.example/late.png"))
        .await;

    assert_eq!(outcome, CompletionOutcome::Unmatched);
    assert!(relay.notifier.attempts().is_empty());
    assert_eq!(relay.service.tracked_jobs().await?, 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn interleaved_jobs_each_receive_their_own_image(relay: Relay) -> Result<(), eyre::Report> {
    let mut submitted = Vec::new();
    for prompt in ["a red bicycle", "a blue kite", "a green boat"] {
        let job_id = relay.submit(prompt).await?;
        submitted.push((job_id, relay.last_posted()?));
        relay.clock.advance(Duration::from_secs(2));
    }
    let history: Vec<ChannelMessage> = submitted
        .iter()
        .rev()
        .map(|(_, posted)| ChannelMessage::new(RELAY_ACCOUNT, posted.clone()))
        .collect();

    for (index, (job_id, posted)) in submitted.iter().enumerate().rev() {
        let url = format!("https://cdn.example/{index}.png");
        let event = final_render(posted, &url).with_history(history.clone());
        let outcome = relay.service.on_completion_event(&event).await;
        eyre::ensure!(
            matches!(outcome, CompletionOutcome::Completed { job_id: id, .. } if id == *job_id),
            "result {url} attributed wrongly: {outcome:?}"
        );
    }

    for (index, (job_id, _)) in submitted.iter().enumerate() {
        let job = relay
            .service
            .query(*job_id)
            .await?
            .ok_or_else(|| eyre::eyre!("job {job_id} missing"))?;
        let expected = format!("https://cdn.example/{index}.png");
        assert_eq!(
            job.result_reference().map(|reference| reference.as_str()),
            Some(expected.as_str())
        );
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unreachable_channel_leaves_no_job(relay: Relay) -> Result<(), eyre::Report> {
    relay.transport.set_unavailable(true);

    let result = relay
        .service
        .submit(SubmitJobRequest::new("a red bicycle").with_callback_target(CALLBACK))
        .await;

    assert!(matches!(
        result,
        Err(JobLifecycleError::TransportUnavailable(_))
    ));
    assert_eq!(relay.service.tracked_jobs().await?, 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn custom_generator_identity_is_honoured() -> Result<(), eyre::Report> {
    let other_generator = 4_200_000_000_000_000_000;
    let relay = Relay::with_config(
        LifecycleConfig::new(CHANNEL).with_matcher(MatcherConfig::new(other_generator)),
    );
    let job_id = relay.submit("a red bicycle").await?;
    let posted = relay.last_posted()?;

    let from_default = relay
        .service
        .on_completion_event(&final_render(&posted, "https://cdn.example/a.png"))
        .await;
    let mut from_custom = final_render(&posted, "https://cdn.example/b.png");
    from_custom.author_id = other_generator;
    let completed = relay.service.on_completion_event(&from_custom).await;

    assert_eq!(
        from_default,
        CompletionOutcome::Ignored(CandidateRejection::ForeignAuthor)
    );
    assert!(matches!(completed, CompletionOutcome::Completed { job_id: id, .. } if id == job_id));
    let job = relay
        .service
        .query(job_id)
        .await?
        .ok_or_else(|| eyre::eyre!("job missing"))?;
    assert_eq!(job.completed_at(), Some(epoch()));
    Ok(())
}
