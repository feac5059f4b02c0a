//! When steps for job lifecycle BDD scenarios.

use std::time::Duration;

use super::world::{JobLifecycleWorld, run_async};
use imagine_relay::job::{
    domain::{CompletionEvent, ImageAttachment},
    services::{DEFAULT_GENERATION_AUTHOR_ID, SubmitJobRequest},
};
use rstest_bdd_macros::when;

fn record_submission(world: &mut JobLifecycleWorld, request: SubmitJobRequest) -> Result<(), eyre::Report> {
    let service = world.service()?;
    let result = run_async(service.submit(request));
    if let Ok(ref submitted) = result {
        world.last_job_id = Some(submitted.job_id);
    }
    world.last_submission = Some(result);
    Ok(())
}

fn echoed_prompt(world: &JobLifecycleWorld) -> Result<String, eyre::Report> {
    let job_id = world.job_id()?;
    let posted = world
        .transport
        .posted()
        .into_iter()
        .find(|command| command.tagged_text.ends_with(&job_id.to_string()))
        .ok_or_else(|| eyre::eyre!("no prompt posted for {job_id}"))?;
    Ok(posted
        .tagged_text
        .trim_start_matches("/imagine prompt:")
        .to_owned())
}

fn generator_message(world: &JobLifecycleWorld, text: String, url: &str) -> CompletionEvent {
    CompletionEvent::new(DEFAULT_GENERATION_AUTHOR_ID, world.channel_id, text).with_attachment(
        ImageAttachment::new(url, Some("image/png".to_owned())),
    )
}

#[when(r#"a caller submits the prompt "{prompt}" with webhook "{webhook}""#)]
fn submit_prompt(
    world: &mut JobLifecycleWorld,
    prompt: String,
    webhook: String,
) -> Result<(), eyre::Report> {
    record_submission(
        world,
        SubmitJobRequest::new(prompt).with_callback_target(webhook),
    )
}

#[when("a caller submits a blank prompt")]
fn submit_blank_prompt(world: &mut JobLifecycleWorld) -> Result<(), eyre::Report> {
    record_submission(world, SubmitJobRequest::new("   "))
}

#[when(r#"the generator posts the final image "{url}" for the job"#)]
fn generator_posts_final_image(world: &mut JobLifecycleWorld, url: String) -> Result<(), eyre::Report> {
    let echoed = echoed_prompt(world)?;
    let event = generator_message(world, format!("**{echoed}** - <@1> (fast)"), &url);
    run_async(world.service()?.on_completion_event(&event));
    Ok(())
}

#[when("the generator posts a progress update at {percent:u32} percent for the job")]
fn generator_posts_progress(world: &mut JobLifecycleWorld, percent: u32) -> Result<(), eyre::Report> {
    let echoed = echoed_prompt(world)?;
    let event = generator_message(
        world,
        format!("**{echoed}** - <@1> ({percent}%) (fast)"),
        "https://cdn.example/preview.png",
    );
    run_async(world.service()?.on_completion_event(&event));
    Ok(())
}

#[when("{minutes:u64} minutes pass before the sweep runs")]
fn minutes_pass_then_sweep(world: &mut JobLifecycleWorld, minutes: u64) -> Result<(), eyre::Report> {
    world.clock.advance(Duration::from_secs(minutes * 60));
    run_async(world.service()?.run_sweep_now());
    Ok(())
}
