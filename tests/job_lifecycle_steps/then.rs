//! Then steps for job lifecycle BDD scenarios.

use super::world::{JobLifecycleWorld, run_async};
use imagine_relay::job::{
    domain::{JobDomainError, JobStatus, ResultReference},
    ports::ChatTransportError,
    services::JobLifecycleError,
};
use rstest_bdd_macros::then;

#[then(r#"the job is "{status}""#)]
fn job_has_status(world: &JobLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = JobStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let job_id = world.job_id()?;
    let job = run_async(world.service()?.query(job_id))?
        .ok_or_else(|| eyre::eyre!("job {job_id} is not tracked"))?;

    eyre::ensure!(
        job.status() == expected,
        "expected status {}, found {}",
        expected.as_str(),
        job.status().as_str()
    );
    Ok(())
}

#[then(r#"the job result is "{url}""#)]
fn job_result_is(world: &JobLifecycleWorld, url: String) -> Result<(), eyre::Report> {
    let job_id = world.job_id()?;
    let job = run_async(world.service()?.query(job_id))?
        .ok_or_else(|| eyre::eyre!("job {job_id} is not tracked"))?;

    eyre::ensure!(
        job.result_reference().map(ResultReference::as_str) == Some(url.as_str()),
        "expected result {url}, found {:?}",
        job.result_reference()
    );
    Ok(())
}

#[then("the number of webhook notifications is {count:usize}")]
fn webhook_notification_count(world: &JobLifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    let attempts = world.notifier.attempts();
    eyre::ensure!(
        attempts.len() == count,
        "expected {count} webhook attempts, found {}",
        attempts.len()
    );
    Ok(())
}

#[then("the job is no longer tracked")]
fn job_is_no_longer_tracked(world: &JobLifecycleWorld) -> Result<(), eyre::Report> {
    let job_id = world.job_id()?;
    let job = run_async(world.service()?.query(job_id))?;
    eyre::ensure!(job.is_none(), "job {job_id} is still tracked");
    Ok(())
}

#[then("the submission is rejected as invalid")]
fn submission_rejected_as_invalid(world: &JobLifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_submission
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing submission result"))?;

    eyre::ensure!(
        matches!(
            result,
            Err(JobLifecycleError::Validation(JobDomainError::EmptyPrompt))
        ),
        "expected EmptyPrompt validation error, got {result:?}"
    );
    Ok(())
}

#[then("the submission fails because the channel is unavailable")]
fn submission_fails_channel_unavailable(world: &JobLifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_submission
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing submission result"))?;

    eyre::ensure!(
        matches!(
            result,
            Err(JobLifecycleError::TransportUnavailable(
                ChatTransportError::ChannelUnavailable(_)
            ))
        ),
        "expected TransportUnavailable error, got {result:?}"
    );
    Ok(())
}

#[then("no prompt was posted")]
fn no_prompt_was_posted(world: &JobLifecycleWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(
        world.transport.posted().is_empty(),
        "expected no posted prompts"
    );
    Ok(())
}

#[then("no job is tracked")]
fn no_job_is_tracked(world: &JobLifecycleWorld) -> Result<(), eyre::Report> {
    let tracked = run_async(world.service()?.tracked_jobs())?;
    eyre::ensure!(tracked == 0, "expected no tracked jobs, found {tracked}");
    Ok(())
}
