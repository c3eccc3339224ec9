use crate::error::CuiError;
use crate::job::{JobId, RunningJob};
use crate::scheduler::Scheduler;
use tracing::{info, warn};

/// Pick the most recently started job. Jobs without a start time rank
/// lowest; ties keep the scheduler's output order.
pub fn select_job(candidates: &[RunningJob]) -> Option<&RunningJob> {
    candidates.iter().reduce(|best, candidate| {
        if candidate.started_at > best.started_at {
            candidate
        } else {
            best
        }
    })
}

/// Find one of `owner`'s running interactive jobs.
///
/// Finding nothing is an expected outcome and yields `Ok(None)`; only a
/// failing query is an error.
pub async fn discover<S>(scheduler: &S, owner: &str) -> Result<Option<JobId>, CuiError>
where
    S: Scheduler + ?Sized,
{
    let candidates = scheduler.running_jobs(owner).await?;
    match select_job(&candidates) {
        Some(job) => {
            info!(
                "Found running job {} for {} ({} candidate(s))",
                job.job_id,
                owner,
                candidates.len()
            );
            Ok(Some(job.job_id.clone()))
        }
        None => {
            warn!("No running interactive job found for {}", owner);
            Ok(None)
        }
    }
}
