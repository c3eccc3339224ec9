//! End-to-end session flow.
//!
//! ```text
//! INIT -> DISCOVERING -> RUNNING                      (job id or `any` with a hit)
//! INIT -> BUILDING -> SUBMITTED -> RUNNING            (fresh job)
//! RUNNING -> CONNECTED -> CLEANUP -> DONE
//! ```
//!
//! Failures short-circuit to CLEANUP. Cleanup of a submitted job happens in
//! two steps: the workspace is dropped, then matching jobs are removed from
//! the queue on a best-effort basis.

use crate::config::SessionConfig;
use crate::discovery;
use crate::env::Environment;
use crate::error::CuiError;
use crate::event_log::{wait_for_execution, EventLogFollower};
use crate::job::{JobId, JobTarget};
use crate::scheduler::Scheduler;
use crate::workspace::Workspace;
use std::future::Future;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// What the user asked for.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub target: JobTarget,
    /// Command to run on the worker; the user's shell when empty.
    pub command: Vec<String>,
    /// Keep the workspace directory after the session.
    pub preserve: bool,
}

pub struct Controller<'a, S: Scheduler + ?Sized> {
    scheduler: &'a S,
    session: &'a SessionConfig,
    env: &'a Environment,
}

impl<'a, S: Scheduler + ?Sized> Controller<'a, S> {
    pub fn new(scheduler: &'a S, session: &'a SessionConfig, env: &'a Environment) -> Self {
        Self {
            scheduler,
            session,
            env,
        }
    }

    /// Run a session and return the process exit status.
    ///
    /// `interrupt` completing while a fresh job is being submitted or awaited
    /// aborts the wait; cleanup still runs.
    pub async fn run<I>(&self, request: &SessionRequest, interrupt: I) -> i32
    where
        I: Future<Output = ()>,
    {
        let existing = match &request.target {
            JobTarget::Existing(job) => Ok(Some(job.clone())),
            JobTarget::Any => discovery::discover(self.scheduler, &self.env.user).await,
            JobTarget::Submit => Ok(None),
        };

        match existing {
            Ok(Some(job)) => settle(self.connect(&job, &request.command).await),
            Ok(None) => self.run_submitted(request, interrupt).await,
            Err(e) => settle(Err(e)),
        }
    }

    async fn run_submitted<I>(&self, request: &SessionRequest, interrupt: I) -> i32
    where
        I: Future<Output = ()>,
    {
        let workspace = match Workspace::create(&self.session.workspace_root(), request.preserve)
        {
            Ok(workspace) => workspace,
            Err(e) => return settle(Err(e.into())),
        };

        let result = match self.start_job(&workspace, interrupt).await {
            Ok(job) => self.connect(&job, &request.command).await,
            Err(e) => Err(e),
        };
        let code = settle(result);

        let workdir = workspace.close();
        self.dequeue(&workdir).await;
        code
    }

    async fn start_job<I>(&self, workspace: &Workspace, interrupt: I) -> Result<JobId, CuiError>
    where
        I: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = interrupt => {
                warn!("Interrupted before the job started");
                Err(CuiError::Interrupted)
            }
            started = self.submit_and_wait(workspace) => started,
        }
    }

    async fn submit_and_wait(&self, workspace: &Workspace) -> Result<JobId, CuiError> {
        let description = self.scheduler.describe(workspace, self.env).await;
        let description_file = workspace.description_path();
        description.write_to(&description_file)?;
        debug!("Job description:\n{}", description.render());

        self.scheduler
            .submit(&description_file, workspace.path())
            .await?;
        info!(
            "Submitted {} to {}, waiting for it to start",
            description_file.display(),
            self.scheduler.name()
        );

        let mut follower = EventLogFollower::new(workspace.event_log_path());
        let wait = wait_for_execution(&mut follower, self.session.poll_interval());
        let job = match self.session.monitor_timeout() {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| CuiError::MonitorTimeout(limit))??,
            None => wait.await?,
        };
        Ok(job)
    }

    async fn connect(&self, job: &JobId, command: &[String]) -> Result<i32, CuiError> {
        let command = self.env.session_command(command);
        info!("Attaching to job {}", job);
        match self.scheduler.attach(job, &command).await {
            Ok(output) => Ok(output.exit_code),
            Err(e) => {
                warn!("Session on job {} failed: {}", job, e);
                Err(e)
            }
        }
    }

    /// Best effort: the job may already have finished or been removed.
    async fn dequeue(&self, workdir: &Path) {
        match self
            .scheduler
            .remove_jobs_in(&self.env.user, workdir)
            .await
        {
            Ok(()) => debug!("Removed queued jobs for {}", workdir.display()),
            Err(e) => debug!("Queue cleanup for {} skipped: {}", workdir.display(), e),
        }
    }
}

/// Map an outcome to an exit status, replaying a failing step's output.
fn settle(result: Result<i32, CuiError>) -> i32 {
    settle_to(result, &mut std::io::stdout(), &mut std::io::stderr())
}

fn settle_to<O, E>(result: Result<i32, CuiError>, stdout: &mut O, stderr: &mut E) -> i32
where
    O: Write,
    E: Write,
{
    match result {
        Ok(code) => code,
        Err(e) => {
            if let CuiError::Process(failure) = &e {
                let _ = stdout.write_all(failure.stdout.as_bytes());
                let _ = stdout.flush();
                let _ = stderr.write_all(failure.stderr.as_bytes());
                let _ = stderr.flush();
            }
            error!("{}", e);
            e.exit_code()
        }
    }
}
