use crate::env::Environment;
use crate::error::CuiError;
use crate::job::{JobDescription, JobId, RunningJob};
use crate::process::ProcessOutput;
use crate::workspace::Workspace;
use std::path::Path;

/// The batch scheduler's command-line surface, as driven by a session.
#[async_trait::async_trait]
pub trait Scheduler: Send + Sync {
    /// Scheduler name for log messages ("condor").
    fn name(&self) -> &str;

    /// Build the placeholder job description for a submission from `workspace`.
    /// Optional probes degrade to conservative defaults instead of failing.
    async fn describe(&self, workspace: &Workspace, env: &Environment) -> JobDescription;

    /// Submit the description file. The submission creates the workspace's event log.
    async fn submit(&self, description_file: &Path, workspace: &Path) -> Result<(), CuiError>;

    /// Running interactive jobs owned by `owner`, in scheduler output order.
    async fn running_jobs(&self, owner: &str) -> Result<Vec<RunningJob>, CuiError>;

    /// Remove `owner`'s jobs whose working directory is `workdir`.
    async fn remove_jobs_in(&self, owner: &str, workdir: &Path) -> Result<(), CuiError>;

    /// Attach the caller's terminal to `job`, running `command` there.
    async fn attach(&self, job: &JobId, command: &[String]) -> Result<ProcessOutput, CuiError>;
}
