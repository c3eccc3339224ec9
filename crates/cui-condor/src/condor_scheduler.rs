use crate::classad;
use crate::description::{self, ProbeResults};
use crate::probe;
use cui_core::config::CondorConfig;
use cui_core::env::Environment;
use cui_core::error::CuiError;
use cui_core::job::{JobDescription, JobId, RunningJob};
use cui_core::process::{Invocation, ProcessOutput};
use cui_core::workspace::Workspace;
use cui_core::Scheduler;
use std::path::Path;
use tracing::{debug, info};

/// HTCondor scheduler: drives `condor_submit`, `condor_q`, `condor_rm` and
/// `condor_ssh_to_job` (names configurable).
pub struct CondorScheduler {
    config: CondorConfig,
}

impl CondorScheduler {
    pub fn new(config: CondorConfig) -> Self {
        Self { config }
    }

    fn query_invocation(&self, owner: &str) -> Invocation {
        Invocation::new(&self.config.query_tool)
            .arg("-constraint")
            .arg(classad::running_interactive(&self.config.marker_attribute, owner))
            .args(classad::RUNNING_JOB_FORMAT.iter().copied())
    }

    fn remove_invocation(&self, owner: &str, workdir: &Path) -> Invocation {
        Invocation::new(&self.config.remove_tool)
            .arg("-constraint")
            .arg(classad::owned_in(owner, workdir))
    }

    fn attach_invocation(&self, job: &JobId, command: &[String]) -> Invocation {
        Invocation::new(&self.config.attach_tool)
            .arg(job.as_str())
            .args(command.iter().cloned())
            .passthrough()
    }
}

#[async_trait::async_trait]
impl Scheduler for CondorScheduler {
    fn name(&self) -> &str {
        "condor"
    }

    async fn describe(&self, workspace: &Workspace, env: &Environment) -> JobDescription {
        let probes = ProbeResults {
            mount_revision: probe::mount_revision(&self.config.mount).await,
            credential: probe::credential(env).await,
        };
        debug!("Probe results: {:?}", probes);
        description::build(&self.config, workspace, &probes)
    }

    async fn submit(&self, description_file: &Path, workspace: &Path) -> Result<(), CuiError> {
        let output = Invocation::new(&self.config.submit_tool)
            .arg(description_file.display().to_string())
            .current_dir(workspace)
            .run()
            .await?;
        info!("{}", output.stdout.trim());
        Ok(())
    }

    async fn running_jobs(&self, owner: &str) -> Result<Vec<RunningJob>, CuiError> {
        let output = self.query_invocation(owner).run().await?;
        Ok(classad::parse_running_jobs(&output.stdout))
    }

    async fn remove_jobs_in(&self, owner: &str, workdir: &Path) -> Result<(), CuiError> {
        self.remove_invocation(owner, workdir).run().await?;
        Ok(())
    }

    async fn attach(&self, job: &JobId, command: &[String]) -> Result<ProcessOutput, CuiError> {
        self.attach_invocation(job, command).run().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_uses_constraint_and_format() {
        let scheduler = CondorScheduler::new(CondorConfig::default());
        let inv = scheduler.query_invocation("alice");

        assert_eq!(inv.program(), "condor_q");
        assert_eq!(inv.arguments()[0], "-constraint");
        assert_eq!(
            inv.arguments()[1],
            "ClusterUI =?= True && Owner == \"alice\" && JobStatus == 2"
        );
        assert_eq!(&inv.arguments()[2..5], &["-format", "%d.", "ClusterId"]);
    }

    #[test]
    fn remove_matches_workdir() {
        let scheduler = CondorScheduler::new(CondorConfig::default());
        let inv = scheduler.remove_invocation("alice", Path::new("/tmp/cui-x"));
        assert_eq!(inv.program(), "condor_rm");
        assert_eq!(
            inv.arguments(),
            &["-constraint", "Owner == \"alice\" && Iwd == \"/tmp/cui-x\""]
        );
    }

    #[test]
    fn attach_appends_command_after_id() {
        let scheduler = CondorScheduler::new(CondorConfig::default());
        let cmd = vec!["ls".to_string(), "-l".to_string()];
        let inv = scheduler.attach_invocation(&JobId::from_string("12.0".into()), &cmd);
        assert_eq!(inv.program(), "condor_ssh_to_job");
        assert_eq!(inv.arguments(), &["12.0", "ls", "-l"]);
    }

    #[tokio::test]
    async fn query_tool_output_is_parsed_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("fake_condor_q");
        std::fs::write(&tool, "#!/bin/sh\nprintf '21.0 1700000000\\n22.0 1700000500\\n'\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let scheduler = CondorScheduler::new(CondorConfig {
            query_tool: tool.display().to_string(),
            ..CondorConfig::default()
        });
        let jobs = scheduler.running_jobs("alice").await.unwrap();

        let ids: Vec<&str> = jobs.iter().map(|j| j.job_id.as_str()).collect();
        assert_eq!(ids, vec!["21.0", "22.0"]);
    }

    #[tokio::test]
    async fn failing_remove_reports_process_failure() {
        let scheduler = CondorScheduler::new(CondorConfig {
            remove_tool: "false".to_string(),
            ..CondorConfig::default()
        });
        let err = scheduler
            .remove_jobs_in("alice", Path::new("/tmp/cui-x"))
            .await
            .unwrap_err();
        assert!(matches!(err, CuiError::Process(ref f) if f.program == "false"));
    }
}
