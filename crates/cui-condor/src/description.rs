use cui_core::config::CondorConfig;
use cui_core::job::JobDescription;
use cui_core::workspace::Workspace;
use std::path::PathBuf;

/// What the optional probes found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResults {
    pub mount_revision: Option<u64>,
    pub credential: Option<PathBuf>,
}

/// Placeholder job that idles for at most `max_lifetime_secs` so a session
/// can attach to the slot it occupies.
pub fn build(config: &CondorConfig, workspace: &Workspace, probes: &ProbeResults) -> JobDescription {
    let mut desc = JobDescription::new();
    desc.set("universe", config.universe.as_str());
    desc.set("executable", config.idle_executable.as_str());
    desc.set("arguments", config.max_lifetime_secs);
    desc.set("transfer_executable", "False");
    desc.set("initialdir", workspace.path());
    desc.set("log", workspace.event_log_path().as_path());
    desc.set("output", "/dev/null");
    desc.set("error", "/dev/null");
    desc.set("notification", "Never");
    desc.set(format!("+{}", config.marker_attribute), "True");
    desc.set(
        "requirements",
        crate::probe::mount_requirement(&config.mount.attribute, probes.mount_revision),
    );
    if let Some(credential) = &probes.credential {
        desc.set("x509userproxy", credential.as_path());
    }
    desc
}
