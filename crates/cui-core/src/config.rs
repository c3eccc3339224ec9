use crate::error::CuiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
/// Loaded from ~/.config/cui/config.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub condor: CondorConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// How jobs are described and which scheduler tools are driven.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CondorConfig {
    #[serde(default = "default_submit_tool")]
    pub submit_tool: String,
    #[serde(default = "default_query_tool")]
    pub query_tool: String,
    #[serde(default = "default_remove_tool")]
    pub remove_tool: String,
    #[serde(default = "default_attach_tool")]
    pub attach_tool: String,
    #[serde(default = "default_universe")]
    pub universe: String,
    /// Executable that holds the slot while the session is attached.
    #[serde(default = "default_idle_executable")]
    pub idle_executable: String,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    /// Job attribute that marks interactive placeholder jobs.
    #[serde(default = "default_marker_attribute")]
    pub marker_attribute: String,
    #[serde(default)]
    pub mount: MountConfig,
}

/// Shared filesystem whose revision constrains candidate machines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    #[serde(default = "default_mount_path")]
    pub path: PathBuf,
    #[serde(default = "default_mount_tool")]
    pub tool: String,
    /// Machine attribute advertising the mounted revision.
    #[serde(default = "default_mount_attribute")]
    pub attribute: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Give up waiting for the job to start after this many seconds.
    #[serde(default)]
    pub monitor_timeout_secs: Option<u64>,
    /// Parent directory for workspaces; the system temp dir when unset.
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,
}

impl Default for CondorConfig {
    fn default() -> Self {
        Self {
            submit_tool: default_submit_tool(),
            query_tool: default_query_tool(),
            remove_tool: default_remove_tool(),
            attach_tool: default_attach_tool(),
            universe: default_universe(),
            idle_executable: default_idle_executable(),
            max_lifetime_secs: default_max_lifetime(),
            marker_attribute: default_marker_attribute(),
            mount: MountConfig::default(),
        }
    }
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            path: default_mount_path(),
            tool: default_mount_tool(),
            attribute: default_mount_attribute(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            monitor_timeout_secs: None,
            workspace_root: None,
        }
    }
}

fn default_submit_tool() -> String {
    "condor_submit".to_string()
}

fn default_query_tool() -> String {
    "condor_q".to_string()
}

fn default_remove_tool() -> String {
    "condor_rm".to_string()
}

fn default_attach_tool() -> String {
    "condor_ssh_to_job".to_string()
}

fn default_universe() -> String {
    "vanilla".to_string()
}

fn default_idle_executable() -> String {
    "/bin/sleep".to_string()
}

fn default_max_lifetime() -> u64 {
    24 * 60 * 60
}

fn default_marker_attribute() -> String {
    "ClusterUI".to_string()
}

fn default_mount_path() -> PathBuf {
    PathBuf::from("/cvmfs/cms.cern.ch")
}

fn default_mount_tool() -> String {
    "attr".to_string()
}

fn default_mount_attribute() -> String {
    "CVMFS_cms_cern_ch_REVISION".to_string()
}

fn default_poll_interval_ms() -> u64 {
    200
}

impl Config {
    /// Load config from the default path (~/.config/cui/config.yaml).
    pub fn load_default() -> Result<Self, CuiError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, CuiError> {
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/etc"))
            .join("cui")
            .join("config.yaml")
    }
}

impl SessionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn monitor_timeout(&self) -> Option<Duration> {
        self.monitor_timeout_secs.map(Duration::from_secs)
    }

    pub fn workspace_root(&self) -> PathBuf {
        self.workspace_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}
