use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Exit status reported when a command could not be started at all.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// Exit status reported when the user interrupted the session.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Error, Debug)]
pub enum CuiError {
    #[error(transparent)]
    Process(#[from] ProcessFailure),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Job did not start executing within {0:?}")]
    MonitorTimeout(Duration),

    #[error("Interrupted")]
    Interrupted,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CuiError {
    /// Process exit status this failure maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            CuiError::Process(failure) => failure.exit_code,
            CuiError::Spawn { .. } => SPAWN_FAILURE_EXIT_CODE,
            CuiError::Interrupted => INTERRUPTED_EXIT_CODE,
            _ => 1,
        }
    }
}

/// An external command exited non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFailure {
    pub program: String,
    pub args: Vec<String>,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Command `{}` exited with status {}",
            crate::process::command_line(&self.program, &self.args),
            self.exit_code
        )
    }
}

impl std::error::Error for ProcessFailure {}
