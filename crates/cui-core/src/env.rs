use crate::error::CuiError;
use std::path::PathBuf;

/// Overrides the user name jobs are owned by.
pub const USER_OVERRIDE_VAR: &str = "CUI_USER";

/// Points at the security credential to attach to submitted jobs.
pub const CREDENTIAL_VAR: &str = "X509_USER_PROXY";

/// Shell used when a session is started without an explicit command.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Process environment inputs, read once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub user: String,
    pub shell: String,
    pub credential_override: Option<PathBuf>,
}

impl Environment {
    pub fn from_process_env() -> Result<Self, CuiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CuiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let user = non_empty(USER_OVERRIDE_VAR)
            .or_else(|| non_empty("USER"))
            .or_else(|| non_empty("LOGNAME"))
            .ok_or_else(|| {
                CuiError::Config(format!(
                    "cannot determine user name; set {} or USER",
                    USER_OVERRIDE_VAR
                ))
            })?;

        Ok(Self {
            user,
            shell: non_empty("SHELL").unwrap_or_else(|| DEFAULT_SHELL.to_string()),
            credential_override: non_empty(CREDENTIAL_VAR).map(PathBuf::from),
        })
    }

    /// The command a session runs: `command` when given, the user's shell otherwise.
    pub fn session_command(&self, command: &[String]) -> Vec<String> {
        if command.is_empty() {
            vec![self.shell.clone()]
        } else {
            command.to_vec()
        }
    }
}
