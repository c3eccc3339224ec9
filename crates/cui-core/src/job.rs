use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Scheduler-assigned job token, e.g. `12.0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct JobId(pub String);

impl JobId {
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A job reported as running by the scheduler's query tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunningJob {
    pub job_id: JobId,
    pub started_at: Option<DateTime<Utc>>,
}

/// Which job a session should attach to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobTarget {
    /// Submit a fresh placeholder job.
    Submit,
    /// Reuse one of the user's running interactive jobs, submitting if none exists.
    Any,
    Existing(JobId),
}

impl JobTarget {
    /// Keyword accepted in place of a job id to reuse any running job.
    pub const ANY: &'static str = "any";

    pub fn from_option(job: Option<&str>) -> Self {
        match job.map(str::trim) {
            None | Some("") => JobTarget::Submit,
            Some(s) if s.eq_ignore_ascii_case(Self::ANY) => JobTarget::Any,
            Some(s) => JobTarget::Existing(JobId::from_string(s.to_string())),
        }
    }
}

/// Right-hand side of a description entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionValue {
    Text(String),
    Integer(i64),
}

impl fmt::Display for DescriptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptionValue::Text(s) => write!(f, "{}", s),
            DescriptionValue::Integer(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for DescriptionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for DescriptionValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&Path> for DescriptionValue {
    fn from(p: &Path) -> Self {
        Self::Text(p.display().to_string())
    }
}

impl From<i64> for DescriptionValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<u64> for DescriptionValue {
    fn from(n: u64) -> Self {
        Self::Integer(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

/// Ordered attribute set in the scheduler's submission language.
///
/// Keys are unique and keep the position of their first insertion; the
/// rendered text always ends with the queuing directive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDescription {
    entries: Vec<(String, DescriptionValue)>,
}

impl JobDescription {
    pub const QUEUE_DIRECTIVE: &'static str = "queue";

    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or override `key`. An override keeps the original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<DescriptionValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&DescriptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(&format!("{} = {}\n", key, value));
        }
        out.push_str(Self::QUEUE_DIRECTIVE);
        out.push('\n');
        out
    }

    pub fn write_to(&self, path: &Path) -> Result<(), std::io::Error> {
        std::fs::write(path, self.render())
    }
}
