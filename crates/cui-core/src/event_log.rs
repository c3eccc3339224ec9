//! Following a job's event log until the scheduler reports it executing.
//!
//! The scheduler appends one line per state change. The log is expected to
//! keep growing, so reaching end-of-file only means "nothing new yet".

use crate::job::JobId;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Line that terminates each event block and carries no record.
pub const SEPARATOR: &str = "...";

/// Message fragment announcing the job has started on a worker.
pub const EXECUTING_MARKER: &str = "Job executing";

/// Default delay between reads that found nothing new.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// One event log line split into its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub entry: String,
    pub job_id: String,
    pub date: String,
    pub time: String,
    pub message: String,
}

impl LogRecord {
    /// Split into at most five whitespace-delimited fields; the last one keeps
    /// its inner whitespace. Separator lines and lines with fewer than five
    /// fields yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
        if line == SEPARATOR {
            return None;
        }

        let mut rest = line.trim_start();
        let mut fields = Vec::with_capacity(4);
        for _ in 0..4 {
            let end = rest.find(char::is_whitespace)?;
            fields.push(&rest[..end]);
            rest = rest[end..].trim_start();
        }
        let message = rest.trim_end();
        if message.is_empty() {
            return None;
        }

        Some(Self {
            entry: fields[0].to_string(),
            job_id: fields[1].to_string(),
            date: fields[2].to_string(),
            time: fields[3].to_string(),
            message: message.to_string(),
        })
    }

    pub fn is_executing(&self) -> bool {
        self.message.contains(EXECUTING_MARKER)
    }

    /// The id field without its surrounding parentheses.
    pub fn job_id(&self) -> JobId {
        let id = self.job_id.trim_matches(|c: char| c == '(' || c == ')');
        JobId::from_string(id.to_string())
    }
}

/// A lazily growing sequence of lines.
#[async_trait::async_trait]
pub trait LineSource: Send {
    /// The next complete line, or `None` when nothing new is available yet.
    async fn next_line(&mut self) -> Result<Option<String>, std::io::Error>;
}

/// Follows a log file that may not exist yet and may end mid-line.
pub struct EventLogFollower {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    pending: Vec<u8>,
}

impl EventLogFollower {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reader: None,
            pending: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl LineSource for EventLogFollower {
    async fn next_line(&mut self) -> Result<Option<String>, std::io::Error> {
        if self.reader.is_none() {
            match File::open(&self.path).await {
                Ok(file) => self.reader = Some(BufReader::new(file)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e),
            }
        }

        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        let read = reader.read_until(b'\n', &mut self.pending).await?;
        if read == 0 || self.pending.last() != Some(&b'\n') {
            return Ok(None);
        }
        // Undecodable bytes are replaced rather than failing the wait.
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Ok(Some(line))
    }
}

/// In-memory source, mostly for tests and replaying captured logs.
#[derive(Debug, Default)]
pub struct StaticLines {
    lines: VecDeque<String>,
}

impl StaticLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait::async_trait]
impl LineSource for StaticLines {
    async fn next_line(&mut self) -> Result<Option<String>, std::io::Error> {
        Ok(self.lines.pop_front())
    }
}

/// Block until a record announces execution and return its job id.
///
/// There is no terminal state besides success: callers bound the wait
/// themselves (see `tokio::time::timeout`).
pub async fn wait_for_execution<S>(
    source: &mut S,
    poll_interval: Duration,
) -> Result<JobId, std::io::Error>
where
    S: LineSource + ?Sized,
{
    loop {
        let Some(line) = source.next_line().await? else {
            tokio::time::sleep(poll_interval).await;
            continue;
        };

        let Some(record) = LogRecord::parse(&line) else {
            continue;
        };
        debug!("Event {} for {}: {}", record.entry, record.job_id, record.message);

        if record.is_executing() {
            let job_id = record.job_id();
            info!("Job {} is executing", job_id);
            return Ok(job_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_five_fields() {
        let line = "001 (12.0) 01/01 00:01 Job executing on host: <10.0.0.1>\n";
        let record = LogRecord::parse(line).unwrap();
        assert_eq!(record.entry, "001");
        assert_eq!(record.job_id, "(12.0)");
        assert_eq!(record.date, "01/01");
        assert_eq!(record.time, "00:01");
        assert_eq!(record.message, "Job executing on host: <10.0.0.1>");
        assert!(record.is_executing());
        assert_eq!(record.job_id().as_str(), "12.0");
    }

    #[test]
    fn separator_and_short_lines_have_no_record() {
        assert_eq!(LogRecord::parse("...\n"), None);
        assert_eq!(LogRecord::parse("..."), None);
        assert_eq!(LogRecord::parse("\t(1) Normal termination\n"), None);
        assert_eq!(LogRecord::parse(""), None);
    }

    #[test]
    fn submitted_is_not_executing() {
        let record = LogRecord::parse("000 (12.0) 01/01 00:00 Job submitted from host").unwrap();
        assert!(!record.is_executing());
    }

    #[tokio::test]
    async fn returns_id_from_executing_event() {
        let mut source = StaticLines::new([
            "1 (12.0) 01/01 00:00 Job submitted\n",
            "...\n",
            "1 (12.0) 01/01 00:01 Job executing\n",
        ]);
        let id = wait_for_execution(&mut source, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(id.as_str(), "12.0");
    }

    #[tokio::test]
    async fn keeps_waiting_without_executing_event() {
        let mut source = StaticLines::new([
            "1 (12.0) 01/01 00:00 Job submitted\n",
            "...\n",
            "1 (12.0) 01/01 00:00 Job submitted\n",
        ]);
        let waited = tokio::time::timeout(
            Duration::from_millis(200),
            wait_for_execution(&mut source, Duration::from_millis(10)),
        )
        .await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn invalid_utf8_does_not_stop_the_wait() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.log");
        let mut log = b"000 (3.0) 01/01 00:00 Job submitted from host: <caf\xe9>\n...\n".to_vec();
        log.extend_from_slice("001 (3.0) 01/01 00:01 Job executing on h\u{f4}st\n".as_bytes());
        std::fs::write(&path, &log).unwrap();

        let mut follower = EventLogFollower::new(&path);
        let id = tokio::time::timeout(
            Duration::from_secs(5),
            wait_for_execution(&mut follower, Duration::from_millis(10)),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(id.as_str(), "3.0");
    }

    #[tokio::test]
    async fn multibyte_character_split_across_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.log");
        let line = "000 (4.0) 01/01 00:00 Job submitted from h\u{f4}st\n".as_bytes();
        let split = line.len() - 4;
        std::fs::write(&path, &line[..split]).unwrap();

        let mut follower = EventLogFollower::new(&path);
        assert_eq!(follower.next_line().await.unwrap(), None);

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        std::io::Write::write_all(&mut file, &line[split..]).unwrap();

        assert_eq!(
            follower.next_line().await.unwrap().as_deref(),
            Some("000 (4.0) 01/01 00:00 Job submitted from h\u{f4}st\n")
        );
    }

    #[tokio::test]
    async fn follower_waits_for_file_and_complete_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.log");
        let mut follower = EventLogFollower::new(&path);

        assert_eq!(follower.next_line().await.unwrap(), None);

        std::fs::write(&path, "000 (7.0) 01/01 00:00 Job sub").unwrap();
        assert_eq!(follower.next_line().await.unwrap(), None);

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        std::io::Write::write_all(&mut file, b"mitted\n...\n").unwrap();

        assert_eq!(
            follower.next_line().await.unwrap().as_deref(),
            Some("000 (7.0) 01/01 00:00 Job submitted\n")
        );
        assert_eq!(follower.next_line().await.unwrap().as_deref(), Some("...\n"));
        assert_eq!(follower.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn follower_sees_lines_appended_while_waiting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.log");
        let writer_path = path.clone();

        let writer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            std::fs::write(&writer_path, "000 (3.0) 01/01 00:00 Job submitted\n...\n").unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&writer_path)
                .unwrap();
            std::io::Write::write_all(&mut file, b"001 (3.0) 01/01 00:01 Job executing\n")
                .unwrap();
        });

        let mut follower = EventLogFollower::new(&path);
        let id = tokio::time::timeout(
            Duration::from_secs(5),
            wait_for_execution(&mut follower, Duration::from_millis(10)),
        )
        .await
        .unwrap()
        .unwrap();

        writer.await.unwrap();
        assert_eq!(id.as_str(), "3.0");
    }
}
