//! ClassAd expressions and query output used to select jobs.

use chrono::{TimeZone, Utc};
use cui_core::job::{JobId, RunningJob};
use std::path::Path;

/// `JobStatus` value for a running job.
pub const JOB_STATUS_RUNNING: u32 = 2;

/// Output template for the query tool: `<cluster>.<proc> <start>` per job.
#[rustfmt::skip]
pub const RUNNING_JOB_FORMAT: &[&str] = &[
    "-format", "%d.", "ClusterId",
    "-format", "%d ", "ProcId",
    "-format", "%d", "JobStartDate",
    "-format", "\\n", "ClusterId",
];

/// Quote a string literal.
pub fn string_literal(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Interactive jobs of `owner` currently running.
pub fn running_interactive(marker_attribute: &str, owner: &str) -> String {
    format!(
        "{} =?= True && Owner == {} && JobStatus == {}",
        marker_attribute,
        string_literal(owner),
        JOB_STATUS_RUNNING
    )
}

/// Jobs of `owner` submitted from `workdir`.
pub fn owned_in(owner: &str, workdir: &Path) -> String {
    format!(
        "Owner == {} && Iwd == {}",
        string_literal(owner),
        string_literal(&workdir.display().to_string())
    )
}

/// Parse query output, one job per non-blank line, keeping output order.
/// A missing or unparsable start time leaves `started_at` empty.
pub fn parse_running_jobs(output: &str) -> Vec<RunningJob> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let id = fields.next()?;
            let started_at = fields
                .next()
                .and_then(|s| s.parse::<i64>().ok())
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
            Some(RunningJob {
                job_id: JobId::from_string(id.to_string()),
                started_at,
            })
        })
        .collect()
}
