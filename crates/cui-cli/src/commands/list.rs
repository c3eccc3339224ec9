use chrono::Local;
use cui_condor::CondorScheduler;
use cui_core::{Config, Environment, Scheduler};

pub async fn run(config: &Config, json: bool) -> anyhow::Result<()> {
    let env = Environment::from_process_env()?;
    let scheduler = CondorScheduler::new(config.condor.clone());
    let jobs = scheduler.running_jobs(&env.user).await?;

    if json {
        let entries: Vec<serde_json::Value> = jobs
            .iter()
            .map(|j| {
                serde_json::json!({
                    "job_id": j.job_id,
                    "owner": env.user,
                    "started_at": j.started_at.map(|t| t.to_rfc3339()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if jobs.is_empty() {
        println!("No running interactive jobs for {}.", env.user);
        println!("Run `cui run` to start one.");
        return Ok(());
    }

    println!("{:<12} {:<12} {}", "JOB ID", "OWNER", "STARTED");
    println!("{}", "-".repeat(50));
    for job in &jobs {
        println!(
            "{:<12} {:<12} {}",
            job.job_id,
            env.user,
            job.started_at
                .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".into()),
        );
    }

    Ok(())
}
