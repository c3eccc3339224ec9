use cui_condor::CondorScheduler;
use cui_core::job::JobTarget;
use cui_core::{Config, Controller, Environment, SessionRequest};

pub async fn run(
    mut config: Config,
    job: Option<&str>,
    preserve: bool,
    timeout: Option<u64>,
    command: Vec<String>,
) -> anyhow::Result<i32> {
    if timeout.is_some() {
        config.session.monitor_timeout_secs = timeout;
    }

    let env = Environment::from_process_env()?;
    let scheduler = CondorScheduler::new(config.condor.clone());
    let request = SessionRequest {
        target: JobTarget::from_option(job),
        command,
        preserve,
    };

    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let controller = Controller::new(&scheduler, &config.session, &env);
    Ok(controller.run(&request, interrupt).await)
}
