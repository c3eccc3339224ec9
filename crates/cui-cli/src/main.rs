use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "cui")]
#[command(about = "Run interactive jobs in a Condor cluster", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file (default: ~/.config/cui/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session on a worker node
    Run {
        /// Attach to this job id instead of submitting; "any" reuses a running job
        #[arg(short, long)]
        job: Option<String>,

        /// Keep the workspace directory after the session
        #[arg(short, long)]
        preserve: bool,

        /// Give up if the job has not started after this many seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Command to run on the worker (default: your shell)
        #[arg(last = true)]
        command: Vec<String>,
    },

    /// List your running interactive jobs
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show or initialize the config file
    Config {
        /// Print the config file path
        #[arg(long)]
        path: bool,

        /// Write a sample config file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => exit_code(code),
        Err(e) => {
            eprintln!("cui: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    use Commands::*;

    match cli.command {
        Run {
            job,
            preserve,
            timeout,
            command,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::run::run(config, job.as_deref(), preserve, timeout, command).await
        }
        List { json } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::list::run(&config, json).await?;
            Ok(0)
        }
        Config { path, init } => {
            commands::config::run(cli.config.as_deref(), path, init)?;
            Ok(0)
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
