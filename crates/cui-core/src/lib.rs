pub mod config;
pub mod controller;
pub mod discovery;
pub mod env;
pub mod error;
pub mod event_log;
pub mod job;
pub mod process;
pub mod scheduler;
pub mod workspace;

pub use config::Config;
pub use controller::{Controller, SessionRequest};
pub use env::Environment;
pub use error::{CuiError, ProcessFailure};
pub use job::{DescriptionValue, JobDescription, JobId, JobTarget, RunningJob};
pub use process::{Invocation, ProcessOutput};
pub use scheduler::Scheduler;
pub use workspace::Workspace;
