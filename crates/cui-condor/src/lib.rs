pub mod classad;
pub mod condor_scheduler;
pub mod description;
pub mod probe;

pub use condor_scheduler::CondorScheduler;
