// ABOUTME: Deployment orchestration: polling, per-service rollout, scheduling.
// ABOUTME: Exports state markers and the Orchestrator entry point.

mod error;
mod orchestrator;
mod poller;
mod rollout;
mod scheduler;
mod state;

pub use error::DeployError;
pub use orchestrator::{OrchestrateError, Orchestrator};
pub use poller::{PollError, PollSettings, wait_until_ready};
pub use rollout::{Executor, Rollout};
pub use scheduler::{DeploymentState, ScheduleError, ServiceDeployer, run};
pub use state::{Configured, Declared, Registered, Released};
