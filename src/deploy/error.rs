// ABOUTME: Error types for service rollout.
// ABOUTME: Every error names the service it concerns; nothing is retried or swallowed.

use super::poller::PollError;
use crate::platform::PlatformError;
use crate::types::AppName;

/// Errors that can occur while rolling out a single service.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The platform rejected one of the rollout calls.
    #[error("platform rejected {step} for {service}: {source}")]
    Platform {
        service: AppName,
        step: &'static str,
        source: PlatformError,
    },

    /// Readiness was not reached, or the status check failed mid-wait.
    #[error("{service} did not become ready: {source}")]
    NotReady {
        service: AppName,
        source: PollError,
    },

    /// The platform accepted the deploy, reached readiness, and then reported
    /// the build as failed.
    #[error("build failed for {0}")]
    BuildFailed(AppName),
}
