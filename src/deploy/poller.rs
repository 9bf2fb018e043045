// ABOUTME: Time-bounded readiness polling against the platform.
// ABOUTME: Fixed interval, no backoff; check errors propagate immediately.

use crate::platform::{AppStatus, PlatformError};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Poll cadence and budget for readiness waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("readiness not reached within {}s", waited.as_secs())]
    Timeout { waited: Duration },

    #[error("status check failed: {0}")]
    Platform(#[from] PlatformError),
}

/// Poll `check` until the application stops building, the budget runs out,
/// or the check itself fails.
///
/// Each tick sleeps one interval, deducts it from the remaining budget, and
/// invokes `check`. A still-building observation with no budget left is a
/// `Timeout`; a failing check is propagated immediately. On success the last
/// observed status is returned.
pub async fn wait_until_ready<F, Fut>(
    mut check: F,
    settings: PollSettings,
) -> Result<AppStatus, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<AppStatus, PlatformError>>,
{
    let mut remaining = settings.timeout;

    loop {
        tokio::time::sleep(settings.interval).await;
        remaining = remaining.saturating_sub(settings.interval);

        let status = check().await?;
        if !status.is_building {
            return Ok(status);
        }

        if remaining.is_zero() {
            return Err(PollError::Timeout {
                waited: settings.timeout,
            });
        }
    }
}
