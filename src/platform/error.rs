// ABOUTME: Platform error type with SNAFU pattern.
// ABOUTME: Carries the remote status code and description for diagnosis.

use snafu::Snafu;

use super::status::ApiStatus;

/// A failure talking to the platform control plane.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PlatformError {
    /// The platform answered, but rejected the request.
    #[snafu(display("platform rejected the request ({status}): {description}"))]
    Api {
        status: ApiStatus,
        description: String,
    },

    /// The request never produced a platform answer.
    #[snafu(display("transport error: {source}"))]
    Transport { source: reqwest::Error },

    /// A platform exchange carried JSON that could not be decoded or encoded.
    #[snafu(display("malformed platform exchange: {source}"))]
    Json { source: serde_json::Error },
}

impl PlatformError {
    /// The remote status code, when the platform itself rejected the call.
    pub fn status_code(&self) -> Option<u32> {
        match self {
            PlatformError::Api { status, .. } => Some(status.code()),
            _ => None,
        }
    }
}
