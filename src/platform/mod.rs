// ABOUTME: Remote platform collaborator: the operations trait and wire types.
// ABOUTME: The orchestrator core only ever talks to the platform through PlatformOps.

mod error;
mod http;
mod status;

pub use error::PlatformError;
pub use http::{ConnectSettings, HttpPlatform};
pub use status::{ApiStatus, Envelope, unwrap_envelope};

use crate::template::{BuildStrategy, VolumeSpec};
use crate::types::AppName;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Build/readiness state of one application, as reported by the platform.
/// `is_building` and `is_build_failed` are orthogonal: an app can be ready
/// with a failed build behind it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AppStatus {
    #[serde(rename = "isAppBuilding")]
    pub is_building: bool,

    #[serde(default, rename = "isBuildFailed")]
    pub is_build_failed: bool,
}

/// One entry of the platform's one-click catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneClickEntry {
    pub name: String,

    #[serde(default)]
    pub base_url: String,
}

/// One environment variable in the platform's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

/// Full configuration for an application update. Every field the update call
/// accepts is spelled out here; nothing is merged from partial shapes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub app_name: AppName,
    pub instance_count: u32,
    pub volumes: Vec<VolumeSpec>,
    pub env_vars: Vec<EnvVar>,
    pub not_expose_as_web_app: bool,
    pub container_http_port: u16,
}

/// Operations the orchestrator needs from the platform control plane.
///
/// Every call either succeeds or fails with a `PlatformError` carrying the
/// platform's status code and description; nothing is retried here.
#[async_trait]
pub trait PlatformOps: Send + Sync {
    /// Register an application shell. Creating an application that already
    /// exists is a platform rejection and is surfaced as such.
    async fn create_application(
        &self,
        name: &AppName,
        has_persistent_data: bool,
    ) -> Result<(), PlatformError>;

    /// Apply the full configuration of an application.
    async fn update_application(&self, config: &AppConfig) -> Result<(), PlatformError>;

    /// Trigger a build/deploy for an existing application.
    async fn deploy_build(&self, name: &AppName, build: &BuildStrategy)
    -> Result<(), PlatformError>;

    /// Current build/readiness state of an application.
    async fn application_status(&self, name: &AppName) -> Result<AppStatus, PlatformError>;

    /// The platform's one-click catalog.
    async fn list_one_click_templates(&self) -> Result<Vec<OneClickEntry>, PlatformError>;

    /// Raw YAML source of a one-click template.
    async fn fetch_template_source(&self, template: &str) -> Result<String, PlatformError>;

    /// Root domain the platform serves applications under.
    async fn root_domain(&self) -> Result<String, PlatformError>;
}
