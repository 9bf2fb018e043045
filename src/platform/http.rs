// ABOUTME: reqwest-backed implementation of PlatformOps.
// ABOUTME: Token login, auth headers, envelope unwrapping, and endpoint paths live here.

use super::error::{JsonSnafu, PlatformError, TransportSnafu};
use super::status::{Envelope, unwrap_envelope};
use super::{AppConfig, AppStatus, OneClickEntry, PlatformOps};
use crate::template::BuildStrategy;
use crate::types::AppName;
use async_trait::async_trait;
use nonempty::NonEmpty;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde::ser::Serialize;
use snafu::ResultExt;
use std::time::Duration;

/// API endpoint paths, relative to `{protocol}{address}/api/v2`.
mod paths {
    pub const LOGIN: &str = "/login";
    pub const SYSTEM_INFO: &str = "/user/system/info";
    pub const APP_REGISTER: &str = "/user/apps/appDefinitions/register";
    pub const UPDATE_APP: &str = "/user/apps/appDefinitions/update";
    pub const APP_DATA: &str = "/user/apps/appData";
    pub const ONECLICK_LIST: &str = "/user/oneclick/template/list";
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection coordinates for a platform control plane.
#[derive(Debug, Clone, Copy)]
pub struct ConnectSettings<'a> {
    /// Base API URL, e.g. `https://captain.example.com/api/v2`.
    pub base_url: &'a str,
    /// Tenant namespace sent with every request.
    pub namespace: &'a str,
    /// Base URL one-click template sources are fetched from.
    pub templates_base_url: &'a str,
}

/// HTTP client for a CapRover-compatible control plane.
pub struct HttpPlatform {
    http: reqwest::Client,
    base_url: String,
    templates_base_url: String,
    namespace: String,
    token: String,
}

impl HttpPlatform {
    /// Authenticate with the platform password and build a client holding the
    /// session token.
    pub async fn login(
        settings: ConnectSettings<'_>,
        password: &str,
    ) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context(TransportSnafu)?;

        #[derive(Debug, Deserialize)]
        struct TokenData {
            token: String,
        }

        let response = http
            .post(format!("{}{}", settings.base_url, paths::LOGIN))
            .header("x-namespace", settings.namespace)
            .json(&serde_json::json!({ "password": password }))
            .send()
            .await
            .context(TransportSnafu)?;

        let data: TokenData = Self::unwrap(response).await?;
        tracing::debug!(base_url = settings.base_url, "authenticated against the platform");

        Ok(Self {
            http,
            base_url: settings.base_url.to_string(),
            templates_base_url: settings.templates_base_url.to_string(),
            namespace: settings.namespace.to_string(),
            token: data.token,
        })
    }

    async fn unwrap<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, PlatformError> {
        let bytes = response.bytes().await.context(TransportSnafu)?;
        let envelope: Envelope<T> = serde_json::from_slice(&bytes).context(JsonSnafu)?;
        unwrap_envelope(envelope)
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, PlatformError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header("x-captain-auth", &self.token)
            .header("x-namespace", &self.namespace)
            .send()
            .await
            .context(TransportSnafu)?;
        Self::unwrap(response).await
    }

    async fn post_data<T, B>(&self, path: &str, body: &B) -> Result<T, PlatformError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("x-captain-auth", &self.token)
            .header("x-namespace", &self.namespace)
            .json(body)
            .send()
            .await
            .context(TransportSnafu)?;
        Self::unwrap(response).await
    }

    fn app_data_path(name: &AppName) -> String {
        format!("{}/{}", paths::APP_DATA, urlencoding::encode(name.as_str()))
    }
}

/// The `captain-definition` document posted when triggering a build.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct CaptainDefinition<'a> {
    schema_version: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    image_name: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    dockerfile_lines: Option<&'a NonEmpty<String>>,
}

impl<'a> CaptainDefinition<'a> {
    fn for_build(build: &'a BuildStrategy) -> Self {
        match build {
            BuildStrategy::Image(image) => CaptainDefinition {
                schema_version: 2,
                image_name: Some(image),
                dockerfile_lines: None,
            },
            BuildStrategy::Dockerfile(lines) => CaptainDefinition {
                schema_version: 2,
                image_name: None,
                dockerfile_lines: Some(lines),
            },
        }
    }
}

#[async_trait]
impl PlatformOps for HttpPlatform {
    async fn create_application(
        &self,
        name: &AppName,
        has_persistent_data: bool,
    ) -> Result<(), PlatformError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, paths::APP_REGISTER))
            .header("x-captain-auth", &self.token)
            .header("x-namespace", &self.namespace)
            .query(&[("detached", "1")])
            .json(&serde_json::json!({
                "appName": name.as_str(),
                "hasPersistentData": has_persistent_data,
            }))
            .send()
            .await
            .context(TransportSnafu)?;

        let _: serde_json::Value = Self::unwrap(response).await?;
        tracing::debug!(app = %name, "registered application");
        Ok(())
    }

    async fn update_application(&self, config: &AppConfig) -> Result<(), PlatformError> {
        let _: serde_json::Value = self.post_data(paths::UPDATE_APP, config).await?;
        tracing::debug!(app = %config.app_name, "updated application configuration");
        Ok(())
    }

    async fn deploy_build(
        &self,
        name: &AppName,
        build: &BuildStrategy,
    ) -> Result<(), PlatformError> {
        let definition =
            serde_json::to_string(&CaptainDefinition::for_build(build)).context(JsonSnafu)?;

        let _: serde_json::Value = self
            .post_data(
                &Self::app_data_path(name),
                &serde_json::json!({
                    "captainDefinitionContent": definition,
                    "gitHash": "",
                }),
            )
            .await?;
        tracing::debug!(app = %name, "triggered build deployment");
        Ok(())
    }

    async fn application_status(&self, name: &AppName) -> Result<AppStatus, PlatformError> {
        self.get_data(&Self::app_data_path(name)).await
    }

    async fn list_one_click_templates(&self) -> Result<Vec<OneClickEntry>, PlatformError> {
        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct OneClickList {
            one_click_apps: Vec<OneClickEntry>,
        }

        let list: OneClickList = self.get_data(paths::ONECLICK_LIST).await?;
        tracing::debug!(count = list.one_click_apps.len(), "fetched one-click catalog");
        Ok(list.one_click_apps)
    }

    async fn fetch_template_source(&self, template: &str) -> Result<String, PlatformError> {
        let url = format!(
            "{}/{}.yml",
            self.templates_base_url,
            urlencoding::encode(template)
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context(TransportSnafu)?
            .error_for_status()
            .context(TransportSnafu)?;

        response.text().await.context(TransportSnafu)
    }

    async fn root_domain(&self) -> Result<String, PlatformError> {
        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct SystemInfo {
            root_domain: String,
        }

        let info: SystemInfo = self.get_data(paths::SYSTEM_INFO).await?;
        Ok(info.root_domain)
    }
}
