// ABOUTME: Service definitions: raw one-click YAML shape and the validated ServiceSpec.
// ABOUTME: The build source is a tagged union chosen once per service, never a free-form string.

use super::de;
use super::volume::VolumeSpec;
use crate::types::AppName;
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::TemplateError;

const DEFAULT_HTTP_PORT: u16 = 80;

/// How a service's container image comes to exist on the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStrategy {
    /// Deploy a prebuilt image by reference.
    Image(String),
    /// Build on the platform from inline Dockerfile lines.
    Dockerfile(NonEmpty<String>),
}

/// One deployable unit of a template, validated and ready for rollout.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    pub build: BuildStrategy,
    pub depends_on: Vec<AppName>,
    pub volumes: Vec<VolumeSpec>,
    pub environment: BTreeMap<String, String>,
    pub not_expose_as_web_app: bool,
    pub container_http_port: u16,
}

impl ServiceSpec {
    /// A service with volumes needs persistent data on the platform side.
    pub fn has_persistent_data(&self) -> bool {
        !self.volumes.is_empty()
    }
}

/// Service entry as written in one-click YAML, before validation.
#[derive(Debug, Deserialize)]
pub(crate) struct RawService {
    #[serde(default)]
    image: Option<String>,

    #[serde(default)]
    volumes: Vec<String>,

    #[serde(default, deserialize_with = "de::scalar_map")]
    environment: BTreeMap<String, String>,

    #[serde(default)]
    depends_on: Vec<String>,

    #[serde(default, rename = "caproverExtra")]
    extra: RawExtra,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExtra {
    #[serde(default, deserialize_with = "de::opt_scalar_string")]
    container_http_port: Option<String>,

    #[serde(default, deserialize_with = "de::opt_scalar_string")]
    not_expose_as_web_app: Option<String>,

    #[serde(default)]
    dockerfile_lines: Option<Vec<String>>,
}

impl RawService {
    pub(crate) fn into_spec(self, service: &AppName) -> Result<ServiceSpec, TemplateError> {
        let build = match (self.image, self.extra.dockerfile_lines) {
            (Some(image), None) => BuildStrategy::Image(image),
            (None, Some(lines)) => {
                let lines = NonEmpty::from_vec(lines).ok_or_else(|| {
                    TemplateError::EmptyDockerfile {
                        service: service.clone(),
                    }
                })?;
                BuildStrategy::Dockerfile(lines)
            }
            (None, None) => {
                return Err(TemplateError::MissingBuildSource {
                    service: service.clone(),
                });
            }
            (Some(_), Some(_)) => {
                return Err(TemplateError::ConflictingBuildSources {
                    service: service.clone(),
                });
            }
        };

        let depends_on = self
            .depends_on
            .iter()
            .map(|name| {
                AppName::new(name).map_err(|reason| TemplateError::InvalidServiceName {
                    name: name.clone(),
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let volumes = self
            .volumes
            .iter()
            .map(|raw| {
                VolumeSpec::parse(raw).ok_or_else(|| TemplateError::InvalidVolume {
                    service: service.clone(),
                    value: raw.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let container_http_port = match self.extra.container_http_port {
            None => DEFAULT_HTTP_PORT,
            Some(raw) => {
                raw.trim()
                    .parse()
                    .map_err(|_| TemplateError::InvalidHttpPort {
                        service: service.clone(),
                        value: raw.clone(),
                    })?
            }
        };

        let not_expose_as_web_app = self.extra.not_expose_as_web_app.as_deref() == Some("true");

        Ok(ServiceSpec {
            build,
            depends_on,
            volumes,
            environment: self.environment,
            not_expose_as_web_app,
            container_http_port,
        })
    }
}
