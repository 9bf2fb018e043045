// ABOUTME: One-click template parsing: services, variables, volumes, substitution.
// ABOUTME: A Template is parsed from substituted YAML and immutable for the run.

mod de;
mod service;
mod substitute;
mod variables;
mod volume;

pub use service::{BuildStrategy, ServiceSpec};
pub use substitute::substitute;
pub use variables::{
    APP_NAME_VAR, PatternError, ROOT_DOMAIN_VAR, ResolvedVariables, ValidRegex, ValidationError,
    VariableDefinition, VariableManifest, VariableResolver,
};
pub use volume::VolumeSpec;

use crate::types::{AppName, AppNameError};
use serde::Deserialize;
use service::RawService;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid service name {name:?}: {reason}")]
    InvalidServiceName { name: String, reason: AppNameError },

    #[error("service {service} is declared more than once")]
    DuplicateService { service: AppName },

    #[error("service {service} declares neither an image nor dockerfileLines")]
    MissingBuildSource { service: AppName },

    #[error("service {service} declares both an image and dockerfileLines")]
    ConflictingBuildSources { service: AppName },

    #[error("service {service} has empty dockerfileLines")]
    EmptyDockerfile { service: AppName },

    #[error("service {service} has an invalid volume declaration: {value:?}")]
    InvalidVolume { service: AppName, value: String },

    #[error("service {service} has an invalid containerHttpPort: {value:?}")]
    InvalidHttpPort { service: AppName, value: String },
}

/// A parsed one-click application definition. Services keep their declared
/// order; the scheduler's tie-break depends on it.
#[derive(Debug)]
pub struct Template {
    services: Vec<(AppName, ServiceSpec)>,
}

impl Template {
    /// Parse a template from substituted YAML source.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        #[derive(Deserialize)]
        struct RawTemplate {
            #[serde(deserialize_with = "deserialize_services")]
            services: Vec<(String, RawService)>,
        }

        let raw: RawTemplate = serde_yaml::from_str(text)?;

        let mut services = Vec::with_capacity(raw.services.len());
        for (name, raw_service) in raw.services {
            let service =
                AppName::new(&name).map_err(|reason| TemplateError::InvalidServiceName {
                    name: name.clone(),
                    reason,
                })?;

            if services.iter().any(|(existing, _)| *existing == service) {
                return Err(TemplateError::DuplicateService { service });
            }

            let spec = raw_service.into_spec(&service)?;
            services.push((service, spec));
        }

        Ok(Template { services })
    }

    /// Services in declared order.
    pub fn services(&self) -> impl Iterator<Item = (&AppName, &ServiceSpec)> {
        self.services.iter().map(|(name, spec)| (name, spec))
    }

    pub fn get(&self, name: &AppName) -> Option<&ServiceSpec> {
        self.services
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, spec)| spec)
    }

    pub fn contains(&self, name: &AppName) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// Deserialize the services mapping into a vector so declared order survives.
fn deserialize_services<'de, D>(deserializer: D) -> Result<Vec<(String, RawService)>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct ServicesVisitor;

    impl<'de> serde::de::Visitor<'de> for ServicesVisitor {
        type Value = Vec<(String, RawService)>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a mapping of service name to service definition")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>,
        {
            let mut services = Vec::new();
            while let Some(entry) = map.next_entry::<String, RawService>()? {
                services.push(entry);
            }
            Ok(services)
        }
    }

    deserializer.deserialize_map(ServicesVisitor)
}
