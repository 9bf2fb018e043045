// ABOUTME: Configuration types and parsing for caravel.yml.
// ABOUTME: Handles YAML parsing, discovery, and connection settings for the platform.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::deploy::PollSettings;
use crate::error::{Error, Result};
use crate::platform::ConnectSettings;

pub const CONFIG_FILENAME: &str = "caravel.yml";
pub const CONFIG_FILENAME_ALT: &str = "caravel.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".caravel/config.yml";

const DEFAULT_TEMPLATES_BASE_URL: &str =
    "https://raw.githubusercontent.com/caprover/one-click-apps/master/public/v4/apps";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Host (and optional port) of the platform dashboard, e.g.
    /// `captain.apps.example.com`.
    pub address: String,

    #[serde(default)]
    pub protocol: Protocol,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Environment variable holding the dashboard password. The password
    /// itself never lives in the config file.
    #[serde(default = "default_password_env")]
    pub password_env: String,

    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(default = "default_ready_timeout", with = "humantime_serde")]
    pub ready_timeout: Duration,

    #[serde(default = "default_templates_base_url")]
    pub templates_base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    #[default]
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => write!(f, "http://"),
            Protocol::Https => write!(f, "https://"),
        }
    }
}

fn default_namespace() -> String {
    "captain".to_string()
}

fn default_password_env() -> String {
    "CARAVEL_PASSWORD".to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_ready_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_templates_base_url() -> String {
    DEFAULT_TEMPLATES_BASE_URL.to_string()
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Read the dashboard password from the configured environment variable.
    pub fn password(&self) -> Result<String> {
        std::env::var(&self.password_env)
            .map_err(|_| Error::MissingEnvVar(self.password_env.clone()))
    }

    /// API root, e.g. `https://captain.apps.example.com/api/v2`.
    pub fn base_url(&self) -> String {
        format!("{}{}/api/v2", self.protocol, self.address)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: self.poll_interval,
            timeout: self.ready_timeout,
        }
    }

    pub fn connect_settings<'a>(&'a self, base_url: &'a str) -> ConnectSettings<'a> {
        ConnectSettings {
            base_url,
            namespace: &self.namespace,
            templates_base_url: &self.templates_base_url,
        }
    }

    pub fn template() -> Self {
        Config {
            address: "captain.apps.example.com".to_string(),
            protocol: Protocol::Https,
            namespace: default_namespace(),
            password_env: default_password_env(),
            poll_interval: default_poll_interval(),
            ready_timeout: default_ready_timeout(),
            templates_base_url: default_templates_base_url(),
        }
    }
}

pub fn init_config(dir: &Path, address: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();
    if let Some(a) = address {
        if a.is_empty() {
            return Err(Error::InvalidConfig("address cannot be empty".to_string()));
        }
        config.address = a.to_string();
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(config_path)
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"address: {}
namespace: {}
# Dashboard password is read from this environment variable, never from here.
password_env: {}
# protocol: https
# poll_interval: 1s
# ready_timeout: 60s
"#,
        config.address, config.namespace, config.password_env
    )
}
