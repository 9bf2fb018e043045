// ABOUTME: Shared test support: an in-memory PlatformOps double.
// ABOUTME: Records every call and replays scripted statuses and template sources.

#![allow(dead_code)]

use async_trait::async_trait;
use caravel::platform::{
    ApiStatus, AppConfig, AppStatus, OneClickEntry, PlatformError, PlatformOps,
};
use caravel::template::BuildStrategy;
use caravel::types::AppName;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// In-memory platform double. Statuses are scripted per application and fall
/// back to "ready" once the script is exhausted.
pub struct MockPlatform {
    pub calls: Mutex<Vec<String>>,
    pub updates: Mutex<Vec<AppConfig>>,
    status_scripts: Mutex<HashMap<String, VecDeque<AppStatus>>>,
    catalog: Vec<OneClickEntry>,
    sources: HashMap<String, String>,
    root_domain: String,
    reject_create_for: Option<AppName>,
    build_failed_for: Vec<AppName>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            status_scripts: Mutex::new(HashMap::new()),
            catalog: Vec::new(),
            sources: HashMap::new(),
            root_domain: "apps.example.com".to_string(),
            reject_create_for: None,
            build_failed_for: Vec::new(),
        }
    }

    pub fn with_template(mut self, name: &str, source: &str) -> Self {
        self.catalog.push(OneClickEntry {
            name: name.to_string(),
            base_url: String::new(),
        });
        self.sources.insert(name.to_string(), source.to_string());
        self
    }

    pub fn rejecting_create_for(mut self, name: &str) -> Self {
        self.reject_create_for = Some(AppName::new(name).unwrap());
        self
    }

    pub fn failing_build_for(mut self, name: &str) -> Self {
        self.build_failed_for.push(AppName::new(name).unwrap());
        self
    }

    /// Queue statuses to be returned by successive status checks for `name`.
    pub fn script_statuses(&self, name: &str, statuses: &[AppStatus]) {
        self.status_scripts
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .extend(statuses.iter().copied());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

pub fn building() -> AppStatus {
    AppStatus {
        is_building: true,
        is_build_failed: false,
    }
}

pub fn ready() -> AppStatus {
    AppStatus::default()
}

#[async_trait]
impl PlatformOps for MockPlatform {
    async fn create_application(
        &self,
        name: &AppName,
        has_persistent_data: bool,
    ) -> Result<(), PlatformError> {
        self.record(format!("create {name} persistent={has_persistent_data}"));
        if self.reject_create_for.as_ref() == Some(name) {
            return Err(PlatformError::Api {
                status: ApiStatus::AlreadyExists,
                description: format!("App already exists: {name}"),
            });
        }
        Ok(())
    }

    async fn update_application(&self, config: &AppConfig) -> Result<(), PlatformError> {
        self.record(format!("update {}", config.app_name));
        self.updates.lock().unwrap().push(config.clone());
        Ok(())
    }

    async fn deploy_build(
        &self,
        name: &AppName,
        build: &BuildStrategy,
    ) -> Result<(), PlatformError> {
        let kind = match build {
            BuildStrategy::Image(image) => format!("image={image}"),
            BuildStrategy::Dockerfile(lines) => format!("dockerfile={} lines", lines.len()),
        };
        self.record(format!("deploy {name} {kind}"));
        Ok(())
    }

    async fn application_status(&self, name: &AppName) -> Result<AppStatus, PlatformError> {
        self.record(format!("status {name}"));

        let scripted = self
            .status_scripts
            .lock()
            .unwrap()
            .get_mut(name.as_str())
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(status) => Ok(status),
            None => {
                if self.build_failed_for.contains(name) {
                    Ok(AppStatus {
                        is_building: false,
                        is_build_failed: true,
                    })
                } else {
                    Ok(ready())
                }
            }
        }
    }

    async fn list_one_click_templates(&self) -> Result<Vec<OneClickEntry>, PlatformError> {
        self.record("list");
        Ok(self.catalog.clone())
    }

    async fn fetch_template_source(&self, template: &str) -> Result<String, PlatformError> {
        self.record(format!("fetch {template}"));
        self.sources
            .get(template)
            .cloned()
            .ok_or_else(|| PlatformError::Api {
                status: ApiStatus::NotFound,
                description: format!("no template source for {template}"),
            })
    }

    async fn root_domain(&self) -> Result<String, PlatformError> {
        self.record("root_domain");
        Ok(self.root_domain.clone())
    }
}
