// ABOUTME: Top-level one-click deployment flow.
// ABOUTME: Resolve variables, substitute, parse services, then schedule the rollout.

use std::collections::BTreeMap;

use thiserror::Error;

use super::poller::PollSettings;
use super::rollout::Executor;
use super::scheduler::{self, DeploymentState, ScheduleError};
use crate::platform::{PlatformError, PlatformOps};
use crate::prompt::VariablePrompt;
use crate::template::{
    APP_NAME_VAR, ROOT_DOMAIN_VAR, ResolvedVariables, Template, TemplateError, ValidationError,
    VariableManifest, VariableResolver, substitute,
};

#[derive(Debug, Error)]
pub enum OrchestrateError {
    #[error("one-click template {0:?} is not in the platform catalog")]
    UnknownTemplate(String),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("variable resolution failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("rollout failed: {0}")]
    Schedule(#[from] ScheduleError),
}

/// Drives one one-click deployment run from catalog lookup to the last
/// deployed service. Owns all per-run state; nothing survives the call.
pub struct Orchestrator<'a, P: PlatformOps> {
    platform: &'a P,
    poll: PollSettings,
    prompt: Option<&'a dyn VariablePrompt>,
}

impl<'a, P: PlatformOps> Orchestrator<'a, P> {
    pub fn new(platform: &'a P) -> Self {
        Self {
            platform,
            poll: PollSettings::default(),
            prompt: None,
        }
    }

    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    /// Attach an interactive prompt for missing or invalid variables.
    pub fn with_prompt(mut self, prompt: &'a dyn VariablePrompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Deploy the named one-click template. Application names are prefixed
    /// with `namespace`; `user_vars` are the operator-supplied variable
    /// values. Returns the per-run state with services in completion order.
    pub async fn deploy_one_click(
        &self,
        template_name: &str,
        namespace: &str,
        user_vars: &BTreeMap<String, String>,
    ) -> Result<DeploymentState, OrchestrateError> {
        let catalog = self.platform.list_one_click_templates().await?;
        if !catalog.iter().any(|entry| entry.name == template_name) {
            return Err(OrchestrateError::UnknownTemplate(template_name.to_string()));
        }

        let raw = self.platform.fetch_template_source(template_name).await?;
        let manifest = VariableManifest::parse(&raw).map_err(TemplateError::Yaml)?;

        let mut seeds = ResolvedVariables::new();
        seeds.set(APP_NAME_VAR, format!("{namespace}-{template_name}"));
        seeds.set(ROOT_DOMAIN_VAR, self.platform.root_domain().await?);

        let mut resolver = VariableResolver::new();
        if let Some(prompt) = self.prompt {
            resolver = resolver.with_prompt(prompt);
        }
        let variables = resolver
            .resolve(manifest.variables(), user_vars, &seeds)
            .await?;
        tracing::debug!(count = variables.len(), "resolved template variables");

        let substituted = substitute(&raw, &variables);
        let template = Template::parse(&substituted)?;
        tracing::info!(
            template = template_name,
            services = template.len(),
            "starting one-click rollout"
        );

        let executor = Executor::new(self.platform, self.poll);
        let state = scheduler::run(&template, &executor).await?;
        Ok(state)
    }
}
