// ABOUTME: Dependency-ordered rollout scheduling as a lazy, repeated-scan worklist.
// ABOUTME: A pass that deploys nothing means the remaining graph can never make progress.

use async_trait::async_trait;
use thiserror::Error;

use super::error::DeployError;
use crate::template::{ServiceSpec, Template};
use crate::types::AppName;

/// Deploys one service end to end. The scheduler drives this; the real
/// implementation rolls out against the platform, tests record calls.
#[async_trait]
pub trait ServiceDeployer: Send + Sync {
    async fn deploy(&self, name: &AppName, spec: &ServiceSpec) -> Result<(), DeployError>;
}

/// Per-run deployment bookkeeping. `deployed` is append-only and holds the
/// completion order; a service enters it exactly once.
#[derive(Debug, Default)]
pub struct DeploymentState {
    deployed: Vec<AppName>,
}

impl DeploymentState {
    /// Services in completion order.
    pub fn deployed(&self) -> &[AppName] {
        &self.deployed
    }

    pub fn is_deployed(&self, name: &AppName) -> bool {
        self.deployed.contains(name)
    }

    fn mark_deployed(&mut self, name: AppName) {
        debug_assert!(!self.is_deployed(&name));
        self.deployed.push(name);
    }
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    /// No service among the remaining ones can ever become eligible.
    #[error("dependency cycle: none of the remaining services can be deployed ({})", format_names(remaining))]
    CyclicDependency { remaining: Vec<AppName> },

    /// A `depends_on` entry names a service the template does not declare.
    #[error("service {service} depends on undeclared service {dependency}")]
    UnresolvableService {
        service: AppName,
        dependency: AppName,
    },

    /// A service rollout failed; the remaining schedule is abandoned.
    /// Services already deployed stay deployed.
    #[error("deployment of {service} failed: {source}")]
    Deploy {
        service: AppName,
        source: DeployError,
    },
}

fn format_names(names: &[AppName]) -> String {
    names
        .iter()
        .map(AppName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Deploy every service of the template in dependency order.
///
/// Each pass scans services in declared order and deploys those whose
/// dependencies are all deployed, one at a time — declared order is the
/// tie-break, and there is deliberately no parallel fan-out. A pass that
/// deploys nothing fails instead of spinning forever.
pub async fn run<D>(template: &Template, deployer: &D) -> Result<DeploymentState, ScheduleError>
where
    D: ServiceDeployer + ?Sized,
{
    // Undeclared dependencies can never be satisfied; reject them before
    // touching the platform.
    for (name, spec) in template.services() {
        for dependency in &spec.depends_on {
            if !template.contains(dependency) {
                return Err(ScheduleError::UnresolvableService {
                    service: name.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
    }

    let mut state = DeploymentState::default();

    while state.deployed().len() < template.len() {
        let mut progressed = false;

        for (name, spec) in template.services() {
            if state.is_deployed(name) {
                continue;
            }
            if !spec.depends_on.iter().all(|dep| state.is_deployed(dep)) {
                continue;
            }

            tracing::info!(service = %name, "deploying service");
            deployer
                .deploy(name, spec)
                .await
                .map_err(|source| ScheduleError::Deploy {
                    service: name.clone(),
                    source,
                })?;

            state.mark_deployed(name.clone());
            progressed = true;
        }

        if !progressed {
            let remaining = template
                .services()
                .filter(|(name, _)| !state.is_deployed(name))
                .map(|(name, _)| name.clone())
                .collect();
            return Err(ScheduleError::CyclicDependency { remaining });
        }
    }

    Ok(state)
}
