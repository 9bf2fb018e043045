// ABOUTME: Per-service rollout as typestate transitions against the platform.
// ABOUTME: register -> configure -> release; each step consumes self and returns the next state.

use std::time::Duration;

use crate::platform::{AppConfig, AppStatus, EnvVar, PlatformError, PlatformOps};
use crate::template::ServiceSpec;
use crate::types::AppName;

use super::error::DeployError;
use super::poller::{PollSettings, wait_until_ready};
use super::scheduler::ServiceDeployer;
use super::state::{Configured, Declared, Registered, Released};
use async_trait::async_trait;

/// The platform needs a moment after readiness before the build verdict is
/// reliable; half a second is enough in practice.
const BUILD_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// One service's rollout, parameterized by its current state.
#[derive(Debug)]
pub struct Rollout<'a, S> {
    name: &'a AppName,
    spec: &'a ServiceSpec,
    state: S,
}

impl<'a, S> Rollout<'a, S> {
    pub fn service(&self) -> &AppName {
        self.name
    }

    fn transition<T>(self, state: T) -> Rollout<'a, T> {
        Rollout {
            name: self.name,
            spec: self.spec,
            state,
        }
    }

    async fn await_ready<P>(&self, platform: &P, poll: PollSettings) -> Result<AppStatus, DeployError>
    where
        P: PlatformOps + ?Sized,
    {
        wait_until_ready(|| platform.application_status(self.name), poll)
            .await
            .map_err(|source| DeployError::NotReady {
                service: self.name.clone(),
                source,
            })
    }

    fn platform_error(&self, step: &'static str) -> impl FnOnce(PlatformError) -> DeployError + '_ {
        let service = self.name.clone();
        move |source| DeployError::Platform {
            service,
            step,
            source,
        }
    }
}

impl<'a> Rollout<'a, Declared> {
    pub fn new(name: &'a AppName, spec: &'a ServiceSpec) -> Self {
        Rollout {
            name,
            spec,
            state: Declared,
        }
    }

    /// Create the application shell and wait until the platform reports it
    /// ready. Registration is asynchronous on the platform side; configuring
    /// before readiness would race the create.
    ///
    /// # Errors
    ///
    /// An already-existing application is a platform rejection and is
    /// surfaced, not swallowed.
    #[must_use = "rollout state must be used"]
    pub async fn register<P>(
        self,
        platform: &P,
        poll: PollSettings,
    ) -> Result<Rollout<'a, Registered>, DeployError>
    where
        P: PlatformOps + ?Sized,
    {
        platform
            .create_application(self.name, self.spec.has_persistent_data())
            .await
            .map_err(self.platform_error("create"))?;

        self.await_ready(platform, poll).await?;
        Ok(self.transition(Registered))
    }
}

impl<'a> Rollout<'a, Registered> {
    /// Apply the service configuration: volumes, environment, exposure.
    /// Instance count is fixed at 1 for one-click rollouts.
    #[must_use = "rollout state must be used"]
    pub async fn configure<P>(self, platform: &P) -> Result<Rollout<'a, Configured>, DeployError>
    where
        P: PlatformOps + ?Sized,
    {
        let config = AppConfig {
            app_name: self.name.clone(),
            instance_count: 1,
            volumes: self.spec.volumes.clone(),
            env_vars: self
                .spec
                .environment
                .iter()
                .map(|(key, value)| EnvVar {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
            not_expose_as_web_app: self.spec.not_expose_as_web_app,
            container_http_port: self.spec.container_http_port,
        };

        platform
            .update_application(&config)
            .await
            .map_err(self.platform_error("update"))?;

        Ok(self.transition(Configured))
    }
}

impl<'a> Rollout<'a, Configured> {
    /// Trigger the build deployment, wait for readiness, then verify the
    /// build outcome. Ready and build-success are orthogonal signals: a
    /// failed build still reaches "not building".
    #[must_use = "rollout state must be used"]
    pub async fn release<P>(
        self,
        platform: &P,
        poll: PollSettings,
    ) -> Result<Rollout<'a, Released>, DeployError>
    where
        P: PlatformOps + ?Sized,
    {
        platform
            .deploy_build(self.name, &self.spec.build)
            .await
            .map_err(self.platform_error("deploy"))?;

        self.await_ready(platform, poll).await?;
        tokio::time::sleep(BUILD_SETTLE_DELAY).await;

        let status = platform
            .application_status(self.name)
            .await
            .map_err(self.platform_error("status"))?;
        if status.is_build_failed {
            return Err(DeployError::BuildFailed(self.name.clone()));
        }

        Ok(self.transition(Released))
    }
}

/// Platform-backed `ServiceDeployer`: runs the full rollout state machine
/// for one service.
pub struct Executor<'a, P: PlatformOps> {
    platform: &'a P,
    poll: PollSettings,
}

impl<'a, P: PlatformOps> Executor<'a, P> {
    pub fn new(platform: &'a P, poll: PollSettings) -> Self {
        Self { platform, poll }
    }
}

#[async_trait]
impl<P: PlatformOps> ServiceDeployer for Executor<'_, P> {
    async fn deploy(&self, name: &AppName, spec: &ServiceSpec) -> Result<(), DeployError> {
        let declared = Rollout::new(name, spec);
        let registered = declared.register(self.platform, self.poll).await?;
        let configured = registered.configure(self.platform).await?;
        let released = configured.release(self.platform, self.poll).await?;
        tracing::info!(service = %released.service(), "service deployed");
        Ok(())
    }
}
