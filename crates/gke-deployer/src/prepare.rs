use system_utils::{run_with_output, CommandRunner, ToolContext};

use crate::deployer::Deployer;
use crate::environment::resolve_endpoint;
use crate::error::DeployerError;
use crate::ssh_keys::verify_ssh_keys;

pub const PRINT_TRACEBACKS_VAR: &str = "CLOUDSDK_CORE_PRINT_UNHANDLED_TRACEBACKS";
pub const ENDPOINT_OVERRIDE_VAR: &str = "CLOUDSDK_API_ENDPOINT_OVERRIDES_CONTAINER";

/// Last preparation step that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareState {
    NotStarted,
    EndpointResolved,
    EnvironmentConfigured,
    ProjectConfigured,
    CredentialsActivated,
    KeysVerified,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedEnvironment {
    pub endpoint: String,
    pub context: ToolContext,
}

impl<R: CommandRunner> Deployer<R> {
    /// Points `gcloud` at the configured environment and project, activates
    /// the service account and checks the GCE ssh keys.
    ///
    /// Stops at the first failing step. Steps that already ran are not undone;
    /// running the whole sequence again is safe.
    pub async fn prepare_gcp_if_needed(
        &mut self,
        project_id: &str,
    ) -> Result<PreparedEnvironment, DeployerError> {
        self.state = PrepareState::NotStarted;

        let endpoint = resolve_endpoint(&self.settings.environment)?;
        self.state = PrepareState::EndpointResolved;

        self.context = tool_context_for(&endpoint)?;
        self.state = PrepareState::EnvironmentConfigured;

        run_with_output(
            &self.runner,
            &self.gcloud.config_set_project(project_id),
            &self.context,
        )
        .await
        .map_err(|source| DeployerError::ProjectConfigFailed {
            project: project_id.to_string(),
            source,
        })?;
        self.state = PrepareState::ProjectConfigured;

        // gcloud creds may have changed
        self.activate_service_account().await?;
        self.state = PrepareState::CredentialsActivated;

        if !self.settings.gcp_ssh_key_ignored {
            tracing::debug!("checking existence of GCP ssh keys");
            let home = self
                .settings
                .home_dir
                .as_deref()
                .ok_or(DeployerError::HomeNotFound)?;
            verify_ssh_keys(home).await?;
        }
        self.state = PrepareState::KeysVerified;

        self.state = PrepareState::Done;
        Ok(PreparedEnvironment {
            endpoint,
            context: self.context.clone(),
        })
    }

    async fn activate_service_account(&self) -> Result<(), DeployerError> {
        let key_file = self.settings.gcp_service_account.as_str();
        if key_file.is_empty() {
            return Ok(());
        }
        run_with_output(
            &self.runner,
            &self.gcloud.activate_service_account(key_file),
            &self.context,
        )
        .await
        .map_err(|source| DeployerError::ServiceAccountActivationFailed {
            key_file: key_file.to_string(),
            source,
        })
    }
}

fn tool_context_for(endpoint: &str) -> Result<ToolContext, DeployerError> {
    let mut context = ToolContext::new();
    for (name, value) in [(PRINT_TRACEBACKS_VAR, "1"), (ENDPOINT_OVERRIDE_VAR, endpoint)] {
        context
            .set(name, value)
            .map_err(|source| DeployerError::EnvironmentSetupFailed {
                name: name.to_string(),
                value: value.to_string(),
                source,
            })?;
    }
    Ok(context)
}
