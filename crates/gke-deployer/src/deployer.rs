use std::path::PathBuf;

use system_utils::{run_with_no_output, CommandRunner, SystemRunner, ToolContext};

use crate::error::DeployerError;
use crate::gcloud::{Gcloud, DEFAULT_GCLOUD};
use crate::prepare::PrepareState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployerSettings {
    /// `test`, `staging`, `staging2`, `prod`, or a literal endpoint URL.
    pub environment: String,
    /// Service-account key file; empty means keep the active account.
    pub gcp_service_account: String,
    pub gcp_ssh_key_ignored: bool,
    pub gcloud_bin: String,
    /// Directory holding `.ssh/google_compute_engine`.
    pub home_dir: Option<PathBuf>,
}

impl Default for DeployerSettings {
    fn default() -> Self {
        Self {
            environment: "prod".to_string(),
            gcp_service_account: String::new(),
            gcp_ssh_key_ignored: false,
            gcloud_bin: DEFAULT_GCLOUD.to_string(),
            home_dir: system_utils::path::home_dir(),
        }
    }
}

pub struct Deployer<R = SystemRunner> {
    pub(crate) runner: R,
    pub(crate) settings: DeployerSettings,
    pub(crate) gcloud: Gcloud,
    pub(crate) context: ToolContext,
    pub(crate) state: PrepareState,
}

impl Deployer<SystemRunner> {
    pub fn system(settings: DeployerSettings) -> Self {
        Self::new(SystemRunner, settings)
    }
}

impl<R: CommandRunner> Deployer<R> {
    pub fn new(runner: R, settings: DeployerSettings) -> Self {
        let gcloud = Gcloud::new(settings.gcloud_bin.as_str());
        Self {
            runner,
            settings,
            gcloud,
            context: ToolContext::new(),
            state: PrepareState::NotStarted,
        }
    }

    pub fn settings(&self) -> &DeployerSettings {
        &self.settings
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Context applied to every `gcloud` call; filled in by preparation.
    pub fn tool_context(&self) -> &ToolContext {
        &self.context
    }

    pub fn state(&self) -> PrepareState {
        self.state
    }

    /// Confirms the wrapped tool starts and exits cleanly, discarding its output.
    pub async fn verify_tool(&self) -> Result<(), DeployerError> {
        run_with_no_output(&self.runner, &self.gcloud.version(), &self.context)
            .await
            .map_err(|source| DeployerError::ToolUnavailable {
                binary: self.gcloud.binary().to_string(),
                source,
            })
    }
}
