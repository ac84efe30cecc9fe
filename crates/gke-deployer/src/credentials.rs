use system_utils::{run_with_output, CommandRunner};

use crate::deployer::Deployer;
use crate::error::DeployerError;
use crate::gcloud::Location;

impl<R: CommandRunner> Deployer<R> {
    /// Has `gcloud` write credentials for `cluster` into its kubeconfig.
    ///
    /// The credentials are not returned; they land in the file `gcloud`
    /// maintains.
    pub async fn get_cluster_credentials(
        &self,
        project: &str,
        location: &Location,
        cluster: &str,
    ) -> Result<(), DeployerError> {
        let invocation = self.gcloud.get_credentials(project, location, cluster);
        run_with_output(&self.runner, &invocation, &self.context)
            .await
            .map_err(|source| DeployerError::GetCredentialsFailed {
                cluster: cluster.to_string(),
                source,
            })
    }
}
