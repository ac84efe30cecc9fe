use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gke-prep", version, about = "Prepare gcloud for GKE end-to-end runs")]
pub(crate) struct Args {
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    pub(crate) log_to_stderr: bool,
    #[command(flatten)]
    pub(crate) overrides: Overrides,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(clap::Args, Debug, Default)]
pub(crate) struct Overrides {
    #[arg(long)]
    pub(crate) project: Option<String>,
    /// test, staging, staging2, prod, or an endpoint URL
    #[arg(long)]
    pub(crate) environment: Option<String>,
    #[arg(long)]
    pub(crate) gcp_service_account: Option<String>,
    #[arg(long, default_value_t = false)]
    pub(crate) ignore_gcp_ssh_key: bool,
    #[arg(long)]
    pub(crate) gcloud_bin: Option<String>,
    #[arg(long)]
    pub(crate) home_dir: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Configure gcloud for the environment and project
    Prepare {
        #[arg(long, default_value_t = false)]
        skip_tool_check: bool,
    },
    /// Write cluster credentials into the gcloud-managed kubeconfig
    GetCredentials {
        #[arg(long)]
        cluster: Option<String>,
        #[arg(long, conflicts_with = "zone")]
        region: Option<String>,
        #[arg(long)]
        zone: Option<String>,
        /// Run preparation first so the endpoint override applies
        #[arg(long, default_value_t = false)]
        prepare: bool,
    },
    /// Print the numeric id of the project
    ProjectNumber,
}
