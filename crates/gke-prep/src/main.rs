mod cli;
mod config;

use crate::cli::{Args, Command};
use crate::config::{load_prep_config, resolve_location, resolve_run_config, PrepConfig};
use clap::Parser;
use gke_deployer::{Deployer, DeployerError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_to_stderr)?;

    let file_config = match args.config.as_ref() {
        Some(path) => load_prep_config(path)?,
        None => PrepConfig::default(),
    };
    let run = resolve_run_config(file_config, &args.overrides)?;
    let mut deployer = Deployer::system(run.settings);

    match args.command {
        Command::Prepare { skip_tool_check } => {
            if !skip_tool_check {
                deployer.verify_tool().await.map_err(report)?;
            }
            let prepared = deployer
                .prepare_gcp_if_needed(&run.project)
                .await
                .map_err(report)?;
            tracing::info!(
                project = %run.project,
                endpoint = %prepared.endpoint,
                "gcloud prepared"
            );
        }
        Command::GetCredentials {
            cluster,
            region,
            zone,
            prepare,
        } => {
            let cluster = cluster.or(run.cluster.name).ok_or_else(|| {
                anyhow::anyhow!("cluster name must be set with --cluster or [cluster].name")
            })?;
            let location = if region.is_some() || zone.is_some() {
                resolve_location(region, zone)?
            } else {
                resolve_location(run.cluster.region, run.cluster.zone)?
            };
            if prepare {
                deployer
                    .prepare_gcp_if_needed(&run.project)
                    .await
                    .map_err(report)?;
            }
            deployer
                .get_cluster_credentials(&run.project, &location, &cluster)
                .await
                .map_err(report)?;
            tracing::info!(cluster = %cluster, location = %location, "cluster credentials written");
        }
        Command::ProjectNumber => {
            let number = deployer.project_number(&run.project).await.map_err(report)?;
            tracing::debug!(project = %run.project, number = %number, "resolved project number");
            println!("{number}");
        }
    }
    Ok(())
}

fn report(err: DeployerError) -> anyhow::Error {
    if let Some(step) = err.prepare_step() {
        tracing::error!(step = %step, "preparation failed");
    }
    if let Some(failure) = err.process_failure() {
        tracing::error!(command = %failure.command(), "gcloud command failed");
    }
    anyhow::anyhow!(err.describe())
}

fn init_tracing(log_to_stderr: bool) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
    );
    if log_to_stderr {
        builder.with_writer(std::io::stderr).init();
    } else {
        builder.init();
    }
    Ok(())
}
