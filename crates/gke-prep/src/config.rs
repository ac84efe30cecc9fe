use anyhow::Context;
use gke_deployer::{DeployerSettings, Location};
use serde::Deserialize;
use std::path::Path;
use system_utils::path::expand_tilde;

use crate::cli::Overrides;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PrepConfig {
    pub(crate) project: Option<String>,
    pub(crate) environment: Option<String>,
    pub(crate) gcp_service_account: Option<String>,
    pub(crate) gcp_ssh_key_ignored: Option<bool>,
    pub(crate) gcloud_bin: Option<String>,
    pub(crate) home_dir: Option<String>,
    pub(crate) cluster: Option<ClusterConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ClusterConfig {
    pub(crate) name: Option<String>,
    pub(crate) region: Option<String>,
    pub(crate) zone: Option<String>,
}

#[derive(Debug)]
pub(crate) struct RunConfig {
    pub(crate) project: String,
    pub(crate) settings: DeployerSettings,
    pub(crate) cluster: ClusterConfig,
}

pub(crate) fn load_prep_config(path: &Path) -> anyhow::Result<PrepConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: PrepConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(config)
}

/// Flags win over file values; file values win over defaults.
pub(crate) fn resolve_run_config(
    config: PrepConfig,
    overrides: &Overrides,
) -> anyhow::Result<RunConfig> {
    let project = overrides
        .project
        .clone()
        .or(config.project)
        .unwrap_or_default();
    if project.trim().is_empty() {
        anyhow::bail!("project must be set with --project or in the config file");
    }

    let mut settings = DeployerSettings::default();
    if let Some(environment) = overrides.environment.clone().or(config.environment) {
        settings.environment = environment;
    }
    if let Some(key_file) = overrides
        .gcp_service_account
        .clone()
        .or(config.gcp_service_account)
    {
        settings.gcp_service_account = key_file;
    }
    settings.gcp_ssh_key_ignored =
        overrides.ignore_gcp_ssh_key || config.gcp_ssh_key_ignored.unwrap_or(false);
    if let Some(binary) = overrides.gcloud_bin.clone().or(config.gcloud_bin) {
        if binary.trim().is_empty() {
            anyhow::bail!("gcloud_bin cannot be empty");
        }
        settings.gcloud_bin = binary;
    }
    if let Some(home) = overrides.home_dir.as_deref().or(config.home_dir.as_deref()) {
        settings.home_dir = Some(expand_tilde(home));
    }

    Ok(RunConfig {
        project,
        settings,
        cluster: config.cluster.unwrap_or_default(),
    })
}

pub(crate) fn resolve_location(
    region: Option<String>,
    zone: Option<String>,
) -> anyhow::Result<Location> {
    match (region, zone) {
        (Some(region), None) => Ok(Location::Region(region)),
        (None, Some(zone)) => Ok(Location::Zone(zone)),
        (Some(_), Some(_)) => anyhow::bail!("set only one of region or zone"),
        (None, None) => anyhow::bail!("cluster location needs a region or a zone"),
    }
}
