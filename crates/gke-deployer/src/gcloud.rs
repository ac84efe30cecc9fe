use std::fmt;

use system_utils::Invocation;

pub const DEFAULT_GCLOUD: &str = "gcloud";

/// Where a cluster lives; rendered as the matching `gcloud` location flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Region(String),
    Zone(String),
}

impl Location {
    pub fn flag(&self) -> String {
        match self {
            Self::Region(region) => format!("--region={region}"),
            Self::Zone(zone) => format!("--zone={zone}"),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region(region) => write!(f, "region {region}"),
            Self::Zone(zone) => write!(f, "zone {zone}"),
        }
    }
}

/// Prefixes `args` with the `container` command group.
pub fn container_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    std::iter::once("container".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gcloud {
    binary: String,
}

impl Default for Gcloud {
    fn default() -> Self {
        Self::new(DEFAULT_GCLOUD)
    }
}

impl Gcloud {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn command(&self) -> Invocation {
        Invocation::new(self.binary.as_str())
    }

    pub fn version(&self) -> Invocation {
        self.command().arg("version")
    }

    pub fn config_set_project(&self, project: &str) -> Invocation {
        self.command().args(["config", "set", "project", project])
    }

    pub fn activate_service_account(&self, key_file: &str) -> Invocation {
        self.command()
            .args(["auth", "activate-service-account"])
            .arg(format!("--key-file={key_file}"))
    }

    pub fn get_credentials(&self, project: &str, location: &Location, cluster: &str) -> Invocation {
        self.command().args(container_args([
            "clusters".to_string(),
            "get-credentials".to_string(),
            cluster.to_string(),
            format!("--project={project}"),
            location.flag(),
        ]))
    }

    pub fn describe_project_number(&self, project: &str) -> Invocation {
        self.command()
            .args(["projects", "describe", project])
            .arg("--format=value(projectNumber)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(invocation: &Invocation) -> Vec<&str> {
        std::iter::once(invocation.program())
            .chain(invocation.argv().iter().map(String::as_str))
            .collect()
    }

    #[test]
    fn config_set_project_argv() {
        let invocation = Gcloud::default().config_set_project("demo-proj");
        assert_eq!(argv(&invocation), ["gcloud", "config", "set", "project", "demo-proj"]);
    }

    #[test]
    fn activate_service_account_uses_key_file_flag() {
        let invocation = Gcloud::default().activate_service_account("/secrets/sa key.json");
        assert_eq!(
            argv(&invocation),
            [
                "gcloud",
                "auth",
                "activate-service-account",
                "--key-file=/secrets/sa key.json"
            ]
        );
    }

    #[test]
    fn get_credentials_keeps_flag_order() {
        let invocation = Gcloud::new("/opt/google-cloud-sdk/bin/gcloud").get_credentials(
            "demo-proj",
            &Location::Zone("us-central1-c".to_string()),
            "e2e-1",
        );
        assert_eq!(
            argv(&invocation),
            [
                "/opt/google-cloud-sdk/bin/gcloud",
                "container",
                "clusters",
                "get-credentials",
                "e2e-1",
                "--project=demo-proj",
                "--zone=us-central1-c"
            ]
        );
    }

    #[test]
    fn region_flag() {
        assert_eq!(
            Location::Region("europe-west1".to_string()).flag(),
            "--region=europe-west1"
        );
    }

    #[test]
    fn container_args_prefixes_group() {
        assert_eq!(
            container_args(["clusters", "list"]),
            ["container", "clusters", "list"]
        );
    }
}
