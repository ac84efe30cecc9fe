use std::fmt;
use std::io;
use std::path::PathBuf;

use system_utils::{describe_failure, ContextError, ProcessFailure};
use thiserror::Error;

/// Preparation step a [`DeployerError`] was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareStep {
    ResolveEndpoint,
    ConfigureEnvironment,
    ConfigureProject,
    ActivateCredentials,
    VerifyKeys,
}

impl fmt::Display for PrepareStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResolveEndpoint => "resolve endpoint",
            Self::ConfigureEnvironment => "configure environment",
            Self::ConfigureProject => "configure project",
            Self::ActivateCredentials => "activate credentials",
            Self::VerifyKeys => "verify ssh keys",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum DeployerError {
    #[error("--environment must be one of {{test,staging,staging2,prod}} or match {pattern}, found {value:?}")]
    InvalidEnvironment {
        value: String,
        pattern: &'static str,
    },

    #[error("could not set {name}={value}")]
    EnvironmentSetupFailed {
        name: String,
        value: String,
        #[source]
        source: ContextError,
    },

    #[error("failed to set project {project}")]
    ProjectConfigFailed {
        project: String,
        #[source]
        source: ProcessFailure,
    },

    #[error("failed to activate service account with key file {key_file}")]
    ServiceAccountActivationFailed {
        key_file: String,
        #[source]
        source: ProcessFailure,
    },

    #[error("cannot resolve the home directory holding ~/.ssh")]
    HomeNotFound,

    #[error("ssh key {} is missing", .path.display())]
    SshKeyMissing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error executing get-credentials for cluster {cluster}")]
    GetCredentialsFailed {
        cluster: String,
        #[source]
        source: ProcessFailure,
    },

    #[error("failed to look up project number for {project}")]
    ProjectNumberLookupFailed {
        project: String,
        #[source]
        source: ProcessFailure,
    },

    #[error("gcloud returned an empty project number for {project}")]
    EmptyProjectNumber { project: String },

    #[error("{binary} cannot be run")]
    ToolUnavailable {
        binary: String,
        #[source]
        source: ProcessFailure,
    },
}

impl DeployerError {
    pub fn prepare_step(&self) -> Option<PrepareStep> {
        match self {
            Self::InvalidEnvironment { .. } => Some(PrepareStep::ResolveEndpoint),
            Self::EnvironmentSetupFailed { .. } => Some(PrepareStep::ConfigureEnvironment),
            Self::ProjectConfigFailed { .. } => Some(PrepareStep::ConfigureProject),
            Self::ServiceAccountActivationFailed { .. } => Some(PrepareStep::ActivateCredentials),
            Self::HomeNotFound | Self::SshKeyMissing { .. } => Some(PrepareStep::VerifyKeys),
            Self::GetCredentialsFailed { .. }
            | Self::ProjectNumberLookupFailed { .. }
            | Self::EmptyProjectNumber { .. }
            | Self::ToolUnavailable { .. } => None,
        }
    }

    pub fn process_failure(&self) -> Option<&ProcessFailure> {
        match self {
            Self::ProjectConfigFailed { source, .. }
            | Self::ServiceAccountActivationFailed { source, .. }
            | Self::GetCredentialsFailed { source, .. }
            | Self::ProjectNumberLookupFailed { source, .. }
            | Self::ToolUnavailable { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Full message including the cause, with recorded stderr for failed commands.
    pub fn describe(&self) -> String {
        if let Some(failure) = self.process_failure() {
            return format!("{self}: {}", describe_failure(failure));
        }
        match self {
            Self::EnvironmentSetupFailed { source, .. } => format!("{self}: {source}"),
            Self::SshKeyMissing { source, .. } => format!("{self}: {source}"),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_appends_recorded_stderr() {
        let err = DeployerError::ProjectConfigFailed {
            project: "demo-proj".to_string(),
            source: ProcessFailure::Exit {
                command: "gcloud config set project demo-proj".to_string(),
                code: Some(1),
                stderr: Some(b"permission denied".to_vec()),
            },
        };
        assert_eq!(err.prepare_step(), Some(PrepareStep::ConfigureProject));
        assert_eq!(
            err.describe(),
            "failed to set project demo-proj: gcloud config set project demo-proj exited with status 1 (output: \"permission denied\")"
        );
    }

    #[test]
    fn describe_includes_io_cause_for_missing_key() {
        let err = DeployerError::SshKeyMissing {
            path: PathBuf::from("/home/ci/.ssh/google_compute_engine.pub"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.describe(),
            "ssh key /home/ci/.ssh/google_compute_engine.pub is missing: not found"
        );
        assert_eq!(err.prepare_step(), Some(PrepareStep::VerifyKeys));
    }

    #[test]
    fn credential_errors_are_not_preparation_steps() {
        let err = DeployerError::EmptyProjectNumber {
            project: "demo".to_string(),
        };
        assert_eq!(err.prepare_step(), None);
        assert_eq!(err.describe(), err.to_string());
    }
}
