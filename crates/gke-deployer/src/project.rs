use system_utils::{CommandRunner, OutputPolicy};

use crate::deployer::Deployer;
use crate::error::DeployerError;

impl<R: CommandRunner> Deployer<R> {
    pub async fn project_number(&self, project: &str) -> Result<String, DeployerError> {
        let invocation = self.gcloud.describe_project_number(project);
        let captured = self
            .runner
            .run(&invocation, OutputPolicy::CaptureAndForward, &self.context)
            .await
            .into_result()
            .map_err(|source| DeployerError::ProjectNumberLookupFailed {
                project: project.to_string(),
                source,
            })?;
        let number = captured
            .map(|captured| captured.stdout_lossy().trim().to_string())
            .unwrap_or_default();
        if number.is_empty() {
            return Err(DeployerError::EmptyProjectNumber {
                project: project.to_string(),
            });
        }
        Ok(number)
    }
}

#[cfg(test)]
mod tests {
    use crate::deployer::{Deployer, DeployerSettings};
    use crate::error::DeployerError;
    use crate::test_utils::RecordingRunner;
    use system_utils::OutputPolicy;

    #[tokio::test]
    async fn returns_trimmed_stdout() {
        let runner = RecordingRunner::new().respond_on("describe", "123456789012\n");
        let deployer = Deployer::new(runner, DeployerSettings::default());

        let number = deployer.project_number("demo-proj").await.expect("number");

        assert_eq!(number, "123456789012");
        let calls = deployer.runner().calls();
        assert_eq!(
            calls[0].argv,
            [
                "gcloud",
                "projects",
                "describe",
                "demo-proj",
                "--format=value(projectNumber)"
            ]
        );
        assert_eq!(calls[0].policy, OutputPolicy::CaptureAndForward);
    }

    #[tokio::test]
    async fn empty_output_is_an_error() {
        let deployer = Deployer::new(RecordingRunner::new(), DeployerSettings::default());
        let err = deployer.project_number("demo").await.unwrap_err();
        assert!(matches!(err, DeployerError::EmptyProjectNumber { .. }));
    }

    #[tokio::test]
    async fn failure_carries_captured_stderr() {
        let runner = RecordingRunner::new().fail_on("describe", "permission denied");
        let deployer = Deployer::new(runner, DeployerSettings::default());
        let err = deployer.project_number("demo").await.unwrap_err();
        let message = err.describe();
        assert!(message.contains("(output: \"permission denied\")"), "{message}");
        assert!(message.starts_with("failed to look up project number for demo: "));
    }
}
