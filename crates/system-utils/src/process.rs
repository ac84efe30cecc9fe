use std::fmt;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::context::ToolContext;
use crate::failure::ProcessFailure;
use crate::stream::tee_stream;

/// A program plus its ordered arguments. Never passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn argv(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str));
        f.write_str(&shell_words::join(words))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPolicy {
    Discard,
    Inherit,
    CaptureAndForward,
}

/// Output recorded under [`OutputPolicy::CaptureAndForward`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    /// stdout and stderr interleaved in the order they were read. The two
    /// pipes are drained concurrently, so the order is only exact for writes
    /// separated in time.
    pub combined: Vec<u8>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Captured {
    pub fn combined_lossy(&self) -> String {
        String::from_utf8_lossy(&self.combined).to_string()
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }
}

#[derive(Debug)]
pub struct RunOutcome {
    pub captured: Option<Captured>,
    pub failure: Option<ProcessFailure>,
}

impl RunOutcome {
    pub fn succeeded(captured: Option<Captured>) -> Self {
        Self {
            captured,
            failure: None,
        }
    }

    pub fn failed(captured: Option<Captured>, failure: ProcessFailure) -> Self {
        Self {
            captured,
            failure: Some(failure),
        }
    }

    pub fn success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn into_result(self) -> Result<Option<Captured>, ProcessFailure> {
        match self.failure {
            Some(failure) => Err(failure),
            None => Ok(self.captured),
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        invocation: &Invocation,
        policy: OutputPolicy,
        context: &ToolContext,
    ) -> RunOutcome;
}

/// Runs invocations as real child processes of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        policy: OutputPolicy,
        context: &ToolContext,
    ) -> RunOutcome {
        tracing::debug!(command = %invocation, policy = ?policy, "running command");
        match policy {
            OutputPolicy::Discard => {
                run_uncaptured(invocation, context, Stdio::null(), Stdio::null()).await
            }
            OutputPolicy::Inherit => {
                run_uncaptured(invocation, context, Stdio::inherit(), Stdio::inherit()).await
            }
            OutputPolicy::CaptureAndForward => run_captured(invocation, context).await,
        }
    }
}

fn build_command(invocation: &Invocation, context: &ToolContext) -> Command {
    let mut cmd = Command::new(invocation.program());
    cmd.args(invocation.argv());
    cmd.envs(context.vars());
    cmd.stdin(Stdio::null());
    cmd
}

fn spawn(cmd: &mut Command, invocation: &Invocation) -> Result<Child, ProcessFailure> {
    cmd.spawn().map_err(|source| ProcessFailure::Spawn {
        command: invocation.to_string(),
        source,
    })
}

fn exit_failure(
    invocation: &Invocation,
    status: ExitStatus,
    stderr: Option<Vec<u8>>,
) -> Option<ProcessFailure> {
    if status.success() {
        return None;
    }
    Some(ProcessFailure::Exit {
        command: invocation.to_string(),
        code: status.code(),
        stderr,
    })
}

fn wait_failure(invocation: &Invocation, source: io::Error) -> ProcessFailure {
    ProcessFailure::Wait {
        command: invocation.to_string(),
        source,
    }
}

async fn run_uncaptured(
    invocation: &Invocation,
    context: &ToolContext,
    stdout: Stdio,
    stderr: Stdio,
) -> RunOutcome {
    let mut cmd = build_command(invocation, context);
    cmd.stdout(stdout).stderr(stderr);
    let mut child = match spawn(&mut cmd, invocation) {
        Ok(child) => child,
        Err(failure) => return RunOutcome::failed(None, failure),
    };
    match child.wait().await {
        Ok(status) => match exit_failure(invocation, status, None) {
            Some(failure) => RunOutcome::failed(None, failure),
            None => RunOutcome::succeeded(None),
        },
        Err(source) => RunOutcome::failed(None, wait_failure(invocation, source)),
    }
}

async fn run_captured(invocation: &Invocation, context: &ToolContext) -> RunOutcome {
    let mut cmd = build_command(invocation, context);
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = match spawn(&mut cmd, invocation) {
        Ok(child) => child,
        Err(failure) => return RunOutcome::failed(Some(Captured::default()), failure),
    };

    let combined = Arc::new(Mutex::new(Vec::new()));
    let stdout_task = child.stdout.take().map(|pipe| {
        tokio::spawn(tee_stream(pipe, tokio::io::stdout(), Arc::clone(&combined)))
    });
    let stderr_task = child.stderr.take().map(|pipe| {
        tokio::spawn(tee_stream(pipe, tokio::io::stderr(), Arc::clone(&combined)))
    });

    let status = child.wait().await;
    let stdout = join_tee(stdout_task).await;
    let stderr = join_tee(stderr_task).await;

    let mut captured = Captured::default();
    let mut stream_error = None;
    match stdout {
        Ok(bytes) => captured.stdout = bytes,
        Err(err) => stream_error = Some(err),
    }
    match stderr {
        Ok(bytes) => captured.stderr = bytes,
        Err(err) => stream_error = stream_error.or(Some(err)),
    }
    captured.combined = std::mem::take(&mut *combined.lock().await);

    let status = match status {
        Ok(status) => status,
        Err(source) => return RunOutcome::failed(Some(captured), wait_failure(invocation, source)),
    };
    if let Some(failure) = exit_failure(invocation, status, Some(captured.stderr.clone())) {
        return RunOutcome::failed(Some(captured), failure);
    }
    match stream_error {
        Some(source) => RunOutcome::failed(Some(captured), wait_failure(invocation, source)),
        None => RunOutcome::succeeded(Some(captured)),
    }
}

async fn join_tee(task: Option<JoinHandle<io::Result<Vec<u8>>>>) -> io::Result<Vec<u8>> {
    match task {
        Some(task) => task.await.map_err(io::Error::other)?,
        None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "missing child pipe")),
    }
}

/// Runs with both streams discarded.
pub async fn run_with_no_output<R: CommandRunner + ?Sized>(
    runner: &R,
    invocation: &Invocation,
    context: &ToolContext,
) -> Result<(), ProcessFailure> {
    runner
        .run(invocation, OutputPolicy::Discard, context)
        .await
        .into_result()
        .map(|_| ())
}

/// Runs with both streams connected to the current process.
pub async fn run_with_output<R: CommandRunner + ?Sized>(
    runner: &R,
    invocation: &Invocation,
    context: &ToolContext,
) -> Result<(), ProcessFailure> {
    runner
        .run(invocation, OutputPolicy::Inherit, context)
        .await
        .into_result()
        .map(|_| ())
}

/// Runs with output forwarded and recorded. The combined output is returned
/// whether or not the command succeeded.
pub async fn run_with_output_and_return<R: CommandRunner + ?Sized>(
    runner: &R,
    invocation: &Invocation,
    context: &ToolContext,
) -> (String, Result<(), ProcessFailure>) {
    let outcome = runner
        .run(invocation, OutputPolicy::CaptureAndForward, context)
        .await;
    let output = outcome
        .captured
        .as_ref()
        .map(Captured::combined_lossy)
        .unwrap_or_default();
    let result = match outcome.failure {
        Some(failure) => Err(failure),
        None => Ok(()),
    };
    (output, result)
}
