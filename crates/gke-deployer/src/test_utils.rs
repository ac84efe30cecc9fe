use std::fs;
use std::sync::Mutex;

use async_trait::async_trait;
use system_utils::{
    Captured, CommandRunner, Invocation, OutputPolicy, ProcessFailure, RunOutcome, ToolContext,
};
use tempfile::TempDir;

use crate::ssh_keys::key_paths;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub(crate) argv: Vec<String>,
    pub(crate) policy: OutputPolicy,
    pub(crate) context: ToolContext,
}

struct Script {
    arg: String,
    stdout: String,
    stderr: String,
    fail: bool,
}

/// Fake runner that records every invocation and answers from a script
/// keyed on an argument the invocation must contain.
#[derive(Default)]
pub(crate) struct RecordingRunner {
    calls: Mutex<Vec<RecordedCall>>,
    scripts: Vec<Script>,
}

impl RecordingRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_on(mut self, arg: &str, stderr: &str) -> Self {
        self.scripts.push(Script {
            arg: arg.to_string(),
            stdout: String::new(),
            stderr: stderr.to_string(),
            fail: true,
        });
        self
    }

    pub(crate) fn respond_on(mut self, arg: &str, stdout: &str) -> Self {
        self.scripts.push(Script {
            arg: arg.to_string(),
            stdout: stdout.to_string(),
            stderr: String::new(),
            fail: false,
        });
        self
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn argvs(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().map(|call| call.argv).collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        policy: OutputPolicy,
        context: &ToolContext,
    ) -> RunOutcome {
        let mut argv = vec![invocation.program().to_string()];
        argv.extend(invocation.argv().iter().cloned());
        let script = self
            .scripts
            .iter()
            .find(|script| argv.iter().any(|arg| arg == &script.arg));
        self.calls.lock().expect("calls lock").push(RecordedCall {
            argv,
            policy,
            context: context.clone(),
        });

        let (stdout, stderr, fail) = match script {
            Some(script) => (script.stdout.as_str(), script.stderr.as_str(), script.fail),
            None => ("", "", false),
        };
        let capturing = policy == OutputPolicy::CaptureAndForward;
        let captured = capturing.then(|| Captured {
            combined: [stdout.as_bytes(), stderr.as_bytes()].concat(),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        });
        if fail {
            let failure = ProcessFailure::Exit {
                command: invocation.to_string(),
                code: Some(1),
                stderr: capturing.then(|| stderr.as_bytes().to_vec()),
            };
            RunOutcome::failed(captured, failure)
        } else {
            RunOutcome::succeeded(captured)
        }
    }
}

pub(crate) fn home_with_keys(private: bool, public: bool) -> TempDir {
    let home = tempfile::tempdir().expect("temp home");
    fs::create_dir_all(home.path().join(".ssh")).expect("create .ssh");
    let (private_path, public_path) = key_paths(home.path());
    if private {
        fs::write(private_path, "private").expect("write private key");
    }
    if public {
        fs::write(public_path, "ssh-ed25519 AAAA test").expect("write public key");
    }
    home
}
