use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessFailure {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("failed waiting on {command}: {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command} {}", exit_detail(.code))]
    Exit {
        command: String,
        code: Option<i32>,
        stderr: Option<Vec<u8>>,
    },
}

impl ProcessFailure {
    pub fn command(&self) -> &str {
        match self {
            Self::Spawn { command, .. } | Self::Wait { command, .. } | Self::Exit { command, .. } => {
                command
            }
        }
    }

    /// Error-stream bytes recorded for a child that ran and exited non-zero.
    pub fn stderr(&self) -> Option<&[u8]> {
        match self {
            Self::Exit {
                stderr: Some(stderr),
                ..
            } => Some(stderr),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exit { code, .. } => *code,
            _ => None,
        }
    }
}

fn exit_detail(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

/// Display string for logs and end users, with recorded stderr appended.
pub fn describe_failure(failure: &ProcessFailure) -> String {
    match failure.stderr() {
        Some(stderr) => format!(
            "{failure} (output: {:?})",
            String::from_utf8_lossy(stderr)
        ),
        None => failure.to_string(),
    }
}
