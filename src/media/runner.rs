use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{PackError, Result};
use super::commands::EncoderCommand;

/// Captured result of a subprocess that ran to completion.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Seam between command construction and process execution.
///
/// Spawn failures and timeouts surface as errors (they abort the operation);
/// a process that ran but exited non-zero is reported through the output so
/// callers can decide between fallback and abort.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &EncoderCommand, time_limit: Duration) -> Result<ProcessOutput>;
}

/// Runner backed by real subprocesses.
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &EncoderCommand, time_limit: Duration) -> Result<ProcessOutput> {
        debug!(
            "Executing {}: {} {:?}",
            command.description, command.binary_path, command.args
        );

        let mut cmd = Command::new(&command.binary_path);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match timeout(time_limit, cmd.output()).await {
            Ok(spawned) => spawned.map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    PackError::EncoderMissing(command.binary_path.clone())
                }
                _ => PackError::Media(format!(
                    "Failed to execute {}: {}",
                    command.binary_path, e
                )),
            })?,
            Err(_) => {
                warn!(
                    "{} timed out after {}s",
                    command.description,
                    time_limit.as_secs()
                );
                return Err(PackError::EncodeTimeout(time_limit.as_secs()));
            }
        };

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Factory for creating command runner instances
pub struct RunnerFactory;

impl RunnerFactory {
    pub fn create_runner() -> Box<dyn CommandRunner> {
        Box::new(SystemRunner)
    }
}
