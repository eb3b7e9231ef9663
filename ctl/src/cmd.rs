// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Execution of external commands

use async_trait::async_trait;
use std::fmt::Display;
use std::process::Stdio;
#[allow(unused)]
use tracing::{debug, error, warn};

use crate::errors::CtlError;

/// An external command: program, arguments and extra environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    argv: Vec<String>,
    envs: Vec<(String, String)>,
}

impl Cmd {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            argv: vec![program.into()],
            envs: Vec::new(),
        }
    }
    /// Same as [`Cmd::new`] but prefixed with `sudo` if `sudo` is true
    #[must_use]
    pub fn privileged(program: impl Into<String>, sudo: bool) -> Self {
        if sudo {
            Self::new("sudo").arg(program)
        } else {
            Self::new(program)
        }
    }
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.argv.push(arg.into());
        self
    }
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argv.extend(args.into_iter().map(Into::into));
        self
    }
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }
    #[must_use]
    pub fn envs(&self) -> &[(String, String)] {
        &self.envs
    }
}

impl Display for Cmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.argv.join(" "))
    }
}

/// What an external command returned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmdOutput {
    /// exit code; `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// The contract to run external commands. Implementations block (asynchronously) until the
/// command exits.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command and return its output, whatever its exit status.
    /// Errors are reserved for commands that could not be run at all.
    async fn run(&self, cmd: &Cmd) -> Result<CmdOutput, CtlError>;

    /// Run a command and fail unless it exits successfully
    async fn run_checked(&self, cmd: &Cmd) -> Result<CmdOutput, CtlError> {
        let output = self.run(cmd).await?;
        if output.success() {
            Ok(output)
        } else {
            debug!("Command '{cmd}' exited with {:?}", output.code);
            Err(CtlError::CommandFailed {
                cmd: cmd.to_string(),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

/// A [`CommandRunner`] that spawns processes on the local host
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, cmd: &Cmd) -> Result<CmdOutput, CtlError> {
        let Some((program, args)) = cmd.argv().split_first() else {
            return Err(CtlError::InvalidCall(cmd.to_string(), "empty command"));
        };
        let output = tokio::process::Command::new(program)
            .args(args)
            .envs(cmd.envs().iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                error!("Failed to run '{cmd}': {e}");
                CtlError::Spawn {
                    cmd: cmd.to_string(),
                    reason: e.to_string(),
                }
            })?;
        Ok(CmdOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn build_commands() {
        let cmd = Cmd::privileged("kill", true).arg("42");
        assert_eq!(cmd.to_string(), "sudo kill 42");
        let cmd = Cmd::privileged("kill", false).args(["-0", "42"]).env("A", "b");
        assert_eq!(cmd.argv(), ["kill", "-0", "42"]);
        assert_eq!(cmd.envs(), [("A".to_string(), "b".to_string())]);
    }

    #[tokio::test]
    async fn run_local_commands() {
        let runner = SystemRunner;
        let out = runner
            .run_checked(&Cmd::new("sh").args(["-c", "echo $GREETING"]).env("GREETING", "hi"))
            .await
            .unwrap();
        assert_eq!(out.stdout.trim(), "hi");

        let out = runner.run(&Cmd::new("sh").args(["-c", "exit 3"])).await.unwrap();
        assert_eq!(out.code, Some(3));
        assert!(!out.success());

        let err = runner
            .run_checked(&Cmd::new("sh").args(["-c", "echo oops >&2; exit 1"]))
            .await
            .unwrap_err();
        assert!(
            matches!(err, CtlError::CommandFailed { code: Some(1), ref stderr, .. } if stderr == "oops")
        );

        let err = runner
            .run(&Cmd::new("/nonexistent/binary"))
            .await
            .unwrap_err();
        assert!(matches!(err, CtlError::Spawn { .. }));
    }
}
