// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Testing utilities for the benchmark runner: fakes standing in for the host and for the
//! control daemon.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use async_trait::async_trait;
use concurrency::Shutdown;
use ctl::{Cmd, CmdOutput, CommandRunner, ControlPlane, CtlCall, CtlError};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::debug;

/// Output of a command that exited with `code`
#[must_use]
pub fn exited(code: i32, stdout: &str) -> CmdOutput {
    CmdOutput {
        code: Some(code),
        stdout: stdout.to_string(),
        stderr: if code == 0 {
            String::new()
        } else {
            format!("exit code {code}")
        },
    }
}

/// Output of a command that succeeded and printed `stdout`
#[must_use]
pub fn ok(stdout: &str) -> CmdOutput {
    exited(0, stdout)
}

struct Rule {
    prefix: String,
    outputs: VecDeque<CmdOutput>,
}

/// A [`CommandRunner`] answering with scripted outputs and recording every command.
///
/// Outputs are scripted per command-line prefix. The first rule whose prefix matches is used;
/// its outputs are consumed in order and the last one repeats forever. Commands matching no
/// rule succeed with an empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<Rule>>,
    history: Mutex<Vec<Cmd>>,
}

impl ScriptedRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `output` to commands starting with `prefix`
    #[must_use]
    pub fn on(self, prefix: &str, output: CmdOutput) -> Self {
        self.on_sequence(prefix, [output])
    }

    /// Answer `outputs` in turn to commands starting with `prefix`, repeating the last one
    #[must_use]
    pub fn on_sequence(self, prefix: &str, outputs: impl IntoIterator<Item = CmdOutput>) -> Self {
        self.rules.lock().unwrap().push(Rule {
            prefix: prefix.to_string(),
            outputs: outputs.into_iter().collect(),
        });
        self
    }

    /// Every command run so far, rendered as a command line
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Every command run so far
    #[must_use]
    pub fn history(&self) -> Vec<Cmd> {
        self.history.lock().unwrap().clone()
    }

    /// How many commands started with `prefix`
    #[must_use]
    pub fn count(&self, prefix: &str) -> usize {
        self.lines().iter().filter(|l| l.starts_with(prefix)).count()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, cmd: &Cmd) -> Result<CmdOutput, CtlError> {
        self.history.lock().unwrap().push(cmd.clone());
        let line = cmd.to_string();
        let mut rules = self.rules.lock().unwrap();
        let Some(rule) = rules.iter_mut().find(|r| line.starts_with(&r.prefix)) else {
            return Ok(ok(""));
        };
        let output = if rule.outputs.len() > 1 {
            rule.outputs.pop_front()
        } else {
            rule.outputs.front().cloned()
        };
        debug!("scripted: {line} -> {:?}", output.as_ref().map(|o| o.code));
        Ok(output.unwrap_or_else(|| ok("")))
    }
}

/// A [`ControlPlane`] that records calls instead of sending them.
///
/// It can inject a failure at the n-th call (1-based) or on calls whose command line contains
/// a pattern, and trigger a [`Shutdown`] once a number of calls were applied.
#[derive(Default)]
pub struct RecordingCtl {
    calls: Mutex<Vec<CtlCall>>,
    fail_at: Option<usize>,
    fail_on: Option<String>,
    shutdown_after: Option<(usize, Shutdown)>,
}

impl RecordingCtl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`-th call (1-based)
    #[must_use]
    pub fn failing_at(mut self, n: usize) -> Self {
        self.fail_at = Some(n);
        self
    }

    /// Fail every call whose rendering contains `pattern`
    #[must_use]
    pub fn failing_on(mut self, pattern: &str) -> Self {
        self.fail_on = Some(pattern.to_string());
        self
    }

    /// Trigger `shutdown` as soon as `n` calls were applied
    #[must_use]
    pub fn with_shutdown_after(mut self, n: usize, shutdown: Shutdown) -> Self {
        self.shutdown_after = Some((n, shutdown));
        self
    }

    /// The calls received so far
    #[must_use]
    pub fn calls(&self) -> Vec<CtlCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The calls received so far, rendered as command lines
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

#[async_trait]
impl ControlPlane for RecordingCtl {
    async fn apply(&self, call: &CtlCall) -> Result<(), CtlError> {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call.clone());
            calls.len()
        };
        let line = call.to_string();
        let failed = self.fail_at == Some(count)
            || self.fail_on.as_ref().is_some_and(|p| line.contains(p.as_str()));
        if let Some((n, shutdown)) = &self.shutdown_after {
            if count >= *n {
                shutdown.trigger();
            }
        }
        if failed {
            return Err(CtlError::CommandFailed {
                cmd: line,
                code: Some(1),
                stderr: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctl::Verb;

    #[tokio::test]
    async fn scripted_outputs() {
        let runner = ScriptedRunner::new()
            .on_sequence("pidof", [ok("42\n"), exited(1, "")])
            .on("sudo kill", exited(1, ""));
        let pidof = Cmd::new("pidof").arg("polycubed");
        assert_eq!(runner.run(&pidof).await.unwrap().stdout, "42\n");
        assert_eq!(runner.run(&pidof).await.unwrap().code, Some(1));
        assert_eq!(runner.run(&pidof).await.unwrap().code, Some(1));
        assert!(runner.run_checked(&Cmd::privileged("kill", true)).await.is_err());
        assert!(runner.run(&Cmd::new("true")).await.unwrap().success());
        assert_eq!(runner.count("pidof"), 3);
        assert_eq!(runner.lines().last().unwrap(), "true");
    }

    #[tokio::test]
    async fn recording_ctl() {
        let shutdown = Shutdown::new();
        let ctl = RecordingCtl::new()
            .failing_at(2)
            .failing_on("contract")
            .with_shutdown_after(3, shutdown.clone());
        let call = CtlCall::new(["router"], Verb::Add).key("r1");
        ctl.apply(&call).await.unwrap();
        assert!(ctl.apply(&call).await.is_err());
        assert!(!shutdown.is_triggered());
        ctl.apply(&call).await.unwrap();
        assert!(shutdown.is_triggered());
        assert!(
            ctl.apply(&CtlCall::new(["p1", "contract"], Verb::Del).key(1))
                .await
                .is_err()
        );
        assert_eq!(ctl.lines().len(), 4);
    }
}
