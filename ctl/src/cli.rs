// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Imperative encoding: one `polycubectl` invocation per call

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::call::CtlCall;
use crate::client::ControlPlane;
use crate::cmd::{Cmd, CommandRunner};
use crate::errors::CtlError;

/// Environment variable telling the command-line client where the daemon is
pub const URL_ENV: &str = "POLYCUBECTL_URL";

/// Issues [`CtlCall`]s as `polycubectl` command lines through a [`CommandRunner`]
#[derive(Clone)]
pub struct Polycubectl {
    runner: Arc<dyn CommandRunner>,
    program: String,
    base_url: String,
}

impl Polycubectl {
    pub const PROGRAM: &'static str = "polycubectl";

    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>, base_url: &str) -> Self {
        Self {
            runner,
            program: Self::PROGRAM.to_string(),
            base_url: base_url.to_string(),
        }
    }

    /// The command line for a call
    #[must_use]
    pub fn command(&self, call: &CtlCall) -> Cmd {
        Cmd::new(self.program.as_str())
            .args(call.cli_args())
            .env(URL_ENV, self.base_url.as_str())
    }
}

#[async_trait]
impl ControlPlane for Polycubectl {
    async fn apply(&self, call: &CtlCall) -> Result<(), CtlError> {
        if call.is_batch() {
            return Err(CtlError::BatchUnsupported(Self::PROGRAM, call.to_string()));
        }
        let cmd = self.command(call);
        debug!("{cmd}");
        self.runner.run_checked(&cmd).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::call::Verb;
    use crate::cmd::CmdOutput;
    use std::sync::Mutex;

    /// Records commands and fails those whose line contains `fail_on`
    #[derive(Default)]
    struct Recorder {
        fail_on: Option<&'static str>,
        seen: Mutex<Vec<Cmd>>,
    }

    #[async_trait]
    impl CommandRunner for Recorder {
        async fn run(&self, cmd: &Cmd) -> Result<CmdOutput, CtlError> {
            self.seen.lock().unwrap().push(cmd.clone());
            let failed = self
                .fail_on
                .is_some_and(|pattern| cmd.to_string().contains(pattern));
            Ok(CmdOutput {
                code: Some(i32::from(failed)),
                stderr: if failed { "boom".into() } else { String::new() },
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn calls_become_command_lines() {
        let recorder = Arc::new(Recorder::default());
        let ctl = Polycubectl::new(recorder.clone(), "http://localhost:8000/polycube/v1/");
        let call = CtlCall::new(["r1", "route"], Verb::Add)
            .key("3.0.0.1/32")
            .key("1.1.0.1");
        ctl.apply(&call).await.unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].to_string(),
            "polycubectl r1 route add 3.0.0.1/32 1.1.0.1"
        );
        assert_eq!(
            seen[0].envs(),
            [(
                URL_ENV.to_string(),
                "http://localhost:8000/polycube/v1/".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn failures_are_surfaced() {
        let recorder = Arc::new(Recorder {
            fail_on: Some("contract"),
            ..Default::default()
        });
        let ctl = Polycubectl::new(recorder.clone(), "http://localhost:8000/polycube/v1/");
        let err = ctl
            .apply(&CtlCall::new(["p1", "contract"], Verb::Del).key(3))
            .await
            .unwrap_err();
        assert!(matches!(err, CtlError::CommandFailed { code: Some(1), .. }));

        let err = ctl
            .apply(&CtlCall::batch(["r1", "arp-table"], Verb::Add, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, CtlError::BatchUnsupported(..)));
        assert_eq!(recorder.seen.lock().unwrap().len(), 1);
    }
}
