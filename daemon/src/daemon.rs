// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use concurrency::Shutdown;
use ctl::{Cmd, CommandRunner, CtlCall, Polycubectl, Verb, daemon_base_url};
use std::sync::Arc;
use tokio::time::sleep;
#[allow(unused)]
use tracing::{debug, error, info, warn};

use crate::errors::DaemonError;
use crate::params::DaemonParams;

/// Handle on the control daemon process
pub struct Daemon {
    params: DaemonParams,
    runner: Arc<dyn CommandRunner>,
    ctl: Polycubectl,
    shutdown: Shutdown,
}

impl Daemon {
    #[must_use]
    pub fn new(params: DaemonParams, runner: Arc<dyn CommandRunner>, shutdown: Shutdown) -> Self {
        let ctl = Polycubectl::new(runner.clone(), &daemon_base_url(params.port));
        Self {
            params,
            runner,
            ctl,
            shutdown,
        }
    }

    /// Launch the daemon and wait until it is ready. If core confinement is requested and
    /// fails, the daemon is stopped again before the error is returned.
    pub async fn start(&self) -> Result<(), DaemonError> {
        info!("Starting control daemon...");
        debug!("{}", self.params);
        let launch = Cmd::privileged(self.params.program.as_str(), self.params.sudo)
            .args(["-d", "-p"])
            .arg(self.params.port.to_string());
        self.runner
            .run_checked(&launch)
            .await
            .map_err(DaemonError::Launch)?;

        self.wait_ready().await?;

        match self.version().await {
            Ok(version) => info!("Control daemon {version} is ready"),
            Err(e) => warn!("Control daemon is ready but its version is unknown: {e}"),
        }

        if let Some(cores) = self.params.cores.filter(|cores| *cores > 0) {
            if let Err(e) = self.confine_to_cores(cores).await {
                debug!("Core confinement failed, stopping the control daemon");
                if let Err(stop_err) = self.stop().await {
                    error!("Failed to stop the control daemon: {stop_err}");
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Probe the daemon until it answers, at most `max_attempts` times.
    /// A shutdown request interrupts the wait.
    async fn wait_ready(&self) -> Result<(), DaemonError> {
        let probe = self
            .ctl
            .command(&CtlCall::new(Vec::<String>::new(), Verb::Show).key("version"));
        for attempt in 1..=self.params.max_attempts {
            tokio::select! {
                () = sleep(self.params.poll_interval) => {}
                () = self.shutdown.triggered() => {
                    warn!("Shutdown requested while waiting for the control daemon");
                    return Err(DaemonError::Interrupted);
                }
            }
            if self.runner.run(&probe).await?.success() {
                debug!("Control daemon answered after {attempt} probes");
                return Ok(());
            }
            debug!("Control daemon not ready ({attempt}/{})", self.params.max_attempts);
        }
        error!(
            "Control daemon did not answer within {} probes",
            self.params.max_attempts
        );
        Err(DaemonError::NotReady(self.params.max_attempts))
    }

    /// The daemon version, as reported by the daemon executable
    pub async fn version(&self) -> Result<String, DaemonError> {
        let cmd = Cmd::new(self.params.program.as_str()).arg("-v");
        let output = self.runner.run_checked(&cmd).await?;
        Ok(output
            .stdout
            .split_whitespace()
            .nth(2)
            .unwrap_or("(unknown version)")
            .to_string())
    }

    async fn confine_to_cores(&self, cores: u32) -> Result<(), DaemonError> {
        info!("Confining packet processing to {cores} cores");
        for port in &self.params.ports {
            let cmd = Cmd::privileged("ethtool", self.params.sudo)
                .args(["-L", port.as_str(), "combined"])
                .arg(cores.to_string());
            self.runner
                .run_checked(&cmd)
                .await
                .map_err(|source| DaemonError::CorePinning {
                    port: port.clone(),
                    cores,
                    source,
                })?;
        }
        Ok(())
    }

    /// Pid of the running daemon, if any
    async fn pid(&self) -> Result<Option<u32>, DaemonError> {
        let output = self
            .runner
            .run(&Cmd::new("pidof").arg(self.params.program.as_str()))
            .await?;
        if !output.success() {
            return Ok(None);
        }
        Ok(output
            .stdout
            .split_whitespace()
            .next()
            .and_then(|pid| pid.parse().ok()))
    }

    /// Signal the daemon to terminate and wait until its process is gone, at most
    /// `max_attempts` checks. This wait is not interrupted by shutdown requests.
    pub async fn stop(&self) -> Result<(), DaemonError> {
        info!("Stopping control daemon...");
        let Some(pid) = self.pid().await? else {
            error!("Control daemon process not found");
            return Err(DaemonError::NotFound);
        };
        let kill = Cmd::privileged("kill", self.params.sudo).arg(pid.to_string());
        self.runner
            .run_checked(&kill)
            .await
            .map_err(|e| DaemonError::Kill(pid, e))?;

        for attempt in 1..=self.params.max_attempts {
            sleep(self.params.poll_interval).await;
            if self.pid().await? != Some(pid) {
                info!("Control daemon (pid {pid}) stopped");
                return Ok(());
            }
            debug!("Control daemon still running ({attempt}/{})", self.params.max_attempts);
        }
        Err(DaemonError::StopTimeout {
            pid,
            attempts: self.params.max_attempts,
        })
    }
}
