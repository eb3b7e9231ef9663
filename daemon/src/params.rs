// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use ctl::DEFAULT_DAEMON_PORT;
use derive_builder::Builder;
use std::fmt::Display;
use std::time::Duration;

/// How to run the control daemon. N.B. we derive a builder type `DaemonParamsBuilder`
/// and provide defaults for each field.
#[derive(Builder, Debug, Clone)]
pub struct DaemonParams {
    /// daemon executable
    #[builder(setter(into), default = "polycubed".to_string())]
    pub program: String,

    /// port the daemon REST API listens on
    #[builder(default = DEFAULT_DAEMON_PORT)]
    pub port: u16,

    /// run privileged commands through sudo
    #[builder(default = true)]
    pub sudo: bool,

    /// spacing of readiness and termination checks
    #[builder(default = Duration::from_secs(1))]
    pub poll_interval: Duration,

    /// bound on readiness and termination checks
    #[builder(default = 60)]
    pub max_attempts: u32,

    /// number of cores to confine packet processing to; none or zero leaves ports untouched
    #[builder(default)]
    pub cores: Option<u32>,

    /// ports whose queues get confined to `cores`
    #[builder(default)]
    pub ports: Vec<String>,
}

impl Display for DaemonParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Daemon config")?;
        writeln!(f, "  program : {}", self.program)?;
        writeln!(f, "  port    : {}", self.port)?;
        writeln!(f, "  sudo    : {}", self.sudo)?;
        writeln!(
            f,
            "  polling : {} x {:?}",
            self.max_attempts, self.poll_interval
        )?;
        match self.cores {
            Some(cores) if cores > 0 => {
                writeln!(f, "  cores   : {cores} on {}", self.ports.join(", "))
            }
            _ => writeln!(f, "  cores   : any"),
        }
    }
}
