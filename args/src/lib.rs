// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

pub use clap::Parser;
use ctl::DEFAULT_DAEMON_PORT;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "nfbench")]
#[command(version)]
#[command(
    about = "Sets up a dataplane pipeline through its control daemon and replays runtime tasks against it",
    long_about = None
)]
pub struct CmdArgs {
    #[arg(
        short = 'p',
        long,
        value_name = "FILE",
        default_value = "./pipeline.json",
        help = "Pipeline specification: topology and runtime tasks"
    )]
    pl_conf: PathBuf,

    #[arg(
        short = 'b',
        long,
        value_name = "FILE",
        default_value = "./benchmark.json",
        help = "Benchmark specification: system under test and harness"
    )]
    bm_conf: PathBuf,

    #[arg(
        long,
        value_name = "PORT",
        default_value_t = DEFAULT_DAEMON_PORT,
        help = "Port the control daemon REST API listens on"
    )]
    daemon_port: u16,

    #[arg(
        long,
        value_name = "MS",
        default_value_t = 1000,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Pause between two sweeps of the runtime tasks, in milliseconds"
    )]
    runtime_interval_ms: u64,

    #[arg(long, help = "Run privileged commands directly instead of through sudo")]
    no_sudo: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Show configurable tracing targets and exit"
    )]
    show_tracing_targets: bool,

    #[arg(
        long,
        value_name = "tracing configuration",
        help = "Tracing config string as comma-separated sequence of tag=level, with level one in [off,error,warn,info,debug,trace].
Passing default=level sets the default log-level.
Passing all=level allows setting the log-level of all targets to level.
E.g. default=error,all=info,scheduler=debug will set the default target to error, and all the registered targets to info, but enable debug for the scheduler"
    )]
    tracing: Option<String>,
}

impl CmdArgs {
    pub fn pl_conf(&self) -> &Path {
        &self.pl_conf
    }
    pub fn bm_conf(&self) -> &Path {
        &self.bm_conf
    }
    pub fn daemon_port(&self) -> u16 {
        self.daemon_port
    }
    pub fn runtime_interval(&self) -> Duration {
        debug!("Runtime interval: {} ms", self.runtime_interval_ms);
        Duration::from_millis(self.runtime_interval_ms)
    }
    pub fn sudo(&self) -> bool {
        !self.no_sudo
    }
    pub fn show_tracing_targets(&self) -> bool {
        self.show_tracing_targets
    }
    pub fn tracing(&self) -> Option<&String> {
        self.tracing.as_ref()
    }
}
