// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(clippy::all, clippy::pedantic)]

use args::{CmdArgs, Parser};
use concurrency::Shutdown;
use config::{BenchmarkSpec, PipelineSpec};
use ctl::{CommandRunner, ControlPlaneClient, SystemRunner, daemon_base_url};
use daemon::{Daemon, DaemonParamsBuilder};
use nfbench::{Controller, ControllerError};
use std::process::ExitCode;
use std::sync::Arc;
use tracectl::{LevelFilter, custom_target, get_trace_ctl};
use tracing::{error, info};

fn init_logging(args: &CmdArgs) -> Result<(), ControllerError> {
    custom_target!("reqwest", LevelFilter::WARN, &[]);
    custom_target!("hyper_util", LevelFilter::WARN, &[]);
    let tctl = get_trace_ctl();
    tctl.set_default_level(LevelFilter::INFO);
    if let Some(tracing) = args.tracing() {
        tctl.setup_from_string(tracing)?;
    }
    Ok(())
}

fn run(args: &CmdArgs) -> Result<u64, ControllerError> {
    let pl = PipelineSpec::from_file(args.pl_conf())?;
    let bm = BenchmarkSpec::from_file(args.bm_conf())?;

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    ctrlc::set_handler(move || {
        info!("Received stop signal, shutting down...");
        trigger.trigger();
    })
    .map_err(|e| ControllerError::Signal(e.to_string()))?;

    let params = DaemonParamsBuilder::default()
        .port(args.daemon_port())
        .sudo(args.sudo())
        .cores(pl.core.or(bm.sut.core))
        .ports(bm.ports().map(str::to_string).to_vec())
        .build()
        .map_err(|e| ControllerError::DaemonParams(e.to_string()))?;

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let ctl = ControlPlaneClient::new(runner.clone(), &daemon_base_url(params.port));
    let daemon = Daemon::new(params, runner, shutdown.clone());
    let controller = Controller::new(pl, bm, daemon, Arc::new(ctl), shutdown)
        .with_interval(args.runtime_interval());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ControllerError::Runtime(e.to_string()))?;
    runtime.block_on(controller.run())
}

fn main() -> ExitCode {
    let args = CmdArgs::parse();
    if let Err(e) = init_logging(&args) {
        error!("{e}");
        return ExitCode::FAILURE;
    }
    if args.show_tracing_targets() {
        get_trace_ctl().dump();
        return ExitCode::SUCCESS;
    }

    info!("Starting benchmark runner...");
    match run(&args) {
        Ok(sweeps) => {
            info!("Exiting after {sweeps} sweeps of the runtime tasks");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
