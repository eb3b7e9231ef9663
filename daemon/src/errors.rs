// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use ctl::CtlError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("Failed to launch the daemon: {0}")]
    Launch(CtlError),

    #[error("Daemon did not become ready after {0} probes")]
    NotReady(u32),

    #[error("No running daemon process was found")]
    NotFound,

    #[error("Daemon process {pid} still running after {attempts} checks")]
    StopTimeout { pid: u32, attempts: u32 },

    #[error("Failed to signal daemon process {0}: {1}")]
    Kill(u32, CtlError),

    #[error("Failed to confine port {port} to {cores} cores: {source}")]
    CorePinning {
        port: String,
        cores: u32,
        source: CtlError,
    },

    #[error("Interrupted while waiting for the daemon to become ready")]
    Interrupted,

    #[error(transparent)]
    Command(#[from] CtlError),
}
