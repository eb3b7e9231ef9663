// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use config::ConfigError;
use daemon::DaemonError;
use pipeline::{PipelineError, SchedulerError};
use thiserror::Error;
use tracectl::TraceCtlError;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid tracing configuration: {0}")]
    Tracing(#[from] TraceCtlError),

    #[error("Bad daemon parameters: {0}")]
    DaemonParams(String),

    #[error("Failed to install signal handler: {0}")]
    Signal(String),

    #[error("Failed to build async runtime: {0}")]
    Runtime(String),

    #[error("Daemon error: {0}")]
    Daemon(#[from] DaemonError),

    #[error("Pipeline setup failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Runtime task replay failed: {0}")]
    Scheduler(#[from] SchedulerError),
}
