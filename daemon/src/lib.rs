// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Lifecycle of the dataplane control daemon.
//!
//! [`Daemon::start`] launches the daemon in the background and blocks until it answers the
//! command-line client, then optionally confines packet processing to a number of cores.
//! [`Daemon::stop`] signals the daemon and blocks until its process is gone. Both waits are
//! bounded polls at a fixed interval.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]

mod daemon;
mod errors;
mod params;

pub use daemon::Daemon;
pub use errors::DaemonError;
pub use params::{DaemonParams, DaemonParamsBuilder, DaemonParamsBuilderError};

use tracectl::trace_target;
trace_target!("daemon", LevelFilter::INFO, &["daemon"]);
