// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Benchmark runner for dataplane pipelines.
//!
//! The [`Controller`] brings the control daemon up, sets up the pipeline named by the pipeline
//! spec, tells the benchmark harness the pipeline is configured and replays the runtime
//! timeline until shutdown is requested. The daemon is stopped on the way out, whether the run
//! succeeded or not.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]

mod controller;
mod errors;
mod notify;

pub use controller::Controller;
pub use errors::ControllerError;
pub use notify::Notifier;

use tracectl::trace_target;
trace_target!("nfbench", LevelFilter::INFO, &["controller"]);
