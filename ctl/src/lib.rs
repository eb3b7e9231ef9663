// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! # Control-plane client
//!
//! This crate issues mutations and queries against the dataplane control daemon. A mutation is
//! described once as a [`CtlCall`] (entity path, verb, keys and either named fields or a batch of
//! records) and can be submitted through either of two encodings:
//!
//! - [`Polycubectl`]: one synchronous command-line invocation per call, run through a
//!   [`CommandRunner`].
//! - [`RestCtl`]: one declarative REST request per call, used for batches so that bulk setup
//!   costs a single round trip.
//!
//! Both implement [`ControlPlane`], and [`ControlPlaneClient`] combines them, sending batches
//! over REST and everything else through the command line.
//!
//! A failing call is always reported as a [`CtlError`]. Nothing here retries.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]

mod call;
mod cli;
mod client;
mod cmd;
mod errors;
mod rest;

pub use call::{CtlCall, Payload, Verb};
pub use cli::Polycubectl;
pub use client::{ControlPlane, ControlPlaneClient};
pub use cmd::{Cmd, CmdOutput, CommandRunner, SystemRunner};
pub use errors::CtlError;
pub use rest::RestCtl;

use tracectl::trace_target;
trace_target!("ctl", LevelFilter::INFO, &["control-plane"]);

/// Default port of the control daemon REST API
pub const DEFAULT_DAEMON_PORT: u16 = 8000;

/// Base URL of the control daemon REST API listening on `port` on the local host
#[must_use]
pub fn daemon_base_url(port: u16) -> String {
    format!("http://localhost:{port}/polycube/v1/")
}
