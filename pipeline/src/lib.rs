// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(
    unsafe_code,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]

//! # Dataplane pipelines
//!
//! A pipeline is one network-function topology set up in the dataplane through the control
//! daemon. Every pipeline implements the [`Pipeline`] contract: initialization of the static
//! topology, then runtime mutations (users, servers, handovers and table edits), each one
//! translated into an ordered sequence of control-plane calls. The first failing call aborts
//! the operation; nothing is rolled back.
//!
//! Two pipelines exist:
//!
//! - [`PortForwarder`]: a stateless forwarder between the uplink and downlink ports.
//! - [`MobileGateway`]: a router with a GTP handler, a policer and a classifier attached to
//!   its downlink port, serving mobile users behind base stations.
//!
//! The [`Scheduler`] replays the runtime timeline of a pipeline spec against a pipeline, sweep
//! after sweep, until it is stopped.

mod errors;
mod mgw;
mod portfwd;
mod scheduler;
mod variant;

pub use errors::{PipelineError, PipelineResult, SchedulerError};
pub use mgw::MobileGateway;
pub use portfwd::PortForwarder;
pub use scheduler::{DEFAULT_INTERVAL, Scheduler, new_base_station};
pub use variant::{Pipeline, build_pipeline};

use tracectl::trace_target;
trace_target!("pipeline", LevelFilter::INFO, &["pipeline"]);
