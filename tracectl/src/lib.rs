// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Tracing setup for the benchmark runner.
//!
//! Each crate declares the tracing targets it logs to with [`trace_target!`]. Declarations are
//! gathered at link time so that the log level of any of them can be set from a single
//! configuration string before the runner starts, e.g. `default=info,scheduler=debug`.

pub mod control;
pub mod display;
pub mod targets;

// re-exports
pub use control::{TraceCtlError, TracingControl, get_trace_ctl};
pub use tracing::level_filters::LevelFilter;
