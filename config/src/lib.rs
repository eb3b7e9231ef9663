// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration models for the benchmark runner.
//!
//! A [`PipelineSpec`] describes the topology to set up in the dataplane and the timeline of
//! mutations to replay against it. A [`BenchmarkSpec`] describes the system under test. Both are
//! loaded once from JSON files, validated and never modified afterwards.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]

pub mod benchmark;
pub mod errors;
pub mod mac;
pub mod pipeline;
pub mod task;

pub use benchmark::{BenchmarkSpec, Harness, Sut}; // re-export
pub use errors::{ConfigError, ConfigResult}; // re-export
pub use mac::Mac; // re-export
pub use pipeline::{BaseStation, Gateway, NextHop, PipelineKind, PipelineSpec, Server, User}; // re-export
pub use task::{HandoverArgs, TableAction, TableEdit, Task}; // re-export

use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracectl::trace_target;
trace_target!("config", LevelFilter::INFO, &["config"]);

/// Read a JSON document from a file
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let file =
        File::open(path).map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string()))
}
