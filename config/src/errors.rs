// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Type for configuration / validation failures

use crate::pipeline::PipelineKind;
use thiserror::Error;

/// The reasons why we may reject a configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read {0}: {1}")]
    Io(String, String),
    #[error("Failed to parse {0}: {1}")]
    Parse(String, String),
    #[error("Invalid MAC address '{0}'")]
    BadMac(String),
    #[error("TEID {0} is used by more than one user")]
    DuplicateTeid(u32),
    #[error("User with TEID {teid} refers to base station {index}, but only {count} are configured")]
    NoSuchBaseStation { teid: u32, index: usize, count: usize },
    #[error("Server {server} refers to next hop {index}, but only {count} are configured")]
    NoSuchNextHop {
        server: String,
        index: usize,
        count: usize,
    },
    #[error("Too many next hops: {0}, at most {1} are supported")]
    TooManyNextHops(usize, usize),
    #[error("Invalid prefix length {1} for server {0}")]
    BadPrefixLength(String, u8),
    #[error("Pipeline '{0}' requires {1}")]
    MissingParameter(PipelineKind, &'static str),
}

/// Result-like type for configurations
pub type ConfigResult<T = ()> = Result<T, ConfigError>;
