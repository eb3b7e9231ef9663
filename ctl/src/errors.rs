// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use thiserror::Error;

/// Failure of a single control-plane call
#[derive(Error, Debug)]
pub enum CtlError {
    #[error("Failed to run '{cmd}': {reason}")]
    Spawn { cmd: String, reason: String },

    #[error("Command '{cmd}' failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        cmd: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Request {method} {url} failed: {reason}")]
    Transport {
        method: &'static str,
        url: String,
        reason: String,
    },

    #[error("Request {method} {url} was rejected with status {status}: {body}")]
    Rejected {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Batch payloads cannot be applied through {0}: {1}")]
    BatchUnsupported(&'static str, String),

    #[error("Invalid call {0}: {1}")]
    InvalidCall(String, &'static str),
}
