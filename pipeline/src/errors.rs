// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use config::PipelineKind;
use ctl::CtlError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("The {pipeline} pipeline does not support {operation}")]
    Unsupported {
        pipeline: PipelineKind,
        operation: String,
    },

    #[error("The {0} pipeline is already initialized")]
    AlreadyInitialized(PipelineKind),

    #[error("The {0} pipeline requires {1}")]
    MissingParameter(PipelineKind, &'static str),

    #[error("No base station at index {index} ({count} configured)")]
    NoSuchBaseStation { index: usize, count: usize },

    #[error("No next hop at index {index} ({count} configured)")]
    NoSuchNextHop { index: usize, count: usize },

    #[error("Next hop {0} has no address left in the next-hop subnet")]
    AddressSpaceExhausted(usize),

    #[error(transparent)]
    Ctl(#[from] CtlError),
}

pub type PipelineResult<T = ()> = Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("No configured user has TEID {0}")]
    UnknownTeid(u32),

    #[error("Cannot hand user {0} over: no base stations are configured")]
    NoBaseStations(u32),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Runtime task #{index} ({task}) failed: {reason}")]
    Task {
        index: usize,
        task: String,
        reason: Box<SchedulerError>,
    },

    #[error(
        "Timeline replay failed on sweep {sweep} at task #{index} ({task}): {reason}; \
         tasks are re-applied every sweep and must be safe to repeat"
    )]
    Replay {
        sweep: u64,
        index: usize,
        task: String,
        reason: Box<SchedulerError>,
    },
}

impl SchedulerError {
    /// The failure behind a task or replay error
    #[must_use]
    pub fn cause(&self) -> &SchedulerError {
        match self {
            SchedulerError::Task { reason, .. } | SchedulerError::Replay { reason, .. } => {
                reason.cause()
            }
            other => other,
        }
    }
}
