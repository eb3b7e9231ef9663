// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The contract every pipeline implements

use async_trait::async_trait;
use config::{BenchmarkSpec, PipelineKind, PipelineSpec, Server, TableAction, TableEdit, User};
use ctl::ControlPlane;
use tracing::info;

use crate::errors::{PipelineError, PipelineResult};
use crate::mgw::MobileGateway;
use crate::portfwd::PortForwarder;

/// A network-function topology driven through the control plane.
///
/// Every operation issues its control-plane calls sequentially, in a fixed order, and stops at
/// the first failure. Operations are not idempotent: adding an entity that exists or removing
/// one that does not is an error reported by the daemon.
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Which pipeline this is
    fn kind(&self) -> PipelineKind;

    /// Whether runtime tasks apply to this pipeline
    fn replays_timeline(&self) -> bool {
        true
    }

    /// Set up the static topology, then add every configured user and server.
    /// A pipeline can only be initialized once.
    async fn init(&mut self) -> PipelineResult;

    async fn add_user(&self, user: &User) -> PipelineResult;
    async fn del_user(&self, user: &User) -> PipelineResult;
    async fn add_server(&self, server: &Server) -> PipelineResult;
    async fn del_server(&self, server: &Server) -> PipelineResult;

    /// Move `user` from its base station to the one at index `new_bst`
    async fn handover(&self, user: &User, new_bst: usize) -> PipelineResult;

    /// Apply a flow table edit
    async fn mod_table(&self, action: TableAction, _edit: &TableEdit) -> PipelineResult {
        Err(PipelineError::Unsupported {
            pipeline: self.kind(),
            operation: action.to_string(),
        })
    }
}

/// Build the pipeline named by `spec`
#[must_use]
pub fn build_pipeline<'a>(
    spec: &'a PipelineSpec,
    bm: &'a BenchmarkSpec,
    ctl: &'a dyn ControlPlane,
) -> Box<dyn Pipeline + 'a> {
    info!("Building {} pipeline", spec.name);
    match spec.name {
        PipelineKind::PortForwarder => Box::new(PortForwarder::new(bm, ctl)),
        PipelineKind::MobileGateway => Box::new(MobileGateway::new(spec, bm, ctl)),
    }
}
