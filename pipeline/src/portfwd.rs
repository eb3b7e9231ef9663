// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Port forwarder: two ports, each forwarding everything to the other

use async_trait::async_trait;
use config::{BenchmarkSpec, PipelineKind, Server, User};
use ctl::{ControlPlane, CtlCall, Verb};
use tracing::info;

use crate::errors::{PipelineError, PipelineResult};
use crate::variant::Pipeline;

const FORWARDER: &str = "sf1";
const UPORT: &str = "uport";
const DPORT: &str = "dport";

pub struct PortForwarder<'a> {
    bm: &'a BenchmarkSpec,
    ctl: &'a dyn ControlPlane,
    initialized: bool,
}

impl<'a> PortForwarder<'a> {
    #[must_use]
    pub fn new(bm: &'a BenchmarkSpec, ctl: &'a dyn ControlPlane) -> Self {
        Self {
            bm,
            ctl,
            initialized: false,
        }
    }

    fn unsupported(operation: &str) -> PipelineError {
        PipelineError::Unsupported {
            pipeline: PipelineKind::PortForwarder,
            operation: operation.to_string(),
        }
    }
}

#[async_trait]
impl Pipeline for PortForwarder<'_> {
    fn kind(&self) -> PipelineKind {
        PipelineKind::PortForwarder
    }

    /// The forwarder keeps no per-user state
    fn replays_timeline(&self) -> bool {
        false
    }

    async fn init(&mut self) -> PipelineResult {
        if self.initialized {
            return Err(PipelineError::AlreadyInitialized(self.kind()));
        }
        self.initialized = true;
        info!("Setting up port forwarder {FORWARDER}");
        let calls = [
            CtlCall::new(["simpleforwarder"], Verb::Add)
                .key(FORWARDER)
                .field("type", "XDP_DRV"),
            CtlCall::new([FORWARDER, "ports"], Verb::Add)
                .key(UPORT)
                .field("peer", &self.bm.sut.uplink_port),
            CtlCall::new([FORWARDER, "ports"], Verb::Add)
                .key(DPORT)
                .field("peer", &self.bm.sut.downlink_port),
            CtlCall::new([FORWARDER, "actions"], Verb::Add)
                .key(UPORT)
                .field("action", "FORWARD")
                .field("outport", DPORT),
            CtlCall::new([FORWARDER, "actions"], Verb::Add)
                .key(DPORT)
                .field("action", "FORWARD")
                .field("outport", UPORT),
        ];
        for call in &calls {
            self.ctl.apply(call).await?;
        }
        Ok(())
    }

    async fn add_user(&self, _user: &User) -> PipelineResult {
        Err(Self::unsupported("add_user"))
    }
    async fn del_user(&self, _user: &User) -> PipelineResult {
        Err(Self::unsupported("del_user"))
    }
    async fn add_server(&self, _server: &Server) -> PipelineResult {
        Err(Self::unsupported("add_server"))
    }
    async fn del_server(&self, _server: &Server) -> PipelineResult {
        Err(Self::unsupported("del_server"))
    }
    async fn handover(&self, _user: &User, _new_bst: usize) -> PipelineResult {
        Err(Self::unsupported("handover"))
    }
}
