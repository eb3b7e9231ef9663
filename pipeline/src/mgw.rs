// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Mobile gateway: a router whose downlink port serves mobile users through base stations,
//! with a GTP handler, a policer and a classifier attached in front of it.

use async_trait::async_trait;
use config::{BaseStation, BenchmarkSpec, Gateway, PipelineKind, PipelineSpec, Server, User};
use ctl::{ControlPlane, CtlCall, Verb};
use serde_json::json;
use std::net::Ipv4Addr;
#[allow(unused)]
use tracing::{debug, info};

use crate::errors::{PipelineError, PipelineResult};
use crate::variant::Pipeline;

const CUBE_TYPE: &str = "xdp_drv";
const ROUTER: &str = "r1";
const GTP_HANDLER: &str = "gh1";
const POLICER: &str = "p1";
const CLASSIFIER: &str = "c1";
const DPORT: &str = "dport";
const UPORT: &str = "uport";
const UPORT_IP: &str = "140.0.0.1/16";
/// Lets the router reach base stations, which live in 1.1.0.0/16
const DPORT_SECONDARY_IP: (&str, &str) = ("1.1.255.254", "16");

/// Synthetic address of next hop `index`, numbered sequentially in 140.0.0.0/16 and skipping
/// the uplink port address.
pub(crate) fn nhop_addr(index: usize) -> PipelineResult<Ipv4Addr> {
    let k = index + 1;
    let third = u8::try_from(k / 254).map_err(|_| PipelineError::AddressSpaceExhausted(index))?;
    #[allow(clippy::cast_possible_truncation)]
    let fourth = (k % 254 + 1) as u8;
    Ok(Ipv4Addr::new(140, 0, third, fourth))
}

pub struct MobileGateway<'a> {
    spec: &'a PipelineSpec,
    bm: &'a BenchmarkSpec,
    ctl: &'a dyn ControlPlane,
    initialized: bool,
}

impl<'a> MobileGateway<'a> {
    #[must_use]
    pub fn new(spec: &'a PipelineSpec, bm: &'a BenchmarkSpec, ctl: &'a dyn ControlPlane) -> Self {
        Self {
            spec,
            bm,
            ctl,
            initialized: false,
        }
    }

    fn gateway(&self) -> PipelineResult<&'a Gateway> {
        self.spec.gw.as_ref().ok_or(PipelineError::MissingParameter(
            PipelineKind::MobileGateway,
            "gateway addressing (gw)",
        ))
    }

    fn bst(&self, index: usize) -> PipelineResult<&'a BaseStation> {
        self.spec
            .bsts
            .get(index)
            .ok_or(PipelineError::NoSuchBaseStation {
                index,
                count: self.spec.bsts.len(),
            })
    }

    fn nhop(&self, index: usize) -> PipelineResult<Ipv4Addr> {
        if index >= self.spec.nhops.len() {
            return Err(PipelineError::NoSuchNextHop {
                index,
                count: self.spec.nhops.len(),
            });
        }
        nhop_addr(index)
    }

    async fn apply_all(&self, calls: &[CtlCall]) -> PipelineResult {
        for call in calls {
            self.ctl.apply(call).await?;
        }
        Ok(())
    }

    fn user_route(user: &User, bst: &BaseStation, verb: Verb) -> CtlCall {
        CtlCall::new([ROUTER, "route"], verb)
            .key(format!("{}/32", user.ip))
            .key(bst.ip)
    }

    /// The calls installing (`Verb::Add`) or removing (`Verb::Del`) a user, in order:
    /// route towards its base station, traffic class, rate-limit contract, tunnel endpoint.
    fn user_calls(user: &User, bst: &BaseStation, verb: Verb) -> [CtlCall; 4] {
        let route = Self::user_route(user, bst, verb);
        let class = CtlCall::new([CLASSIFIER, "traffic-class"], verb).key(user.teid);
        let contract = CtlCall::new([POLICER, "contract"], verb).key(user.teid);
        let endpoint = CtlCall::new([GTP_HANDLER, "user-equipment"], verb).key(user.ip);
        if verb != Verb::Add {
            return [route, class, contract, endpoint];
        }
        [
            route,
            class
                .field("priority", 0)
                .field("dstip", format!("{}/32", user.ip)),
            contract
                .field("action", "limit")
                .field("rate-limit", user.rate_limit)
                .field("burst-limit", user.rate_limit),
            endpoint
                .field("tunnel-endpoint", bst.ip)
                .field("teid", user.teid),
        ]
    }

    fn attach(cube: &str, first: bool) -> CtlCall {
        let call = CtlCall::new(Vec::<String>::new(), Verb::Attach)
            .key(cube)
            .key(format!("{ROUTER}:{DPORT}"));
        if first {
            call.field("position", "first")
        } else {
            call
        }
    }

    /// Router, ports and the network functions attached to the downlink port. Each function is
    /// attached first in line, so the classifier ends up before the policer, itself before the
    /// GTP handler.
    fn topology_calls(&self, gw: &Gateway) -> Vec<CtlCall> {
        vec![
            CtlCall::new(["router"], Verb::Add)
                .key(ROUTER)
                .field("type", CUBE_TYPE),
            CtlCall::new([ROUTER, "ports"], Verb::Add)
                .key(DPORT)
                .field("peer", &self.bm.sut.downlink_port)
                .field("ip", format!("{}/30", gw.ip)),
            CtlCall::new([ROUTER, "ports"], Verb::Add)
                .key(UPORT)
                .field("peer", &self.bm.sut.uplink_port)
                .field("ip", UPORT_IP),
            CtlCall::new(["gtphandler"], Verb::Add)
                .key(GTP_HANDLER)
                .field("type", CUBE_TYPE),
            Self::attach(GTP_HANDLER, false),
            CtlCall::new(["policer"], Verb::Add)
                .key(POLICER)
                .field("type", CUBE_TYPE),
            Self::attach(POLICER, true),
            CtlCall::new(["classifier"], Verb::Add)
                .key(CLASSIFIER)
                .field("type", CUBE_TYPE),
            Self::attach(CLASSIFIER, true),
            CtlCall::new([ROUTER, "ports", DPORT], Verb::Set).field("mac", &gw.mac),
            CtlCall::new([ROUTER, "ports", UPORT], Verb::Set).field("mac", &gw.mac),
            CtlCall::new([ROUTER, "ports", DPORT, "secondaryip"], Verb::Add)
                .key(DPORT_SECONDARY_IP.0)
                .key(DPORT_SECONDARY_IP.1),
        ]
    }

    /// Static ARP entries for base stations and next hops, one batch each
    fn arp_calls(&self) -> PipelineResult<Vec<CtlCall>> {
        let mut calls = Vec::with_capacity(2);
        if !self.spec.bsts.is_empty() {
            let records = self
                .spec
                .bsts
                .iter()
                .map(|bst| {
                    json!({"address": bst.ip.to_string(), "mac": bst.mac.to_string(), "interface": DPORT})
                })
                .collect();
            calls.push(CtlCall::batch([ROUTER, "arp-table"], Verb::Add, records));
        }
        if !self.spec.nhops.is_empty() {
            let records = self
                .spec
                .nhops
                .iter()
                .enumerate()
                .map(|(index, nhop)| -> PipelineResult<serde_json::Value> {
                    Ok(json!({
                        "address": nhop_addr(index)?.to_string(),
                        "mac": nhop.dmac.to_string(),
                        "interface": UPORT
                    }))
                })
                .collect::<PipelineResult<Vec<_>>>()?;
            calls.push(CtlCall::batch([ROUTER, "arp-table"], Verb::Add, records));
        }
        Ok(calls)
    }

    fn server_route(&self, server: &Server, verb: Verb) -> PipelineResult<CtlCall> {
        let call = CtlCall::new([ROUTER, "route"], verb)
            .key(server)
            .key(self.nhop(server.nhop)?);
        Ok(if verb == Verb::Add {
            call.field("interface", UPORT)
        } else {
            call
        })
    }
}

#[async_trait]
impl Pipeline for MobileGateway<'_> {
    fn kind(&self) -> PipelineKind {
        PipelineKind::MobileGateway
    }

    async fn init(&mut self) -> PipelineResult {
        if self.initialized {
            return Err(PipelineError::AlreadyInitialized(self.kind()));
        }
        let gw = self.gateway()?;
        // a partial set-up is not retried
        self.initialized = true;
        info!("Setting up mobile gateway {ROUTER} at {}", gw.ip);
        self.apply_all(&self.topology_calls(gw)).await?;
        self.apply_all(&self.arp_calls()?).await?;

        info!(
            "Adding {} users and {} servers",
            self.spec.users.len(),
            self.spec.srvs.len()
        );
        for user in &self.spec.users {
            self.add_user(user).await?;
        }
        for server in &self.spec.srvs {
            self.add_server(server).await?;
        }
        Ok(())
    }

    async fn add_user(&self, user: &User) -> PipelineResult {
        debug!("Adding user {} (teid {})", user.ip, user.teid);
        let bst = self.bst(user.tun_end)?;
        self.apply_all(&Self::user_calls(user, bst, Verb::Add)).await
    }

    async fn del_user(&self, user: &User) -> PipelineResult {
        debug!("Removing user {} (teid {})", user.ip, user.teid);
        let bst = self.bst(user.tun_end)?;
        self.apply_all(&Self::user_calls(user, bst, Verb::Del)).await
    }

    async fn add_server(&self, server: &Server) -> PipelineResult {
        debug!("Adding server {server}");
        self.ctl.apply(&self.server_route(server, Verb::Add)?).await?;
        Ok(())
    }

    async fn del_server(&self, server: &Server) -> PipelineResult {
        debug!("Removing server {server}");
        self.ctl.apply(&self.server_route(server, Verb::Del)?).await?;
        Ok(())
    }

    /// The route to the user is replaced first, then its tunnel endpoint. Routes are keyed by
    /// next hop, so the replacement is a removal followed by an addition.
    async fn handover(&self, user: &User, new_bst: usize) -> PipelineResult {
        let old = self.bst(user.tun_end)?;
        let new = self.bst(new_bst)?;
        debug!(
            "Handing user {} over from {} to {} (base station {} -> {new_bst})",
            user.ip, old.ip, new.ip, user.tun_end
        );
        let ip = user.ip.to_string();
        self.apply_all(&[
            Self::user_route(user, old, Verb::Del),
            Self::user_route(user, new, Verb::Add),
            CtlCall::new([GTP_HANDLER, "user-equipment", ip.as_str()], Verb::Set)
                .field("tunnel-endpoint", new.ip),
        ])
        .await
    }
}
