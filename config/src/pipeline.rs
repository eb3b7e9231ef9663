// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Pipeline specification: static topology plus the runtime timeline

use crate::errors::{ConfigError, ConfigResult};
use crate::mac::Mac;
use crate::read_json;
use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;
use std::net::Ipv4Addr;
use std::path::Path;
use tracing::debug;

/// Maximum number of next hops. Next hops get synthetic addresses numbered sequentially in a /16.
pub const MAX_NHOPS: usize = 254 * 256 - 1;

/// The pipeline variants the runner knows how to set up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineKind {
    #[serde(rename = "portfwd")]
    PortForwarder,
    #[serde(rename = "mgw")]
    MobileGateway,
}

impl Display for PipelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineKind::PortForwarder => write!(f, "portfwd"),
            PipelineKind::MobileGateway => write!(f, "mgw"),
        }
    }
}

/// Addressing of the gateway itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gateway {
    pub ip: Ipv4Addr,
    pub mac: Mac,
}

/// A radio base station: the tunnel endpoint of users attached to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseStation {
    pub ip: Ipv4Addr,
    pub mac: Mac,
}

/// A next hop towards servers, on the uplink side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextHop {
    pub dmac: Mac,
}

/// A mobile user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub ip: Ipv4Addr,
    /// tunnel endpoint identifier, unique among users
    pub teid: u32,
    /// index of the base station this user is attached to
    #[serde(alias = "tun-end")]
    pub tun_end: usize,
    #[serde(alias = "rate-limit")]
    pub rate_limit: u64,
}

/// A server network, reachable through a next hop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub ip: Ipv4Addr,
    #[serde(alias = "prefix-len")]
    pub prefix_len: u8,
    /// index of the next hop this network is routed through
    pub nhop: usize,
}

impl Display for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefix_len)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub name: PipelineKind,
    #[serde(default)]
    pub gw: Option<Gateway>,
    #[serde(default)]
    pub bsts: Vec<BaseStation>,
    #[serde(default)]
    pub nhops: Vec<NextHop>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub srvs: Vec<Server>,
    #[serde(default, alias = "run-time")]
    pub run_time: Vec<Task>,
    /// number of cores to confine packet processing to
    #[serde(default)]
    pub core: Option<u32>,
}

impl PipelineSpec {
    /// Load and validate a pipeline spec from a JSON file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let spec: Self = read_json(path)?;
        spec.validate()?;
        debug!(
            "Loaded pipeline '{}': {} base stations, {} next hops, {} users, {} servers, {} runtime tasks",
            spec.name,
            spec.bsts.len(),
            spec.nhops.len(),
            spec.users.len(),
            spec.srvs.len(),
            spec.run_time.len()
        );
        Ok(spec)
    }

    /// Find the configured user with the given TEID
    #[must_use]
    pub fn user_by_teid(&self, teid: u32) -> Option<&User> {
        self.users.iter().find(|u| u.teid == teid)
    }

    fn validate_user(&self, user: &User) -> ConfigResult {
        if user.tun_end >= self.bsts.len() {
            return Err(ConfigError::NoSuchBaseStation {
                teid: user.teid,
                index: user.tun_end,
                count: self.bsts.len(),
            });
        }
        Ok(())
    }

    fn validate_server(&self, server: &Server) -> ConfigResult {
        if server.prefix_len > 32 {
            return Err(ConfigError::BadPrefixLength(
                server.ip.to_string(),
                server.prefix_len,
            ));
        }
        if server.nhop >= self.nhops.len() {
            return Err(ConfigError::NoSuchNextHop {
                server: server.to_string(),
                index: server.nhop,
                count: self.nhops.len(),
            });
        }
        Ok(())
    }

    /// Check the invariants that the pipelines rely on. Users and servers embedded in runtime
    /// tasks are subject to the same checks as the configured ones.
    pub fn validate(&self) -> ConfigResult {
        if self.name == PipelineKind::PortForwarder {
            return Ok(());
        }
        if self.gw.is_none() {
            return Err(ConfigError::MissingParameter(self.name, "a gateway (gw)"));
        }
        if self.nhops.len() > MAX_NHOPS {
            return Err(ConfigError::TooManyNextHops(self.nhops.len(), MAX_NHOPS));
        }
        let mut teids = HashSet::with_capacity(self.users.len());
        for user in &self.users {
            if !teids.insert(user.teid) {
                return Err(ConfigError::DuplicateTeid(user.teid));
            }
            self.validate_user(user)?;
        }
        for server in &self.srvs {
            self.validate_server(server)?;
        }
        for task in &self.run_time {
            match task {
                Task::AddUser { args } | Task::DelUser { args } => self.validate_user(args)?,
                Task::AddServer { args } | Task::DelServer { args } => {
                    self.validate_server(args)?;
                }
                Task::Handover { .. } if self.bsts.is_empty() => {
                    return Err(ConfigError::MissingParameter(
                        self.name,
                        "base stations to hand users over",
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::task::HandoverArgs;
    use pretty_assertions::assert_eq;

    const MGW_SPEC: &str = r#"{
        "name": "mgw",
        "gw": {"ip": "10.0.0.1", "mac": "aa:bb:cc:dd:ee:01"},
        "bsts": [
            {"ip": "1.1.0.1", "mac": "aa:bb:cc:00:00:01"},
            {"ip": "1.1.0.2", "mac": "aa:bb:cc:00:00:02"},
            {"ip": "1.1.0.3", "mac": "aa:bb:cc:00:00:03"}
        ],
        "nhops": [{"dmac": "aa:bb:cc:11:00:01", "smac": "ignored"}],
        "users": [
            {"ip": "3.0.0.1", "teid": 1, "tun_end": 0, "rate_limit": 10000},
            {"ip": "3.0.0.2", "teid": 2, "tun-end": 2, "rate-limit": 20000}
        ],
        "srvs": [{"ip": "2.0.0.0", "prefix_len": 24, "nhop": 0}],
        "run_time": [
            {"action": "handover", "args": {"user_teid": 1, "bst_shift": 1}},
            {"action": "add_user", "args": {"ip": "3.0.0.9", "teid": 9, "tun_end": 1, "rate_limit": 1}},
            {"action": "del_user", "args": {"ip": "3.0.0.9", "teid": 9, "tun_end": 1, "rate_limit": 1}}
        ],
        "core": 2
    }"#;

    fn mgw_spec() -> PipelineSpec {
        serde_json::from_str(MGW_SPEC).unwrap()
    }

    #[test]
    fn parse_mgw_spec() {
        let spec = mgw_spec();
        assert_eq!(spec.name, PipelineKind::MobileGateway);
        assert_eq!(spec.bsts.len(), 3);
        assert_eq!(spec.users[1].tun_end, 2);
        assert_eq!(spec.users[1].rate_limit, 20000);
        assert_eq!(spec.core, Some(2));
        assert_eq!(
            spec.run_time[0],
            Task::Handover {
                args: HandoverArgs {
                    user_teid: 1,
                    bst_shift: 1
                }
            }
        );
        assert_eq!(spec.user_by_teid(2).map(|u| u.ip), Some("3.0.0.2".parse().unwrap()));
        assert!(spec.user_by_teid(7).is_none());
        spec.validate().unwrap();
    }

    #[test]
    fn parse_portfwd_spec() {
        let spec: PipelineSpec = serde_json::from_str(r#"{"name": "portfwd"}"#).unwrap();
        assert_eq!(spec.name, PipelineKind::PortForwarder);
        assert!(spec.run_time.is_empty());
        assert!(spec.gw.is_none());
        spec.validate().unwrap();
    }

    #[test]
    fn reject_unknown_pipeline() {
        assert!(serde_json::from_str::<PipelineSpec>(r#"{"name": "bng"}"#).is_err());
    }

    #[test]
    fn reject_duplicate_teid() {
        let mut spec = mgw_spec();
        spec.users[1].teid = 1;
        assert_eq!(spec.validate(), Err(ConfigError::DuplicateTeid(1)));
    }

    #[test]
    fn reject_bad_indices() {
        let mut spec = mgw_spec();
        spec.users[0].tun_end = 3;
        assert_eq!(
            spec.validate(),
            Err(ConfigError::NoSuchBaseStation {
                teid: 1,
                index: 3,
                count: 3
            })
        );

        let mut spec = mgw_spec();
        spec.srvs[0].nhop = 1;
        assert!(matches!(
            spec.validate(),
            Err(ConfigError::NoSuchNextHop { index: 1, .. })
        ));

        // users in runtime tasks are checked too
        let mut spec = mgw_spec();
        if let Task::AddUser { args } = &mut spec.run_time[1] {
            args.tun_end = 5;
        }
        assert!(matches!(
            spec.validate(),
            Err(ConfigError::NoSuchBaseStation { teid: 9, index: 5, .. })
        ));
    }

    #[test]
    fn mgw_requires_gateway() {
        let mut spec = mgw_spec();
        spec.gw = None;
        assert!(matches!(
            spec.validate(),
            Err(ConfigError::MissingParameter(PipelineKind::MobileGateway, _))
        ));
    }

    #[test]
    fn from_file_reports_path() {
        let err = PipelineSpec::from_file(Path::new("/nonexistent/pipeline.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(path, _) if path == "/nonexistent/pipeline.json"));
    }
}
