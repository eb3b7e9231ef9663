// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Benchmark specification: what the runner needs to know about the system under test

use crate::errors::ConfigResult;
use crate::read_json;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default URL of the harness endpoint notified once the pipeline is configured
pub const DEFAULT_WEBHOOK_URL: &str = "http://localhost:9000/configured";

/// System under test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sut {
    #[serde(alias = "uplink-port")]
    pub uplink_port: String,
    #[serde(alias = "downlink-port")]
    pub downlink_port: String,
    #[serde(default)]
    pub core: Option<u32>,
}

/// The external harness driving the benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harness {
    #[serde(default = "default_webhook_url", alias = "webhook-url")]
    pub webhook_url: String,
}

fn default_webhook_url() -> String {
    DEFAULT_WEBHOOK_URL.to_string()
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            webhook_url: default_webhook_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSpec {
    pub sut: Sut,
    #[serde(default)]
    pub harness: Harness,
}

impl BenchmarkSpec {
    /// Load a benchmark spec from a JSON file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        read_json(path)
    }

    /// The ports the dataplane forwards between, uplink first
    #[must_use]
    pub fn ports(&self) -> [&str; 2] {
        [&self.sut.uplink_port, &self.sut.downlink_port]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_defaults() {
        let spec: BenchmarkSpec = serde_json::from_str(
            r#"{"sut": {"uplink_port": "eth1", "downlink-port": "eth2", "type": "polycube"}}"#,
        )
        .unwrap();
        assert_eq!(spec.ports(), ["eth1", "eth2"]);
        assert_eq!(spec.sut.core, None);
        assert_eq!(spec.harness.webhook_url, DEFAULT_WEBHOOK_URL);
    }

    #[test]
    fn parse_harness() {
        let spec: BenchmarkSpec = serde_json::from_str(
            r#"{"sut": {"uplink_port": "a", "downlink_port": "b", "core": 4},
                "harness": {"webhook_url": "http://10.0.0.2:9000/configured"}}"#,
        )
        .unwrap();
        assert_eq!(spec.sut.core, Some(4));
        assert_eq!(spec.harness.webhook_url, "http://10.0.0.2:9000/configured");
    }
}
