// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The control-plane seam used by pipelines

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::call::CtlCall;
use crate::cli::Polycubectl;
use crate::cmd::CommandRunner;
use crate::errors::CtlError;
use crate::rest::RestCtl;

/// Something able to apply control-plane calls to the daemon.
/// A call either fully succeeds or returns an error; nothing is retried.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn apply(&self, call: &CtlCall) -> Result<(), CtlError>;
}

/// A [`ControlPlane`] that sends single-entity calls to the command-line client
/// and batches to the REST API.
pub struct ControlPlaneClient {
    cli: Box<dyn ControlPlane>,
    rest: Box<dyn ControlPlane>,
}

impl ControlPlaneClient {
    /// Client for a daemon listening at `base_url`
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>, base_url: &str) -> Self {
        Self::with_encodings(
            Box::new(Polycubectl::new(runner, base_url)),
            Box::new(RestCtl::new(base_url)),
        )
    }

    #[must_use]
    pub fn with_encodings(cli: Box<dyn ControlPlane>, rest: Box<dyn ControlPlane>) -> Self {
        Self { cli, rest }
    }
}

#[async_trait]
impl ControlPlane for ControlPlaneClient {
    async fn apply(&self, call: &CtlCall) -> Result<(), CtlError> {
        if call.is_batch() {
            debug!("Submitting batch {call}");
            self.rest.apply(call).await
        } else {
            self.cli.apply(call).await
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::call::Verb;
    use std::sync::Mutex;

    struct Tagged {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ControlPlane for Tagged {
        async fn apply(&self, call: &CtlCall) -> Result<(), CtlError> {
            self.log.lock().unwrap().push(format!("{}: {call}", self.tag));
            Ok(())
        }
    }

    #[tokio::test]
    async fn batches_go_to_rest() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let client = ControlPlaneClient::with_encodings(
            Box::new(Tagged { tag: "cli", log: log.clone() }),
            Box::new(Tagged { tag: "rest", log: log.clone() }),
        );
        client
            .apply(&CtlCall::new(["router"], Verb::Add).key("r1"))
            .await
            .unwrap();
        client
            .apply(&CtlCall::batch(["r1", "arp-table"], Verb::Add, vec![]))
            .await
            .unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["cli: router add r1", "rest: r1 arp-table add [0 records]"]
        );
    }
}
