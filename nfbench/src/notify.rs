// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Readiness notification to the benchmark harness

use reqwest::Client;
use std::time::Duration;
#[allow(unused)]
use tracing::{debug, info, warn};

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Tells the harness, once, that the pipeline is configured. Failures are logged and ignored.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: Client,
    url: String,
}

impl Notifier {
    #[must_use]
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_owned(),
        }
    }

    /// Send the notification. Returns whether the harness acknowledged it.
    pub async fn notify(&self) -> bool {
        debug!("Notifying harness at {}", self.url);
        match self
            .client
            .get(&self.url)
            .timeout(NOTIFY_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                info!("Harness notified");
                true
            }
            Ok(response) => {
                warn!(
                    "Harness at {} answered the notification with {}",
                    self.url,
                    response.status()
                );
                false
            }
            Err(e) => {
                warn!("Could not notify harness at {}: {e}", self.url);
                false
            }
        }
    }
}
