// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use concurrency::Shutdown;
use config::{BenchmarkSpec, PipelineSpec};
use ctl::ControlPlane;
use daemon::{Daemon, DaemonError};
use pipeline::{DEFAULT_INTERVAL, Scheduler, build_pipeline};
use std::sync::Arc;
use std::time::Duration;
#[allow(unused)]
use tracing::{debug, error, info, warn};

use crate::errors::ControllerError;
use crate::notify::Notifier;

/// Sequences a benchmark run: daemon, pipeline setup, harness notification, task replay,
/// daemon teardown.
pub struct Controller {
    pl: PipelineSpec,
    bm: BenchmarkSpec,
    daemon: Daemon,
    ctl: Arc<dyn ControlPlane>,
    notifier: Notifier,
    interval: Duration,
    shutdown: Shutdown,
}

impl Controller {
    #[must_use]
    pub fn new(
        pl: PipelineSpec,
        bm: BenchmarkSpec,
        daemon: Daemon,
        ctl: Arc<dyn ControlPlane>,
        shutdown: Shutdown,
    ) -> Self {
        let notifier = Notifier::new(&bm.harness.webhook_url);
        Self {
            pl,
            bm,
            daemon,
            ctl,
            notifier,
            interval: DEFAULT_INTERVAL,
            shutdown,
        }
    }

    /// Pause between two sweeps of the runtime timeline
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until shutdown is requested. Returns the number of complete timeline sweeps.
    pub async fn run(&self) -> Result<u64, ControllerError> {
        if let Err(e) = self.daemon.start().await {
            if matches!(e, DaemonError::Interrupted) {
                self.stop_daemon().await;
            }
            return Err(e.into());
        }

        match self.run_pipeline().await {
            Ok(sweeps) => {
                self.daemon.stop().await?;
                info!("Benchmark run complete");
                Ok(sweeps)
            }
            Err(e) => {
                debug!("Pipeline run failed, stopping the control daemon");
                self.stop_daemon().await;
                Err(e)
            }
        }
    }

    /// Best-effort daemon teardown on failure paths
    async fn stop_daemon(&self) {
        if let Err(e) = self.daemon.stop().await {
            warn!("Failed to stop the control daemon: {e}");
        }
    }

    async fn run_pipeline(&self) -> Result<u64, ControllerError> {
        let mut pipeline = build_pipeline(&self.pl, &self.bm, self.ctl.as_ref());
        pipeline.init().await?;
        info!("{} pipeline configured", pipeline.kind());

        if self.shutdown.is_triggered() {
            info!("Shutdown requested during set-up, not notifying the harness");
            return Ok(0);
        }
        self.notifier.notify().await;

        let scheduler = Scheduler::new(&*pipeline, &self.pl, self.shutdown.clone())
            .with_interval(self.interval);
        let sweeps = scheduler.start().await?;
        debug!("Tearing down {} pipeline", pipeline.kind());
        Ok(sweeps)
    }
}
