// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Replay of the runtime timeline

use concurrency::Shutdown;
use config::{PipelineSpec, TableAction, Task};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::sleep;
#[allow(unused)]
use tracing::{debug, error, info, warn};

use crate::errors::SchedulerError;
use crate::variant::Pipeline;

use tracectl::trace_target;
trace_target!("scheduler", LevelFilter::INFO, &["pipeline", "scheduler"]);

/// Pause between two sweeps of the timeline
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Index of the base station `shift` places after `current`, wrapping around `count` base
/// stations. `None` if there are no base stations.
#[must_use]
pub fn new_base_station(current: usize, shift: i64, count: usize) -> Option<usize> {
    let count = i64::try_from(count).ok().filter(|count| *count > 0)?;
    let current = i64::try_from(current).ok()?.rem_euclid(count);
    usize::try_from((current + shift.rem_euclid(count)).rem_euclid(count)).ok()
}

/// Replays the runtime tasks of a pipeline spec against a pipeline, in order, sweep after
/// sweep, until stopped.
///
/// The only cancellation points are before each task and during the pause between sweeps: a
/// stop request never aborts a control-plane call in flight.
pub struct Scheduler<'a> {
    pipeline: &'a dyn Pipeline,
    spec: &'a PipelineSpec,
    timeline: &'a [Task],
    interval: Duration,
    shutdown: Shutdown,
    running: AtomicBool,
}

impl<'a> Scheduler<'a> {
    /// A scheduler for the timeline of `spec`, stopped by `shutdown`. Pipelines that do not
    /// replay timelines get an empty one.
    #[must_use]
    pub fn new(pipeline: &'a dyn Pipeline, spec: &'a PipelineSpec, shutdown: Shutdown) -> Self {
        let timeline: &[Task] = if pipeline.replays_timeline() {
            &spec.run_time
        } else {
            if !spec.run_time.is_empty() {
                warn!(
                    "The {} pipeline ignores runtime tasks: {} configured tasks will not run",
                    pipeline.kind(),
                    spec.run_time.len()
                );
            }
            &[]
        };
        Self {
            pipeline,
            spec,
            timeline,
            interval: DEFAULT_INTERVAL,
            shutdown,
            running: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn timeline(&self) -> &[Task] {
        self.timeline
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Request the replay loop to stop at its next cancellation point
    pub fn stop(&self) {
        debug!("Stop requested");
        self.shutdown.trigger();
    }

    /// Replay the timeline until stopped. Returns the number of completed sweeps, or the first
    /// task failure.
    pub async fn start(&self) -> Result<u64, SchedulerError> {
        self.running.store(true, Ordering::Relaxed);
        info!(
            "Replaying {} runtime tasks every {:?}",
            self.timeline.len(),
            self.interval
        );
        let result = self.run().await;
        self.running.store(false, Ordering::Relaxed);
        match &result {
            Ok(sweeps) => info!("Stopped after {sweeps} complete sweeps"),
            Err(e) => debug!("Scheduler stopped on error: {e}"),
        }
        result
    }

    async fn run(&self) -> Result<u64, SchedulerError> {
        let mut completed = 0;
        loop {
            let sweep = completed + 1;
            debug!("Sweep {sweep}");
            for (index, task) in self.timeline.iter().enumerate() {
                if self.shutdown.is_triggered() {
                    debug!("Stopping before task #{index} of sweep {sweep}");
                    return Ok(completed);
                }
                self.dispatch(task).await.map_err(|e| {
                    let reason = Box::new(e);
                    let task = task.to_string();
                    if sweep == 1 {
                        SchedulerError::Task {
                            index,
                            task,
                            reason,
                        }
                    } else {
                        SchedulerError::Replay {
                            sweep,
                            index,
                            task,
                            reason,
                        }
                    }
                })?;
            }
            completed = sweep;
            tokio::select! {
                () = sleep(self.interval) => {}
                () = self.shutdown.triggered() => return Ok(completed),
            }
        }
    }

    async fn dispatch(&self, task: &Task) -> Result<(), SchedulerError> {
        debug!("Running task: {task}");
        match task {
            Task::AddUser { args } => self.pipeline.add_user(args).await?,
            Task::DelUser { args } => self.pipeline.del_user(args).await?,
            Task::AddServer { args } => self.pipeline.add_server(args).await?,
            Task::DelServer { args } => self.pipeline.del_server(args).await?,
            Task::Handover { args } => {
                let user = self
                    .spec
                    .user_by_teid(args.user_teid)
                    .ok_or(SchedulerError::UnknownTeid(args.user_teid))?;
                let new_bst = new_base_station(user.tun_end, args.bst_shift, self.spec.bsts.len())
                    .ok_or(SchedulerError::NoBaseStations(args.user_teid))?;
                self.pipeline.handover(user, new_bst).await?;
            }
            Task::ModifyTable(edit) => self.pipeline.mod_table(TableAction::Table, edit).await?,
            Task::ModifyL3Table(edit) => {
                self.pipeline.mod_table(TableAction::L3Table, edit).await?;
            }
            Task::ModifyGroupTable(edit) => {
                self.pipeline
                    .mod_table(TableAction::GroupTable, edit)
                    .await?;
            }
        }
        Ok(())
    }
}
