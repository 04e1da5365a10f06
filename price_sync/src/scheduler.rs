//! Trigger handling and mutual exclusion between cycles.
//!
//! The scheduler owns the job behind a `Mutex`. Both entry points, the daily ticker and
//! manual requests, go through `try_lock`: whoever gets the lock runs the cycle to
//! completion on its own thread, anyone arriving meanwhile is turned away with
//! `ConcurrencyRejected` instead of queueing. The lock is the only state shared between
//! the two paths.
//!
//! The ticker is a background thread driven by `crossbeam_channel::tick`; it stops when
//! the shutdown channel fires or disconnects. A cycle in progress is never interrupted.
use std::sync::{Arc, Mutex, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, select, tick};
use log::{error, info, warn};
use price_common::ConcurrencyRejected;
use strum::Display;

use crate::clock::Clock;
use crate::job::{Cycle, JobResult};
use crate::model::daily_schedule::DailySchedule;

/// Which entry point asked for a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum TriggerOrigin {
    Scheduled,
    Manual,
}

/// Guarded runner for a single job instance.
pub struct Scheduler<J> {
    job: Mutex<J>,
}

impl<J: Cycle> Scheduler<J> {
    pub fn new(job: J) -> Self {
        Self {
            job: Mutex::new(job),
        }
    }

    /// Entry point for a presentation shell or the command port.
    pub fn manual_trigger(&self) -> Result<JobResult, ConcurrencyRejected> {
        self.run_guarded(TriggerOrigin::Manual)
    }

    /// Entry point for the daily timer.
    pub fn scheduled_trigger(&self) -> Result<JobResult, ConcurrencyRejected> {
        self.run_guarded(TriggerOrigin::Scheduled)
    }

    /// Block until no cycle holds the guard. Used on shutdown so a cycle started by a
    /// manual trigger finishes before the process exits.
    pub fn wait_idle(&self) {
        match self.job.lock() {
            Ok(_job) => {}
            Err(_poisoned) => warn!("Last sync cycle panicked before shutdown"),
        }
    }

    fn run_guarded(&self, origin: TriggerOrigin) -> Result<JobResult, ConcurrencyRejected> {
        let mut job = match self.job.try_lock() {
            Ok(job) => job,
            Err(TryLockError::WouldBlock) => {
                warn!("Rejected {} trigger: {}", origin, ConcurrencyRejected);
                return Err(ConcurrencyRejected);
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                warn!("Previous sync cycle panicked, continuing with the same job");
                self.job.clear_poison();
                poisoned.into_inner()
            }
        };

        info!("Running {} sync cycle", origin);
        let result = job.run();
        if result.is_success() {
            info!("{} cycle finished: {}", origin, result);
        } else {
            error!("{} cycle finished: {}", origin, result);
        }
        Ok(result)
    }
}

impl<J: Cycle + Send + 'static> Scheduler<J> {
    /// Spawn the daily ticker thread.
    ///
    /// Every `poll_interval` the ticker asks `schedule` whether today's run is due. A due
    /// run that finds a cycle already in progress is skipped for the day: the cycle that
    /// holds the guard is writing a fresh row anyway.
    pub fn spawn_ticker<C>(
        self: &Arc<Self>,
        mut schedule: DailySchedule,
        poll_interval: Duration,
        clock: C,
        shutdown_rx: Receiver<()>,
    ) -> JoinHandle<()>
    where
        C: Clock + Send + 'static,
    {
        let scheduler = Arc::clone(self);
        thread::spawn(move || {
            let ticker = tick(poll_interval);
            info!(
                "Daily sync armed for {} (polling every {:?})",
                schedule.at().format("%H:%M"),
                poll_interval
            );

            loop {
                select! {
                    recv(shutdown_rx) -> _ => break,
                    recv(ticker) -> _ => {
                        if !schedule.is_due(clock.now()) {
                            continue;
                        }
                        if scheduler.scheduled_trigger().is_err() {
                            warn!("Daily sync skipped: a manual cycle is in progress");
                        }
                    }
                }
            }
            info!("Ticker stopping...");
        })
    }
}
