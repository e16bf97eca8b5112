//! Real-time tick delivery on the tokio runtime.
//!
//! Each armed cycle owns one interval task that pushes its cycle id into
//! the runner's tick channel. Cancelling aborts the task; an id that was
//! already queued before the abort is filtered out by the controller.

use std::collections::HashMap;
use std::time::Duration;
use taxi_playback_core::{scheduler::TickScheduler, types::CycleId};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub struct TokioScheduler {
    ticks:  UnboundedSender<CycleId>,
    timers: HashMap<CycleId, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(ticks: UnboundedSender<CycleId>) -> Self {
        Self {
            ticks,
            timers: HashMap::new(),
        }
    }
}

impl TickScheduler for TokioScheduler {
    fn schedule(&mut self, cycle: CycleId, interval: Duration) {
        let ticks = self.ticks.clone();
        let handle = tokio::spawn(async move {
            let mut timer = interval_at(Instant::now() + interval, interval);
            // A stalled loop must not produce a burst of catch-up ticks.
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                if ticks.send(cycle).is_err() {
                    break;
                }
            }
        });
        if let Some(previous) = self.timers.insert(cycle, handle) {
            previous.abort();
        }
        log::debug!("scheduler: armed cycle {cycle} every {}ms", interval.as_millis());
    }

    fn cancel(&mut self, cycle: CycleId) {
        if let Some(handle) = self.timers.remove(&cycle) {
            handle.abort();
            log::debug!("scheduler: cancelled cycle {cycle}");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}
