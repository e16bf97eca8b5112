//! The tick-scheduling seam.
//!
//! The controller never sleeps or spawns. It asks a `TickScheduler` to
//! deliver a cycle id at a fixed interval and later to stop doing so.
//! Whoever drives the controller feeds delivered ids back into
//! `PlaybackController::on_tick`, one at a time.

use crate::types::CycleId;
use std::time::Duration;

pub trait TickScheduler {
    /// Arm a recurring timer for `cycle`. The first delivery happens one
    /// full `interval` after arming.
    fn schedule(&mut self, cycle: CycleId, interval: Duration);

    /// Disarm the timer for `cycle`. Unknown or already cancelled cycles
    /// are ignored.
    fn cancel(&mut self, cycle: CycleId);
}

#[derive(Debug, Clone)]
struct ManualTimer {
    cycle:    CycleId,
    interval: Duration,
    next_due: Duration,
}

/// Virtual-time scheduler. Time only moves when `advance` is called,
/// which makes playback fully reproducible in tests and offline replays.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now:    Duration,
    timers: Vec<ManualTimer>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Cycles with an armed timer, in arming order.
    pub fn armed_cycles(&self) -> Vec<CycleId> {
        self.timers.iter().map(|t| t.cycle).collect()
    }

    /// Move virtual time forward by `by` and return every delivery that
    /// fell due, ordered by due time then arming order.
    ///
    /// The returned ids are a snapshot: a cycle cancelled while the caller
    /// works through the list still appears, exactly like a real timer
    /// that already fired.
    pub fn advance(&mut self, by: Duration) -> Vec<CycleId> {
        let target = self.now + by;
        let mut due: Vec<(Duration, usize, CycleId)> = Vec::new();

        for (order, timer) in self.timers.iter_mut().enumerate() {
            if timer.interval.is_zero() {
                continue;
            }
            while timer.next_due <= target {
                due.push((timer.next_due, order, timer.cycle));
                timer.next_due += timer.interval;
            }
        }

        self.now = target;
        due.sort();
        due.into_iter().map(|(_, _, cycle)| cycle).collect()
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&mut self, cycle: CycleId, interval: Duration) {
        self.timers.retain(|t| t.cycle != cycle);
        self.timers.push(ManualTimer {
            cycle,
            interval,
            next_due: self.now + interval,
        });
    }

    fn cancel(&mut self, cycle: CycleId) {
        self.timers.retain(|t| t.cycle != cycle);
    }
}
