//! Fleet-level figures for the admin view.

use crate::{result::SimulationResult, types::Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub active_taxis: usize,
    /// Taxis that were assigned both a pickup and a dropoff.
    pub total_rides:  usize,
    pub avg_reward:   f64,
    /// Minutes.
    pub avg_eta:      f64,
    pub revenue:      f64,
    pub total_steps:  u64,
    pub max_tick:     Tick,
}

impl FleetSummary {
    pub fn from_result(result: &SimulationResult) -> Self {
        let taxis = &result.taxis;
        let count = taxis.len();
        let mean = |sum: f64| if count == 0 { 0.0 } else { round2(sum / count as f64) };

        Self {
            active_taxis: count,
            total_rides:  taxis
                .iter()
                .filter(|t| t.pickup.is_some() && t.dropoff.is_some())
                .count(),
            avg_reward:   mean(taxis.iter().map(|t| t.metrics.total_reward).sum()),
            avg_eta:      mean(taxis.iter().map(|t| t.metrics.eta).sum()),
            revenue:      round2(taxis.iter().map(|t| t.metrics.fare).sum()),
            total_steps:  taxis.iter().map(|t| t.metrics.steps).sum(),
            max_tick:     result.max_tick(),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
