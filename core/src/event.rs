//! Events emitted by the playback controller.
//!
//! Every state-changing call returns the events it caused, in order.
//! The runner streams them; tests assert on them.

use crate::types::{CycleId, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    ResultLoaded {
        entity_count: usize,
        max_tick:     Tick,
    },
    PlaybackStarted {
        cycle:    CycleId,
        max_tick: Tick,
    },
    TickAdvanced {
        tick: Tick,
    },
    /// Every path has been shown to its end; the clock halted itself.
    PlaybackFinished {
        tick: Tick,
    },
    /// Halted by an explicit `stop` (or a `load` over a running cycle).
    PlaybackStopped {
        tick: Tick,
    },
}

impl PlaybackEvent {
    /// Stable name, used in log lines and the runner's output.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ResultLoaded { .. }    => "result_loaded",
            Self::PlaybackStarted { .. } => "playback_started",
            Self::TickAdvanced { .. }    => "tick_advanced",
            Self::PlaybackFinished { .. } => "playback_finished",
            Self::PlaybackStopped { .. } => "playback_stopped",
        }
    }
}
