//! Playback clock: owns the tick counter and the playing flag.

use crate::types::Tick;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    Idle,
    Playing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub current_tick: Tick,
    pub is_playing:   bool,
    /// Longest path length minus one across the loaded fleet.
    pub max_tick:     Tick,
}

impl PlaybackState {
    /// Fresh state for a newly loaded result.
    pub fn new(max_tick: Tick) -> Self {
        Self {
            current_tick: 0,
            is_playing: false,
            max_tick,
        }
    }

    /// Rewind to tick 0 and mark the clock as running.
    pub fn begin(&mut self) {
        self.current_tick = 0;
        self.is_playing = true;
    }

    /// Advance one tick. Returns the new tick number.
    /// Callers must only advance a running clock.
    pub fn advance(&mut self) -> Tick {
        debug_assert!(self.is_playing, "advance() called on a halted clock");
        self.current_tick += 1;
        self.current_tick
    }

    pub fn halt(&mut self) {
        self.is_playing = false;
    }

    /// True once every entity has shown its final position.
    pub fn is_complete(&self) -> bool {
        self.current_tick >= self.max_tick
    }

    pub fn phase(&self) -> PlaybackPhase {
        if self.is_playing {
            PlaybackPhase::Playing
        } else {
            PlaybackPhase::Idle
        }
    }
}
