use crate::result::SimulationResult;
use serde::{Deserialize, Serialize};

/// Commands a UI issues to the playback controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlaybackCommand {
    Load { result: Box<SimulationResult> },
    Start,
    Stop,
}
