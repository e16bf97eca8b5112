//! The simulation result consumed by playback.
//!
//! A result is produced elsewhere (the training backend) and handed over
//! as JSON. Playback never mutates it; it only validates the structure
//! once on load and then indexes into each entity's path.

use crate::{
    error::{PlaybackError, PlaybackResult},
    types::{EntityId, Tick},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A grid cell (or any row/col-like pair). Encoded as `[row, col]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    pub row: f64,
    pub col: f64,
}

impl Position {
    pub fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    pub fn is_finite(&self) -> bool {
        self.row.is_finite() && self.col.is_finite()
    }
}

impl From<[f64; 2]> for Position {
    fn from([row, col]: [f64; 2]) -> Self {
        Self { row, col }
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.row, p.col]
    }
}

/// One decision record. Index `i` in `PathEntity::logs` describes the
/// step that started at `path[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub step:     u64,
    pub position: Position,
    pub action:   String,
    pub q_value:  f64,
    #[serde(default)]
    pub reward:   Option<f64>,
    pub energy:   f64,
}

/// Per-taxi outcome metrics reported by the backend.
/// Opaque to playback apart from the fleet summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityMetrics {
    pub total_reward: f64,
    pub steps:        u64,
    pub energy_left:  f64,
    /// Minutes.
    pub eta:          f64,
    pub fare:         f64,
    pub traffic:      Vec<Vec<f64>>,
    pub weather:      Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathEntity {
    #[serde(default = "default_entity_id")]
    pub id:      EntityId,
    pub path:    Vec<Position>,
    #[serde(default)]
    pub pickup:  Option<Position>,
    #[serde(default)]
    pub dropoff: Option<Position>,
    #[serde(default)]
    pub logs:    Vec<LogRecord>,
    #[serde(flatten)]
    pub metrics: EntityMetrics,
}

fn default_entity_id() -> EntityId {
    1
}

impl PathEntity {
    pub fn new(id: EntityId, path: Vec<Position>) -> Self {
        Self {
            id,
            path,
            pickup:  None,
            dropoff: None,
            logs:    Vec::new(),
            metrics: EntityMetrics::default(),
        }
    }

    /// The last tick at which this entity still moves.
    /// Zero for an empty path; `validate` rejects those before playback.
    pub fn last_tick(&self) -> Tick {
        self.path.len().saturating_sub(1) as Tick
    }

    /// Path index shown at `tick`: the tick itself, clamped to the end.
    pub fn index_at(&self, tick: Tick) -> usize {
        tick.min(self.last_tick()) as usize
    }

    pub fn position_at(&self, tick: Tick) -> Option<Position> {
        self.path.get(self.index_at(tick)).copied()
    }

    pub fn is_exhausted_at(&self, tick: Tick) -> bool {
        tick >= self.last_tick()
    }

    fn validate(&self) -> PlaybackResult<()> {
        if self.path.is_empty() {
            return Err(PlaybackError::invalid(format!(
                "taxi {} has an empty path",
                self.id
            )));
        }
        let endpoints = self.pickup.iter().chain(self.dropoff.iter());
        if let Some(bad) = self.path.iter().chain(endpoints).find(|p| !p.is_finite()) {
            return Err(PlaybackError::invalid(format!(
                "taxi {} has a non-finite position {bad:?}",
                self.id
            )));
        }
        if !self.logs.is_empty() && self.logs.len() != self.path.len() {
            return Err(PlaybackError::invalid(format!(
                "taxi {} has {} log records for {} path positions",
                self.id,
                self.logs.len(),
                self.path.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    #[serde(default)]
    pub status: Option<String>,
    pub taxis:  Vec<PathEntity>,
    /// Shared demand heatmap, row-major.
    #[serde(default)]
    pub demand: Vec<Vec<f64>>,
    /// Any other backend metadata, carried through untouched.
    #[serde(flatten)]
    pub extra:  Map<String, Value>,
}

impl SimulationResult {
    pub fn new(taxis: Vec<PathEntity>) -> Self {
        Self {
            status: None,
            taxis,
            demand: Vec::new(),
            extra:  Map::new(),
        }
    }

    /// Wrap a single taxi as a one-entity fleet.
    pub fn single(entity: PathEntity) -> Self {
        Self::new(vec![entity])
    }

    /// Parse either the fleet payload (`{"taxis": [...]}`) or the
    /// single-taxi payload (`{"path": [...], ...}`), then validate it.
    ///
    /// Text that is not JSON at all is a serialization error; JSON of the
    /// wrong shape or breaking the structural rules is `InvalidResult`.
    pub fn from_json(json: &str) -> PlaybackResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        let result = Self::from_value(value)?;
        result.validate()?;
        Ok(result)
    }

    fn from_value(value: Value) -> PlaybackResult<Self> {
        let Value::Object(mut obj) = value else {
            return Err(PlaybackError::invalid("result payload is not a JSON object"));
        };

        if obj.contains_key("taxis") {
            return serde_json::from_value(Value::Object(obj))
                .map_err(|e| PlaybackError::invalid(format!("malformed fleet payload: {e}")));
        }

        if obj.contains_key("path") {
            let status = match obj.remove("status") {
                Some(Value::String(s)) => Some(s),
                _ => None,
            };
            let entity: PathEntity = serde_json::from_value(Value::Object(obj))
                .map_err(|e| PlaybackError::invalid(format!("malformed taxi payload: {e}")))?;
            let mut result = Self::single(entity);
            result.status = status;
            return Ok(result);
        }

        Err(PlaybackError::invalid("payload has neither `taxis` nor `path`"))
    }

    /// Check the structural rules playback depends on.
    pub fn validate(&self) -> PlaybackResult<()> {
        if self.taxis.is_empty() {
            return Err(PlaybackError::invalid("result contains no taxis"));
        }
        let mut seen = HashSet::with_capacity(self.taxis.len());
        for taxi in &self.taxis {
            if !seen.insert(taxi.id) {
                return Err(PlaybackError::invalid(format!("duplicate taxi id {}", taxi.id)));
            }
            taxi.validate()?;
        }
        Ok(())
    }

    /// The tick at which the longest path is exhausted.
    pub fn max_tick(&self) -> Tick {
        self.taxis.iter().map(PathEntity::last_tick).max().unwrap_or(0)
    }

    pub fn entity_count(&self) -> usize {
        self.taxis.len()
    }
}
