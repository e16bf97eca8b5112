//! Read-only projections of one playback tick.
//!
//! A frame is rebuilt from the loaded result and the clock on demand;
//! nothing here is cached between ticks.

use crate::{
    clock::PlaybackState,
    mapper::{CoordinateMapper, GeoPosition, ProjectedEntity},
    result::{LogRecord, Position, SimulationResult},
    types::{EntityId, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityFrame {
    pub id:        EntityId,
    /// Path index on display; the tick clamped to the path's end.
    pub index:     usize,
    pub position:  Position,
    pub exhausted: bool,
    pub log:       Option<LogRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tick:     Tick,
    pub playing:  bool,
    pub entities: Vec<EntityFrame>,
}

impl Frame {
    pub fn capture(result: &SimulationResult, state: &PlaybackState) -> Self {
        let tick = state.current_tick;
        let entities = result
            .taxis
            .iter()
            .filter_map(|taxi| {
                let index = taxi.index_at(tick);
                Some(EntityFrame {
                    id: taxi.id,
                    index,
                    position: *taxi.path.get(index)?,
                    exhausted: taxi.is_exhausted_at(tick),
                    log: taxi.logs.get(index).cloned(),
                })
            })
            .collect();

        Self {
            tick,
            playing: state.is_playing,
            entities,
        }
    }

    pub fn position_of(&self, id: EntityId) -> Option<Position> {
        self.entities.iter().find(|e| e.id == id).map(|e| e.position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoEntityFrame {
    pub id:        EntityId,
    pub position:  GeoPosition,
    pub exhausted: bool,
    #[serde(flatten)]
    pub geometry:  ProjectedEntity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFrame {
    pub tick:     Tick,
    pub playing:  bool,
    pub entities: Vec<GeoEntityFrame>,
}

impl GeoFrame {
    /// Project a grid frame through `mapper`. Entity order (and so each
    /// taxi's de-overlap offset) follows the result's taxi order.
    pub fn capture(
        result: &SimulationResult,
        state: &PlaybackState,
        mapper: &CoordinateMapper,
    ) -> Self {
        let tick = state.current_tick;
        let entities = result
            .taxis
            .iter()
            .enumerate()
            .filter_map(|(idx, taxi)| {
                let position = taxi.position_at(tick)?;
                Some(GeoEntityFrame {
                    id:        taxi.id,
                    position:  mapper.project(position, mapper.entity_offset(idx)),
                    exhausted: taxi.is_exhausted_at(tick),
                    geometry:  mapper.project_entity(taxi, idx),
                })
            })
            .collect();

        Self {
            tick,
            playing: state.is_playing,
            entities,
        }
    }
}

/// The decision log revealed so far for one taxi.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityLogs {
    pub id:      EntityId,
    pub records: Vec<LogRecord>,
}

/// Logs up to and including each taxi's displayed path index.
/// An exhausted taxi shows its whole log; later steps stay hidden.
pub fn visible_logs(result: &SimulationResult, tick: Tick) -> Vec<EntityLogs> {
    result
        .taxis
        .iter()
        .map(|taxi| {
            let shown = (taxi.index_at(tick) + 1).min(taxi.logs.len());
            EntityLogs {
                id:      taxi.id,
                records: taxi.logs[..shown].to_vec(),
            }
        })
        .collect()
}
