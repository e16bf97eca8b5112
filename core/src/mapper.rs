//! Grid → geographic projection for map rendering.
//!
//! A plain affine transform. The per-entity offset is a function of the
//! entity's index only, so repeated projections of the same input are
//! bit-identical while distinct taxis on the same cell still separate.

use crate::{
    config::MapperConfig,
    result::{PathEntity, Position},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub lat: f64,
    pub lng: f64,
}

/// The projected geometry of one taxi: its full route plus markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedEntity {
    pub route:   Vec<GeoPosition>,
    pub pickup:  Option<GeoPosition>,
    pub dropoff: Option<GeoPosition>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateMapper {
    config: MapperConfig,
}

impl CoordinateMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn project(&self, position: Position, entity_offset: f64) -> GeoPosition {
        let c = &self.config;
        GeoPosition {
            lat: c.base_lat + position.row * c.cell_size + entity_offset,
            lng: c.base_lng + position.col * c.cell_size + entity_offset,
        }
    }

    pub fn entity_offset(&self, entity_index: usize) -> f64 {
        entity_index as f64 * self.config.entity_offset_step
    }

    pub fn project_path(&self, path: &[Position], entity_offset: f64) -> Vec<GeoPosition> {
        path.iter().map(|p| self.project(*p, entity_offset)).collect()
    }

    /// Project everything drawn for the taxi at `entity_index`.
    pub fn project_entity(&self, entity: &PathEntity, entity_index: usize) -> ProjectedEntity {
        let offset = self.entity_offset(entity_index);
        ProjectedEntity {
            route:   self.project_path(&entity.path, offset),
            pickup:  entity.pickup.map(|p| self.project(p, offset)),
            dropoff: entity.dropoff.map(|p| self.project(p, offset)),
        }
    }
}
