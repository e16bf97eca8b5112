//! Playback configuration.
//!
//! Every field has a default taken from the dashboard the engine drives,
//! so an empty JSON object (or no file at all) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub base_lat:           f64,
    pub base_lng:           f64,
    /// Degrees per grid cell, applied to both axes.
    pub cell_size:          f64,
    /// Degrees added per entity index to keep coinciding paths apart.
    pub entity_offset_step: f64,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            base_lat:           17.385,
            base_lng:           78.4867,
            cell_size:          0.01,
            entity_offset_step: 0.002,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub tick_interval_ms: u64,
    pub mapper:           MapperConfig,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            mapper:           MapperConfig::default(),
        }
    }
}

impl PlaybackConfig {
    /// Load from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tick_interval_ms == 0 {
            anyhow::bail!("tick_interval_ms must be greater than zero");
        }
        let m = &self.mapper;
        let constants = [
            ("base_lat", m.base_lat),
            ("base_lng", m.base_lng),
            ("cell_size", m.cell_size),
            ("entity_offset_step", m.entity_offset_step),
        ];
        if let Some((name, value)) = constants.iter().find(|(_, v)| !v.is_finite()) {
            anyhow::bail!("mapper.{name} must be finite, got {value}");
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}
