//! Shared primitive types used across the playback engine.

/// A playback tick. One tick = one step of every entity's path.
pub type Tick = u64;

/// A stable identifier for one taxi within a simulation result.
pub type EntityId = u32;

/// Identifies one play cycle. A fresh id is issued on every `start`,
/// so timers armed for an earlier cycle can be recognised and ignored.
pub type CycleId = u64;
