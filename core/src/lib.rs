//! Playback engine for taxi-fleet simulation results.
//!
//! Loads a finished simulation (one or many taxi paths), replays it on a
//! shared tick clock, and projects each tick into grid or map coordinates.

pub mod clock;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod frame;
pub mod mapper;
pub mod result;
pub mod scheduler;
pub mod summary;
pub mod types;
