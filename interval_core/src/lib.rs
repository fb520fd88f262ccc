#![forbid(unsafe_code)]

//! Core domain model and timer engine for the interval player.
//!
//! This crate provides:
//! - Domain types (routines, blocks, groups, snapshots)
//! - Block expansion of repeated groups
//! - The drift-corrected timer engine and its cue scheduling
//! - Built-in routines and routine file loading
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod expand;
pub mod cue;
pub mod ticker;
pub mod snapshot;
pub mod engine;
pub mod catalog;
pub mod routine_file;

// Re-export commonly used types
pub use error::{CueError, Error, Result};
pub use types::*;
pub use config::Config;
pub use expand::{expand, total_duration_sec};
pub use cue::{
    AudioCues, CueKey, CueOutlet, CueRequest, DirectOutlet, Haptics, NoHaptics, PulseKind,
    QueuedOutlet,
};
pub use engine::{EngineOptions, TimerEngine};
pub use catalog::{build_default_catalog, get_default_catalog, Catalog};
pub use routine_file::{load_routine, resolve_routine, validate_routine};
