//! Orchestrator - episode controller and tick loop
//!
//! See `engine.rs` for the tick loop and `checkpoint.rs` for save/load.

pub mod checkpoint;
pub mod engine;

pub use engine::{
    EpisodeHorizon, EpisodeReport, Orchestrator, SimulationError, StepResult, TriageConfig,
};

pub use checkpoint::{compute_config_hash, validate_snapshot, StateSnapshot};
