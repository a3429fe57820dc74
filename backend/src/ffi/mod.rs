//! Python bindings (PyO3)
//!
//! Thin wrapper exposing the episode controller as `TriageEnv`. All
//! simulation logic stays in Rust; this layer only converts dicts.

pub mod env;
pub mod types;
