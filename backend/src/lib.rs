//! Triage Simulator Core - Rust Engine
//!
//! Discrete-time emergency triage simulator with deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Time management
//! - **models**: Domain types (Patient, Doctor, Case, State, Events)
//! - **arrivals**: Bernoulli patient generation and risk scoring
//! - **policy**: Doctor assignment policies
//! - **treatment**: Assignment and treatment progression primitives
//! - **metrics**: Queue statistics and episode metrics
//! - **orchestrator**: Episode controller and tick loop
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded RNG)
//! 2. A patient is waiting, in treatment or done, never two at once
//! 3. A failed tick commits nothing
//! 4. FFI boundary is minimal and safe

// Module declarations
pub mod arrivals;
pub mod core;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod rng;
pub mod treatment;

// Re-exports for convenience
pub use arrivals::{ArrivalConfig, ArrivalGenerator, SeverityScorer, UrgencyScorer};
pub use core::time::TimeManager;
pub use metrics::{EpisodeMetrics, QueueStats, UrgencyThreshold};
pub use models::{
    Case, CaseError, Doctor, DoctorError, DoctorId, Event, EventLog, Patient, PatientError,
    PatientId, PatientState, TriageState, UrgencySignal,
};
pub use orchestrator::{
    EpisodeHorizon, EpisodeReport, Orchestrator, SimulationError, StepResult, TriageConfig,
};
pub use policy::{AssignmentPolicy, PolicyConfig};
pub use rng::RngManager;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn triage_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::env::PyTriageEnv>()?;
    Ok(())
}
