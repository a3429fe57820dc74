//! Arrival generation for deterministic patient creation.
//!
//! Each tick is one Bernoulli trial: with probability `arrival_rate` a single
//! patient arrives, with a severity drawn uniformly from `[0, max_severity)`.
//! All draws come from the caller's [`RngManager`].
//!
//! # Key Principles
//!
//! 1. **Determinism**: Same seed + same config → same patient stream
//! 2. **Monotonic ids**: ids start at 0 and increase by one per generated
//!    patient, including patients the engine later rejects
//! 3. **No capacity logic**: the tick engine decides whether a patient fits
//!
//! # Example
//!
//! ```
//! use triage_simulator_core_rs::arrivals::{ArrivalConfig, ArrivalGenerator};
//! use triage_simulator_core_rs::rng::RngManager;
//!
//! let mut rng = RngManager::new(42);
//! let mut generator = ArrivalGenerator::new(ArrivalConfig {
//!     arrival_rate: 1.0,
//!     max_severity: 30.0,
//! });
//!
//! let patient = generator.generate(0, &mut rng).unwrap();
//! assert_eq!(patient.id(), 0);
//! assert_eq!(generator.next_patient_id(), 1);
//! ```

pub mod scoring;

pub use scoring::{SeverityScorer, UrgencyScorer};

use crate::models::{Patient, PatientId};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// Arrival process parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrivalConfig {
    /// Probability that one patient arrives in a tick, in `[0, 1]`
    pub arrival_rate: f64,

    /// Upper bound of the severity draw
    pub max_severity: f64,
}

/// Bernoulli patient generator
#[derive(Debug, Clone)]
pub struct ArrivalGenerator {
    config: ArrivalConfig,

    /// Next unused patient id
    next_patient_id: PatientId,
}

impl ArrivalGenerator {
    pub fn new(config: ArrivalConfig) -> Self {
        Self::resume(config, 0)
    }

    /// Continue an id sequence (checkpoint restore)
    pub fn resume(config: ArrivalConfig, next_patient_id: PatientId) -> Self {
        Self {
            config,
            next_patient_id,
        }
    }

    pub fn config(&self) -> &ArrivalConfig {
        &self.config
    }

    pub fn next_patient_id(&self) -> PatientId {
        self.next_patient_id
    }

    /// Run this tick's arrival trial.
    ///
    /// Consumes one draw for the trial and, on success, one for severity.
    pub fn generate(&mut self, tick: usize, rng: &mut RngManager) -> Option<Patient> {
        if !rng.bernoulli(self.config.arrival_rate) {
            return None;
        }
        Some(self.spawn(tick, rng))
    }

    /// Create a patient unconditionally (used to seed the initial queue).
    pub fn spawn(&mut self, tick: usize, rng: &mut RngManager) -> Patient {
        let severity = rng.uniform(0.0, self.config.max_severity);
        let id = self.next_patient_id;
        self.next_patient_id += 1;
        Patient::new(id, severity, tick)
    }
}
