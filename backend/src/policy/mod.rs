//! Assignment Policy Module
//!
//! Decides which waiting patient a free doctor takes next.
//!
//! # Overview
//!
//! During step 4 of every tick the engine walks the free doctors in ascending
//! id order and asks the policy, once per doctor, to pick a patient from the
//! current waiting queue. The queue handed to each call already reflects the
//! assignments made earlier in the same tick.
//!
//! The policy only *selects*. The engine performs the assignment and rejects
//! a selection that names a patient outside the waiting queue with
//! [`SimulationError::PatientNotWaiting`], failing the tick.
//!
//! # Policy Interface
//!
//! ```rust
//! use triage_simulator_core_rs::policy::AssignmentPolicy;
//! use triage_simulator_core_rs::{Doctor, Patient, PatientId};
//!
//! struct LowestIdFirst;
//!
//! impl AssignmentPolicy for LowestIdFirst {
//!     fn select_patient(
//!         &mut self,
//!         _doctor: &Doctor,
//!         waiting: &[&Patient],
//!         _tick: usize,
//!     ) -> Option<PatientId> {
//!         waiting.iter().map(|p| p.id()).min()
//!     }
//!
//!     fn name(&self) -> &str {
//!         "lowest_id_first"
//!     }
//! }
//! ```
//!
//! Available policies:
//! 1. **Fifo**: longest-waiting patient first
//! 2. **SeverityPriority**: highest severity first (default)
//! 3. **PredictedUrgency**: highest `pred_urgency + w * uncertainty` first
//!
//! [`SimulationError::PatientNotWaiting`]: crate::orchestrator::SimulationError::PatientNotWaiting

pub mod fifo;
pub mod priority;

pub use fifo::FifoPolicy;
pub use priority::{by_arrival, by_predicted_urgency, by_severity, PatientComparator, PriorityPolicy};

use crate::models::{Doctor, Patient, PatientId};
use serde::{Deserialize, Serialize};

/// Chooses a waiting patient for a free doctor
///
/// `Send` so an episode (and its policy) can be moved to a worker thread.
pub trait AssignmentPolicy: Send {
    /// Pick the patient `doctor` should treat, or `None` to leave the doctor
    /// idle this tick. `waiting` is in queue (arrival) order and never empty.
    fn select_patient(
        &mut self,
        doctor: &Doctor,
        waiting: &[&Patient],
        tick: usize,
    ) -> Option<PatientId>;

    /// Short identifier used in logs
    fn name(&self) -> &str;
}

/// Policy selection for an episode
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PolicyConfig {
    /// Queue order: earliest arrival, then lowest id
    Fifo,

    /// Descending severity, then earliest arrival, then lowest id
    #[default]
    SeverityPriority,

    /// Descending `pred_urgency + uncertainty_weight * uncertainty`,
    /// then earliest arrival, then lowest id
    PredictedUrgency {
        /// Weight on uncertainty; positive values treat doubtful cases as
        /// potentially urgent
        #[serde(default)]
        uncertainty_weight: f64,
    },
}

impl PolicyConfig {
    /// Instantiate the configured policy
    pub fn build(&self) -> Box<dyn AssignmentPolicy> {
        match self {
            PolicyConfig::Fifo => Box::new(FifoPolicy::new()),
            PolicyConfig::SeverityPriority => Box::new(PriorityPolicy::severity_first()),
            PolicyConfig::PredictedUrgency { uncertainty_weight } => {
                Box::new(PriorityPolicy::predicted_urgency_first(*uncertainty_weight))
            }
        }
    }
}
