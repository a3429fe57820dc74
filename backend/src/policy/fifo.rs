//! FIFO (First-In-First-Out) Policy
//!
//! Simplest baseline policy: treat the longest-waiting patient first.
//!
//! # Behavior
//!
//! - Ignores severity and predicted urgency entirely
//! - Equivalent to popping the head of the queue
//!
//! # Use Case
//!
//! - Baseline for comparison with triage-aware policies
//! - Fairness reference (minimizes max wait, ignores SLA)

use super::AssignmentPolicy;
use crate::models::{Doctor, Patient, PatientId};

/// FIFO policy: head of the waiting queue
///
/// # Example
///
/// ```
/// use triage_simulator_core_rs::policy::{AssignmentPolicy, FifoPolicy};
/// use triage_simulator_core_rs::{Doctor, Patient};
///
/// let mut policy = FifoPolicy;
/// let doctor = Doctor::new(0, 4);
/// let first = Patient::new(0, 2.0, 0);
/// let second = Patient::new(1, 29.0, 1);
///
/// assert_eq!(policy.select_patient(&doctor, &[&first, &second], 5), Some(0));
/// ```
pub struct FifoPolicy;

impl FifoPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FifoPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl AssignmentPolicy for FifoPolicy {
    fn select_patient(
        &mut self,
        _doctor: &Doctor,
        waiting: &[&Patient],
        _tick: usize,
    ) -> Option<PatientId> {
        waiting.first().map(|p| p.id())
    }

    fn name(&self) -> &str {
        "fifo"
    }
}
