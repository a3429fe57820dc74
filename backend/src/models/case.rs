//! Case record
//!
//! The evaluation view of a patient: ground-truth urgency next to the
//! externally predicted urgency and its uncertainty. Times are in minutes.
//!
//! `true_urgent` is for scoring only; assignment policies see [`Patient`]s,
//! never cases.
//!
//! [`Patient`]: crate::models::Patient

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CaseError {
    #[error("Case {id} has not been completed yet")]
    NotCompleted { id: u64 },

    #[error("Case {id} already completed at {completion_time}")]
    AlreadyCompleted { id: u64, completion_time: f64 },

    #[error("Case {id} cannot complete at {completion_time} before arrival at {arrival_time}")]
    CompletionBeforeArrival {
        id: u64,
        arrival_time: f64,
        completion_time: f64,
    },
}

/// Urgency record for one patient
///
/// # Example
/// ```
/// use triage_simulator_core_rs::Case;
///
/// let mut case = Case::new(1, 0.0, true, 0.9, 0.1, 4.0);
/// assert!(case.get_turnaround_time().is_err());
///
/// case.complete(45.0).unwrap();
/// assert_eq!(case.get_turnaround_time().unwrap(), 45.0);
/// assert!(case.is_sla_violated(30.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: u64,
    pub arrival_time: f64,
    pub true_urgent: bool,
    pub pred_urgency: f64,
    pub uncertainty: f64,
    pub read_time: f64,
    completion_time: Option<f64>,
}

impl Case {
    pub fn new(
        id: u64,
        arrival_time: f64,
        true_urgent: bool,
        pred_urgency: f64,
        uncertainty: f64,
        read_time: f64,
    ) -> Self {
        Self {
            id,
            arrival_time,
            true_urgent,
            pred_urgency,
            uncertainty,
            read_time,
            completion_time: None,
        }
    }

    pub fn completion_time(&self) -> Option<f64> {
        self.completion_time
    }

    pub fn is_completed(&self) -> bool {
        self.completion_time.is_some()
    }

    /// Stamp the completion time. Can only happen once.
    pub fn complete(&mut self, completion_time: f64) -> Result<(), CaseError> {
        if let Some(done) = self.completion_time {
            return Err(CaseError::AlreadyCompleted {
                id: self.id,
                completion_time: done,
            });
        }
        if completion_time < self.arrival_time {
            return Err(CaseError::CompletionBeforeArrival {
                id: self.id,
                arrival_time: self.arrival_time,
                completion_time,
            });
        }
        self.completion_time = Some(completion_time);
        Ok(())
    }

    /// Builder form of [`Case::complete`]
    pub fn completed_at(mut self, completion_time: f64) -> Result<Self, CaseError> {
        self.complete(completion_time)?;
        Ok(self)
    }

    pub fn get_wait_time(&self, current_time: f64) -> f64 {
        match self.completion_time {
            Some(done) => done - self.arrival_time,
            None => current_time - self.arrival_time,
        }
    }

    pub fn get_turnaround_time(&self) -> Result<f64, CaseError> {
        self.completion_time
            .map(|done| done - self.arrival_time)
            .ok_or(CaseError::NotCompleted { id: self.id })
    }

    /// Urgent and completed later than `sla_threshold`. Pending cases never
    /// count as violations.
    pub fn is_sla_violated(&self, sla_threshold: f64) -> bool {
        match self.get_turnaround_time() {
            Ok(tat) => self.true_urgent && tat > sla_threshold,
            Err(_) => false,
        }
    }
}
