//! Doctor model
//!
//! A doctor treats one patient at a time for a fixed number of ticks.
//!
//! # Critical Invariant
//!
//! At every tick boundary: `busy ⇔ current_patient.is_some() ⇔ remaining_time > 0`.
//! The tick where `remaining_time` reaches 0 releases the patient in the same
//! call, so an idle-but-counting or busy-at-zero doctor is never observable.

use crate::models::patient::PatientId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type DoctorId = usize;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DoctorError {
    #[error("Doctor {doctor_id} is already treating patient {patient_id}")]
    AlreadyBusy {
        doctor_id: DoctorId,
        patient_id: PatientId,
    },
}

/// A doctor with a fixed per-patient treatment duration
///
/// # Example
/// ```
/// use triage_simulator_core_rs::Doctor;
///
/// let mut doctor = Doctor::new(0, 2);
/// doctor.begin(7).unwrap();
/// assert!(doctor.is_busy());
///
/// assert_eq!(doctor.advance(), None);
/// assert_eq!(doctor.advance(), Some(7)); // treatment finished, doctor idle
/// assert!(!doctor.is_busy());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    id: DoctorId,
    busy: bool,
    remaining_time: usize,
    current_patient: Option<PatientId>,
    treatment_time: usize,
}

impl Doctor {
    /// Create an idle doctor
    ///
    /// # Panics
    /// Panics if `treatment_time` is 0
    pub fn new(id: DoctorId, treatment_time: usize) -> Self {
        assert!(treatment_time > 0, "treatment_time must be positive");
        Self {
            id,
            busy: false,
            remaining_time: 0,
            current_patient: None,
            treatment_time,
        }
    }

    pub fn id(&self) -> DoctorId {
        self.id
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn remaining_time(&self) -> usize {
        self.remaining_time
    }

    pub fn current_patient(&self) -> Option<PatientId> {
        self.current_patient
    }

    pub fn treatment_time(&self) -> usize {
        self.treatment_time
    }

    /// Start treating `patient_id` for `treatment_time` ticks
    pub fn begin(&mut self, patient_id: PatientId) -> Result<(), DoctorError> {
        if let Some(current) = self.current_patient {
            return Err(DoctorError::AlreadyBusy {
                doctor_id: self.id,
                patient_id: current,
            });
        }

        self.busy = true;
        self.current_patient = Some(patient_id);
        self.remaining_time = self.treatment_time;
        Ok(())
    }

    /// Progress treatment by one tick.
    ///
    /// Returns the patient whose treatment just finished, leaving the doctor
    /// idle. Idle doctors are untouched.
    pub fn advance(&mut self) -> Option<PatientId> {
        if !self.busy {
            return None;
        }

        self.remaining_time = self.remaining_time.saturating_sub(1);
        if self.remaining_time > 0 {
            return None;
        }

        self.busy = false;
        self.current_patient.take()
    }

    /// Check `busy ⇔ current_patient ⇔ remaining_time > 0`
    pub fn is_consistent(&self) -> bool {
        self.busy == self.current_patient.is_some() && self.busy == (self.remaining_time > 0)
    }
}
