//! Treatment mechanics
//!
//! The two state-changing primitives of the tick engine:
//! - [`assign`]: move a waiting patient to a free doctor (step 4)
//! - [`advance_treatments`]: progress every busy doctor by one tick and
//!   release finished patients (steps 1 and 2)
//!
//! Both validate before they mutate. A failed call leaves the state exactly
//! as it was.

use crate::models::{DoctorId, PatientId, TriageState};
use crate::orchestrator::SimulationError;

/// A doctor/patient pairing made during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub tick: usize,
    pub waited_ticks: usize,
}

/// A treatment that finished during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub tick: usize,
}

/// Assign `patient_id` to `doctor_id` at `tick`.
///
/// # Errors
///
/// - [`SimulationError::DoctorNotFound`] for an unknown doctor
/// - [`SimulationError::DoctorBusy`] if the doctor is treating someone
/// - [`SimulationError::PatientNotWaiting`] if the patient is not in the
///   waiting queue
///
/// # Example
///
/// ```
/// use triage_simulator_core_rs::treatment::assign;
/// use triage_simulator_core_rs::{Doctor, Patient, PatientState, TriageState};
///
/// let mut state = TriageState::new(vec![Doctor::new(0, 4)], 10);
/// state.enqueue(Patient::new(0, 12.0, 0)).unwrap();
///
/// assign(&mut state, 0, 0, 2).unwrap();
/// assert_eq!(state.queue_len(), 0);
/// assert_eq!(state.get_patient(0).unwrap().state(), PatientState::Treating);
/// assert_eq!(state.get_doctor(0).unwrap().remaining_time(), 4);
///
/// // The doctor is now busy
/// state.enqueue(Patient::new(1, 3.0, 2)).unwrap();
/// assert!(assign(&mut state, 0, 1, 2).is_err());
/// ```
pub fn assign(
    state: &mut TriageState,
    doctor_id: DoctorId,
    patient_id: PatientId,
    tick: usize,
) -> Result<Assignment, SimulationError> {
    let doctor = state
        .get_doctor(doctor_id)
        .ok_or(SimulationError::DoctorNotFound(doctor_id))?;
    if let Some(current) = doctor.current_patient() {
        return Err(SimulationError::DoctorBusy {
            doctor_id,
            patient_id: current,
        });
    }
    if !state.is_waiting(patient_id) {
        return Err(SimulationError::PatientNotWaiting { patient_id });
    }

    let patient = state
        .get_patient_mut(patient_id)
        .ok_or(SimulationError::PatientNotFound(patient_id))?;
    patient.start_treatment(doctor_id, tick)?;
    let waited_ticks = patient.wait_time();

    state.remove_from_queue(patient_id);
    state
        .get_doctor_mut(doctor_id)
        .ok_or(SimulationError::DoctorNotFound(doctor_id))?
        .begin(patient_id)?;

    Ok(Assignment {
        doctor_id,
        patient_id,
        tick,
        waited_ticks,
    })
}

/// Steps 1 and 2 of the tick: decrement every busy doctor and complete the
/// patients whose treatment reached zero, in ascending doctor id order.
///
/// Finished patients are marked Done with `completion_time = tick` and
/// appended to the completed list.
pub fn advance_treatments(
    state: &mut TriageState,
    tick: usize,
) -> Result<Vec<Completion>, SimulationError> {
    // Validate first: every busy doctor must hold a patient under treatment
    for doctor in state.doctors() {
        if let Some(pid) = doctor.current_patient() {
            let patient = state
                .get_patient(pid)
                .ok_or(SimulationError::PatientNotFound(pid))?;
            if patient.treatment_start().map_or(true, |start| start > tick) {
                return Err(SimulationError::StateValidationError(format!(
                    "Doctor {} holds patient {} with no valid treatment start",
                    doctor.id(),
                    pid
                )));
            }
        }
    }

    let mut finished = Vec::new();
    for doctor in state.doctors_mut() {
        if let Some(patient_id) = doctor.advance() {
            finished.push(Completion {
                doctor_id: doctor.id(),
                patient_id,
                tick,
            });
        }
    }

    for completion in &finished {
        let patient = state
            .get_patient_mut(completion.patient_id)
            .ok_or(SimulationError::PatientNotFound(completion.patient_id))?;
        patient.complete(tick)?;
        state.record_completion(completion.patient_id);
    }

    Ok(finished)
}
