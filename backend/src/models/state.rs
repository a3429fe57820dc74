//! Triage State
//!
//! Arena holding every patient and doctor of one episode.
//!
//! Patients live in an ordered map keyed by their stable id and are never
//! removed; the waiting queue, the doctors and the completed list only hold
//! ids. A doctor references its patient by id, not by handle.
//!
//! # Critical Invariants
//!
//! 1. **Capacity**: `waiting_queue.len() <= max_queue`
//! 2. **Queue Validity**: every id in `waiting_queue` exists and is Waiting
//! 3. **Doctor Consistency**: `busy ⇔ current_patient ⇔ remaining_time > 0`
//! 4. **Exclusive Placement**: a patient is in at most one of queue, doctor,
//!    completed list

use crate::models::doctor::{Doctor, DoctorId};
use crate::models::patient::{Patient, PatientId, PatientState};
use std::collections::{BTreeMap, BTreeSet};

/// Complete simulation state for one episode
///
/// # Example
///
/// ```rust
/// use triage_simulator_core_rs::{Doctor, Patient, TriageState};
///
/// let mut state = TriageState::new(vec![Doctor::new(0, 4)], 2);
/// assert!(state.enqueue(Patient::new(0, 10.0, 0)).is_ok());
/// assert!(state.enqueue(Patient::new(1, 3.0, 0)).is_ok());
///
/// // Queue is full: the patient is handed back
/// let bounced = state.enqueue(Patient::new(2, 8.0, 0)).unwrap_err();
/// assert_eq!(bounced.id(), 2);
/// assert_eq!(state.queue_len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TriageState {
    patients: BTreeMap<PatientId, Patient>,

    /// Doctors indexed by id (`doctors[i].id() == i`)
    doctors: Vec<Doctor>,

    /// Waiting patients in arrival order
    waiting_queue: Vec<PatientId>,

    /// Finished patients in completion order
    completed: Vec<PatientId>,

    max_queue: usize,
}

impl TriageState {
    pub fn new(doctors: Vec<Doctor>, max_queue: usize) -> Self {
        Self {
            patients: BTreeMap::new(),
            doctors,
            waiting_queue: Vec::new(),
            completed: Vec::new(),
            max_queue,
        }
    }

    /// Reassemble state from checkpoint parts (no validation here)
    pub fn from_parts(
        patients: Vec<Patient>,
        doctors: Vec<Doctor>,
        waiting_queue: Vec<PatientId>,
        completed: Vec<PatientId>,
        max_queue: usize,
    ) -> Self {
        Self {
            patients: patients.into_iter().map(|p| (p.id(), p)).collect(),
            doctors,
            waiting_queue,
            completed,
            max_queue,
        }
    }

    // ========================================================================
    // Patients
    // ========================================================================

    pub fn get_patient(&self, id: PatientId) -> Option<&Patient> {
        self.patients.get(&id)
    }

    pub fn get_patient_mut(&mut self, id: PatientId) -> Option<&mut Patient> {
        self.patients.get_mut(&id)
    }

    /// All admitted patients in id order (rejected arrivals are not stored)
    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.patients.values()
    }

    pub fn num_patients(&self) -> usize {
        self.patients.len()
    }

    // ========================================================================
    // Waiting queue
    // ========================================================================

    pub fn max_queue(&self) -> usize {
        self.max_queue
    }

    pub fn queue_len(&self) -> usize {
        self.waiting_queue.len()
    }

    pub fn is_queue_full(&self) -> bool {
        self.waiting_queue.len() >= self.max_queue
    }

    pub fn waiting_queue(&self) -> &[PatientId] {
        &self.waiting_queue
    }

    /// Waiting patients in queue order
    pub fn waiting_patients(&self) -> Vec<&Patient> {
        self.waiting_queue
            .iter()
            .filter_map(|id| self.patients.get(id))
            .collect()
    }

    pub fn is_waiting(&self, id: PatientId) -> bool {
        self.waiting_queue.contains(&id)
    }

    /// Admit a patient to the back of the queue.
    ///
    /// Returns the patient unchanged if the queue is at capacity.
    ///
    /// # Panics
    ///
    /// Panics if the patient id already exists (duplicate id from the
    /// generator is a programming error)
    pub fn enqueue(&mut self, patient: Patient) -> Result<(), Patient> {
        if self.is_queue_full() {
            return Err(patient);
        }
        let id = patient.id();
        assert!(
            !self.patients.contains_key(&id),
            "Patient ID {} already exists",
            id
        );
        self.waiting_queue.push(id);
        self.patients.insert(id, patient);
        Ok(())
    }

    /// Remove a patient id from the queue; false if it was not queued
    pub fn remove_from_queue(&mut self, id: PatientId) -> bool {
        match self.waiting_queue.iter().position(|queued| *queued == id) {
            Some(idx) => {
                self.waiting_queue.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Update `wait_time` of every waiting patient to `current_time`
    pub fn refresh_waits(&mut self, current_time: usize) {
        for id in &self.waiting_queue {
            if let Some(patient) = self.patients.get_mut(id) {
                patient.refresh_wait(current_time);
            }
        }
    }

    // ========================================================================
    // Doctors
    // ========================================================================

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn doctors_mut(&mut self) -> &mut [Doctor] {
        &mut self.doctors
    }

    pub fn get_doctor(&self, id: DoctorId) -> Option<&Doctor> {
        self.doctors.get(id)
    }

    pub fn get_doctor_mut(&mut self, id: DoctorId) -> Option<&mut Doctor> {
        self.doctors.get_mut(id)
    }

    pub fn num_doctors(&self) -> usize {
        self.doctors.len()
    }

    /// Ids of idle doctors, ascending
    pub fn free_doctor_ids(&self) -> Vec<DoctorId> {
        self.doctors
            .iter()
            .filter(|d| !d.is_busy())
            .map(|d| d.id())
            .collect()
    }

    pub fn num_busy_doctors(&self) -> usize {
        self.doctors.iter().filter(|d| d.is_busy()).count()
    }

    // ========================================================================
    // Completed
    // ========================================================================

    pub fn completed(&self) -> &[PatientId] {
        &self.completed
    }

    pub fn record_completion(&mut self, id: PatientId) {
        self.completed.push(id);
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check all critical invariants, describing the first violation found
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.waiting_queue.len() > self.max_queue {
            return Err(format!(
                "Queue length {} exceeds capacity {}",
                self.waiting_queue.len(),
                self.max_queue
            ));
        }

        let mut placed = BTreeSet::new();

        for id in &self.waiting_queue {
            match self.patients.get(id) {
                Some(p) if p.state() == PatientState::Waiting => {}
                Some(p) => {
                    return Err(format!(
                        "Patient {} queued in state {:?}",
                        id,
                        p.state()
                    ))
                }
                None => return Err(format!("Orphaned patient {} in waiting queue", id)),
            }
            if !placed.insert(*id) {
                return Err(format!("Duplicate patient {} in waiting queue", id));
            }
        }

        for (idx, doctor) in self.doctors.iter().enumerate() {
            if doctor.id() != idx {
                return Err(format!("Doctor at index {} has id {}", idx, doctor.id()));
            }
            if !doctor.is_consistent() {
                return Err(format!(
                    "Doctor {} inconsistent: busy={} patient={:?} remaining={}",
                    doctor.id(),
                    doctor.is_busy(),
                    doctor.current_patient(),
                    doctor.remaining_time()
                ));
            }
            if let Some(pid) = doctor.current_patient() {
                match self.patients.get(&pid) {
                    Some(p) if p.state() == PatientState::Treating => {}
                    _ => {
                        return Err(format!(
                            "Doctor {} holds patient {} that is not under treatment",
                            doctor.id(),
                            pid
                        ))
                    }
                }
                if !placed.insert(pid) {
                    return Err(format!("Patient {} placed twice", pid));
                }
            }
        }

        for id in &self.completed {
            match self.patients.get(id) {
                Some(p) if p.state() == PatientState::Done => {}
                _ => return Err(format!("Completed list holds unfinished patient {}", id)),
            }
            if !placed.insert(*id) {
                return Err(format!("Patient {} placed twice", id));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_doctors_ascending() {
        let mut doctors = vec![Doctor::new(0, 3), Doctor::new(1, 3), Doctor::new(2, 3)];
        doctors[1].begin(9).unwrap();
        let state = TriageState::new(doctors, 10);
        assert_eq!(state.free_doctor_ids(), vec![0, 2]);
    }

    #[test]
    fn test_invariants_catch_orphaned_doctor_patient() {
        let mut doctors = vec![Doctor::new(0, 3)];
        doctors[0].begin(42).unwrap();
        let state = TriageState::new(doctors, 10);
        assert!(state.check_invariants().is_err());
    }

    #[test]
    fn test_remove_from_queue_reports_absence() {
        let mut state = TriageState::new(vec![], 5);
        state.enqueue(Patient::new(0, 1.0, 0)).unwrap();
        assert!(state.remove_from_queue(0));
        assert!(!state.remove_from_queue(0));
    }
}
