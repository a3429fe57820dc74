//! Patient and Doctor state machine tests
//!
//! Patients move Waiting → Treating → Done and never back. A doctor is busy
//! exactly while it holds a patient with treatment time left.

use triage_simulator_core_rs::{
    Doctor, DoctorError, Patient, PatientError, PatientState, UrgencySignal,
};

#[test]
fn test_new_patient_is_waiting() {
    let patient = Patient::new(0, 12.5, 3);

    assert_eq!(patient.id(), 0);
    assert_eq!(patient.severity(), 12.5);
    assert_eq!(patient.arrival_time(), 3);
    assert_eq!(patient.state(), PatientState::Waiting);
    assert_eq!(patient.wait_time(), 0);
    assert_eq!(patient.doctor_id(), None);
    assert_eq!(patient.completion_time(), None);
    assert_eq!(patient.urgency(), UrgencySignal::default());
}

#[test]
fn test_full_lifecycle() {
    let mut patient = Patient::new(4, 20.0, 2);

    patient.start_treatment(1, 6).unwrap();
    assert_eq!(patient.state(), PatientState::Treating);
    assert_eq!(patient.doctor_id(), Some(1));
    assert_eq!(patient.treatment_start(), Some(6));
    assert_eq!(patient.wait_time(), 4);

    patient.complete(10).unwrap();
    assert_eq!(patient.state(), PatientState::Done);
    assert_eq!(patient.completion_time(), Some(10));
    assert_eq!(patient.turnaround_ticks(), Some(8));
}

#[test]
fn test_transitions_never_reverse() {
    let mut patient = Patient::new(1, 5.0, 0);
    patient.start_treatment(0, 0).unwrap();

    let err = patient.start_treatment(0, 1).unwrap_err();
    assert_eq!(
        err,
        PatientError::NotWaiting {
            id: 1,
            state: PatientState::Treating
        }
    );

    patient.complete(4).unwrap();
    assert!(patient.start_treatment(0, 5).is_err());
    assert!(patient.complete(6).is_err());
    assert_eq!(patient.completion_time(), Some(4));
}

#[test]
fn test_completion_cannot_precede_start() {
    let mut patient = Patient::new(2, 5.0, 0);
    patient.start_treatment(0, 5).unwrap();

    let err = patient.complete(3).unwrap_err();
    assert_eq!(
        err,
        PatientError::CompletionBeforeStart {
            id: 2,
            tick: 3,
            started: 5
        }
    );
    assert_eq!(patient.state(), PatientState::Treating);
}

#[test]
fn test_wait_time_tracks_clock_while_waiting() {
    let mut patient = Patient::new(0, 5.0, 3);
    assert_eq!(patient.get_wait_time(3), 0);
    assert_eq!(patient.get_wait_time(10), 7);

    patient.refresh_wait(8);
    assert_eq!(patient.wait_time(), 5);
}

#[test]
fn test_doctor_cycle() {
    let mut doctor = Doctor::new(0, 3);
    assert!(!doctor.is_busy());
    assert!(doctor.is_consistent());

    doctor.begin(9).unwrap();
    assert!(doctor.is_busy());
    assert_eq!(doctor.current_patient(), Some(9));
    assert_eq!(doctor.remaining_time(), 3);

    assert_eq!(doctor.advance(), None);
    assert_eq!(doctor.advance(), None);
    assert_eq!(doctor.advance(), Some(9));

    // Released in the same call that reached zero
    assert!(!doctor.is_busy());
    assert_eq!(doctor.current_patient(), None);
    assert_eq!(doctor.remaining_time(), 0);
    assert!(doctor.is_consistent());
}

#[test]
fn test_idle_doctor_advance_is_noop() {
    let mut doctor = Doctor::new(2, 5);
    assert_eq!(doctor.advance(), None);
    assert_eq!(doctor.remaining_time(), 0);
    assert!(doctor.is_consistent());
}

#[test]
fn test_busy_doctor_rejects_second_patient() {
    let mut doctor = Doctor::new(1, 2);
    doctor.begin(3).unwrap();

    assert_eq!(
        doctor.begin(4),
        Err(DoctorError::AlreadyBusy {
            doctor_id: 1,
            patient_id: 3
        })
    );
    assert_eq!(doctor.current_patient(), Some(3));
    assert_eq!(doctor.remaining_time(), 2);
}
