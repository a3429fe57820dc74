//! Checkpoint - Save/Load Episode State
//!
//! Serializes the complete orchestrator state to JSON so an episode can be
//! paused and resumed.
//!
//! # Critical Invariants
//!
//! - **Determinism**: a restored episode continues exactly like the original
//!   (RNG state and id counter are captured)
//! - **Queue Integrity**: no orphaned or duplicate patients
//! - **Config Matching**: state can only be loaded with the config it was
//!   saved under
//!
//! The event log is not part of a checkpoint; a restored episode starts with
//! an empty log.

use crate::models::{Case, Doctor, Patient, PatientId, PatientState, TriageState};
use crate::orchestrator::{Orchestrator, SimulationError, TriageConfig};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::info;

/// Complete episode state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub current_tick: usize,
    pub rng_state: u64,
    pub next_patient_id: PatientId,
    pub rejected_arrivals: usize,
    pub patients: Vec<Patient>,
    pub doctors: Vec<Doctor>,
    pub waiting_queue: Vec<PatientId>,
    pub completed: Vec<PatientId>,
    pub completed_cases: Vec<Case>,

    /// SHA-256 of the canonical config JSON
    pub config_hash: String,
}

impl StateSnapshot {
    /// Capture the current state of an orchestrator
    pub fn capture(orchestrator: &Orchestrator) -> Result<Self, SimulationError> {
        let state = orchestrator.state();
        Ok(Self {
            current_tick: orchestrator.current_tick(),
            rng_state: orchestrator.rng_state(),
            next_patient_id: orchestrator.next_patient_id(),
            rejected_arrivals: orchestrator.rejected_arrivals(),
            patients: state.patients().cloned().collect(),
            doctors: state.doctors().to_vec(),
            waiting_queue: state.waiting_queue().to_vec(),
            completed: state.completed().to_vec(),
            completed_cases: orchestrator.completed_cases().to_vec(),
            config_hash: compute_config_hash(orchestrator.config())?,
        })
    }

    fn into_state(self, max_queue: usize) -> TriageState {
        TriageState::from_parts(
            self.patients,
            self.doctors,
            self.waiting_queue,
            self.completed,
            max_queue,
        )
    }
}

/// Compute a deterministic hash of any serializable config
///
/// Object keys are sorted recursively before hashing, so field order never
/// changes the result.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;

    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let digest = Sha256::digest(json.as_bytes());
    Ok(format!("{:x}", digest))
}

/// Check a snapshot for internal consistency against `config`
pub fn validate_snapshot(
    snapshot: &StateSnapshot,
    config: &TriageConfig,
) -> Result<(), SimulationError> {
    config.validate()?;
    let expected = compute_config_hash(config)?;
    if snapshot.config_hash != expected {
        return Err(SimulationError::StateValidationError(format!(
            "Config hash mismatch: snapshot {} vs config {}",
            snapshot.config_hash, expected
        )));
    }

    if snapshot.doctors.len() != config.num_doctors {
        return Err(SimulationError::StateValidationError(format!(
            "Snapshot has {} doctors, config expects {}",
            snapshot.doctors.len(),
            config.num_doctors
        )));
    }

    for (index, doctor) in snapshot.doctors.iter().enumerate() {
        let expected_time = config.treatment_time_for(index);
        if doctor.id() != index || doctor.treatment_time() != expected_time {
            return Err(SimulationError::StateValidationError(format!(
                "Doctor at index {} has id {} and treatment time {}, config expects {}",
                index,
                doctor.id(),
                doctor.treatment_time(),
                expected_time
            )));
        }
        if doctor.remaining_time() > expected_time {
            return Err(SimulationError::StateValidationError(format!(
                "Doctor {} has {} ticks remaining of a {}-tick treatment",
                index,
                doctor.remaining_time(),
                expected_time
            )));
        }
    }

    for patient in &snapshot.patients {
        if patient.id() >= snapshot.next_patient_id {
            return Err(SimulationError::StateValidationError(format!(
                "Patient {} not below next id {}",
                patient.id(),
                snapshot.next_patient_id
            )));
        }
        if patient.arrival_time() > snapshot.current_tick {
            return Err(SimulationError::StateValidationError(format!(
                "Patient {} arrives after tick {}",
                patient.id(),
                snapshot.current_tick
            )));
        }
    }

    let done = snapshot
        .patients
        .iter()
        .filter(|p| p.state() == PatientState::Done)
        .count();
    if done != snapshot.completed_cases.len() {
        return Err(SimulationError::StateValidationError(format!(
            "{} finished patients but {} completed cases",
            done,
            snapshot.completed_cases.len()
        )));
    }

    let case_ids = snapshot.completed_cases.iter().map(|c| c.id);
    if !case_ids.eq(snapshot.completed.iter().copied()) {
        return Err(SimulationError::StateValidationError(
            "Completed cases do not match the completion order".to_string(),
        ));
    }

    for case in &snapshot.completed_cases {
        match case.completion_time() {
            Some(done) if done >= case.arrival_time => {}
            other => {
                return Err(SimulationError::StateValidationError(format!(
                    "Case {} arrived at {} but completed at {:?}",
                    case.id, case.arrival_time, other
                )));
            }
        }
    }

    snapshot
        .clone()
        .into_state(config.max_queue)
        .check_invariants()
        .map_err(SimulationError::StateValidationError)
}

impl Orchestrator {
    /// Serialize the episode to a JSON string
    pub fn save_state(&self) -> Result<String, SimulationError> {
        let snapshot = StateSnapshot::capture(self)?;
        serde_json::to_string(&snapshot)
            .map_err(|e| SimulationError::SerializationError(format!("Snapshot serialization failed: {}", e)))
    }

    /// Restore an episode saved by [`Orchestrator::save_state`]
    ///
    /// The policy is rebuilt from `config.policy` and the default scorer is
    /// used; inject a custom one with [`Orchestrator::set_scorer`].
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidConfig`] if `config` is invalid
    /// - [`SimulationError::SerializationError`] for malformed JSON
    /// - [`SimulationError::StateValidationError`] if the snapshot does not
    ///   match `config` or is inconsistent
    pub fn load_state(config: TriageConfig, json: &str) -> Result<Self, SimulationError> {
        config.validate()?;

        let snapshot: StateSnapshot = serde_json::from_str(json)
            .map_err(|e| SimulationError::SerializationError(format!("Invalid snapshot JSON: {}", e)))?;
        validate_snapshot(&snapshot, &config)?;

        info!(
            tick = snapshot.current_tick,
            patients = snapshot.patients.len(),
            "episode restored from checkpoint"
        );

        let current_tick = snapshot.current_tick;
        let rng_state = snapshot.rng_state;
        let next_patient_id = snapshot.next_patient_id;
        let rejected_arrivals = snapshot.rejected_arrivals;
        let completed_cases = snapshot.completed_cases.clone();
        let state = snapshot.into_state(config.max_queue);

        Ok(Self::from_checkpoint(
            config,
            state,
            current_tick,
            rng_state,
            next_patient_id,
            completed_cases,
            rejected_arrivals,
        ))
    }
}
