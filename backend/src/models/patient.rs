//! Patient model
//!
//! A patient enters the system through the arrival generator, waits in the
//! triage queue, is treated by exactly one doctor and ends up Done.
//!
//! # Lifecycle
//!
//! ```text
//! Waiting ──start_treatment──▶ Treating ──complete──▶ Done
//! ```
//!
//! Transitions never reverse. Any other transition is rejected with a
//! [`PatientError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable patient identifier, assigned monotonically from 0 per episode.
pub type PatientId = u64;

/// Patient lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientState {
    /// In the triage queue, not yet assigned to a doctor
    Waiting,

    /// Assigned to a doctor and under treatment
    Treating,

    /// Treatment finished
    Done,
}

/// Externally supplied risk estimate for a patient.
///
/// Produced by the risk-scoring collaborator (image model etc). The
/// simulation treats both numbers as opaque inputs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UrgencySignal {
    /// Continuous predicted urgency score
    pub pred_urgency: f64,

    /// Confidence measure attached to the prediction
    pub uncertainty: f64,
}

impl UrgencySignal {
    pub fn new(pred_urgency: f64, uncertainty: f64) -> Self {
        Self {
            pred_urgency,
            uncertainty,
        }
    }
}

/// Errors raised by illegal patient state transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatientError {
    #[error("Patient {id} cannot start treatment from state {state:?}")]
    NotWaiting { id: PatientId, state: PatientState },

    #[error("Patient {id} cannot complete from state {state:?}")]
    NotTreating { id: PatientId, state: PatientState },

    #[error("Patient {id} cannot complete at tick {tick} before treatment start {started}")]
    CompletionBeforeStart {
        id: PatientId,
        tick: usize,
        started: usize,
    },
}

/// A patient in the triage simulation
///
/// # Example
/// ```
/// use triage_simulator_core_rs::{Patient, PatientState};
///
/// let mut patient = Patient::new(0, 12.5, 3);
/// assert_eq!(patient.state(), PatientState::Waiting);
///
/// patient.start_treatment(1, 5).unwrap();
/// patient.complete(9).unwrap();
/// assert_eq!(patient.state(), PatientState::Done);
/// assert_eq!(patient.turnaround_ticks(), Some(6));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    id: PatientId,

    /// Clinical severity in `[0, max_severity]`
    severity: f64,

    /// Tick the patient entered the system
    arrival_time: usize,

    /// Ticks spent waiting; refreshed every tick while Waiting
    wait_time: usize,

    state: PatientState,

    urgency: UrgencySignal,

    /// Doctor treating (or who treated) this patient
    doctor_id: Option<usize>,

    treatment_start: Option<usize>,

    completion_time: Option<usize>,
}

impl Patient {
    /// Create a new waiting patient with a zero urgency signal
    pub fn new(id: PatientId, severity: f64, arrival_time: usize) -> Self {
        Self {
            id,
            severity,
            arrival_time,
            wait_time: 0,
            state: PatientState::Waiting,
            urgency: UrgencySignal::default(),
            doctor_id: None,
            treatment_start: None,
            completion_time: None,
        }
    }

    /// Attach a risk signal (builder pattern)
    pub fn with_urgency(mut self, urgency: UrgencySignal) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn id(&self) -> PatientId {
        self.id
    }

    pub fn severity(&self) -> f64 {
        self.severity
    }

    pub fn arrival_time(&self) -> usize {
        self.arrival_time
    }

    pub fn wait_time(&self) -> usize {
        self.wait_time
    }

    pub fn state(&self) -> PatientState {
        self.state
    }

    pub fn urgency(&self) -> UrgencySignal {
        self.urgency
    }

    pub fn pred_urgency(&self) -> f64 {
        self.urgency.pred_urgency
    }

    pub fn uncertainty(&self) -> f64 {
        self.urgency.uncertainty
    }

    pub fn doctor_id(&self) -> Option<usize> {
        self.doctor_id
    }

    pub fn treatment_start(&self) -> Option<usize> {
        self.treatment_start
    }

    pub fn completion_time(&self) -> Option<usize> {
        self.completion_time
    }

    pub fn is_waiting(&self) -> bool {
        self.state == PatientState::Waiting
    }

    /// Replace the risk signal. Only meaningful while Waiting, since
    /// policies never look at treated patients.
    pub fn set_urgency(&mut self, urgency: UrgencySignal) {
        self.urgency = urgency;
    }

    /// Ticks waited as of `current_time`.
    ///
    /// Once treatment has started the wait is frozen at the start tick.
    pub fn get_wait_time(&self, current_time: usize) -> usize {
        let until = self.treatment_start.unwrap_or(current_time);
        until.saturating_sub(self.arrival_time)
    }

    /// Refresh the stored `wait_time`; no-op unless Waiting.
    pub fn refresh_wait(&mut self, current_time: usize) {
        if self.is_waiting() {
            self.wait_time = self.get_wait_time(current_time);
        }
    }

    /// Completion minus arrival, if Done
    pub fn turnaround_ticks(&self) -> Option<usize> {
        self.completion_time
            .map(|done| done.saturating_sub(self.arrival_time))
    }

    /// Waiting → Treating
    pub fn start_treatment(&mut self, doctor_id: usize, tick: usize) -> Result<(), PatientError> {
        if self.state != PatientState::Waiting {
            return Err(PatientError::NotWaiting {
                id: self.id,
                state: self.state,
            });
        }

        self.wait_time = tick.saturating_sub(self.arrival_time);
        self.state = PatientState::Treating;
        self.doctor_id = Some(doctor_id);
        self.treatment_start = Some(tick);
        Ok(())
    }

    /// Treating → Done, stamping `completion_time = tick`
    pub fn complete(&mut self, tick: usize) -> Result<(), PatientError> {
        if self.state != PatientState::Treating {
            return Err(PatientError::NotTreating {
                id: self.id,
                state: self.state,
            });
        }

        let started = self.treatment_start.unwrap_or(self.arrival_time);
        if tick < started {
            return Err(PatientError::CompletionBeforeStart {
                id: self.id,
                tick,
                started,
            });
        }

        self.state = PatientState::Done;
        self.completion_time = Some(tick);
        Ok(())
    }
}
