//! Event logging for simulation replay and auditing.
//!
//! Every state change the tick engine makes is recorded as an [`Event`], in
//! the order it happens within the tick:
//! - **TreatmentComplete**: a doctor finished a patient (step 2)
//! - **Arrival** / **ArrivalRejected**: a patient entered, or bounced off a
//!   full queue (step 3)
//! - **Assignment**: a free doctor took a waiting patient (step 4)
//!
//! # Example
//!
//! ```rust
//! use triage_simulator_core_rs::models::{Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::Arrival { tick: 3, patient_id: 7, severity: 12.0 });
//! assert_eq!(log.events_at_tick(3).len(), 1);
//! assert_eq!(log.events()[0].event_type(), "Arrival");
//! ```

use crate::models::doctor::DoctorId;
use crate::models::patient::PatientId;
use serde::{Deserialize, Serialize};

/// Simulation event capturing a state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// New patient joined the waiting queue
    Arrival {
        tick: usize,
        patient_id: PatientId,
        severity: f64,
    },

    /// New patient dropped because the queue was at capacity
    ArrivalRejected {
        tick: usize,
        patient_id: PatientId,
        severity: f64,
        queue_length: usize,
    },

    /// Doctor started treating a waiting patient
    Assignment {
        tick: usize,
        doctor_id: DoctorId,
        patient_id: PatientId,
        waited_ticks: usize,
    },

    /// Doctor finished treating a patient
    TreatmentComplete {
        tick: usize,
        doctor_id: DoctorId,
        patient_id: PatientId,
        turnaround_ticks: usize,
    },
}

impl Event {
    /// Get the tick number when this event occurred
    pub fn tick(&self) -> usize {
        match self {
            Event::Arrival { tick, .. } => *tick,
            Event::ArrivalRejected { tick, .. } => *tick,
            Event::Assignment { tick, .. } => *tick,
            Event::TreatmentComplete { tick, .. } => *tick,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Arrival { .. } => "Arrival",
            Event::ArrivalRejected { .. } => "ArrivalRejected",
            Event::Assignment { .. } => "Assignment",
            Event::TreatmentComplete { .. } => "TreatmentComplete",
        }
    }

    pub fn patient_id(&self) -> PatientId {
        match self {
            Event::Arrival { patient_id, .. }
            | Event::ArrivalRejected { patient_id, .. }
            | Event::Assignment { patient_id, .. }
            | Event::TreatmentComplete { patient_id, .. } => *patient_id,
        }
    }

    pub fn doctor_id(&self) -> Option<DoctorId> {
        match self {
            Event::Assignment { doctor_id, .. } => Some(*doctor_id),
            Event::TreatmentComplete { doctor_id, .. } => Some(*doctor_id),
            _ => None,
        }
    }
}

/// Append-only event log with query helpers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific tick
    pub fn events_at_tick(&self, tick: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.tick() == tick).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Full history of one patient, in order
    pub fn events_for_patient(&self, patient_id: PatientId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.patient_id() == patient_id)
            .collect()
    }

    pub fn events_for_doctor(&self, doctor_id: DoctorId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.doctor_id() == Some(doctor_id))
            .collect()
    }

    /// Drop everything logged after the first `len` events (tick rollback)
    pub fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_for_patient_keeps_order() {
        let mut log = EventLog::new();
        log.log(Event::Arrival {
            tick: 0,
            patient_id: 1,
            severity: 5.0,
        });
        log.log(Event::Arrival {
            tick: 0,
            patient_id: 2,
            severity: 9.0,
        });
        log.log(Event::Assignment {
            tick: 0,
            doctor_id: 0,
            patient_id: 1,
            waited_ticks: 0,
        });
        log.log(Event::TreatmentComplete {
            tick: 4,
            doctor_id: 0,
            patient_id: 1,
            turnaround_ticks: 4,
        });

        let history: Vec<&str> = log
            .events_for_patient(1)
            .iter()
            .map(|e| e.event_type())
            .collect();
        assert_eq!(history, vec!["Arrival", "Assignment", "TreatmentComplete"]);
        assert_eq!(log.events_for_doctor(0).len(), 2);
    }

    #[test]
    fn test_truncate_rolls_back() {
        let mut log = EventLog::new();
        for i in 0..5 {
            log.log(Event::Arrival {
                tick: i,
                patient_id: i as u64,
                severity: 1.0,
            });
        }
        log.truncate(2);
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[1].tick(), 1);
    }
}
