//! Domain models for the triage simulator

pub mod case;
pub mod doctor;
pub mod event;
pub mod patient;
pub mod state;

// Re-exports
pub use case::{Case, CaseError};
pub use doctor::{Doctor, DoctorError, DoctorId};
pub use event::{Event, EventLog};
pub use patient::{Patient, PatientError, PatientId, PatientState, UrgencySignal};
pub use state::TriageState;
