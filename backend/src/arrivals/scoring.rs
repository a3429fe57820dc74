//! Risk scoring seam
//!
//! In production the urgency signal of a case comes from an external model
//! (image embeddings → unhealthy score). The simulation only needs the two
//! numbers, so the scorer is a trait the caller can replace.

use crate::models::{Patient, UrgencySignal};

/// Attaches an [`UrgencySignal`] to each admitted patient.
///
/// Implementations must not draw from the episode RNG; the arrival stream has
/// to stay identical whichever scorer is plugged in.
pub trait UrgencyScorer: Send {
    fn score(&mut self, patient: &Patient) -> UrgencySignal;
}

/// Default scorer: normalized severity, zero uncertainty.
///
/// ```
/// use triage_simulator_core_rs::arrivals::{SeverityScorer, UrgencyScorer};
/// use triage_simulator_core_rs::Patient;
///
/// let mut scorer = SeverityScorer::new(30.0);
/// let signal = scorer.score(&Patient::new(0, 15.0, 0));
/// assert_eq!(signal.pred_urgency, 0.5);
/// assert_eq!(signal.uncertainty, 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SeverityScorer {
    max_severity: f64,
}

impl SeverityScorer {
    pub fn new(max_severity: f64) -> Self {
        Self { max_severity }
    }
}

impl UrgencyScorer for SeverityScorer {
    fn score(&mut self, patient: &Patient) -> UrgencySignal {
        let pred = if self.max_severity > 0.0 {
            (patient.severity() / self.max_severity).clamp(0.0, 1.0)
        } else {
            0.0
        };
        UrgencySignal::new(pred, 0.0)
    }
}
