//! Priority Policy
//!
//! Takes the highest-priority waiting patient under a pluggable comparator.
//!
//! Comparators return [`Ordering::Less`] when the first patient should be
//! treated *before* the second. Every built-in comparator ends with the same
//! tie-break (earliest arrival, then lowest id), which makes the order total:
//! the selected patient never depends on queue position.

use super::AssignmentPolicy;
use crate::models::{Doctor, Patient, PatientId};
use std::cmp::Ordering;

/// Boxed patient comparator; `Less` means "treat first"
pub type PatientComparator = Box<dyn Fn(&Patient, &Patient) -> Ordering + Send>;

/// Earliest arrival first, then lowest id
pub fn by_arrival(a: &Patient, b: &Patient) -> Ordering {
    a.arrival_time()
        .cmp(&b.arrival_time())
        .then_with(|| a.id().cmp(&b.id()))
}

/// Highest severity first, ties broken by [`by_arrival`]
pub fn by_severity(a: &Patient, b: &Patient) -> Ordering {
    b.severity()
        .total_cmp(&a.severity())
        .then_with(|| by_arrival(a, b))
}

/// Highest `pred_urgency + uncertainty_weight * uncertainty` first, ties
/// broken by [`by_arrival`]
pub fn by_predicted_urgency(
    uncertainty_weight: f64,
) -> impl Fn(&Patient, &Patient) -> Ordering + Send + Copy {
    move |a: &Patient, b: &Patient| {
        let score = |p: &Patient| p.pred_urgency() + uncertainty_weight * p.uncertainty();
        score(b)
            .total_cmp(&score(a))
            .then_with(|| by_arrival(a, b))
    }
}

/// Highest-priority-first policy
///
/// # Example
///
/// ```
/// use triage_simulator_core_rs::policy::{AssignmentPolicy, PriorityPolicy};
/// use triage_simulator_core_rs::{Doctor, Patient};
///
/// let mut policy = PriorityPolicy::severity_first();
/// let doctor = Doctor::new(0, 4);
/// let mild = Patient::new(0, 2.0, 0);
/// let severe = Patient::new(1, 27.0, 3);
///
/// assert_eq!(policy.select_patient(&doctor, &[&mild, &severe], 5), Some(1));
/// ```
pub struct PriorityPolicy {
    comparator: PatientComparator,
    name: String,
}

impl PriorityPolicy {
    /// Policy with a caller-supplied comparator
    pub fn with_comparator<F>(name: impl Into<String>, comparator: F) -> Self
    where
        F: Fn(&Patient, &Patient) -> Ordering + Send + 'static,
    {
        Self {
            comparator: Box::new(comparator),
            name: name.into(),
        }
    }

    /// Default triage ordering
    pub fn severity_first() -> Self {
        Self::with_comparator("severity_priority", by_severity)
    }

    pub fn predicted_urgency_first(uncertainty_weight: f64) -> Self {
        Self::with_comparator(
            "predicted_urgency",
            by_predicted_urgency(uncertainty_weight),
        )
    }
}

impl Default for PriorityPolicy {
    fn default() -> Self {
        Self::severity_first()
    }
}

impl AssignmentPolicy for PriorityPolicy {
    fn select_patient(
        &mut self,
        _doctor: &Doctor,
        waiting: &[&Patient],
        _tick: usize,
    ) -> Option<PatientId> {
        waiting
            .iter()
            .copied()
            .min_by(|a, b| (self.comparator)(*a, *b))
            .map(|p| p.id())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
