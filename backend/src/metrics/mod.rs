//! Metrics aggregation
//!
//! Pure, stateless functions over entity collections:
//! - [`queue_stats`]: point-in-time snapshot of the waiting queue
//! - [`episode_metrics`]: turnaround / SLA / throughput summary of completed
//!   cases
//!
//! Derived statistics on [`EpisodeMetrics`] are computed on demand from the
//! stored samples. Empty data gives 0.0 everywhere.

mod stats;

pub use stats::{max_or_zero, mean, median, percentile};

use crate::models::{Case, Patient};
use serde::{Deserialize, Serialize};

/// Snapshot of the waiting queue at one tick. Waits are in ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueStats {
    pub current_time: usize,
    pub queue_length: usize,
    pub urgent_count: usize,
    pub non_urgent_count: usize,
    pub max_wait_time: f64,
    pub avg_wait_time: f64,
}

/// Caller-chosen rule splitting the queue into urgent / non-urgent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UrgencyThreshold {
    /// Urgent when `severity >= threshold`
    Severity { threshold: f64 },

    /// Urgent when `pred_urgency >= threshold`
    PredictedUrgency { threshold: f64 },
}

impl UrgencyThreshold {
    pub fn is_urgent(&self, patient: &Patient) -> bool {
        match self {
            UrgencyThreshold::Severity { threshold } => patient.severity() >= *threshold,
            UrgencyThreshold::PredictedUrgency { threshold } => {
                patient.pred_urgency() >= *threshold
            }
        }
    }
}

/// Summarize a waiting queue at `current_time`
///
/// # Example
///
/// ```
/// use triage_simulator_core_rs::metrics::{queue_stats, QueueStats};
///
/// let stats = queue_stats(&[], 7, |_| true);
/// assert_eq!(
///     stats,
///     QueueStats {
///         current_time: 7,
///         queue_length: 0,
///         urgent_count: 0,
///         non_urgent_count: 0,
///         max_wait_time: 0.0,
///         avg_wait_time: 0.0,
///     }
/// );
/// ```
pub fn queue_stats<P>(queue: &[&Patient], current_time: usize, is_urgent: P) -> QueueStats
where
    P: Fn(&Patient) -> bool,
{
    let urgent_count = queue.iter().filter(|p| is_urgent(**p)).count();
    let waits: Vec<f64> = queue
        .iter()
        .map(|p| p.get_wait_time(current_time) as f64)
        .collect();

    QueueStats {
        current_time,
        queue_length: queue.len(),
        urgent_count,
        non_urgent_count: queue.len() - urgent_count,
        max_wait_time: max_or_zero(waits.iter().copied()),
        avg_wait_time: mean(&waits),
    }
}

/// Episode summary over completed cases. Times in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeMetrics {
    pub completed_cases: usize,

    /// Turnaround times of truly urgent cases, in completion order
    pub urgent_tats: Vec<f64>,

    /// Turnaround times of the remaining cases, in completion order
    pub non_urgent_tats: Vec<f64>,

    pub sla_violations: usize,
    pub total_urgent: usize,
    pub max_non_urgent_wait: f64,

    /// Episode length in minutes
    pub episode_duration: f64,
}

impl EpisodeMetrics {
    pub fn urgent_median_tat(&self) -> f64 {
        median(&self.urgent_tats)
    }

    pub fn urgent_p90_tat(&self) -> f64 {
        percentile(&self.urgent_tats, 0.9)
    }

    pub fn non_urgent_median_tat(&self) -> f64 {
        median(&self.non_urgent_tats)
    }

    /// Share of urgent cases that breached the SLA
    pub fn sla_violation_rate(&self) -> f64 {
        if self.total_urgent == 0 {
            return 0.0;
        }
        self.sla_violations as f64 / self.total_urgent as f64
    }

    /// Completed cases per hour of episode time
    pub fn throughput(&self) -> f64 {
        if self.episode_duration <= 0.0 {
            return 0.0;
        }
        self.completed_cases as f64 / (self.episode_duration / 60.0)
    }
}

/// Aggregate completed cases into [`EpisodeMetrics`].
///
/// Cases without a completion time are skipped: they have no turnaround yet
/// and cannot violate the SLA.
///
/// # Example
///
/// ```
/// use triage_simulator_core_rs::metrics::episode_metrics;
/// use triage_simulator_core_rs::Case;
///
/// let late = Case::new(0, 0.0, true, 0.9, 0.0, 4.0).completed_at(45.0).unwrap();
/// let quick = Case::new(1, 0.0, true, 0.8, 0.0, 4.0).completed_at(20.0).unwrap();
///
/// let metrics = episode_metrics(&[late, quick], 30.0, 60.0);
/// assert_eq!(metrics.sla_violations, 1);
/// assert_eq!(metrics.sla_violation_rate(), 0.5);
/// assert_eq!(metrics.throughput(), 2.0);
/// ```
pub fn episode_metrics(cases: &[Case], sla_threshold: f64, episode_duration: f64) -> EpisodeMetrics {
    let mut urgent_tats = Vec::new();
    let mut non_urgent_tats = Vec::new();
    let mut sla_violations = 0;
    let mut max_non_urgent_wait: f64 = 0.0;

    for case in cases {
        let tat = match case.get_turnaround_time() {
            Ok(tat) => tat,
            Err(_) => continue,
        };

        if case.true_urgent {
            urgent_tats.push(tat);
            if case.is_sla_violated(sla_threshold) {
                sla_violations += 1;
            }
        } else {
            non_urgent_tats.push(tat);
            max_non_urgent_wait = max_non_urgent_wait.max(tat);
        }
    }

    EpisodeMetrics {
        completed_cases: urgent_tats.len() + non_urgent_tats.len(),
        total_urgent: urgent_tats.len(),
        urgent_tats,
        non_urgent_tats,
        sla_violations,
        max_non_urgent_wait,
        episode_duration,
    }
}
