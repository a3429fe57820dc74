//! Type conversions between Python and Rust
//!
//! Configs cross the boundary as dicts and are parsed through the same serde
//! path as JSON configs, so Python and Rust callers share one set of
//! defaults and validation rules.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::metrics::{EpisodeMetrics, QueueStats};
use crate::orchestrator::{SimulationError, StepResult, TriageConfig};

/// Convert a Python config dict into a validated [`TriageConfig`]
///
/// # Errors
///
/// Raises ValueError for unknown field types or failed validation
pub fn parse_triage_config(py_config: &Bound<'_, PyDict>) -> PyResult<TriageConfig> {
    let py = py_config.py();
    let json: String = py
        .import("json")?
        .call_method1("dumps", (py_config,))?
        .extract()?;

    let config = TriageConfig::from_json(&json).map_err(to_py_err)?;
    config.validate().map_err(to_py_err)?;
    Ok(config)
}

/// Map engine errors onto Python exceptions
pub fn to_py_err(err: SimulationError) -> PyErr {
    match err {
        SimulationError::InvalidConfig(_) | SimulationError::SerializationError(_) => {
            PyValueError::new_err(err.to_string())
        }
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

pub fn queue_stats_to_py<'py>(py: Python<'py>, stats: &QueueStats) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("current_time", stats.current_time)?;
    dict.set_item("queue_length", stats.queue_length)?;
    dict.set_item("urgent_count", stats.urgent_count)?;
    dict.set_item("non_urgent_count", stats.non_urgent_count)?;
    dict.set_item("max_wait_time", stats.max_wait_time)?;
    dict.set_item("avg_wait_time", stats.avg_wait_time)?;
    Ok(dict)
}

/// Tick result as a dict
///
/// Completed cases are reported as parallel `completed_ids` /
/// `completed_turnarounds` lists (minutes).
pub fn step_result_to_py<'py>(py: Python<'py>, result: &StepResult) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("tick", result.tick)?;
    dict.set_item("queue_stats", queue_stats_to_py(py, &result.queue_stats)?)?;
    dict.set_item("arrivals", result.arrivals)?;
    dict.set_item("rejected", result.rejected)?;
    dict.set_item("num_assignments", result.assignments.len())?;

    let ids: Vec<u64> = result.completed.iter().map(|c| c.id).collect();
    let turnarounds: Vec<f64> = result
        .completed
        .iter()
        .filter_map(|c| c.get_turnaround_time().ok())
        .collect();
    dict.set_item("completed_ids", PyList::new(py, ids)?)?;
    dict.set_item("completed_turnarounds", PyList::new(py, turnarounds)?)?;
    Ok(dict)
}

pub fn episode_metrics_to_py<'py>(
    py: Python<'py>,
    metrics: &EpisodeMetrics,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("completed_cases", metrics.completed_cases)?;
    dict.set_item("total_urgent", metrics.total_urgent)?;
    dict.set_item("sla_violations", metrics.sla_violations)?;
    dict.set_item("sla_violation_rate", metrics.sla_violation_rate())?;
    dict.set_item("urgent_median_tat", metrics.urgent_median_tat())?;
    dict.set_item("urgent_p90_tat", metrics.urgent_p90_tat())?;
    dict.set_item("non_urgent_median_tat", metrics.non_urgent_median_tat())?;
    dict.set_item("max_non_urgent_wait", metrics.max_non_urgent_wait)?;
    dict.set_item("throughput", metrics.throughput())?;
    dict.set_item("episode_duration", metrics.episode_duration)?;
    Ok(dict)
}
