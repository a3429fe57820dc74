//! PyO3 wrapper for the episode controller

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{
    episode_metrics_to_py, parse_triage_config, queue_stats_to_py, step_result_to_py, to_py_err,
};
use crate::orchestrator::Orchestrator;

/// Python wrapper for the triage episode controller
///
/// # Example (from Python)
///
/// ```python
/// from triage_simulator_core_rs import TriageEnv
///
/// env = TriageEnv({"num_doctors": 2, "treatment_time_per_doctor": [4, 6], "rng_seed": 7})
/// for _ in range(100):
///     result = env.step()
///     print(result["tick"], result["queue_stats"]["queue_length"])
///
/// print(env.episode_metrics()["urgent_median_tat"])
/// ```
#[pyclass(name = "TriageEnv")]
pub struct PyTriageEnv {
    inner: Orchestrator,
}

#[pymethods]
impl PyTriageEnv {
    /// Create and reset an environment from a config dict
    ///
    /// Missing keys take their defaults. Raises ValueError for invalid
    /// configs.
    #[new]
    fn new(config: &Bound<'_, PyDict>) -> PyResult<Self> {
        let config = parse_triage_config(config)?;
        let inner = Orchestrator::new(config).map_err(to_py_err)?;
        Ok(PyTriageEnv { inner })
    }

    /// Start a new episode; returns the tick-0 queue stats
    fn reset<'py>(&mut self, py: Python<'py>, config: &Bound<'py, PyDict>) -> PyResult<Bound<'py, PyDict>> {
        let config = parse_triage_config(config)?;
        let stats = self.inner.reset(config).map_err(to_py_err)?;
        queue_stats_to_py(py, &stats)
    }

    /// Advance one tick
    ///
    /// Raises RuntimeError if the engine reaches an invalid state; the
    /// episode is left as it was before the call.
    fn step<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let result = self.inner.step().map_err(to_py_err)?;
        step_result_to_py(py, &result)
    }

    fn queue_stats<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        queue_stats_to_py(py, &self.inner.queue_stats())
    }

    fn episode_metrics<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        episode_metrics_to_py(py, &self.inner.episode_metrics())
    }

    fn current_tick(&self) -> usize {
        self.inner.current_tick()
    }

    fn rejected_arrivals(&self) -> usize {
        self.inner.rejected_arrivals()
    }

    /// Set the risk signal of a waiting patient
    fn set_urgency(&mut self, patient_id: u64, pred_urgency: f64, uncertainty: f64) -> PyResult<()> {
        self.inner
            .set_urgency(
                patient_id,
                crate::models::UrgencySignal::new(pred_urgency, uncertainty),
            )
            .map_err(to_py_err)
    }

    /// Ids of the patients currently waiting, in arrival order
    fn waiting_patient_ids(&self) -> Vec<u64> {
        self.inner.state().waiting_queue().to_vec()
    }

    fn save_state(&self) -> PyResult<String> {
        self.inner.save_state().map_err(to_py_err)
    }

    /// Restore a saved episode; `config` must match the one it was saved with
    #[staticmethod]
    fn load_state(config: &Bound<'_, PyDict>, state_json: &str) -> PyResult<Self> {
        let config = parse_triage_config(config)?;
        let inner = Orchestrator::load_state(config, state_json).map_err(to_py_err)?;
        Ok(PyTriageEnv { inner })
    }
}
