//! Orchestrator Engine
//!
//! Episode controller and tick engine for the triage simulation:
//! - Patient arrivals (seeded Bernoulli generation)
//! - Treatment progression and completion
//! - Doctor assignment (pluggable policy)
//! - Queue statistics and episode metrics
//! - Event logging (complete episode history)
//!
//! # Architecture
//!
//! ```text
//! For each tick t:
//! 1. Progress treatments (busy doctors: remaining_time -= 1)
//! 2. Complete treatments that reached 0 (completion_time = t)
//! 3. Generate arrival (reject if queue is at max_queue)
//! 4. Assign free doctors, ascending id, one policy call each
//! 5. Advance time, refresh waits of queued patients
//! ```
//!
//! A tick either applies completely or not at all: if any step fails, the
//! state, RNG, id counter, completed cases and event log are rolled back to
//! where they were before the tick.
//!
//! # Example
//!
//! ```rust
//! use triage_simulator_core_rs::orchestrator::{EpisodeHorizon, Orchestrator, TriageConfig};
//!
//! let config = TriageConfig {
//!     num_doctors: 2,
//!     treatment_time_per_doctor: vec![4, 6],
//!     rng_seed: 7,
//!     ..TriageConfig::default()
//! };
//!
//! let mut orchestrator = Orchestrator::new(config).unwrap();
//! let horizon = EpisodeHorizon::ticks(100);
//!
//! while !orchestrator.horizon_reached(&horizon) {
//!     let result = orchestrator.step().unwrap();
//!     assert!(result.queue_stats.queue_length <= 50);
//! }
//!
//! let metrics = orchestrator.episode_metrics();
//! println!("throughput: {:.1}/h", metrics.throughput());
//! ```

use crate::arrivals::{ArrivalConfig, ArrivalGenerator, SeverityScorer, UrgencyScorer};
use crate::core::time::TimeManager;
use crate::metrics::{self, EpisodeMetrics, QueueStats, UrgencyThreshold};
use crate::models::{
    Case, CaseError, Doctor, DoctorError, DoctorId, Event, EventLog, Patient, PatientError,
    PatientId, TriageState, UrgencySignal,
};
use crate::policy::{AssignmentPolicy, PolicyConfig};
use crate::rng::RngManager;
use crate::treatment::{self, Assignment};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete episode configuration, consumed at reset
///
/// Missing fields take their [`Default`] values when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Number of doctors (0 is a valid, degenerate episode)
    pub num_doctors: usize,

    /// Capacity of the waiting queue
    pub max_queue: usize,

    /// Upper bound of patient severity
    pub max_severity: f64,

    /// Per-tick arrival probability in `[0, 1]`
    pub arrival_rate: f64,

    /// Patients already waiting at tick 0
    pub initial_numbers: usize,

    /// Treatment ticks per doctor, cycled when shorter than `num_doctors`
    pub treatment_time_per_doctor: Vec<usize>,

    /// Urgent cases finishing later than this many minutes breach the SLA
    pub sla_threshold: f64,

    /// RNG seed for deterministic simulation
    pub rng_seed: u64,

    /// Wall-clock minutes per tick
    pub minutes_per_tick: f64,

    /// Ground-truth urgency cutoff: `severity >= urgent_severity`
    pub urgent_severity: f64,

    /// Rule splitting the queue in [`QueueStats`]; defaults to severity at
    /// `urgent_severity`
    pub queue_partition: Option<UrgencyThreshold>,

    /// Assignment policy
    pub policy: PolicyConfig,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            num_doctors: 1,
            max_queue: 50,
            max_severity: 30.0,
            arrival_rate: 0.3,
            initial_numbers: 5,
            treatment_time_per_doctor: vec![4],
            sla_threshold: 30.0,
            rng_seed: 42,
            minutes_per_tick: 1.0,
            urgent_severity: 20.0,
            queue_partition: None,
            policy: PolicyConfig::default(),
        }
    }
}

impl TriageConfig {
    /// Parse a JSON config; absent fields fall back to defaults
    ///
    /// ```
    /// use triage_simulator_core_rs::orchestrator::TriageConfig;
    ///
    /// let config = TriageConfig::from_json(r#"{"num_doctors": 3, "arrival_rate": 0.8}"#).unwrap();
    /// assert_eq!(config.num_doctors, 3);
    /// assert_eq!(config.max_queue, 50);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json)
            .map_err(|e| SimulationError::SerializationError(format!("Invalid config JSON: {}", e)))
    }

    /// Check every configuration constraint
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.max_queue == 0 {
            return Err(SimulationError::InvalidConfig(
                "max_queue must be > 0".to_string(),
            ));
        }

        if self.treatment_time_per_doctor.is_empty() {
            return Err(SimulationError::InvalidConfig(
                "treatment_time_per_doctor must not be empty".to_string(),
            ));
        }

        if let Some(pos) = self.treatment_time_per_doctor.iter().position(|t| *t == 0) {
            return Err(SimulationError::InvalidConfig(format!(
                "treatment_time_per_doctor[{}] must be > 0",
                pos
            )));
        }

        if self.initial_numbers > self.max_queue {
            return Err(SimulationError::InvalidConfig(format!(
                "initial_numbers ({}) exceeds max_queue ({})",
                self.initial_numbers, self.max_queue
            )));
        }

        if !(0.0..=1.0).contains(&self.arrival_rate) {
            return Err(SimulationError::InvalidConfig(format!(
                "arrival_rate must be in [0, 1], got {}",
                self.arrival_rate
            )));
        }

        let positive = [
            ("max_severity", self.max_severity),
            ("sla_threshold", self.sla_threshold),
            ("minutes_per_tick", self.minutes_per_tick),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} must be > 0, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Treatment time of doctor `doctor_id` (list is cycled)
    ///
    /// # Panics
    /// Panics if `treatment_time_per_doctor` is empty; [`validate`](Self::validate) rejects that
    pub fn treatment_time_for(&self, doctor_id: DoctorId) -> usize {
        self.treatment_time_per_doctor[doctor_id % self.treatment_time_per_doctor.len()]
    }

    /// Effective queue partition rule
    pub fn partition(&self) -> UrgencyThreshold {
        self.queue_partition.unwrap_or(UrgencyThreshold::Severity {
            threshold: self.urgent_severity,
        })
    }

    pub(crate) fn arrival_config(&self) -> ArrivalConfig {
        ArrivalConfig {
            arrival_rate: self.arrival_rate,
            max_severity: self.max_severity,
        }
    }
}

/// Caller-owned termination rule. The controller evaluates it on request
/// but never stops on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpisodeHorizon {
    pub max_ticks: Option<usize>,
    pub max_completed: Option<usize>,
}

impl EpisodeHorizon {
    pub fn ticks(max_ticks: usize) -> Self {
        Self {
            max_ticks: Some(max_ticks),
            max_completed: None,
        }
    }

    pub fn completed(max_completed: usize) -> Self {
        Self {
            max_ticks: None,
            max_completed: Some(max_completed),
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.max_ticks.is_some() || self.max_completed.is_some()
    }

    pub fn is_reached(&self, current_tick: usize, completed: usize) -> bool {
        self.max_ticks.is_some_and(|max| current_tick >= max)
            || self.max_completed.is_some_and(|max| completed >= max)
    }
}

// ============================================================================
// Results and Errors
// ============================================================================

/// Result of a single tick
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Tick that was executed
    pub tick: usize,

    /// Queue snapshot after bookkeeping (at `tick + 1`)
    pub queue_stats: QueueStats,

    /// Cases whose treatment finished this tick
    pub completed: Vec<Case>,

    /// Patients admitted to the queue this tick
    pub arrivals: usize,

    /// Arrivals dropped because the queue was full
    pub rejected: usize,

    /// Doctor assignments made this tick
    pub assignments: Vec<Assignment>,
}

/// End-of-run summary for possibly unfinished episodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeReport {
    pub current_tick: usize,
    pub metrics: EpisodeMetrics,
    pub rejected_arrivals: usize,
    pub still_waiting: usize,
    pub in_treatment: usize,
}

/// Simulation error types
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Doctor {doctor_id} is busy with patient {patient_id}")]
    DoctorBusy {
        doctor_id: DoctorId,
        patient_id: PatientId,
    },

    #[error("Doctor not found: {0}")]
    DoctorNotFound(DoctorId),

    #[error("Patient {patient_id} is not in the waiting queue")]
    PatientNotWaiting { patient_id: PatientId },

    #[error("Patient not found: {0}")]
    PatientNotFound(PatientId),

    #[error(transparent)]
    Patient(#[from] PatientError),

    #[error(transparent)]
    Doctor(#[from] DoctorError),

    #[error(transparent)]
    Case(#[from] CaseError),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("State validation error: {0}")]
    StateValidationError(String),

    #[error("Horizon cannot be reached: {0}")]
    HorizonUnreachable(String),
}

impl SimulationError {
    /// Contract violations by the engine or a policy (as opposed to bad
    /// configuration or I/O)
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            SimulationError::DoctorBusy { .. }
                | SimulationError::DoctorNotFound(_)
                | SimulationError::PatientNotWaiting { .. }
                | SimulationError::PatientNotFound(_)
                | SimulationError::Patient(_)
                | SimulationError::Doctor(_)
                | SimulationError::Case(_)
                | SimulationError::StateValidationError(_)
        )
    }

    pub fn is_config_error(&self) -> bool {
        matches!(self, SimulationError::InvalidConfig(_))
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Episode controller owning the timeline, the RNG and all entities
///
/// # Determinism
///
/// All randomness goes through `rng_manager` (seeded xorshift64*).
/// Same seed + config + policy decisions = identical results. Each
/// orchestrator owns its state outright, so independent episodes can run on
/// separate threads.
pub struct Orchestrator {
    config: TriageConfig,

    /// Patients, doctors, waiting queue
    state: TriageState,

    time_manager: TimeManager,

    rng_manager: RngManager,

    arrival_generator: ArrivalGenerator,

    policy: Box<dyn AssignmentPolicy>,

    /// Injected risk scorer; `None` uses [`SeverityScorer`]
    scorer: Option<Box<dyn UrgencyScorer>>,

    /// Completed cases in completion order
    completed_cases: Vec<Case>,

    event_log: EventLog,

    /// Arrivals dropped on a full queue since reset
    rejected_arrivals: usize,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("time_manager", &self.time_manager)
            .field("rng_manager", &self.rng_manager)
            .field("arrival_generator", &self.arrival_generator)
            .field("completed_cases", &self.completed_cases)
            .field("event_log", &self.event_log)
            .field("rejected_arrivals", &self.rejected_arrivals)
            .finish_non_exhaustive()
    }
}

/// Everything a failed tick must roll back
struct TickCheckpoint {
    state: TriageState,
    time_manager: TimeManager,
    rng_manager: RngManager,
    arrival_generator: ArrivalGenerator,
    completed_len: usize,
    event_len: usize,
    rejected_arrivals: usize,
}

impl Orchestrator {
    /// Create an orchestrator and reset it with `config`
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidConfig`] if the config fails validation
    pub fn new(config: TriageConfig) -> Result<Self, SimulationError> {
        let policy = config.policy.build();
        Self::with_components(config, policy, None)
    }

    /// Create an orchestrator with a custom assignment policy
    pub fn with_policy(
        config: TriageConfig,
        policy: Box<dyn AssignmentPolicy>,
    ) -> Result<Self, SimulationError> {
        Self::with_components(config, policy, None)
    }

    /// Create an orchestrator with a custom policy and risk scorer
    pub fn with_components(
        config: TriageConfig,
        policy: Box<dyn AssignmentPolicy>,
        scorer: Option<Box<dyn UrgencyScorer>>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self::build(config, policy, scorer))
    }

    /// Fresh episode from a validated config
    fn build(
        config: TriageConfig,
        policy: Box<dyn AssignmentPolicy>,
        scorer: Option<Box<dyn UrgencyScorer>>,
    ) -> Self {
        let doctors: Vec<Doctor> = (0..config.num_doctors)
            .map(|id| Doctor::new(id, config.treatment_time_for(id)))
            .collect();

        let mut orchestrator = Self {
            state: TriageState::new(doctors, config.max_queue),
            time_manager: TimeManager::new(config.minutes_per_tick),
            rng_manager: RngManager::new(config.rng_seed),
            arrival_generator: ArrivalGenerator::new(config.arrival_config()),
            policy,
            scorer,
            completed_cases: Vec::new(),
            event_log: EventLog::new(),
            rejected_arrivals: 0,
            config,
        };
        orchestrator.spawn_initial_patients();

        info!(
            num_doctors = orchestrator.config.num_doctors,
            initial_queue = orchestrator.state.queue_len(),
            seed = orchestrator.config.rng_seed,
            policy = orchestrator.policy.name(),
            "episode reset"
        );
        orchestrator
    }

    /// Reassemble an orchestrator from checkpoint parts
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_checkpoint(
        config: TriageConfig,
        state: TriageState,
        current_tick: usize,
        rng_state: u64,
        next_patient_id: PatientId,
        completed_cases: Vec<Case>,
        rejected_arrivals: usize,
    ) -> Self {
        let policy = config.policy.build();
        Self {
            state,
            time_manager: TimeManager::at_tick(current_tick, config.minutes_per_tick),
            rng_manager: RngManager::new(rng_state),
            arrival_generator: ArrivalGenerator::resume(config.arrival_config(), next_patient_id),
            policy,
            scorer: None,
            completed_cases,
            event_log: EventLog::new(),
            rejected_arrivals,
            config,
        }
    }

    /// Start a new episode with `config`.
    ///
    /// The policy is rebuilt from `config.policy`; an injected scorer is
    /// kept. Returns the queue snapshot at tick 0.
    ///
    /// On a configuration error the current episode is left untouched.
    pub fn reset(&mut self, config: TriageConfig) -> Result<QueueStats, SimulationError> {
        let policy = config.policy.build();
        self.reset_with_policy(config, policy)
    }

    /// Start a new episode with `config` and a custom policy
    pub fn reset_with_policy(
        &mut self,
        config: TriageConfig,
        policy: Box<dyn AssignmentPolicy>,
    ) -> Result<QueueStats, SimulationError> {
        config.validate()?;
        let scorer = self.scorer.take();
        *self = Self::build(config, policy, scorer);
        Ok(self.queue_stats())
    }

    fn spawn_initial_patients(&mut self) {
        for _ in 0..self.config.initial_numbers {
            let patient = self.arrival_generator.spawn(0, &mut self.rng_manager);
            self.admit(patient, 0);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn current_tick(&self) -> usize {
        self.time_manager.current_tick()
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    pub fn state(&self) -> &TriageState {
        &self.state
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Completed cases in completion order
    pub fn completed_cases(&self) -> &[Case] {
        &self.completed_cases
    }

    /// Overflow events since reset
    pub fn rejected_arrivals(&self) -> usize {
        self.rejected_arrivals
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    pub(crate) fn rng_state(&self) -> u64 {
        self.rng_manager.get_state()
    }

    pub(crate) fn next_patient_id(&self) -> PatientId {
        self.arrival_generator.next_patient_id()
    }

    /// Replace the risk scorer for subsequent arrivals
    pub fn set_scorer(&mut self, scorer: Box<dyn UrgencyScorer>) {
        self.scorer = Some(scorer);
    }

    /// Overwrite the risk signal of a waiting patient
    ///
    /// # Errors
    ///
    /// [`SimulationError::PatientNotWaiting`] unless the patient is queued
    pub fn set_urgency(
        &mut self,
        patient_id: PatientId,
        signal: UrgencySignal,
    ) -> Result<(), SimulationError> {
        if !self.state.is_waiting(patient_id) {
            return Err(SimulationError::PatientNotWaiting { patient_id });
        }
        self.state
            .get_patient_mut(patient_id)
            .ok_or(SimulationError::PatientNotFound(patient_id))?
            .set_urgency(signal);
        Ok(())
    }

    // ========================================================================
    // Metrics
    // ========================================================================

    /// Queue snapshot at the current tick, partitioned by the config rule
    pub fn queue_stats(&self) -> QueueStats {
        let rule = self.config.partition();
        metrics::queue_stats(
            &self.state.waiting_patients(),
            self.current_tick(),
            |p| rule.is_urgent(p),
        )
    }

    /// Metrics over completed cases, duration = elapsed episode minutes
    pub fn episode_metrics(&self) -> EpisodeMetrics {
        metrics::episode_metrics(
            &self.completed_cases,
            self.config.sla_threshold,
            self.time_manager.elapsed_minutes(),
        )
    }

    pub fn episode_report(&self) -> EpisodeReport {
        EpisodeReport {
            current_tick: self.current_tick(),
            metrics: self.episode_metrics(),
            rejected_arrivals: self.rejected_arrivals,
            still_waiting: self.state.queue_len(),
            in_treatment: self.state.num_busy_doctors(),
        }
    }

    pub fn horizon_reached(&self, horizon: &EpisodeHorizon) -> bool {
        horizon.is_reached(self.current_tick(), self.completed_cases.len())
    }

    // ========================================================================
    // Event Logging
    // ========================================================================

    fn log_event(&mut self, event: Event) {
        self.event_log.log(event);
    }

    // ========================================================================
    // Tick Loop Implementation
    // ========================================================================

    /// Execute one simulation tick
    ///
    /// # Returns
    ///
    /// * `Ok(StepResult)` - Tick applied; time advanced by one
    /// * `Err(SimulationError)` - Invalid state reached; nothing from this
    ///   tick was committed
    pub fn step(&mut self) -> Result<StepResult, SimulationError> {
        let checkpoint = self.capture();
        match self.run_tick() {
            Ok(result) => Ok(result),
            Err(err) => {
                warn!(tick = checkpoint.time_manager.current_tick(), error = %err, "tick aborted, rolling back");
                self.restore(checkpoint);
                Err(err)
            }
        }
    }

    /// Step until `horizon` is reached, collecting every result
    ///
    /// A completion-only horizon is checked for reachability up front, and the
    /// run stops once a tick makes no progress: nothing admitted, assigned or
    /// completed and every doctor idle while patients wait (or while no more
    /// can arrive). Ticks applied before the stall stay committed.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidConfig`] for an unbounded horizon or a
    ///   completion target the current episode can never reach
    /// - [`SimulationError::HorizonUnreachable`] when the episode stalls
    /// - the first failing tick
    pub fn run_until(&mut self, horizon: &EpisodeHorizon) -> Result<Vec<StepResult>, SimulationError> {
        if !horizon.is_bounded() {
            return Err(SimulationError::InvalidConfig(
                "horizon needs max_ticks or max_completed".to_string(),
            ));
        }
        let completion_only = horizon.max_ticks.is_none();
        if completion_only && !self.horizon_reached(horizon) {
            self.check_completion_target(horizon)?;
        }

        let mut results = Vec::new();
        while !self.horizon_reached(horizon) {
            let result = self.step()?;
            let stalled = completion_only && self.is_stalled(&result);
            results.push(result);

            if stalled && !self.horizon_reached(horizon) {
                warn!(
                    tick = self.current_tick(),
                    completed = self.completed_cases.len(),
                    waiting = self.state.queue_len(),
                    "episode stalled before completion horizon"
                );
                return Err(SimulationError::HorizonUnreachable(format!(
                    "no progress at tick {} with {} completed and {} waiting",
                    self.current_tick(),
                    self.completed_cases.len(),
                    self.state.queue_len()
                )));
            }
        }
        Ok(results)
    }

    /// Reject completion targets that no sequence of ticks can reach
    fn check_completion_target(&self, horizon: &EpisodeHorizon) -> Result<(), SimulationError> {
        let Some(target) = horizon.max_completed else {
            return Ok(());
        };
        if self.config.num_doctors == 0 {
            return Err(SimulationError::InvalidConfig(
                "completion horizon can never be reached without doctors".to_string(),
            ));
        }
        let reachable =
            self.completed_cases.len() + self.state.queue_len() + self.state.num_busy_doctors();
        if self.config.arrival_rate <= 0.0 && reachable < target {
            return Err(SimulationError::InvalidConfig(format!(
                "completion horizon {} exceeds the {} patients this episode can finish without arrivals",
                target, reachable
            )));
        }
        Ok(())
    }

    fn is_stalled(&self, result: &StepResult) -> bool {
        let idle = result.arrivals == 0
            && result.assignments.is_empty()
            && result.completed.is_empty()
            && self.state.num_busy_doctors() == 0;
        idle && (self.state.queue_len() > 0 || self.config.arrival_rate <= 0.0)
    }

    fn capture(&self) -> TickCheckpoint {
        TickCheckpoint {
            state: self.state.clone(),
            time_manager: self.time_manager.clone(),
            rng_manager: self.rng_manager.clone(),
            arrival_generator: self.arrival_generator.clone(),
            completed_len: self.completed_cases.len(),
            event_len: self.event_log.len(),
            rejected_arrivals: self.rejected_arrivals,
        }
    }

    fn restore(&mut self, checkpoint: TickCheckpoint) {
        self.state = checkpoint.state;
        self.time_manager = checkpoint.time_manager;
        self.rng_manager = checkpoint.rng_manager;
        self.arrival_generator = checkpoint.arrival_generator;
        self.completed_cases.truncate(checkpoint.completed_len);
        self.event_log.truncate(checkpoint.event_len);
        self.rejected_arrivals = checkpoint.rejected_arrivals;
    }

    fn run_tick(&mut self) -> Result<StepResult, SimulationError> {
        let tick = self.current_tick();

        // STEPS 1-2: TREATMENT PROGRESSION AND COMPLETION
        let completions = treatment::advance_treatments(&mut self.state, tick)?;
        let mut completed = Vec::with_capacity(completions.len());
        for completion in completions {
            let case = self.case_for(completion.patient_id, completion.doctor_id)?;
            let turnaround_ticks = self
                .state
                .get_patient(completion.patient_id)
                .and_then(|p| p.turnaround_ticks())
                .unwrap_or(0);
            self.log_event(Event::TreatmentComplete {
                tick,
                doctor_id: completion.doctor_id,
                patient_id: completion.patient_id,
                turnaround_ticks,
            });
            self.completed_cases.push(case.clone());
            completed.push(case);
        }

        // STEP 3: ARRIVAL
        let mut arrivals = 0;
        let mut rejected = 0;
        if let Some(patient) = self.arrival_generator.generate(tick, &mut self.rng_manager) {
            if self.admit(patient, tick) {
                arrivals += 1;
            } else {
                rejected += 1;
            }
        }

        // STEP 4: ASSIGNMENT
        let mut assignments = Vec::new();
        for doctor_id in self.state.free_doctor_ids() {
            if self.state.queue_len() == 0 {
                break;
            }

            let selection = {
                let waiting = self.state.waiting_patients();
                let doctor = self
                    .state
                    .get_doctor(doctor_id)
                    .ok_or(SimulationError::DoctorNotFound(doctor_id))?;
                self.policy.select_patient(doctor, &waiting, tick)
            };

            if let Some(patient_id) = selection {
                let assignment = treatment::assign(&mut self.state, doctor_id, patient_id, tick)?;
                self.log_event(Event::Assignment {
                    tick,
                    doctor_id,
                    patient_id,
                    waited_ticks: assignment.waited_ticks,
                });
                assignments.push(assignment);
            }
        }

        // STEP 5: BOOKKEEPING
        self.time_manager.advance_tick();
        self.state.refresh_waits(self.current_tick());

        let queue_stats = self.queue_stats();
        debug!(
            tick,
            arrivals,
            rejected,
            completed = completed.len(),
            assigned = assignments.len(),
            queue_length = queue_stats.queue_length,
            "tick applied"
        );

        Ok(StepResult {
            tick,
            queue_stats,
            completed,
            arrivals,
            rejected,
            assignments,
        })
    }

    /// Score and enqueue a new patient; false if the queue was full
    fn admit(&mut self, patient: Patient, tick: usize) -> bool {
        let patient_id = patient.id();
        let severity = patient.severity();

        if self.state.is_queue_full() {
            self.rejected_arrivals += 1;
            debug!(tick, patient_id, queue_length = self.state.queue_len(), "arrival rejected, queue full");
            self.log_event(Event::ArrivalRejected {
                tick,
                patient_id,
                severity,
                queue_length: self.state.queue_len(),
            });
            return false;
        }

        let signal = match self.scorer.as_mut() {
            Some(scorer) => scorer.score(&patient),
            None => SeverityScorer::new(self.config.max_severity).score(&patient),
        };

        // Capacity was checked above, so enqueue cannot hand the patient back
        if self.state.enqueue(patient.with_urgency(signal)).is_err() {
            self.rejected_arrivals += 1;
            return false;
        }
        self.log_event(Event::Arrival {
            tick,
            patient_id,
            severity,
        });
        true
    }

    /// Evaluation record for a patient that just finished treatment
    fn case_for(&self, patient_id: PatientId, doctor_id: DoctorId) -> Result<Case, SimulationError> {
        let patient = self
            .state
            .get_patient(patient_id)
            .ok_or(SimulationError::PatientNotFound(patient_id))?;
        let read_ticks = self
            .state
            .get_doctor(doctor_id)
            .ok_or(SimulationError::DoctorNotFound(doctor_id))?
            .treatment_time();
        let completion_tick = patient
            .completion_time()
            .ok_or(CaseError::NotCompleted { id: patient_id })?;

        let case = Case::new(
            patient_id,
            self.time_manager.ticks_to_minutes(patient.arrival_time()),
            patient.severity() >= self.config.urgent_severity,
            patient.pred_urgency(),
            patient.uncertainty(),
            self.time_manager.ticks_to_minutes(read_ticks),
        )
        .completed_at(self.time_manager.ticks_to_minutes(completion_tick))?;
        Ok(case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let cases = vec![
            TriageConfig {
                max_queue: 0,
                initial_numbers: 0,
                ..TriageConfig::default()
            },
            TriageConfig {
                treatment_time_per_doctor: vec![],
                ..TriageConfig::default()
            },
            TriageConfig {
                treatment_time_per_doctor: vec![3, 0],
                ..TriageConfig::default()
            },
            TriageConfig {
                initial_numbers: 51,
                ..TriageConfig::default()
            },
            TriageConfig {
                arrival_rate: 1.5,
                ..TriageConfig::default()
            },
            TriageConfig {
                arrival_rate: f64::NAN,
                ..TriageConfig::default()
            },
            TriageConfig {
                sla_threshold: 0.0,
                ..TriageConfig::default()
            },
            TriageConfig {
                max_severity: -1.0,
                ..TriageConfig::default()
            },
        ];

        for config in cases {
            let err = config.validate().unwrap_err();
            assert!(err.is_config_error(), "unexpected error {:?}", err);
        }
    }

    #[test]
    fn test_treatment_time_cycles() {
        let config = TriageConfig {
            num_doctors: 5,
            treatment_time_per_doctor: vec![2, 7],
            ..TriageConfig::default()
        };
        let times: Vec<usize> = (0..5).map(|d| config.treatment_time_for(d)).collect();
        assert_eq!(times, vec![2, 7, 2, 7, 2]);
    }

    #[test]
    fn test_horizon() {
        let horizon = EpisodeHorizon {
            max_ticks: Some(10),
            max_completed: Some(3),
        };
        assert!(!horizon.is_reached(9, 2));
        assert!(horizon.is_reached(10, 0));
        assert!(horizon.is_reached(0, 3));
        assert!(!EpisodeHorizon::default().is_reached(1_000, 1_000));
    }
}
