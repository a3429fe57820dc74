//! Time management for the simulation
//!
//! The simulation operates in discrete ticks. Each tick stands for a fixed
//! number of wall-clock minutes, which is what SLA thresholds and throughput
//! are expressed in.

use serde::{Deserialize, Serialize};

/// Manages simulation time in discrete ticks
///
/// # Example
/// ```
/// use triage_simulator_core_rs::TimeManager;
///
/// let mut time = TimeManager::new(5.0); // 5 minutes per tick
/// assert_eq!(time.current_tick(), 0);
///
/// time.advance_tick();
/// assert_eq!(time.current_tick(), 1);
/// assert_eq!(time.elapsed_minutes(), 5.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeManager {
    /// Total ticks elapsed since reset
    current_tick: usize,
    /// Minutes represented by one tick
    minutes_per_tick: f64,
}

impl TimeManager {
    /// Create a new TimeManager at tick 0
    ///
    /// # Panics
    /// Panics if `minutes_per_tick` is not strictly positive
    pub fn new(minutes_per_tick: f64) -> Self {
        assert!(minutes_per_tick > 0.0, "minutes_per_tick must be positive");
        Self {
            current_tick: 0,
            minutes_per_tick,
        }
    }

    /// Recreate a TimeManager positioned at `tick` (checkpoint restore)
    pub fn at_tick(tick: usize, minutes_per_tick: f64) -> Self {
        let mut time = Self::new(minutes_per_tick);
        time.current_tick = tick;
        time
    }

    /// Advance time by one tick
    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
    }

    /// Get the current tick (total ticks since reset)
    pub fn current_tick(&self) -> usize {
        self.current_tick
    }

    pub fn minutes_per_tick(&self) -> f64 {
        self.minutes_per_tick
    }

    /// Convert a tick count or tick stamp to minutes
    ///
    /// ```
    /// use triage_simulator_core_rs::TimeManager;
    ///
    /// let time = TimeManager::new(2.5);
    /// assert_eq!(time.ticks_to_minutes(4), 10.0);
    /// ```
    pub fn ticks_to_minutes(&self, ticks: usize) -> f64 {
        ticks as f64 * self.minutes_per_tick
    }

    /// Minutes elapsed since reset
    pub fn elapsed_minutes(&self) -> f64 {
        self.ticks_to_minutes(self.current_tick)
    }
}
