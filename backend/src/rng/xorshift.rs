//! xorshift64* generator for the triage simulation
//!
//! One instance is owned by each episode controller. Nothing else in the
//! crate draws random numbers, so two episodes built from the same seed and
//! config replay identically, and episodes on different threads never share
//! generator state.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use triage_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let arrived = rng.bernoulli(0.3);
/// let severity = rng.uniform(0.0, 30.0);
/// assert!(severity >= 0.0 && severity < 30.0);
/// # let _ = arrived;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed.
    ///
    /// A zero seed is mapped to 1 (xorshift cannot leave the all-zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Derive an independent generator for a parallel episode.
    ///
    /// The derived seed is a splitmix64 mix of `seed` and `stream`, so
    /// `(seed, 0)`, `(seed, 1)`, ... give uncorrelated streams for batched
    /// rollouts while staying reproducible.
    ///
    /// ```
    /// use triage_simulator_core_rs::RngManager;
    ///
    /// let a = RngManager::for_stream(7, 0);
    /// let b = RngManager::for_stream(7, 1);
    /// assert_ne!(a.get_state(), b.get_state());
    /// assert_eq!(a, RngManager::for_stream(7, 0));
    /// ```
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        let mut z = seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self::new(z ^ (z >> 31))
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Bernoulli trial with success probability `p`.
    ///
    /// Always consumes exactly one draw. `p <= 0.0` never succeeds and
    /// `p >= 1.0` always succeeds.
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform f64 in `[low, high)`. Returns `low` when the interval is empty.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let u = self.next_f64();
        if high <= low {
            return low;
        }
        low + u * (high - low)
    }

    /// Current internal state, for checkpointing.
    ///
    /// `RngManager::new(rng.get_state())` continues the exact same sequence
    /// (the state is never zero).
    pub fn get_state(&self) -> u64 {
        self.state
    }
}
