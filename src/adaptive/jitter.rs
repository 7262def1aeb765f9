use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the tie-break term added to every ranked candidate.
pub trait JitterSource: Send + Sync {
    /// Uniform integer in `0..=max`.
    fn jitter(&self, max: i32) -> i32;
}

/// Thread-local randomness; rankings vary between calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadJitter;

impl JitterSource for ThreadJitter {
    fn jitter(&self, max: i32) -> i32 {
        if max <= 0 {
            return 0;
        }
        rand::rng().random_range(0..=max)
    }
}

/// Reproducible sequence from a fixed seed.
pub struct SeededJitter {
    rng: Mutex<StdRng>,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl JitterSource for SeededJitter {
    fn jitter(&self, max: i32) -> i32 {
        if max <= 0 {
            return 0;
        }
        self.rng.lock().random_range(0..=max)
    }
}

/// Always returns the same value, capped at `max`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedJitter(pub i32);

impl JitterSource for FixedJitter {
    fn jitter(&self, max: i32) -> i32 {
        self.0.clamp(0, max.max(0))
    }
}
