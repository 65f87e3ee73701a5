// Dispense Failure Sources
//
// Decides, once per purchase that reaches the dispense step, whether the
// machine jams. Injected into the store so tests can force either branch.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Capability polled by `VendorStore::product_purchase`.
pub trait FailureSource {
    /// `true` means the dispense step fails.
    fn decide_failure(&mut self) -> bool;
}

impl<F: FailureSource + ?Sized> FailureSource for Box<F> {
    fn decide_failure(&mut self) -> bool {
        (**self).decide_failure()
    }
}

/// The machine always dispenses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverFail;

impl FailureSource for NeverFail {
    fn decide_failure(&mut self) -> bool {
        false
    }
}

/// The machine never dispenses.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFail;

impl FailureSource for AlwaysFail {
    fn decide_failure(&mut self) -> bool {
        true
    }
}

/// Replays a fixed sequence of decisions.
///
/// Polling past the end of the script panics: a purchase asked for more
/// decisions than the caller expected.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFailure {
    decisions: VecDeque<bool>,
}

impl ScriptedFailure {
    pub fn new(decisions: impl IntoIterator<Item = bool>) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
        }
    }

    /// Decisions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.decisions.len()
    }
}

impl FailureSource for ScriptedFailure {
    fn decide_failure(&mut self) -> bool {
        match self.decisions.pop_front() {
            Some(decision) => decision,
            None => panic!("failure source polled more often than scripted"),
        }
    }
}

/// Jams with a fixed probability.
#[derive(Debug)]
pub struct RandomFailure {
    rng: SmallRng,
    rate: f64,
}

impl RandomFailure {
    /// Seeded from OS entropy.
    pub fn from_entropy(rate: f64) -> Self {
        Self {
            rng: SmallRng::from_entropy(),
            rate: clamp_rate(rate),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64, rate: f64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            rate: clamp_rate(rate),
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl FailureSource for RandomFailure {
    fn decide_failure(&mut self) -> bool {
        self.rng.gen_bool(self.rate)
    }
}

fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}
