// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The random-number source used by all samplers.
//!
//! Every random draw in this crate goes through [`RandomSource::uniform`],
//! which must return values in `[0, 1)`. Any generator can be plugged into a
//! [`crate::PhotonEngine`]; if none is supplied, a [`SeededRng`] seeded from
//! the system clock is used and a warning is emitted.


use std::time::{SystemTime, UNIX_EPOCH};

use log::warn;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::constants::TAU;

/// A source of uniformly-distributed random numbers in `[0, 1)`.
pub trait RandomSource {
    /// Draw a random number from `[0, 1)`.
    fn uniform(&mut self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn uniform(&mut self) -> f64 {
        (**self).uniform()
    }
}

/// The default generator.
#[derive(Debug, Clone)]
pub struct SeededRng(ChaCha8Rng);

impl SeededRng {
    /// Create a reproducible generator.
    pub fn new(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Create a generator seeded from the system clock. This is what the
    /// engine uses when no generator was specified.
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        warn!("No random number generator was specified; using a default generator (seed {seed})");
        Self::new(seed)
    }
}

impl RandomSource for SeededRng {
    fn uniform(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Draw a pair of independent standard-normal deviates with the Box-Muller
/// transform.
pub(crate) fn gauss_pair(rng: &mut dyn RandomSource) -> (f64, f64) {
    // ln(0) is not allowed.
    let u1 = loop {
        let u = rng.uniform();
        if u > 0.0 {
            break u;
        }
    };
    let u2 = rng.uniform();
    let sqrt_2rho = (-2.0 * u1.ln()).sqrt();
    let (s, c) = (u2 * TAU).sin_cos();
    (sqrt_2rho * c, sqrt_2rho * s)
}

/// Draw from an exponential distribution with mean `avg_dist`.
pub(crate) fn exponential(rng: &mut dyn RandomSource, avg_dist: f64) -> f64 {
    debug_assert!(avg_dist > 0.0);
    let u = loop {
        let u = rng.uniform();
        if u > 0.0 {
            break u;
        }
    };
    -u.ln() * avg_dist
}

/// A generator that replays a fixed sequence of numbers, cycling when it runs
/// out. Used to force the outcome of samplers in tests.
#[cfg(test)]
pub(crate) struct Replay {
    values: Vec<f64>,
    next: usize,
}

#[cfg(test)]
impl Replay {
    pub(crate) fn new(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
            next: 0,
        }
    }
}

#[cfg(test)]
impl RandomSource for Replay {
    fn uniform(&mut self) -> f64 {
        let v = self.values[self.next % self.values.len()];
        self.next += 1;
        v
    }
}
