//! Uniform random sources for segment rerolls.
//!
//! Track generation only ever needs uniform draws in `[0, 1)`. The
//! [`UniformSource`] trait keeps the source caller-supplied so tracks are
//! reproducible: [`SeededSource`] wraps a PCG generator whose state can be
//! serialized with a simulation snapshot, and [`FixedSource`] returns one
//! constant for regression tests.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// A source of uniform draws in `[0, 1)`.
pub trait UniformSource {
    /// Draw the next value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

impl<S: UniformSource + ?Sized> UniformSource for &mut S {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

impl UniformSource for rand::rngs::ThreadRng {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

// ---------------------------------------------------------------------------
// SeededSource
// ---------------------------------------------------------------------------

/// Deterministic PCG-backed source.
///
/// Two sources built from the same seed produce the same sequence, and the
/// full generator state round-trips through serde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededSource {
    rng: Pcg64,
}

impl SeededSource {
    /// Create a source from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
        }
    }
}

impl UniformSource for SeededSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

// ---------------------------------------------------------------------------
// FixedSource
// ---------------------------------------------------------------------------

/// Returns the same value for every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSource(f64);

impl FixedSource {
    /// Create a source that always yields `value`.
    ///
    /// # Panics
    ///
    /// Panics if `value` is not in `[0, 1)`.
    pub fn new(value: f64) -> Self {
        assert!(
            (0.0..1.0).contains(&value),
            "fixed uniform value must be in [0, 1), got {value}"
        );
        Self(value)
    }
}

impl UniformSource for FixedSource {
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
