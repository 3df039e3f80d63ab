//! Randomized parameter sampling for the sample synthesizer.
//!
//! Every per-variant random draw (contrast, brightness, rotation angle,
//! background color) goes through [`ParamSource`] so tests can substitute a
//! deterministic sequence for the uncontrolled global generator.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The sampled transform parameters for a single variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantParams {
    /// Contrast multiplier.
    pub alpha: f32,
    /// Brightness offset, in 8-bit pixel units.
    pub beta: f32,
    /// Rotation angle in degrees, positive is counter-clockwise.
    pub angle: f32,
    /// Solid background plate color, RGB.
    pub background: [u8; 3],
}

/// Sampling ranges for [`UniformParams`].
#[derive(Debug, Clone)]
pub struct ParamRanges {
    pub contrast: RangeInclusive<f32>,
    pub brightness: RangeInclusive<f32>,
    /// Angles are drawn from `[-max_angle, +max_angle]`.
    pub max_angle: f32,
}

impl Default for ParamRanges {
    fn default() -> Self {
        Self {
            contrast: 0.7..=1.3,
            brightness: -20.0..=20.0,
            max_angle: 25.0,
        }
    }
}

/// A source of per-variant transform parameters.
pub trait ParamSource {
    fn next_params(&mut self) -> VariantParams;
}

/// Draws every parameter uniformly from its configured range.
pub struct UniformParams<R: Rng> {
    ranges: ParamRanges,
    rng: R,
}

impl UniformParams<StdRng> {
    /// A generator seeded from the OS entropy source.
    pub fn from_entropy(ranges: ParamRanges) -> Self {
        Self::with_rng(ranges, StdRng::from_entropy())
    }
}

impl<R: Rng> UniformParams<R> {
    pub fn with_rng(ranges: ParamRanges, rng: R) -> Self {
        Self { ranges, rng }
    }
}

impl<R: Rng> ParamSource for UniformParams<R> {
    fn next_params(&mut self) -> VariantParams {
        VariantParams {
            alpha: self.rng.gen_range(self.ranges.contrast.clone()),
            beta: self.rng.gen_range(self.ranges.brightness.clone()),
            angle: self
                .rng
                .gen_range(-self.ranges.max_angle..=self.ranges.max_angle),
            background: [self.rng.gen(), self.rng.gen(), self.rng.gen()],
        }
    }
}

/// Replays a fixed parameter sequence, cycling when exhausted.
pub struct FixedParams {
    sequence: Vec<VariantParams>,
    next: usize,
}

impl FixedParams {
    pub fn new(sequence: Vec<VariantParams>) -> Self {
        assert!(!sequence.is_empty(), "parameter sequence must be non-empty");
        Self { sequence, next: 0 }
    }
}

impl ParamSource for FixedParams {
    fn next_params(&mut self) -> VariantParams {
        let params = self.sequence[self.next % self.sequence.len()].clone();
        self.next += 1;
        params
    }
}
