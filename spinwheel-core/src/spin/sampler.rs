// src/spin/sampler.rs

use rand::Rng;

use crate::segment::FULL_TURN;

/// Source of the random stop offset, uniform over `[0, 360)`.
pub trait OffsetSampler: Send + Sync {
    fn sample_offset(&self) -> f64;
}

/// Thread-local RNG. Not cryptographically meaningful for this use.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSampler;

impl OffsetSampler for ThreadRngSampler {
    fn sample_offset(&self) -> f64 {
        rand::rng().random_range(0.0..FULL_TURN)
    }
}

/// Always stops at the same offset. Handy for demos and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedOffset(pub f64);

impl OffsetSampler for FixedOffset {
    fn sample_offset(&self) -> f64 {
        self.0
    }
}

/// Clamp a sampled value into `[0, 360)`; anything non-finite becomes 0.
pub(crate) fn normalize_offset(offset: f64) -> f64 {
    if offset.is_finite() {
        offset.rem_euclid(FULL_TURN)
    } else {
        0.0
    }
}
