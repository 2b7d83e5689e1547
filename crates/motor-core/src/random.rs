//! Seeded uniform random source for pitch jitter and burble selection.

use rand_core::{RngCore, SeedableRng};
use rand_xorshift::XorShiftRng;

/// Deterministic xorshift generator.
///
/// Two sources built from the same seed yield the same sequence, which
/// keeps offline simulations reproducible.
#[derive(Clone, Debug)]
pub struct JitterSource {
    inner: XorShiftRng,
}

impl JitterSource {
    /// Create a source from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            inner: XorShiftRng::seed_from_u64(seed),
        }
    }

    /// Uniform value in `[0, 1)`.
    #[inline]
    pub fn next_unit(&mut self) -> f32 {
        // top 24 bits fill the f32 mantissa exactly
        (self.inner.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform value in `[low, high)`.
    #[inline]
    pub fn range(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.next_unit()
    }

    /// Uniform value in `[-amount, amount)`.
    #[inline]
    pub fn bipolar(&mut self, amount: f32) -> f32 {
        self.range(-amount, amount)
    }

    /// Uniform index in `0..len`; 0 when `len` is 0.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let i = (self.next_unit() * len as f32) as usize;
        i.min(len - 1)
    }
}

impl Default for JitterSource {
    fn default() -> Self {
        Self::new(0x6d6f_746f_72)
    }
}
