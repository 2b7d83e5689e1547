//! Tick-driven exponential smoothing.
//!
//! Every scalar that must glide rather than step (blend weights, pitch)
//! goes through a [`SmoothedValue`]. Unlike a per-sample smoother with a
//! fixed coefficient, the step here is parameterized by the real elapsed
//! time of each control tick, so the response is identical at 30 Hz or
//! 120 Hz and survives jittery tick intervals.
//!
//! ## Usage
//!
//! ```rust
//! use motor_core::SmoothedValue;
//!
//! let mut weight = SmoothedValue::new(0.0, 20.0); // rate in 1/s
//! weight.set_target(1.0);
//!
//! for _ in 0..50 {
//!     weight.advance(0.02); // 20 ms ticks
//! }
//! assert!(weight.get() > 0.99);
//! ```

use crate::math::smoothing_coeff;

/// A scalar that exponentially approaches its target each tick.
///
/// The rate is the inverse time constant in 1/s: after `1 / rate` seconds
/// the value has covered ~63% of the distance to the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedValue {
    /// Current smoothed value
    current: f32,
    /// Value being approached
    target: f32,
    /// Inverse time constant in 1/s (non-positive = instant)
    rate: f32,
}

impl SmoothedValue {
    /// Create a settled value (current == target) with the given rate.
    pub fn new(initial: f32, rate: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            rate,
        }
    }

    /// Set the value to approach.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Advance by `dt` seconds and return the new value.
    #[inline]
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.current += smoothing_coeff(dt, self.rate) * (self.target - self.current);
        self.current
    }

    /// Set the target and advance in one call.
    #[inline]
    pub fn advance_toward(&mut self, target: f32, dt: f32) -> f32 {
        self.target = target;
        self.advance(dt)
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Whether the value is within 1e-6 of its target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        libm::fabsf(self.current - self.target) < 1e-6
    }
}

impl Default for SmoothedValue {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libm::expf;

    #[test]
    fn converges_to_target() {
        let mut v = SmoothedValue::new(0.0, 10.0);
        v.set_target(1.0);
        for _ in 0..1000 {
            v.advance(0.01);
        }
        assert!((v.get() - 1.0).abs() < 1e-4, "got {}", v.get());
    }

    #[test]
    fn one_time_constant_reaches_63_percent() {
        let mut v = SmoothedValue::new(0.0, 5.0);
        v.set_target(1.0);
        // 1 / rate = 0.2 s, sliced into 20 ticks
        for _ in 0..20 {
            v.advance(0.01);
        }
        let expected = 1.0 - expf(-1.0);
        assert!((v.get() - expected).abs() < 1e-4, "got {}", v.get());
    }

    #[test]
    fn zero_rate_is_instant() {
        let mut v = SmoothedValue::new(0.0, 0.0);
        assert_eq!(v.advance_toward(0.7, 0.016), 0.7);
        assert!(v.is_settled());
    }

    #[test]
    fn zero_dt_does_not_move() {
        let mut v = SmoothedValue::new(0.2, 10.0);
        v.set_target(1.0);
        assert_eq!(v.advance(0.0), 0.2);
    }
}
