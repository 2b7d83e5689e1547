//! Scalar helpers shared by every synthesis stage.
//!
//! All functions are allocation-free and `no_std` friendly.
//!
//! - [`lerp`] / [`inverse_lerp`] - clamped linear interpolation
//! - [`clamp01`] - limit to the unit interval
//! - [`smoothing_coeff`] - tick-rate independent one-pole coefficient
//! - [`wrap_phase`] - keep a phase accumulator inside `[0, 2π)`
//! - [`normalized_rpm`] - RPM rescaled between idle and max

use core::f32::consts::TAU;
use libm::{expf, fabsf, floorf};

/// Clamp a value to `[0, 1]`.
///
/// NaN maps to 0 so a corrupted input can never leak into a gain.
#[inline]
pub fn clamp01(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Linear interpolation from `a` to `b` with `t` clamped to `[0, 1]`.
///
/// # Example
/// ```rust
/// use motor_core::lerp;
///
/// assert_eq!(lerp(0.5, 1.0, 0.5), 0.75);
/// assert_eq!(lerp(0.5, 1.0, 2.0), 1.0);
/// ```
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * clamp01(t)
}

/// Inverse of [`lerp`]: where `value` sits between `a` and `b`, clamped to `[0, 1]`.
///
/// Returns 0 when `a == b`.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    let span = b - a;
    if fabsf(span) <= f32::EPSILON {
        0.0
    } else {
        clamp01((value - a) / span)
    }
}

/// One-pole smoothing coefficient for a step of `dt` seconds.
///
/// ```text
/// coeff = 1 - exp(-dt * rate)
/// ```
///
/// `rate` is in 1/s (the inverse time constant). Applying
/// `current += coeff * (target - current)` every tick gives the same
/// trajectory regardless of how the elapsed time is sliced into ticks.
///
/// A non-positive `rate` disables smoothing (coefficient 1, instant).
/// A non-positive `dt` yields 0 (no movement).
#[inline]
pub fn smoothing_coeff(dt: f32, rate: f32) -> f32 {
    if dt <= 0.0 {
        0.0
    } else if rate <= 0.0 {
        1.0
    } else {
        1.0 - expf(-dt * rate)
    }
}

/// Wrap a phase in radians into `[0, 2π)`.
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase - TAU * floorf(phase / TAU);
    // floor rounding can land exactly on TAU
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// RPM rescaled to `[0, 1]` between `idle_rpm` and `max_rpm`.
///
/// # Example
/// ```rust
/// use motor_core::normalized_rpm;
///
/// assert_eq!(normalized_rpm(800.0, 800.0, 7000.0), 0.0);
/// assert_eq!(normalized_rpm(3900.0, 800.0, 7000.0), 0.5);
/// assert_eq!(normalized_rpm(9000.0, 800.0, 7000.0), 1.0);
/// ```
#[inline]
pub fn normalized_rpm(rpm: f32, idle_rpm: f32, max_rpm: f32) -> f32 {
    inverse_lerp(idle_rpm, max_rpm, rpm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp01_handles_nan_and_bounds() {
        assert_eq!(clamp01(f32::NAN), 0.0);
        assert_eq!(clamp01(-3.0), 0.0);
        assert_eq!(clamp01(7.0), 1.0);
        assert_eq!(clamp01(0.25), 0.25);
    }

    #[test]
    fn inverse_lerp_degenerate_span() {
        assert_eq!(inverse_lerp(5.0, 5.0, 10.0), 0.0);
    }

    #[test]
    fn smoothing_coeff_is_tick_rate_independent() {
        // Two half-steps must land where one full step lands.
        let rate = 12.0;
        let mut a = 0.0f32;
        a += smoothing_coeff(0.02, rate) * (1.0 - a);

        let mut b = 0.0f32;
        b += smoothing_coeff(0.01, rate) * (1.0 - b);
        b += smoothing_coeff(0.01, rate) * (1.0 - b);

        assert!((a - b).abs() < 1e-6, "one step {a} vs two steps {b}");
    }

    #[test]
    fn smoothing_coeff_edges() {
        assert_eq!(smoothing_coeff(0.0, 10.0), 0.0);
        assert_eq!(smoothing_coeff(0.01, 0.0), 1.0);
        let c = smoothing_coeff(0.01, 10.0);
        assert!(c > 0.0 && c < 1.0);
    }

    #[test]
    fn wrap_phase_stays_in_range() {
        for i in -50..50 {
            let p = wrap_phase(i as f32 * 1.37);
            assert!((0.0..TAU).contains(&p), "phase {p} out of range");
        }
        assert!((wrap_phase(TAU + 0.5) - 0.5).abs() < 1e-5);
    }
}
