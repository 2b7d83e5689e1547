//! Designer-authored response curves.
//!
//! Pitch, low-pass, distortion and single-layer volume are all shaped by a
//! user curve `f: [0, 1] -> ℝ`. The synthesis code only needs evaluation,
//! so the seam is the [`ResponseCurve`] trait; [`PiecewiseCurve`] is the
//! stock control-point implementation and plain closures work too.
//!
//! # Example
//!
//! ```rust
//! use motor_core::{Interpolation, PiecewiseCurve, ResponseCurve};
//!
//! let curve = PiecewiseCurve::from_pairs(&[(0.0, 0.5), (1.0, 1.5)], Interpolation::Linear)
//!     .unwrap();
//! assert_eq!(curve.evaluate(0.5), 1.0);
//! assert_eq!(curve.evaluate(4.0), 1.5); // clamped past the last point
//!
//! // Any closure is a curve
//! let squared = |x: f32| x * x;
//! assert_eq!(squared.evaluate(0.5), 0.25);
//! ```

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::error::SynthError;

/// A deterministic scalar response function.
pub trait ResponseCurve {
    /// Evaluate the curve at `x`.
    fn evaluate(&self, x: f32) -> f32;
}

impl<F> ResponseCurve for F
where
    F: Fn(f32) -> f32,
{
    #[inline]
    fn evaluate(&self, x: f32) -> f32 {
        self(x)
    }
}

/// Shared, thread-safe handle to a curve.
pub type CurveRef = Arc<dyn ResponseCurve + Send + Sync>;

/// Wrap any curve into a [`CurveRef`].
pub fn curve_ref<C>(curve: C) -> CurveRef
where
    C: ResponseCurve + Send + Sync + 'static,
{
    Arc::new(curve)
}

/// How a [`PiecewiseCurve`] fills the gap between two control points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// Straight line segments.
    #[default]
    Linear,
    /// Smoothstep easing: flat tangents at every control point.
    Smooth,
}

/// A single `(x, y)` control point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvePoint {
    /// Input coordinate.
    pub x: f32,
    /// Output value.
    pub y: f32,
}

impl CurvePoint {
    /// Create a control point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Control-point curve with binary-search lookup.
///
/// Points are sorted by `x` at construction. Inputs before the first
/// point or after the last return that endpoint's `y`.
#[derive(Clone, Debug, PartialEq)]
pub struct PiecewiseCurve {
    points: Vec<CurvePoint>,
    interpolation: Interpolation,
}

impl PiecewiseCurve {
    /// Build a curve from control points.
    ///
    /// Fails on an empty list or any non-finite coordinate.
    pub fn new(
        mut points: Vec<CurvePoint>,
        interpolation: Interpolation,
    ) -> Result<Self, SynthError> {
        if points.is_empty() {
            return Err(SynthError::EmptyCurve);
        }
        if let Some(index) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(SynthError::NonFiniteCurvePoint(index));
        }
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        Ok(Self {
            points,
            interpolation,
        })
    }

    /// Build a curve from `(x, y)` pairs.
    pub fn from_pairs(
        pairs: &[(f32, f32)],
        interpolation: Interpolation,
    ) -> Result<Self, SynthError> {
        Self::new(
            pairs.iter().map(|&(x, y)| CurvePoint::new(x, y)).collect(),
            interpolation,
        )
    }

    /// A flat curve.
    pub fn constant(value: f32) -> Self {
        Self {
            points: alloc::vec![CurvePoint::new(0.0, value)],
            interpolation: Interpolation::Linear,
        }
    }

    /// A straight ramp from `(0, start)` to `(1, end)`.
    pub fn ramp(start: f32, end: f32) -> Self {
        Self {
            points: alloc::vec![CurvePoint::new(0.0, start), CurvePoint::new(1.0, end)],
            interpolation: Interpolation::Linear,
        }
    }

    /// Sorted control points.
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Interpolation mode.
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }
}

impl ResponseCurve for PiecewiseCurve {
    fn evaluate(&self, x: f32) -> f32 {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if x.is_nan() || x <= first.x {
            return first.y;
        }
        if x >= last.x {
            return last.y;
        }

        // First point strictly right of x; guaranteed in 1..len by the checks above.
        let hi = self.points.partition_point(|p| p.x <= x);
        let a = self.points[hi - 1];
        let b = self.points[hi];
        let span = b.x - a.x;
        if span <= f32::EPSILON {
            return b.y;
        }

        let t = (x - a.x) / span;
        let t = match self.interpolation {
            Interpolation::Linear => t,
            Interpolation::Smooth => t * t * (3.0 - 2.0 * t),
        };
        a.y + (b.y - a.y) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn rejects_empty_and_non_finite() {
        assert_eq!(
            PiecewiseCurve::new(Vec::new(), Interpolation::Linear),
            Err(SynthError::EmptyCurve)
        );
        assert_eq!(
            PiecewiseCurve::from_pairs(&[(0.0, 1.0), (f32::NAN, 2.0)], Interpolation::Linear),
            Err(SynthError::NonFiniteCurvePoint(1))
        );
    }

    #[test]
    fn sorts_points() {
        let curve = PiecewiseCurve::from_pairs(&[(1.0, 3.0), (0.0, 1.0)], Interpolation::Linear)
            .unwrap();
        assert_eq!(curve.points()[0].x, 0.0);
        assert_eq!(curve.evaluate(0.5), 2.0);
    }

    #[test]
    fn linear_interpolates_between_points() {
        let curve = PiecewiseCurve::new(
            vec![
                CurvePoint::new(0.0, 0.0),
                CurvePoint::new(0.5, 1.0),
                CurvePoint::new(1.0, 0.0),
            ],
            Interpolation::Linear,
        )
        .unwrap();
        assert!((curve.evaluate(0.25) - 0.5).abs() < 1e-6);
        assert!((curve.evaluate(0.75) - 0.5).abs() < 1e-6);
        assert_eq!(curve.evaluate(0.5), 1.0);
    }

    #[test]
    fn smooth_has_flat_ends_and_shared_midpoint() {
        let curve =
            PiecewiseCurve::from_pairs(&[(0.0, 0.0), (1.0, 1.0)], Interpolation::Smooth).unwrap();
        assert!((curve.evaluate(0.5) - 0.5).abs() < 1e-6);
        // Eased: slower than linear near the start
        assert!(curve.evaluate(0.1) < 0.1);
    }

    #[test]
    fn clamps_outside_range() {
        let curve = PiecewiseCurve::ramp(0.2, 0.8);
        assert_eq!(curve.evaluate(-1.0), 0.2);
        assert_eq!(curve.evaluate(2.0), 0.8);
        assert_eq!(curve.evaluate(f32::NAN), 0.2);
    }

    #[test]
    fn constant_curve() {
        let curve = PiecewiseCurve::constant(0.4);
        assert_eq!(curve.evaluate(0.0), 0.4);
        assert_eq!(curve.evaluate(0.9), 0.4);
    }

    #[test]
    fn closures_are_curves() {
        let c: CurveRef = curve_ref(|x: f32| 2.0 * x);
        assert_eq!(c.evaluate(0.25), 0.5);
    }
}
