//! Serializable response curves.

use serde::{Deserialize, Serialize};

use motor_core::{CurveRef, Interpolation, PiecewiseCurve, curve_ref};

use crate::error::ConfigError;

/// Interpolation between control points, as written in profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveInterpolation {
    /// Straight segments.
    #[default]
    Linear,
    /// Smoothstep easing.
    Smooth,
}

impl From<CurveInterpolation> for Interpolation {
    fn from(kind: CurveInterpolation) -> Self {
        match kind {
            CurveInterpolation::Linear => Interpolation::Linear,
            CurveInterpolation::Smooth => Interpolation::Smooth,
        }
    }
}

/// Control-point curve.
///
/// ```toml
/// curve = { points = [[0.0, 0.8], [1.0, 1.6]], interpolation = "linear" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveConfig {
    /// `[x, y]` control points.
    pub points: Vec<[f32; 2]>,

    /// Interpolation between points.
    #[serde(default)]
    pub interpolation: CurveInterpolation,
}

impl CurveConfig {
    /// Linear curve through `points`.
    pub fn linear(points: &[(f32, f32)]) -> Self {
        Self {
            points: points.iter().map(|&(x, y)| [x, y]).collect(),
            interpolation: CurveInterpolation::Linear,
        }
    }

    /// Smoothstep curve through `points`.
    pub fn smooth(points: &[(f32, f32)]) -> Self {
        Self {
            interpolation: CurveInterpolation::Smooth,
            ..Self::linear(points)
        }
    }

    /// Whether the points are given in ascending `x` order.
    pub fn is_sorted(&self) -> bool {
        self.points.windows(2).all(|pair| pair[0][0] <= pair[1][0])
    }

    /// Build the evaluable curve.
    pub fn to_curve(&self) -> Result<PiecewiseCurve, ConfigError> {
        let pairs: Vec<(f32, f32)> = self.points.iter().map(|p| (p[0], p[1])).collect();
        let curve = PiecewiseCurve::from_pairs(&pairs, self.interpolation.into())?;
        Ok(curve)
    }

    /// Build a shared curve handle.
    pub fn to_curve_ref(&self) -> Result<CurveRef, ConfigError> {
        Ok(curve_ref(self.to_curve()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motor_core::ResponseCurve;

    #[test]
    fn parses_inline_table() {
        #[derive(Deserialize)]
        struct Wrapper {
            curve: CurveConfig,
        }
        let w: Wrapper = toml::from_str(
            r#"curve = { points = [[0.0, 1.0], [1.0, 0.5]], interpolation = "smooth" }"#,
        )
        .unwrap();
        assert_eq!(w.curve.interpolation, CurveInterpolation::Smooth);
        assert_eq!(w.curve.points, vec![[0.0, 1.0], [1.0, 0.5]]);
    }

    #[test]
    fn interpolation_defaults_to_linear() {
        #[derive(Deserialize)]
        struct Wrapper {
            curve: CurveConfig,
        }
        let w: Wrapper = toml::from_str("curve = { points = [[0.0, 0.0]] }").unwrap();
        assert_eq!(w.curve.interpolation, CurveInterpolation::Linear);
    }

    #[test]
    fn builds_evaluable_curve() {
        let config = CurveConfig::linear(&[(0.0, 0.8), (1.0, 1.6)]);
        let curve = config.to_curve().unwrap();
        assert!((curve.evaluate(0.5) - 1.2).abs() < 1e-6);
    }

    #[test]
    fn empty_curve_is_an_error() {
        use motor_core::SynthError;

        let err = CurveConfig::linear(&[]).to_curve().unwrap_err();
        assert!(matches!(err, ConfigError::Synth(SynthError::EmptyCurve)));
    }

    #[test]
    fn detects_unsorted_points() {
        assert!(CurveConfig::linear(&[(0.0, 1.0), (0.5, 1.0)]).is_sorted());
        assert!(!CurveConfig::linear(&[(0.5, 1.0), (0.0, 1.0)]).is_sorted());
    }
}
