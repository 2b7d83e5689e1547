//! Load/RPM driven spectral shaping.
//!
//! ```text
//! load_factor     = lerp(1 - load, 1, 1 - muffling)
//! combined        = (load_factor + normalized_rpm) / 2
//! low_pass_cutoff = low_pass_curve(1 - load_factor) * low_pass_intensity
//! distortion      = distortion_curve(combined) * distortion_intensity
//! ```
//!
//! With `muffling = 0` the load factor is pinned at 1 and the low-pass
//! curve is always read at 0.

use crate::curve::{CurveRef, PiecewiseCurve, curve_ref};
use crate::math::{clamp01, lerp};

/// Tuning for [`EffectModulator`].
#[derive(Clone)]
pub struct EffectConfig {
    /// How strongly load closes the low-pass, 0..1.
    pub muffling_intensity: f32,
    /// Cutoff scale, typically in Hz.
    pub low_pass_intensity: f32,
    /// Low-pass response over `1 - load_factor`.
    pub low_pass_curve: CurveRef,
    /// Distortion scale.
    pub distortion_intensity: f32,
    /// Distortion response over the combined load/RPM factor.
    pub distortion_curve: CurveRef,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            muffling_intensity: 0.0,
            low_pass_intensity: 22_000.0,
            low_pass_curve: curve_ref(PiecewiseCurve::ramp(1.0, 0.25)),
            distortion_intensity: 0.0,
            distortion_curve: curve_ref(PiecewiseCurve::ramp(0.0, 1.0)),
        }
    }
}

impl core::fmt::Debug for EffectConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EffectConfig")
            .field("muffling_intensity", &self.muffling_intensity)
            .field("low_pass_intensity", &self.low_pass_intensity)
            .field("distortion_intensity", &self.distortion_intensity)
            .finish_non_exhaustive()
    }
}

/// Filter and distortion values for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EffectParams {
    /// Low-pass cutoff.
    pub low_pass_cutoff: f32,
    /// Distortion intensity.
    pub distortion: f32,
}

/// Maps load and RPM to effect parameters.
#[derive(Debug, Clone, Default)]
pub struct EffectModulator {
    config: EffectConfig,
}

impl EffectModulator {
    /// Create a modulator.
    pub fn new(config: EffectConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    /// Effect parameters for the given load and normalized RPM.
    pub fn modulate(&self, load: f32, normalized_rpm: f32) -> EffectParams {
        let cfg = &self.config;
        let load = clamp01(load);
        let load_factor = lerp(1.0 - load, 1.0, 1.0 - clamp01(cfg.muffling_intensity));
        let combined = (load_factor + clamp01(normalized_rpm)) * 0.5;

        EffectParams {
            low_pass_cutoff: cfg.low_pass_curve.evaluate(1.0 - load_factor)
                * cfg.low_pass_intensity,
            distortion: cfg.distortion_curve.evaluate(combined) * cfg.distortion_intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_muffling_keeps_filter_open() {
        let modulator = EffectModulator::new(EffectConfig::default());
        for load in [0.0, 0.5, 1.0] {
            let p = modulator.modulate(load, 0.3);
            assert_eq!(p.low_pass_cutoff, 22_000.0);
        }
    }

    #[test]
    fn full_muffling_follows_load() {
        let config = EffectConfig {
            muffling_intensity: 1.0,
            ..EffectConfig::default()
        };
        let modulator = EffectModulator::new(config);
        // load_factor = 1 - load, curve read at load
        let p = modulator.modulate(1.0, 0.0);
        assert!((p.low_pass_cutoff - 0.25 * 22_000.0).abs() < 1e-2);
        let p = modulator.modulate(0.5, 0.0);
        assert!((p.low_pass_cutoff - 0.625 * 22_000.0).abs() < 1e-2);
    }

    #[test]
    fn distortion_tracks_combined_factor() {
        let config = EffectConfig {
            muffling_intensity: 1.0,
            distortion_intensity: 2.0,
            ..EffectConfig::default()
        };
        let modulator = EffectModulator::new(config);
        // load 0.4 -> load_factor 0.6, rpm 0.8 -> combined 0.7
        let p = modulator.modulate(0.4, 0.8);
        assert!((p.distortion - 1.4).abs() < 1e-5, "got {}", p.distortion);
    }

    #[test]
    fn zero_intensity_disables_distortion() {
        let modulator = EffectModulator::new(EffectConfig::default());
        assert_eq!(modulator.modulate(1.0, 1.0).distortion, 0.0);
    }
}
