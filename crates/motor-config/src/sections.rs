//! Per-component profile tables.
//!
//! Each table maps onto one `motor_core` config struct. Missing keys fall
//! back to the core defaults, so a profile only has to spell out what it tunes.

use serde::{Deserialize, Serialize};

use motor_core::{
    BlendConfig, BurbleConfig, EffectConfig, OscillatorConfig, PitchConfig, SampleId,
    VolumeConfig,
};

use crate::curve_config::CurveConfig;
use crate::error::ConfigError;

/// `[volume]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSection {
    /// Gain applied to every layer.
    pub master: f32,
    /// Acceleration volume offset near idle.
    pub idle_acc_volume: f32,
    /// Ceiling of the acceleration volume scale (0 disables the scale).
    pub max_acc_volume: f32,
    /// Ceiling of the deceleration volume scale (0 disables the scale).
    pub max_dec_volume: f32,
    /// Load below which acceleration volume stops dropping.
    pub min_load_volume: f32,
    /// How strongly load affects acceleration volume.
    pub load_volume_influence: f32,
    /// Volume over normalized RPM for one-layer sets.
    pub single_layer_curve: CurveConfig,
}

impl Default for VolumeSection {
    fn default() -> Self {
        let core = VolumeConfig::default();
        Self {
            master: core.master_volume,
            idle_acc_volume: core.idle_acc_volume,
            max_acc_volume: core.max_acc_volume,
            max_dec_volume: core.max_dec_volume,
            min_load_volume: core.min_load_volume,
            load_volume_influence: core.load_volume_influence,
            single_layer_curve: CurveConfig::linear(&[(0.0, 0.4), (1.0, 1.0)]),
        }
    }
}

impl VolumeSection {
    /// Build the core volume config.
    pub fn to_config(&self) -> Result<VolumeConfig, ConfigError> {
        Ok(VolumeConfig {
            master_volume: self.master,
            idle_acc_volume: self.idle_acc_volume,
            max_acc_volume: self.max_acc_volume,
            max_dec_volume: self.max_dec_volume,
            min_load_volume: self.min_load_volume,
            load_volume_influence: self.load_volume_influence,
            single_layer_curve: self.single_layer_curve.to_curve_ref()?,
        })
    }
}

/// `[pitch]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchSection {
    /// Pitch multiplier at zero load.
    pub load_influence: f32,
    /// Target pitch near idle.
    pub idle_pitch: f32,
    /// RPM above idle where the idle pitch stops applying.
    pub idle_margin: f32,
    /// Main pitch smoothing rate (1/s).
    pub smoothing_rate: f32,
    /// Acceleration class pitch smoothing rate (1/s).
    pub acc_smoothing_rate: f32,
    /// Deceleration class pitch smoothing rate (1/s).
    pub dec_smoothing_rate: f32,
    /// Constant offset added to both class pitches.
    pub shift: f32,
    /// Extra offset for the acceleration class.
    pub acc_trim: f32,
    /// Extra offset for the deceleration class.
    pub dec_trim: f32,
    /// Per-channel random pitch jitter amplitude.
    pub random_jitter: f32,
    /// Base pitch over normalized RPM.
    pub curve: CurveConfig,
}

impl Default for PitchSection {
    fn default() -> Self {
        let core = PitchConfig::default();
        Self {
            load_influence: core.load_influence,
            idle_pitch: core.idle_pitch,
            idle_margin: core.idle_margin,
            smoothing_rate: core.smoothing_rate,
            acc_smoothing_rate: core.acc_smoothing_rate,
            dec_smoothing_rate: core.dec_smoothing_rate,
            shift: core.shift,
            acc_trim: core.acc_trim,
            dec_trim: core.dec_trim,
            random_jitter: core.random_jitter,
            curve: CurveConfig::linear(&[(0.0, 0.8), (1.0, 1.6)]),
        }
    }
}

impl PitchSection {
    /// Build the core pitch config.
    pub fn to_config(&self) -> Result<PitchConfig, ConfigError> {
        Ok(PitchConfig {
            curve: self.curve.to_curve_ref()?,
            load_influence: self.load_influence,
            idle_pitch: self.idle_pitch,
            idle_margin: self.idle_margin,
            smoothing_rate: self.smoothing_rate,
            acc_smoothing_rate: self.acc_smoothing_rate,
            dec_smoothing_rate: self.dec_smoothing_rate,
            shift: self.shift,
            acc_trim: self.acc_trim,
            dec_trim: self.dec_trim,
            random_jitter: self.random_jitter,
        })
    }
}

/// `[blend]` table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendSection {
    /// Envelope smoothing rate (1/s).
    pub smoothing_rate: f32,
    /// RPM rise per tick that counts as accelerating.
    pub rpm_rise_margin: f32,
    /// Load above which the engine counts as accelerating.
    pub load_threshold: f32,
}

impl Default for BlendSection {
    fn default() -> Self {
        let core = BlendConfig::default();
        Self {
            smoothing_rate: core.smoothing_rate,
            rpm_rise_margin: core.rpm_rise_margin,
            load_threshold: core.load_threshold,
        }
    }
}

impl BlendSection {
    /// Build the core blend config.
    pub fn to_config(&self) -> BlendConfig {
        BlendConfig {
            smoothing_rate: self.smoothing_rate,
            rpm_rise_margin: self.rpm_rise_margin,
            load_threshold: self.load_threshold,
        }
    }
}

/// `[effects]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsSection {
    /// 0 leaves the low-pass open, 1 applies the full curve.
    pub muffling_intensity: f32,
    /// Cutoff in Hz the low-pass curve is scaled by.
    pub low_pass_intensity: f32,
    /// Distortion depth multiplier.
    pub distortion_intensity: f32,
    /// Cutoff fraction over load.
    pub low_pass_curve: CurveConfig,
    /// Distortion over normalized RPM.
    pub distortion_curve: CurveConfig,
}

impl Default for EffectsSection {
    fn default() -> Self {
        let core = EffectConfig::default();
        Self {
            muffling_intensity: core.muffling_intensity,
            low_pass_intensity: core.low_pass_intensity,
            distortion_intensity: core.distortion_intensity,
            low_pass_curve: CurveConfig::linear(&[(0.0, 1.0), (1.0, 0.25)]),
            distortion_curve: CurveConfig::linear(&[(0.0, 0.0), (1.0, 1.0)]),
        }
    }
}

impl EffectsSection {
    /// Build the core effect config.
    pub fn to_config(&self) -> Result<EffectConfig, ConfigError> {
        Ok(EffectConfig {
            muffling_intensity: self.muffling_intensity,
            low_pass_intensity: self.low_pass_intensity,
            low_pass_curve: self.low_pass_curve.to_curve_ref()?,
            distortion_intensity: self.distortion_intensity,
            distortion_curve: self.distortion_curve.to_curve_ref()?,
        })
    }
}

/// `[oscillator]` table.
///
/// Field names match [`OscillatorConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct OscillatorSection {
    pub enabled: bool,
    pub depth: f32,
    pub damping: f32,
    pub onset_delay: f32,
    pub rising_threshold: f32,
    pub falling_threshold: f32,
    pub min_frequency: f32,
    pub max_frequency: f32,
    pub harmonic_multiple: f32,
    pub harmonic_amplitude: f32,
    pub load_influence: f32,
    pub rev_limiter_delta: f32,
    pub rev_limiter_fraction: f32,
    pub rev_limiter_boost: f32,
    pub gear_change_intensity: f32,
}

impl From<OscillatorConfig> for OscillatorSection {
    fn from(c: OscillatorConfig) -> Self {
        Self {
            enabled: c.enabled,
            depth: c.depth,
            damping: c.damping,
            onset_delay: c.onset_delay,
            rising_threshold: c.rising_threshold,
            falling_threshold: c.falling_threshold,
            min_frequency: c.min_frequency,
            max_frequency: c.max_frequency,
            harmonic_multiple: c.harmonic_multiple,
            harmonic_amplitude: c.harmonic_amplitude,
            load_influence: c.load_influence,
            rev_limiter_delta: c.rev_limiter_delta,
            rev_limiter_fraction: c.rev_limiter_fraction,
            rev_limiter_boost: c.rev_limiter_boost,
            gear_change_intensity: c.gear_change_intensity,
        }
    }
}

impl From<OscillatorSection> for OscillatorConfig {
    fn from(s: OscillatorSection) -> Self {
        Self {
            enabled: s.enabled,
            depth: s.depth,
            damping: s.damping,
            onset_delay: s.onset_delay,
            rising_threshold: s.rising_threshold,
            falling_threshold: s.falling_threshold,
            min_frequency: s.min_frequency,
            max_frequency: s.max_frequency,
            harmonic_multiple: s.harmonic_multiple,
            harmonic_amplitude: s.harmonic_amplitude,
            load_influence: s.load_influence,
            rev_limiter_delta: s.rev_limiter_delta,
            rev_limiter_fraction: s.rev_limiter_fraction,
            rev_limiter_boost: s.rev_limiter_boost,
            gear_change_intensity: s.gear_change_intensity,
        }
    }
}

impl Default for OscillatorSection {
    fn default() -> Self {
        OscillatorConfig::default().into()
    }
}

/// `[burble]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurbleSection {
    /// Whether throttle-release bursts are generated.
    pub enabled: bool,
    /// Minimum RPM for a burst.
    pub min_rpm: f32,
    /// Per-tick load drop that arms a burst.
    pub load_drop_threshold: f32,
    /// Minimum seconds between bursts.
    pub min_delay: f32,
    /// Chance an armed burst fires.
    pub probability: f32,
    /// Gain at max RPM.
    pub base_volume: f32,
    /// Transient channels reserved for bursts.
    pub pool_size: usize,
    /// Clips a burst picks from.
    pub samples: Vec<String>,
}

impl Default for BurbleSection {
    fn default() -> Self {
        let core = BurbleConfig::default();
        Self {
            enabled: core.enabled,
            min_rpm: core.min_rpm,
            load_drop_threshold: core.load_drop_threshold,
            min_delay: core.min_delay,
            probability: core.probability,
            base_volume: core.base_volume,
            pool_size: core.pool_size,
            samples: Vec::new(),
        }
    }
}

impl BurbleSection {
    /// Build the core burble config.
    pub fn to_config(&self) -> BurbleConfig {
        BurbleConfig {
            enabled: self.enabled,
            min_rpm: self.min_rpm,
            load_drop_threshold: self.load_drop_threshold,
            min_delay: self.min_delay,
            probability: self.probability,
            base_volume: self.base_volume,
            pool_size: self.pool_size,
            samples: self.samples.iter().map(|s| SampleId::new(s.as_str())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tables_use_core_defaults() {
        let volume: VolumeSection = toml::from_str("").unwrap();
        assert_eq!(volume, VolumeSection::default());
        let core = volume.to_config().unwrap();
        assert_eq!(core.max_acc_volume, VolumeConfig::default().max_acc_volume);
        assert!((core.single_layer_curve.evaluate(0.0) - 0.4).abs() < 1e-6);

        let osc: OscillatorSection = toml::from_str("").unwrap();
        assert_eq!(OscillatorConfig::from(osc), OscillatorConfig::default());
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let pitch: PitchSection = toml::from_str("random_jitter = 0.03\nshift = 0.1").unwrap();
        assert_eq!(pitch.random_jitter, 0.03);
        assert_eq!(pitch.shift, 0.1);
        assert_eq!(pitch.dec_trim, PitchConfig::default().dec_trim);
    }

    #[test]
    fn pitch_curve_is_built() {
        let mut pitch = PitchSection::default();
        pitch.curve = CurveConfig::smooth(&[(0.0, 1.0), (1.0, 2.0)]);
        let core = pitch.to_config().unwrap();
        assert!((core.curve.evaluate(0.5) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn bad_effect_curve_is_rejected() {
        let mut effects = EffectsSection::default();
        effects.distortion_curve = CurveConfig::linear(&[]);
        assert!(effects.to_config().is_err());
    }

    #[test]
    fn burble_samples_become_ids() {
        let burble: BurbleSection =
            toml::from_str("enabled = true\nsamples = [\"pop_a.wav\", \"pop_b.wav\"]").unwrap();
        let core = burble.to_config();
        assert!(core.enabled);
        assert_eq!(core.samples[1].as_str(), "pop_b.wav");
    }
}
