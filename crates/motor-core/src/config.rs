//! Activation-time configuration.
//!
//! [`SynthConfig`] gathers everything the synthesizer needs at activation:
//! the RPM range, both layer sets, the band parameters and one config block
//! per component. Every block has usable defaults so a host only has to
//! supply the layers and the RPM range.

use alloc::vec::Vec;

use crate::blend::BlendConfig;
use crate::burble::BurbleConfig;
use crate::curve::{CurveRef, PiecewiseCurve, curve_ref};
use crate::effects::EffectConfig;
use crate::error::SynthError;
use crate::layer::AudioLayer;
use crate::math::{clamp01, lerp};
use crate::oscillator::OscillatorConfig;
use crate::pitch::PitchConfig;

/// RPM offset used by the acceleration and deceleration volume ramps.
const VOLUME_RPM_OFFSET: f32 = 100.0;

/// Channel gain shaping.
///
/// ```text
/// acc_scale = clamp((rpm + 100) / max_rpm + idle_acc_volume, floor, max_acc_volume)
/// dec_scale = clamp((rpm + 100) / (max_rpm / 2) + idle_acc_volume, 0, max_dec_volume)
/// load_gain = lerp(max(load, min_load_volume), 1, 1 - load_volume_influence)
/// ```
///
/// `floor` is `idle_acc_volume` for a single-set engine at or below idle
/// and 0 otherwise. A zero maximum disables the corresponding ramp.
#[derive(Clone)]
pub struct VolumeConfig {
    /// Output scale applied to every layer channel.
    pub master_volume: f32,
    /// Volume offset of the acceleration ramp.
    pub idle_acc_volume: f32,
    /// Ceiling of the acceleration ramp.
    pub max_acc_volume: f32,
    /// Ceiling of the deceleration ramp.
    pub max_dec_volume: f32,
    /// Lowest load the acceleration gain responds to.
    pub min_load_volume: f32,
    /// How much load shapes acceleration gain, 0..1.
    pub load_volume_influence: f32,
    /// Gain over normalized RPM for a one-layer set.
    pub single_layer_curve: CurveRef,
}

impl VolumeConfig {
    /// Acceleration ramp scale.
    pub fn acceleration_scale(
        &self,
        rpm: f32,
        idle_rpm: f32,
        max_rpm: f32,
        single_set: bool,
    ) -> f32 {
        if self.max_acc_volume <= 0.0 || max_rpm <= 0.0 {
            return 1.0;
        }
        let floor = if single_set && rpm <= idle_rpm {
            self.idle_acc_volume
        } else {
            0.0
        };
        ((rpm + VOLUME_RPM_OFFSET) / max_rpm + self.idle_acc_volume)
            .max(floor)
            .min(self.max_acc_volume)
    }

    /// Deceleration ramp scale.
    pub fn deceleration_scale(&self, rpm: f32, max_rpm: f32) -> f32 {
        if self.max_dec_volume <= 0.0 || max_rpm <= 0.0 {
            return 1.0;
        }
        ((rpm + VOLUME_RPM_OFFSET) / (max_rpm * 0.5) + self.idle_acc_volume)
            .max(0.0)
            .min(self.max_dec_volume)
    }

    /// Load-dependent acceleration gain.
    pub fn load_gain(&self, load: f32) -> f32 {
        lerp(
            clamp01(load).max(self.min_load_volume),
            1.0,
            1.0 - clamp01(self.load_volume_influence),
        )
    }
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            idle_acc_volume: 0.1,
            max_acc_volume: 0.4,
            max_dec_volume: 0.1,
            min_load_volume: 0.4,
            load_volume_influence: 0.5,
            single_layer_curve: curve_ref(PiecewiseCurve::ramp(0.4, 1.0)),
        }
    }
}

impl core::fmt::Debug for VolumeConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VolumeConfig")
            .field("master_volume", &self.master_volume)
            .field("idle_acc_volume", &self.idle_acc_volume)
            .field("max_acc_volume", &self.max_acc_volume)
            .field("max_dec_volume", &self.max_dec_volume)
            .field("min_load_volume", &self.min_load_volume)
            .field("load_volume_influence", &self.load_volume_influence)
            .finish_non_exhaustive()
    }
}

/// Everything needed to activate a [`Synthesizer`](crate::Synthesizer).
#[derive(Clone, Debug)]
pub struct SynthConfig {
    /// Idle RPM, fixed for the session.
    pub idle_rpm: f32,
    /// Max RPM, fixed for the session.
    pub max_rpm: f32,
    /// Ramp-out end of the last layer and the RPM input ceiling.
    pub max_theoretical_rpm: f32,
    /// Band half-width shared by all layers.
    pub rpm_deviation: f32,
    /// Crossfade ramp divider (1 = full-width ramps).
    pub range_divider: f32,
    /// RPM below which a one-layer set is silent.
    pub single_layer_cutoff_rpm: f32,
    /// Layers used while accelerating, ascending center RPM. Required.
    pub acceleration_layers: Vec<AudioLayer>,
    /// Layers used while decelerating, ascending center RPM. May be empty.
    pub deceleration_layers: Vec<AudioLayer>,
    /// Gain shaping.
    pub volume: VolumeConfig,
    /// Pitch synthesis.
    pub pitch: PitchConfig,
    /// Acceleration/deceleration envelopes.
    pub blend: BlendConfig,
    /// Low-pass and distortion.
    pub effects: EffectConfig,
    /// Secondary pitch wobble.
    pub oscillator: OscillatorConfig,
    /// Throttle release transients.
    pub burble: BurbleConfig,
    /// Seed for jitter and burble draws.
    pub seed: u64,
}

impl SynthConfig {
    /// Configuration with default tuning for the given range and layers.
    pub fn new(
        max_rpm: f32,
        idle_rpm: f32,
        acceleration_layers: Vec<AudioLayer>,
        deceleration_layers: Vec<AudioLayer>,
    ) -> Self {
        Self {
            idle_rpm,
            max_rpm,
            max_theoretical_rpm: 10_000.0,
            rpm_deviation: 1000.0,
            range_divider: 1.0,
            single_layer_cutoff_rpm: 100.0,
            acceleration_layers,
            deceleration_layers,
            volume: VolumeConfig::default(),
            pitch: PitchConfig::default(),
            blend: BlendConfig::default(),
            effects: EffectConfig::default(),
            oscillator: OscillatorConfig::default(),
            burble: BurbleConfig::default(),
            seed: 0,
        }
    }

    /// Check the conditions activation refuses to run without.
    ///
    /// Band layout problems are not errors here; see the config crate's
    /// offline validation for those.
    pub fn validate(&self) -> Result<(), SynthError> {
        if self.acceleration_layers.is_empty() {
            return Err(SynthError::EmptyAccelerationLayers);
        }
        let range_ok = self.idle_rpm.is_finite()
            && self.max_rpm.is_finite()
            && self.idle_rpm >= 0.0
            && self.idle_rpm < self.max_rpm;
        if !range_ok {
            return Err(SynthError::InvalidRpmRange {
                idle_rpm: self.idle_rpm,
                max_rpm: self.max_rpm,
            });
        }
        Ok(())
    }

    /// Whether the deceleration set is absent.
    pub fn is_single_set(&self) -> bool {
        self.deceleration_layers.is_empty()
    }
}
