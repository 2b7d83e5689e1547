//! Base pitch synthesis.
//!
//! ```text
//! n       = clamp((rpm - idle) / (max - idle), 0, 1)
//! base    = pitch_curve(n)
//! target  = base + load * load_influence   if rpm > idle + idle_margin
//!         = idle_pitch                     otherwise
//! smoothed -> target                       (smoothing_rate)
//! acc      -> smoothed + shift + acc_trim            (acc_smoothing_rate)
//! dec      -> smoothed + shift + dec_trim - base     (dec_smoothing_rate)
//! ```
//!
//! Deceleration recordings are pitched relative to their own recording
//! reference rather than the curve, so the curve's base multiplier is
//! removed from their pitch and `dec_trim` (default 1.0) restores unity.
//!
//! At idle the main pitch targets `idle_pitch` while the base still reads
//! `pitch_curve(0)`, so deceleration channels idle at
//! `idle_pitch + shift + dec_trim - pitch_curve(0)`: 1.2 with the stock
//! curve, against 1.0 for acceleration channels. Profiles whose
//! deceleration recordings must idle at `idle_pitch` lower `dec_trim` by
//! `idle_pitch - pitch_curve(0)` (0.2 for the stock curve), which also
//! lowers them across the whole range.
//!
//! Per-channel jitter and the oscillator offset are added on top by the
//! orchestrator.

use crate::curve::{CurveRef, PiecewiseCurve, curve_ref};
use crate::smoothing::SmoothedValue;

/// Tuning for [`PitchSynth`].
#[derive(Clone)]
pub struct PitchConfig {
    /// Base pitch multiplier over normalized RPM.
    pub curve: CurveRef,
    /// Pitch added at full load.
    pub load_influence: f32,
    /// Pitch used at or near idle.
    pub idle_pitch: f32,
    /// RPM above idle below which `idle_pitch` is targeted.
    pub idle_margin: f32,
    /// Main pitch smoothing rate in 1/s.
    pub smoothing_rate: f32,
    /// Acceleration class smoothing rate in 1/s.
    pub acc_smoothing_rate: f32,
    /// Deceleration class smoothing rate in 1/s.
    pub dec_smoothing_rate: f32,
    /// Global fine-tune added to every channel.
    pub shift: f32,
    /// Trim for acceleration channels.
    pub acc_trim: f32,
    /// Trim for deceleration channels.
    pub dec_trim: f32,
    /// Half-width of the per-channel random jitter, at most 0.06.
    pub random_jitter: f32,
}

/// Largest jitter half-width accepted.
pub const MAX_RANDOM_JITTER: f32 = 0.06;

impl PitchConfig {
    /// The stock pitch curve: 0.8 at idle rising to 1.6 at max RPM.
    pub fn default_curve() -> CurveRef {
        curve_ref(PiecewiseCurve::ramp(0.8, 1.6))
    }
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            curve: Self::default_curve(),
            load_influence: 0.2,
            idle_pitch: 1.0,
            idle_margin: 100.0,
            smoothing_rate: 20.0,
            acc_smoothing_rate: 20.0,
            dec_smoothing_rate: 20.0,
            shift: 0.0,
            acc_trim: 0.0,
            dec_trim: 1.0,
            random_jitter: 0.0,
        }
    }
}

impl core::fmt::Debug for PitchConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PitchConfig")
            .field("load_influence", &self.load_influence)
            .field("idle_pitch", &self.idle_pitch)
            .field("idle_margin", &self.idle_margin)
            .field("smoothing_rate", &self.smoothing_rate)
            .field("acc_smoothing_rate", &self.acc_smoothing_rate)
            .field("dec_smoothing_rate", &self.dec_smoothing_rate)
            .field("shift", &self.shift)
            .field("acc_trim", &self.acc_trim)
            .field("dec_trim", &self.dec_trim)
            .field("random_jitter", &self.random_jitter)
            .finish_non_exhaustive()
    }
}

/// Pitch values computed for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PitchFrame {
    /// Raw curve value at the current normalized RPM.
    pub base: f32,
    /// Unsmoothed target.
    pub target: f32,
    /// Smoothed main pitch.
    pub smoothed: f32,
    /// Smoothed pitch for acceleration channels, before jitter.
    pub acceleration: f32,
    /// Smoothed pitch for deceleration channels, before jitter.
    pub deceleration: f32,
}

/// Smoothed pitch state.
#[derive(Debug, Clone)]
pub struct PitchSynth {
    config: PitchConfig,
    main: SmoothedValue,
    acc: SmoothedValue,
    dec: SmoothedValue,
}

impl PitchSynth {
    /// Create the synthesizer resting at the idle pitch.
    pub fn new(config: PitchConfig) -> Self {
        let idle = config.idle_pitch;
        Self {
            main: SmoothedValue::new(idle, config.smoothing_rate),
            acc: SmoothedValue::new(
                idle + config.shift + config.acc_trim,
                config.acc_smoothing_rate,
            ),
            dec: SmoothedValue::new(config.shift + config.dec_trim, config.dec_smoothing_rate),
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &PitchConfig {
        &self.config
    }

    /// Compute this tick's pitch values and advance the smoothers.
    pub fn update(
        &mut self,
        rpm: f32,
        load: f32,
        idle_rpm: f32,
        normalized_rpm: f32,
        dt: f32,
    ) -> PitchFrame {
        let cfg = &self.config;
        let base = cfg.curve.evaluate(normalized_rpm);
        let target = if rpm > idle_rpm + cfg.idle_margin {
            base + load * cfg.load_influence
        } else {
            cfg.idle_pitch
        };

        let smoothed = self.main.advance_toward(target, dt);
        let acceleration = self
            .acc
            .advance_toward(smoothed + cfg.shift + cfg.acc_trim, dt);
        let deceleration = self
            .dec
            .advance_toward(smoothed + cfg.shift + cfg.dec_trim - base, dt);

        PitchFrame {
            base,
            target,
            smoothed,
            acceleration,
            deceleration,
        }
    }

    /// Current smoothed main pitch.
    pub fn smoothed(&self) -> f32 {
        self.main.get()
    }
}
