//! Acceleration / deceleration blend hysteresis.
//!
//! Two independent envelopes gate the acceleration and deceleration layer
//! sets. Each tick the engine is classified as accelerating when
//!
//! - RPM rose by more than `rpm_rise_margin` since the previous tick, or
//! - there is no deceleration set (single-set mode), or
//! - load is above `load_threshold`;
//!
//! otherwise it is decelerating. Both envelopes then glide toward their
//! targets (`1/0` or `0/1`) with the same tick-rate independent smoothing.
//! They are not forced to sum to one: during a trend reversal both can sit
//! mid-range for a moment, which is heard as a short layered blend.

use crate::smoothing::SmoothedValue;

/// Tuning for [`BlendEnvelope`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendConfig {
    /// Envelope smoothing rate in 1/s.
    pub smoothing_rate: f32,
    /// RPM increase per tick above which the engine counts as accelerating.
    pub rpm_rise_margin: f32,
    /// Load above which the engine counts as accelerating.
    pub load_threshold: f32,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            smoothing_rate: 20.0,
            rpm_rise_margin: 1.0,
            load_threshold: 0.01,
        }
    }
}

/// Smoothed acceleration and deceleration weights.
#[derive(Clone, Debug, PartialEq)]
pub struct BlendEnvelope {
    config: BlendConfig,
    acc: SmoothedValue,
    dec: SmoothedValue,
    single_set: bool,
    accelerating: bool,
}

impl BlendEnvelope {
    /// Create the envelope pair.
    ///
    /// In single-set mode the acceleration weight starts (and stays) at 1.
    /// With both sets present both weights start at 0 and fade in.
    pub fn new(config: BlendConfig, single_set: bool) -> Self {
        let acc_start = if single_set { 1.0 } else { 0.0 };
        Self {
            config,
            acc: SmoothedValue::new(acc_start, config.smoothing_rate),
            dec: SmoothedValue::new(0.0, config.smoothing_rate),
            single_set,
            accelerating: true,
        }
    }

    /// Classify the tick and advance both envelopes by `dt` seconds.
    pub fn update(&mut self, rpm: f32, previous_rpm: f32, load: f32, dt: f32) {
        self.accelerating = self.single_set
            || rpm - previous_rpm > self.config.rpm_rise_margin
            || load > self.config.load_threshold;

        let (acc_target, dec_target) = if self.accelerating {
            (1.0, 0.0)
        } else {
            (0.0, 1.0)
        };
        self.acc.advance_toward(acc_target, dt);
        self.dec.advance_toward(dec_target, dt);
    }

    /// Current acceleration weight.
    pub fn acc_weight(&self) -> f32 {
        self.acc.get()
    }

    /// Current deceleration weight.
    pub fn dec_weight(&self) -> f32 {
        self.dec.get()
    }

    /// Classification from the last update.
    pub fn is_accelerating(&self) -> bool {
        self.accelerating
    }

    /// Whether the deceleration set is absent.
    pub fn is_single_set(&self) -> bool {
        self.single_set
    }
}
