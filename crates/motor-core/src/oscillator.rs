//! Secondary pitch wobble.
//!
//! Simulates the torsional response of the drivetrain to sharp RPM changes
//! and gear shifts. The oscillator produces a pitch *offset* that the
//! orchestrator adds to every channel's pitch.
//!
//! # Envelope
//!
//! Each tick the RPM delta since the previous tick is compared against a
//! direction-dependent threshold. While it stays above the threshold a
//! delay timer accumulates; once the timer passes `onset_delay` the
//! intensity is set to 1 and the timer restarts. Otherwise the timer is
//! cleared and the intensity decays as `intensity *= exp(-damping * dt)`.
//! A gear change sets the intensity to `gear_change_intensity` directly.
//!
//! # Output
//!
//! ```text
//! f      = lerp(min_frequency, max_frequency, normalized_rpm)
//! phase += 2π f dt,  harmonic_phase += 2π f harmonic_multiple dt   (mod 2π)
//! out    = (sin(phase) + sin(harmonic_phase) * ha) / (1 + ha)
//!          * depth * intensity * (1 + load * load_influence) * rev_limiter
//! ```
//!
//! `rev_limiter` is `rev_limiter_boost` while the RPM is pinned near the
//! limiter (small delta, above `rev_limiter_fraction * max_rpm`) and 1
//! otherwise. It scales the output only; the stored intensity is untouched.

use core::f32::consts::TAU;
use libm::{expf, fabsf, sinf};

use crate::math::{clamp01, lerp, wrap_phase};

/// Tuning for [`PitchOscillator`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscillatorConfig {
    /// Master switch. When off the output is exactly 0.
    pub enabled: bool,
    /// Peak pitch offset at intensity 1.
    pub depth: f32,
    /// Exponential decay rate of the intensity in 1/s.
    pub damping: f32,
    /// Seconds the RPM delta must stay above threshold before onset.
    pub onset_delay: f32,
    /// Per-tick RPM rise that counts as a transient.
    pub rising_threshold: f32,
    /// Per-tick RPM fall that counts as a transient.
    pub falling_threshold: f32,
    /// Wobble frequency at idle, Hz.
    pub min_frequency: f32,
    /// Wobble frequency at max RPM, Hz.
    pub max_frequency: f32,
    /// Harmonic frequency as a multiple of the base.
    pub harmonic_multiple: f32,
    /// Harmonic amplitude relative to the base.
    pub harmonic_amplitude: f32,
    /// Extra depth at full load.
    pub load_influence: f32,
    /// Per-tick RPM delta below which the engine counts as held.
    pub rev_limiter_delta: f32,
    /// Fraction of max RPM above which a held engine is on the limiter.
    pub rev_limiter_fraction: f32,
    /// Output multiplier while on the limiter.
    pub rev_limiter_boost: f32,
    /// Intensity set by a gear change.
    pub gear_change_intensity: f32,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            depth: 0.02,
            damping: 4.0,
            onset_delay: 0.05,
            rising_threshold: 40.0,
            falling_threshold: 60.0,
            min_frequency: 4.0,
            max_frequency: 12.0,
            harmonic_multiple: 2.0,
            harmonic_amplitude: 0.35,
            load_influence: 0.5,
            rev_limiter_delta: 5.0,
            rev_limiter_fraction: 0.97,
            rev_limiter_boost: 1.5,
            gear_change_intensity: 1.2,
        }
    }
}

/// Mutable oscillator state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OscillatorState {
    /// Base phase in radians, `[0, 2π)`.
    pub phase: f32,
    /// Harmonic phase in radians, `[0, 2π)`.
    pub harmonic_phase: f32,
    /// Decaying envelope, 0 to `gear_change_intensity`.
    pub intensity: f32,
    /// Time the RPM delta has been above threshold.
    pub delay_timer: f32,
    /// RPM seen on the previous tick.
    pub last_rpm: f32,
}

/// Phase-driven pitch offset generator.
#[derive(Clone, Debug, Default)]
pub struct PitchOscillator {
    config: OscillatorConfig,
    state: OscillatorState,
    primed: bool,
}

impl PitchOscillator {
    /// Create an idle oscillator.
    pub fn new(config: OscillatorConfig) -> Self {
        Self {
            config,
            state: OscillatorState::default(),
            primed: false,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &OscillatorConfig {
        &self.config
    }

    /// Current state.
    pub fn state(&self) -> &OscillatorState {
        &self.state
    }

    /// Current envelope level.
    pub fn intensity(&self) -> f32 {
        self.state.intensity
    }

    /// Zero the envelope, the timer and both phases.
    ///
    /// The next update re-primes the RPM reference.
    pub fn reset(&mut self) {
        self.state = OscillatorState::default();
        self.primed = false;
    }

    /// Gear shift blip: jump straight to the configured intensity.
    pub fn on_gear_change(&mut self) {
        if self.config.enabled {
            self.state.intensity = self.config.gear_change_intensity;
            self.state.delay_timer = 0.0;
        }
    }

    /// Advance by `dt` seconds and return the pitch offset for this tick.
    pub fn update(
        &mut self,
        rpm: f32,
        load: f32,
        normalized_rpm: f32,
        max_rpm: f32,
        dt: f32,
    ) -> f32 {
        let cfg = self.config;
        if !cfg.enabled {
            if self.primed || self.state.intensity != 0.0 {
                self.reset();
            }
            return 0.0;
        }

        if !self.primed {
            self.state.last_rpm = rpm;
            self.primed = true;
        }

        let delta = rpm - self.state.last_rpm;
        let threshold = if delta >= 0.0 {
            cfg.rising_threshold
        } else {
            cfg.falling_threshold
        };

        let state = &mut self.state;
        if fabsf(delta) > threshold {
            state.delay_timer += dt;
            if state.delay_timer >= cfg.onset_delay {
                state.intensity = 1.0;
                state.delay_timer = 0.0;
            }
        } else {
            state.delay_timer = 0.0;
            state.intensity *= expf(-cfg.damping.max(0.0) * dt.max(0.0));
        }

        let on_limiter =
            fabsf(delta) < cfg.rev_limiter_delta && rpm >= max_rpm * cfg.rev_limiter_fraction;
        let rev_limiter = if on_limiter {
            cfg.rev_limiter_boost
        } else {
            1.0
        };

        let frequency = lerp(cfg.min_frequency, cfg.max_frequency, normalized_rpm);
        let step = TAU * frequency * dt.max(0.0);
        state.phase = wrap_phase(state.phase + step);
        state.harmonic_phase = wrap_phase(state.harmonic_phase + step * cfg.harmonic_multiple);
        state.last_rpm = rpm;

        let ha = cfg.harmonic_amplitude.max(0.0);
        let wave = (sinf(state.phase) + sinf(state.harmonic_phase) * ha) / (1.0 + ha);
        wave * cfg.depth
            * state.intensity
            * (1.0 + clamp01(load) * cfg.load_influence)
            * rev_limiter
    }
}
