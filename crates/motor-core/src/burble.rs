//! Stochastic transient overlay on throttle release.
//!
//! Each tick compares the previous load with the current one. A drop of at
//! least `load_drop_threshold` at or above `min_rpm`, with the engine on and
//! `min_delay` seconds since the last trigger, arms a trigger. A uniform
//! draw below `probability` then claims the first free slot of the
//! transient pool and starts a random sample on it:
//!
//! ```text
//! rpm_factor  = clamp01((rpm - min_rpm) / (max_rpm - min_rpm))
//! drop_factor = clamp01(load_drop / load_drop_threshold)
//! gain  = base_volume * lerp(0.5, 1, rpm_factor) * lerp(0.7, 1, drop_factor)
//! pitch = lerp(0.9, 1.1, rpm_factor) + uniform(-0.1, 0.1)
//! ```
//!
//! A trigger that finds every slot busy is dropped; nothing is queued.

use alloc::vec::Vec;

use crate::channel::{PRIORITY_AUDIBLE, PlaybackChannel};
use crate::layer::SampleId;
use crate::math::{clamp01, lerp};
use crate::random::JitterSource;

/// Tuning for [`BurbleTrigger`].
#[derive(Clone, Debug, PartialEq)]
pub struct BurbleConfig {
    /// Master switch.
    pub enabled: bool,
    /// Lowest RPM that can burble.
    pub min_rpm: f32,
    /// Per-tick load drop that arms a trigger.
    pub load_drop_threshold: f32,
    /// Minimum seconds between triggers.
    pub min_delay: f32,
    /// Chance an armed trigger fires, 0..1.
    pub probability: f32,
    /// Gain at full RPM and full drop.
    pub base_volume: f32,
    /// Number of transient channels.
    pub pool_size: usize,
    /// Candidate one-shot samples.
    pub samples: Vec<SampleId>,
}

impl Default for BurbleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_rpm: 3500.0,
            load_drop_threshold: 0.3,
            min_delay: 0.15,
            probability: 0.6,
            base_volume: 0.6,
            pool_size: 4,
            samples: Vec::new(),
        }
    }
}

/// Persistent trigger state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BurbleState {
    /// Load seen on the previous tick.
    pub last_load: f32,
    /// Time of the last trigger that started playback.
    pub last_trigger_time: Option<f64>,
}

/// Per-tick inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurbleInput {
    /// Current RPM.
    pub rpm: f32,
    /// Current load, 0..1.
    pub load: f32,
    /// Max RPM of the engine.
    pub max_rpm: f32,
    /// Engine switch.
    pub engine_on: bool,
    /// Synthesizer clock in seconds.
    pub now: f64,
}

/// A transient that started this tick.
#[derive(Clone, Debug, PartialEq)]
pub struct BurbleEvent {
    /// Pool slot it plays on.
    pub slot: usize,
    /// Chosen sample.
    pub sample: SampleId,
    /// Gain written to the slot.
    pub gain: f32,
    /// Pitch ratio written to the slot.
    pub pitch: f32,
}

/// Why an armed trigger did not start playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BurbleSkip {
    /// The random draw failed.
    Chance,
    /// Every pool slot was busy.
    PoolExhausted,
}

/// Outcome of one burble update.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum BurbleOutcome {
    /// Conditions not met.
    #[default]
    Idle,
    /// Conditions met but nothing started.
    Skipped(BurbleSkip),
    /// Playback started.
    Fired(BurbleEvent),
}

impl BurbleOutcome {
    /// The started event, if any.
    pub fn event(&self) -> Option<&BurbleEvent> {
        match self {
            Self::Fired(event) => Some(event),
            _ => None,
        }
    }
}

/// Load-drop driven transient selector.
#[derive(Clone, Debug, Default)]
pub struct BurbleTrigger {
    config: BurbleConfig,
    state: BurbleState,
}

impl BurbleTrigger {
    /// Create a trigger.
    pub fn new(config: BurbleConfig) -> Self {
        Self {
            config,
            state: BurbleState::default(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &BurbleConfig {
        &self.config
    }

    /// Current state.
    pub fn state(&self) -> &BurbleState {
        &self.state
    }

    /// Whether the trigger can ever fire.
    pub fn is_active(&self) -> bool {
        self.config.enabled && !self.config.samples.is_empty() && self.config.pool_size > 0
    }

    /// Evaluate one tick against the transient `pool`.
    pub fn update<C: PlaybackChannel>(
        &mut self,
        input: BurbleInput,
        pool: &mut [C],
        rng: &mut JitterSource,
    ) -> BurbleOutcome {
        let cfg = &self.config;
        let load_drop = self.state.last_load - input.load;
        self.state.last_load = input.load;

        if !self.is_active() || !input.engine_on {
            return BurbleOutcome::Idle;
        }

        let ready = match self.state.last_trigger_time {
            Some(last) => input.now - last >= f64::from(cfg.min_delay),
            None => true,
        };
        if input.rpm < cfg.min_rpm || load_drop < cfg.load_drop_threshold || !ready {
            return BurbleOutcome::Idle;
        }

        if rng.next_unit() >= cfg.probability {
            return BurbleOutcome::Skipped(BurbleSkip::Chance);
        }

        let Some(slot) = pool.iter().position(|channel| !channel.is_playing()) else {
            return BurbleOutcome::Skipped(BurbleSkip::PoolExhausted);
        };

        let sample = cfg.samples[rng.index(cfg.samples.len())].clone();
        let rpm_span = input.max_rpm - cfg.min_rpm;
        let rpm_factor = if rpm_span > 0.0 {
            clamp01((input.rpm - cfg.min_rpm) / rpm_span)
        } else {
            1.0
        };
        let drop_factor = if cfg.load_drop_threshold > 0.0 {
            clamp01(load_drop / cfg.load_drop_threshold)
        } else {
            1.0
        };
        let gain = cfg.base_volume * lerp(0.5, 1.0, rpm_factor) * lerp(0.7, 1.0, drop_factor);
        let pitch = lerp(0.9, 1.1, rpm_factor) + rng.bipolar(0.1);

        let channel = &mut pool[slot];
        channel.set_sample(&sample);
        channel.set_gain(gain);
        channel.set_pitch_ratio(pitch);
        channel.set_muted(false);
        channel.set_priority(PRIORITY_AUDIBLE);
        channel.play();
        self.state.last_trigger_time = Some(input.now);

        BurbleOutcome::Fired(BurbleEvent {
            slot,
            sample,
            gain,
            pitch,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ChannelRole, RecordingChannel};
    use alloc::vec;

    fn config(probability: f32) -> BurbleConfig {
        BurbleConfig {
            enabled: true,
            probability,
            samples: vec![SampleId::new("pop_a"), SampleId::new("pop_b")],
            ..BurbleConfig::default()
        }
    }

    fn pool(size: usize) -> Vec<RecordingChannel> {
        (0..size)
            .map(|slot| RecordingChannel::new(ChannelRole::Transient { slot }, None))
            .collect()
    }

    fn input(load: f32, now: f64) -> BurbleInput {
        BurbleInput {
            rpm: 4000.0,
            load,
            max_rpm: 7000.0,
            engine_on: true,
            now,
        }
    }

    #[test]
    fn throttle_release_fires() {
        let mut trigger = BurbleTrigger::new(config(1.0));
        let mut pool = pool(2);
        let mut rng = JitterSource::new(1);
        let outcome = trigger.update(input(0.9, 0.0), &mut pool, &mut rng);
        assert_eq!(outcome, BurbleOutcome::Idle);
        let outcome = trigger.update(input(0.1, 0.02), &mut pool, &mut rng);
        let event = outcome.event().expect("burble should fire");
        assert_eq!(event.slot, 0);
        assert!(pool[0].is_playing());
        assert_eq!(pool[0].gain(), event.gain);
        // rpm_factor = 500 / 3500, drop_factor = 1
        let expected = 0.6 * lerp(0.5, 1.0, 500.0 / 3500.0);
        assert!((event.gain - expected).abs() < 1e-5);
        assert!(event.pitch >= 0.8 && event.pitch <= 1.2);
        assert_eq!(trigger.state().last_trigger_time, Some(0.02));
    }

    #[test]
    fn zero_probability_never_fires() {
        let mut trigger = BurbleTrigger::new(config(0.0));
        let mut pool = pool(2);
        let mut rng = JitterSource::new(3);
        for i in 0..200 {
            let load = if i % 2 == 0 { 1.0 } else { 0.0 };
            let outcome = trigger.update(input(load, i as f64), &mut pool, &mut rng);
            assert!(outcome.event().is_none());
        }
        assert!(pool.iter().all(|ch| ch.play_count() == 0));
    }

    #[test]
    fn busy_slots_are_skipped() {
        let mut trigger = BurbleTrigger::new(config(1.0));
        let mut pool = pool(2);
        pool[0].play();
        let mut rng = JitterSource::new(5);
        trigger.update(input(1.0, 0.0), &mut pool, &mut rng);
        let event = trigger.update(input(0.0, 1.0), &mut pool, &mut rng);
        assert_eq!(event.event().map(|e| e.slot), Some(1));
        assert_eq!(pool[0].play_count(), 1);

        trigger.update(input(1.0, 2.0), &mut pool, &mut rng);
        let outcome = trigger.update(input(0.0, 3.0), &mut pool, &mut rng);
        assert_eq!(outcome, BurbleOutcome::Skipped(BurbleSkip::PoolExhausted));
        assert_eq!(pool[0].play_count(), 1);
        assert_eq!(pool[1].play_count(), 1);
        // time is only recorded when playback starts
        assert_eq!(trigger.state().last_trigger_time, Some(1.0));
    }

    #[test]
    fn min_delay_gates_retrigger() {
        let mut trigger = BurbleTrigger::new(config(1.0));
        let mut pool = pool(4);
        let mut rng = JitterSource::new(9);
        let mut step = |load: f32, now: f64| trigger.update(input(load, now), &mut pool, &mut rng);
        step(1.0, 0.0);
        assert!(step(0.0, 0.01).event().is_some());
        step(1.0, 0.05);
        assert_eq!(step(0.0, 0.1), BurbleOutcome::Idle);
        step(1.0, 0.2);
        assert!(step(0.0, 0.3).event().is_some());
    }

    #[test]
    fn below_min_rpm_or_engine_off_is_idle() {
        let mut trigger = BurbleTrigger::new(config(1.0));
        let mut pool = pool(1);
        let mut rng = JitterSource::new(2);
        trigger.update(input(1.0, 0.0), &mut pool, &mut rng);
        let low = BurbleInput {
            rpm: 3000.0,
            ..input(0.0, 1.0)
        };
        let outcome = trigger.update(low, &mut pool, &mut rng);
        assert_eq!(outcome, BurbleOutcome::Idle);
        trigger.update(input(1.0, 2.0), &mut pool, &mut rng);
        let off = BurbleInput {
            engine_on: false,
            ..input(0.0, 3.0)
        };
        let outcome = trigger.update(off, &mut pool, &mut rng);
        assert_eq!(outcome, BurbleOutcome::Idle);
        // last load still tracked while idle
        assert_eq!(trigger.state().last_load, 0.0);
    }
}
