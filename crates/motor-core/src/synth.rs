//! The per-tick orchestrator.
//!
//! [`Synthesizer`] owns every channel and all mutable synthesis state. A
//! host activates it once, publishes RPM/load through the shared
//! [`ControlInputs`] from any thread, and calls [`Synthesizer::tick`] at its
//! control rate. Each tick:
//!
//! 1. reads the latest inputs (or the manual override) and clamps them
//! 2. advances the blend envelopes, the pitch smoothers and the oscillator
//! 3. derives effect parameters from load and normalized RPM
//! 4. writes gain, pitch, filter and distortion to every layer channel
//! 5. evaluates the burble trigger against the transient pool
//!
//! Nothing in the tick allocates or fails.
//!
//! # Example
//!
//! ```rust
//! use motor_core::{AudioLayer, SynthConfig, Synthesizer, recording_factory};
//!
//! let config = SynthConfig::new(
//!     7000.0,
//!     800.0,
//!     vec![AudioLayer::new("acc_1500", 1500.0), AudioLayer::new("acc_4000", 4000.0)],
//!     vec![AudioLayer::new("dec_2500", 2500.0)],
//! );
//! let mut synth = Synthesizer::activate(config, &mut recording_factory(0.4)).unwrap();
//!
//! synth.set_engine_on(true);
//! synth.set_rpm(1500.0);
//! synth.set_load(0.5);
//! let report = synth.tick(0.02);
//! assert!(report.audible_layers > 0);
//! ```

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::blend::BlendEnvelope;
use crate::burble::{BurbleInput, BurbleOutcome, BurbleTrigger};
use crate::channel::{
    ChannelFactory, ChannelRole, PRIORITY_AUDIBLE, PRIORITY_SILENT, PlaybackChannel,
};
use crate::config::SynthConfig;
use crate::crossfade::{CrossfadeEngine, LayerWeight};
use crate::effects::{EffectModulator, EffectParams};
use crate::error::SynthError;
use crate::inputs::{ControlInputs, ManualControl};
use crate::layer::{AudioLayer, LayerTable};
use crate::math::{clamp01, normalized_rpm};
use crate::oscillator::PitchOscillator;
use crate::pitch::{MAX_RANDOM_JITTER, PitchFrame, PitchSynth};
use crate::random::JitterSource;

/// Lowest pitch ratio written to a channel.
pub const MIN_PITCH_RATIO: f32 = 0.01;

/// Highest pitch ratio written to a channel.
pub const MAX_PITCH_RATIO: f32 = 3.0;

/// Engine state owned by the synthesizer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineState {
    /// RPM used by the last tick, after clamping.
    pub rpm: f32,
    /// Load used by the last tick, 0..1.
    pub load: f32,
    /// Idle RPM.
    pub idle_rpm: f32,
    /// Max RPM.
    pub max_rpm: f32,
    /// Engine switch as of the last tick.
    pub is_on: bool,
    /// RPM of the tick before the last one.
    pub previous_rpm: f32,
    /// Smoothed main pitch.
    pub smoothed_pitch: f32,
    /// Acceleration envelope.
    pub smoothed_acc_weight: f32,
    /// Deceleration envelope.
    pub smoothed_dec_weight: f32,
}

/// Summary of one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Synthesizer clock after the tick, seconds.
    pub time: f64,
    /// Elapsed seconds consumed.
    pub dt: f32,
    /// Clamped RPM.
    pub rpm: f32,
    /// Clamped load.
    pub load: f32,
    /// RPM between idle and max, 0..1.
    pub normalized_rpm: f32,
    /// Engine switch.
    pub engine_on: bool,
    /// Blend classification.
    pub accelerating: bool,
    /// Acceleration envelope.
    pub acc_weight: f32,
    /// Deceleration envelope.
    pub dec_weight: f32,
    /// Pitch values before jitter and oscillator.
    pub pitch: PitchFrame,
    /// Oscillator pitch offset.
    pub oscillator_offset: f32,
    /// Effect parameters written to audible channels.
    pub effects: EffectParams,
    /// Number of audible layer channels.
    pub audible_layers: usize,
    /// Burble result.
    pub burble: BurbleOutcome,
}

/// Which layer set a channel bank belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LayerClass {
    Acceleration,
    Deceleration,
}

/// Per-tick values shared by every layer channel.
struct ChannelFrame {
    rpm: f32,
    load: f32,
    normalized_rpm: f32,
    envelope: f32,
    pitch: f32,
    jitter: f32,
    effects: EffectParams,
}

/// Engine sound synthesizer over host channels `C`.
pub struct Synthesizer<C> {
    config: SynthConfig,
    state: EngineState,
    inputs: Arc<ControlInputs>,
    manual: Option<ManualControl>,
    acceleration: CrossfadeEngine,
    deceleration: CrossfadeEngine,
    acc_channels: Vec<C>,
    dec_channels: Vec<C>,
    transient_channels: Vec<C>,
    weights: Vec<LayerWeight>,
    blend: BlendEnvelope,
    pitch: PitchSynth,
    effects: EffectModulator,
    oscillator: PitchOscillator,
    burble: BurbleTrigger,
    rng: JitterSource,
    clock: f64,
}

impl<C: PlaybackChannel> Synthesizer<C> {
    /// Build band tables and allocate every channel.
    ///
    /// Fails if the acceleration set is empty or the RPM range is invalid.
    pub fn activate<F>(config: SynthConfig, factory: &mut F) -> Result<Self, SynthError>
    where
        F: ChannelFactory<Channel = C>,
    {
        config.validate()?;

        let acceleration = CrossfadeEngine::new(
            LayerTable::build(
                &config.acceleration_layers,
                config.rpm_deviation,
                config.max_theoretical_rpm,
            ),
            config.range_divider,
        );
        let deceleration = CrossfadeEngine::new(
            LayerTable::build(
                &config.deceleration_layers,
                config.rpm_deviation,
                config.max_theoretical_rpm,
            ),
            config.range_divider,
        );

        let acc_channels = create_layer_channels(&config.acceleration_layers, factory, |index| {
            ChannelRole::Acceleration { index }
        });
        let dec_channels = create_layer_channels(&config.deceleration_layers, factory, |index| {
            ChannelRole::Deceleration { index }
        });
        let transient_channels = (0..config.burble.pool_size)
            .map(|slot| {
                let mut channel = factory.create(ChannelRole::Transient { slot }, None);
                silence(&mut channel);
                channel
            })
            .collect();

        let acc_count = config.acceleration_layers.len();
        let dec_count = config.deceleration_layers.len();
        let weights = alloc::vec![LayerWeight::SILENT; acc_count.max(dec_count)];

        let state = EngineState {
            idle_rpm: config.idle_rpm,
            max_rpm: config.max_rpm,
            smoothed_pitch: config.pitch.idle_pitch,
            smoothed_acc_weight: if config.is_single_set() { 1.0 } else { 0.0 },
            ..EngineState::default()
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            acceleration = config.acceleration_layers.len(),
            deceleration = config.deceleration_layers.len(),
            transients = config.burble.pool_size,
            idle_rpm = config.idle_rpm,
            max_rpm = config.max_rpm,
            "synth_activate"
        );

        Ok(Self {
            state,
            inputs: Arc::new(ControlInputs::new()),
            manual: None,
            acceleration,
            deceleration,
            acc_channels,
            dec_channels,
            transient_channels,
            weights,
            blend: BlendEnvelope::new(config.blend, config.is_single_set()),
            pitch: PitchSynth::new(config.pitch.clone()),
            effects: EffectModulator::new(config.effects.clone()),
            oscillator: PitchOscillator::new(config.oscillator),
            burble: BurbleTrigger::new(config.burble.clone()),
            rng: JitterSource::new(config.seed),
            clock: 0.0,
            config,
        })
    }

    /// Stop every channel and hand them back, acceleration layers first,
    /// then deceleration layers, then transient slots.
    pub fn deactivate(self) -> Vec<C> {
        #[cfg(feature = "tracing")]
        tracing::debug!("synth_deactivate");

        self.acc_channels
            .into_iter()
            .chain(self.dec_channels)
            .chain(self.transient_channels)
            .map(|mut channel| {
                channel.stop();
                channel
            })
            .collect()
    }

    /// Shared input block for producers on other threads.
    pub fn inputs(&self) -> Arc<ControlInputs> {
        Arc::clone(&self.inputs)
    }

    /// Switch the engine on or off from the next tick.
    pub fn set_engine_on(&self, on: bool) {
        self.inputs.set_engine_on(on);
    }

    /// Publish RPM.
    pub fn set_rpm(&self, rpm: f32) {
        self.inputs.set_rpm(rpm);
    }

    /// Publish load.
    pub fn set_load(&self, load: f32) {
        self.inputs.set_load(load);
    }

    /// Signal a gear change for the next tick.
    pub fn on_gear_change(&self) {
        self.inputs.signal_gear_change();
    }

    /// Replace the live RPM/load with fixed values, or clear the override.
    pub fn set_manual_override(&mut self, manual: Option<ManualControl>) {
        self.manual = manual;
    }

    /// Active manual override.
    pub fn manual_override(&self) -> Option<ManualControl> {
        self.manual
    }

    /// Run one control tick covering `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += f64::from(dt);

        let snapshot = self.inputs.snapshot();
        let gear_change = self.inputs.take_gear_change();
        let (raw_rpm, raw_load) = match self.manual {
            Some(manual) => (manual.rpm, manual.load),
            None => (snapshot.rpm, snapshot.load),
        };
        let rpm = if raw_rpm.is_finite() {
            raw_rpm.max(0.0).min(self.config.max_theoretical_rpm)
        } else {
            0.0
        };
        let load = clamp01(raw_load);
        let engine_on = snapshot.engine_on;

        if engine_on != self.state.is_on {
            #[cfg(feature = "tracing")]
            tracing::debug!(engine_on, rpm, "engine_switch");
            if !engine_on {
                self.oscillator.reset();
            }
        }

        self.state.previous_rpm = self.state.rpm;
        self.state.rpm = rpm;
        self.state.load = load;
        self.state.is_on = engine_on;

        let (idle_rpm, max_rpm) = (self.config.idle_rpm, self.config.max_rpm);
        let n_rpm = normalized_rpm(rpm, idle_rpm, max_rpm);

        self.blend.update(rpm, self.state.previous_rpm, load, dt);
        let pitch = self.pitch.update(rpm, load, idle_rpm, n_rpm, dt);

        let oscillator_offset = if engine_on {
            if gear_change {
                #[cfg(feature = "tracing")]
                tracing::trace!(rpm, "gear_change");
                self.oscillator.on_gear_change();
            }
            self.oscillator.update(rpm, load, n_rpm, max_rpm, dt)
        } else {
            0.0
        };

        let effects = self.effects.modulate(load, n_rpm);

        let audible_layers = if engine_on && rpm > 0.0 {
            let acc = ChannelFrame {
                rpm,
                load,
                normalized_rpm: n_rpm,
                envelope: self.blend.acc_weight(),
                pitch: pitch.acceleration + oscillator_offset,
                jitter: self.config.pitch.random_jitter,
                effects,
            };
            let dec = ChannelFrame {
                envelope: self.blend.dec_weight(),
                pitch: pitch.deceleration + oscillator_offset,
                ..acc
            };
            self.drive_layers(LayerClass::Acceleration, &acc)
                + self.drive_layers(LayerClass::Deceleration, &dec)
        } else {
            self.acc_channels
                .iter_mut()
                .chain(self.dec_channels.iter_mut())
                .for_each(silence);
            0
        };

        let burble = self.burble.update(
            BurbleInput {
                rpm,
                load,
                max_rpm: self.config.max_rpm,
                engine_on,
                now: self.clock,
            },
            &mut self.transient_channels,
            &mut self.rng,
        );
        match &burble {
            BurbleOutcome::Fired(event) => {
                if let Some(channel) = self.transient_channels.get_mut(event.slot) {
                    channel.set_low_pass_cutoff(effects.low_pass_cutoff);
                    channel.set_distortion_intensity(effects.distortion);
                }
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    slot = event.slot,
                    sample = %event.sample,
                    gain = event.gain,
                    pitch = event.pitch,
                    "burble"
                );
            }
            BurbleOutcome::Skipped(_reason) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(reason = ?_reason, rpm, "burble_skipped");
            }
            BurbleOutcome::Idle => {}
        }

        self.state.smoothed_pitch = pitch.smoothed;
        self.state.smoothed_acc_weight = self.blend.acc_weight();
        self.state.smoothed_dec_weight = self.blend.dec_weight();

        TickReport {
            time: self.clock,
            dt,
            rpm,
            load,
            normalized_rpm: n_rpm,
            engine_on,
            accelerating: self.blend.is_accelerating(),
            acc_weight: self.blend.acc_weight(),
            dec_weight: self.blend.dec_weight(),
            pitch,
            oscillator_offset,
            effects,
            audible_layers,
            burble,
        }
    }

    /// Write one layer set's channels; returns how many are audible.
    fn drive_layers(&mut self, class: LayerClass, frame: &ChannelFrame) -> usize {
        let (engine, channels) = match class {
            LayerClass::Acceleration => (&self.acceleration, &mut self.acc_channels),
            LayerClass::Deceleration => (&self.deceleration, &mut self.dec_channels),
        };
        if channels.is_empty() {
            return 0;
        }

        let config = &self.config;
        let volume = &config.volume;
        let weights = &mut self.weights[..channels.len()];

        if channels.len() == 1 {
            weights[0] = if frame.rpm >= config.single_layer_cutoff_rpm {
                LayerWeight {
                    weight: frame.envelope
                        * volume.single_layer_curve.evaluate(frame.normalized_rpm),
                    audible: true,
                }
            } else {
                LayerWeight::SILENT
            };
        } else {
            engine.weights_into(frame.rpm, frame.envelope, weights);
            let scale = match class {
                LayerClass::Acceleration => {
                    volume.acceleration_scale(
                        frame.rpm,
                        config.idle_rpm,
                        config.max_rpm,
                        config.is_single_set(),
                    ) * volume.load_gain(frame.load)
                }
                LayerClass::Deceleration => volume.deceleration_scale(frame.rpm, config.max_rpm),
            };
            for w in weights.iter_mut() {
                w.weight *= scale;
            }
        }

        let jitter_amount = frame.jitter.max(0.0).min(MAX_RANDOM_JITTER);
        let mut audible = 0;
        for (channel, w) in channels.iter_mut().zip(weights.iter()) {
            if !w.audible {
                silence(channel);
                continue;
            }
            audible += 1;
            let jitter = if jitter_amount > 0.0 {
                self.rng.bipolar(jitter_amount)
            } else {
                0.0
            };
            let pitch = (frame.pitch + jitter)
                .max(MIN_PITCH_RATIO)
                .min(MAX_PITCH_RATIO);
            channel.set_gain(w.weight * volume.master_volume);
            channel.set_pitch_ratio(pitch);
            channel.set_low_pass_cutoff(frame.effects.low_pass_cutoff);
            channel.set_distortion_intensity(frame.effects.distortion);
            channel.set_muted(false);
            channel.set_priority(PRIORITY_AUDIBLE);
            if !channel.is_playing() {
                channel.play();
            }
        }
        audible
    }

    /// Current engine state.
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Activation configuration.
    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Seconds of synthesis so far.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Band table of the acceleration set.
    pub fn acceleration_table(&self) -> &LayerTable {
        self.acceleration.table()
    }

    /// Band table of the deceleration set.
    pub fn deceleration_table(&self) -> &LayerTable {
        self.deceleration.table()
    }

    /// Acceleration layer channels.
    pub fn acceleration_channels(&self) -> &[C] {
        &self.acc_channels
    }

    /// Deceleration layer channels.
    pub fn deceleration_channels(&self) -> &[C] {
        &self.dec_channels
    }

    /// Transient pool.
    pub fn transient_channels(&self) -> &[C] {
        &self.transient_channels
    }

    /// Transient pool, for hosts that report playback progress.
    pub fn transient_channels_mut(&mut self) -> &mut [C] {
        &mut self.transient_channels
    }

    /// The pitch oscillator.
    pub fn oscillator(&self) -> &PitchOscillator {
        &self.oscillator
    }

    /// The burble trigger.
    pub fn burble(&self) -> &BurbleTrigger {
        &self.burble
    }
}

impl<C> core::fmt::Debug for Synthesizer<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Synthesizer")
            .field("state", &self.state)
            .field("acceleration_layers", &self.acc_channels.len())
            .field("deceleration_layers", &self.dec_channels.len())
            .field("transient_slots", &self.transient_channels.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

fn create_layer_channels<F: ChannelFactory>(
    layers: &[AudioLayer],
    factory: &mut F,
    role: impl Fn(usize) -> ChannelRole,
) -> Vec<F::Channel> {
    layers
        .iter()
        .enumerate()
        .map(|(index, layer)| {
            let mut channel = factory.create(role(index), Some(layer.sample.clone()));
            silence(&mut channel);
            channel
        })
        .collect()
}

fn silence<C: PlaybackChannel>(channel: &mut C) {
    channel.set_gain(0.0);
    channel.set_muted(true);
    channel.set_priority(PRIORITY_SILENT);
}
