//! Motor Core - engine sound synthesis from RPM and load
//!
//! This crate turns two control signals, engine speed and load, into the
//! parameters a host audio engine applies to a small set of looping engine
//! recordings: per-layer gain, pitch ratio, low-pass cutoff and distortion.
//! It generates no audio itself.
//!
//! # Components
//!
//! ## Layer crossfading
//!
//! - [`LayerTable`] - `[min, normal, max]` RPM bands derived from layer centers
//! - [`CrossfadeEngine`] - per-layer weights with linear ramps between neighbours
//! - [`BlendEnvelope`] - smoothed acceleration vs deceleration set weights
//!
//! ## Modulation
//!
//! - [`PitchSynth`] - curve-driven, smoothed base pitch
//! - [`EffectModulator`] - load/RPM driven low-pass and distortion
//! - [`PitchOscillator`] - decaying pitch wobble on RPM transients and gear shifts
//! - [`BurbleTrigger`] - random one-shot transients on throttle release
//!
//! ## Host integration
//!
//! - [`Synthesizer`] - the per-tick orchestrator
//! - [`PlaybackChannel`] / [`ChannelFactory`] - what the host implements
//! - [`ControlInputs`] - lock-free RPM/load inputs for producer threads
//! - [`TickScheduler`] - fixed control-rate tick scheduling
//!
//! # no_std Support
//!
//! The crate needs only `alloc`. Disable the default `std` feature for
//! embedded hosts:
//!
//! ```toml
//! [dependencies]
//! motor-core = { version = "0.1", default-features = false }
//! ```
//!
//! The optional `tracing` feature emits `debug!`/`trace!` events for
//! activation, engine switching, gear changes and burbles.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod blend;
pub mod burble;
pub mod channel;
pub mod config;
pub mod crossfade;
pub mod curve;
pub mod effects;
pub mod error;
pub mod inputs;
pub mod layer;
pub mod math;
pub mod oscillator;
pub mod pitch;
pub mod random;
pub mod scheduler;
pub mod smoothing;
pub mod synth;

pub use blend::{BlendConfig, BlendEnvelope};
pub use burble::{
    BurbleConfig, BurbleEvent, BurbleInput, BurbleOutcome, BurbleSkip, BurbleState,
    BurbleTrigger,
};
pub use channel::{
    ChannelFactory, ChannelRole, PRIORITY_AUDIBLE, PRIORITY_SILENT, PlaybackChannel,
    RecordingChannel, recording_factory,
};
pub use config::{SynthConfig, VolumeConfig};
pub use crossfade::{CrossfadeEngine, LayerWeight, band_weight};
pub use curve::{CurvePoint, CurveRef, Interpolation, PiecewiseCurve, ResponseCurve, curve_ref};
pub use effects::{EffectConfig, EffectModulator, EffectParams};
pub use error::SynthError;
pub use inputs::{ControlInputs, InputSnapshot, ManualControl};
pub use layer::{AudioLayer, LayerBand, LayerTable, SampleId, center_rpm_from_name};
pub use math::{clamp01, inverse_lerp, lerp, normalized_rpm, smoothing_coeff, wrap_phase};
pub use oscillator::{OscillatorConfig, OscillatorState, PitchOscillator};
pub use pitch::{MAX_RANDOM_JITTER, PitchConfig, PitchFrame, PitchSynth};
pub use random::JitterSource;
pub use scheduler::TickScheduler;
pub use smoothing::SmoothedValue;
pub use synth::{EngineState, MAX_PITCH_RATIO, MIN_PITCH_RATIO, Synthesizer, TickReport};
