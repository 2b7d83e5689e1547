//! Host playback contract.
//!
//! The synthesizer never touches audio data. It owns one [`PlaybackChannel`]
//! per layer (both sets) plus a fixed pool of transient channels, and
//! overwrites their parameters every tick. Channels are created once at
//! activation through a [`ChannelFactory`] and handed back to the host on
//! deactivation.
//!
//! [`RecordingChannel`] is a headless implementation that simply remembers
//! what was written to it; it backs the tests and the command line tools.

use crate::layer::SampleId;

/// Priority given to channels that are currently audible.
pub const PRIORITY_AUDIBLE: u16 = 128;

/// Priority given to silent channels so voice-limited engines drop them first.
pub const PRIORITY_SILENT: u16 = 256;

/// Parameter sink for one host playback voice.
///
/// All setters are called from the tick thread only.
pub trait PlaybackChannel {
    /// Linear gain.
    fn set_gain(&mut self, gain: f32);

    /// Playback rate multiplier (1.0 = recorded pitch).
    fn set_pitch_ratio(&mut self, ratio: f32);

    /// Low-pass filter cutoff.
    fn set_low_pass_cutoff(&mut self, cutoff: f32);

    /// Distortion amount.
    fn set_distortion_intensity(&mut self, intensity: f32);

    /// Swap the clip a transient channel plays next.
    ///
    /// Layer channels keep the sample they were created with.
    fn set_sample(&mut self, sample: &SampleId);

    /// Start (or restart) playback.
    fn play(&mut self);

    /// Stop playback.
    fn stop(&mut self);

    /// Whether the host reports the voice as playing.
    fn is_playing(&self) -> bool;

    /// Mute without stopping.
    fn set_muted(&mut self, muted: bool);

    /// Voice priority; lower values are more important.
    fn set_priority(&mut self, priority: u16);
}

/// What a channel is used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelRole {
    /// Looping layer in the acceleration set.
    Acceleration {
        /// Layer index.
        index: usize,
    },
    /// Looping layer in the deceleration set.
    Deceleration {
        /// Layer index.
        index: usize,
    },
    /// One-shot burble slot.
    Transient {
        /// Pool slot.
        slot: usize,
    },
}

/// Allocates channels at activation.
///
/// Implemented for any `FnMut(ChannelRole, Option<SampleId>) -> C`.
pub trait ChannelFactory {
    /// Channel type produced.
    type Channel: PlaybackChannel;

    /// Create the channel for `role`. Layer roles carry their sample;
    /// transient slots get `None` and receive a sample per trigger.
    fn create(&mut self, role: ChannelRole, sample: Option<SampleId>) -> Self::Channel;
}

impl<C, F> ChannelFactory for F
where
    C: PlaybackChannel,
    F: FnMut(ChannelRole, Option<SampleId>) -> C,
{
    type Channel = C;

    fn create(&mut self, role: ChannelRole, sample: Option<SampleId>) -> C {
        self(role, sample)
    }
}

/// Headless channel that records every parameter write.
///
/// With a clip length set, [`advance`](Self::advance) ends playback after
/// that many seconds, which is how one-shot transients free their slot.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordingChannel {
    role: ChannelRole,
    sample: Option<SampleId>,
    gain: f32,
    pitch_ratio: f32,
    low_pass_cutoff: f32,
    distortion: f32,
    playing: bool,
    muted: bool,
    priority: u16,
    play_count: u32,
    clip_length: Option<f32>,
    position: f32,
}

impl RecordingChannel {
    /// Create a stopped channel.
    pub fn new(role: ChannelRole, sample: Option<SampleId>) -> Self {
        Self {
            role,
            sample,
            gain: 0.0,
            pitch_ratio: 1.0,
            low_pass_cutoff: 0.0,
            distortion: 0.0,
            playing: false,
            muted: false,
            priority: PRIORITY_SILENT,
            play_count: 0,
            clip_length: None,
            position: 0.0,
        }
    }

    /// Stop by itself after `seconds` of playback.
    pub fn with_clip_length(mut self, seconds: f32) -> Self {
        self.clip_length = Some(seconds);
        self
    }

    /// Advance the playback clock. Returns `true` if the clip just ended.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.playing {
            return false;
        }
        self.position += dt * self.pitch_ratio.max(0.0);
        match self.clip_length {
            Some(length) if self.position >= length => {
                self.playing = false;
                true
            }
            _ => false,
        }
    }

    /// Simulate the host finishing playback.
    pub fn finish(&mut self) {
        self.playing = false;
    }

    /// The channel's role.
    pub fn role(&self) -> ChannelRole {
        self.role
    }

    /// Current sample.
    pub fn sample(&self) -> Option<&SampleId> {
        self.sample.as_ref()
    }

    /// Last gain written.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Last pitch ratio written.
    pub fn pitch_ratio(&self) -> f32 {
        self.pitch_ratio
    }

    /// Last low-pass cutoff written.
    pub fn low_pass_cutoff(&self) -> f32 {
        self.low_pass_cutoff
    }

    /// Last distortion intensity written.
    pub fn distortion(&self) -> f32 {
        self.distortion
    }

    /// Whether muted.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Last priority written.
    pub fn priority(&self) -> u16 {
        self.priority
    }

    /// Number of times `play` was called.
    pub fn play_count(&self) -> u32 {
        self.play_count
    }
}

impl PlaybackChannel for RecordingChannel {
    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    fn set_pitch_ratio(&mut self, ratio: f32) {
        self.pitch_ratio = ratio;
    }

    fn set_low_pass_cutoff(&mut self, cutoff: f32) {
        self.low_pass_cutoff = cutoff;
    }

    fn set_distortion_intensity(&mut self, intensity: f32) {
        self.distortion = intensity;
    }

    fn set_sample(&mut self, sample: &SampleId) {
        self.sample = Some(sample.clone());
    }

    fn play(&mut self) {
        self.playing = true;
        self.position = 0.0;
        self.play_count += 1;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn set_priority(&mut self, priority: u16) {
        self.priority = priority;
    }
}

/// Factory producing [`RecordingChannel`]s.
///
/// Transient slots get `transient_length` seconds of clip so they free
/// themselves when advanced.
pub fn recording_factory(
    transient_length: f32,
) -> impl FnMut(ChannelRole, Option<SampleId>) -> RecordingChannel {
    move |role, sample| {
        let channel = RecordingChannel::new(role, sample);
        match role {
            ChannelRole::Transient { .. } => channel.with_clip_length(transient_length),
            _ => channel,
        }
    }
}
