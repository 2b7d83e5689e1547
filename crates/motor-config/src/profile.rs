//! Engine profile file format and operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use motor_core::{AudioLayer, SynthConfig, center_rpm_from_name};

use crate::error::ConfigError;
use crate::sections::{
    BlendSection, BurbleSection, EffectsSection, OscillatorSection, PitchSection, VolumeSection,
};

/// Host mixer group an engine sound is routed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mixer {
    /// Air intake.
    Intake,
    /// Engine block.
    #[default]
    Engine,
    /// Exhaust.
    Exhaust,
    /// Gearbox whine.
    Transmission,
    /// Differential whine.
    Differential,
}

impl fmt::Display for Mixer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mixer::Intake => "intake",
            Mixer::Engine => "engine",
            Mixer::Exhaust => "exhaust",
            Mixer::Transmission => "transmission",
            Mixer::Differential => "differential",
        };
        f.write_str(name)
    }
}

/// One sample entry in a layer set.
///
/// `center_rpm` may be omitted when the sample name ends in `_<rpm>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerEntry {
    /// Sample identifier handed to the host.
    pub sample: String,

    /// Explicit center RPM; overrides the one in the sample name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_rpm: Option<f32>,
}

impl LayerEntry {
    /// Entry whose center RPM comes from the sample name.
    pub fn new(sample: impl Into<String>) -> Self {
        Self {
            sample: sample.into(),
            center_rpm: None,
        }
    }

    /// Set an explicit center RPM.
    pub fn with_center_rpm(mut self, rpm: f32) -> Self {
        self.center_rpm = Some(rpm);
        self
    }

    /// The center RPM, explicit or parsed from the sample name.
    pub fn center_rpm(&self) -> Option<f32> {
        self.center_rpm
            .or_else(|| center_rpm_from_name(&self.sample))
    }

    /// Resolve into a core layer.
    pub fn resolve(&self) -> Result<AudioLayer, ConfigError> {
        let rpm = self
            .center_rpm()
            .ok_or_else(|| ConfigError::UnresolvedCenterRpm(self.sample.clone()))?;
        Ok(AudioLayer::new(self.sample.as_str(), rpm))
    }
}

/// `[layers]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayersSection {
    /// Half-width of each band in RPM.
    pub deviation: f32,
    /// Upper bound of the last band's ramp-out.
    pub max_theoretical_rpm: f32,
    /// Narrows crossfade ramps; 1 leaves them at full width.
    pub range_divider: f32,
    /// Below this RPM a one-layer set stays silent.
    pub single_layer_cutoff_rpm: f32,
    /// Samples played under load, ascending center RPM.
    pub acceleration: Vec<LayerEntry>,
    /// Samples played off-throttle, ascending center RPM. May be empty.
    pub deceleration: Vec<LayerEntry>,
}

impl Default for LayersSection {
    fn default() -> Self {
        Self {
            deviation: 1000.0,
            max_theoretical_rpm: 10_000.0,
            range_divider: 1.0,
            single_layer_cutoff_rpm: 100.0,
            acceleration: Vec::new(),
            deceleration: Vec::new(),
        }
    }
}

fn resolve_all(entries: &[LayerEntry]) -> Result<Vec<AudioLayer>, ConfigError> {
    entries.iter().map(LayerEntry::resolve).collect()
}

/// Engine sound profile.
///
/// Profiles are TOML files describing the layer sets and the tuning of every
/// synthesis stage. Every table and key is optional except `name`; omitted
/// values take the core defaults.
///
/// # TOML Format
///
/// ```toml
/// name = "Inline Four"
/// description = "Revvy small-displacement four"
/// mixer = "engine"
/// idle_rpm = 850.0
/// max_rpm = 7200.0
///
/// [layers]
/// deviation = 1000.0
///
/// [[layers.acceleration]]
/// sample = "i4_acc_1200.wav"
///
/// [[layers.acceleration]]
/// sample = "i4_acc_loop.wav"
/// center_rpm = 3800.0
///
/// [pitch]
/// random_jitter = 0.01
/// curve = { points = [[0.0, 0.8], [1.0, 1.6]], interpolation = "linear" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineProfile {
    /// Name of the profile.
    pub name: String,

    /// Optional description of the profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Mixer group for host routing.
    #[serde(default)]
    pub mixer: Mixer,

    /// RPM the engine idles at.
    #[serde(default = "default_idle_rpm")]
    pub idle_rpm: f32,

    /// Redline RPM.
    #[serde(default = "default_max_rpm")]
    pub max_rpm: f32,

    /// Seed for jitter and burble draws.
    #[serde(default)]
    pub seed: u64,

    /// Layer sets and band layout.
    #[serde(default)]
    pub layers: LayersSection,

    /// Volume shaping.
    #[serde(default)]
    pub volume: VolumeSection,

    /// Pitch synthesis.
    #[serde(default)]
    pub pitch: PitchSection,

    /// Acceleration/deceleration envelope.
    #[serde(default)]
    pub blend: BlendSection,

    /// Low-pass and distortion modulation.
    #[serde(default)]
    pub effects: EffectsSection,

    /// Pitch oscillator.
    #[serde(default)]
    pub oscillator: OscillatorSection,

    /// Throttle-release bursts.
    #[serde(default)]
    pub burble: BurbleSection,
}

fn default_idle_rpm() -> f32 {
    800.0
}

fn default_max_rpm() -> f32 {
    7000.0
}

impl EngineProfile {
    /// Create a new profile with no layers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            mixer: Mixer::default(),
            idle_rpm: default_idle_rpm(),
            max_rpm: default_max_rpm(),
            seed: 0,
            layers: LayersSection::default(),
            volume: VolumeSection::default(),
            pitch: PitchSection::default(),
            blend: BlendSection::default(),
            effects: EffectsSection::default(),
            oscillator: OscillatorSection::default(),
            burble: BurbleSection::default(),
        }
    }

    /// Create a profile with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the mixer group.
    pub fn with_mixer(mut self, mixer: Mixer) -> Self {
        self.mixer = mixer;
        self
    }

    /// Set idle and redline RPM.
    pub fn with_rpm_range(mut self, idle_rpm: f32, max_rpm: f32) -> Self {
        self.idle_rpm = idle_rpm;
        self.max_rpm = max_rpm;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Append an acceleration layer.
    pub fn with_acceleration(mut self, entry: LayerEntry) -> Self {
        self.layers.acceleration.push(entry);
        self
    }

    /// Append a deceleration layer.
    pub fn with_deceleration(mut self, entry: LayerEntry) -> Self {
        self.layers.deceleration.push(entry);
        self
    }

    /// Load a profile from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::read_file(path, e))?;
        let profile: EngineProfile = toml::from_str(&content)?;
        Ok(profile)
    }

    /// Load a profile from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the profile to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the profile to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Whether the deceleration set is absent.
    pub fn is_single_set(&self) -> bool {
        self.layers.deceleration.is_empty()
    }

    /// Resolved acceleration layers.
    pub fn acceleration_layers(&self) -> Result<Vec<AudioLayer>, ConfigError> {
        resolve_all(&self.layers.acceleration)
    }

    /// Resolved deceleration layers.
    pub fn deceleration_layers(&self) -> Result<Vec<AudioLayer>, ConfigError> {
        resolve_all(&self.layers.deceleration)
    }

    /// Build the synthesizer configuration.
    ///
    /// Resolves every sample's center RPM and builds every curve. The result
    /// has passed [`SynthConfig::validate`].
    pub fn to_synth_config(&self) -> Result<SynthConfig, ConfigError> {
        let mut config = SynthConfig::new(
            self.max_rpm,
            self.idle_rpm,
            self.acceleration_layers()?,
            self.deceleration_layers()?,
        );
        config.max_theoretical_rpm = self.layers.max_theoretical_rpm;
        config.rpm_deviation = self.layers.deviation;
        config.range_divider = self.layers.range_divider;
        config.single_layer_cutoff_rpm = self.layers.single_layer_cutoff_rpm;
        config.volume = self.volume.to_config()?;
        config.pitch = self.pitch.to_config()?;
        config.blend = self.blend.to_config();
        config.effects = self.effects.to_config()?;
        config.oscillator = self.oscillator.into();
        config.burble = self.burble.to_config();
        config.seed = self.seed;
        config.validate()?;
        Ok(config)
    }
}

impl Default for EngineProfile {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
