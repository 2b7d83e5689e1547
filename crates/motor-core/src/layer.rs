//! Audio layers and the RPM band table derived from them.
//!
//! Each layer is a looping recording of the engine at one RPM (its
//! *center*). At activation the ordered layer list is turned into a
//! [`LayerTable`] of `[min, normal, max]` bands:
//!
//! ```text
//! min[0]  = 0
//! min[i]  = center[i] - deviation      (i > 0)
//! normal  = center[i]
//! max[i]  = center[i] + deviation
//! upper[i] = max[i + 1]                (last layer: max theoretical rpm)
//! ```
//!
//! Layers must be supplied in ascending center order and adjacent bands
//! should overlap for a gap-free crossfade. Neither is checked here;
//! offline validation lives in the config crate.

use alloc::string::String;
use alloc::vec::Vec;

/// Opaque reference to a pre-recorded sample known to the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleId(String);

impl SampleId {
    /// Wrap a host sample name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The sample name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SampleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SampleId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SampleId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// One recorded layer bound to the RPM it was captured at.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioLayer {
    /// Sample played by this layer's channel.
    pub sample: SampleId,
    /// RPM at which this layer is the dominant sound.
    pub center_rpm: f32,
}

impl AudioLayer {
    /// Create a layer.
    pub fn new(sample: impl Into<SampleId>, center_rpm: f32) -> Self {
        Self {
            sample: sample.into(),
            center_rpm,
        }
    }

    /// Create a layer whose center RPM is encoded in the sample name.
    ///
    /// See [`center_rpm_from_name`].
    pub fn from_sample_name(name: &str) -> Option<Self> {
        center_rpm_from_name(name).map(|rpm| Self::new(name, rpm))
    }
}

/// Extract the center RPM from a sample name.
///
/// The RPM is the text after the last `_`, with a trailing file extension
/// removed: `Exhaust_AccelerateAt_5000.wav` registers 5000.
///
/// # Example
/// ```rust
/// use motor_core::center_rpm_from_name;
///
/// assert_eq!(center_rpm_from_name("Intake_On_2500"), Some(2500.0));
/// assert_eq!(center_rpm_from_name("Some_Name_123_9000.wav"), Some(9000.0));
/// assert_eq!(center_rpm_from_name("idle.wav"), None);
/// ```
pub fn center_rpm_from_name(name: &str) -> Option<f32> {
    let stem = match name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphabetic()) => {
            stem
        }
        _ => name,
    };
    let (_, digits) = stem.rsplit_once('_')?;
    let rpm: f32 = digits.trim().parse().ok()?;
    (rpm.is_finite() && rpm >= 0.0).then_some(rpm)
}

/// Ramp-in / plateau / ramp-out RPM triple for one layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayerBand {
    /// Start of the ramp-in.
    pub min: f32,
    /// Start of the plateau (the layer's center RPM).
    pub normal: f32,
    /// End of the plateau, start of the ramp-out.
    pub max: f32,
}

/// Bands for an ordered layer set plus each layer's ramp-out end.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerTable {
    bands: Vec<LayerBand>,
    upper_bounds: Vec<f32>,
}

impl LayerTable {
    /// Derive the band table for `layers`.
    ///
    /// Pure function of the configuration; an empty slice yields an empty table.
    pub fn build(layers: &[AudioLayer], deviation: f32, max_theoretical_rpm: f32) -> Self {
        let bands: Vec<LayerBand> = layers
            .iter()
            .enumerate()
            .map(|(i, layer)| LayerBand {
                min: if i == 0 {
                    0.0
                } else {
                    layer.center_rpm - deviation
                },
                normal: layer.center_rpm,
                max: layer.center_rpm + deviation,
            })
            .collect();

        let upper_bounds = (0..bands.len())
            .map(|i| bands.get(i + 1).map_or(max_theoretical_rpm, |next| next.max))
            .collect();

        Self {
            bands,
            upper_bounds,
        }
    }

    /// All bands in layer order.
    pub fn bands(&self) -> &[LayerBand] {
        &self.bands
    }

    /// Band for layer `index`.
    pub fn band(&self, index: usize) -> Option<&LayerBand> {
        self.bands.get(index)
    }

    /// RPM at which layer `index` has fully faded out.
    pub fn upper_bound(&self, index: usize) -> Option<f32> {
        self.upper_bounds.get(index).copied()
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Whether the table holds no layers.
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}
