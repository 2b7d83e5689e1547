//! Errors raised while building a synthesizer.
//!
//! The per-tick path never fails; only construction does.

/// Errors that can occur while activating a synthesizer or building its curves.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthError {
    /// The acceleration layer set is empty; there is nothing to synthesize.
    EmptyAccelerationLayers,
    /// Idle RPM must be non-negative and strictly below max RPM.
    InvalidRpmRange {
        /// Configured idle RPM.
        idle_rpm: f32,
        /// Configured max RPM.
        max_rpm: f32,
    },
    /// A response curve was built without control points.
    EmptyCurve,
    /// A response curve control point is NaN or infinite.
    NonFiniteCurvePoint(usize),
}

impl core::fmt::Display for SynthError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyAccelerationLayers => write!(f, "no acceleration layers provided"),
            Self::InvalidRpmRange { idle_rpm, max_rpm } => {
                write!(
                    f,
                    "invalid rpm range: idle {idle_rpm} must be below max {max_rpm}"
                )
            }
            Self::EmptyCurve => write!(f, "response curve has no control points"),
            Self::NonFiniteCurvePoint(index) => {
                write!(f, "response curve point {index} is not finite")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SynthError {}
