//! Engine profiles for the motor synthesizer.
//!
//! This crate turns TOML engine profiles into [`motor_core::SynthConfig`]s and
//! checks them offline before they reach the synthesizer.
//!
//! # Features
//!
//! - **Profiles**: Load and save [`EngineProfile`]s from TOML files
//! - **Curves**: Control-point response curves ([`CurveConfig`])
//! - **Validation**: Band gaps, unsorted layers and out-of-range tuning
//! - **Paths**: Platform-specific profile directories
//! - **Factory Profiles**: Built-in profiles that need no files
//!
//! # Example
//!
//! ```rust,no_run
//! use motor_config::{EngineProfile, LayerEntry, validate_profile, user_profiles_dir};
//!
//! // Load a profile from file
//! let profile = EngineProfile::load("flat_six.toml").unwrap();
//! let config = profile.to_synth_config().unwrap();
//!
//! // Build one programmatically
//! let profile = EngineProfile::new("Flat Six")
//!     .with_rpm_range(900.0, 8000.0)
//!     .with_acceleration(LayerEntry::new("f6_on_2000.wav"))
//!     .with_acceleration(LayerEntry::new("f6_on_4000.wav"));
//! assert!(!validate_profile(&profile).has_errors());
//!
//! // Save to the user profiles directory
//! profile.save(user_profiles_dir().join("flat_six.toml")).unwrap();
//! ```

mod curve_config;
mod error;
mod profile;
mod sections;

/// Platform-specific paths for profiles.
#[cfg(feature = "std")]
pub mod paths;

/// Offline profile validation.
pub mod validation;

/// Factory profiles bundled with the library.
pub mod factory_profiles;

pub use curve_config::{CurveConfig, CurveInterpolation};
pub use error::ConfigError;
pub use factory_profiles::{
    FACTORY_PROFILE_NAMES, factory_profile_names, factory_profiles, get_factory_profile,
    is_factory_profile,
};
#[cfg(feature = "std")]
pub use paths::{
    ensure_user_profiles_dir, find_profile, list_user_profiles, profile_name_from_path,
    user_config_dir, user_profiles_dir,
};
pub use profile::{EngineProfile, LayerEntry, LayersSection, Mixer};
pub use sections::{
    BlendSection, BurbleSection, EffectsSection, OscillatorSection, PitchSection, VolumeSection,
};
pub use validation::{
    Severity, ValidationError, ValidationIssue, ValidationReport, ValidationResult,
    validate_profile, validate_profile_strict,
};
