//! Shared CLI helpers used across multiple commands.

use motor_config::{EngineProfile, find_profile, get_factory_profile};
use motor_core::{RecordingChannel, Synthesizer, recording_factory};
use thiserror::Error;

/// Seconds a recorded burble clip plays before freeing its slot.
pub const BURBLE_CLIP_SECONDS: f32 = 0.4;

/// Argument problems clap cannot catch on its own.
#[derive(Debug, Error)]
pub enum ArgError {
    /// Tick interval is zero, negative or not a number.
    #[error("tick interval must be positive, got {0} ms")]
    TickInterval(f32),

    /// Duration is zero, negative or not a number.
    #[error("duration must be positive, got {0} s")]
    Duration(f32),

    /// No factory profile, user profile or file matched.
    #[error("profile '{0}' not found; see 'motor profiles list'")]
    ProfileNotFound(String),
}

/// Load a profile by name or path.
///
/// Searches in this order:
/// 1. Factory profiles (by identifier or display name)
/// 2. A direct file path, then the user profiles directory
pub fn load_profile(name: &str) -> anyhow::Result<EngineProfile> {
    if let Some(profile) = get_factory_profile(name) {
        return Ok(profile);
    }

    if let Some(path) = find_profile(name) {
        tracing::debug!(path = %path.display(), "loading profile");
        return Ok(EngineProfile::load(&path)?);
    }

    Err(ArgError::ProfileNotFound(name.to_string()).into())
}

/// Convert a millisecond tick interval to seconds, rejecting non-positive values.
pub fn tick_seconds(tick_ms: f32) -> Result<f32, ArgError> {
    if tick_ms.is_finite() && tick_ms > 0.0 {
        Ok(tick_ms / 1000.0)
    } else {
        Err(ArgError::TickInterval(tick_ms))
    }
}

/// Reject non-positive durations.
pub fn check_duration(seconds: f32) -> Result<f32, ArgError> {
    if seconds.is_finite() && seconds > 0.0 {
        Ok(seconds)
    } else {
        Err(ArgError::Duration(seconds))
    }
}

/// Build a headless synthesizer for `profile`, optionally overriding its seed.
pub fn activate(
    profile: &EngineProfile,
    seed: Option<u64>,
) -> anyhow::Result<Synthesizer<RecordingChannel>> {
    let mut config = profile.to_synth_config()?;
    if let Some(seed) = seed {
        config.seed = seed;
    }
    let synth = Synthesizer::activate(config, &mut recording_factory(BURBLE_CLIP_SECONDS))?;
    tracing::info!(
        profile = %profile.name,
        mixer = %profile.mixer,
        acceleration = synth.acceleration_channels().len(),
        deceleration = synth.deceleration_channels().len(),
        "synthesizer ready"
    );
    Ok(synth)
}

/// Let finished burble clips free their transient slots.
pub fn advance_transients(synth: &mut Synthesizer<RecordingChannel>, dt: f32) {
    for channel in synth.transient_channels_mut() {
        channel.advance(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_seconds_rejects_non_positive() {
        assert_eq!(tick_seconds(10.0).unwrap(), 0.01);
        assert!(matches!(tick_seconds(0.0), Err(ArgError::TickInterval(_))));
        assert!(tick_seconds(f32::NAN).is_err());
    }

    #[test]
    fn duration_must_be_positive() {
        assert_eq!(check_duration(2.5).unwrap(), 2.5);
        assert!(check_duration(-1.0).is_err());
    }

    #[test]
    fn factory_profiles_load_by_name() {
        assert_eq!(load_profile("v8_muscle").unwrap().name, "V8 Muscle");
        let err = load_profile("no_such_engine_here").unwrap_err();
        assert!(err.to_string().contains("no_such_engine_here"));
    }

    #[test]
    fn seed_override_applies() {
        let profile = load_profile("inline_four").unwrap();
        let synth = activate(&profile, Some(99)).unwrap();
        assert_eq!(synth.config().seed, 99);
    }
}
