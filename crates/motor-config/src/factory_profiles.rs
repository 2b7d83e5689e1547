//! Factory engine profiles bundled with the library.
//!
//! These profiles are always available without external files. Sample names
//! follow the `<name>_<rpm>` convention so most layers need no explicit
//! `center_rpm`.

use crate::EngineProfile;

/// Array of factory profile names for external access.
pub static FACTORY_PROFILE_NAMES: &[&str] =
    &["inline_four", "v8_muscle", "single_loop", "turbo_exhaust"];

/// TOML content for factory profiles.
///
/// These are embedded at compile time and always available.
static FACTORY_PROFILES_TOML: &[(&str, &str)] = &[
    ("inline_four", INLINE_FOUR_PROFILE),
    ("v8_muscle", V8_MUSCLE_PROFILE),
    ("single_loop", SINGLE_LOOP_PROFILE),
    ("turbo_exhaust", TURBO_EXHAUST_PROFILE),
];

/// Revvy four cylinder with both layer sets.
const INLINE_FOUR_PROFILE: &str = r#"
name = "Inline Four"
description = "Small-displacement four with on- and off-throttle recordings"
mixer = "engine"
idle_rpm = 850.0
max_rpm = 7200.0
seed = 4

[layers]
deviation = 1000.0
max_theoretical_rpm = 10000.0

[[layers.acceleration]]
sample = "i4_acc_1200.wav"

[[layers.acceleration]]
sample = "i4_acc_2500.wav"

[[layers.acceleration]]
sample = "i4_acc_3800.wav"

[[layers.acceleration]]
sample = "i4_acc_5200.wav"

[[layers.acceleration]]
sample = "i4_acc_6500.wav"

[[layers.deceleration]]
sample = "i4_dec_1200.wav"

[[layers.deceleration]]
sample = "i4_dec_2800.wav"

[[layers.deceleration]]
sample = "i4_dec_4400.wav"

[[layers.deceleration]]
sample = "i4_dec_6000.wav"

[pitch]
random_jitter = 0.01
curve = { points = [[0.0, 0.85], [1.0, 1.5]], interpolation = "linear" }

[oscillator]
enabled = true
depth = 0.015
"#;

/// Big V8 that crackles on lift-off.
const V8_MUSCLE_PROFILE: &str = r#"
name = "V8 Muscle"
description = "Lumpy V8 with exhaust burbles on throttle release"
mixer = "engine"
idle_rpm = 700.0
max_rpm = 6200.0
seed = 8

[layers]
deviation = 900.0
max_theoretical_rpm = 9000.0

[[layers.acceleration]]
sample = "v8_on_1000.wav"

[[layers.acceleration]]
sample = "v8_on_2200.wav"

[[layers.acceleration]]
sample = "v8_on_3400.wav"

[[layers.acceleration]]
sample = "v8_on_4600.wav"

[[layers.acceleration]]
sample = "v8_on_5800.wav"

[[layers.deceleration]]
sample = "v8_off_1000.wav"

[[layers.deceleration]]
sample = "v8_off_2500.wav"

[[layers.deceleration]]
sample = "v8_off_4000.wav"

[[layers.deceleration]]
sample = "v8_off_5500.wav"

[volume]
max_acc_volume = 0.5
max_dec_volume = 0.15

[pitch]
random_jitter = 0.02
curve = { points = [[0.0, 0.75], [0.6, 1.2], [1.0, 1.45]], interpolation = "smooth" }

[effects]
muffling_intensity = 0.6
distortion_intensity = 0.3

[oscillator]
enabled = true
depth = 0.025
gear_change_intensity = 1.5

[burble]
enabled = true
min_rpm = 3000.0
probability = 0.7
base_volume = 0.7
pool_size = 4
samples = ["v8_pop_1.wav", "v8_pop_2.wav", "v8_pop_3.wav"]
"#;

/// One looping recording, pitched and faded by RPM.
const SINGLE_LOOP_PROFILE: &str = r#"
name = "Single Loop"
description = "One looping sample, volume shaped by the single-layer curve"
mixer = "engine"
idle_rpm = 600.0
max_rpm = 3600.0

[layers]
single_layer_cutoff_rpm = 200.0

[[layers.acceleration]]
sample = "generator_loop.wav"
center_rpm = 2000.0

[volume]
single_layer_curve = { points = [[0.0, 0.3], [0.5, 0.7], [1.0, 1.0]], interpolation = "smooth" }

[pitch]
curve = { points = [[0.0, 0.7], [1.0, 1.3]], interpolation = "linear" }
"#;

/// Turbocharged exhaust with acceleration layers only.
const TURBO_EXHAUST_PROFILE: &str = r#"
name = "Turbo Exhaust"
description = "Exhaust-only layers with distortion at high rpm and pops on lift-off"
mixer = "exhaust"
idle_rpm = 900.0
max_rpm = 7500.0
seed = 16

[layers]
deviation = 1000.0

[[layers.acceleration]]
sample = "turbo_exh_1500.wav"

[[layers.acceleration]]
sample = "turbo_exh_3000.wav"

[[layers.acceleration]]
sample = "turbo_exh_4500.wav"

[[layers.acceleration]]
sample = "turbo_exh_6000.wav"

[effects]
muffling_intensity = 0.3
distortion_intensity = 0.4
distortion_curve = { points = [[0.0, 0.0], [0.7, 0.2], [1.0, 1.0]], interpolation = "smooth" }

[burble]
enabled = true
min_rpm = 4000.0
probability = 0.5
pool_size = 3
samples = ["turbo_pop_a.wav", "turbo_pop_b.wav"]
"#;

/// Get all factory profiles.
///
/// Returns a vector of all built-in profiles, parsed from embedded TOML.
///
/// # Example
///
/// ```rust
/// use motor_config::factory_profiles;
///
/// for profile in factory_profiles() {
///     println!("  - {}: {}", profile.name, profile.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_profiles() -> Vec<EngineProfile> {
    FACTORY_PROFILES_TOML
        .iter()
        .filter_map(|(_, toml)| EngineProfile::from_toml(toml).ok())
        .collect()
}

/// Get a factory profile by name.
///
/// Matches the internal identifier or the profile's display name,
/// case-insensitively.
///
/// # Example
///
/// ```rust
/// use motor_config::get_factory_profile;
///
/// let profile = get_factory_profile("V8 Muscle").expect("bundled");
/// assert!(profile.burble.enabled);
/// ```
pub fn get_factory_profile(name: &str) -> Option<EngineProfile> {
    let name_lower = name.to_lowercase();

    if let Some((_, toml)) = FACTORY_PROFILES_TOML
        .iter()
        .find(|(id, _)| id.to_lowercase() == name_lower)
    {
        return EngineProfile::from_toml(toml).ok();
    }

    factory_profiles()
        .into_iter()
        .find(|profile| profile.name.to_lowercase() == name_lower)
}

/// Get the identifiers of all factory profiles.
pub fn factory_profile_names() -> Vec<&'static str> {
    FACTORY_PROFILES_TOML
        .iter()
        .map(|(name, _)| *name)
        .collect()
}

/// Check if a name refers to a factory profile (case-insensitive).
///
/// ```rust
/// use motor_config::is_factory_profile;
///
/// assert!(is_factory_profile("inline_four"));
/// assert!(is_factory_profile("Inline Four"));
/// assert!(!is_factory_profile("my_engine"));
/// ```
pub fn is_factory_profile(name: &str) -> bool {
    get_factory_profile(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_profile;

    #[test]
    fn all_factory_profiles_parse() {
        assert_eq!(factory_profiles().len(), FACTORY_PROFILES_TOML.len());
    }

    #[test]
    fn names_table_matches_embedded_profiles() {
        assert_eq!(factory_profile_names(), FACTORY_PROFILE_NAMES.to_vec());
    }

    #[test]
    fn all_factory_profiles_are_clean() {
        for profile in factory_profiles() {
            let report = validate_profile(&profile);
            assert!(report.is_clean(), "{}: {:?}", profile.name, report.issues());
        }
    }

    #[test]
    fn all_factory_profiles_build_synth_configs() {
        for profile in factory_profiles() {
            let config = profile.to_synth_config();
            assert!(config.is_ok(), "{}: {:?}", profile.name, config.err());
        }
    }

    #[test]
    fn lookup_by_id_and_display_name() {
        let by_id = get_factory_profile("SINGLE_LOOP").unwrap();
        let by_name = get_factory_profile("turbo exhaust").unwrap();
        assert_eq!(by_id.name, "Single Loop");
        assert_eq!(by_name.name, "Turbo Exhaust");
        assert!(get_factory_profile("w16").is_none());
    }

    #[test]
    fn single_loop_is_single_set_with_explicit_center() {
        let profile = get_factory_profile("single_loop").unwrap();
        assert!(profile.is_single_set());
        let config = profile.to_synth_config().unwrap();
        assert_eq!(config.acceleration_layers.len(), 1);
        assert_eq!(config.acceleration_layers[0].center_rpm, 2000.0);
    }

    #[test]
    fn turbo_exhaust_routes_to_exhaust_mixer() {
        let profile = get_factory_profile("turbo_exhaust").unwrap();
        assert_eq!(profile.mixer, crate::Mixer::Exhaust);
        assert!(profile.is_single_set());
    }
}
