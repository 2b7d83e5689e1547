//! Offline profile validation.
//!
//! Activation only refuses profiles the synthesizer cannot run at all (no
//! acceleration layers, an inverted RPM range). Layouts that run but sound
//! wrong, such as gaps between bands or unsorted layers, are caught here
//! and reported with a [`Severity`].
//!
//! # Example
//!
//! ```rust
//! use motor_config::{validate_profile, factory_profiles::get_factory_profile};
//!
//! let profile = get_factory_profile("inline_four").expect("factory profile");
//! let report = validate_profile(&profile);
//! assert!(!report.has_errors());
//! ```

use std::fmt;
use thiserror::Error;

use motor_core::{AudioLayer, LayerTable, MAX_RANDOM_JITTER};

use crate::curve_config::CurveConfig;
use crate::profile::{EngineProfile, LayerEntry};

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// The profile runs but probably not as intended.
    Warning,
    /// The profile cannot be activated.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// One finding.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// How serious it is.
    pub severity: Severity,
    /// Dotted path of the offending key, e.g. `layers.acceleration[2]`.
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    fn new(severity: Severity, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.field, self.message)
    }
}

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// One or more error-severity issues.
    #[error("{} error(s): {}", .0.len(), .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Failed(Vec<ValidationIssue>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// All issues found in one profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn push(&mut self, severity: Severity, field: impl Into<String>, message: impl Into<String>) {
        self.issues
            .push(ValidationIssue::new(severity, field, message));
    }

    fn warn(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, field, message);
    }

    fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, field, message);
    }

    /// All issues in discovery order.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Error-severity issues.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    /// Warning-severity issues.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    /// Whether any issue is an error.
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Whether nothing at all was found.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// `Ok` with the report when there are no errors; warnings pass.
    pub fn into_result(self) -> ValidationResult<Self> {
        if self.has_errors() {
            Err(ValidationError::Failed(self.errors().cloned().collect()))
        } else {
            Ok(self)
        }
    }
}

/// Run every offline check against `profile`.
pub fn validate_profile(profile: &EngineProfile) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_rpm_range(profile, &mut report);
    check_layers(profile, &mut report);
    check_curves(profile, &mut report);
    check_ranges(profile, &mut report);
    check_burble(profile, &mut report);

    report
}

/// Validate and fail on errors.
pub fn validate_profile_strict(profile: &EngineProfile) -> ValidationResult<ValidationReport> {
    validate_profile(profile).into_result()
}

fn check_rpm_range(profile: &EngineProfile, report: &mut ValidationReport) {
    let (idle, max) = (profile.idle_rpm, profile.max_rpm);
    if !idle.is_finite() || !max.is_finite() || idle < 0.0 || idle >= max {
        report.error(
            "idle_rpm",
            format!("idle rpm {idle} must be in [0, max rpm {max})"),
        );
    }
    if profile.layers.max_theoretical_rpm < max {
        report.warn(
            "layers.max_theoretical_rpm",
            format!(
                "{} is below max rpm {max}; inputs above it are clamped",
                profile.layers.max_theoretical_rpm
            ),
        );
    }
    if profile.layers.range_divider <= 0.0 {
        report.warn("layers.range_divider", "must be positive; treated as 1");
    }
}

fn check_layers(profile: &EngineProfile, report: &mut ValidationReport) {
    if profile.layers.acceleration.is_empty() {
        report.error(
            "layers.acceleration",
            "at least one acceleration layer is required",
        );
    }
    if profile.layers.deviation <= 0.0 {
        report.warn(
            "layers.deviation",
            "non-positive deviation gives every band zero-width ramps",
        );
    }

    let sets = [
        ("layers.acceleration", &profile.layers.acceleration),
        ("layers.deceleration", &profile.layers.deceleration),
    ];
    for (field, entries) in sets {
        check_layer_set(field, entries, profile, report);
    }
}

fn check_layer_set(
    field: &str,
    entries: &[LayerEntry],
    profile: &EngineProfile,
    report: &mut ValidationReport,
) {
    let mut layers = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        match entry.center_rpm() {
            Some(rpm) => layers.push(AudioLayer::new(entry.sample.as_str(), rpm)),
            None => report.error(
                format!("{field}[{i}]"),
                format!(
                    "no center rpm for '{}'; set center_rpm or end the name in _<rpm>",
                    entry.sample
                ),
            ),
        }
    }
    // Band checks need every center; the errors above already block activation.
    if layers.len() != entries.len() || layers.len() < 2 {
        return;
    }

    for (i, pair) in layers.windows(2).enumerate() {
        if pair[1].center_rpm <= pair[0].center_rpm {
            report.warn(
                format!("{field}[{}]", i + 1),
                format!(
                    "center rpm {} is not above the previous layer's {}",
                    pair[1].center_rpm, pair[0].center_rpm
                ),
            );
        }
    }

    let table = LayerTable::build(
        &layers,
        profile.layers.deviation,
        profile.layers.max_theoretical_rpm,
    );
    let bands = table.bands();
    for (i, pair) in bands.windows(2).enumerate() {
        if pair[0].max <= pair[1].min {
            report.warn(
                format!("{field}[{i}]"),
                format!(
                    "gap between {} and {} rpm: only the lower layer's fade-out covers it",
                    pair[0].max, pair[1].min
                ),
            );
        }
    }
    for (i, band) in bands.iter().enumerate() {
        if i > 0 && band.normal - band.min <= 0.0 {
            report.warn(format!("{field}[{i}]"), "zero-width ramp-in");
        }
        if table.upper_bound(i).is_some_and(|upper| upper - band.max <= 0.0) {
            report.warn(format!("{field}[{i}]"), "zero-width ramp-out");
        }
    }
}

fn check_curve(field: &str, curve: &CurveConfig, report: &mut ValidationReport) {
    if let Err(err) = curve.to_curve() {
        report.error(field, err.to_string());
        return;
    }
    if !curve.is_sorted() {
        report.warn(field, "points are out of x order; they will be sorted");
    }
}

fn check_curves(profile: &EngineProfile, report: &mut ValidationReport) {
    let curves = [
        ("volume.single_layer_curve", &profile.volume.single_layer_curve),
        ("pitch.curve", &profile.pitch.curve),
        ("effects.low_pass_curve", &profile.effects.low_pass_curve),
        ("effects.distortion_curve", &profile.effects.distortion_curve),
    ];
    for (field, curve) in curves {
        check_curve(field, curve, report);
    }
}

fn check_unit(field: &str, value: f32, report: &mut ValidationReport) {
    if !(0.0..=1.0).contains(&value) {
        report.warn(field, format!("{value} is outside [0, 1]"));
    }
}

fn check_ranges(profile: &EngineProfile, report: &mut ValidationReport) {
    let units = [
        ("volume.load_volume_influence", profile.volume.load_volume_influence),
        ("volume.min_load_volume", profile.volume.min_load_volume),
        ("effects.muffling_intensity", profile.effects.muffling_intensity),
        ("blend.load_threshold", profile.blend.load_threshold),
    ];
    for (field, value) in units {
        check_unit(field, value, report);
    }

    let jitter = profile.pitch.random_jitter;
    if !(0.0..=MAX_RANDOM_JITTER).contains(&jitter) {
        report.warn(
            "pitch.random_jitter",
            format!("{jitter} is outside [0, {MAX_RANDOM_JITTER}]; clamped"),
        );
    }

    let osc = &profile.oscillator;
    if osc.enabled && osc.min_frequency > osc.max_frequency {
        report.warn(
            "oscillator.min_frequency",
            format!(
                "{} is above max_frequency {}",
                osc.min_frequency, osc.max_frequency
            ),
        );
    }
}

fn check_burble(profile: &EngineProfile, report: &mut ValidationReport) {
    let burble = &profile.burble;
    check_unit("burble.probability", burble.probability, report);
    if !burble.enabled {
        return;
    }
    if burble.samples.is_empty() {
        report.warn("burble.samples", "burble is enabled but has no samples");
    }
    if burble.pool_size == 0 {
        report.warn("burble.pool_size", "burble is enabled with an empty pool");
    }
}
