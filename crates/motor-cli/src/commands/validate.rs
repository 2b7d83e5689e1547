//! Offline profile validation command.

use clap::Args;
use motor_config::{Severity, factory_profile_names, validate_profile};

use super::common::load_profile;

#[derive(Args)]
pub struct ValidateArgs {
    /// Profile name or path (omit with --factory)
    #[arg(required_unless_present = "factory")]
    profile: Option<String>,

    /// Validate every factory profile
    #[arg(long, conflicts_with = "profile")]
    factory: bool,

    /// Treat warnings as errors
    #[arg(long)]
    strict: bool,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let names: Vec<String> = match args.profile {
        Some(name) => vec![name],
        None => factory_profile_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    };

    let mut failed = 0;
    for name in &names {
        let profile = load_profile(name)?;
        let report = validate_profile(&profile);

        if report.is_clean() {
            println!("{}: ok", profile.name);
            continue;
        }

        println!("{}:", profile.name);
        for issue in report.issues() {
            println!("  {issue}");
        }

        let errors = report.errors().count();
        let warnings = report.warnings().count();
        tracing::info!(profile = %profile.name, errors, warnings, "validated");
        if report.has_errors() || (args.strict && warnings > 0) {
            failed += 1;
        }
    }

    if failed > 0 {
        let severity = if args.strict {
            Severity::Warning
        } else {
            Severity::Error
        };
        anyhow::bail!("{failed} profile(s) failed at threshold {severity}");
    }
    Ok(())
}
