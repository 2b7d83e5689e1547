//! Profile management commands.
//!
//! Provides commands to list, show and copy engine profiles.

use clap::{Args, Subcommand};
use motor_config::{
    EngineProfile, LayerEntry, ensure_user_profiles_dir, factory_profiles, get_factory_profile,
    list_user_profiles, profile_name_from_path, user_config_dir, user_profiles_dir,
};

use super::common::load_profile;

#[derive(Args)]
pub struct ProfilesArgs {
    #[command(subcommand)]
    command: ProfilesCommand,
}

#[derive(Subcommand)]
enum ProfilesCommand {
    /// List available profiles (factory and user)
    List {
        /// Show only factory profiles
        #[arg(long)]
        factory: bool,

        /// Show only user profiles
        #[arg(long)]
        user: bool,
    },

    /// Show details of a profile
    Show {
        /// Profile name or path
        name: String,

        /// Print the profile as TOML
        #[arg(long)]
        toml: bool,
    },

    /// Copy a factory profile to user profiles for customization
    Copy {
        /// Factory profile name
        source: String,

        /// New profile name (optional, uses source name if not specified)
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite if the profile already exists
        #[arg(long)]
        force: bool,
    },

    /// Show profile directories
    Paths,
}

pub fn run(args: ProfilesArgs) -> anyhow::Result<()> {
    match args.command {
        ProfilesCommand::List { factory, user } => list_profiles(factory, user),
        ProfilesCommand::Show { name, toml } => show_profile(&name, toml),
        ProfilesCommand::Copy {
            source,
            name,
            force,
        } => copy_profile(&source, name.as_deref(), force),
        ProfilesCommand::Paths => show_paths(),
    }
}

fn list_profiles(factory_only: bool, user_only: bool) -> anyhow::Result<()> {
    if !user_only {
        println!("Factory Profiles:");
        println!("=================");
        for profile in factory_profiles() {
            let desc = profile.description.as_deref().unwrap_or("");
            println!("  {:20} - {}", profile.name, desc);
        }
        println!();
    }

    if !factory_only {
        println!("User Profiles:");
        println!("==============");
        let user_profiles = list_user_profiles();
        if user_profiles.is_empty() {
            println!("  (none)");
            println!();
            println!("  Copy a factory profile: motor profiles copy <name>\n");
        } else {
            for path in user_profiles {
                let name = profile_name_from_path(&path).unwrap_or_else(|| "unknown".to_string());
                match EngineProfile::load(&path) {
                    Ok(profile) => {
                        let desc = profile.description.as_deref().unwrap_or("");
                        println!("  {name:20} - {desc}");
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "unreadable profile");
                        println!("  {name:20} - (error loading)");
                    }
                }
            }
        }
        println!();
    }

    Ok(())
}

fn describe_layers(label: &str, entries: &[LayerEntry]) {
    println!("{label} layers ({}):", entries.len());
    for (i, entry) in entries.iter().enumerate() {
        match entry.center_rpm() {
            Some(rpm) => println!("  {}. {:28} @ {rpm:.0} rpm", i + 1, entry.sample),
            None => println!("  {}. {:28} @ (unknown rpm)", i + 1, entry.sample),
        }
    }
}

fn show_profile(name: &str, as_toml: bool) -> anyhow::Result<()> {
    let profile = load_profile(name)?;

    if as_toml {
        print!("{}", profile.to_toml()?);
        return Ok(());
    }

    println!("Profile: {}", profile.name);
    println!("{}", "=".repeat(9 + profile.name.len()));
    println!();

    if let Some(desc) = &profile.description {
        println!("Description: {desc}");
    }
    println!("Mixer:       {}", profile.mixer);
    println!(
        "RPM range:   {:.0} - {:.0} (deviation {:.0})",
        profile.idle_rpm, profile.max_rpm, profile.layers.deviation
    );
    println!();

    describe_layers("Acceleration", &profile.layers.acceleration);
    if profile.is_single_set() {
        println!("Deceleration layers: none (single-set mode)");
    } else {
        describe_layers("Deceleration", &profile.layers.deceleration);
    }
    println!();

    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    println!("Oscillator:  {}", on_off(profile.oscillator.enabled));
    println!(
        "Burble:      {} ({} sample(s), p = {})",
        on_off(profile.burble.enabled),
        profile.burble.samples.len(),
        profile.burble.probability
    );

    Ok(())
}

fn copy_profile(source: &str, new_name: Option<&str>, force: bool) -> anyhow::Result<()> {
    let mut profile = get_factory_profile(source).ok_or_else(|| {
        anyhow::anyhow!(
            "Factory profile '{source}' not found; see 'motor profiles list'"
        )
    })?;

    let file_stem = new_name.unwrap_or(source);
    if let Some(name) = new_name {
        profile.name = name.to_string();
    }

    let dir = ensure_user_profiles_dir()?;
    let path = dir.join(format!("{file_stem}.toml"));
    if path.exists() && !force {
        anyhow::bail!(
            "Profile '{}' already exists. Use --force to overwrite.",
            path.display()
        );
    }

    profile.save(&path)?;
    tracing::info!(source, path = %path.display(), "profile copied");
    println!("Copied '{source}' to {}", path.display());
    Ok(())
}

fn show_paths() -> anyhow::Result<()> {
    println!("Config directory:   {}", user_config_dir().display());
    println!("Profiles directory: {}", user_profiles_dir().display());
    Ok(())
}
