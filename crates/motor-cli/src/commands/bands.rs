//! Band table printing.

use clap::Args;
use motor_core::{AudioLayer, LayerTable};

use super::common::load_profile;

#[derive(Args)]
pub struct BandsArgs {
    /// Profile name or path
    profile: String,
}

pub fn run(args: BandsArgs) -> anyhow::Result<()> {
    let profile = load_profile(&args.profile)?;
    let config = profile.to_synth_config()?;

    println!("Profile: {}", profile.name);
    println!(
        "Deviation {:.0} rpm, range divider {}, theoretical max {:.0} rpm",
        config.rpm_deviation, config.range_divider, config.max_theoretical_rpm
    );
    println!();

    print_table(
        "Acceleration",
        &config.acceleration_layers,
        config.rpm_deviation,
        config.max_theoretical_rpm,
    );
    if config.is_single_set() {
        println!("Deceleration: none (single-set mode)");
    } else {
        print_table(
            "Deceleration",
            &config.deceleration_layers,
            config.rpm_deviation,
            config.max_theoretical_rpm,
        );
    }

    Ok(())
}

fn print_table(label: &str, layers: &[AudioLayer], deviation: f32, max_theoretical: f32) {
    let table = LayerTable::build(layers, deviation, max_theoretical);

    println!("{label}:");
    println!(
        "  {:>3}  {:28} {:>8} {:>8} {:>8} {:>8}",
        "#", "sample", "min", "normal", "max", "upper"
    );
    for (i, (layer, band)) in layers.iter().zip(table.bands()).enumerate() {
        let upper = table.upper_bound(i).unwrap_or(max_theoretical);
        println!(
            "  {i:>3}  {:28} {:>8.0} {:>8.0} {:>8.0} {:>8.0}",
            layer.sample.as_str(),
            band.min,
            band.normal,
            band.max,
            upper
        );
    }
    println!();
}
