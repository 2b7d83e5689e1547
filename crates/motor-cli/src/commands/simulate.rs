//! Offline simulation command.
//!
//! Runs a driver scenario through a headless synthesizer with a fixed tick
//! and prints what the host channels would receive.

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use motor_core::{BurbleOutcome, BurbleSkip, RecordingChannel, Synthesizer, TickReport};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use super::common::{activate, advance_transients, check_duration, load_profile, tick_seconds};
use crate::scenario::{Driver, Scenario};

const PROGRESS_TEMPLATE: &str = "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})";

#[derive(Args)]
pub struct SimulateArgs {
    /// Profile name or path
    profile: String,

    /// Driving scenario
    #[arg(short, long, value_enum, default_value = "rev")]
    scenario: Scenario,

    /// Simulated seconds
    #[arg(short, long, default_value = "5.0")]
    duration: f32,

    /// Tick interval in milliseconds
    #[arg(long, default_value = "10")]
    tick_ms: f32,

    /// Emit one JSON object per printed tick
    #[arg(long)]
    json: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print every Nth tick
    #[arg(
        long,
        default_value = "10",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    every: u64,

    /// Override the profile's seed
    #[arg(long)]
    seed: Option<u64>,
}

/// One printed tick.
#[derive(Debug, Serialize)]
pub struct SimRow {
    /// Synthesizer clock, seconds.
    pub time: f64,
    /// Current gear of the driver model.
    pub gear: u8,
    /// Clamped RPM.
    pub rpm: f32,
    /// Clamped load.
    pub load: f32,
    /// Blend classification.
    pub accelerating: bool,
    /// Acceleration envelope.
    pub acc_weight: f32,
    /// Deceleration envelope.
    pub dec_weight: f32,
    /// Smoothed base pitch.
    pub pitch: f32,
    /// Oscillator offset.
    pub oscillator: f32,
    /// Low-pass cutoff, Hz.
    pub low_pass: f32,
    /// Distortion amount.
    pub distortion: f32,
    /// Acceleration channel gains.
    pub acc_gains: Vec<f32>,
    /// Deceleration channel gains.
    pub dec_gains: Vec<f32>,
    /// Burble event this tick: the sample fired or why it was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burble: Option<String>,
}

impl SimRow {
    fn new(report: &TickReport, gear: u8, synth: &Synthesizer<RecordingChannel>) -> Self {
        let gains = |channels: &[RecordingChannel]| -> Vec<f32> {
            channels.iter().map(RecordingChannel::gain).collect()
        };
        Self {
            time: report.time,
            gear,
            rpm: report.rpm,
            load: report.load,
            accelerating: report.accelerating,
            acc_weight: report.acc_weight,
            dec_weight: report.dec_weight,
            pitch: report.pitch.smoothed,
            oscillator: report.oscillator_offset,
            low_pass: report.effects.low_pass_cutoff,
            distortion: report.effects.distortion,
            acc_gains: gains(synth.acceleration_channels()),
            dec_gains: gains(synth.deceleration_channels()),
            burble: describe_burble(&report.burble),
        }
    }
}

fn describe_burble(outcome: &BurbleOutcome) -> Option<String> {
    match outcome {
        BurbleOutcome::Idle => None,
        BurbleOutcome::Fired(event) => Some(event.sample.to_string()),
        BurbleOutcome::Skipped(BurbleSkip::Chance) => Some("skipped: chance".to_string()),
        BurbleOutcome::Skipped(BurbleSkip::PoolExhausted) => {
            Some("skipped: pool exhausted".to_string())
        }
    }
}

fn write_header(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        out,
        "{:>7} {:>4} {:>6} {:>5} {:>4} {:>5} {:>5} {:>6} {:>7} {:>7} {:>5}  burble",
        "time", "gear", "rpm", "load", "acc", "E_acc", "E_dec", "pitch", "osc", "lp_hz", "dist"
    )
}

fn write_row(out: &mut dyn Write, row: &SimRow, json: bool) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer(&mut *out, row)?;
        writeln!(out)?;
    } else {
        writeln!(
            out,
            "{:>7.3} {:>4} {:>6.0} {:>5.2} {:>4} {:>5.2} {:>5.2} {:>6.3} {:>+7.4} {:>7.0} {:>5.2}  {}",
            row.time,
            row.gear,
            row.rpm,
            row.load,
            if row.accelerating { "yes" } else { "no" },
            row.acc_weight,
            row.dec_weight,
            row.pitch,
            row.oscillator,
            row.low_pass,
            row.distortion,
            row.burble.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

pub fn run(args: SimulateArgs) -> anyhow::Result<()> {
    let dt = tick_seconds(args.tick_ms)?;
    let duration = check_duration(args.duration)?;
    let profile = load_profile(&args.profile)?;
    let mut synth = activate(&profile, args.seed)?;
    synth.set_engine_on(true);

    let mut driver = Driver::new(args.scenario, profile.idle_rpm, profile.max_rpm, duration);
    let ticks = (duration / dt).ceil() as u64;

    let (mut out, progress): (Box<dyn Write>, Option<ProgressBar>) = match &args.output {
        Some(path) => {
            let file = File::create(path)?;
            let pb = ProgressBar::new(ticks);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(PROGRESS_TEMPLATE)?
                    .progress_chars("##-"),
            );
            (Box::new(BufWriter::new(file)), Some(pb))
        }
        None => (Box::new(std::io::stdout().lock()), None),
    };

    tracing::info!(
        scenario = ?args.scenario,
        ticks,
        tick_ms = args.tick_ms,
        "simulation started"
    );

    if !args.json {
        write_header(&mut out)?;
    }

    let mut fired = 0u32;
    let mut skipped = 0u32;
    let mut peak_audible = 0usize;
    for i in 0..ticks {
        let frame = driver.sample(i as f32 * dt, dt);
        synth.set_rpm(frame.rpm);
        synth.set_load(frame.load);
        if frame.gear_change {
            synth.on_gear_change();
        }

        let report = synth.tick(dt);
        advance_transients(&mut synth, dt);

        match report.burble {
            BurbleOutcome::Fired(_) => fired += 1,
            BurbleOutcome::Skipped(_) => skipped += 1,
            BurbleOutcome::Idle => {}
        }
        peak_audible = peak_audible.max(report.audible_layers);

        if i % args.every == 0 || report.burble != BurbleOutcome::Idle {
            let row = SimRow::new(&report, frame.gear, &synth);
            write_row(&mut out, &row, args.json)?;
        }
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }
    out.flush()?;

    if let Some(pb) = progress {
        pb.finish_with_message("done");
    }

    let channels = synth.deactivate();
    tracing::info!(
        ticks,
        burbles = fired,
        burbles_skipped = skipped,
        peak_audible,
        channels = channels.len(),
        "simulation finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use motor_core::{BurbleEvent, SampleId};

    #[test]
    fn burble_descriptions() {
        assert_eq!(describe_burble(&BurbleOutcome::Idle), None);
        let fired = BurbleOutcome::Fired(BurbleEvent {
            slot: 0,
            sample: SampleId::new("pop.wav"),
            gain: 0.5,
            pitch: 1.0,
        });
        assert_eq!(describe_burble(&fired).as_deref(), Some("pop.wav"));
        assert_eq!(
            describe_burble(&BurbleOutcome::Skipped(BurbleSkip::PoolExhausted)).as_deref(),
            Some("skipped: pool exhausted")
        );
    }

    #[test]
    fn json_row_is_one_line() {
        let profile = load_profile("inline_four").unwrap();
        let mut synth = activate(&profile, None).unwrap();
        synth.set_engine_on(true);
        synth.set_rpm(3000.0);
        let report = synth.tick(0.01);

        let mut buf = Vec::new();
        write_row(&mut buf, &SimRow::new(&report, 1, &synth), true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["rpm"], 3000.0);
        assert_eq!(value["acc_gains"].as_array().unwrap().len(), 5);
        assert!(value.get("burble").is_none());
    }
}
