//! Real-time simulation command.
//!
//! A producer thread plays the driver and writes RPM, load and gear changes
//! into the shared [`ControlInputs`](motor_core::ControlInputs) at its own
//! cadence, while the main thread ticks the synthesizer on a
//! [`TickScheduler`].

use clap::Args;
use motor_core::{BurbleOutcome, TickScheduler};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use super::common::{activate, advance_transients, check_duration, load_profile, tick_seconds};
use crate::scenario::{Driver, Scenario};

#[derive(Args)]
pub struct LiveArgs {
    /// Profile name or path
    profile: String,

    /// Driving scenario
    #[arg(short, long, value_enum, default_value = "rev")]
    scenario: Scenario,

    /// Tick interval in milliseconds
    #[arg(long, default_value = "10")]
    tick_ms: f32,

    /// Input thread update interval in milliseconds
    #[arg(long, default_value = "25")]
    input_ms: f32,

    /// Stop after this many seconds (runs until Ctrl+C if omitted)
    #[arg(short, long)]
    duration: Option<f32>,

    /// Status line interval in milliseconds
    #[arg(long, default_value = "250")]
    status_ms: f32,
}

pub fn run(args: LiveArgs) -> anyhow::Result<()> {
    let tick = tick_seconds(args.tick_ms)?;
    let input_interval = tick_seconds(args.input_ms)?;
    let status_interval = tick_seconds(args.status_ms)?;
    let duration = args.duration.map(check_duration).transpose()?;

    let profile = load_profile(&args.profile)?;
    let mut synth = activate(&profile, None)?;
    let inputs = synth.inputs();

    println!(
        "Live '{}' ({:?}), tick {} ms, input every {} ms",
        profile.name, args.scenario, args.tick_ms, args.input_ms
    );
    println!("\nPress Ctrl+C to stop...\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let start = Instant::now();

    // Pacing for the driver; open-ended runs loop the scenario every 10 s
    let pacing = duration.unwrap_or(10.0);
    let mut driver = Driver::new(args.scenario, profile.idle_rpm, profile.max_rpm, pacing);
    let producer_running = Arc::clone(&running);
    let producer = thread::spawn(move || {
        inputs.set_engine_on(true);
        let mut last = 0.0f32;
        while producer_running.load(Ordering::SeqCst) {
            let t = start.elapsed().as_secs_f32();
            let frame = driver.sample(t % pacing, t - last);
            last = t;
            inputs.set_rpm(frame.rpm);
            inputs.set_load(frame.load);
            if frame.gear_change {
                inputs.signal_gear_change();
            }
            thread::sleep(Duration::from_secs_f32(input_interval));
        }
        inputs.set_engine_on(false);
        tracing::debug!(scenario = ?driver.scenario(), "input thread stopped");
    });

    let mut scheduler = TickScheduler::new(f64::from(tick));
    let mut ticks = 0u64;
    let mut burbles = 0u32;
    let mut next_status = 0.0f64;
    while running.load(Ordering::SeqCst) {
        let now = start.elapsed().as_secs_f64();
        if duration.is_some_and(|d| now >= f64::from(d)) {
            break;
        }

        let Some(dt) = scheduler.poll(now) else {
            thread::sleep(Duration::from_secs_f64(scheduler.time_until_next(now)));
            continue;
        };

        let report = synth.tick(dt);
        advance_transients(&mut synth, dt);
        ticks += 1;
        if let BurbleOutcome::Fired(event) = &report.burble {
            burbles += 1;
            tracing::info!(sample = %event.sample, gain = event.gain, "burble");
        }

        if report.time >= next_status {
            next_status = report.time + f64::from(status_interval);
            println!(
                "t={:>7.2}s rpm={:>6.0} load={:.2} {} pitch={:.3} layers={}",
                report.time,
                report.rpm,
                report.load,
                if report.accelerating { "ACC" } else { "DEC" },
                report.pitch.smoothed,
                report.audible_layers
            );
        }
    }

    running.store(false, Ordering::SeqCst);
    if producer.join().is_err() {
        tracing::warn!("input thread panicked");
    }

    let channels = synth.deactivate();
    let released = channels.len();
    println!();
    println!("Stopped after {ticks} ticks; released {released} channels");
    tracing::info!(ticks, burbles, "live run finished");
    Ok(())
}
