//! Integration tests for motor-core.
//!
//! Drives a full [`Synthesizer`] over [`RecordingChannel`]s and checks the
//! channel writes: band crossfades at known RPMs, single-set pinning,
//! throttle-release burbles, oscillator behaviour and gain continuity over
//! a full RPM sweep.

use motor_core::{
    AudioLayer, BurbleOutcome, BurbleSkip, MAX_RANDOM_JITTER, PRIORITY_SILENT, PlaybackChannel,
    RecordingChannel, SampleId, SynthConfig, Synthesizer, TickScheduler, recording_factory,
};

const DT: f32 = 0.02;

fn two_layers() -> Vec<AudioLayer> {
    vec![
        AudioLayer::new("acc_1500", 1500.0),
        AudioLayer::new("acc_4000", 4000.0),
    ]
}

fn activate(config: SynthConfig) -> Synthesizer<RecordingChannel> {
    Synthesizer::activate(config, &mut recording_factory(0.3)).unwrap()
}

/// Hold RPM and load for `ticks` ticks; returns the last report.
fn hold(
    synth: &mut Synthesizer<RecordingChannel>,
    rpm: f32,
    load: f32,
    ticks: usize,
) -> motor_core::TickReport {
    synth.set_rpm(rpm);
    synth.set_load(load);
    let mut report = synth.tick(DT);
    for _ in 1..ticks {
        report = synth.tick(DT);
    }
    report
}

fn gains(channels: &[RecordingChannel]) -> Vec<f32> {
    channels.iter().map(RecordingChannel::gain).collect()
}

// ============================================================================
// 1. Band crossfades
// ============================================================================

#[test]
fn scenario_1500_rpm_first_layer_only() {
    let config = SynthConfig::new(
        7000.0,
        800.0,
        two_layers(),
        vec![AudioLayer::new("dec_2500", 2500.0), AudioLayer::new("dec_5000", 5000.0)],
    );
    let volume = config.volume.clone();
    let mut synth = activate(config);
    synth.set_engine_on(true);
    let report = hold(&mut synth, 1500.0, 1.0, 100);

    let acc = synth.acceleration_channels();
    let expected = report.acc_weight
        * volume.acceleration_scale(1500.0, 800.0, 7000.0, false)
        * volume.load_gain(1.0);
    assert!((acc[0].gain() - expected).abs() < 1e-5);
    assert_eq!(acc[1].gain(), 0.0);
    assert!(acc[1].is_muted());
    assert_eq!(acc[1].priority(), PRIORITY_SILENT);
}

#[test]
fn scenario_3200_rpm_ramps() {
    let config = SynthConfig::new(
        7000.0,
        800.0,
        two_layers(),
        vec![AudioLayer::new("dec_2500", 2500.0), AudioLayer::new("dec_5000", 5000.0)],
    );
    let volume = config.volume.clone();
    let mut synth = activate(config);
    synth.set_engine_on(true);
    let report = hold(&mut synth, 3200.0, 1.0, 100);

    let scale = report.acc_weight
        * volume.acceleration_scale(3200.0, 800.0, 7000.0, false)
        * volume.load_gain(1.0);
    let acc = synth.acceleration_channels();
    // layer 1 ramps in over [3000, 4000)
    let upper = acc[1].gain();
    assert!((upper - 0.2 * scale).abs() < 1e-5, "{upper}");
    // layer 0 ramps out over (2500, 5000): its fade ends at the next band's max
    let lower = acc[0].gain();
    assert!((lower - 0.72 * scale).abs() < 1e-5, "{lower}");
}

#[test]
fn center_rpm_is_plateau_and_maximum() {
    let layers = vec![
        AudioLayer::new("a", 1000.0),
        AudioLayer::new("b", 2500.0),
        AudioLayer::new("c", 4000.0),
        AudioLayer::new("d", 5500.0),
    ];
    let mut synth = activate(SynthConfig::new(7000.0, 800.0, layers.clone(), Vec::new()));
    synth.set_engine_on(true);
    for (i, layer) in layers.iter().enumerate() {
        hold(&mut synth, layer.center_rpm, 0.5, 2);
        let g = gains(synth.acceleration_channels());
        let max = g.iter().copied().fold(0.0f32, f32::max);
        assert_eq!(g[i], max, "layer {i} at its center: {g:?}");
    }
}

#[test]
fn gains_are_continuous_over_sweep() {
    let layers = vec![
        AudioLayer::new("a", 1000.0),
        AudioLayer::new("b", 2500.0),
        AudioLayer::new("c", 4000.0),
        AudioLayer::new("d", 6000.0),
    ];
    let mut synth = activate(SynthConfig::new(7000.0, 800.0, layers, Vec::new()));
    synth.set_engine_on(true);
    synth.set_load(0.5);

    let mut previous: Option<Vec<f32>> = None;
    let mut rpm = 0.0;
    while rpm <= 10_000.0 {
        synth.set_rpm(rpm);
        synth.tick(DT);
        let current = gains(synth.acceleration_channels());
        if let Some(prev) = &previous {
            for (a, b) in prev.iter().zip(&current) {
                let jump = (a - b).abs();
                assert!(jump < 0.01, "jump at {rpm}: {prev:?} -> {current:?}");
            }
        }
        previous = Some(current);
        rpm += 2.0;
    }
}

// ============================================================================
// 2. Blend envelopes
// ============================================================================

#[test]
fn single_set_pins_acceleration_envelope() {
    let mut synth = activate(SynthConfig::new(7000.0, 800.0, two_layers(), Vec::new()));
    synth.set_engine_on(true);
    let mut rpm = 6500.0;
    while rpm > 900.0 {
        synth.set_rpm(rpm);
        synth.set_load(0.0);
        let report = synth.tick(DT);
        assert_eq!(report.acc_weight, 1.0);
        assert_eq!(report.dec_weight, 0.0);
        assert_eq!(synth.state().smoothed_acc_weight, 1.0);
        rpm -= 37.0;
    }
}

#[test]
fn lift_off_moves_to_deceleration_set() {
    let config = SynthConfig::new(
        7000.0,
        800.0,
        two_layers(),
        vec![AudioLayer::new("dec_1500", 1500.0), AudioLayer::new("dec_4000", 4000.0)],
    );
    let mut synth = activate(config);
    synth.set_engine_on(true);
    hold(&mut synth, 4000.0, 1.0, 100);
    assert!(synth.deceleration_channels()[1].gain() < 1e-3);

    let report = hold(&mut synth, 4000.0, 0.0, 100);
    assert!(!report.accelerating);
    assert!(report.dec_weight > 0.99);
    assert!(synth.deceleration_channels()[1].gain() > 0.0);
    assert!(synth.acceleration_channels()[1].gain() < 1e-3);
}

// ============================================================================
// 3. Burble
// ============================================================================

fn burble_config(probability: f32, pool: usize) -> SynthConfig {
    let mut config = SynthConfig::new(7000.0, 800.0, two_layers(), Vec::new());
    config.burble.enabled = true;
    config.burble.probability = probability;
    config.burble.pool_size = pool;
    config.burble.samples = vec![SampleId::new("pop_1"), SampleId::new("pop_2")];
    config
}

#[test]
fn throttle_release_starts_burble_same_tick() {
    let mut synth = activate(burble_config(1.0, 2));
    synth.set_engine_on(true);
    hold(&mut synth, 4000.0, 0.9, 10);
    let report = hold(&mut synth, 4000.0, 0.1, 1);
    let event = report.burble.event().expect("burble should fire");
    assert!(synth.transient_channels()[event.slot].is_playing());
    assert_eq!(synth.transient_channels()[event.slot].play_count(), 1);
}

#[test]
fn zero_probability_never_burbles() {
    let mut synth = activate(burble_config(0.0, 2));
    synth.set_engine_on(true);
    for _ in 0..100 {
        hold(&mut synth, 5000.0, 1.0, 1);
        let report = hold(&mut synth, 5000.0, 0.0, 10);
        assert!(report.burble.event().is_none());
    }
    let pool = synth.transient_channels();
    assert!(pool.iter().all(|ch| ch.play_count() == 0));
}

#[test]
fn busy_pool_is_never_restarted() {
    let mut synth = activate(burble_config(1.0, 1));
    synth.set_engine_on(true);
    hold(&mut synth, 5000.0, 1.0, 1);
    assert!(hold(&mut synth, 5000.0, 0.0, 1).burble.event().is_some());

    // slot still busy: the next armed trigger is dropped
    hold(&mut synth, 5000.0, 1.0, 10);
    let report = hold(&mut synth, 5000.0, 0.0, 1);
    let exhausted = BurbleOutcome::Skipped(BurbleSkip::PoolExhausted);
    assert_eq!(report.burble, exhausted);
    assert_eq!(synth.transient_channels()[0].play_count(), 1);

    // host reports the clip finished; the slot is reused
    synth.transient_channels_mut()[0].finish();
    hold(&mut synth, 5000.0, 1.0, 10);
    assert!(hold(&mut synth, 5000.0, 0.0, 1).burble.event().is_some());
    assert_eq!(synth.transient_channels()[0].play_count(), 2);
}

#[test]
fn burbles_keep_firing_after_long_uptime() {
    let mut synth = activate(burble_config(1.0, 8));
    synth.set_engine_on(true);
    synth.set_rpm(5000.0);
    synth.set_load(1.0);
    synth.tick(600_000.0);

    let before = synth.clock();
    for _ in 0..100 {
        synth.tick(0.016);
    }
    let after = synth.clock();
    assert!(after > before + 1.5, "clock stalled at {after}");

    let mut fired = 0;
    for _ in 0..6 {
        hold(&mut synth, 5000.0, 1.0, 5);
        if hold(&mut synth, 5000.0, 0.0, 1).burble.event().is_some() {
            fired += 1;
        }
        hold(&mut synth, 5000.0, 0.0, 4);
    }
    assert_eq!(fired, 6);
}

// ============================================================================
// 4. Pitch oscillator
// ============================================================================

#[test]
fn disabled_oscillator_contributes_nothing() {
    let mut synth = activate(SynthConfig::new(7000.0, 800.0, two_layers(), Vec::new()));
    synth.set_engine_on(true);
    let mut rpm = 1000.0;
    for i in 0..200 {
        if i % 20 == 0 {
            synth.on_gear_change();
        }
        rpm = if i % 2 == 0 { rpm + 400.0 } else { rpm - 150.0 };
        synth.set_rpm(rpm);
        assert_eq!(synth.tick(DT).oscillator_offset, 0.0);
    }
}

#[test]
fn oscillator_decays_at_constant_rpm() {
    let mut config = SynthConfig::new(7000.0, 800.0, two_layers(), Vec::new());
    config.oscillator.enabled = true;
    let mut synth = activate(config);
    synth.set_engine_on(true);
    hold(&mut synth, 3000.0, 0.5, 5);
    synth.on_gear_change();
    let mut last = f32::INFINITY;
    for _ in 0..300 {
        synth.tick(DT);
        let intensity = synth.oscillator().intensity();
        assert!(intensity <= last);
        last = intensity;
    }
    assert!(last < 0.01);
}

// ============================================================================
// 5. Channel pitch
// ============================================================================

#[test]
fn jitter_is_bounded_and_redrawn_each_tick() {
    let mut config = SynthConfig::new(7000.0, 800.0, two_layers(), Vec::new());
    config.pitch.random_jitter = 0.2;
    let mut synth = activate(config);
    synth.set_engine_on(true);
    hold(&mut synth, 3200.0, 0.5, 100);

    let mut written = Vec::new();
    for _ in 0..50 {
        let report = synth.tick(DT);
        assert_eq!(report.audible_layers, 2);
        for channel in synth.acceleration_channels() {
            let offset = channel.pitch_ratio() - report.pitch.acceleration;
            assert!(
                offset.abs() <= MAX_RANDOM_JITTER + 1e-6,
                "jitter {offset} exceeds {MAX_RANDOM_JITTER}"
            );
        }
        written.push(synth.acceleration_channels()[1].pitch_ratio());
    }
    assert!(written.windows(2).any(|w| w[0] != w[1]));
}

#[test]
fn oscillator_offset_adds_to_channel_pitch() {
    let mut config = SynthConfig::new(7000.0, 800.0, two_layers(), Vec::new());
    config.oscillator.enabled = true;
    let mut synth = activate(config);
    synth.set_engine_on(true);
    hold(&mut synth, 3200.0, 0.5, 20);
    synth.on_gear_change();

    let mut moved = false;
    for _ in 0..20 {
        let report = synth.tick(DT);
        assert_eq!(report.audible_layers, 2);
        moved |= report.oscillator_offset != 0.0;
        let expected = report.pitch.acceleration + report.oscillator_offset;
        for channel in synth.acceleration_channels() {
            assert_eq!(channel.pitch_ratio(), expected);
        }
    }
    assert!(moved);
}

#[test]
fn deceleration_channels_drop_curve_base() {
    let config = SynthConfig::new(
        7000.0,
        800.0,
        two_layers(),
        vec![AudioLayer::new("dec_1500", 1500.0), AudioLayer::new("dec_4000", 4000.0)],
    );
    let mut synth = activate(config);
    synth.set_engine_on(true);
    hold(&mut synth, 4000.0, 1.0, 100);
    let report = hold(&mut synth, 4000.0, 0.0, 100);
    assert!(!report.accelerating);

    let channel = &synth.deceleration_channels()[1];
    assert!(channel.gain() > 0.0);
    assert_eq!(channel.pitch_ratio(), report.pitch.deceleration);
    // smoothed + shift (0) + dec_trim (1) - base
    let expected = report.pitch.smoothed + 1.0 - report.pitch.base;
    assert!((channel.pitch_ratio() - expected).abs() < 1e-3);
    let acc_pitch = synth.acceleration_channels()[1].pitch_ratio();
    assert!((channel.pitch_ratio() - acc_pitch).abs() > 0.1);
}

// ============================================================================
// 6. Lifecycle
// ============================================================================

#[test]
fn engine_off_mutes_all_layers() {
    let mut synth = activate(SynthConfig::new(7000.0, 800.0, two_layers(), Vec::new()));
    synth.set_engine_on(true);
    hold(&mut synth, 1500.0, 1.0, 10);
    assert!(synth.acceleration_channels()[0].gain() > 0.0);

    synth.set_engine_on(false);
    let report = synth.tick(DT);
    assert_eq!(report.audible_layers, 0);
    assert!(synth
        .acceleration_channels()
        .iter()
        .all(|ch| ch.gain() == 0.0 && ch.is_muted()));
}

#[test]
fn producer_thread_feeds_ticks() {
    let mut synth = activate(SynthConfig::new(7000.0, 800.0, two_layers(), Vec::new()));
    let inputs = synth.inputs();
    std::thread::spawn(move || {
        inputs.set_engine_on(true);
        inputs.set_rpm(4000.0);
        inputs.set_load(0.75);
    })
    .join()
    .unwrap();

    let mut scheduler = TickScheduler::new(f64::from(DT));
    let mut ticks = 0;
    let mut now = 0.0;
    while ticks < 10 {
        if let Some(dt) = scheduler.poll(now) {
            let report = synth.tick(dt);
            assert_eq!(report.rpm, 4000.0);
            assert_eq!(report.load, 0.75);
            ticks += 1;
        }
        now += 0.005;
    }
    assert!(synth.acceleration_channels()[1].is_playing());
}
