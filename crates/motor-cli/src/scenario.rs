//! Driver models that generate RPM and load over time.
//!
//! Each scenario is a small deterministic state machine advanced once per
//! input sample. `Pull` shifts through five gears; `Idle` and `Sweep` carry
//! no throttle signal and derive load from the RPM trend with [`AutoLoad`].

use clap::ValueEnum;
use std::f32::consts::TAU;

use motor_core::{SmoothedValue, clamp01, lerp, smoothing_coeff};

/// Highest gear `Pull` shifts into.
const TOP_GEAR: u8 = 5;
/// Seconds the throttle is lifted during a shift.
const SHIFT_SECONDS: f32 = 0.2;
/// RPM kept across an upshift.
const SHIFT_RPM_RATIO: f32 = 0.68;

/// Driving pattern fed to the synthesizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Engine idling with slight hunting.
    Idle,
    /// Repeated throttle blips in neutral.
    Rev,
    /// Full-throttle run through the gears.
    Pull,
    /// Accelerate, then lift off and coast down.
    LiftOff,
    /// Linear RPM sweep from idle to redline.
    Sweep,
}

/// Inputs for one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverFrame {
    /// Engine RPM.
    pub rpm: f32,
    /// Throttle load, 0..1.
    pub load: f32,
    /// A gear change happened since the previous frame.
    pub gear_change: bool,
    /// Current gear (1 outside `Pull`).
    pub gear: u8,
}

/// Estimates load from how fast RPM rises.
#[derive(Debug, Clone)]
pub struct AutoLoad {
    last_rpm: Option<f32>,
    load: SmoothedValue,
    full_load_slope: f32,
}

impl AutoLoad {
    /// `full_load_slope` is the RPM/s rise that reads as full load.
    pub fn new(full_load_slope: f32) -> Self {
        Self {
            last_rpm: None,
            load: SmoothedValue::new(0.0, 8.0),
            full_load_slope,
        }
    }

    /// Feed one RPM sample taken `dt` seconds after the previous one.
    pub fn update(&mut self, rpm: f32, dt: f32) -> f32 {
        let target = match self.last_rpm {
            Some(last) if dt > 0.0 && self.full_load_slope > 0.0 => {
                clamp01((rpm - last) / dt / self.full_load_slope)
            }
            _ => 0.0,
        };
        self.last_rpm = Some(rpm);
        self.load.advance_toward(target, dt)
    }
}

/// Deterministic driver for one scenario.
#[derive(Debug, Clone)]
pub struct Driver {
    scenario: Scenario,
    idle_rpm: f32,
    max_rpm: f32,
    duration: f32,
    rpm: f32,
    throttle: SmoothedValue,
    auto_load: AutoLoad,
    gear: u8,
    shift_timer: f32,
    shift_target: f32,
}

impl Driver {
    /// Driver for an engine idling at `idle_rpm` with redline `max_rpm`.
    ///
    /// `duration` sets the pacing of `LiftOff` and `Sweep`.
    pub fn new(scenario: Scenario, idle_rpm: f32, max_rpm: f32, duration: f32) -> Self {
        Self {
            scenario,
            idle_rpm,
            max_rpm,
            duration: duration.max(f32::EPSILON),
            rpm: idle_rpm,
            throttle: SmoothedValue::new(0.0, 12.0),
            auto_load: AutoLoad::new(1500.0),
            gear: 1,
            shift_timer: 0.0,
            shift_target: idle_rpm,
        }
    }

    /// The scenario being driven.
    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// Advance to time `t`, `dt` seconds after the previous call.
    pub fn sample(&mut self, t: f32, dt: f32) -> DriverFrame {
        let mut gear_change = false;
        let load = match self.scenario {
            Scenario::Idle => {
                self.rpm = self.idle_rpm + 15.0 * (TAU * 0.7 * t).sin();
                self.auto_load.update(self.rpm, dt)
            }
            Scenario::Rev => {
                let pedal = if t % 2.0 < 0.6 { 1.0 } else { 0.0 };
                let throttle = self.throttle.advance_toward(pedal, dt);
                let target = lerp(self.idle_rpm, self.max_rpm * 0.9, throttle);
                let rate = if target > self.rpm { 4.0 } else { 1.8 };
                self.approach(target, rate, dt);
                throttle
            }
            Scenario::Pull => self.pull(dt, &mut gear_change),
            Scenario::LiftOff => {
                if t < self.duration * 0.4 {
                    self.approach(self.max_rpm * 0.85, 1.5, dt);
                    1.0
                } else {
                    self.approach(self.idle_rpm, 0.8, dt);
                    0.0
                }
            }
            Scenario::Sweep => {
                self.rpm = lerp(self.idle_rpm, self.max_rpm, t / self.duration);
                self.auto_load.update(self.rpm, dt)
            }
        };

        DriverFrame {
            rpm: self.rpm,
            load,
            gear_change,
            gear: self.gear,
        }
    }

    fn approach(&mut self, target: f32, rate: f32, dt: f32) {
        self.rpm += (target - self.rpm) * smoothing_coeff(dt, rate);
    }

    fn pull(&mut self, dt: f32, gear_change: &mut bool) -> f32 {
        if self.shift_timer > 0.0 {
            self.shift_timer -= dt;
            self.approach(self.shift_target, 15.0, dt);
            return 0.0;
        }

        let acceleration = 2400.0 / f32::from(self.gear);
        self.rpm = (self.rpm + acceleration * dt).min(self.max_rpm * 0.97);
        if self.rpm >= self.max_rpm * 0.95 && self.gear < TOP_GEAR {
            self.gear += 1;
            self.shift_timer = SHIFT_SECONDS;
            self.shift_target = self.rpm * SHIFT_RPM_RATIO;
            *gear_change = true;
            tracing::debug!(gear = self.gear, rpm = self.rpm, "driver upshift");
        }
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.01;

    fn drive(scenario: Scenario, seconds: f32) -> Vec<DriverFrame> {
        let mut driver = Driver::new(scenario, 800.0, 7000.0, seconds);
        let steps = (seconds / DT) as usize;
        (0..steps)
            .map(|i| driver.sample(i as f32 * DT, DT))
            .collect()
    }

    #[test]
    fn idle_stays_near_idle() {
        for frame in drive(Scenario::Idle, 3.0) {
            assert!((frame.rpm - 800.0).abs() <= 15.0 + 1e-3);
            assert!(frame.load <= 1.0);
        }
    }

    #[test]
    fn sweep_reaches_redline() {
        let frames = drive(Scenario::Sweep, 4.0);
        let last = frames.last().unwrap();
        assert!(last.rpm > 6900.0);
        // 6200 rpm over 4 s is about one full-load slope
        assert!(last.load > 0.9);
    }

    #[test]
    fn pull_shifts_through_gears() {
        let frames = drive(Scenario::Pull, 30.0);
        let shifts = frames.iter().filter(|f| f.gear_change).count();
        assert_eq!(shifts, usize::from(TOP_GEAR - 1));
        assert_eq!(frames.last().unwrap().gear, TOP_GEAR);
        assert!(frames.iter().all(|f| f.rpm <= 7000.0 * 0.97 + 1e-3));
    }

    #[test]
    fn shift_drops_rpm_and_lifts_throttle() {
        let frames = drive(Scenario::Pull, 10.0);
        let i = frames.iter().position(|f| f.gear_change).unwrap();
        assert_eq!(frames[i + 1].load, 0.0);
        assert!(frames[i + 10].rpm < frames[i].rpm);
    }

    #[test]
    fn lift_off_drops_load_and_rpm() {
        let frames = drive(Scenario::LiftOff, 5.0);
        let cut = (5.0 * 0.4 / DT) as usize;
        assert_eq!(frames[cut - 1].load, 1.0);
        assert_eq!(frames[cut + 1].load, 0.0);
        assert!(frames.last().unwrap().rpm < frames[cut].rpm);
    }

    #[test]
    fn rev_blips_throttle() {
        let frames = drive(Scenario::Rev, 4.0);
        let peak = frames.iter().map(|f| f.rpm).fold(0.0f32, f32::max);
        assert!(peak > 3000.0);
        assert!(frames.iter().any(|f| f.load < 0.05));
    }

    #[test]
    fn auto_load_reads_rising_rpm() {
        let mut auto = AutoLoad::new(1000.0);
        let mut load = 0.0;
        for i in 0..200 {
            load = auto.update(1000.0 + 10.0 * i as f32, DT);
        }
        assert!(load > 0.95);
        for _ in 0..200 {
            load = auto.update(3000.0, DT);
        }
        assert!(load < 0.05);
    }
}
