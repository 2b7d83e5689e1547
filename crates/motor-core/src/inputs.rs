//! Control inputs shared with the producer thread.
//!
//! RPM and load are stored as independent atomic `f32` bit patterns. A
//! reader always observes a fully written value for each field, but the
//! pair is not read atomically; each is consumed on its own, so a torn pair
//! is harmless. All accesses use `Relaxed` ordering: there is no data
//! guarded by these values.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Latest RPM, load and engine events written by an upstream source.
#[derive(Debug)]
pub struct ControlInputs {
    rpm: AtomicU32,
    load: AtomicU32,
    engine_on: AtomicBool,
    gear_change: AtomicBool,
}

/// Values read by one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    /// RPM as written.
    pub rpm: f32,
    /// Load as written.
    pub load: f32,
    /// Engine switch.
    pub engine_on: bool,
}

impl ControlInputs {
    /// Zero RPM, zero load, engine off.
    pub fn new() -> Self {
        Self {
            rpm: AtomicU32::new(0.0f32.to_bits()),
            load: AtomicU32::new(0.0f32.to_bits()),
            engine_on: AtomicBool::new(false),
            gear_change: AtomicBool::new(false),
        }
    }

    /// Publish a new RPM.
    pub fn set_rpm(&self, rpm: f32) {
        self.rpm.store(rpm.to_bits(), Ordering::Relaxed);
    }

    /// Publish a new load.
    pub fn set_load(&self, load: f32) {
        self.load.store(load.to_bits(), Ordering::Relaxed);
    }

    /// Switch the engine on or off.
    pub fn set_engine_on(&self, on: bool) {
        self.engine_on.store(on, Ordering::Relaxed);
    }

    /// Queue a gear change for the next tick. Repeated signals before the
    /// tick collapse into one.
    pub fn signal_gear_change(&self) {
        self.gear_change.store(true, Ordering::Relaxed);
    }

    /// Consume a pending gear change.
    pub fn take_gear_change(&self) -> bool {
        self.gear_change.swap(false, Ordering::Relaxed)
    }

    /// Latest RPM.
    pub fn rpm(&self) -> f32 {
        f32::from_bits(self.rpm.load(Ordering::Relaxed))
    }

    /// Latest load.
    pub fn load(&self) -> f32 {
        f32::from_bits(self.load.load(Ordering::Relaxed))
    }

    /// Engine switch.
    pub fn engine_on(&self) -> bool {
        self.engine_on.load(Ordering::Relaxed)
    }

    /// Read everything a tick needs.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            rpm: self.rpm(),
            load: self.load(),
            engine_on: self.engine_on(),
        }
    }
}

impl Default for ControlInputs {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed RPM/load that replaces the live inputs while set.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ManualControl {
    /// Forced RPM.
    pub rpm: f32,
    /// Forced load.
    pub load: f32,
}
