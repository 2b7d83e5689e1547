//! Fixed-interval control-rate scheduling.
//!
//! The host calls [`TickScheduler::poll`] with its own clock (seconds, any
//! epoch). Once at least one interval has elapsed since the last tick it
//! returns the real elapsed time, which the synthesizer uses as `dt` so all
//! smoothing stays tick-rate independent even when the host is late.

/// Decides when the next synthesis tick is due.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickScheduler {
    interval: f64,
    last_tick: Option<f64>,
}

impl TickScheduler {
    /// Schedule ticks every `interval` seconds. A non-positive interval
    /// ticks on every poll.
    pub fn new(interval: f64) -> Self {
        Self {
            interval: interval.max(0.0),
            last_tick: None,
        }
    }

    /// Configured interval in seconds.
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Returns the elapsed seconds if a tick is due at `now`.
    ///
    /// The first poll only starts the clock and returns `None`. A clock
    /// that runs backwards restarts it.
    pub fn poll(&mut self, now: f64) -> Option<f32> {
        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return None;
        };
        let elapsed = now - last;
        if elapsed < 0.0 {
            self.last_tick = Some(now);
            return None;
        }
        if elapsed >= self.interval && elapsed > 0.0 {
            self.last_tick = Some(now);
            Some(elapsed as f32)
        } else {
            None
        }
    }

    /// Seconds until the next tick is due at `now`; 0 if overdue.
    pub fn time_until_next(&self, now: f64) -> f64 {
        match self.last_tick {
            Some(last) => (last + self.interval - now).max(0.0),
            None => 0.0,
        }
    }

    /// Forget the last tick.
    pub fn reset(&mut self) {
        self.last_tick = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_poll_starts_clock() {
        let mut sched = TickScheduler::new(0.02);
        assert_eq!(sched.poll(10.0), None);
        assert_eq!(sched.poll(10.01), None);
        let dt = sched.poll(10.025).unwrap();
        assert!((dt - 0.025).abs() < 1e-6);
    }

    #[test]
    fn late_poll_reports_real_elapsed() {
        let mut sched = TickScheduler::new(0.02);
        sched.poll(0.0);
        let dt = sched.poll(0.5).unwrap();
        assert!((dt - 0.5).abs() < 1e-6);
        assert!((sched.time_until_next(0.51) - 0.01).abs() < 1e-9);
    }

    #[test]
    fn backwards_clock_restarts() {
        let mut sched = TickScheduler::new(0.02);
        sched.poll(5.0);
        assert_eq!(sched.poll(1.0), None);
        assert!(sched.poll(1.03).is_some());
    }
}
