//! Simulation step clocks.
//!
//! Effects never read time on their own. The driver owns a [`Clock`] and
//! hands its `elapsed()` value to every effect it advances during a step.

use std::time::{Duration, Instant};
use tracing::debug;

/// Supplies the elapsed time of the current simulation step.
pub trait Clock {
    /// Seconds elapsed since the previous step.
    fn elapsed(&self) -> f32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn elapsed(&self) -> f32 {
        (**self).elapsed()
    }
}

/// Clock that reports the same delta every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStepClock {
    dt: f32,
}

impl FixedStepClock {
    /// Create a clock with the given step length in seconds.
    #[must_use]
    pub fn new(dt: f32) -> Self {
        Self { dt }
    }

    /// Step length in seconds.
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

impl Default for FixedStepClock {
    fn default() -> Self {
        Self::new(1.0 / 30.0)
    }
}

impl Clock for FixedStepClock {
    fn elapsed(&self) -> f32 {
        self.dt
    }
}

/// Clock whose delta is set explicitly before each step.
///
/// Useful for replaying unevenly spaced steps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    elapsed: f32,
}

impl ManualClock {
    /// Create a clock reporting `elapsed` until changed.
    #[must_use]
    pub fn new(elapsed: f32) -> Self {
        Self { elapsed }
    }

    /// Set the delta reported for the next step.
    pub fn set_elapsed(&mut self, elapsed: f32) {
        self.elapsed = elapsed;
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// Wall-clock driven step clock.
///
/// Call [`FrameClock::sample`] once at the start of each step; `elapsed()`
/// then reports that step's delta until the next sample.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Time of the previous sample
    last_sample: Instant,
    /// Delta measured by the most recent sample
    last_dt: f32,
    /// Maximum delta to prevent spiral of death
    max_dt: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a frame clock starting now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_sample: Instant::now(),
            last_dt: 0.0,
            max_dt: 0.25, // Max 250ms delta
        }
    }

    /// Set the largest delta a single sample may report.
    #[must_use]
    pub fn with_max_dt(mut self, max_dt: f32) -> Self {
        self.max_dt = max_dt.max(0.001);
        self
    }

    /// Measure the time since the previous sample.
    pub fn sample(&mut self) -> f32 {
        let now = Instant::now();
        let dt = self.sample_from(now - self.last_sample);
        self.last_sample = now;
        dt
    }

    fn sample_from(&mut self, delta: Duration) -> f32 {
        let dt = delta.as_secs_f32();
        if dt > self.max_dt {
            debug!(dt, max_dt = self.max_dt, "Clamping frame delta");
        }
        self.last_dt = dt.min(self.max_dt);
        self.last_dt
    }
}

impl Clock for FrameClock {
    fn elapsed(&self) -> f32 {
        self.last_dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_reports_set_value() {
        let mut clock = ManualClock::default();
        assert_eq!(clock.elapsed(), 0.0);

        clock.set_elapsed(1.5);
        assert_eq!(clock.elapsed(), 1.5);
    }

    #[test]
    fn test_clock_by_reference() {
        fn read(clock: impl Clock) -> f32 {
            clock.elapsed()
        }

        let clock = FixedStepClock::new(0.5);
        assert_eq!(read(&clock), 0.5);
    }

    #[test]
    fn test_frame_clock_clamps_spikes() {
        let mut clock = FrameClock::new().with_max_dt(0.1);
        let dt = clock.sample_from(Duration::from_secs(2));
        assert!((dt - 0.1).abs() < 0.0001);
        assert!((clock.elapsed() - 0.1).abs() < 0.0001);

        let dt = clock.sample_from(Duration::from_millis(20));
        assert!((dt - 0.02).abs() < 0.0001);
    }

    #[test]
    fn test_frame_clock_starts_at_zero() {
        let clock = FrameClock::new();
        assert_eq!(clock.elapsed(), 0.0);
    }
}
