//! Circular-buffer average velocity with staleness reset.
//!
//! A fixed-size ring avoids per-event allocation on the scroll hot path;
//! staleness detection prevents a paused-then-resumed gesture from
//! reporting a huge synthetic velocity.

/// Gap, in milliseconds, after which a tracker resets rather than folding
/// the sample into its window.
pub const STALE_GAP_MS: f64 = 100.0;
/// Samples required since the last reset before [`VelocityTracker::is_reliable`].
pub const MIN_RELIABLE_SAMPLES: usize = 3;
/// Ring buffer capacity.
pub const VELOCITY_SAMPLE_COUNT: usize = 8;

#[derive(Clone, Copy, Debug, Default)]
struct Sample {
    position: f64,
    time_ms: f64,
}

/// Tracks scroll velocity over a short rolling window.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    buf: [Sample; VELOCITY_SAMPLE_COUNT],
    next_slot: usize,
    sample_count: usize,
    last_time_ms: Option<f64>,
    velocity: f64,
}

impl Default for VelocityTracker {
    fn default() -> Self {
        VelocityTracker {
            buf: [Sample::default(); VELOCITY_SAMPLE_COUNT],
            next_slot: 0,
            sample_count: 0,
            last_time_ms: None,
            velocity: 0.0,
        }
    }
}

impl VelocityTracker {
    /// Fresh, empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new `(position, time_ms)` sample.
    pub fn update(&mut self, position: f64, time_ms: f64) {
        if let Some(last) = self.last_time_ms {
            let dt = time_ms - last;
            if dt == 0.0 {
                return;
            }
            if dt > STALE_GAP_MS {
                self.reset_to(position, time_ms);
                return;
            }
        }
        self.buf[self.next_slot] = Sample {
            position,
            time_ms,
        };
        self.next_slot = (self.next_slot + 1) % VELOCITY_SAMPLE_COUNT;
        self.sample_count = (self.sample_count + 1).min(VELOCITY_SAMPLE_COUNT);
        self.last_time_ms = Some(time_ms);

        if self.sample_count >= 2 {
            let oldest = self.oldest_sample();
            let dt = time_ms - oldest.time_ms;
            self.velocity = if dt != 0.0 {
                (position - oldest.position) / dt
            } else {
                0.0
            };
        }
    }

    /// Reset the window to a single baseline sample (used after a stale gap).
    pub fn reset_to(&mut self, position: f64, time_ms: f64) {
        self.buf = [Sample::default(); VELOCITY_SAMPLE_COUNT];
        self.next_slot = 0;
        self.buf[0] = Sample {
            position,
            time_ms,
        };
        self.next_slot = 1 % VELOCITY_SAMPLE_COUNT;
        self.sample_count = 1;
        self.last_time_ms = Some(time_ms);
        self.velocity = 0.0;
    }

    /// Oldest sample still in the window.
    fn oldest_sample(&self) -> Sample {
        if self.sample_count < VELOCITY_SAMPLE_COUNT {
            self.buf[0]
        } else {
            self.buf[self.next_slot]
        }
    }

    /// Absolute velocity in units/ms.
    pub fn get_velocity(&self) -> f64 {
        self.velocity.abs()
    }

    /// `true` once at least [`MIN_RELIABLE_SAMPLES`] samples have
    /// accumulated since the last reset.
    pub fn is_reliable(&self) -> bool {
        self.sample_count >= MIN_RELIABLE_SAMPLES
    }

    /// `true` while the tracker has any samples (used by
    /// `ScrollController::is_tracking`).
    pub fn is_tracking(&self) -> bool {
        self.sample_count > 0
    }

    /// Clear the window entirely (used when the idle timer fires).
    pub fn reset(&mut self) {
        *self = VelocityTracker::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn e6_idle_then_resume_resets_velocity() {
        let mut v = VelocityTracker::new();
        v.update(0.0, 0.0);
        v.update(16.0, 16.0);
        v.update(32.0, 32.0);
        v.update(48.0, 48.0);
        assert!(v.is_reliable());
        assert!(v.get_velocity() > 0.0);

        // Pause > STALE_GAP_MS, then a single sample.
        v.update(50.0, 248.0);
        assert_eq!(v.get_velocity(), 0.0);
        assert!(!v.is_reliable());

        v.update(66.0, 264.0);
        v.update(82.0, 280.0);
        assert!(!v.is_reliable());
        v.update(98.0, 296.0);
        assert!(v.is_reliable());
    }

    #[test]
    fn zero_dt_sample_is_ignored() {
        let mut v = VelocityTracker::new();
        v.update(0.0, 0.0);
        v.update(0.0, 0.0);
        assert_eq!(v.sample_count, 1);
    }

    #[test]
    fn fresh_tracker_is_not_tracking() {
        let v = VelocityTracker::new();
        assert!(!v.is_tracking());
        assert_eq!(v.get_velocity(), 0.0);
    }

    #[test]
    fn velocity_reports_absolute_value() {
        let mut v = VelocityTracker::new();
        v.update(100.0, 0.0);
        v.update(50.0, 10.0);
        assert_eq!(v.get_velocity(), 5.0);
    }
}
