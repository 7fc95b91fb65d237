use std::time::{Duration, Instant};

/// Publish/drop decision for a completed sweep.
pub fn should_publish(now: Instant, last_publish: Option<Instant>, interval: Duration) -> bool {
    match last_publish {
        Some(last) => last
            .checked_add(interval)
            .map_or(false, |deadline| now >= deadline),
        None => true,
    }
}

/// Keeps completed sweeps at least `interval` apart.
#[derive(Debug, Clone)]
pub struct ThrottleGate {
    interval: Duration,
    last_publish: Option<Instant>,
}

impl ThrottleGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_publish: None,
        }
    }

    /// Builds a gate from an interval in seconds. Negative or NaN values disable
    /// it; values too large for a `Duration` saturate.
    pub fn from_secs_f64(interval: f64) -> Self {
        let interval = if interval.is_nan() || interval <= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(interval).unwrap_or(Duration::MAX)
        };
        Self::new(interval)
    }

    /// Returns whether a sweep completed at `now` may be published, recording it if so.
    pub fn admit(&mut self, now: Instant) -> bool {
        if !should_publish(now, self.last_publish, self.interval) {
            return false;
        }
        self.last_publish = Some(now);
        true
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_publish(&self) -> Option<Instant> {
        self.last_publish
    }
}
