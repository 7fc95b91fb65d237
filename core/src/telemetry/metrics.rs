use serde::Serialize;
use std::sync::Mutex;

/// Counters shared between the sweep worker and whoever observes it.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub frames: u64,
    pub transient_reads: u64,
    pub sweep_resets: u64,
    pub sweeps_published: u64,
    pub sweeps_throttled: u64,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_frame(&self) {
        self.update(|m| m.frames += 1);
    }

    pub fn record_transient(&self) {
        self.update(|m| m.transient_reads += 1);
    }

    pub fn record_resets(&self, total: u64) {
        self.update(|m| m.sweep_resets = total);
    }

    pub fn record_published(&self) {
        self.update(|m| m.sweeps_published += 1);
    }

    pub fn record_throttled(&self) {
        self.update(|m| m.sweeps_throttled += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
