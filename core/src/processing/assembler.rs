use crate::math::bins::bin_centers;
use crate::math::stats::StatsHelper;
use crate::params::derive::DerivedParams;
use crate::processing::throttle::ThrottleGate;
use crate::protocol::segment::Segment;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Accumulated `(frequency_hz, power_dbm)` pairs of the sweep in progress.
#[derive(Debug, Clone, Default)]
pub struct SweepBuffer {
    points: Vec<(f64, f32)>,
}

impl SweepBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[(f64, f32)] {
        &self.points
    }

    fn extend(&mut self, segment: &Segment, lnb_lo: i64) {
        let Some(step_hz) = segment.step_hz() else {
            return;
        };
        let centers = bin_centers(segment.low_edge_hz, lnb_lo, step_hz, segment.sample_count());
        self.points
            .extend(centers.zip(segment.samples.iter().copied()));
    }

    fn sort(&mut self) {
        self.points.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
}

/// A full pass over the configured range, ordered by frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedSweep {
    /// 1-based count of sweeps published in this session.
    pub sequence: u64,
    /// Hz, ascending.
    pub frequencies: Vec<f64>,
    /// dBm, parallel to `frequencies`.
    pub powers: Vec<f32>,
}

impl CompletedSweep {
    fn from_points(sequence: u64, points: &[(f64, f32)]) -> Self {
        let (frequencies, powers) = points.iter().copied().unzip();
        Self {
            sequence,
            frequencies,
            powers,
        }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Frequency and power of the strongest bin.
    pub fn peak(&self) -> Option<(f64, f32)> {
        StatsHelper::peak(&self.powers).map(|(idx, power)| (self.frequencies[idx], power))
    }

    pub fn mean_power(&self) -> f32 {
        StatsHelper::mean(&self.powers)
    }
}

/// What happened to the sweep after folding in one segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Assembly {
    Accumulating,
    Complete(CompletedSweep),
    /// The sweep finished too soon after the previous publication and was dropped.
    Throttled,
}

/// Folds decoded segments into whole sweeps.
///
/// A segment starting at or below the configured start opens a new buffer,
/// discarding whatever a previous, unfinished pass left behind. A segment
/// reaching the configured stop completes the sweep. The buffer is left as is
/// on completion, so a throttled sweep's points linger until the next reset.
pub struct SweepAssembler {
    buffer: SweepBuffer,
    throttle: ThrottleGate,
    /// Configured range in the receiver's domain, MHz.
    start_mhz: f64,
    stop_mhz: f64,
    lnb_lo: i64,
    published: u64,
    resets: u64,
}

impl SweepAssembler {
    pub fn new(params: &DerivedParams, lnb_lo: i64, throttle: ThrottleGate) -> Self {
        let lo_mhz = lnb_lo as f64 / 1e6;
        Self {
            buffer: SweepBuffer::new(),
            throttle,
            start_mhz: params.start_freq as f64 - lo_mhz,
            stop_mhz: params.stop_freq as f64 - lo_mhz,
            lnb_lo,
            published: 0,
            resets: 0,
        }
    }

    pub fn ingest(&mut self, segment: &Segment, now: Instant) -> Assembly {
        if (segment.low_edge_hz / 1_000_000) as f64 <= self.start_mhz {
            self.buffer = SweepBuffer::new();
            self.resets += 1;
        }

        self.buffer.extend(segment, self.lnb_lo);

        if (segment.high_edge_hz as f64 / 1e6) < self.stop_mhz {
            return Assembly::Accumulating;
        }

        if !self.throttle.admit(now) {
            return Assembly::Throttled;
        }

        self.buffer.sort();
        self.published += 1;
        Assembly::Complete(CompletedSweep::from_points(
            self.published,
            self.buffer.points(),
        ))
    }

    pub fn buffer(&self) -> &SweepBuffer {
        &self.buffer
    }

    pub fn resets(&self) -> u64 {
        self.resets
    }

    pub fn published(&self) -> u64 {
        self.published
    }
}
