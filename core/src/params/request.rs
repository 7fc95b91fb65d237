use log::warn;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Gain requested for the receiver's analog chain.
///
/// Serialised as the plain dB figure, with `-1` standing for automatic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "i32", into = "i32")]
pub enum Gain {
    Automatic,
    Manual(u32),
}

impl Gain {
    /// Maps the conventional dB setting, where any negative value means automatic.
    pub fn from_db(db: i32) -> Self {
        if db < 0 {
            Gain::Automatic
        } else {
            Gain::Manual(db as u32)
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, Gain::Manual(_))
    }
}

impl From<i32> for Gain {
    fn from(db: i32) -> Self {
        Gain::from_db(db)
    }
}

impl From<Gain> for i32 {
    fn from(gain: Gain) -> Self {
        match gain {
            Gain::Automatic => -1,
            Gain::Manual(db) => i32::try_from(db).unwrap_or(i32::MAX),
        }
    }
}

impl Default for Gain {
    fn default() -> Self {
        Gain::Manual(40)
    }
}

/// User-level description of one sweep session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SweepRequest {
    /// MHz
    pub start_freq: u64,
    /// MHz
    pub stop_freq: u64,
    /// kHz
    pub bin_size: u32,
    /// Minimum seconds between two published sweeps.
    pub interval: f64,
    pub gain: Gain,
    pub device: u32,
    pub sample_rate: u64,
    pub ppm: i32,
    pub crop: u32,
    pub single_shot: bool,
    /// Local-oscillator offset in Hz, added to every received frequency.
    pub lnb_lo: i64,
}

impl Default for SweepRequest {
    fn default() -> Self {
        Self {
            start_freq: 0,
            stop_freq: 6000,
            bin_size: 1000,
            interval: 0.0,
            gain: Gain::default(),
            device: 0,
            sample_rate: 20_000_000,
            ppm: 0,
            crop: 0,
            single_shot: false,
            lnb_lo: 0,
        }
    }
}

impl SweepRequest {
    /// LO offset expressed in MHz, the unit of the configured range.
    pub fn lnb_lo_mhz(&self) -> f64 {
        self.lnb_lo as f64 / 1e6
    }

    /// Logs every setting the capture tool cannot honour as requested.
    pub fn warn_outside(&self, info: &DeviceInfo) {
        if !info.sample_rate.contains(&self.sample_rate) {
            warn!(
                "{}: sample rate {} sps outside supported {:?}",
                info.name, self.sample_rate, info.sample_rate
            );
        }
        if !info.start_freq.contains(&self.start_freq) {
            warn!(
                "{}: start {} MHz outside supported {:?}",
                info.name, self.start_freq, info.start_freq
            );
        }
        if !info.stop_freq.contains(&self.stop_freq) {
            warn!(
                "{}: stop {} MHz outside supported {:?}",
                info.name, self.stop_freq, info.stop_freq
            );
        }
        if !info.bin_size.contains(&self.bin_size) {
            warn!(
                "{}: bin size {} kHz will be clamped to {:?}",
                info.name, self.bin_size, info.bin_size
            );
        }
        if let Gain::Manual(db) = self.gain {
            if db > info.gain_max_db {
                warn!("{}: gain {} dB will be limited to {} dB", info.name, db, info.gain_max_db);
            }
        }
        if self.ppm != 0 || self.crop != 0 || self.device != 0 {
            warn!(
                "{}: device/ppm/crop settings are not supported and will be ignored",
                info.name
            );
        }
    }
}

/// Ranges advertised by a capture tool.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: &'static str,
    pub sample_rate: RangeInclusive<u64>,
    pub start_freq: RangeInclusive<u64>,
    pub stop_freq: RangeInclusive<u64>,
    pub bin_size: RangeInclusive<u32>,
    pub gain_max_db: u32,
}

pub const HACKRF_SWEEP: DeviceInfo = DeviceInfo {
    name: "hackrf_sweep",
    sample_rate: 20_000_000..=20_000_000,
    start_freq: 0..=7230,
    stop_freq: 0..=7250,
    bin_size: 3..=5000,
    gain_max_db: 102,
};
