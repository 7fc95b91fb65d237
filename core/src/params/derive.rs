use crate::params::request::{Gain, SweepRequest};
use crate::prelude::{SweepError, SweepResult};
use serde::{Deserialize, Serialize};

/// Bins narrower than this proved infeasible even with a long sweep interval.
pub const MIN_BIN_SIZE_KHZ: u32 = 3;
pub const MAX_BIN_SIZE_KHZ: u32 = 5000;
pub const MAX_GAIN_DB: u32 = 102;

/// LNA gain table step, in dB.
const LNA_STEP_DB: u32 = 8;
/// Portion of the total gain that buys one LNA step.
const LNA_SHARE_DB: u32 = 18;
/// VGA gain table step, in dB.
const VGA_STEP_DB: u32 = 2;

/// Quantized parameters handed to the capture process.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DerivedParams {
    /// MHz
    pub start_freq: u64,
    /// MHz, rounded up to a whole number of hardware steps.
    pub stop_freq: u64,
    /// kHz
    pub bin_size: u32,
    pub gain: Gain,
    pub lna_gain: u32,
    pub vga_gain: u32,
    pub single_shot: bool,
}

impl DerivedParams {
    pub fn derive(request: &SweepRequest) -> SweepResult<Self> {
        if request.stop_freq <= request.start_freq {
            return Err(SweepError::InvalidRange {
                start: request.start_freq,
                stop: request.stop_freq,
            });
        }
        if request.sample_rate == 0 || request.sample_rate % 1_000_000 != 0 {
            return Err(SweepError::InvalidSampleRate(request.sample_rate));
        }

        let bin_size = request.bin_size.clamp(MIN_BIN_SIZE_KHZ, MAX_BIN_SIZE_KHZ);

        // Only whole steps with a bandwidth equal to the sample rate are scanned.
        let step_bandwidth = request.sample_rate / 1_000_000;
        let step_count = (request.stop_freq - request.start_freq).div_ceil(step_bandwidth);
        let stop_freq = request.start_freq + step_count * step_bandwidth;

        let (gain, lna_gain, vga_gain) = match request.gain {
            Gain::Automatic => (Gain::Automatic, 0, 0),
            Gain::Manual(db) => {
                let db = db.min(MAX_GAIN_DB);
                let (lna, vga) = split_gain(db);
                (Gain::Manual(db), lna, vga)
            }
        };

        Ok(Self {
            start_freq: request.start_freq,
            stop_freq,
            bin_size,
            gain,
            lna_gain,
            vga_gain,
            single_shot: request.single_shot,
        })
    }

    /// Width of the whole quantized sweep in MHz.
    pub fn total_bandwidth(&self) -> u64 {
        self.stop_freq - self.start_freq
    }
}

/// Distributes a total gain between the LNA and VGA stages, floor-quantized
/// to each stage's table step.
pub fn split_gain(db: u32) -> (u32, u32) {
    let lna = LNA_STEP_DB * (db / LNA_SHARE_DB);
    let vga = VGA_STEP_DB * ((db - lna) / VGA_STEP_DB);
    (lna, vga)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start_freq: u64, stop_freq: u64) -> SweepRequest {
        SweepRequest {
            start_freq,
            stop_freq,
            ..Default::default()
        }
    }

    #[test]
    fn rejects_inverted_or_empty_range() {
        assert!(matches!(
            DerivedParams::derive(&request(100, 100)),
            Err(SweepError::InvalidRange { start: 100, stop: 100 })
        ));
        assert!(matches!(
            DerivedParams::derive(&request(200, 100)),
            Err(SweepError::InvalidRange { .. })
        ));
    }

    #[test]
    fn rejects_fractional_mhz_sample_rate() {
        let req = SweepRequest {
            sample_rate: 2_500_000,
            ..Default::default()
        };
        assert!(matches!(
            DerivedParams::derive(&req),
            Err(SweepError::InvalidSampleRate(2_500_000))
        ));
    }

    #[test]
    fn full_band_keeps_stop_frequency() {
        let params = DerivedParams::derive(&request(0, 6000)).unwrap();
        assert_eq!(params.start_freq, 0);
        assert_eq!(params.stop_freq, 6000);
        assert_eq!(params.total_bandwidth() / 20, 300);
    }

    #[test]
    fn stop_frequency_rounds_up_to_whole_steps() {
        let params = DerivedParams::derive(&request(2400, 2485)).unwrap();
        assert_eq!(params.stop_freq, 2500);

        let params = DerivedParams::derive(&request(100, 101)).unwrap();
        assert_eq!(params.stop_freq, 120);
    }

    #[test]
    fn derived_range_is_whole_steps_and_covers_request() {
        for sample_rate in [1_000_000u64, 8_000_000, 20_000_000] {
            for start in [0u64, 1, 7, 88, 433] {
                for span in [1u64, 19, 20, 21, 99, 1000, 5999] {
                    let req = SweepRequest {
                        start_freq: start,
                        stop_freq: start + span,
                        sample_rate,
                        ..Default::default()
                    };
                    let params = DerivedParams::derive(&req).unwrap();
                    let step = sample_rate / 1_000_000;
                    assert!(params.stop_freq >= req.stop_freq);
                    assert_eq!(params.total_bandwidth() % step, 0);
                    assert!(params.stop_freq - req.stop_freq < step);
                }
            }
        }
    }

    #[test]
    fn bin_size_is_clamped() {
        let mut req = request(0, 6000);
        req.bin_size = 1;
        assert_eq!(DerivedParams::derive(&req).unwrap().bin_size, 3);
        req.bin_size = 10_000;
        assert_eq!(DerivedParams::derive(&req).unwrap().bin_size, 5000);
        req.bin_size = 4000;
        assert_eq!(DerivedParams::derive(&req).unwrap().bin_size, 4000);
    }

    #[test]
    fn gain_split_respects_stage_steps() {
        for db in 0..=MAX_GAIN_DB {
            let (lna, vga) = split_gain(db);
            assert!(lna + vga <= db, "gain {db}");
            assert_eq!(lna % 8, 0);
            assert_eq!(vga % 2, 0);
            assert!(db - (lna + vga) <= 9, "gain {db}");
        }
    }

    #[test]
    fn gain_split_matches_hardware_tables() {
        assert_eq!(split_gain(0), (0, 0));
        assert_eq!(split_gain(17), (0, 16));
        assert_eq!(split_gain(18), (8, 10));
        assert_eq!(split_gain(40), (16, 24));
        assert_eq!(split_gain(102), (40, 62));
    }

    #[test]
    fn automatic_gain_leaves_stages_at_zero() {
        let req = SweepRequest {
            gain: Gain::Automatic,
            ..Default::default()
        };
        let params = DerivedParams::derive(&req).unwrap();
        assert_eq!(params.gain, Gain::Automatic);
        assert_eq!((params.lna_gain, params.vga_gain), (0, 0));
    }

    #[test]
    fn manual_gain_is_limited() {
        let req = SweepRequest {
            gain: Gain::Manual(150),
            ..Default::default()
        };
        let params = DerivedParams::derive(&req).unwrap();
        assert_eq!(params.gain, Gain::Manual(102));
        assert_eq!((params.lna_gain, params.vga_gain), (40, 62));
    }
}
