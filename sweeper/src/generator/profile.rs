use anyhow::ensure;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sweepcore::params::DerivedParams;
use sweepcore::protocol::{encode_frame, Segment};

/// A carrier to paint into the synthetic spectrum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tone {
    /// RF frequency, MHz.
    pub frequency_mhz: f64,
    pub power_dbm: f32,
}

/// Configuration for generating a synthetic capture stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub sweeps: usize,
    pub noise_floor_dbm: f32,
    pub noise: f32,
    pub seed: u64,
    pub tones: Vec<Tone>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sweeps: 4,
            noise_floor_dbm: -90.0,
            noise: 3.0,
            seed: 0,
            tones: vec![Tone {
                frequency_mhz: 100.0,
                power_dbm: -30.0,
            }],
        }
    }
}

/// Describes the band the generator walks, in the receiver's domain.
#[derive(Debug, Clone, Copy)]
pub struct Band {
    pub start_hz: u64,
    pub stop_hz: u64,
    pub step_hz: u64,
    pub bin_hz: u64,
    pub lnb_lo: i64,
}

impl Band {
    pub fn from_params(params: &DerivedParams, sample_rate: u64, lnb_lo: i64) -> anyhow::Result<Self> {
        let start_hz = params.start_freq as i64 * 1_000_000 - lnb_lo;
        let stop_hz = params.stop_freq as i64 * 1_000_000 - lnb_lo;
        ensure!(
            start_hz >= 0,
            "LO offset {} Hz moves the sweep start below 0 Hz",
            lnb_lo
        );
        Ok(Self {
            start_hz: start_hz as u64,
            stop_hz: stop_hz as u64,
            step_hz: sample_rate,
            bin_hz: u64::from(params.bin_size) * 1000,
            lnb_lo,
        })
    }
}

/// Emits one tuning step as two half-band records, like the capture tool's
/// paired FFT halves.
fn step_segments(band: &Band, tune_hz: u64, rng: &mut StdRng, config: &GeneratorConfig) -> [Segment; 2] {
    let half = band.step_hz / 2;
    let bins = (half / band.bin_hz).max(1) as usize;
    let step = half as f64 / bins as f64;

    let mut half_band = |low: u64| {
        let samples = (0..bins)
            .map(|i| {
                let rf_hz = low as f64 + band.lnb_lo as f64 + step * (i as f64 + 0.5);
                let jitter = if config.noise > 0.0 {
                    rng.gen_range(-config.noise..config.noise)
                } else {
                    0.0
                };
                let tone = config
                    .tones
                    .iter()
                    .filter(|t| (t.frequency_mhz * 1e6 - rf_hz).abs() <= step / 2.0)
                    .map(|t| t.power_dbm)
                    .fold(f32::NEG_INFINITY, f32::max);
                (config.noise_floor_dbm + jitter).max(tone)
            })
            .collect();
        Segment::new(low, low + half, samples)
    };

    let lower = half_band(tune_hz);
    let upper = half_band(tune_hz + half);
    [lower, upper]
}

/// Builds the byte stream the capture tool would write for `config.sweeps` passes.
pub fn build_capture(band: &Band, config: &GeneratorConfig) -> anyhow::Result<Vec<u8>> {
    ensure!(band.step_hz >= 2, "step of {} Hz is too narrow", band.step_hz);
    ensure!(band.bin_hz > 0, "bin width must be positive");
    let steps = (band.stop_hz - band.start_hz) / band.step_hz;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut bytes = Vec::new();
    for _ in 0..config.sweeps {
        for step in 0..steps {
            let tune_hz = band.start_hz + step * band.step_hz;
            for segment in step_segments(band, tune_hz, &mut rng, config) {
                bytes.extend(encode_frame(&segment));
            }
        }
    }
    Ok(bytes)
}
