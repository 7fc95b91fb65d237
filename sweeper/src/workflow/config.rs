use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use sweepcore::params::{Gain, LaunchConfig, SweepRequest};

/// Everything a session needs, as read from YAML.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub request: SweepRequest,
    pub launch: LaunchConfig,
}

/// Command-line values that take precedence over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub start_freq: Option<u64>,
    pub stop_freq: Option<u64>,
    pub bin_size: Option<u32>,
    pub interval: Option<f64>,
    pub gain_db: Option<i32>,
    pub lnb_lo: Option<i64>,
    pub single_shot: bool,
    pub executable: Option<String>,
    pub extra_args: Vec<String>,
}

impl SessionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading session config {}", path_ref.display()))?;
        let config: SessionConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing session config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        let request = &mut self.request;
        if let Some(start) = overrides.start_freq {
            request.start_freq = start;
        }
        if let Some(stop) = overrides.stop_freq {
            request.stop_freq = stop;
        }
        if let Some(bin_size) = overrides.bin_size {
            request.bin_size = bin_size;
        }
        if let Some(interval) = overrides.interval {
            request.interval = interval;
        }
        if let Some(db) = overrides.gain_db {
            request.gain = Gain::from_db(db);
        }
        if let Some(lnb_lo) = overrides.lnb_lo {
            request.lnb_lo = lnb_lo;
        }
        if overrides.single_shot {
            request.single_shot = true;
        }
        if let Some(executable) = &overrides.executable {
            self.launch.executable = vec![executable.clone()];
        }
        self.launch
            .extra_args
            .extend(overrides.extra_args.iter().cloned());
    }
}
