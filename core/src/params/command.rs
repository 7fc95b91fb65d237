use crate::params::derive::DerivedParams;
use serde::{Deserialize, Serialize};

/// How the capture tool is invoked, supplied explicitly by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LaunchConfig {
    /// Program followed by any fixed leading arguments.
    pub executable: Vec<String>,
    /// Appended verbatim after the derived arguments.
    pub extra_args: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            executable: vec!["hackrf_sweep".to_string()],
            extra_args: Vec::new(),
        }
    }
}

/// Renders the capture tool's argv for a derived parameter set.
///
/// The frequency range is handed over in the receiver's own domain, so the LO
/// offset is subtracted before the MHz values are truncated to integers.
pub fn command_line(params: &DerivedParams, lnb_lo: i64, launch: &LaunchConfig) -> Vec<String> {
    let lo_mhz = lnb_lo as f64 / 1e6;
    let start = (params.start_freq as f64 - lo_mhz) as i64;
    let stop = (params.stop_freq as f64 - lo_mhz) as i64;

    let mut argv = launch.executable.clone();
    argv.extend([
        "-f".to_string(),
        format!("{}:{}", start, stop),
        "-B".to_string(),
        "-w".to_string(),
        (u64::from(params.bin_size) * 1000).to_string(),
    ]);

    if params.gain.is_manual() {
        argv.extend([
            "-l".to_string(),
            params.lna_gain.to_string(),
            "-g".to_string(),
            params.vga_gain.to_string(),
        ]);
    }

    if params.single_shot {
        argv.push("-1".to_string());
    }

    argv.extend(launch.extra_args.iter().cloned());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::request::{Gain, SweepRequest};

    fn derive(request: SweepRequest) -> DerivedParams {
        DerivedParams::derive(&request).unwrap()
    }

    #[test]
    fn renders_default_session() {
        let params = derive(SweepRequest::default());
        let argv = command_line(&params, 0, &LaunchConfig::default());
        assert_eq!(
            argv,
            vec![
                "hackrf_sweep", "-f", "0:6000", "-B", "-w", "1000000", "-l", "16", "-g", "24"
            ]
        );
    }

    #[test]
    fn automatic_gain_omits_stage_flags() {
        let params = derive(SweepRequest {
            gain: Gain::Automatic,
            single_shot: true,
            ..Default::default()
        });
        let argv = command_line(&params, 0, &LaunchConfig::default());
        assert!(!argv.iter().any(|arg| arg == "-l" || arg == "-g"));
        assert_eq!(argv.last().map(String::as_str), Some("-1"));
    }

    #[test]
    fn lo_offset_shifts_range_into_receiver_domain() {
        let params = derive(SweepRequest {
            start_freq: 10_400,
            stop_freq: 10_600,
            ..Default::default()
        });
        let argv = command_line(&params, 9_750_000_000, &LaunchConfig::default());
        assert_eq!(argv[2], "650:850");

        let params = derive(SweepRequest {
            start_freq: 0,
            stop_freq: 20,
            ..Default::default()
        });
        let argv = command_line(&params, -125_500_000, &LaunchConfig::default());
        assert_eq!(argv[2], "125:145");
    }

    #[test]
    fn launch_config_wraps_derived_arguments() {
        let params = derive(SweepRequest {
            bin_size: 1,
            ..Default::default()
        });
        let launch = LaunchConfig {
            executable: vec!["/opt/hackrf/bin/hackrf_sweep".into(), "-d".into(), "0000abcd".into()],
            extra_args: vec!["-a".into(), "1".into()],
        };
        let argv = command_line(&params, 0, &launch);
        assert_eq!(&argv[..3], &launch.executable[..]);
        assert_eq!(argv[7], "3000");
        assert_eq!(&argv[argv.len() - 2..], &["-a".to_string(), "1".to_string()]);
    }
}
