use crate::generator::profile::{build_capture, Band, GeneratorConfig};
use crate::workflow::config::SessionConfig;
use anyhow::Context;
use std::io::Cursor;
use std::path::PathBuf;
use sweepcore::engine::{CaptureSource, Engine, EngineHandle, HackrfProcess, ReplaySource};
use sweepcore::params::{command_line, DerivedParams};
use sweepcore::publish::SweepSink;

/// Where the binary sweep stream comes from.
#[derive(Debug, Clone)]
pub enum SourceKind {
    /// Launch the capture tool.
    Process,
    /// Read a stream previously recorded with `hackrf_sweep -B -r <file>`.
    Replay(PathBuf),
    /// Generate a stream in memory.
    Synthetic(GeneratorConfig),
}

#[derive(Clone)]
pub struct Runner {
    config: SessionConfig,
}

impl Runner {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn params(&self) -> anyhow::Result<DerivedParams> {
        DerivedParams::derive(&self.config.request).context("deriving sweep parameters")
    }

    pub fn command_line(&self) -> anyhow::Result<Vec<String>> {
        let params = self.params()?;
        Ok(command_line(
            &params,
            self.config.request.lnb_lo,
            &self.config.launch,
        ))
    }

    fn build_source(&self, kind: &SourceKind) -> anyhow::Result<Box<dyn CaptureSource>> {
        let source: Box<dyn CaptureSource> = match kind {
            SourceKind::Process => Box::new(HackrfProcess::new()),
            SourceKind::Replay(path) => Box::new(
                ReplaySource::open(path)
                    .with_context(|| format!("opening capture {}", path.display()))?,
            ),
            SourceKind::Synthetic(generator) => {
                let request = &self.config.request;
                let band = Band::from_params(&self.params()?, request.sample_rate, request.lnb_lo)?;
                let bytes = build_capture(&band, generator).context("generating synthetic capture")?;
                Box::new(ReplaySource::new(Cursor::new(bytes)))
            }
        };
        Ok(source)
    }

    /// Starts a session on its worker thread.
    pub fn start(&self, kind: &SourceKind, sink: Box<dyn SweepSink>) -> anyhow::Result<EngineHandle> {
        let source = self.build_source(kind)?;
        let engine = Engine::new(self.config.request.clone(), &self.config.launch, source, sink)
            .context("preparing sweep session")?;
        engine.spawn().context("starting sweep worker")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use sweepcore::engine::EngineState;
    use sweepcore::params::SweepRequest;
    use sweepcore::processing::CompletedSweep;

    fn runner(start: u64, stop: u64) -> Runner {
        Runner::new(SessionConfig {
            request: SweepRequest {
                start_freq: start,
                stop_freq: stop,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn collecting_sink() -> (Box<dyn SweepSink>, Arc<Mutex<Vec<CompletedSweep>>>) {
        let collected = Arc::new(Mutex::new(Vec::new()));
        let target = collected.clone();
        let sink = Box::new(move |sweep: &CompletedSweep| target.lock().unwrap().push(sweep.clone()));
        (sink, collected)
    }

    #[test]
    fn runner_executes_synthetic_session() {
        let runner = runner(60, 140);
        let (sink, collected) = collecting_sink();
        let generator = GeneratorConfig {
            sweeps: 3,
            ..Default::default()
        };
        let handle = runner.start(&SourceKind::Synthetic(generator), sink).unwrap();
        let snapshot = handle.join().unwrap();

        assert_eq!(snapshot.sweeps_published, 3);
        let sweeps = collected.lock().unwrap();
        assert_eq!(sweeps.len(), 3);
        // 4 steps of 20 MHz, two 10-bin halves each.
        assert_eq!(sweeps[0].len(), 80);
        let (peak_hz, peak_dbm) = sweeps[0].peak().unwrap();
        assert_eq!(peak_dbm, -30.0);
        assert!((peak_hz - 100e6).abs() <= 1e6);
    }

    #[test]
    fn runner_replays_recorded_capture() {
        let runner = runner(0, 40);
        let band = Band::from_params(&runner.params().unwrap(), 20_000_000, 0).unwrap();
        let bytes = build_capture(
            &band,
            &GeneratorConfig {
                sweeps: 2,
                ..Default::default()
            },
        )
        .unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();

        let (sink, collected) = collecting_sink();
        let handle = runner
            .start(&SourceKind::Replay(file.path().to_path_buf()), sink)
            .unwrap();
        let mut states = handle.subscribe();
        handle.join().unwrap();
        assert_eq!(collected.lock().unwrap().len(), 2);
        assert_eq!(*states.borrow_and_update(), EngineState::Stopped { error: None });
    }

    #[test]
    fn runner_rejects_inverted_range() {
        let runner = runner(200, 100);
        let (sink, _) = collecting_sink();
        assert!(runner.command_line().is_err());
        assert!(runner.start(&SourceKind::Process, sink).is_err());
    }

    #[test]
    fn runner_renders_command_line() {
        let argv = runner(2400, 2485).command_line().unwrap();
        assert_eq!(argv[..3], ["hackrf_sweep", "-f", "2400:2500"]);
    }
}
