//! Session lifecycle: launch the capture source, pump frames through the
//! assembler, and tear everything down again.

pub mod cancel;
pub mod source;
pub mod state;

pub use cancel::CancellationToken;
pub use source::{CaptureSource, CaptureStream, HackrfProcess, ReplaySource};
pub use state::EngineState;

use crate::params::{command_line, DerivedParams, LaunchConfig, SweepRequest, HACKRF_SWEEP};
use crate::prelude::{SweepError, SweepResult};
use crate::processing::{Assembly, SweepAssembler, ThrottleGate};
use crate::protocol::{FrameRead, FrameReader, Segment};
use crate::publish::{Publisher, SweepSink};
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use std::io::Read;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tokio::sync::watch;

/// Everything needed to run one sweep session.
pub struct Engine {
    request: SweepRequest,
    params: DerivedParams,
    argv: Vec<String>,
    source: Box<dyn CaptureSource>,
    publisher: Publisher,
    cancel: CancellationToken,
    state: watch::Sender<EngineState>,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl Engine {
    /// Validates the request and prepares a session; nothing is launched yet.
    pub fn new(
        request: SweepRequest,
        launch: &LaunchConfig,
        source: Box<dyn CaptureSource>,
        sink: Box<dyn SweepSink>,
    ) -> SweepResult<Self> {
        let params = DerivedParams::derive(&request)?;
        request.warn_outside(&HACKRF_SWEEP);
        let argv = command_line(&params, request.lnb_lo, launch);
        let (state, _) = watch::channel(EngineState::Idle);

        Ok(Self {
            request,
            params,
            argv,
            source,
            publisher: Publisher::new(sink),
            cancel: CancellationToken::new(),
            state,
            metrics: Arc::new(MetricsRecorder::new()),
            logger: LogManager::new(HACKRF_SWEEP.name),
        })
    }

    pub fn params(&self) -> &DerivedParams {
        &self.params
    }

    pub fn command_line(&self) -> &[String] {
        &self.argv
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.state.subscribe()
    }

    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        self.metrics.clone()
    }

    /// Runs the session to completion on the current thread.
    pub fn run(mut self) -> SweepResult<MetricsSnapshot> {
        self.transition(EngineState::Launching);
        let stream = match self.source.launch(&self.argv, &self.cancel) {
            Ok(stream) => stream,
            Err(err) => {
                self.logger.error(&err.to_string());
                self.transition(EngineState::Stopped {
                    error: Some(err.to_string()),
                });
                return Err(err);
            }
        };

        self.transition(EngineState::Running);
        self.logger.record(&format!(
            "sweeping {}-{} MHz, {} kHz bins",
            self.params.start_freq, self.params.stop_freq, self.params.bin_size
        ));

        let outcome = self.pump(stream);

        self.transition(EngineState::Stopping);
        if let Err(err) = self.source.terminate() {
            self.logger.warn(&format!("terminating capture source: {}", err));
        }

        let error = outcome.as_ref().err().map(ToString::to_string);
        if let Some(message) = &error {
            self.logger.error(message);
        }
        self.transition(EngineState::Stopped { error });

        let snapshot = self.metrics.snapshot();
        self.logger.record(&format!(
            "stopped after {} frames, {} sweeps published, {} throttled",
            snapshot.frames, snapshot.sweeps_published, snapshot.sweeps_throttled
        ));
        outcome.map(|_| snapshot)
    }

    /// Runs the session on a dedicated worker thread.
    pub fn spawn(self) -> SweepResult<EngineHandle> {
        let cancel = self.cancel.clone();
        let state = self.subscribe();
        let metrics = self.metrics.clone();
        let worker = thread::Builder::new()
            .name("sweep-worker".into())
            .spawn(move || self.run())
            .map_err(|err| SweepError::Launch(format!("spawning sweep worker: {}", err)))?;

        Ok(EngineHandle {
            cancel,
            state,
            metrics,
            worker,
        })
    }

    fn pump(&mut self, stream: impl Read) -> SweepResult<()> {
        let mut frames = FrameReader::new(stream);
        let mut assembler = SweepAssembler::new(
            &self.params,
            self.request.lnb_lo,
            ThrottleGate::from_secs_f64(self.request.interval),
        );

        while !self.cancel.is_cancelled() {
            let read = match frames.read_frame() {
                Ok(read) => read,
                // Tearing the process down can surface as a read error.
                Err(SweepError::Stream(err)) if self.cancel.is_cancelled() => {
                    self.logger.record(&format!("stream closed during stop: {}", err));
                    break;
                }
                Err(err) => return Err(err),
            };

            let payload = match read {
                FrameRead::Frame(payload) => payload,
                FrameRead::Transient => {
                    self.metrics.record_transient();
                    continue;
                }
                FrameRead::End => break,
            };

            self.metrics.record_frame();
            let segment = Segment::decode(&payload)?;
            match assembler.ingest(&segment, Instant::now()) {
                Assembly::Accumulating => {}
                Assembly::Complete(sweep) => {
                    self.publisher.publish(&sweep);
                    self.metrics.record_published();
                }
                Assembly::Throttled => self.metrics.record_throttled(),
            }
            self.metrics.record_resets(assembler.resets());
        }
        Ok(())
    }

    fn transition(&self, next: EngineState) {
        self.state.send_replace(next);
    }
}

/// Control surface for a session running on its worker thread.
pub struct EngineHandle {
    cancel: CancellationToken,
    state: watch::Receiver<EngineState>,
    metrics: Arc<MetricsRecorder>,
    worker: JoinHandle<SweepResult<MetricsSnapshot>>,
}

impl EngineHandle {
    /// Requests a stop and forces the capture source closed so a blocked read returns.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> EngineState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.state.clone()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Waits for the worker and returns the session outcome.
    pub fn join(self) -> SweepResult<MetricsSnapshot> {
        self.worker
            .join()
            .unwrap_or_else(|_| Err(SweepError::Launch("sweep worker panicked".into())))
    }
}
