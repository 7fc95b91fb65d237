use std::io;

pub use crate::engine::{CancellationToken, CaptureSource, Engine, EngineHandle, EngineState};
pub use crate::params::{DerivedParams, Gain, LaunchConfig, SweepRequest};
pub use crate::processing::{Assembly, CompletedSweep, SweepAssembler, ThrottleGate};
pub use crate::protocol::{FrameRead, FrameReader, Segment};
pub use crate::publish::{Publisher, SweepSink};

/// Common error type for a sweep session.
#[derive(thiserror::Error, Debug)]
pub enum SweepError {
    #[error("invalid frequency range: stop {stop} MHz must be above start {start} MHz")]
    InvalidRange { start: u64, stop: u64 },
    #[error("invalid sample rate {0} sps: must be a non-zero whole number of MHz")]
    InvalidSampleRate(u64),
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
    #[error("capture stream failure: {0}")]
    Stream(#[from] io::Error),
    #[error("failed to launch capture process: {0}")]
    Launch(String),
}

pub type SweepResult<T> = Result<T, SweepError>;
