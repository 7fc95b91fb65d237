//! Decoder and reassembly core for `hackrf_sweep` binary output.
//!
//! The capture tool emits length-prefixed segment records; this crate turns
//! them back into whole frequency sweeps, throttles how often they are handed
//! on, and drives the capture process through a small lifecycle state machine.

pub mod engine;
pub mod math;
pub mod params;
pub mod prelude;
pub mod processing;
pub mod protocol;
pub mod publish;
pub mod telemetry;

pub use prelude::{SweepError, SweepResult};
