pub mod assembler;
pub mod throttle;

pub use assembler::{Assembly, CompletedSweep, SweepAssembler, SweepBuffer};
pub use throttle::ThrottleGate;
