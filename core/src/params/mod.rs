pub mod command;
pub mod derive;
pub mod request;

pub use command::{command_line, LaunchConfig};
pub use derive::DerivedParams;
pub use request::{DeviceInfo, Gain, SweepRequest, HACKRF_SWEEP};
