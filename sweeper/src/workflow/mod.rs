pub mod config;
pub mod output;
pub mod runner;

pub use config::{Overrides, SessionConfig};
pub use output::{JsonLinesSink, SummarySink};
pub use runner::{Runner, SourceKind};
