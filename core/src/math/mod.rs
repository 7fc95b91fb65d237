pub mod bins;
pub mod stats;

pub use bins::bin_centers;
pub use stats::StatsHelper;
