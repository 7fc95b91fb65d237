use log::{error, info, warn};

/// Session-tagged logging for one capture run.
pub struct LogManager {
    tag: String,
}

impl LogManager {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.tag, message);
    }

    pub fn warn(&self, message: &str) {
        warn!("[{}] {}", self.tag, message);
    }

    pub fn error(&self, message: &str) {
        error!("[{}] {}", self.tag, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("sweep")
    }
}
