use serde::Serialize;

/// Lifecycle of one sweep session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EngineState {
    Idle,
    Launching,
    Running,
    Stopping,
    Stopped { error: Option<String> },
}

impl EngineState {
    pub fn is_running(&self) -> bool {
        matches!(self, EngineState::Running)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, EngineState::Stopped { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            EngineState::Stopped { error } => error.as_deref(),
            _ => None,
        }
    }
}
