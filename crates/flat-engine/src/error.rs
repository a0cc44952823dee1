use std::time::Duration;

use thiserror::Error;

/// Engine-level failures. Tick-level script faults are reported separately as
/// [`TickFault`](crate::core::fault::TickFault) and never surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("presentation surface did not become visible within {0:?}")]
    SurfaceTimeout(Duration),

    #[error("failed to spawn simulation thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    #[error("simulation thread panicked: {0}")]
    ThreadPanicked(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
}

/// Error returned by a script hook. Carries a human-readable reason only;
/// scripts that need richer errors format them into the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ScriptError {
    message: String,
}

impl ScriptError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for ScriptError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ScriptError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Failure reported by an [`AudioBackend`](crate::audio::AudioBackend).
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("sound file not found: {0}")]
    NotFound(String),

    #[error("audio device unavailable: {0}")]
    Device(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_error_from_str_keeps_message() {
        let err: ScriptError = "door is locked".into();
        assert_eq!(err.message(), "door is locked");
        assert_eq!(err.to_string(), "door is locked");
    }

    #[test]
    fn surface_timeout_formats_duration() {
        let err = EngineError::SurfaceTimeout(Duration::from_millis(250));
        assert!(err.to_string().contains("250ms"));
    }
}
