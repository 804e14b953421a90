use thiserror::Error;

/// Errors that can occur while reading or writing listen settings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListenError {
    #[error("COM initialization failed: {0}")]
    ComInit(String),

    #[error("backend not initialized")]
    BackendUnavailable,

    #[error("device enumeration failed: {0}")]
    Enumeration(String),

    #[error("audio input device not found: {0}")]
    DeviceNotFound(String),

    #[error("property read failed: {0}")]
    PropertyRead(String),

    #[error("property write failed: {0}")]
    PropertyWrite(String),
}
