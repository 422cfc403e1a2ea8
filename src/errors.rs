// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the hand server

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Frame capture errors
    Capture(CaptureError),
    /// Hand detector errors
    Detect(DetectError),
    /// Configuration errors
    Config(ConfigError),
    /// HTTP server errors (bind, serve)
    Server(String),
    /// Generic error with message
    Other(String),
}

/// Frame source errors
///
/// Any of these ends a capture attempt. The producer loop decides whether
/// to retry or to give up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// No capture device at the requested index
    DeviceNotFound(String),
    /// Device exists but is in use by another process
    Busy,
    /// Device went away or a frame could not be read
    Disconnected(String),
    /// Device delivered a format we cannot convert
    InvalidFormat(String),
    /// Other I/O failure talking to the device
    Io(String),
}

/// Hand detector errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    /// Detector process could not be started
    Spawn(String),
    /// Pipe to or from the detector failed
    Io(String),
    /// Detector answered with something we could not parse
    Protocol(String),
    /// Detector process exited
    Exited(Option<i32>),
    /// Frame could not be prepared for the detector
    Frame(String),
}

impl DetectError {
    /// Whether the detector is gone and later frames cannot succeed either
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DetectError::Spawn(_) | DetectError::Io(_) | DetectError::Exited(_)
        )
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file could not be read
    Read(String),
    /// Config file is not valid JSON for [`crate::Config`]
    Parse(String),
    /// Config values are out of range
    Invalid(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Detect(e) => write!(f, "Detector error: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Server(msg) => write!(f, "Server error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::DeviceNotFound(msg) => write!(f, "Capture device not found: {}", msg),
            CaptureError::Busy => write!(f, "Capture device is busy"),
            CaptureError::Disconnected(msg) => write!(f, "Capture device disconnected: {}", msg),
            CaptureError::InvalidFormat(msg) => write!(f, "Invalid frame format: {}", msg),
            CaptureError::Io(msg) => write!(f, "Capture I/O error: {}", msg),
        }
    }
}

impl fmt::Display for DetectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectError::Spawn(msg) => write!(f, "Failed to start detector: {}", msg),
            DetectError::Io(msg) => write!(f, "Detector I/O error: {}", msg),
            DetectError::Protocol(msg) => write!(f, "Detector protocol error: {}", msg),
            DetectError::Exited(Some(code)) => write!(f, "Detector exited with code {}", code),
            DetectError::Exited(None) => write!(f, "Detector exited"),
            DetectError::Frame(msg) => write!(f, "Frame preparation failed: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(msg) => write!(f, "Failed to read config: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for DetectError {}
impl std::error::Error for ConfigError {}

// Conversions from sub-errors to AppError
impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<DetectError> for AppError {
    fn from(err: DetectError) -> Self {
        AppError::Detect(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => CaptureError::DeviceNotFound(err.to_string()),
            std::io::ErrorKind::ResourceBusy => CaptureError::Busy,
            std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::NotConnected => CaptureError::Disconnected(err.to_string()),
            _ => CaptureError::Io(err.to_string()),
        }
    }
}

impl From<std::io::Error> for DetectError {
    fn from(err: std::io::Error) -> Self {
        DetectError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DetectError {
    fn from(err: serde_json::Error) -> Self {
        DetectError::Protocol(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
