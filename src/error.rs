//! # Error Types Module
//!
//! Centralized error handling for the heartguard measurement core.
//! Every failure in this crate recovers locally into a well-defined
//! degraded output or state transition; nothing here is a crash path.
//!
//! ## Error Types
//! - `AnalysisError`: analysis preconditions not met (too few samples or
//!   peaks); surfaced to the session as a degraded terminal result
//! - `AcquisitionError`: camera permission/hardware problems reported by
//!   the frame source; surfaced as the session's `Failed` state
//! - `InterpretationError`: the best-effort interpretation service failed;
//!   the numeric result is still delivered with fallback text
//! - `ConfigError`: configuration file I/O and parsing errors

use std::fmt;

/// Analysis preconditions that were not met.
///
/// Neither variant propagates as a hard failure; the session converts both
/// into a degraded terminal result with zeroed metrics and High risk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Fewer than the required number of samples were buffered.
    InsufficientData { samples: usize },
    /// Enough samples, but too few heartbeat peaks were detected.
    NoSignal { peaks: usize },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InsufficientData { samples } => {
                write!(f, "Not enough samples for analysis: {} collected", samples)
            }
            AnalysisError::NoSignal { peaks } => {
                write!(f, "No clear pulse signal: only {} peaks detected", peaks)
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Camera permission or hardware problems reported by the frame source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    /// Camera access was not granted.
    PermissionDenied,
    /// No suitable capture device is available.
    NoDevice,
    /// The capture pipeline could not be configured.
    Setup(String),
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionError::PermissionDenied => {
                write!(f, "Camera permission denied")
            }
            AcquisitionError::NoDevice => {
                write!(f, "No camera device available")
            }
            AcquisitionError::Setup(reason) => {
                write!(f, "Camera setup failed: {}", reason)
            }
        }
    }
}

impl std::error::Error for AcquisitionError {}

/// Failures of the best-effort interpretation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpretationError {
    /// The service is not reachable or not configured.
    Unavailable,
    /// The service answered with an error.
    Service(String),
}

impl fmt::Display for InterpretationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpretationError::Unavailable => {
                write!(f, "Interpretation service unavailable")
            }
            InterpretationError::Service(reason) => {
                write!(f, "Interpretation service error: {}", reason)
            }
        }
    }
}

impl std::error::Error for InterpretationError {}

/// Errors that can occur during configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read config file
    ReadFailed(std::io::Error),
    /// Failed to write config file
    WriteFailed(std::io::Error),
    /// Failed to parse config file
    ParseFailed(toml::de::Error),
    /// Failed to serialize config
    SerializeFailed(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadFailed(e) => {
                write!(f, "Failed to read config file: {}", e)
            }
            ConfigError::WriteFailed(e) => {
                write!(f, "Failed to write config file: {}", e)
            }
            ConfigError::ParseFailed(e) => {
                write!(f, "Failed to parse config file: {}", e)
            }
            ConfigError::SerializeFailed(e) => {
                write!(f, "Failed to serialize config: {}", e)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadFailed(e) => Some(e),
            ConfigError::WriteFailed(e) => Some(e),
            ConfigError::ParseFailed(e) => Some(e),
            ConfigError::SerializeFailed(e) => Some(e),
        }
    }
}
