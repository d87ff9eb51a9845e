//! # heartguard
//!
//! Camera-based PPG heart rate and HRV measurement core.
//!
//! A fingertip pressed against a phone camera modulates red reflectance
//! with each heartbeat. This crate turns that stream of frames into a
//! measurement: frames are reduced to mean red intensity, buffered as a
//! bounded time series, scanned for heartbeat peaks, and summarized as
//! average BPM plus SDNN-based HRV with a three-tier risk classification.
//!
//! The camera itself, UI, and the interpretation text service are external
//! collaborators reached through the [`monitor::FrameSource`] and
//! [`interpret::Interpreter`] seams.

pub mod analysis;
pub mod config;
pub mod error;
pub mod frame;
pub mod interpret;
pub mod monitor;
pub mod risk;
pub mod session;
pub mod timeseries;

pub use analysis::{BpmSmoother, HeartMetrics};
pub use config::MonitorConfig;
pub use error::{AcquisitionError, AnalysisError, ConfigError, InterpretationError};
pub use frame::Frame;
pub use interpret::{Interpreter, NoInterpretation, FALLBACK_INTERPRETATION};
pub use monitor::{FrameSink, FrameSource, PulseMonitor, Snapshot};
pub use risk::RiskLevel;
pub use session::{AnalysisResult, MeasurementSession, Phase};
pub use timeseries::{Sample, SignalBuffer};
