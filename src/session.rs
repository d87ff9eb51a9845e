//! # Measurement Session State Machine
//!
//! The stateful controller of one timed acquisition:
//!
//! ```text
//! Idle -> Stabilizing -> Measuring -> Analyzing -> Completed
//!                                               \-> (degraded Completed)
//!          \------------- Failed (acquisition error) ------/
//! ```
//!
//! Frames arriving during stabilization are discarded so the optical signal
//! can settle. During measuring every reduced frame is buffered and the
//! live BPM estimate is refreshed. Once progress reaches 100% the buffered
//! window is analyzed and classified; analysis precondition failures
//! complete the session with a degraded result instead of failing it.
//!
//! All methods take an explicit `now` in seconds so the machine is driven
//! entirely by its owner's clock. The `monitor` module serializes frame
//! arrival and timer ticks onto a single worker thread; the session itself
//! holds no synchronization.

use crate::analysis::{self, BpmSmoother, HeartMetrics};
use crate::config::MonitorConfig;
use crate::error::AnalysisError;
use crate::risk::RiskLevel;
use crate::timeseries::{Sample, SignalBuffer};
use chrono::{DateTime, Utc};

/// How many of the most recent samples feed the realtime estimate.
pub const REALTIME_WINDOW: usize = 100;

/// Explanation text for a measurement that ended with too few samples.
pub const INSUFFICIENT_DATA_TEXT: &str =
    "Not enough data was collected to analyze the signal. Keep your fingertip steady over \
     the camera lens and try again.";

/// Explanation text for a measurement with no detectable pulse signal.
pub const NO_SIGNAL_TEXT: &str =
    "No clear pulse signal was detected. Keep your fingertip steady over the camera lens \
     and try again.";

/// Final outcome of a completed measurement session.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub average_bpm: f64,
    pub hrv: f64,
    pub interpretation: String,
    pub risk_level: RiskLevel,
    pub timestamp: DateTime<Utc>,
}

/// Explicit session phase. `Completed` and `Failed` are terminal until
/// `reset` returns the session to `Idle`.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Stabilizing,
    Measuring,
    Analyzing,
    Completed(AnalysisResult),
    Failed(String),
}

pub struct MeasurementSession {
    stabilization_secs: f64,
    measurement_secs: f64,
    buffer: SignalBuffer,
    smoother: BpmSmoother,
    phase: Phase,
    start_time: Option<f64>,
    progress: f64,
    pending: Option<HeartMetrics>,
}

impl MeasurementSession {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            stabilization_secs: config.stabilization_secs,
            measurement_secs: config.measurement_secs,
            buffer: SignalBuffer::new(),
            smoother: BpmSmoother::new(),
            phase: Phase::Idle,
            start_time: None,
            progress: 0.0,
            pending: None,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Measuring-phase progress in [0, 1].
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Smoothed realtime BPM, 0.0 until the first valid estimate.
    pub fn current_bpm(&self) -> f64 {
        self.smoother.value()
    }

    pub fn sample_count(&self) -> usize {
        self.buffer.len()
    }

    /// Human-readable status line for the current phase.
    pub fn status(&self) -> &'static str {
        match self.phase {
            Phase::Idle => "Ready",
            Phase::Stabilizing => "Stabilizing signal...",
            Phase::Measuring => "Measuring...",
            Phase::Analyzing => "Analyzing...",
            Phase::Completed(_) => "Measurement complete",
            Phase::Failed(_) => "Measurement failed",
        }
    }

    /// Begin a measurement. Only valid from `Idle`; any other phase must
    /// pass through `reset` first, so a stray start is logged and ignored.
    pub fn start(&mut self, now: f64) {
        if self.phase != Phase::Idle {
            log::warn!("start ignored: session is not idle ({})", self.status());
            return;
        }

        self.start_time = Some(now);
        self.phase = Phase::Stabilizing;
        log::info!("measurement started, stabilizing for {:.1} s", self.stabilization_secs);
    }

    /// Record an acquisition failure reported by the camera collaborator.
    /// The user must restart manually; there is no automatic retry.
    pub fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::error!("acquisition failed: {}", reason);
        self.phase = Phase::Failed(reason);
    }

    /// Handle one reduced frame value.
    ///
    /// Samples arriving before the stabilization window has elapsed are
    /// discarded. Afterwards the sample is appended and the realtime BPM
    /// estimate over the recent window is refreshed; an invalid estimate
    /// leaves the smoothed value unchanged.
    pub fn handle_sample(&mut self, now: f64, value: f64) {
        let Some(start) = self.start_time else {
            return;
        };
        if !matches!(self.phase, Phase::Stabilizing | Phase::Measuring) {
            return;
        }

        let elapsed = now - start;
        if elapsed <= self.stabilization_secs {
            return;
        }

        if self.phase == Phase::Stabilizing {
            self.phase = Phase::Measuring;
        }

        self.buffer.push(Sample {
            timestamp: now,
            value,
        });

        if let Some(bpm) = analysis::realtime_bpm(self.buffer.suffix(REALTIME_WINDOW)) {
            self.smoother.update(bpm);
        }
    }

    /// Advance the timed part of the session. Returns `true` exactly on the
    /// tick that moves `Measuring` to `Analyzing`, which tells the caller to
    /// stop acquisition and run the final analysis.
    pub fn tick(&mut self, now: f64) -> bool {
        let Some(start) = self.start_time else {
            return false;
        };

        let elapsed = now - start;
        if elapsed <= self.stabilization_secs {
            return false;
        }

        if self.phase == Phase::Stabilizing {
            self.phase = Phase::Measuring;
        }
        if self.phase != Phase::Measuring {
            return false;
        }

        self.progress = ((elapsed - self.stabilization_secs) / self.measurement_secs).min(1.0);

        if self.progress >= 1.0 {
            log::info!("measurement window complete, {} samples buffered", self.buffer.len());
            self.phase = Phase::Analyzing;
            return true;
        }
        false
    }

    /// Run the full analysis over the buffered window.
    ///
    /// On success the metrics are returned so the caller can fetch an
    /// interpretation and finish via [`complete`](Self::complete). When an
    /// analysis precondition fails the session completes immediately with a
    /// degraded terminal result: zeroed metrics, High risk, and an
    /// explanatory text.
    pub fn begin_analysis(&mut self) -> Option<HeartMetrics> {
        if self.phase != Phase::Analyzing {
            return None;
        }

        match analysis::analyze(self.buffer.samples()) {
            Ok(metrics) => {
                self.pending = Some(metrics);
                Some(metrics)
            }
            Err(err) => {
                log::warn!("analysis degraded: {}", err);
                let text = match err {
                    AnalysisError::InsufficientData { .. } => INSUFFICIENT_DATA_TEXT,
                    AnalysisError::NoSignal { .. } => NO_SIGNAL_TEXT,
                };
                self.phase = Phase::Completed(AnalysisResult {
                    average_bpm: 0.0,
                    hrv: 0.0,
                    interpretation: text.to_string(),
                    risk_level: RiskLevel::High,
                    timestamp: Utc::now(),
                });
                None
            }
        }
    }

    /// Finish an analysis started by [`begin_analysis`](Self::begin_analysis)
    /// with the interpretation text. If a reset arrived in between, the
    /// in-flight result is discarded rather than applied.
    pub fn complete(&mut self, interpretation: String) {
        if self.phase != Phase::Analyzing {
            log::debug!("discarding analysis result: session left the analyzing phase");
            return;
        }
        let Some(metrics) = self.pending.take() else {
            return;
        };

        let risk_level = RiskLevel::classify(metrics.average_bpm, metrics.hrv);
        log::info!(
            "measurement complete: {:.1} bpm, hrv {:.1} ms, risk {:?}",
            metrics.average_bpm,
            metrics.hrv,
            risk_level
        );

        self.phase = Phase::Completed(AnalysisResult {
            average_bpm: metrics.average_bpm,
            hrv: metrics.hrv,
            interpretation,
            risk_level,
            timestamp: Utc::now(),
        });
    }

    /// Return to `Idle` from any phase, clearing the buffer, the realtime
    /// estimate, progress, and any in-flight result.
    pub fn reset(&mut self) {
        self.buffer.reset();
        self.smoother.reset();
        self.phase = Phase::Idle;
        self.start_time = None;
        self.progress = 0.0;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> MeasurementSession {
        MeasurementSession::new(&MonitorConfig::default())
    }

    /// Clean periodic PPG-like waveform around 72 BPM. The phase offset
    /// keeps crests away from midpoints of the 10 Hz sample grid so each
    /// beat yields exactly one strict local maximum.
    fn waveform(t: f64) -> f64 {
        128.0 + 40.0 * (2.0 * std::f64::consts::PI * 1.2 * t + 0.3).sin()
    }

    #[test]
    fn test_start_transitions_to_stabilizing() {
        let mut s = session();
        assert_eq!(*s.phase(), Phase::Idle);

        s.start(0.0);
        assert_eq!(*s.phase(), Phase::Stabilizing);
        assert_eq!(s.status(), "Stabilizing signal...");
    }

    #[test]
    fn test_start_ignored_when_not_idle() {
        let mut s = session();
        s.start(0.0);
        s.start(5.0);
        // The original start time is kept: progress still references t=0
        s.tick(3.5);
        assert_eq!(*s.phase(), Phase::Measuring);
    }

    #[test]
    fn test_stabilization_discards_samples() {
        let mut s = session();
        s.start(0.0);

        s.handle_sample(1.0, 120.0);
        s.handle_sample(2.9, 130.0);
        s.handle_sample(3.0, 125.0);
        assert_eq!(s.sample_count(), 0);
        assert_eq!(*s.phase(), Phase::Stabilizing);

        s.handle_sample(3.1, 125.0);
        assert_eq!(s.sample_count(), 1);
        assert_eq!(*s.phase(), Phase::Measuring);
    }

    #[test]
    fn test_samples_ignored_when_idle() {
        let mut s = session();
        s.handle_sample(1.0, 120.0);
        assert_eq!(s.sample_count(), 0);
    }

    #[test]
    fn test_tick_progress() {
        let mut s = session();
        s.start(0.0);

        assert!(!s.tick(2.0));
        assert_eq!(s.progress(), 0.0);

        assert!(!s.tick(3.1));
        assert_eq!(*s.phase(), Phase::Measuring);

        assert!(!s.tick(18.0));
        assert!((s.progress() - 0.5).abs() < 1e-9);

        assert!(s.tick(33.0));
        assert_eq!(*s.phase(), Phase::Analyzing);
        assert_eq!(s.progress(), 1.0);

        // Terminal edge fires only once
        assert!(!s.tick(33.1));
    }

    #[test]
    fn test_fail_from_acquisition() {
        let mut s = session();
        s.start(0.0);
        s.fail("Camera permission denied");

        assert_eq!(*s.phase(), Phase::Failed("Camera permission denied".into()));
        assert_eq!(s.status(), "Measurement failed");

        // Frames after failure are ignored
        s.handle_sample(4.0, 120.0);
        assert_eq!(s.sample_count(), 0);
    }

    #[test]
    fn test_insufficient_data_completes_degraded() {
        let mut s = session();
        s.start(0.0);
        for i in 0..10 {
            s.handle_sample(3.1 + i as f64 * 0.1, waveform(i as f64 * 0.1));
        }
        assert!(s.tick(33.0));

        assert_eq!(s.begin_analysis(), None);
        match s.phase() {
            Phase::Completed(result) => {
                assert_eq!(result.average_bpm, 0.0);
                assert_eq!(result.hrv, 0.0);
                assert_eq!(result.risk_level, RiskLevel::High);
                assert_eq!(result.interpretation, INSUFFICIENT_DATA_TEXT);
            }
            other => panic!("expected degraded completion, got {:?}", other),
        }
    }

    #[test]
    fn test_no_signal_completes_degraded() {
        let mut s = session();
        s.start(0.0);
        // Plenty of samples, but a flat signal has no peaks
        for i in 0..80 {
            s.handle_sample(3.1 + i as f64 * 0.1, 128.0);
        }
        assert!(s.tick(33.0));

        assert_eq!(s.begin_analysis(), None);
        match s.phase() {
            Phase::Completed(result) => {
                assert_eq!(result.risk_level, RiskLevel::High);
                assert_eq!(result.interpretation, NO_SIGNAL_TEXT);
            }
            other => panic!("expected degraded completion, got {:?}", other),
        }
    }

    #[test]
    fn test_reset_discards_in_flight_analysis() {
        let mut s = session();
        s.start(0.0);
        let mut t = 3.1;
        while t < 33.0 {
            s.handle_sample(t, waveform(t));
            t += 0.1;
        }
        assert!(s.tick(33.0));
        assert!(s.begin_analysis().is_some());

        // Reset arrives while the interpretation is still pending
        s.reset();
        s.complete("late interpretation".to_string());

        assert_eq!(*s.phase(), Phase::Idle);
        assert_eq!(s.sample_count(), 0);
        assert_eq!(s.current_bpm(), 0.0);
        assert_eq!(s.progress(), 0.0);
    }

    #[test]
    fn test_full_measurement_scenario() {
        let mut s = session();
        s.start(0.0);

        // Frames at 10 Hz from the start; the first three seconds are the
        // stabilization window and must not be buffered
        let mut finished = false;
        let mut steps = 0;
        while !finished {
            let t = steps as f64 * 0.1;
            s.handle_sample(t, waveform(t));
            finished = s.tick(t);
            steps += 1;
            assert!(steps < 400, "session never finished");
        }

        assert_eq!(*s.phase(), Phase::Analyzing);
        assert_eq!(s.sample_count(), 300);
        // Live estimate settled into a plausible range during measuring
        assert!(s.current_bpm() > 60.0 && s.current_bpm() < 90.0);

        let metrics = s.begin_analysis().expect("analysis should succeed");
        assert!((metrics.average_bpm - 72.0).abs() < 2.0);

        s.complete("all quiet".to_string());
        match s.phase() {
            Phase::Completed(result) => {
                assert!((result.average_bpm - 72.0).abs() < 2.0);
                assert_eq!(result.risk_level, RiskLevel::Low);
                assert_eq!(result.interpretation, "all quiet");
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_reset_after_completion_allows_new_run() {
        let mut s = session();
        s.start(0.0);
        s.fail("No camera device available");
        s.reset();

        s.start(100.0);
        assert_eq!(*s.phase(), Phase::Stabilizing);
        s.handle_sample(103.2, 120.0);
        assert_eq!(s.sample_count(), 1);
    }
}
