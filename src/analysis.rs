//! # Heart Rate Analysis Module
//!
//! Peak detection and the two BPM estimators built on it.
//!
//! ## Operations
//! - `detect_peaks`: local maxima above the window mean, the shared
//!   primitive of both estimators
//! - `analyze`: full post-measurement analysis producing average BPM and
//!   HRV (SDNN) from RR intervals
//! - `realtime_bpm`: coarse live estimate from a short recent window,
//!   smoothed by the caller through `BpmSmoother`
//!
//! Peak detection uses a single static per-window mean threshold with no
//! detrending or bandpass filtering. Baseline drift can under- or
//! over-count peaks; this behavior is kept as-is for compatibility with
//! existing measurements.

use crate::error::AnalysisError;
use crate::timeseries::Sample;

/// Minimum samples before the full analysis is attempted.
pub const MIN_ANALYSIS_SAMPLES: usize = 50;

/// Minimum detected peaks for the full analysis to report a result.
pub const MIN_ANALYSIS_PEAKS: usize = 5;

// Sanity gate for the realtime estimate; values outside are discarded
const REALTIME_BPM_MIN: f64 = 40.0;
const REALTIME_BPM_MAX: f64 = 200.0;

// EMA weights for the live on-screen estimate
const SMOOTHING_PREVIOUS_WEIGHT: f64 = 0.8;
const SMOOTHING_CURRENT_WEIGHT: f64 = 0.2;

/// Numeric outcome of a full analysis; risk classification is a separate
/// step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartMetrics {
    /// Average beats per minute over the analyzed window.
    pub average_bpm: f64,
    /// HRV as SDNN: sample standard deviation of RR intervals in ms.
    pub hrv: f64,
}

/// Indices of local maxima above the window mean.
///
/// An interior index `i` is a peak iff `v[i] > v[i-1]`, `v[i] > v[i+1]` and
/// `v[i] > mean(v)`. The first and last indices are never peaks. The result
/// is strictly increasing by construction.
pub fn detect_peaks(values: &[f64]) -> Vec<usize> {
    if values.len() < 3 {
        return Vec::new();
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;

    let mut peaks = Vec::new();
    for i in 1..values.len() - 1 {
        if values[i] > values[i - 1] && values[i] > values[i + 1] && values[i] > mean {
            peaks.push(i);
        }
    }
    peaks
}

/// Full post-measurement analysis over a sample window.
///
/// Requires at least [`MIN_ANALYSIS_SAMPLES`] samples and
/// [`MIN_ANALYSIS_PEAKS`] detected peaks. RR intervals are the deltas
/// between consecutive peak timestamps in milliseconds; BPM is
/// `60000 / mean(rr)` and HRV is the Bessel-corrected standard deviation
/// of the intervals (SDNN).
pub fn analyze(samples: &[Sample]) -> Result<HeartMetrics, AnalysisError> {
    if samples.len() < MIN_ANALYSIS_SAMPLES {
        return Err(AnalysisError::InsufficientData {
            samples: samples.len(),
        });
    }

    let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
    let peaks = detect_peaks(&values);

    if peaks.len() < MIN_ANALYSIS_PEAKS {
        return Err(AnalysisError::NoSignal { peaks: peaks.len() });
    }

    let rr_intervals: Vec<f64> = peaks
        .windows(2)
        .map(|pair| (samples[pair[1]].timestamp - samples[pair[0]].timestamp) * 1000.0)
        .collect();

    let mean_rr = rr_intervals.iter().sum::<f64>() / rr_intervals.len() as f64;
    let average_bpm = 60_000.0 / mean_rr;

    // SDNN with Bessel's correction; >= 4 intervals is guaranteed by the
    // peak-count precondition
    let variance = rr_intervals
        .iter()
        .map(|rr| (rr - mean_rr).powi(2))
        .sum::<f64>()
        / (rr_intervals.len() - 1) as f64;
    let hrv = variance.sqrt();

    log::debug!(
        "analysis: {} peaks, {} rr intervals, bpm {:.1}, hrv {:.1}",
        peaks.len(),
        rr_intervals.len(),
        average_bpm,
        hrv
    );

    Ok(HeartMetrics { average_bpm, hrv })
}

/// Coarse live BPM estimate over the most recent samples.
///
/// Counts peaks across the window and divides the beat count by the span
/// between the first and last peak. Returns `None` when the window is too
/// short, fewer than three peaks are found, or the estimate falls outside
/// the 40-200 BPM sanity gate; the caller keeps its previous smoothed
/// value in that case.
pub fn realtime_bpm(recent: &[Sample]) -> Option<f64> {
    if recent.len() < 2 {
        return None;
    }

    let values: Vec<f64> = recent.iter().map(|s| s.value).collect();
    let peaks = detect_peaks(&values);

    if peaks.len() <= 2 {
        return None;
    }

    let first_peak_time = recent[peaks[0]].timestamp;
    let last_peak_time = recent[peaks[peaks.len() - 1]].timestamp;
    let duration = last_peak_time - first_peak_time;

    let bpm = (peaks.len() - 1) as f64 / duration * 60.0;

    if bpm > REALTIME_BPM_MIN && bpm < REALTIME_BPM_MAX {
        Some(bpm)
    } else {
        None
    }
}

/// Exponential moving average over successive valid realtime estimates.
///
/// The first valid estimate is adopted directly; each later one is blended
/// as `previous * 0.8 + estimate * 0.2`. An absent estimate leaves the
/// smoothed value unchanged; there is no decay toward zero.
#[derive(Debug, Default)]
pub struct BpmSmoother {
    current: f64,
}

impl BpmSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a new raw estimate and return the smoothed value.
    pub fn update(&mut self, bpm: f64) -> f64 {
        if self.current == 0.0 {
            self.current = bpm;
        } else {
            self.current =
                self.current * SMOOTHING_PREVIOUS_WEIGHT + bpm * SMOOTHING_CURRENT_WEIGHT;
        }
        self.current
    }

    /// Current smoothed BPM, 0.0 until the first valid estimate.
    pub fn value(&self) -> f64 {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = 0.0;
    }
}
