//! # Interpretation Service Seam
//!
//! The interpretation text service is an external collaborator: given a
//! completed measurement's (BPM, HRV) pair it asynchronously produces a
//! human-readable explanation. It is called once per completed session,
//! best-effort; when it fails, the numeric result is delivered unchanged
//! with [`FALLBACK_INTERPRETATION`] as the text.

use crate::error::InterpretationError;
use std::future::Future;

/// Text merged into the result when the interpretation service fails.
pub const FALLBACK_INTERPRETATION: &str =
    "An automatic interpretation is currently unavailable. Your measured values are shown \
     unchanged. This is not a medical device; consult a medical professional for any health \
     concerns.";

/// Produces an explanation string for a completed measurement.
///
/// The returned future is resolved on the monitor's worker thread, so a
/// failing or slow service can never corrupt the numeric result; the worst
/// case is fallback text.
pub trait Interpreter {
    fn interpret(
        &self,
        bpm: f64,
        hrv: f64,
    ) -> impl Future<Output = Result<String, InterpretationError>> + Send;
}

/// Interpreter for offline use: always reports the service as unavailable,
/// which makes every result carry the fallback text.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInterpretation;

impl Interpreter for NoInterpretation {
    async fn interpret(&self, _bpm: f64, _hrv: f64) -> Result<String, InterpretationError> {
        Err(InterpretationError::Unavailable)
    }
}
