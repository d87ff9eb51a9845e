//! # PPG Time Series Storage Module
//!
//! Bounded, time-ordered storage for reflectance samples produced by the
//! frame reducer. One buffer exists per measurement session; it is created
//! empty, appended to during the measuring phase, and cleared on reset.
//!
//! ## Why Bounded
//! Only the most recent 300 samples feed the final analysis (roughly 30
//! seconds of decimated camera frames), so older samples are evicted from
//! the front instead of growing without limit.

/// Capacity of a session's signal buffer.
pub const BUFFER_CAPACITY: usize = 300;

/// A single reflectance sample.
///
/// `timestamp` is in seconds on the session clock, non-decreasing across
/// appends. `value` is a mean red-channel intensity (0-255 for 8-bit input).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: f64,
    pub value: f64,
}

/// Bounded chronological sequence of samples.
///
/// Insertion order is chronological order; samples are never reordered or
/// mutated after insertion.
#[derive(Debug)]
pub struct SignalBuffer {
    data: Vec<Sample>,
    capacity: usize,
}

impl SignalBuffer {
    pub fn new() -> Self {
        Self::with_capacity(BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::new(),
            capacity,
        }
    }

    /// Append a sample at the tail, evicting from the front once the
    /// capacity is exceeded. Evicted samples are dropped, not merged.
    pub fn push(&mut self, sample: Sample) {
        self.data.push(sample);
        if self.data.len() > self.capacity {
            let overflow = self.data.len() - self.capacity;
            self.data.drain(..overflow);
        }
    }

    /// The most recent `n` samples in chronological order, or fewer if the
    /// buffer does not hold that many yet.
    pub fn suffix(&self, n: usize) -> &[Sample] {
        &self.data[self.data.len().saturating_sub(n)..]
    }

    /// Every buffered sample in chronological order.
    pub fn samples(&self) -> &[Sample] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clear to empty, keeping the configured capacity.
    pub fn reset(&mut self) {
        self.data.clear();
    }
}

impl Default for SignalBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(i: usize) -> Sample {
        Sample {
            timestamp: i as f64 * 0.1,
            value: i as f64,
        }
    }

    #[test]
    fn test_push_and_len() {
        let mut buffer = SignalBuffer::new();
        assert!(buffer.is_empty());

        buffer.push(sample(0));
        buffer.push(sample(1));
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.samples()[0].value, 0.0);
        assert_eq!(buffer.samples()[1].value, 1.0);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut buffer = SignalBuffer::new();
        for i in 0..BUFFER_CAPACITY + 1 {
            buffer.push(sample(i));
        }

        assert_eq!(buffer.len(), BUFFER_CAPACITY);
        // Earliest sample is gone, latest is intact, order preserved
        assert_eq!(buffer.samples()[0].value, 1.0);
        assert_eq!(
            buffer.samples()[BUFFER_CAPACITY - 1].value,
            BUFFER_CAPACITY as f64
        );
        for pair in buffer.samples().windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut buffer = SignalBuffer::new();
        for i in 0..1000 {
            buffer.push(sample(i));
            assert!(buffer.len() <= BUFFER_CAPACITY);
        }
        assert_eq!(buffer.samples()[0].value, 700.0);
    }

    #[test]
    fn test_suffix() {
        let mut buffer = SignalBuffer::new();
        for i in 0..10 {
            buffer.push(sample(i));
        }

        let last3 = buffer.suffix(3);
        assert_eq!(last3.len(), 3);
        assert_eq!(last3[0].value, 7.0);
        assert_eq!(last3[2].value, 9.0);

        // Asking for more than is buffered returns everything
        assert_eq!(buffer.suffix(100).len(), 10);
    }

    #[test]
    fn test_reset() {
        let mut buffer = SignalBuffer::new();
        buffer.push(sample(0));
        buffer.reset();
        assert!(buffer.is_empty());
    }
}
