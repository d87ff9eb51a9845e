//! # Risk Classification Module
//!
//! Maps a completed measurement's (BPM, HRV) pair to a three-tier risk
//! category with fixed thresholds. Pure and stateless; evaluated once per
//! completed session.

use serde::{Deserialize, Serialize};

/// Three-tier risk category for a completed measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Classify a (BPM, HRV) pair.
    ///
    /// High is checked first, so a reading that satisfies both the High and
    /// Moderate conditions always reports High.
    pub fn classify(bpm: f64, hrv: f64) -> RiskLevel {
        if bpm < 50.0 || bpm > 110.0 || hrv < 20.0 {
            RiskLevel::High
        } else if bpm < 60.0 || bpm > 100.0 || hrv < 40.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_high() {
        assert_eq!(RiskLevel::classify(40.0, 10.0), RiskLevel::High);
        assert_eq!(RiskLevel::classify(45.0, 80.0), RiskLevel::High);
        assert_eq!(RiskLevel::classify(120.0, 80.0), RiskLevel::High);
        assert_eq!(RiskLevel::classify(70.0, 15.0), RiskLevel::High);
    }

    #[test]
    fn test_classify_moderate() {
        assert_eq!(RiskLevel::classify(55.0, 60.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::classify(105.0, 35.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::classify(70.0, 30.0), RiskLevel::Moderate);
    }

    #[test]
    fn test_classify_low() {
        assert_eq!(RiskLevel::classify(70.0, 50.0), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(60.0, 40.0), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(100.0, 100.0), RiskLevel::Low);
    }

    #[test]
    fn test_high_dominates_moderate() {
        // bpm < 50 reports High even though hrv alone would be Low
        assert_eq!(RiskLevel::classify(30.0, 60.0), RiskLevel::High);
    }

    #[derive(serde::Serialize)]
    struct RiskLevelWrap {
        risk: RiskLevel,
    }

    #[test]
    fn test_serde_string_values() {
        let wrapped = RiskLevelWrap {
            risk: RiskLevel::Low,
        };
        assert_eq!(toml::to_string(&wrapped).unwrap().trim(), "risk = \"Low\"");
    }
}
