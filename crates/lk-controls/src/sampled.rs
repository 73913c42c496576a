//! Sample period for digital controllers.
//!
//! Controllers are stepped by an external scheduler at a fixed period. The
//! period is known at construction and never changes afterwards; it is used to
//! convert continuous-time gains into per-step gains.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Fixed control period in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SampleTime(f64);

impl SampleTime {
    /// Create a sample time from a period in seconds.
    ///
    /// # Errors
    ///
    /// Returns error if `seconds` is not a positive finite number.
    pub fn new(seconds: f64) -> ControlResult<Self> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "sample time must be positive and finite",
            });
        }
        Ok(Self(seconds))
    }

    /// Create a sample time from the scheduler's tick interval in milliseconds.
    pub fn from_millis(millis: u64) -> ControlResult<Self> {
        Self::new(millis as f64 / 1000.0)
    }

    /// Create a sample time from a frequency in Hz.
    pub fn from_frequency(freq_hz: f64) -> ControlResult<Self> {
        if !freq_hz.is_finite() || freq_hz <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "frequency must be positive and finite",
            });
        }
        Self::new(1.0 / freq_hz)
    }

    /// Period in seconds.
    pub fn seconds(&self) -> f64 {
        self.0
    }

    /// Sample frequency in Hz.
    pub fn frequency(&self) -> f64 {
        1.0 / self.0
    }
}

impl Default for SampleTime {
    fn default() -> Self {
        Self(1.0)
    }
}

impl TryFrom<f64> for SampleTime {
    type Error = ControlError;

    fn try_from(seconds: f64) -> ControlResult<Self> {
        Self::new(seconds)
    }
}

impl From<SampleTime> for f64 {
    fn from(sample_time: SampleTime) -> Self {
        sample_time.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_time_creation() {
        let st = SampleTime::new(0.1).unwrap();
        assert_eq!(st.seconds(), 0.1);
        assert!((st.frequency() - 10.0).abs() < 1e-10);
    }

    #[test]
    fn sample_time_from_millis() {
        let st = SampleTime::from_millis(250).unwrap();
        assert!((st.seconds() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn sample_time_from_frequency() {
        let st = SampleTime::from_frequency(10.0).unwrap();
        assert!((st.seconds() - 0.1).abs() < 1e-10);
    }

    #[test]
    fn invalid_sample_times() {
        assert!(SampleTime::new(0.0).is_err());
        assert!(SampleTime::new(-1.0).is_err());
        assert!(SampleTime::new(f64::NAN).is_err());
        assert!(SampleTime::new(f64::INFINITY).is_err());
        assert!(SampleTime::from_millis(0).is_err());
        assert!(SampleTime::from_frequency(0.0).is_err());
    }

    #[test]
    fn deserialize_rejects_non_positive() {
        assert!(serde_json::from_str::<SampleTime>("0.5").is_ok());
        assert!(serde_json::from_str::<SampleTime>("-0.5").is_err());
    }
}
