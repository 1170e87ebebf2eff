//! Preprocessed Sample Types
//!
//! Data structures only - enrichment logic lives in the preprocessor.

use serde::{Deserialize, Serialize};

use crate::telemetry::TelemetrySample;

// ============================================================================
// NORMALIZED VALUES
// ============================================================================

/// Telemetry values clamped into their expected ranges and rescaled to [0,1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedValues {
    pub voltage: f64,
    pub frequency: f64,
    pub power_flow: f64,
}

// ============================================================================
// TEMPORAL FEATURES
// ============================================================================

/// Time-based features derived from the sample timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporalFeatures {
    /// Hour of day, 0-23
    pub hour: u32,
    /// Day of week, 0 = Monday
    pub day_of_week: u32,
    pub is_weekend: bool,
    /// Before 06:00 or from 22:00
    pub is_night: bool,
    /// Unix time in seconds, fractional part preserved
    pub unix_time: f64,
}

// ============================================================================
// DELTA FEATURES
// ============================================================================

/// Change since the previously seen sample. All zeros (and no breaker
/// change) on the very first call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaFeatures {
    pub voltage: f64,
    pub frequency: f64,
    pub power_flow: f64,
    /// Elapsed seconds since the previous sample
    pub time_secs: f64,
    pub breaker_changed: bool,
}

impl DeltaFeatures {
    pub fn zero() -> Self {
        Self { voltage: 0.0, frequency: 0.0, power_flow: 0.0, time_secs: 0.0, breaker_changed: false }
    }
}

// ============================================================================
// PREPROCESSED SAMPLE
// ============================================================================

/// Output of one preprocessing pass: the validated sample plus everything
/// the models consume. Read-only for the models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreprocessedSample {
    /// Validated sample with defaults applied, engineering units
    pub sample: TelemetrySample,
    pub normalized: NormalizedValues,
    pub temporal: TemporalFeatures,
    pub deltas: DeltaFeatures,
}
