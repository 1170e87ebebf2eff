//! Preprocessing - validation, defaults, normalization, feature derivation
//!
//! One pass per incoming sample:
//! 1. Validate the raw input (presence and typing rules)
//! 2. Fill missing fields with configured defaults
//! 3. Clamp numeric fields into expected ranges, rescale to [0,1]
//! 4. Derive temporal features from the timestamp
//! 5. Compute deltas against the previously seen sample
//! 6. Append the pre-normalization sample to the bounded history

pub mod history;
pub mod types;

pub use history::{FieldStats, RollingStats, TelemetryHistory};
pub use types::{DeltaFeatures, NormalizedValues, PreprocessedSample, TemporalFeatures};

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};

use crate::config::PreprocessConfig;
use crate::error::ValidationError;
use crate::telemetry::{BreakerStatus, RawTelemetry, TelemetryField, TelemetrySample};

// ============================================================================
// PREPROCESSOR
// ============================================================================

/// Stateful preprocessor: owns the telemetry history and the last-sample
/// pointer used for delta computation.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PreprocessConfig,
    history: TelemetryHistory,
    last_sample: Option<TelemetrySample>,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig, history_capacity: usize) -> Self {
        Self { config, history: TelemetryHistory::new(history_capacity), last_sample: None }
    }

    /// Validate and enrich one raw sample. The returned sample is consumed
    /// read-only by the scoring models.
    pub fn preprocess(&mut self, raw: &RawTelemetry) -> Result<PreprocessedSample, ValidationError> {
        if !raw.has_telemetry() {
            return Err(ValidationError::NoTelemetryFields);
        }

        let breaker_status = match raw.breaker_status.as_deref() {
            Some(s) => BreakerStatus::parse(s)?,
            None => BreakerStatus::Off,
        };

        let timestamp = raw
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);

        let sample = TelemetrySample {
            voltage: raw.voltage.unwrap_or(self.config.default_voltage),
            frequency: raw.frequency.unwrap_or(self.config.default_frequency),
            power_flow: raw.power_flow.unwrap_or(self.config.default_power_flow),
            breaker_status,
            timestamp,
        };

        let normalized = self.normalize(&sample);
        let temporal = extract_temporal_features(timestamp);
        let deltas = self.compute_deltas(&sample);

        self.history.push(sample);
        self.last_sample = Some(sample);

        Ok(PreprocessedSample { sample, normalized, temporal, deltas })
    }

    fn normalize(&self, sample: &TelemetrySample) -> NormalizedValues {
        NormalizedValues {
            voltage: normalize_value(sample.voltage, self.config.voltage_range),
            frequency: normalize_value(sample.frequency, self.config.frequency_range),
            power_flow: normalize_value(sample.power_flow, self.config.power_range),
        }
    }

    fn compute_deltas(&self, sample: &TelemetrySample) -> DeltaFeatures {
        let last = match &self.last_sample {
            Some(last) => last,
            None => return DeltaFeatures::zero(),
        };

        let elapsed = sample
            .timestamp
            .signed_duration_since(last.timestamp)
            .num_milliseconds() as f64
            / 1000.0;

        DeltaFeatures {
            voltage: sample.voltage - last.voltage,
            frequency: sample.frequency - last.frequency,
            power_flow: sample.power_flow - last.power_flow,
            time_secs: elapsed,
            breaker_changed: sample.breaker_status != last.breaker_status,
        }
    }

    /// Rolling statistics of one field over the last `window` samples.
    pub fn rolling_statistics(&self, field: TelemetryField, window: usize) -> RollingStats {
        self.history.rolling_statistics(field, window)
    }

    /// Rolling statistics for all fields over one window.
    pub fn field_stats(&self, window: usize) -> FieldStats {
        self.history.field_stats(window)
    }

    pub fn history(&self) -> &TelemetryHistory {
        &self.history
    }

    /// Clear all history-bearing state.
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_sample = None;
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Clamp a value into `(min, max)` and rescale to [0,1].
pub fn normalize_value(value: f64, range: (f64, f64)) -> f64 {
    let (min, max) = range;
    let clamped = value.clamp(min, max);
    (clamped - min) / (max - min)
}

/// Parse an ISO-8601 timestamp, with or without an offset. Offset-less
/// timestamps are taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn extract_temporal_features(timestamp: DateTime<Utc>) -> TemporalFeatures {
    let hour = timestamp.hour();
    let day_of_week = timestamp.weekday().num_days_from_monday();

    TemporalFeatures {
        hour,
        day_of_week,
        is_weekend: day_of_week >= 5,
        is_night: hour < 6 || hour >= 22,
        unix_time: timestamp.timestamp_micros() as f64 / 1e6,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn preprocessor() -> Preprocessor {
        Preprocessor::new(PreprocessConfig::default(), 100)
    }

    fn raw(voltage: f64, frequency: f64, power: f64, breaker: &str, ts: &str) -> RawTelemetry {
        RawTelemetry {
            voltage: Some(voltage),
            frequency: Some(frequency),
            power_flow: Some(power),
            breaker_status: Some(breaker.to_string()),
            timestamp: Some(ts.to_string()),
        }
    }

    #[test]
    fn test_rejects_empty_telemetry() {
        let mut pre = preprocessor();
        let result = pre.preprocess(&RawTelemetry {
            breaker_status: Some("ON".to_string()),
            ..Default::default()
        });
        assert_eq!(result, Err(ValidationError::NoTelemetryFields));
        assert_eq!(pre.history().len(), 0);
    }

    #[test]
    fn test_rejects_invalid_breaker() {
        let mut pre = preprocessor();
        let result = pre.preprocess(&RawTelemetry {
            voltage: Some(1.0),
            breaker_status: Some("HALF".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(ValidationError::InvalidBreakerStatus { .. })));
    }

    #[test]
    fn test_fills_defaults() {
        let mut pre = preprocessor();
        let out = pre
            .preprocess(&RawTelemetry { voltage: Some(1.02), ..Default::default() })
            .unwrap();

        assert_eq!(out.sample.frequency, 50.0);
        assert_eq!(out.sample.power_flow, 0.0);
        assert_eq!(out.sample.breaker_status, BreakerStatus::Off);
    }

    #[test]
    fn test_normalization_clamps_and_scales() {
        let mut pre = preprocessor();
        // Voltage range is 0.8-1.2 so 1.0 lands mid-scale; 300 MW clamps to
        // the top of the 0-200 power range
        let out = pre.preprocess(&raw(1.0, 49.0, 300.0, "ON", "2026-02-03T10:00:00")).unwrap();
        assert!((out.normalized.voltage - 0.5).abs() < 1e-12);
        assert!((out.normalized.frequency - 0.0).abs() < 1e-12);
        assert!((out.normalized.power_flow - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_call_has_zero_deltas() {
        let mut pre = preprocessor();
        let out = pre.preprocess(&raw(1.0, 50.0, 100.0, "ON", "2026-02-03T10:00:00")).unwrap();
        assert_eq!(out.deltas, DeltaFeatures::zero());
    }

    #[test]
    fn test_deltas_against_previous_sample() {
        let mut pre = preprocessor();
        pre.preprocess(&raw(1.0, 50.0, 100.0, "ON", "2026-02-03T10:00:00")).unwrap();
        let out = pre.preprocess(&raw(1.05, 50.2, 90.0, "OFF", "2026-02-03T10:00:10")).unwrap();

        assert!((out.deltas.voltage - 0.05).abs() < 1e-12);
        assert!((out.deltas.frequency - 0.2).abs() < 1e-12);
        assert!((out.deltas.power_flow + 10.0).abs() < 1e-12);
        assert!((out.deltas.time_secs - 10.0).abs() < 1e-9);
        assert!(out.deltas.breaker_changed);
    }

    #[test]
    fn test_temporal_features() {
        let mut pre = preprocessor();
        // 2026-02-01 is a Sunday; 02:30 is night
        let out = pre.preprocess(&raw(1.0, 50.0, 100.0, "ON", "2026-02-01T02:30:00")).unwrap();
        assert_eq!(out.temporal.hour, 2);
        assert_eq!(out.temporal.day_of_week, 6);
        assert!(out.temporal.is_weekend);
        assert!(out.temporal.is_night);
    }

    #[test]
    fn test_unparseable_timestamp_falls_back_to_now() {
        let mut pre = preprocessor();
        let before = Utc::now();
        let out = pre
            .preprocess(&RawTelemetry {
                voltage: Some(1.0),
                timestamp: Some("yesterday-ish".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(out.sample.timestamp >= before);
    }

    #[test]
    fn test_reset_clears_history_and_last_sample() {
        let mut pre = preprocessor();
        pre.preprocess(&raw(1.0, 50.0, 100.0, "ON", "2026-02-03T10:00:00")).unwrap();
        pre.reset();

        assert_eq!(pre.history().len(), 0);
        // Deltas behave like a fresh first call again
        let out = pre.preprocess(&raw(1.1, 50.0, 100.0, "ON", "2026-02-03T10:00:30")).unwrap();
        assert_eq!(out.deltas, DeltaFeatures::zero());
    }

    #[test]
    fn test_normalize_value_helper() {
        assert_eq!(normalize_value(0.8, (0.8, 1.2)), 0.0);
        assert_eq!(normalize_value(1.2, (0.8, 1.2)), 1.0);
        assert_eq!(normalize_value(2.0, (0.8, 1.2)), 1.0);
        assert!((normalize_value(1.0, (0.8, 1.2)) - 0.5).abs() < 1e-12);
    }
}
