//! Telemetry History - bounded FIFO with rolling statistics
//!
//! Fixed-capacity ring buffer; the oldest sample is evicted first. Rolling
//! mean and population standard deviation are derived on demand, never
//! persisted.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::telemetry::{TelemetryField, TelemetrySample};

// ============================================================================
// ROLLING STATISTICS
// ============================================================================

/// Rolling (mean, population std-dev) over a window of history samples.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RollingStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Rolling statistics for all three telemetry fields over one window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldStats {
    pub voltage: RollingStats,
    pub frequency: RollingStats,
    pub power_flow: RollingStats,
}

impl FieldStats {
    pub fn get(&self, field: TelemetryField) -> RollingStats {
        match field {
            TelemetryField::Voltage => self.voltage,
            TelemetryField::Frequency => self.frequency,
            TelemetryField::PowerFlow => self.power_flow,
        }
    }
}

// ============================================================================
// HISTORY BUFFER
// ============================================================================

/// Bounded FIFO of past telemetry samples.
#[derive(Debug, Clone)]
pub struct TelemetryHistory {
    samples: VecDeque<TelemetrySample>,
    capacity: usize,
}

impl TelemetryHistory {
    pub fn new(capacity: usize) -> Self {
        Self { samples: VecDeque::with_capacity(capacity), capacity }
    }

    /// Append a sample, evicting the oldest when at capacity.
    pub fn push(&mut self, sample: TelemetrySample) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.samples.iter()
    }

    /// The most recent `n` samples, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &TelemetrySample> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Rolling mean and population standard deviation of one field over the
    /// last `window` samples. Returns zeros when fewer than 2 samples exist.
    pub fn rolling_statistics(&self, field: TelemetryField, window: usize) -> RollingStats {
        if self.samples.len() < 2 {
            return RollingStats::default();
        }

        let values: Vec<f64> = self.recent(window).map(|s| field.value_of(s)).collect();
        let n = values.len() as f64;

        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

        RollingStats { mean, std_dev: variance.sqrt() }
    }

    /// Rolling statistics for all fields over one window.
    pub fn field_stats(&self, window: usize) -> FieldStats {
        FieldStats {
            voltage: self.rolling_statistics(TelemetryField::Voltage, window),
            frequency: self.rolling_statistics(TelemetryField::Frequency, window),
            power_flow: self.rolling_statistics(TelemetryField::PowerFlow, window),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::BreakerStatus;
    use chrono::{TimeZone, Utc};

    fn sample(voltage: f64) -> TelemetrySample {
        TelemetrySample {
            voltage,
            frequency: 50.0,
            power_flow: 100.0,
            breaker_status: BreakerStatus::On,
            timestamp: Utc.with_ymd_and_hms(2026, 2, 3, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_capacity_evicts_oldest_first() {
        let mut history = TelemetryHistory::new(3);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            history.push(sample(v));
        }

        assert_eq!(history.len(), 3);
        let values: Vec<f64> = history.iter().map(|s| s.voltage).collect();
        assert_eq!(values, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_rolling_statistics_needs_two_samples() {
        let mut history = TelemetryHistory::new(10);
        assert_eq!(history.rolling_statistics(TelemetryField::Voltage, 5), RollingStats::default());

        history.push(sample(1.0));
        assert_eq!(history.rolling_statistics(TelemetryField::Voltage, 5), RollingStats::default());

        history.push(sample(1.0));
        let stats = history.rolling_statistics(TelemetryField::Voltage, 5);
        assert!((stats.mean - 1.0).abs() < 1e-12);
        assert!(stats.std_dev.abs() < 1e-12);
    }

    #[test]
    fn test_rolling_statistics_population_std() {
        let mut history = TelemetryHistory::new(10);
        history.push(sample(1.0));
        history.push(sample(3.0));

        let stats = history.rolling_statistics(TelemetryField::Voltage, 10);
        assert!((stats.mean - 2.0).abs() < 1e-12);
        // population std of [1, 3] is 1
        assert!((stats.std_dev - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_statistics_respects_window() {
        let mut history = TelemetryHistory::new(10);
        for v in [10.0, 1.0, 1.0, 1.0] {
            history.push(sample(v));
        }

        // Window of 3 skips the initial 10.0
        let stats = history.rolling_statistics(TelemetryField::Voltage, 3);
        assert!((stats.mean - 1.0).abs() < 1e-12);
        assert!(stats.std_dev.abs() < 1e-12);
    }
}
