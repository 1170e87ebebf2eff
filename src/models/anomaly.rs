//! Statistical Anomaly Detection
//!
//! Flags telemetry values that deviate from their rolling history, using
//! z-scores and relative deviation. Stateless: the rolling statistics come
//! from the shared telemetry history.

use serde_json::json;

use crate::config::AnomalyConfig;
use crate::preprocess::{FieldStats, PreprocessedSample, RollingStats};
use crate::telemetry::TelemetryField;

use super::ModelOutput;

/// Z-score and deviation-ratio anomaly scoring over the three telemetry
/// channels.
#[derive(Debug, Clone)]
pub struct AnomalyModel {
    config: AnomalyConfig,
}

impl AnomalyModel {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, data: &PreprocessedSample, stats: &FieldStats) -> ModelOutput {
        let mut scores = Vec::new();
        let mut reasons = Vec::new();

        for field in TelemetryField::ALL {
            let value = field.value_of(&data.sample);
            if let Some((score, reason)) = self.evaluate_field(field, value, stats.get(field)) {
                scores.push(score);
                reasons.push(reason);
            }
        }

        if scores.is_empty() {
            return ModelOutput::new(
                0.0,
                0.95,
                "All parameters within normal statistical range",
                json!({
                    "anomalies_detected": 0,
                    "fields_checked": TelemetryField::ALL.len(),
                }),
            );
        }

        // Overall score is the worst single field
        let final_score = scores.iter().cloned().fold(0.0, f64::max);
        let confidence = (0.6 + scores.len() as f64 * 0.15).min(0.95);

        let mut primary_reason = reasons[0].clone();
        if reasons.len() > 1 {
            primary_reason.push_str(&format!(" ({} anomalies total)", reasons.len()));
        }

        ModelOutput::new(
            final_score,
            confidence,
            primary_reason,
            json!({
                "anomalies_detected": scores.len(),
                "all_reasons": reasons,
                "fields_checked": TelemetryField::ALL.len(),
            }),
        )
    }

    /// Returns `(score, reason)` when the field is anomalous. The z-score
    /// check takes precedence over the deviation-ratio check.
    fn evaluate_field(
        &self,
        field: TelemetryField,
        value: f64,
        stats: RollingStats,
    ) -> Option<(f64, String)> {
        let z_score = z_score(value, stats.mean, stats.std_dev);
        let deviation = deviation_ratio(value, stats.mean);

        let z_threshold = self.config.z_score_threshold;
        if z_score > z_threshold {
            let score = (z_score / (z_threshold * 2.0)).min(1.0);
            let reason = format!("{} deviation {:.1}σ from rolling mean", field.display_name(), z_score);
            return Some((score, reason));
        }

        let dev_threshold = self.config.deviation_threshold;
        if deviation > dev_threshold {
            let score = (deviation / (dev_threshold * 2.0)).min(1.0);
            let reason = format!(
                "{} deviated {:.1}% from expected",
                field.display_name(),
                deviation * 100.0
            );
            return Some((score, reason));
        }

        None
    }

    pub fn info(&self) -> serde_json::Value {
        json!({
            "name": "Statistical Anomaly Detection",
            "type": "statistical",
            "methods": ["z_score", "deviation_ratio", "rolling_statistics"],
            "config": self.config,
        })
    }
}

/// z = |x - μ| / σ, zero when σ is zero.
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        return 0.0;
    }
    (value - mean).abs() / std_dev
}

/// |x - μ| / |μ|, zero when μ is zero.
pub fn deviation_ratio(value: f64, mean: f64) -> f64 {
    if mean == 0.0 {
        return 0.0;
    }
    (value - mean).abs() / mean.abs()
}

// ============================================================================
// TESTS
// ============================================================================
