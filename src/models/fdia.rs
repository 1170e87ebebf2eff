//! False Data Injection Attack Detection
//!
//! A well-crafted FDIA leaves the state-estimation residual unchanged
//! (z' = z + H·c ⇒ r' = r), so residual checks cannot see it. Detection
//! works on second-order effects instead:
//! - voltage-frequency correlation breakdown
//! - simultaneous jumps across several parameters
//! - unnatural power-voltage coordination

use std::collections::VecDeque;

use serde_json::json;

use crate::config::FdiaConfig;
use crate::preprocess::{PreprocessedSample, TelemetryHistory};

use super::ModelOutput;

/// One remembered (voltage, frequency, power_flow) triple.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FdiaPoint {
    voltage: f64,
    frequency: f64,
    power_flow: f64,
}

/// Correlation- and coordination-based FDIA detector with its own short
/// history of telemetry triples.
#[derive(Debug, Clone)]
pub struct FdiaModel {
    config: FdiaConfig,
    history: VecDeque<FdiaPoint>,
}

impl FdiaModel {
    pub fn new(config: FdiaConfig) -> Self {
        Self { history: VecDeque::with_capacity(config.history_size), config }
    }

    pub fn analyze(&mut self, data: &PreprocessedSample, telemetry: &TelemetryHistory) -> ModelOutput {
        self.update_history(data);

        let mut scores = Vec::new();
        let mut indicators = Vec::new();

        if let Some((score, reason)) = self.check_correlation_mismatch(telemetry) {
            scores.push(score);
            indicators.push(reason);
        }

        if let Some((score, reason)) = self.check_temporal_consistency(data) {
            scores.push(score);
            indicators.push(reason);
        }

        if let Some((score, reason)) = self.check_multi_signal_coordination(data) {
            scores.push(score);
            indicators.push(reason);
        }

        if scores.is_empty() {
            return ModelOutput::new(
                0.0,
                0.85,
                "No FDIA indicators detected",
                json!({
                    "checks_performed": 3,
                    "indicators_found": 0,
                }),
            );
        }

        // Indicators corroborate each other: average, not max
        let final_score = scores.iter().sum::<f64>() / scores.len() as f64;
        let confidence = (0.7 + indicators.len() as f64 * 0.1).min(0.95);

        let primary_reason = if indicators.len() == 1 {
            indicators[0].clone()
        } else {
            "Coordinated false data injection detected".to_string()
        };

        ModelOutput::new(
            final_score,
            confidence,
            primary_reason,
            json!({
                "checks_performed": 3,
                "indicators_found": indicators.len(),
                "all_indicators": indicators,
            }),
        )
    }

    /// In normal operation corr(V, f) stays near the configured baseline
    /// (~0.85). Coordinated injection breaks the coupling.
    fn check_correlation_mismatch(&self, telemetry: &TelemetryHistory) -> Option<(f64, String)> {
        if telemetry.len() < 5 {
            return None;
        }

        let window: Vec<(f64, f64)> = telemetry
            .recent(self.config.temporal_window)
            .map(|s| (s.voltage, s.frequency))
            .collect();

        let voltages: Vec<f64> = window.iter().map(|(v, _)| *v).collect();
        let frequencies: Vec<f64> = window.iter().map(|(_, f)| *f).collect();

        let correlation = pearson_correlation(&voltages, &frequencies);
        let threshold = self.config.correlation_threshold;

        if correlation < threshold {
            let score = 1.0 - correlation / threshold;
            let reason = format!(
                "V-f correlation breakdown ({:.2} vs expected {:.2})",
                correlation, self.config.normal_correlation
            );
            return Some((score, reason));
        }

        None
    }

    /// Simultaneous significant jumps across two or more parameters.
    fn check_temporal_consistency(&self, data: &PreprocessedSample) -> Option<(f64, String)> {
        let significant_changes = [
            data.deltas.voltage.abs() > 0.05,
            data.deltas.frequency.abs() > 0.2,
            data.deltas.power_flow.abs() > 10.0,
        ]
        .iter()
        .filter(|&&changed| changed)
        .count();

        if significant_changes >= 2 {
            let score = (significant_changes as f64 / 3.0 + 0.3).min(1.0);
            let reason = format!(
                "Coordinated parameter changes detected ({} simultaneous)",
                significant_changes
            );
            return Some((score, reason));
        }

        None
    }

    /// Power should follow voltage naturally (ΔP ≈ 2·ΔV in this grid's
    /// operating region). Opposite movement or a ratio off by more than 3x
    /// points to injected values.
    fn check_multi_signal_coordination(&self, data: &PreprocessedSample) -> Option<(f64, String)> {
        if self.history.len() < 3 {
            return None;
        }

        let delta_v = data.deltas.voltage;
        let delta_p = data.deltas.power_flow;

        if delta_v.abs() > 0.03 && delta_p.abs() > 5.0 {
            if delta_v.signum() != delta_p.signum() {
                return Some((
                    0.7,
                    "Power-voltage coordination anomaly (opposite directions)".to_string(),
                ));
            }

            let expected_ratio = 2.0;
            let actual_ratio = if delta_v != 0.0 { (delta_p / delta_v).abs() } else { 0.0 };

            if actual_ratio > expected_ratio * 3.0 || actual_ratio < expected_ratio / 3.0 {
                return Some((
                    0.6,
                    "Suspicious power-voltage magnitude coordination".to_string(),
                ));
            }
        }

        None
    }

    fn update_history(&mut self, data: &PreprocessedSample) {
        while self.history.len() >= self.config.history_size {
            self.history.pop_front();
        }
        self.history.push_back(FdiaPoint {
            voltage: data.sample.voltage,
            frequency: data.sample.frequency,
            power_flow: data.sample.power_flow,
        });
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn info(&self) -> serde_json::Value {
        json!({
            "name": "FDIA Detection",
            "type": "correlation_analysis",
            "methods": ["correlation_mismatch", "temporal_consistency", "multi_signal_coordination"],
            "config": self.config,
        })
    }
}

/// Absolute Pearson correlation coefficient; zero for degenerate inputs
/// (mismatched/short series, or either series constant).
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let numerator: f64 = x.iter().zip(y).map(|(a, b)| (a - mean_x) * (b - mean_y)).sum();
    let sum_sq_x: f64 = x.iter().map(|a| (a - mean_x) * (a - mean_x)).sum();
    let sum_sq_y: f64 = y.iter().map(|b| (b - mean_y) * (b - mean_y)).sum();

    let denominator = (sum_sq_x * sum_sq_y).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    (numerator / denominator).abs()
}

// ============================================================================
// TESTS
// ============================================================================
