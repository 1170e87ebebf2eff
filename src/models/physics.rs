//! Physics-Aware Validation
//!
//! Validates telemetry against hard physical laws of a power system. A
//! violated law cannot be explained by grid dynamics - it indicates cyber
//! manipulation, which is why these checks carry fixed high confidence.
//!
//! Laws enforced:
//! 1. Breaker OFF ⇒ no power flow
//! 2. Voltage inside operating band
//! 3. Frequency inside operating band
//! 4. Power trend follows voltage trend
//! 5. No impossibilities (frequency/power without voltage, extreme RoCoF)

use serde_json::json;

use crate::config::PhysicsConfig;
use crate::preprocess::PreprocessedSample;
use crate::telemetry::BreakerStatus;

use super::ModelOutput;

/// Stateless physical-law validator.
#[derive(Debug, Clone)]
pub struct PhysicsModel {
    config: PhysicsConfig,
}

impl PhysicsModel {
    pub fn new(config: PhysicsConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, data: &PreprocessedSample) -> ModelOutput {
        let checks = [
            self.check_breaker_power_consistency(data),
            self.check_voltage_bounds(data),
            self.check_frequency_bounds(data),
            self.check_power_voltage_causality(data),
            self.check_physical_impossibilities(data),
        ];

        let mut scores = Vec::new();
        let mut violations = Vec::new();
        for check in checks.into_iter().flatten() {
            scores.push(check.0);
            violations.push(check.1);
        }

        if violations.is_empty() {
            return ModelOutput::new(
                0.0,
                0.98,
                "All physics constraints satisfied",
                json!({
                    "checks_performed": 5,
                    "violations_found": 0,
                }),
            );
        }

        let final_score = scores.iter().cloned().fold(0.0, f64::max);

        let mut primary_reason = violations[0].clone();
        if violations.len() > 1 {
            primary_reason.push_str(&format!(" (+{} more violations)", violations.len() - 1));
        }

        ModelOutput::new(
            final_score,
            0.95,
            primary_reason,
            json!({
                "checks_performed": 5,
                "violations_found": violations.len(),
                "all_violations": violations,
            }),
        )
    }

    /// Breaker OFF ⇒ power_flow ≈ 0. Anything above the measurement-noise
    /// tolerance is physically impossible.
    fn check_breaker_power_consistency(&self, data: &PreprocessedSample) -> Option<(f64, String)> {
        let sample = &data.sample;
        if sample.breaker_status == BreakerStatus::Off
            && sample.power_flow.abs() > self.config.breaker_off_power_tolerance
        {
            return Some((
                1.0,
                format!("CRITICAL: Power flow {:.2} MW with breaker OFF", sample.power_flow),
            ));
        }
        None
    }

    fn check_voltage_bounds(&self, data: &PreprocessedSample) -> Option<(f64, String)> {
        let voltage = data.sample.voltage;
        let (v_min, v_max) = (self.config.voltage_min, self.config.voltage_max);

        if voltage < v_min {
            let deviation = (v_min - voltage) / v_min;
            let score = (deviation * 5.0).min(1.0);
            return Some((
                score,
                format!("Voltage {voltage:.3} p.u. below physical minimum {v_min}"),
            ));
        }

        if voltage > v_max {
            let deviation = (voltage - v_max) / v_max;
            let score = (deviation * 5.0).min(1.0);
            return Some((
                score,
                format!("Voltage {voltage:.3} p.u. exceeds physical maximum {v_max}"),
            ));
        }

        None
    }

    fn check_frequency_bounds(&self, data: &PreprocessedSample) -> Option<(f64, String)> {
        let frequency = data.sample.frequency;
        let (f_min, f_max) = (self.config.frequency_min, self.config.frequency_max);

        if frequency < f_min {
            let deviation = (f_min - frequency) / f_min;
            let score = (deviation * 10.0).min(1.0);
            return Some((
                score,
                format!("Frequency {frequency:.2} Hz below physical minimum {f_min}"),
            ));
        }

        if frequency > f_max {
            let deviation = (frequency - f_max) / f_max;
            let score = (deviation * 10.0).min(1.0);
            return Some((
                score,
                format!("Frequency {frequency:.2} Hz exceeds physical maximum {f_max}"),
            ));
        }

        None
    }

    /// P ∝ V² in the operating region: when both move materially, they must
    /// move the same way.
    fn check_power_voltage_causality(&self, data: &PreprocessedSample) -> Option<(f64, String)> {
        let delta_v = data.deltas.voltage;
        let delta_p = data.deltas.power_flow;

        if delta_v.abs() > 0.02 && delta_p.abs() > 3.0 && delta_v.signum() != delta_p.signum() {
            return Some((0.6, "Power-voltage causality violation (opposite trends)".to_string()));
        }

        None
    }

    fn check_physical_impossibilities(&self, data: &PreprocessedSample) -> Option<(f64, String)> {
        let sample = &data.sample;

        // Frequency or power cannot exist on a dead bus
        if sample.voltage < 0.01 && sample.frequency > 1.0 {
            return Some((1.0, "CRITICAL: Frequency exists without voltage (impossible)".to_string()));
        }
        if sample.voltage < 0.01 && sample.power_flow.abs() > 1.0 {
            return Some((1.0, "CRITICAL: Power flow without voltage (impossible)".to_string()));
        }

        // Rate of change of frequency beyond machine inertia
        let delta_t = data.deltas.time_secs;
        if delta_t > 0.0 {
            let freq_rate = data.deltas.frequency.abs() / delta_t;
            if freq_rate > self.config.max_frequency_rate {
                return Some((
                    0.8,
                    format!("Physically impossible frequency rate of change: {freq_rate:.2} Hz/s"),
                ));
            }
        }

        None
    }

    pub fn info(&self) -> serde_json::Value {
        json!({
            "name": "Physics-Aware Validation",
            "type": "physics_validation",
            "methods": [
                "breaker_power_consistency",
                "voltage_bounds",
                "frequency_bounds",
                "power_voltage_causality",
                "physical_impossibilities",
            ],
            "config": self.config,
        })
    }
}

/// Quick physics validation for callers that only need a pass/fail answer.
pub fn quick_physics_check(
    voltage: f64,
    frequency: f64,
    power_flow: f64,
    breaker_status: BreakerStatus,
) -> Result<(), String> {
    let config = PhysicsConfig::default();

    if breaker_status == BreakerStatus::Off
        && power_flow.abs() > config.breaker_off_power_tolerance
    {
        return Err("Power flowing through open breaker".to_string());
    }

    if voltage < config.voltage_min || voltage > config.voltage_max {
        return Err(format!("Voltage {voltage} out of bounds"));
    }

    if frequency < config.frequency_min || frequency > config.frequency_max {
        return Err(format!("Frequency {frequency} out of bounds"));
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::{DeltaFeatures, NormalizedValues, PreprocessedSample, TemporalFeatures};
    use crate::telemetry::TelemetrySample;
    use chrono::{TimeZone, Utc};

    fn sample(
        voltage: f64,
        frequency: f64,
        power: f64,
        breaker: BreakerStatus,
        deltas: DeltaFeatures,
    ) -> PreprocessedSample {
        let timestamp = Utc.with_ymd_and_hms(2026, 2, 3, 10, 0, 0).unwrap();
        PreprocessedSample {
            sample: TelemetrySample {
                voltage,
                frequency,
                power_flow: power,
                breaker_status: breaker,
                timestamp,
            },
            normalized: NormalizedValues { voltage: 0.5, frequency: 0.5, power_flow: 0.5 },
            temporal: TemporalFeatures {
                hour: 10,
                day_of_week: 1,
                is_weekend: false,
                is_night: false,
                unix_time: timestamp.timestamp() as f64,
            },
            deltas,
        }
    }

    #[test]
    fn test_nominal_sample_passes_all_checks() {
        let model = PhysicsModel::new(PhysicsConfig::default());
        let out = model.analyze(&sample(1.0, 50.0, 100.0, BreakerStatus::On, DeltaFeatures::zero()));
        assert_eq!(out.score, 0.0);
        assert_eq!(out.confidence, 0.98);
    }

    #[test]
    fn test_breaker_off_with_power_is_critical() {
        let model = PhysicsModel::new(PhysicsConfig::default());
        let out = model.analyze(&sample(1.0, 50.0, 50.0, BreakerStatus::Off, DeltaFeatures::zero()));
        assert_eq!(out.score, 1.0);
        assert_eq!(out.confidence, 0.95);
        assert!(out.reason.contains("breaker OFF"));
    }

    #[test]
    fn test_breaker_off_within_tolerance_is_fine() {
        let model = PhysicsModel::new(PhysicsConfig::default());
        let out =
            model.analyze(&sample(1.0, 50.0, 0.005, BreakerStatus::Off, DeltaFeatures::zero()));
        assert_eq!(out.score, 0.0);
    }

    #[test]
    fn test_voltage_bound_violations_scale_with_deviation() {
        let model = PhysicsModel::new(PhysicsConfig::default());

        let slight =
            model.analyze(&sample(1.06, 50.0, 100.0, BreakerStatus::On, DeltaFeatures::zero()));
        let severe =
            model.analyze(&sample(1.20, 50.0, 100.0, BreakerStatus::On, DeltaFeatures::zero()));

        assert!(slight.score > 0.0);
        assert!(severe.score > slight.score);
        assert!(slight.reason.contains("exceeds physical maximum"));

        let under =
            model.analyze(&sample(0.90, 50.0, 100.0, BreakerStatus::On, DeltaFeatures::zero()));
        assert!(under.score > 0.0);
        assert!(under.reason.contains("below physical minimum"));
    }

    #[test]
    fn test_frequency_bound_violation() {
        let model = PhysicsModel::new(PhysicsConfig::default());
        let out = model.analyze(&sample(1.0, 51.0, 100.0, BreakerStatus::On, DeltaFeatures::zero()));
        // deviation = 0.5/50.5, score = min(1, dev*10) ≈ 0.099
        assert!(out.score > 0.0);
        assert!(out.reason.contains("Hz"));
    }

    #[test]
    fn test_causality_violation_on_opposite_trends() {
        let model = PhysicsModel::new(PhysicsConfig::default());
        let deltas = DeltaFeatures {
            voltage: 0.03,
            frequency: 0.0,
            power_flow: -5.0,
            time_secs: 5.0,
            breaker_changed: false,
        };
        let out = model.analyze(&sample(1.0, 50.0, 95.0, BreakerStatus::On, deltas));
        assert!((out.score - 0.6).abs() < 1e-12);
        assert!(out.reason.contains("causality"));
    }

    #[test]
    fn test_dead_bus_impossibilities() {
        let model = PhysicsModel::new(PhysicsConfig::default());

        let out = model.analyze(&sample(0.0, 50.0, 0.0, BreakerStatus::Off, DeltaFeatures::zero()));
        assert_eq!(out.score, 1.0);
        // The voltage-bound check also fires on a dead bus; the
        // impossibility shows up in the violation list
        let violations = out.details["all_violations"].as_array().unwrap();
        assert!(violations
            .iter()
            .any(|v| v.as_str().unwrap().contains("Frequency exists without voltage")));
    }

    #[test]
    fn test_extreme_frequency_rate() {
        let model = PhysicsModel::new(PhysicsConfig::default());
        let deltas = DeltaFeatures {
            voltage: 0.0,
            frequency: 0.9,
            power_flow: 0.0,
            time_secs: 0.2, // 4.5 Hz/s
            breaker_changed: false,
        };
        let out = model.analyze(&sample(1.0, 50.4, 100.0, BreakerStatus::On, deltas));
        assert!((out.score - 0.8).abs() < 1e-12);
        assert!(out.reason.contains("rate of change"));
    }

    #[test]
    fn test_multiple_violations_report_count_and_max() {
        let model = PhysicsModel::new(PhysicsConfig::default());
        // Breaker OFF with power AND voltage out of bounds
        let out = model.analyze(&sample(1.2, 50.0, 80.0, BreakerStatus::Off, DeltaFeatures::zero()));
        assert_eq!(out.score, 1.0);
        assert!(out.reason.contains("more violations"));
        assert_eq!(out.details["violations_found"], 2);
    }

    #[test]
    fn test_quick_physics_check() {
        assert!(quick_physics_check(1.0, 50.0, 100.0, BreakerStatus::On).is_ok());
        assert!(quick_physics_check(1.0, 50.0, 10.0, BreakerStatus::Off).is_err());
        assert!(quick_physics_check(1.2, 50.0, 100.0, BreakerStatus::On).is_err());
        assert!(quick_physics_check(1.0, 48.0, 100.0, BreakerStatus::On).is_err());
    }
}
