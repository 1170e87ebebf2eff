//! End-to-end pipeline scenarios.
//!
//! Each scenario drives the full preprocess → models → fusion path the way
//! the gateway would.

use serde_json::json;

use super::AiPipeline;
use crate::config::FusionWeights;
use crate::fusion::Decision;
use crate::models::ModelKind;
use crate::telemetry::RawTelemetry;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
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

/// Weekday-daytime nominal sample (2026-02-03 is a Tuesday).
fn nominal(second: u32) -> RawTelemetry {
    raw(1.0, 50.0, 100.0, "ON", &format!("2026-02-03T10:00:{second:02}"))
}

#[test]
fn test_normal_operation_is_safe() {
    init_logging();
    let mut pipeline = AiPipeline::new();
    let report = pipeline.analyze(&nominal(0));

    assert_eq!(report.decision, Decision::Safe);
    assert!(report.final_risk < 0.30, "risk too high: {}", report.final_risk);
    assert_eq!(report.details.analysis_count, 1);
}

#[test]
fn test_physics_violation_breaker_off_with_power() {
    init_logging();
    let mut pipeline = AiPipeline::new();
    for i in 0..5 {
        pipeline.analyze(&nominal(i));
    }

    // Power flowing through an open breaker
    let report = pipeline.analyze(&raw(1.0, 50.0, 50.0, "OFF", "2026-02-03T10:00:05"));

    assert!(report.model_outputs.physics >= 0.95, "physics: {}", report.model_outputs.physics);
    assert_eq!(report.decision, Decision::Critical);
}

#[test]
fn test_fdia_attack_after_baseline() {
    let mut pipeline = AiPipeline::new();
    for i in 0..5 {
        pipeline.analyze(&nominal(i));
    }

    // Coordinated injection: residual-preserving value shifts
    let report = pipeline.analyze(&raw(1.08, 50.3, 95.0, "ON", "2026-02-03T10:00:10"));

    assert!(report.model_outputs.fdia > 0.3, "fdia: {}", report.model_outputs.fdia);
    assert!(matches!(report.decision, Decision::Warning | Decision::Critical));
}

#[test]
fn test_replay_attack_same_timestamp() {
    let mut pipeline = AiPipeline::new();
    pipeline.analyze(&nominal(20));

    // Identical timestamp resent
    let report = pipeline.analyze(&raw(1.0, 50.0, 100.0, "OFF", "2026-02-03T10:00:20"));

    assert!(report.model_outputs.behavior >= 0.9, "behavior: {}", report.model_outputs.behavior);
}

#[test]
fn test_excessive_switching_within_two_minutes() {
    let mut pipeline = AiPipeline::new();

    // 12 breaker toggles, 10 seconds apart
    let mut report = None;
    for i in 0..13u32 {
        let breaker = if i % 2 == 0 { "ON" } else { "OFF" };
        let ts = format!("2026-02-03T10:{:02}:{:02}", i * 10 / 60, i * 10 % 60);
        report = Some(pipeline.analyze(&raw(1.0, 50.0, 100.0, breaker, &ts)));
    }

    let report = report.unwrap();
    assert!(report.model_outputs.behavior >= 0.6);
    assert!(report.details.individual_reasons.behavior.contains("Excessive breaker toggling"));
    assert!(matches!(report.decision, Decision::Warning | Decision::Critical));
}

#[test]
fn test_voltage_bound_violation() {
    let mut pipeline = AiPipeline::new();
    let report = pipeline.analyze(&raw(1.12, 50.0, 100.0, "ON", "2026-02-03T10:00:00"));

    assert!(report.model_outputs.physics > 0.0);
    assert!(report.details.individual_reasons.physics.contains("exceeds physical maximum"));
}

#[test]
fn test_scores_and_confidence_stay_in_unit_interval() {
    let mut pipeline = AiPipeline::new();

    let extremes = [
        raw(0.0, 0.0, 0.0, "OFF", "2026-02-03T10:00:00"),
        raw(10.0, 100.0, 10_000.0, "ON", "2026-02-03T10:00:01"),
        raw(-5.0, -50.0, -500.0, "OFF", "2026-02-03T10:00:01"),
        raw(1.0, 50.0, 100.0, "ON", "2026-02-07T03:00:00"),
    ];

    for sample in &extremes {
        let report = pipeline.analyze(sample);

        assert!((0.0..=1.0).contains(&report.final_risk));
        assert!((0.0..=1.0).contains(&report.confidence));
        for (_, score) in report.model_outputs.iter() {
            assert!((0.0..=1.0).contains(score), "score out of range: {score}");
        }

        // Decision is a monotone function of risk under the fixed thresholds
        let expected = pipeline.config().fusion.thresholds.decide(report.final_risk);
        assert_eq!(report.decision, expected);
    }
}

#[test]
fn test_reset_reproduces_identical_reports() {
    let sequence: Vec<RawTelemetry> = (0..10)
        .map(|i| {
            let breaker = if i % 3 == 0 { "OFF" } else { "ON" };
            raw(1.0 + i as f64 * 0.01, 50.0, 100.0 - i as f64, breaker, &format!("2026-02-03T10:00:{i:02}"))
        })
        .collect();

    let mut pipeline = AiPipeline::new();
    let first: Vec<String> = sequence
        .iter()
        .map(|s| serde_json::to_string(&pipeline.analyze(s)).unwrap())
        .collect();

    pipeline.reset();
    let second: Vec<String> = sequence
        .iter()
        .map(|s| serde_json::to_string(&pipeline.analyze(s)).unwrap())
        .collect();

    assert_eq!(first, second);

    // And a freshly constructed pipeline agrees too
    let mut fresh = AiPipeline::new();
    let third: Vec<String> = sequence
        .iter()
        .map(|s| serde_json::to_string(&fresh.analyze(s)).unwrap())
        .collect();
    assert_eq!(first, third);
}

#[test]
fn test_history_is_bounded_under_load() {
    let mut pipeline = AiPipeline::new();

    for i in 0..150u32 {
        let ts = format!("2026-02-03T{:02}:{:02}:00", 8 + i / 60, i % 60);
        pipeline.analyze(&raw(1.0, 50.0, 100.0, "ON", &ts));
    }

    let stats = pipeline.stats();
    assert_eq!(stats.analysis_count, 150);
    assert_eq!(stats.history_size, pipeline.config().memory.history_size);
}

#[test]
fn test_invalid_weights_rejected_and_kept() {
    let mut pipeline = AiPipeline::new();

    let bad = FusionWeights { anomaly: 0.4, fdia: 0.4, physics: 0.4, behavior: 0.4, memory: 0.4 };
    assert!(pipeline.update_weights(bad).is_err());
    assert_eq!(pipeline.stats().fusion_weights, FusionWeights::default());

    let rebalanced =
        FusionWeights { anomaly: 0.1, fdia: 0.4, physics: 0.25, behavior: 0.1, memory: 0.15 };
    pipeline.update_weights(rebalanced).unwrap();
    assert_eq!(pipeline.stats().fusion_weights, rebalanced);
    assert!((pipeline.stats().fusion_weights.sum() - 1.0).abs() <= 0.01);
}

#[test]
fn test_validation_failure_degrades_to_error_report() {
    let mut pipeline = AiPipeline::new();

    // No telemetry fields at all
    let report = pipeline.analyze(&RawTelemetry {
        breaker_status: Some("ON".to_string()),
        ..Default::default()
    });

    assert_eq!(report.decision, Decision::Error);
    assert_eq!(report.final_risk, 0.0);
    assert_eq!(report.confidence, 0.0);
    for (_, score) in report.model_outputs.iter() {
        assert_eq!(*score, 0.0);
    }
    assert!(report.explanation.contains("Analysis error"));
    assert!(report.details.error.is_some());

    // The pipeline keeps working afterwards
    let ok = pipeline.analyze(&nominal(0));
    assert_ne!(ok.decision, Decision::Error);
    assert_eq!(ok.details.analysis_count, 1);
}

#[test]
fn test_analyze_value_rejects_mistyped_fields() {
    let mut pipeline = AiPipeline::new();

    let report = pipeline.analyze_value(&json!({"voltage": "1.0"}));
    assert_eq!(report.decision, Decision::Error);
    assert!(report.details.error.as_deref().unwrap().contains("voltage"));

    let report = pipeline.analyze_value(&json!({
        "voltage": 1.0, "frequency": 50.0, "power_flow": 100.0,
        "breaker_status": "ON", "timestamp": "2026-02-03T10:00:00",
    }));
    assert_eq!(report.decision, Decision::Safe);
}

#[test]
fn test_report_details_carry_primary_threat_and_reasons() {
    let mut pipeline = AiPipeline::new();
    for i in 0..5 {
        pipeline.analyze(&nominal(i));
    }

    let report = pipeline.analyze(&raw(1.0, 50.0, 50.0, "OFF", "2026-02-03T10:00:05"));

    let details = &report.details;
    assert!(details.primary_threat.is_some());
    assert!(details.primary_threat_score > 0.0);
    assert!(!details.individual_reasons.physics.is_empty());
    assert_eq!(details.input["breaker_status"], "OFF");

    // Contributions follow the configured weights
    let weights = pipeline.config().fusion.weights;
    let physics_contribution = details.model_contributions.physics;
    let expected = weights.get(ModelKind::Physics) * report.model_outputs.physics;
    assert!((physics_contribution - expected).abs() < 1e-3);
}

#[test]
fn test_runtime_signature_extends_detection() {
    let mut pipeline = AiPipeline::new();
    let before = pipeline.stats().memory.signature_count;

    pipeline.add_attack_signature("Load shed probe", 0.85, 49.3, 20.0, "Observed load-shed probing");

    let stats = pipeline.stats();
    assert_eq!(stats.memory.signature_count, before + 1);

    // reset() keeps the registered signature
    pipeline.reset();
    assert_eq!(pipeline.stats().memory.signature_count, before + 1);
}

#[test]
fn test_stats_reflect_behavior_profile() {
    let mut pipeline = AiPipeline::new();

    for (i, breaker) in ["ON", "OFF", "ON"].iter().enumerate() {
        pipeline.analyze(&raw(1.0, 50.0, 100.0, breaker, &format!("2026-02-03T10:0{i}:00")));
    }

    let stats = pipeline.stats();
    assert_eq!(stats.behavior.total_commands, 3);
    assert_eq!(stats.behavior.total_switches, 2);
    assert_eq!(stats.behavior.common_hours, vec![10]);
    assert_eq!(stats.analysis_count, 3);
}
