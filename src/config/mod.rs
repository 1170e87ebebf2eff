//! Engine Configuration
//!
//! Defaults and configurable parameters for every pipeline stage.
//! Configuration values are immutable once validated: "updating" always
//! means constructing a new validated value, never mutating a shared one.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ConfigError;
use crate::fusion::Decision;
use crate::models::ModelKind;

// ============================================================================
// FUSION WEIGHTS
// ============================================================================

/// Default anomaly model weight (statistical deviation)
pub const WEIGHT_ANOMALY: f64 = 0.15;
/// Default FDIA model weight (highest priority)
pub const WEIGHT_FDIA: f64 = 0.35;
/// Default physics model weight
pub const WEIGHT_PHYSICS: f64 = 0.25;
/// Default behavior model weight
pub const WEIGHT_BEHAVIOR: f64 = 0.10;
/// Default memory model weight
pub const WEIGHT_MEMORY: f64 = 0.15;

/// Tolerance when checking that weights sum to 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Per-model contribution coefficients for the weighted risk sum.
///
/// Must sum to 1.0 within [`WEIGHT_SUM_TOLERANCE`]; every weight must be
/// non-negative. Construct via [`FusionWeights::new`] or rely on the
/// validated defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub anomaly: f64,
    pub fdia: f64,
    pub physics: f64,
    pub behavior: f64,
    pub memory: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            anomaly: WEIGHT_ANOMALY,
            fdia: WEIGHT_FDIA,
            physics: WEIGHT_PHYSICS,
            behavior: WEIGHT_BEHAVIOR,
            memory: WEIGHT_MEMORY,
        }
    }
}

impl FusionWeights {
    /// Validated constructor. Rejects weight sets that do not sum to
    /// 1.0 ± tolerance or contain a negative weight.
    pub fn new(
        anomaly: f64,
        fdia: f64,
        physics: f64,
        behavior: f64,
        memory: f64,
    ) -> Result<Self, ConfigError> {
        let weights = Self { anomaly, fdia, physics, behavior, memory };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (kind, value) in self.iter() {
            if value < 0.0 {
                return Err(ConfigError::NegativeWeight { name: kind.as_str(), value });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }

        Ok(())
    }

    pub fn get(&self, kind: ModelKind) -> f64 {
        match kind {
            ModelKind::Anomaly => self.anomaly,
            ModelKind::Fdia => self.fdia,
            ModelKind::Physics => self.physics,
            ModelKind::Behavior => self.behavior,
            ModelKind::Memory => self.memory,
        }
    }

    /// Iterate weights in fixed model order.
    pub fn iter(&self) -> impl Iterator<Item = (ModelKind, f64)> + '_ {
        ModelKind::ALL.iter().map(move |&kind| (kind, self.get(kind)))
    }

    pub fn sum(&self) -> f64 {
        self.iter().map(|(_, w)| w).sum()
    }
}

// ============================================================================
// DECISION THRESHOLDS
// ============================================================================

/// Risk below this => SAFE
pub const SAFE_THRESHOLD: f64 = 0.30;
/// Risk below this (and at or above safe) => WARNING, otherwise CRITICAL
pub const WARNING_THRESHOLD: f64 = 0.60;

/// Ordered decision thresholds mapping a risk score to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionThresholds {
    /// Risk < safe => SAFE
    pub safe: f64,
    /// safe <= risk < warning => WARNING, risk >= warning => CRITICAL
    pub warning: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self { safe: SAFE_THRESHOLD, warning: WARNING_THRESHOLD }
    }
}

impl DecisionThresholds {
    pub fn new(safe: f64, warning: f64) -> Result<Self, ConfigError> {
        let thresholds = Self { safe, warning };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.safe >= self.warning {
            return Err(ConfigError::ThresholdOrder { safe: self.safe, warning: self.warning });
        }
        Ok(())
    }

    /// High sensitivity - lower thresholds, more alerts
    pub fn high_sensitivity() -> Self {
        Self { safe: 0.20, warning: 0.50 }
    }

    /// Low sensitivity - higher thresholds, fewer alerts
    pub fn low_sensitivity() -> Self {
        Self { safe: 0.40, warning: 0.70 }
    }

    /// Map a risk score to a decision category.
    pub fn decide(&self, risk: f64) -> Decision {
        if risk < self.safe {
            Decision::Safe
        } else if risk < self.warning {
            Decision::Warning
        } else {
            Decision::Critical
        }
    }
}

// ============================================================================
// FUSION CONFIG
// ============================================================================

/// Validated fusion configuration: weights + decision thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FusionConfig {
    pub weights: FusionWeights,
    pub thresholds: DecisionThresholds,
}

impl FusionConfig {
    pub fn new(weights: FusionWeights, thresholds: DecisionThresholds) -> Result<Self, ConfigError> {
        weights.validate()?;
        thresholds.validate()?;
        Ok(Self { weights, thresholds })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.thresholds.validate()
    }
}

// ============================================================================
// PREPROCESSING CONFIG
// ============================================================================

/// Expected value ranges and defaults for raw telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Expected voltage range (p.u.), values clamped into it before scaling
    pub voltage_range: (f64, f64),
    /// Expected frequency range (Hz)
    pub frequency_range: (f64, f64),
    /// Expected power range (MW)
    pub power_range: (f64, f64),

    /// Default applied when voltage is missing
    pub default_voltage: f64,
    /// Default applied when frequency is missing
    pub default_frequency: f64,
    /// Default applied when power flow is missing
    pub default_power_flow: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            voltage_range: (0.8, 1.2),
            frequency_range: (49.0, 51.0),
            power_range: (0.0, 200.0),
            default_voltage: 1.0,
            default_frequency: 50.0,
            default_power_flow: 0.0,
        }
    }
}

// ============================================================================
// MODEL CONFIGS
// ============================================================================

/// Statistical anomaly detection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyConfig {
    /// Number of samples for rolling statistics
    pub rolling_window: usize,
    /// Z-score above this is anomalous
    pub z_score_threshold: f64,
    /// Relative deviation above this is anomalous (0.15 = 15%)
    pub deviation_threshold: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            rolling_window: 20,
            z_score_threshold: 2.5,
            deviation_threshold: 0.15,
        }
    }
}

/// FDIA detection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FdiaConfig {
    /// Minimum expected V-f correlation; below it the correlation check fires
    pub correlation_threshold: f64,
    /// Normal V-f correlation baseline (reported in reasons)
    pub normal_correlation: f64,
    /// Samples inspected by the correlation check
    pub temporal_window: usize,
    /// Internal history capacity
    pub history_size: usize,
}

impl Default for FdiaConfig {
    fn default() -> Self {
        Self {
            correlation_threshold: 0.3,
            normal_correlation: 0.85,
            temporal_window: 5,
            history_size: 50,
        }
    }
}

/// Physical-law validation bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Voltage bounds (p.u.)
    pub voltage_min: f64,
    pub voltage_max: f64,
    /// Frequency bounds (Hz), 50 Hz system
    pub frequency_min: f64,
    pub frequency_max: f64,
    /// Power tolerated through an open breaker (measurement noise)
    pub breaker_off_power_tolerance: f64,
    /// Frequency rate of change above this is physically impossible (Hz/s)
    pub max_frequency_rate: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            voltage_min: 0.95,
            voltage_max: 1.05,
            frequency_min: 49.5,
            frequency_max: 50.5,
            breaker_off_power_tolerance: 0.01,
            max_frequency_rate: 2.0,
        }
    }
}

/// Behavioral pattern learning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Normal operation hours, inclusive start / exclusive end
    pub normal_hours: (u32, u32),
    /// Maximum acceptable breaker switches per trailing hour
    pub max_switches_per_hour: usize,
    /// Minimum seconds between breaker commands
    pub command_interval_min: f64,
    /// Capacity of the command / timestamp / toggle FIFOs
    pub pattern_memory_size: usize,
    /// Timestamp replay tolerance (seconds)
    pub replay_time_tolerance: f64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            normal_hours: (6, 22),
            max_switches_per_hour: 10,
            command_interval_min: 5.0,
            pattern_memory_size: 50,
            replay_time_tolerance: 0.1,
        }
    }
}

/// Memory & similarity parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Telemetry feature vectors retained
    pub history_size: usize,
    /// Cosine similarity above this matches an attack signature
    pub similarity_threshold: f64,
    /// Cosine similarity above this counts as a pattern repetition
    pub repetition_similarity: f64,
    /// Minimum stored vectors before the baseline-deviation check runs
    pub baseline_min_samples: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            history_size: 100,
            similarity_threshold: 0.85,
            repetition_similarity: 0.98,
            baseline_min_samples: 20,
        }
    }
}

// ============================================================================
// AGGREGATE
// ============================================================================

/// Complete engine configuration, validated as a whole before use.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub preprocess: PreprocessConfig,
    pub anomaly: AnomalyConfig,
    pub fdia: FdiaConfig,
    pub physics: PhysicsConfig,
    pub behavior: BehaviorConfig,
    pub memory: MemoryConfig,
    pub fusion: FusionConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fusion.validate()
    }

    /// Summary of the current configuration for status endpoints/logging.
    pub fn summary(&self) -> serde_json::Value {
        json!({
            "fusion_weights": self.fusion.weights,
            "decision_thresholds": self.fusion.thresholds,
            "anomaly": self.anomaly,
            "fdia": self.fdia,
            "physics": self.physics,
            "behavior": self.behavior,
            "memory": self.memory,
            "preprocess": self.preprocess,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_valid() {
        assert!(FusionWeights::default().validate().is_ok());
        assert!((FusionWeights::default().sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_reject_bad_weight_sum() {
        let result = FusionWeights::new(0.5, 0.5, 0.5, 0.0, 0.0);
        assert!(matches!(result, Err(ConfigError::WeightSum { .. })));
    }

    #[test]
    fn test_reject_negative_weight() {
        let result = FusionWeights::new(-0.1, 0.45, 0.25, 0.20, 0.20);
        assert!(matches!(result, Err(ConfigError::NegativeWeight { name: "anomaly", .. })));
    }

    #[test]
    fn test_weight_sum_tolerance() {
        // 1.005 is inside the ±0.01 tolerance
        assert!(FusionWeights::new(0.155, 0.35, 0.25, 0.10, 0.15).is_ok());
    }

    #[test]
    fn test_reject_misordered_thresholds() {
        let result = DecisionThresholds::new(0.6, 0.3);
        assert!(matches!(result, Err(ConfigError::ThresholdOrder { .. })));

        // Equal is also invalid: ordering must be strict
        assert!(DecisionThresholds::new(0.4, 0.4).is_err());
    }

    #[test]
    fn test_decide_maps_ordered_bands() {
        let t = DecisionThresholds::default();
        assert_eq!(t.decide(0.0), Decision::Safe);
        assert_eq!(t.decide(0.29), Decision::Safe);
        assert_eq!(t.decide(0.30), Decision::Warning);
        assert_eq!(t.decide(0.59), Decision::Warning);
        assert_eq!(t.decide(0.60), Decision::Critical);
        assert_eq!(t.decide(1.0), Decision::Critical);
    }

    #[test]
    fn test_sensitivity_presets_are_valid() {
        assert!(DecisionThresholds::high_sensitivity().validate().is_ok());
        assert!(DecisionThresholds::low_sensitivity().validate().is_ok());
    }

    #[test]
    fn test_engine_config_summary_has_all_sections() {
        let summary = EngineConfig::default().summary();
        for key in ["fusion_weights", "decision_thresholds", "anomaly", "fdia", "physics", "behavior", "memory"] {
            assert!(summary.get(key).is_some(), "missing section {key}");
        }
    }
}
