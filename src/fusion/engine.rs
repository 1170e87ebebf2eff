//! Weighted fusion of the five model outputs.

use crate::config::{DecisionThresholds, FusionConfig, FusionWeights};
use crate::error::ConfigError;
use crate::models::{ModelKind, ModelOutput, ModelSet};

use super::explain;
use super::types::{Decision, FusionResult};

/// Combines model outputs into a unified risk assessment.
///
/// The configuration is an immutable validated value; `update_weights`
/// swaps in a new validated value and a rejected update leaves the previous
/// configuration untouched.
#[derive(Debug, Clone)]
pub struct FusionEngine {
    config: FusionConfig,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn fuse(&self, outputs: &ModelSet<ModelOutput>) -> FusionResult {
        let weights = &self.config.weights;

        let final_risk = outputs
            .iter()
            .map(|(kind, o)| weights.get(kind) * o.score)
            .sum::<f64>()
            .clamp(0.0, 1.0);

        let confidence = outputs
            .iter()
            .map(|(kind, o)| weights.get(kind) * o.confidence)
            .sum::<f64>()
            .clamp(0.0, 1.0);

        let decision = self.config.thresholds.decide(final_risk);

        let (primary_threat, primary_threat_score) = identify_primary_threat(outputs);

        let explanation = explain::generate(decision, primary_threat, outputs);

        let model_contributions = outputs.map(|kind, o| round3(weights.get(kind) * o.score));

        log::debug!(
            "fusion: risk={final_risk:.3} confidence={confidence:.3} decision={decision} primary={primary_threat}"
        );

        FusionResult {
            final_risk: round3(final_risk),
            confidence: round3(confidence),
            decision,
            explanation,
            model_contributions,
            primary_threat,
            primary_threat_score: round3(primary_threat_score),
        }
    }

    /// Replace the fusion weights with a new validated set. A rejected set
    /// leaves the current weights unchanged.
    pub fn update_weights(&mut self, new_weights: FusionWeights) -> Result<(), ConfigError> {
        if let Err(e) = new_weights.validate() {
            log::warn!("Rejected fusion weight update: {e}");
            return Err(e);
        }

        self.config.weights = new_weights;
        log::info!("Fusion weights updated");
        Ok(())
    }

    pub fn weights(&self) -> &FusionWeights {
        &self.config.weights
    }

    pub fn thresholds(&self) -> &DecisionThresholds {
        &self.config.thresholds
    }

    /// Reset weights to the built-in defaults.
    pub fn reset_weights(&mut self) {
        self.config.weights = FusionWeights::default();
    }
}

impl Default for FusionEngine {
    fn default() -> Self {
        // Default configuration is valid by construction
        Self { config: FusionConfig::default() }
    }
}

/// Highest-scoring model; the fixed evaluation order breaks ties in favor
/// of the earlier model.
fn identify_primary_threat(outputs: &ModelSet<ModelOutput>) -> (ModelKind, f64) {
    let mut primary = ModelKind::Anomaly;
    let mut best = outputs.get(primary).score;

    for (kind, output) in outputs.iter() {
        if output.score > best {
            primary = kind;
            best = output.score;
        }
    }

    (primary, best)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// ============================================================================
// TESTS
// ============================================================================
