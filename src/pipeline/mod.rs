//! Pipeline Orchestrator
//!
//! Sequences one analyze call: preprocess → five models → fusion → report.
//! Owns every piece of history-bearing state; construct one pipeline per
//! process (or per test) and pass it by reference - there is no global
//! instance.

pub mod report;
pub mod shared;

#[cfg(test)]
mod tests;

pub use report::{AnalysisReport, PipelineStats, ReportDetails};
pub use shared::SharedPipeline;

use crate::config::{EngineConfig, FusionWeights};
use crate::error::ConfigError;
use crate::fusion::FusionEngine;
use crate::models::{
    AnomalyModel, BehaviorModel, FdiaModel, MemoryModel, ModelSet, PhysicsModel,
};
use crate::preprocess::Preprocessor;
use crate::telemetry::RawTelemetry;

// ============================================================================
// PIPELINE
// ============================================================================

/// The multi-model analysis pipeline.
///
/// `analyze` never fails: malformed input degrades to an ERROR-shaped
/// report at this boundary. State mutates on every call; wrap in
/// [`SharedPipeline`] when callers are concurrent.
#[derive(Debug, Clone)]
pub struct AiPipeline {
    config: EngineConfig,
    preprocessor: Preprocessor,
    anomaly: AnomalyModel,
    fdia: FdiaModel,
    physics: PhysicsModel,
    behavior: BehaviorModel,
    memory: MemoryModel,
    fusion: FusionEngine,
    analysis_count: u64,
}

impl AiPipeline {
    /// Pipeline with the built-in default configuration (valid by
    /// construction).
    pub fn new() -> Self {
        let config = EngineConfig::default();
        Self {
            preprocessor: Preprocessor::new(config.preprocess, config.memory.history_size),
            anomaly: AnomalyModel::new(config.anomaly),
            fdia: FdiaModel::new(config.fdia),
            physics: PhysicsModel::new(config.physics),
            behavior: BehaviorModel::new(config.behavior),
            memory: MemoryModel::new(config.memory),
            fusion: FusionEngine::default(),
            analysis_count: 0,
            config,
        }
    }

    /// Pipeline with a caller-supplied configuration. Invalid configuration
    /// is a hard construction-time failure.
    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let fusion = FusionEngine::new(config.fusion)?;
        Ok(Self {
            preprocessor: Preprocessor::new(config.preprocess, config.memory.history_size),
            anomaly: AnomalyModel::new(config.anomaly),
            fdia: FdiaModel::new(config.fdia),
            physics: PhysicsModel::new(config.physics),
            behavior: BehaviorModel::new(config.behavior),
            memory: MemoryModel::new(config.memory),
            fusion,
            analysis_count: 0,
            config,
        })
    }

    /// Analyze one raw telemetry sample. Total function: validation
    /// failures come back as an ERROR-shaped report, never as an error or
    /// a panic.
    pub fn analyze(&mut self, raw: &RawTelemetry) -> AnalysisReport {
        let data = match self.preprocessor.preprocess(raw) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Telemetry rejected: {e}");
                return AnalysisReport::error_for_raw(&e.to_string(), raw, self.analysis_count);
            }
        };

        let stats = self.preprocessor.field_stats(self.config.anomaly.rolling_window);

        let outputs = ModelSet {
            anomaly: self.anomaly.analyze(&data, &stats),
            fdia: self.fdia.analyze(&data, self.preprocessor.history()),
            physics: self.physics.analyze(&data),
            behavior: self.behavior.analyze(&data),
            memory: self.memory.analyze(&data, self.preprocessor.history()),
        };

        let fusion = self.fusion.fuse(&outputs);
        self.analysis_count += 1;

        log::debug!(
            "analysis #{}: decision={} risk={:.3}",
            self.analysis_count,
            fusion.decision,
            fusion.final_risk
        );

        AnalysisReport::from_analysis(&outputs, &fusion, &data.sample, self.analysis_count)
    }

    /// Analyze an untyped JSON sample (the gateway's native format).
    /// Mistyped fields degrade to the same ERROR-shaped report.
    pub fn analyze_value(&mut self, value: &serde_json::Value) -> AnalysisReport {
        match RawTelemetry::from_value(value) {
            Ok(raw) => self.analyze(&raw),
            Err(e) => {
                log::warn!("Telemetry rejected: {e}");
                AnalysisReport::error(&e.to_string(), value.clone(), self.analysis_count)
            }
        }
    }

    /// Snapshot of pipeline state.
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            analysis_count: self.analysis_count,
            history_size: self.preprocessor.history().len(),
            memory: self.memory.stats(),
            behavior: self.behavior.profile(),
            fusion_weights: *self.fusion.weights(),
        }
    }

    /// Clear all history-bearing state. Static configuration (including
    /// registered attack signatures and fusion weights) is kept.
    pub fn reset(&mut self) {
        self.preprocessor.reset();
        self.fdia.reset();
        self.behavior.reset();
        self.memory.reset();
        self.analysis_count = 0;
        log::info!("Pipeline state reset");
    }

    /// Replace fusion weights with a new validated set; a rejected set
    /// keeps the current weights.
    pub fn update_weights(&mut self, weights: FusionWeights) -> Result<(), ConfigError> {
        self.fusion.update_weights(weights)
    }

    /// Register a runtime attack signature with the memory model.
    pub fn add_attack_signature(
        &mut self,
        name: impl Into<String>,
        voltage: f64,
        frequency: f64,
        power_flow: f64,
        description: impl Into<String>,
    ) {
        self.memory.add_attack_signature(name, voltage, frequency, power_flow, description);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Metadata for all five models.
    pub fn model_info(&self) -> serde_json::Value {
        serde_json::json!({
            "anomaly": self.anomaly.info(),
            "fdia": self.fdia.info(),
            "physics": self.physics.info(),
            "behavior": self.behavior.info(),
            "memory": self.memory.info(),
        })
    }
}

impl Default for AiPipeline {
    fn default() -> Self {
        Self::new()
    }
}
