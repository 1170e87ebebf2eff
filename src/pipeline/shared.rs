//! Shared Pipeline Handle
//!
//! Every analyze call mutates history buffers, so concurrent callers must
//! be serialized. This handle wraps one pipeline in a mutex: one critical
//! section per call keeps rolling statistics and deltas consistent with a
//! strictly-ordered history.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::FusionWeights;
use crate::error::ConfigError;
use crate::telemetry::RawTelemetry;

use super::report::{AnalysisReport, PipelineStats};
use super::AiPipeline;

/// Clone-able, thread-safe handle to one pipeline instance.
#[derive(Debug, Clone)]
pub struct SharedPipeline {
    inner: Arc<Mutex<AiPipeline>>,
}

impl SharedPipeline {
    pub fn new(pipeline: AiPipeline) -> Self {
        Self { inner: Arc::new(Mutex::new(pipeline)) }
    }

    pub fn analyze(&self, raw: &RawTelemetry) -> AnalysisReport {
        self.inner.lock().analyze(raw)
    }

    pub fn analyze_value(&self, value: &serde_json::Value) -> AnalysisReport {
        self.inner.lock().analyze_value(value)
    }

    pub fn stats(&self) -> PipelineStats {
        self.inner.lock().stats()
    }

    pub fn reset(&self) {
        self.inner.lock().reset()
    }

    pub fn update_weights(&self, weights: FusionWeights) -> Result<(), ConfigError> {
        self.inner.lock().update_weights(weights)
    }

    pub fn add_attack_signature(
        &self,
        name: impl Into<String>,
        voltage: f64,
        frequency: f64,
        power_flow: f64,
        description: impl Into<String>,
    ) {
        self.inner.lock().add_attack_signature(name, voltage, frequency, power_flow, description)
    }

    /// Run a closure under the pipeline lock, for compound operations that
    /// must observe a consistent state.
    pub fn with<R>(&self, f: impl FnOnce(&mut AiPipeline) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl Default for SharedPipeline {
    fn default() -> Self {
        Self::new(AiPipeline::new())
    }
}

// ============================================================================
// TESTS
// ============================================================================
