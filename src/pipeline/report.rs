//! Analysis Report - the record handed back to the gateway
//!
//! One report per analyze call, in both the scored and the fail-safe ERROR
//! shape. Everything is serializable; the gateway logs these verbatim.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::FusionWeights;
use crate::fusion::{Decision, FusionResult};
use crate::models::{BehaviorProfile, MemoryStats, ModelKind, ModelOutput, ModelSet};
use crate::telemetry::{RawTelemetry, TelemetrySample};

// ============================================================================
// REPORT
// ============================================================================

/// Diagnostic block attached to every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDetails {
    /// Absent on ERROR reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_threat: Option<ModelKind>,
    pub primary_threat_score: f64,
    pub model_contributions: ModelSet<f64>,
    pub individual_reasons: ModelSet<String>,
    /// Analyses performed by this pipeline, including this one
    pub analysis_count: u64,
    /// Echo of the analyzed input
    pub input: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Complete output record of one analyze call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Per-model scores
    pub model_outputs: ModelSet<f64>,
    pub final_risk: f64,
    pub decision: Decision,
    pub confidence: f64,
    pub explanation: String,
    pub details: ReportDetails,
}

impl AnalysisReport {
    /// Assemble the report for a successfully scored sample.
    pub fn from_analysis(
        outputs: &ModelSet<ModelOutput>,
        fusion: &FusionResult,
        sample: &TelemetrySample,
        analysis_count: u64,
    ) -> Self {
        Self {
            model_outputs: outputs.map(|_, o| o.score),
            final_risk: fusion.final_risk,
            decision: fusion.decision,
            confidence: fusion.confidence,
            explanation: fusion.explanation.clone(),
            details: ReportDetails {
                primary_threat: Some(fusion.primary_threat),
                primary_threat_score: fusion.primary_threat_score,
                model_contributions: fusion.model_contributions.clone(),
                individual_reasons: outputs.map(|_, o| o.reason.clone()),
                analysis_count,
                input: json!({
                    "voltage": sample.voltage,
                    "frequency": sample.frequency,
                    "power_flow": sample.power_flow,
                    "breaker_status": sample.breaker_status,
                }),
                error: None,
            },
        }
    }

    /// Fail-safe shape: all scores zeroed, decision ERROR, message surfaced
    /// in the explanation. Never a crash, never fail-open.
    pub fn error(message: &str, input: serde_json::Value, analysis_count: u64) -> Self {
        Self {
            model_outputs: ModelSet::splat(0.0),
            final_risk: 0.0,
            decision: Decision::Error,
            confidence: 0.0,
            explanation: format!("Analysis error: {message}"),
            details: ReportDetails {
                primary_threat: None,
                primary_threat_score: 0.0,
                model_contributions: ModelSet::splat(0.0),
                individual_reasons: ModelSet::splat(String::new()),
                analysis_count,
                input,
                error: Some(message.to_string()),
            },
        }
    }

    /// Fail-safe shape for a typed raw sample.
    pub fn error_for_raw(message: &str, raw: &RawTelemetry, analysis_count: u64) -> Self {
        let input = serde_json::to_value(raw).unwrap_or(serde_json::Value::Null);
        Self::error(message, input, analysis_count)
    }
}

// ============================================================================
// PIPELINE STATS
// ============================================================================

/// Snapshot of pipeline state for the gateway's status surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub analysis_count: u64,
    pub history_size: usize,
    pub memory: MemoryStats,
    pub behavior: BehaviorProfile,
    pub fusion_weights: FusionWeights,
}

// ============================================================================
// TESTS
// ============================================================================
