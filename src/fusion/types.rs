//! Fusion Types
//!
//! Data structures only - the fusion math lives in `engine.rs`.

use serde::{Deserialize, Serialize};

use crate::models::{ModelKind, ModelSet};

// ============================================================================
// DECISION
// ============================================================================

/// Graded security verdict handed to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Safe,
    Warning,
    Critical,
    /// Input could not be analyzed; fail-safe shape, never a crash
    Error,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Safe => "SAFE",
            Decision::Warning => "WARNING",
            Decision::Critical => "CRITICAL",
            Decision::Error => "ERROR",
        }
    }

    pub fn severity_level(&self) -> u8 {
        match self {
            Decision::Safe => 0,
            Decision::Warning => 1,
            Decision::Critical => 2,
            Decision::Error => 3,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// FUSION RESULT
// ============================================================================

/// Fused output of one analysis pass. Numeric values are rounded to three
/// decimals for stable, comparable reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    pub final_risk: f64,
    pub confidence: f64,
    pub decision: Decision,
    pub explanation: String,
    /// weight × score per model
    pub model_contributions: ModelSet<f64>,
    /// Model with the highest score; ties go to the earlier model in the
    /// fixed evaluation order
    pub primary_threat: ModelKind,
    pub primary_threat_score: f64,
}

// ============================================================================
// TESTS
// ============================================================================
