use crate::models::{ModelKind, ModelOutput, ModelSet};

use super::types::Decision;

// Score band reported as a "minor concern" under a SAFE verdict
const MINOR_CONCERN_LOW: f64 = 0.1;
const MINOR_CONCERN_HIGH: f64 = 0.3;

// Supporting-evidence and high-threat cutoffs
const SUPPORTING_SCORE: f64 = 0.2;
const HIGH_THREAT_SCORE: f64 = 0.5;

/// Synthesize the human-readable explanation for a verdict.
///
/// Candidate supporting/minor-concern models are scanned in the fixed model
/// order and the first qualifying one wins (not the highest-scoring one).
pub fn generate(
    decision: Decision,
    primary_threat: ModelKind,
    outputs: &ModelSet<ModelOutput>,
) -> String {
    match decision {
        Decision::Safe => safe_explanation(outputs),
        Decision::Warning => warning_explanation(primary_threat, outputs),
        Decision::Critical => critical_explanation(primary_threat, outputs),
        // Error reports carry the validation message instead; fusion never
        // produces this variant
        Decision::Error => "Analysis halted due to input error".to_string(),
    }
}

fn safe_explanation(outputs: &ModelSet<ModelOutput>) -> String {
    let minor_concern = outputs
        .iter()
        .find(|(_, o)| o.score > MINOR_CONCERN_LOW && o.score < MINOR_CONCERN_HIGH);

    match minor_concern {
        Some((_, output)) => {
            format!("All systems normal. Minor variance detected: {}", output.reason)
        }
        None => "All systems normal. No security threats detected.".to_string(),
    }
}

fn warning_explanation(primary_threat: ModelKind, outputs: &ModelSet<ModelOutput>) -> String {
    let primary_reason = &outputs.get(primary_threat).reason;

    let supporting = outputs
        .iter()
        .find(|(kind, o)| *kind != primary_threat && o.score > SUPPORTING_SCORE);

    match supporting {
        Some((_, output)) => {
            format!("WARNING: {primary_reason}. Supporting evidence: {}", output.reason)
        }
        None => format!("WARNING: {primary_reason}"),
    }
}

fn critical_explanation(primary_threat: ModelKind, outputs: &ModelSet<ModelOutput>) -> String {
    let primary_reason = &outputs.get(primary_threat).reason;

    let high_threats = outputs.iter().filter(|(_, o)| o.score > HIGH_THREAT_SCORE).count();

    if high_threats > 1 {
        format!(
            "CRITICAL: {primary_reason}. Multiple threat indicators detected ({high_threats} models)"
        )
    } else {
        format!("CRITICAL: {primary_reason}")
    }
}
