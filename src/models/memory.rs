//! Memory & Similarity
//!
//! Remembers recent telemetry as feature vectors and compares the current
//! sample against known attack signatures, recent repetition and the
//! learned baseline.

use std::collections::VecDeque;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::MemoryConfig;
use crate::features::FeatureVector;
use crate::preprocess::{PreprocessedSample, TelemetryHistory};

use super::ModelOutput;

/// Distance divisor normalizing baseline deviation; typical in-family
/// distances sit around 0.1-0.3
const BASELINE_DISTANCE_SCALE: f64 = 0.5;

/// Normalized baseline distance above this is reported
const BASELINE_DEVIATION_THRESHOLD: f64 = 0.6;

/// Historical vectors inspected by the repetition check
const REPETITION_WINDOW: usize = 20;

// ============================================================================
// ATTACK SIGNATURES
// ============================================================================

/// A named attack pattern in feature space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackSignature {
    pub name: String,
    pub vector: FeatureVector,
    pub description: String,
}

/// Signatures every engine instance starts with. Vectors are in weighted
/// feature space (see `features::layout`).
static BUILTIN_SIGNATURES: Lazy<Vec<AttackSignature>> = Lazy::new(|| {
    vec![
        AttackSignature {
            name: "FDIA coordinated injection".to_string(),
            vector: FeatureVector::from_values([0.35, 1.05, 0.45]),
            description: "Coordinated false data injection attack".to_string(),
        },
        AttackSignature {
            name: "Voltage manipulation".to_string(),
            vector: FeatureVector::from_values([0.45, 1.0, 0.3]),
            description: "Isolated voltage data manipulation".to_string(),
        },
        AttackSignature {
            name: "Zero-day pattern".to_string(),
            vector: FeatureVector::from_values([0.25, 0.95, 0.5]),
            description: "Previously observed zero-day attack".to_string(),
        },
    ]
});

// ============================================================================
// MEMORY STATS
// ============================================================================

/// Memory state summary, exposed through pipeline stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub memory_size: usize,
    pub signature_count: usize,
    pub baseline: Option<FeatureVector>,
}

// ============================================================================
// MEMORY MODEL
// ============================================================================

/// Similarity analysis against a bounded vector memory and an extensible
/// attack-signature table. Signatures are never evicted.
#[derive(Debug, Clone)]
pub struct MemoryModel {
    config: MemoryConfig,
    telemetry_memory: VecDeque<FeatureVector>,
    signatures: Vec<AttackSignature>,
}

impl MemoryModel {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            telemetry_memory: VecDeque::with_capacity(config.history_size),
            signatures: BUILTIN_SIGNATURES.clone(),
            config,
        }
    }

    pub fn analyze(&mut self, data: &PreprocessedSample, telemetry: &TelemetryHistory) -> ModelOutput {
        let current = FeatureVector::from_sample(&data.sample);
        self.update_memory(current);

        let mut scores = Vec::new();
        let mut reasons = Vec::new();

        let checks = [
            self.check_attack_signatures(&current),
            self.check_pattern_repetition(&current, telemetry),
            self.check_baseline_deviation(&current),
        ];
        for (score, reason) in checks.into_iter().flatten() {
            scores.push(score);
            reasons.push(reason);
        }

        if scores.is_empty() {
            return ModelOutput::new(
                0.0,
                0.80,
                "No similarity to known attack patterns",
                json!({
                    "checks_performed": 3,
                    "matches_found": 0,
                    "memory_size": self.telemetry_memory.len(),
                }),
            );
        }

        let final_score = scores.iter().cloned().fold(0.0, f64::max);

        // Confidence grows as the memory fills
        let fill = self.telemetry_memory.len() as f64 / self.config.history_size as f64;
        let confidence = (0.70 + fill * 0.2).min(0.95);

        ModelOutput::new(
            final_score,
            confidence,
            reasons[0].clone(),
            json!({
                "checks_performed": 3,
                "matches_found": scores.len(),
                "all_reasons": reasons,
                "memory_size": self.telemetry_memory.len(),
            }),
        )
    }

    /// First signature above the similarity threshold wins.
    fn check_attack_signatures(&self, current: &FeatureVector) -> Option<(f64, String)> {
        for signature in &self.signatures {
            let similarity = current.cosine_similarity(&signature.vector);
            if similarity > self.config.similarity_threshold {
                let reason = format!("High similarity to {} ({:.2})", signature.name, similarity);
                return Some((similarity, reason));
            }
        }
        None
    }

    /// Near-identical repeats among recent history suggest replayed or
    /// machine-generated telemetry.
    fn check_pattern_repetition(
        &self,
        current: &FeatureVector,
        telemetry: &TelemetryHistory,
    ) -> Option<(f64, String)> {
        if telemetry.len() < 10 {
            return None;
        }

        let repeats = telemetry
            .recent(REPETITION_WINDOW)
            .map(FeatureVector::from_sample)
            .filter(|v| current.cosine_similarity(v) > self.config.repetition_similarity)
            .count();

        if repeats > 3 {
            let score = (repeats as f64 / 10.0).min(1.0);
            let reason = format!("Suspicious pattern repetition detected ({repeats} matches)");
            return Some((score, reason));
        }

        None
    }

    fn check_baseline_deviation(&self, current: &FeatureVector) -> Option<(f64, String)> {
        if self.telemetry_memory.len() < self.config.baseline_min_samples {
            return None;
        }

        let baseline = self.baseline()?;
        let distance = current.euclidean_distance(&baseline);
        let normalized = (distance / BASELINE_DISTANCE_SCALE).min(1.0);

        if normalized > BASELINE_DEVIATION_THRESHOLD {
            let reason = format!("Significant deviation from learned baseline ({distance:.3})");
            return Some((normalized, reason));
        }

        None
    }

    /// Mean vector of the stored memory.
    pub fn baseline(&self) -> Option<FeatureVector> {
        let vectors: Vec<FeatureVector> = self.telemetry_memory.iter().copied().collect();
        FeatureVector::mean_of(&vectors)
    }

    fn update_memory(&mut self, vector: FeatureVector) {
        while self.telemetry_memory.len() >= self.config.history_size {
            self.telemetry_memory.pop_front();
        }
        self.telemetry_memory.push_back(vector);
    }

    /// Register a new attack signature at runtime. The table only grows.
    pub fn add_attack_signature(
        &mut self,
        name: impl Into<String>,
        voltage: f64,
        frequency: f64,
        power_flow: f64,
        description: impl Into<String>,
    ) {
        let name = name.into();
        log::info!("Registering attack signature '{name}'");
        self.signatures.push(AttackSignature {
            name,
            vector: FeatureVector::from_telemetry(voltage, frequency, power_flow),
            description: description.into(),
        });
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            memory_size: self.telemetry_memory.len(),
            signature_count: self.signatures.len(),
            baseline: self.baseline(),
        }
    }

    pub fn memory_len(&self) -> usize {
        self.telemetry_memory.len()
    }

    /// Clears the vector memory. Signatures (built-in and registered) are
    /// kept: they are configuration, not history.
    pub fn reset(&mut self) {
        self.telemetry_memory.clear();
    }

    pub fn info(&self) -> serde_json::Value {
        json!({
            "name": "Memory & Similarity",
            "type": "memory_similarity",
            "methods": [
                "attack_signature_matching",
                "pattern_repetition_detection",
                "baseline_deviation_analysis",
            ],
            "config": self.config,
            "signatures_loaded": self.signatures.len(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PreprocessConfig;
    use crate::preprocess::Preprocessor;
    use crate::telemetry::RawTelemetry;

    fn raw(voltage: f64, frequency: f64, power: f64, ts: &str) -> RawTelemetry {
        RawTelemetry {
            voltage: Some(voltage),
            frequency: Some(frequency),
            power_flow: Some(power),
            breaker_status: Some("ON".to_string()),
            timestamp: Some(ts.to_string()),
        }
    }

    fn harness() -> (Preprocessor, MemoryModel) {
        (
            Preprocessor::new(PreprocessConfig::default(), 100),
            MemoryModel::new(MemoryConfig::default()),
        )
    }

    #[test]
    fn test_builtin_signatures_seeded() {
        let model = MemoryModel::new(MemoryConfig::default());
        assert_eq!(model.stats().signature_count, 3);
    }

    #[test]
    fn test_signature_match_scores_similarity() {
        let (mut pre, mut model) = harness();

        // Nominal telemetry is geometrically close to the coordinated
        // injection signature; the match reports the similarity itself
        let data = pre.preprocess(&raw(1.0, 50.0, 100.0, "2026-02-03T10:00:00")).unwrap();
        let out = model.analyze(&data, pre.history());

        assert!(out.score > MemoryConfig::default().similarity_threshold);
        assert!(out.reason.contains("High similarity to"));
    }

    #[test]
    fn test_pattern_repetition_detected() {
        let (mut pre, mut model) = harness();

        let mut last = None;
        for i in 0..12 {
            let ts = format!("2026-02-03T10:00:{i:02}");
            let data = pre.preprocess(&raw(1.0, 50.0, 100.0, &ts)).unwrap();
            last = Some(model.analyze(&data, pre.history()));
        }

        let out = last.unwrap();
        let reasons = out.details["all_reasons"].as_array().unwrap();
        assert!(reasons
            .iter()
            .any(|r| r.as_str().unwrap().contains("pattern repetition")));
    }

    #[test]
    fn test_baseline_deviation_needs_filled_memory() {
        let (mut pre, mut model) = harness();

        // 19 samples: below the 20-vector minimum, no baseline check yet
        for i in 0..19 {
            let ts = format!("2026-02-03T10:00:{i:02}");
            let data = pre.preprocess(&raw(1.0, 50.0, 100.0, &ts)).unwrap();
            model.analyze(&data, pre.history());
        }

        assert_eq!(model.memory_len(), 19);
        assert!(model.baseline().is_some());
    }

    #[test]
    fn test_memory_is_bounded() {
        let (mut pre, mut model) = harness();

        for i in 0..150 {
            let ts = format!("2026-02-03T{:02}:{:02}:00", 8 + i / 60, i % 60);
            let data = pre.preprocess(&raw(1.0, 50.0, 100.0, &ts)).unwrap();
            model.analyze(&data, pre.history());
        }

        assert_eq!(model.memory_len(), MemoryConfig::default().history_size);
    }

    #[test]
    fn test_add_attack_signature() {
        let mut model = MemoryModel::new(MemoryConfig::default());
        model.add_attack_signature("Load drop", 0.85, 49.2, 10.0, "Sudden load shedding pattern");

        assert_eq!(model.stats().signature_count, 4);
    }

    #[test]
    fn test_reset_keeps_signatures() {
        let (mut pre, mut model) = harness();
        model.add_attack_signature("Custom", 1.1, 50.2, 120.0, "");

        let data = pre.preprocess(&raw(1.0, 50.0, 100.0, "2026-02-03T10:00:00")).unwrap();
        model.analyze(&data, pre.history());

        model.reset();
        assert_eq!(model.memory_len(), 0);
        assert_eq!(model.stats().signature_count, 4);
    }
}
