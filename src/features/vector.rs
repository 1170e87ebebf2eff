//! Feature Vector - weighted similarity space
//!
//! Vectors live in the weighted space defined by `layout.rs`; similarity is
//! only meaningful between vectors of the same layout version.

use serde::{Deserialize, Serialize};

use super::layout::{
    is_layout_compatible, layout_hash, FEATURE_COUNT, FEATURE_SCALES, FEATURE_VERSION,
    FEATURE_WEIGHTS,
};
use crate::telemetry::TelemetrySample;

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned feature vector with layout metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in layout order, already scaled and weighted
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Build a vector from engineering-unit telemetry channels.
    pub fn from_telemetry(voltage: f64, frequency: f64, power_flow: f64) -> Self {
        let raw = [voltage, frequency, power_flow];
        let mut values = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            values[i] = raw[i] / FEATURE_SCALES[i] * FEATURE_WEIGHTS[i];
        }
        Self::from_values(values)
    }

    pub fn from_sample(sample: &TelemetrySample) -> Self {
        Self::from_telemetry(sample.voltage, sample.frequency, sample.power_flow)
    }

    /// Wrap already-weighted values with current layout metadata.
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { version: FEATURE_VERSION, layout_hash: layout_hash(), values }
    }

    pub fn is_compatible(&self) -> bool {
        is_layout_compatible(self.version, self.layout_hash)
    }

    /// Cosine similarity in [0,1] for non-negative vectors; 0 when either
    /// vector has zero magnitude or the layouts are incompatible.
    pub fn cosine_similarity(&self, other: &FeatureVector) -> f64 {
        if !self.is_compatible() || !other.is_compatible() {
            return 0.0;
        }

        let dot: f64 = self.values.iter().zip(other.values.iter()).map(|(a, b)| a * b).sum();
        let mag_a: f64 = self.values.iter().map(|a| a * a).sum::<f64>().sqrt();
        let mag_b: f64 = other.values.iter().map(|b| b * b).sum::<f64>().sqrt();

        if mag_a == 0.0 || mag_b == 0.0 {
            return 0.0;
        }

        dot / (mag_a * mag_b)
    }

    pub fn euclidean_distance(&self, other: &FeatureVector) -> f64 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Component-wise mean of a set of vectors. `None` for an empty set.
    pub fn mean_of(vectors: &[FeatureVector]) -> Option<FeatureVector> {
        if vectors.is_empty() {
            return None;
        }

        let mut sums = [0.0; FEATURE_COUNT];
        for v in vectors {
            for i in 0..FEATURE_COUNT {
                sums[i] += v.values[i];
            }
        }

        let n = vectors.len() as f64;
        for s in sums.iter_mut() {
            *s /= n;
        }

        Some(FeatureVector::from_values(sums))
    }
}

// ============================================================================
// TESTS
// ============================================================================
