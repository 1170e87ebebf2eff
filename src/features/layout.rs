//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the similarity feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order or weights → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Attack signatures and stored memory vectors carry the layout version and
//! hash; a mismatch means they were produced by an incompatible engine build.

use crc32fast::Hasher;

use crate::constants::{NOMINAL_FREQUENCY_HZ, REFERENCE_POWER_MW};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector.
pub const FEATURE_LAYOUT: &[&str] = &[
    "voltage",    // 0: voltage in p.u., weighted
    "frequency",  // 1: frequency / 50 Hz, weighted
    "power_flow", // 2: power flow / 100 MW, weighted
];

/// Total number of features
pub const FEATURE_COUNT: usize = 3;

/// Per-feature weights applied when building a vector
pub const FEATURE_WEIGHTS: [f64; FEATURE_COUNT] = [0.3, 0.3, 0.4];

/// Scale divisors bringing each channel near unity before weighting
pub const FEATURE_SCALES: [f64; FEATURE_COUNT] = [1.0, NOMINAL_FREQUENCY_HZ, REFERENCE_POWER_MW];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout.
/// Used to detect layout mismatches at runtime.
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for (i, name) in FEATURE_LAYOUT.iter().enumerate() {
        hasher.update(name.as_bytes());
        hasher.update(&FEATURE_WEIGHTS[i].to_le_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Get layout hash (inputs are const, so this is stable per build)
pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

/// Check if stored data is compatible (same version, same hash)
pub fn is_layout_compatible(version: u8, hash: u32) -> bool {
    version == FEATURE_VERSION && hash == layout_hash()
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================
