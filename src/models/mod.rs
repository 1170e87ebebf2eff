//! Scoring Models
//!
//! Five independent models, each evaluating one threat signature:
//! - `anomaly` - statistical deviation from rolling history
//! - `fdia` - coordinated false-data-injection detection
//! - `physics` - physical-law validation
//! - `behavior` - operator-pattern learning
//! - `memory` - similarity to known attack signatures / learned baseline
//!
//! Each returns a [`ModelOutput`] with a normalized score, a confidence and
//! a human-readable reason. Models never fail: unscorable situations are
//! expressed as a zero score.

pub mod anomaly;
pub mod behavior;
pub mod fdia;
pub mod memory;
pub mod physics;

pub use anomaly::AnomalyModel;
pub use behavior::{BehaviorModel, BehaviorProfile};
pub use fdia::FdiaModel;
pub use memory::{AttackSignature, MemoryModel, MemoryStats};
pub use physics::PhysicsModel;

use serde::{Deserialize, Serialize};

// ============================================================================
// MODEL KIND
// ============================================================================

/// The five scoring models, in fixed evaluation order. This order is also
/// the primary-threat tie-break: when two models report the same maximum
/// score, the earlier one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Anomaly,
    Fdia,
    Physics,
    Behavior,
    Memory,
}

impl ModelKind {
    pub const ALL: [ModelKind; 5] = [
        ModelKind::Anomaly,
        ModelKind::Fdia,
        ModelKind::Physics,
        ModelKind::Behavior,
        ModelKind::Memory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Anomaly => "anomaly",
            ModelKind::Fdia => "fdia",
            ModelKind::Physics => "physics",
            ModelKind::Behavior => "behavior",
            ModelKind::Memory => "memory",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// MODEL OUTPUT
// ============================================================================

/// One model's verdict for one sample. Score and confidence are clamped to
/// [0,1] at construction; this is the single place the invariant is
/// enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub score: f64,
    pub confidence: f64,
    pub reason: String,
    /// Structured diagnostics, model-specific
    pub details: serde_json::Value,
}

impl ModelOutput {
    pub fn new(
        score: f64,
        confidence: f64,
        reason: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            score: score.clamp(0.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
            details,
        }
    }
}

// ============================================================================
// MODEL SET
// ============================================================================

/// Fixed five-slot container keyed by [`ModelKind`]. Iteration follows
/// [`ModelKind::ALL`], which keeps every per-model map in the output
/// deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSet<T> {
    pub anomaly: T,
    pub fdia: T,
    pub physics: T,
    pub behavior: T,
    pub memory: T,
}

impl<T> ModelSet<T> {
    pub fn get(&self, kind: ModelKind) -> &T {
        match kind {
            ModelKind::Anomaly => &self.anomaly,
            ModelKind::Fdia => &self.fdia,
            ModelKind::Physics => &self.physics,
            ModelKind::Behavior => &self.behavior,
            ModelKind::Memory => &self.memory,
        }
    }

    /// Iterate entries in fixed model order.
    pub fn iter(&self) -> impl Iterator<Item = (ModelKind, &T)> {
        ModelKind::ALL.iter().map(move |&kind| (kind, self.get(kind)))
    }

    pub fn map<U>(&self, f: impl Fn(ModelKind, &T) -> U) -> ModelSet<U> {
        ModelSet {
            anomaly: f(ModelKind::Anomaly, &self.anomaly),
            fdia: f(ModelKind::Fdia, &self.fdia),
            physics: f(ModelKind::Physics, &self.physics),
            behavior: f(ModelKind::Behavior, &self.behavior),
            memory: f(ModelKind::Memory, &self.memory),
        }
    }
}

impl<T: Clone> ModelSet<T> {
    /// A set with the same value in every slot.
    pub fn splat(value: T) -> Self {
        Self {
            anomaly: value.clone(),
            fdia: value.clone(),
            physics: value.clone(),
            behavior: value.clone(),
            memory: value,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
