//! Fusion Engine
//!
//! Combines the five model outputs into one risk score and verdict:
//!
//!   Risk = w₁·A + w₂·F + w₃·P + w₄·B + w₅·M
//!
//! Weights and decision thresholds come from the validated
//! [`FusionConfig`](crate::config::FusionConfig).

mod explain;
pub mod engine;
pub mod types;

pub use engine::FusionEngine;
pub use types::{Decision, FusionResult};
