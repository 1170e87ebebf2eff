//! Grid Security AI - Multi-Model Risk Scoring Core
//!
//! Assesses power-grid telemetry/control commands for signs of
//! cyber-physical attack and returns a graded verdict (SAFE / WARNING /
//! CRITICAL) with a risk score, a confidence value and a human-readable
//! explanation. Consumed by a gateway that allows, flags or blocks
//! operator commands.
//!
//! One analyze call runs the full pipeline:
//!
//! ```text
//! raw sample → preprocess → [anomaly, fdia, physics, behavior, memory] → fusion → report
//! ```
//!
//! # Example
//!
//! ```
//! use grid_ai_core::{AiPipeline, RawTelemetry};
//!
//! let mut pipeline = AiPipeline::new();
//! let report = pipeline.analyze(&RawTelemetry {
//!     voltage: Some(1.02),
//!     frequency: Some(50.1),
//!     power_flow: Some(105.3),
//!     breaker_status: Some("ON".to_string()),
//!     timestamp: Some("2026-01-31T10:00:00".to_string()),
//! });
//! println!("{}: {}", report.decision, report.explanation);
//! ```
//!
//! The pipeline is synchronous and CPU-only. It mutates history state on
//! every call; wrap it in [`SharedPipeline`] when the surrounding server
//! accepts requests in parallel.

pub mod config;
pub mod constants;
pub mod error;
pub mod features;
pub mod fusion;
pub mod models;
pub mod pipeline;
pub mod preprocess;
pub mod telemetry;

pub use config::{DecisionThresholds, EngineConfig, FusionConfig, FusionWeights};
pub use error::{ConfigError, EngineError, EngineResult, ValidationError};
pub use fusion::{Decision, FusionEngine, FusionResult};
pub use models::{ModelKind, ModelOutput, ModelSet};
pub use pipeline::{AiPipeline, AnalysisReport, PipelineStats, SharedPipeline};
pub use preprocess::Preprocessor;
pub use telemetry::{BreakerStatus, RawTelemetry, TelemetrySample};
