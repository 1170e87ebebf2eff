//! Telemetry Module - Input types exchanged with the gateway
//!
//! Data structures and intake validation only - no scoring logic.

pub mod types;

pub use types::{validate_telemetry, BreakerStatus, RawTelemetry, TelemetryField, TelemetrySample};
