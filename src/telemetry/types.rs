//! Telemetry Types
//!
//! The unit exchanged with the external grid/gateway collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ============================================================================
// BREAKER STATUS
// ============================================================================

/// Breaker state: ON (circuit closed, power may flow) or OFF (circuit open,
/// power flow must be zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BreakerStatus {
    On,
    Off,
}

impl BreakerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerStatus::On => "ON",
            BreakerStatus::Off => "OFF",
        }
    }

    /// Parse the wire representation. Anything other than "ON"/"OFF" is a
    /// validation failure, never a silent default.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "ON" => Ok(BreakerStatus::On),
            "OFF" => Ok(BreakerStatus::Off),
            other => Err(ValidationError::InvalidBreakerStatus { got: other.to_string() }),
        }
    }
}

impl std::fmt::Display for BreakerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// TELEMETRY FIELDS
// ============================================================================

/// The three numeric telemetry channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryField {
    Voltage,
    Frequency,
    PowerFlow,
}

impl TelemetryField {
    pub const ALL: [TelemetryField; 3] =
        [TelemetryField::Voltage, TelemetryField::Frequency, TelemetryField::PowerFlow];

    pub fn as_str(&self) -> &'static str {
        match self {
            TelemetryField::Voltage => "voltage",
            TelemetryField::Frequency => "frequency",
            TelemetryField::PowerFlow => "power_flow",
        }
    }

    /// Display name used in human-readable reasons ("Voltage", "Power flow").
    pub fn display_name(&self) -> &'static str {
        match self {
            TelemetryField::Voltage => "Voltage",
            TelemetryField::Frequency => "Frequency",
            TelemetryField::PowerFlow => "Power flow",
        }
    }

    pub fn value_of(&self, sample: &TelemetrySample) -> f64 {
        match self {
            TelemetryField::Voltage => sample.voltage,
            TelemetryField::Frequency => sample.frequency,
            TelemetryField::PowerFlow => sample.power_flow,
        }
    }
}

// ============================================================================
// RAW INPUT
// ============================================================================

/// Raw telemetry as received from the gateway. All fields are optional at
/// intake; presence/typing rules are enforced by the preprocessor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTelemetry {
    /// Voltage in p.u.
    pub voltage: Option<f64>,
    /// Frequency in Hz
    pub frequency: Option<f64>,
    /// Power flow in MW
    pub power_flow: Option<f64>,
    /// "ON" or "OFF"
    pub breaker_status: Option<String>,
    /// ISO-8601 timestamp
    pub timestamp: Option<String>,
}

impl RawTelemetry {
    /// Build raw telemetry from an untyped JSON value, surfacing mistyped
    /// fields as [`ValidationError`] rather than a deserialize failure.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ValidationError> {
        let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;

        let numeric = |field: &'static str| -> Result<Option<f64>, ValidationError> {
            match obj.get(field) {
                None => Ok(None),
                Some(v) => v
                    .as_f64()
                    .map(Some)
                    .ok_or(ValidationError::NonNumericField { field }),
            }
        };

        let breaker_status = match obj.get("breaker_status") {
            None => None,
            Some(v) => Some(
                v.as_str()
                    .ok_or_else(|| ValidationError::InvalidBreakerStatus { got: v.to_string() })?
                    .to_string(),
            ),
        };

        let timestamp = match obj.get("timestamp") {
            None => None,
            Some(v) => Some(v.as_str().ok_or(ValidationError::NonStringTimestamp)?.to_string()),
        };

        Ok(Self {
            voltage: numeric("voltage")?,
            frequency: numeric("frequency")?,
            power_flow: numeric("power_flow")?,
            breaker_status,
            timestamp,
        })
    }

    /// True when at least one numeric telemetry field is present.
    pub fn has_telemetry(&self) -> bool {
        self.voltage.is_some() || self.frequency.is_some() || self.power_flow.is_some()
    }
}

/// Quick validation check without running the full preprocessor.
pub fn validate_telemetry(value: &serde_json::Value) -> bool {
    match RawTelemetry::from_value(value) {
        Ok(raw) => {
            raw.has_telemetry()
                && raw
                    .breaker_status
                    .as_deref()
                    .map(|s| BreakerStatus::parse(s).is_ok())
                    .unwrap_or(true)
        }
        Err(_) => false,
    }
}

// ============================================================================
// VALIDATED SAMPLE
// ============================================================================

/// One validated telemetry sample with defaults applied. Immutable once
/// created; values are in engineering units (p.u. / Hz / MW).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub voltage: f64,
    pub frequency: f64,
    pub power_flow: f64,
    pub breaker_status: BreakerStatus,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_breaker_parse() {
        assert_eq!(BreakerStatus::parse("ON").unwrap(), BreakerStatus::On);
        assert_eq!(BreakerStatus::parse("OFF").unwrap(), BreakerStatus::Off);
        assert!(BreakerStatus::parse("on").is_err());
        assert!(BreakerStatus::parse("TRIPPED").is_err());
    }

    #[test]
    fn test_from_value_accepts_partial_input() {
        let raw = RawTelemetry::from_value(&json!({"voltage": 1.02})).unwrap();
        assert_eq!(raw.voltage, Some(1.02));
        assert_eq!(raw.frequency, None);
        assert!(raw.has_telemetry());
    }

    #[test]
    fn test_from_value_rejects_non_numeric_field() {
        let result = RawTelemetry::from_value(&json!({"voltage": "1.02"}));
        assert_eq!(result, Err(ValidationError::NonNumericField { field: "voltage" }));

        let result = RawTelemetry::from_value(&json!({"frequency": true}));
        assert_eq!(result, Err(ValidationError::NonNumericField { field: "frequency" }));
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        assert_eq!(RawTelemetry::from_value(&json!([1, 2])), Err(ValidationError::NotAnObject));
    }

    #[test]
    fn test_validate_telemetry_quick_check() {
        assert!(validate_telemetry(&json!({"voltage": 1.0, "breaker_status": "ON"})));
        assert!(!validate_telemetry(&json!({"breaker_status": "ON"}))); // no telemetry field
        assert!(!validate_telemetry(&json!({"voltage": 1.0, "breaker_status": "HALF"})));
        assert!(!validate_telemetry(&json!({"voltage": "high"})));
    }

    #[test]
    fn test_breaker_serde_wire_format() {
        let on = serde_json::to_string(&BreakerStatus::On).unwrap();
        assert_eq!(on, "\"ON\"");
        let off: BreakerStatus = serde_json::from_str("\"OFF\"").unwrap();
        assert_eq!(off, BreakerStatus::Off);
    }
}
