//! Central Configuration Constants
//!
//! Single source of truth for engine-wide defaults.

/// Engine name
pub const ENGINE_NAME: &str = "Grid Security AI";

/// Engine version
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Nominal grid frequency (Hz), 50 Hz system
pub const NOMINAL_FREQUENCY_HZ: f64 = 50.0;

/// Reference power flow (MW) used for feature scaling
pub const REFERENCE_POWER_MW: f64 = 100.0;
