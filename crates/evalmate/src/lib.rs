//! Employee evaluation engine: derives performance scores from raw HR metrics,
//! prepares model inputs, and explains anomalies.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
