//! Telemetry source layer
//!
//! Provides trait-based access to GPU metrics so the monitor can be driven
//! by `nvidia-smi` in production and by scripted sources in tests.

pub mod parse;
pub mod smi;
pub mod traits;

pub use parse::parse_csv;
pub use smi::NvidiaSmi;
pub use traits::TelemetrySource;
