//! UnaTherm Core: record model, error taxonomy, configuration.

pub mod config;
pub mod error;
pub mod record;

pub use config::{EnergyModel, PipelineConfig, RemoteConfig};
pub use error::{Error, Result};
pub use record::{EnrichmentStatus, Record, ThermoParams};
