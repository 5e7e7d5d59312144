//! Shared runtime pieces for the rolegate crates: the HTTP error type,
//! layered configuration, and tracing setup.

pub mod config;
pub mod error;
pub mod layers;

pub use config::{ConfigError, ConfigValue, FromConfigValue, RolegateConfig};
pub use error::{error_response, HttpError};
pub use layers::{default_trace, init_tracing};
