//! Configuration for the Anvil runtime.
//!
//! Settings are layered from defaults, `anvil.toml` / `anvil.yaml` files and
//! `ANVIL_*` environment variables, then validated before use.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    AnvilConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, RegistrationConfig,
    RegistrationScope, SpanEventConfig,
};
pub use validation::validate_config;
