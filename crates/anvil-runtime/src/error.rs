//! Runtime error types.

use anvil_core::{ApiError, CommandScope};
use anvil_framework::SchemaError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The registered commands failed to compile.
    #[error("Invalid command schema: {0}")]
    Schema(#[from] SchemaError),

    /// The client rejected a registration.
    #[error("Failed to register commands in {scope}: {source}")]
    Registration {
        scope: CommandScope,
        #[source]
        source: ApiError,
    },

    /// The runtime already has a live listener.
    #[error("Runtime is already started")]
    AlreadyStarted,
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
