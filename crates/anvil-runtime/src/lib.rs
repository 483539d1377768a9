//! # Anvil Runtime
//!
//! Lifecycle layer of the Anvil command framework:
//!
//! - **Configuration** ([`config`]): layered loading of `AnvilConfig` from
//!   defaults, `anvil.toml` / `anvil.yaml` and `ANVIL_*` variables.
//! - **Logging** ([`logging`]): subscriber setup driven by the configuration.
//! - **Runtime** ([`CommandRuntime`]): compiles the registered commands,
//!   submits them to the configured registration scopes through the
//!   [`Client`](anvil_core::Client) and owns the listener until shutdown.
//!
//! ```rust,ignore
//! use anvil_runtime::CommandRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = CommandRuntime::builder().profile("production").build()?;
//!     runtime.register(|registry| {
//!         registry.slash("ping", "Ping", |cmd| {
//!             cmd.handler(|ctx| async move { ctx.reply("pong").await });
//!         });
//!     })?;
//!
//!     runtime.run(client).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{AnvilConfig, ConfigError, ConfigLoader, ConfigResult, validate_config};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents, init_from_config};
pub use runtime::{CommandRuntime, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for handler code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
