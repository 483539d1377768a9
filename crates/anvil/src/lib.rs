//! # Anvil
//!
//! Typed slash-command schemas and supervised interaction dispatch.
//!
//! ## Architecture
//!
//! ```text
//! declare ──▶ CommandRegistry ──compile──▶ CommandData[] ──▶ Client::replace_commands
//!                                     └──▶ CommandListener
//!                                               ▲      │ one supervised task per event
//!             Client ── InteractionEvent ───────┘      ▼
//!                                             handler(ctx) ──▶ ctx.value(&option)
//! ```
//!
//! - **Options**: typed builders (`string`, `integer`, `option::<User>`, ...)
//!   declare the wire schema and return a handle for reading the parsed value.
//! - **Registry**: collects slash, user and message commands and compiles
//!   them into wire definitions plus a routing table, rejecting schema
//!   mistakes up front.
//! - **Listener**: routes each interaction to its handler on its own task;
//!   a failing or panicking handler never affects the others.
//! - **Runtime**: configuration, logging, registration scopes and shutdown.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use anvil::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = CommandRuntime::new();
//!     runtime.register(|registry| {
//!         registry.slash("roll", "Roll a die", |cmd| {
//!             let sides = cmd.option(integer("sides", "Number of sides").range(2, 100));
//!             cmd.handler(move |ctx| {
//!                 let sides = ctx.value(&sides);
//!                 async move {
//!                     ctx.reply(&format!("rolling d{}", sides?)).await?;
//!                     Ok::<_, BoxError>(())
//!                 }
//!             });
//!         });
//!     })?;
//!
//!     runtime.run(client).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `macros` *(default)*: `#[derive(CommandChoice)]`
//! - `toml-config` *(default)*: `anvil.toml` configuration files
//! - `yaml-config`: `anvil.yaml` configuration files
//! - `json-log`: JSON log format

pub use anvil_core as core;
pub use anvil_framework as framework;
pub use anvil_runtime as runtime;

#[cfg(feature = "macros")]
pub use anvil_macros::CommandChoice;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use anvil::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use anvil_runtime::{AnvilConfig, CommandRuntime, RuntimeError, RuntimeResult};

    // Declaring commands
    pub use anvil_framework::{
        CommandRegistry, GroupBuilder, MessageCommandBuilder, SlashCommandBuilder,
        SubcommandBuilder, UserCommandBuilder,
    };

    // Options
    pub use anvil_framework::{
        ChannelOption, ChoiceOption, NullableOption, NumberOption, OptionBuilder, StringOption,
        TypedOption, channel, choice_option, integer, number, option, serializable, string,
    };

    // Handler contexts
    pub use anvil_framework::{
        AutoCompleteContext, MessageCommandContext, SlashCommandContext, UserCommandContext,
    };

    // Dispatch
    pub use anvil_framework::{CommandListener, FailureReport, Interaction};

    // Errors
    pub use anvil_framework::{BoxError, OptionError, OptionResult, SchemaError};

    // Wire model and client
    pub use anvil_core::{
        Attachment, BoxedClient, Channel, ChannelType, Choice, Client, CommandChoice,
        InteractionEvent, Locale, Mentionable, Role, User, localizations,
    };

    #[cfg(feature = "macros")]
    pub use anvil_macros::CommandChoice;
}
