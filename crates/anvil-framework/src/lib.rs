//! # Anvil Framework
//!
//! Typed command schemas and interaction dispatch.
//!
//! This layer provides:
//! - Typed option builders with value pipelines (`option`, `integer`,
//!   `string`, `choice_option`, ...)
//! - Slash, sub-command and context-menu command builders
//! - A registry that validates declarations and compiles them into wire
//!   definitions plus a routing table
//! - A listener that dispatches interactions to handlers under a supervised
//!   task group
//!
//! The framework performs no network I/O. Registration output is handed to a
//! [`Client`](anvil_core::Client) by the runtime, and events are fed in by
//! whatever adapter delivers them.

pub mod command;
pub mod context;
pub mod error;
pub mod handler;
pub mod listener;
pub mod option;
pub mod registry;
pub mod routing;
pub mod value;

pub use command::{
    ContextCommandBuilder, ContextMenu, GroupBuilder, MessageCommandBuilder, SlashCommandBuilder,
    SubcommandBuilder, UserCommandBuilder,
};
pub use context::{
    AutoCompleteContext, MessageCommandContext, SlashCommandContext, UserCommandContext,
};
pub use error::{
    AutoCompleteError, BoxError, OptionError, OptionResult, SchemaError, SchemaResult,
};
pub use handler::{BoxFuture, BoxedHandler, Handler, HandlerResult, IntoHandlerResult, into_handler};
pub use listener::{CommandListener, FailureHook, FailureReport, Interaction};
pub use option::{
    ChannelOption, ChoiceOption, CommandOption, IntoChoiceValue, IntoOption, NullableOption,
    NumberOption, OptionBuilder, ReadOption, StringOption, TypedOption, channel, choice_option,
    integer, number, option, serializable, string,
};
pub use registry::{CommandRegistry, CompiledCommands};
pub use routing::{AutoCompleteKey, CommandKey, RoutingTable, SlashRoute};
pub use value::{NumberKind, OptionKind, ParsedValue};
