//! # Anvil Core
//!
//! Wire model and client surface of the Anvil command framework.
//!
//! This crate holds everything that is shared between the command framework
//! and the client that talks to the remote API:
//!
//! - **Wire model** ([`model`]): option, command, and channel kinds, choices,
//!   locales, entity references, and the command definitions submitted for
//!   registration ([`CommandData`], [`OptionData`]).
//! - **Events** ([`event`]): the four interaction kinds the client delivers,
//!   wrapped in [`InteractionEvent`].
//! - **Client** ([`client`]): the [`Client`] trait the framework calls to
//!   replace registered commands and answer interactions.
//!
//! ```text
//! ┌──────────┐  InteractionEvent  ┌─────────────────┐
//! │  Client  │───────────────────▶│ CommandListener │
//! │ (remote) │◀───────────────────│   (framework)   │
//! └──────────┘  replace / reply   └─────────────────┘
//! ```

pub mod client;
pub mod error;
pub mod event;
pub mod model;

pub use client::{BoxedClient, Client, CommandScope};
pub use error::{ApiError, ApiResult};
pub use event::{
    AutoCompleteEvent, FocusedOption, InteractionEvent, InteractionInfo, Message,
    MessageContextEvent, OptionMapping, ResolvedData, SlashCommandEvent, UserContextEvent,
};
pub use model::{
    Attachment, Channel, ChannelType, Choice, ChoiceValue, CommandChoice, CommandData,
    CommandType, Locale, Localizations, Mentionable, Number, OptionData, OptionType, Role,
    Snowflake, UnknownLocale, User, localizations,
};
