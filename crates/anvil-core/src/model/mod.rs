//! Wire model of the remote command API.
//!
//! Everything here is plain data with serde support, shaped after the JSON
//! the remote side sends and accepts.

pub mod choice;
pub mod command;
pub mod entity;
pub mod id;
pub mod kind;
pub mod locale;

pub use choice::{Choice, ChoiceValue, CommandChoice, Number};
pub use command::{CommandData, OptionData};
pub use entity::{Attachment, Channel, Mentionable, Role, User};
pub use id::Snowflake;
pub use kind::{ChannelType, CommandType, OptionType};
pub use locale::{Locale, Localizations, UnknownLocale, localizations};
