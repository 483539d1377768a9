//! Integer-coded enumerations of the wire format.
//!
//! The remote API encodes option, channel, and command kinds as small
//! integers. Each enum here maps one-to-one onto those codes; unknown codes
//! are rejected for option and command kinds (the schema layer cannot act on
//! them) and preserved for channel kinds (new channel kinds appear regularly
//! and must not break event decoding).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal => $label:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )*
        }

        impl $name {
            /// Returns the integer code used on the wire.
            pub const fn code(self) -> u8 {
                match self {
                    $( Self::$variant => $code, )*
                }
            }

            /// Looks up a variant by its wire code.
            pub const fn from_code(code: u8) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$variant), )*
                    _ => None,
                }
            }

            /// Returns a lowercase, human-readable name.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u8(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let code = u8::deserialize(deserializer)?;
                Self::from_code(code).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        concat!("unknown ", stringify!($name), " code {}"),
                        code
                    ))
                })
            }
        }
    };
}

wire_enum! {
    /// The wire type of a command option.
    pub enum OptionType {
        /// Nested sub-command (only used inside command definitions).
        SubCommand = 1 => "sub_command",
        /// Nested sub-command group (only used inside command definitions).
        SubCommandGroup = 2 => "sub_command_group",
        /// Free-form text.
        String = 3 => "string",
        /// 64-bit signed integer.
        Integer = 4 => "integer",
        /// Boolean flag.
        Boolean = 5 => "boolean",
        /// Reference to a user.
        User = 6 => "user",
        /// Reference to a channel.
        Channel = 7 => "channel",
        /// Reference to a role.
        Role = 8 => "role",
        /// Reference to either a user or a role.
        Mentionable = 9 => "mentionable",
        /// Double-precision number.
        Number = 10 => "number",
        /// Uploaded file.
        Attachment = 11 => "attachment",
    }
}

impl OptionType {
    /// Returns `true` if options of this type may carry a choice list.
    pub const fn supports_choices(self) -> bool {
        matches!(self, Self::String | Self::Integer | Self::Number)
    }

    /// Returns `true` for the numeric wire types.
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Number)
    }

    /// Returns `true` for the two nesting kinds that are not value-carrying.
    pub const fn is_nesting(self) -> bool {
        matches!(self, Self::SubCommand | Self::SubCommandGroup)
    }
}

wire_enum! {
    /// The kind of an application command.
    pub enum CommandType {
        /// Slash command typed into the chat input.
        ChatInput = 1 => "chat_input",
        /// Context-menu command on a user.
        User = 2 => "user",
        /// Context-menu command on a message.
        Message = 3 => "message",
    }
}

/// The kind of a channel, used for channel-type filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelType {
    GuildText,
    Dm,
    GuildVoice,
    GroupDm,
    GuildCategory,
    GuildAnnouncement,
    AnnouncementThread,
    PublicThread,
    PrivateThread,
    GuildStageVoice,
    GuildDirectory,
    GuildForum,
    GuildMedia,
    /// A kind this crate does not know about yet.
    Unknown(u8),
}

impl ChannelType {
    /// Returns the integer code used on the wire.
    pub const fn code(self) -> u8 {
        match self {
            Self::GuildText => 0,
            Self::Dm => 1,
            Self::GuildVoice => 2,
            Self::GroupDm => 3,
            Self::GuildCategory => 4,
            Self::GuildAnnouncement => 5,
            Self::AnnouncementThread => 10,
            Self::PublicThread => 11,
            Self::PrivateThread => 12,
            Self::GuildStageVoice => 13,
            Self::GuildDirectory => 14,
            Self::GuildForum => 15,
            Self::GuildMedia => 16,
            Self::Unknown(code) => code,
        }
    }

    /// Maps a wire code to a channel kind.
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::GuildText,
            1 => Self::Dm,
            2 => Self::GuildVoice,
            3 => Self::GroupDm,
            4 => Self::GuildCategory,
            5 => Self::GuildAnnouncement,
            10 => Self::AnnouncementThread,
            11 => Self::PublicThread,
            12 => Self::PrivateThread,
            13 => Self::GuildStageVoice,
            14 => Self::GuildDirectory,
            15 => Self::GuildForum,
            16 => Self::GuildMedia,
            other => Self::Unknown(other),
        }
    }

    /// Returns `true` for any thread kind.
    pub const fn is_thread(self) -> bool {
        matches!(
            self,
            Self::AnnouncementThread | Self::PublicThread | Self::PrivateThread
        )
    }
}

impl Serialize for ChannelType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for ChannelType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u8::deserialize(deserializer).map(Self::from_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_type_codes() {
        assert_eq!(OptionType::String.code(), 3);
        assert_eq!(OptionType::from_code(10), Some(OptionType::Number));
        assert_eq!(OptionType::from_code(99), None);
        assert_eq!(serde_json::to_string(&OptionType::Attachment).unwrap(), "11");
    }

    #[test]
    fn test_choice_support() {
        assert!(OptionType::String.supports_choices());
        assert!(OptionType::Integer.supports_choices());
        assert!(!OptionType::Boolean.supports_choices());
        assert!(!OptionType::Channel.supports_choices());
    }

    #[test]
    fn test_unknown_channel_type_is_preserved() {
        let kind: ChannelType = serde_json::from_str("42").unwrap();
        assert_eq!(kind, ChannelType::Unknown(42));
        assert_eq!(serde_json::to_string(&kind).unwrap(), "42");
    }

    #[test]
    fn test_unknown_command_type_is_rejected() {
        assert!(serde_json::from_str::<CommandType>("7").is_err());
    }
}
