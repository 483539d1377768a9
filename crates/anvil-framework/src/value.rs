//! Parsed option values and the closed type-to-wire-type mapping.
//!
//! Every raw option entry is first converted into a [`ParsedValue`], a tagged
//! union that carries its own wire type. Typed options then convert that
//! value into their Rust type through [`OptionKind`], which is implemented
//! for exactly the types an option can be declared with:
//!
//! | Rust type | Wire type |
//! |-----------|-----------|
//! | `String` | string |
//! | `i64`, `i32` | integer |
//! | `f64` | number |
//! | `bool` | boolean |
//! | [`User`] | user |
//! | [`Role`] | role |
//! | [`Channel`] | channel |
//! | [`Mentionable`] | mentionable |
//! | [`Attachment`] | attachment |

use anvil_core::{
    Attachment, Channel, ChoiceValue, Mentionable, Number, OptionMapping, OptionType,
    ResolvedData, Role, Snowflake, User,
};
use serde_json::Value;

use crate::error::{OptionError, OptionResult};

/// A raw option value, converted according to its wire type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(User),
    Role(Role),
    Channel(Channel),
    Mentionable(Mentionable),
    Attachment(Attachment),
}

impl ParsedValue {
    /// The wire type this value was delivered as.
    pub fn option_type(&self) -> OptionType {
        match self {
            Self::String(_) => OptionType::String,
            Self::Integer(_) => OptionType::Integer,
            Self::Number(_) => OptionType::Number,
            Self::Boolean(_) => OptionType::Boolean,
            Self::User(_) => OptionType::User,
            Self::Role(_) => OptionType::Role,
            Self::Channel(_) => OptionType::Channel,
            Self::Mentionable(_) => OptionType::Mentionable,
            Self::Attachment(_) => OptionType::Attachment,
        }
    }

    /// Converts a raw option entry, looking entity references up in
    /// `resolved`.
    ///
    /// The entry's own wire type decides the conversion.
    pub fn from_mapping(mapping: &OptionMapping, resolved: &ResolvedData) -> OptionResult<Self> {
        let name = mapping.name.as_str();
        let value = &mapping.value;

        match mapping.kind {
            OptionType::String => value
                .as_str()
                .map(|s| Self::String(s.to_string()))
                .ok_or_else(|| {
                    OptionError::malformed(name, format!("expected text, got {value}"))
                }),
            OptionType::Integer => integer(value)
                .map(Self::Integer)
                .ok_or_else(|| {
                    OptionError::malformed(name, format!("expected an integer, got {value}"))
                }),
            OptionType::Number => value
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| {
                    OptionError::malformed(name, format!("expected a number, got {value}"))
                }),
            OptionType::Boolean => value
                .as_bool()
                .map(Self::Boolean)
                .ok_or_else(|| {
                    OptionError::malformed(name, format!("expected a boolean, got {value}"))
                }),
            OptionType::User => {
                let id = snowflake(name, value)?;
                lookup(name, "user", id, resolved.users.get(&id)).map(Self::User)
            }
            OptionType::Role => {
                let id = snowflake(name, value)?;
                lookup(name, "role", id, resolved.roles.get(&id)).map(Self::Role)
            }
            OptionType::Channel => {
                let id = snowflake(name, value)?;
                lookup(name, "channel", id, resolved.channels.get(&id)).map(Self::Channel)
            }
            OptionType::Attachment => {
                let id = snowflake(name, value)?;
                lookup(name, "attachment", id, resolved.attachments.get(&id))
                    .map(Self::Attachment)
            }
            OptionType::Mentionable => {
                let id = snowflake(name, value)?;
                if let Some(user) = resolved.users.get(&id) {
                    Ok(Self::Mentionable(Mentionable::User(user.clone())))
                } else if let Some(role) = resolved.roles.get(&id) {
                    Ok(Self::Mentionable(Mentionable::Role(role.clone())))
                } else {
                    Err(OptionError::malformed(
                        name,
                        format!("mentionable {id} is not resolved"),
                    ))
                }
            }
            OptionType::SubCommand | OptionType::SubCommandGroup => Err(OptionError::malformed(
                name,
                format!("{} is not a value type", mapping.kind),
            )),
        }
    }
}

fn integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn snowflake(name: &str, value: &Value) -> OptionResult<Snowflake> {
    serde_json::from_value(value.clone())
        .map_err(|e| OptionError::malformed(name, format!("expected an id: {e}")))
}

fn lookup<T: Clone>(name: &str, what: &str, id: Snowflake, found: Option<&T>) -> OptionResult<T> {
    found
        .cloned()
        .ok_or_else(|| OptionError::malformed(name, format!("{what} {id} is not resolved")))
}

// ============================================================================
// OptionKind - the closed mapping table
// ============================================================================

/// A Rust type an option can be declared with.
pub trait OptionKind: Sized + Send + Sync + 'static {
    /// The wire type options of this type are registered as.
    const OPTION_TYPE: OptionType;

    /// Converts a parsed value, or returns `None` if it does not fit.
    fn from_parsed(value: &ParsedValue) -> Option<Self>;
}

macro_rules! option_kind {
    ($ty:ty => $wire:ident, |$v:ident| $conv:expr) => {
        impl OptionKind for $ty {
            const OPTION_TYPE: OptionType = OptionType::$wire;

            fn from_parsed($v: &ParsedValue) -> Option<Self> {
                $conv
            }
        }
    };
}

option_kind!(String => String, |v| match v {
    ParsedValue::String(s) => Some(s.clone()),
    _ => None,
});

option_kind!(i64 => Integer, |v| match v {
    ParsedValue::Integer(n) => Some(*n),
    _ => None,
});

option_kind!(i32 => Integer, |v| match v {
    ParsedValue::Integer(n) => i32::try_from(*n).ok(),
    _ => None,
});

option_kind!(f64 => Number, |v| match v {
    ParsedValue::Number(n) => Some(*n),
    ParsedValue::Integer(n) => Some(*n as f64),
    _ => None,
});

option_kind!(bool => Boolean, |v| match v {
    ParsedValue::Boolean(b) => Some(*b),
    _ => None,
});

option_kind!(User => User, |v| match v {
    ParsedValue::User(user) => Some(user.clone()),
    _ => None,
});

option_kind!(Role => Role, |v| match v {
    ParsedValue::Role(role) => Some(role.clone()),
    _ => None,
});

option_kind!(Channel => Channel, |v| match v {
    ParsedValue::Channel(channel) => Some(channel.clone()),
    _ => None,
});

option_kind!(Attachment => Attachment, |v| match v {
    ParsedValue::Attachment(attachment) => Some(attachment.clone()),
    _ => None,
});

option_kind!(Mentionable => Mentionable, |v| match v {
    ParsedValue::Mentionable(m) => Some(m.clone()),
    ParsedValue::User(user) => Some(Mentionable::User(user.clone())),
    ParsedValue::Role(role) => Some(Mentionable::Role(role.clone())),
    _ => None,
});

/// A numeric option type, usable with range bounds and numeric choices.
pub trait NumberKind: OptionKind + Copy + Into<Number> + Into<ChoiceValue> {}

impl NumberKind for i64 {}
impl NumberKind for f64 {}
