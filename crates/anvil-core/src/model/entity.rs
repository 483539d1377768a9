//! Remote entities referenced by option values.
//!
//! Interaction payloads carry entity options as bare ids; the full objects
//! arrive alongside in a `resolved` section. These types model the subset of
//! fields the command layer needs.

use serde::{Deserialize, Serialize};

use super::id::Snowflake;
use super::kind::ChannelType;

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// The name to show for this user: the global display name if set,
    /// otherwise the username.
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

/// A role within a guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub position: i32,
}

/// A channel, as resolved from a channel option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: ChannelType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Snowflake>,
}

/// An uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Snowflake,
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// The value of a mentionable option: either a user or a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mentionable {
    User(User),
    Role(Role),
}

impl Mentionable {
    /// The id of the mentioned entity.
    pub fn id(&self) -> Snowflake {
        match self {
            Self::User(user) => user.id,
            Self::Role(role) => role.id,
        }
    }

    /// Renders the entity as a chat mention.
    pub fn mention(&self) -> String {
        match self {
            Self::User(user) => format!("<@{}>", user.id),
            Self::Role(role) => format!("<@&{}>", role.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_display_name() {
        let mut user: User =
            serde_json::from_value(json!({ "id": "1", "username": "ferris" })).unwrap();
        assert_eq!(user.display_name(), "ferris");
        assert!(!user.bot);

        user.global_name = Some("Ferris the Crab".into());
        assert_eq!(user.display_name(), "Ferris the Crab");
    }

    #[test]
    fn test_channel_kind_field() {
        let channel: Channel =
            serde_json::from_value(json!({ "id": "9", "type": 11, "name": "help" })).unwrap();
        assert_eq!(channel.kind, ChannelType::PublicThread);
        assert!(channel.kind.is_thread());
    }

    #[test]
    fn test_mention() {
        let role = Role {
            id: Snowflake(5),
            name: "mods".into(),
            color: 0,
            position: 1,
        };
        assert_eq!(Mentionable::Role(role).mention(), "<@&5>");
    }
}
