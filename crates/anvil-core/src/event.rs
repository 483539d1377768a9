//! Interaction events delivered by the client.
//!
//! The client decodes raw gateway payloads into one of four event kinds and
//! hands them to the command listener wrapped in [`InteractionEvent`]. Slash
//! command and auto-complete events arrive with their sub-command path already
//! flattened into `group` / `subcommand`, and with the leaf's options as a flat
//! list.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Attachment, Channel, Locale, OptionType, Role, Snowflake, User};

// ============================================================================
// Shared interaction data
// ============================================================================

/// Fields common to every interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionInfo {
    pub id: Snowflake,
    pub application_id: Snowflake,
    /// Continuation token used to answer the interaction.
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<Snowflake>,
    /// The invoking user.
    pub user: User,
    /// The invoking user's locale code, as sent by the remote side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl InteractionInfo {
    /// Returns the invoking user's locale if it is one this crate knows.
    pub fn locale(&self) -> Option<Locale> {
        self.locale.as_deref().and_then(|code| code.parse().ok())
    }
}

/// A single `(name, value)` option entry of an invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionMapping {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OptionType,
    /// Raw JSON value. Entity options carry the entity id as a string.
    pub value: Value,
}

impl OptionMapping {
    pub fn new(name: impl Into<String>, kind: OptionType, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
        }
    }
}

/// Entities referenced by entity-typed options, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedData {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub users: HashMap<Snowflake, User>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub roles: HashMap<Snowflake, Role>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub channels: HashMap<Snowflake, Channel>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attachments: HashMap<Snowflake, Attachment>,
}

/// A message, as targeted by a message context-menu command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub author: User,
    #[serde(default)]
    pub content: String,
}

/// Renders a `name [group] [subcommand]` path for logs.
struct CommandPath<'a> {
    name: &'a str,
    group: Option<&'a str>,
    subcommand: Option<&'a str>,
}

impl fmt::Display for CommandPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)?;
        for part in [self.group, self.subcommand].into_iter().flatten() {
            write!(f, " {part}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Event kinds
// ============================================================================

/// A slash command invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlashCommandEvent {
    #[serde(flatten)]
    pub info: InteractionInfo,
    /// Top-level command name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcommand: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionMapping>,
    #[serde(default)]
    pub resolved: ResolvedData,
}

impl SlashCommandEvent {
    /// Creates an event for `name` with no options.
    pub fn new(info: InteractionInfo, name: impl Into<String>) -> Self {
        Self {
            info,
            name: name.into(),
            group: None,
            subcommand: None,
            options: Vec::new(),
            resolved: ResolvedData::default(),
        }
    }

    /// Sets the sub-command group and sub-command.
    pub fn with_path(mut self, group: Option<&str>, subcommand: Option<&str>) -> Self {
        self.group = group.map(str::to_string);
        self.subcommand = subcommand.map(str::to_string);
        self
    }

    /// Appends an option entry.
    pub fn with_option(mut self, option: OptionMapping) -> Self {
        self.options.push(option);
        self
    }

    /// Looks up the option entry bound to `name`.
    pub fn option(&self, name: &str) -> Option<&OptionMapping> {
        self.options.iter().find(|option| option.name == name)
    }

    /// The full invoked path, e.g. `"admin roles add"`.
    pub fn path(&self) -> String {
        CommandPath {
            name: &self.name,
            group: self.group.as_deref(),
            subcommand: self.subcommand.as_deref(),
        }
        .to_string()
    }
}

/// A user context-menu invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContextEvent {
    #[serde(flatten)]
    pub info: InteractionInfo,
    pub name: String,
    /// The user the menu was opened on.
    pub target: User,
}

/// A message context-menu invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageContextEvent {
    #[serde(flatten)]
    pub info: InteractionInfo,
    pub name: String,
    /// The message the menu was opened on.
    pub target: Message,
}

/// The option currently being typed in an auto-complete request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusedOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OptionType,
    /// Partial input typed so far, always text.
    #[serde(default)]
    pub value: String,
}

/// An auto-complete request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoCompleteEvent {
    #[serde(flatten)]
    pub info: InteractionInfo,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcommand: Option<String>,
    pub focused: FocusedOption,
    /// Other options filled in so far.
    #[serde(default)]
    pub options: Vec<OptionMapping>,
}

impl AutoCompleteEvent {
    /// Creates a request for `name` with the given focused option.
    pub fn new(info: InteractionInfo, name: impl Into<String>, focused: FocusedOption) -> Self {
        Self {
            info,
            name: name.into(),
            group: None,
            subcommand: None,
            focused,
            options: Vec::new(),
        }
    }

    /// Sets the sub-command group and sub-command.
    pub fn with_path(mut self, group: Option<&str>, subcommand: Option<&str>) -> Self {
        self.group = group.map(str::to_string);
        self.subcommand = subcommand.map(str::to_string);
        self
    }

    /// The full invoked path, e.g. `"admin roles add"`.
    pub fn path(&self) -> String {
        CommandPath {
            name: &self.name,
            group: self.group.as_deref(),
            subcommand: self.subcommand.as_deref(),
        }
        .to_string()
    }
}

/// Any interaction the command listener can route.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    SlashCommand(SlashCommandEvent),
    UserContext(UserContextEvent),
    MessageContext(MessageContextEvent),
    AutoComplete(AutoCompleteEvent),
}

impl InteractionEvent {
    /// Fields common to every interaction.
    pub fn info(&self) -> &InteractionInfo {
        match self {
            Self::SlashCommand(e) => &e.info,
            Self::UserContext(e) => &e.info,
            Self::MessageContext(e) => &e.info,
            Self::AutoComplete(e) => &e.info,
        }
    }

    /// A short name for the event kind, used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::SlashCommand(_) => "slash_command",
            Self::UserContext(_) => "user_context",
            Self::MessageContext(_) => "message_context",
            Self::AutoComplete(_) => "auto_complete",
        }
    }
}

impl From<SlashCommandEvent> for InteractionEvent {
    fn from(event: SlashCommandEvent) -> Self {
        Self::SlashCommand(event)
    }
}

impl From<UserContextEvent> for InteractionEvent {
    fn from(event: UserContextEvent) -> Self {
        Self::UserContext(event)
    }
}

impl From<MessageContextEvent> for InteractionEvent {
    fn from(event: MessageContextEvent) -> Self {
        Self::MessageContext(event)
    }
}

impl From<AutoCompleteEvent> for InteractionEvent {
    fn from(event: AutoCompleteEvent) -> Self {
        Self::AutoComplete(event)
    }
}
