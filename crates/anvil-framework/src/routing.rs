//! Routing keys and the compiled routing table.
//!
//! Slash commands are routed by [`CommandKey`] (name plus optional group and
//! sub-command), auto-complete requests by [`AutoCompleteKey`] (a command key
//! plus the focused option), and context-menu commands by plain name.
//!
//! A [`RoutingTable`] is produced once by
//! [`CommandRegistry::compile`](crate::registry::CommandRegistry::compile) and
//! never mutated afterward; in-flight dispatches read it concurrently through
//! an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anvil_core::{AutoCompleteEvent, SlashCommandEvent};

use crate::context::{
    AutoCompleteContext, MessageCommandContext, SlashCommandContext, UserCommandContext,
};
use crate::handler::BoxedHandler;
use crate::option::CommandOption;

// ============================================================================
// Keys
// ============================================================================

/// Identifies one slash-command leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandKey {
    pub name: String,
    pub group: Option<String>,
    pub subcommand: Option<String>,
}

impl CommandKey {
    /// A top-level command without sub-commands.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: None,
            subcommand: None,
        }
    }

    /// A sub-command directly under a command.
    pub fn subcommand(name: impl Into<String>, subcommand: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: None,
            subcommand: Some(subcommand.into()),
        }
    }

    /// A sub-command inside a group.
    pub fn grouped(
        name: impl Into<String>,
        group: impl Into<String>,
        subcommand: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            group: Some(group.into()),
            subcommand: Some(subcommand.into()),
        }
    }

    pub fn from_slash(event: &SlashCommandEvent) -> Self {
        Self {
            name: event.name.clone(),
            group: event.group.clone(),
            subcommand: event.subcommand.clone(),
        }
    }

    pub fn from_auto_complete(event: &AutoCompleteEvent) -> Self {
        Self {
            name: event.name.clone(),
            group: event.group.clone(),
            subcommand: event.subcommand.clone(),
        }
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(group) = &self.group {
            write!(f, " {group}")?;
        }
        if let Some(subcommand) = &self.subcommand {
            write!(f, " {subcommand}")?;
        }
        Ok(())
    }
}

/// Identifies one auto-completable option within a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AutoCompleteKey {
    pub command: CommandKey,
    pub option: String,
}

impl AutoCompleteKey {
    pub fn new(command: CommandKey, option: impl Into<String>) -> Self {
        Self {
            command,
            option: option.into(),
        }
    }

    pub fn from_event(event: &AutoCompleteEvent) -> Self {
        Self::new(
            CommandKey::from_auto_complete(event),
            event.focused.name.clone(),
        )
    }
}

impl fmt::Display for AutoCompleteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.command, self.option)
    }
}

// ============================================================================
// RoutingTable
// ============================================================================

/// A compiled slash-command leaf: its declared options and handler.
#[derive(Clone)]
pub struct SlashRoute {
    pub options: Arc<[CommandOption]>,
    pub handler: BoxedHandler<SlashCommandContext>,
}

/// All routes of a compiled registry.
#[derive(Clone, Default)]
pub struct RoutingTable {
    pub(crate) slash: HashMap<CommandKey, SlashRoute>,
    pub(crate) users: HashMap<String, BoxedHandler<UserCommandContext>>,
    pub(crate) messages: HashMap<String, BoxedHandler<MessageCommandContext>>,
    pub(crate) auto_completes: HashMap<AutoCompleteKey, BoxedHandler<AutoCompleteContext>>,
}

impl RoutingTable {
    pub fn slash(&self, key: &CommandKey) -> Option<&SlashRoute> {
        self.slash.get(key)
    }

    pub fn user(&self, name: &str) -> Option<&BoxedHandler<UserCommandContext>> {
        self.users.get(name)
    }

    pub fn message(&self, name: &str) -> Option<&BoxedHandler<MessageCommandContext>> {
        self.messages.get(name)
    }

    pub fn auto_complete(
        &self,
        key: &AutoCompleteKey,
    ) -> Option<&BoxedHandler<AutoCompleteContext>> {
        self.auto_completes.get(key)
    }

    /// Slash-command keys, sorted.
    pub fn slash_keys(&self) -> Vec<&CommandKey> {
        sorted(self.slash.keys())
    }

    /// User context-menu command names, sorted.
    pub fn user_names(&self) -> Vec<&String> {
        sorted(self.users.keys())
    }

    /// Message context-menu command names, sorted.
    pub fn message_names(&self) -> Vec<&String> {
        sorted(self.messages.keys())
    }

    /// Auto-complete keys, sorted.
    pub fn auto_complete_keys(&self) -> Vec<&AutoCompleteKey> {
        sorted(self.auto_completes.keys())
    }

    /// Total number of routes.
    pub fn len(&self) -> usize {
        self.slash.len() + self.users.len() + self.messages.len() + self.auto_completes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sorted<'a, T: Ord + 'a>(keys: impl Iterator<Item = &'a T>) -> Vec<&'a T> {
    let mut keys: Vec<_> = keys.collect();
    keys.sort();
    keys
}

impl fmt::Debug for RoutingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingTable")
            .field("slash", &self.slash_keys())
            .field("users", &self.user_names())
            .field("messages", &self.message_names())
            .field("auto_completes", &self.auto_complete_keys())
            .finish()
    }
}
