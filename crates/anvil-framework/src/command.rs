//! Command schema builders.
//!
//! Commands are declared through a [`CommandRegistry`](crate::registry::CommandRegistry):
//!
//! ```rust,ignore
//! registry.slash("admin", "Server administration", |cmd| {
//!     cmd.guild_only().default_member_permissions(1 << 28);
//!     cmd.group("roles", "Manage roles", |group| {
//!         group.subcommand("add", "Give a role", |sub| {
//!             let role = sub.option(option::<Role>("role", "The role to give"));
//!             sub.handler(move |ctx| {
//!                 let role = ctx.value(&role);
//!                 async move {
//!                     ctx.reply(&format!("added {}", role?.name)).await?;
//!                     Ok::<_, BoxError>(())
//!                 }
//!             });
//!         });
//!     });
//! });
//! ```
//!
//! A slash command is either a leaf (options plus a handler) or a container of
//! sub-commands and sub-command groups, never both. Mixing the two is caught
//! when the registry is compiled.

use std::future::Future;
use std::marker::PhantomData;

use anvil_core::{CommandType, Localizations};

use crate::context::{MessageCommandContext, SlashCommandContext, UserCommandContext};
use crate::handler::{BoxedHandler, IntoHandlerResult, into_handler};
use crate::option::{CommandOption, IntoOption};

// ============================================================================
// Leaf - options and a handler
// ============================================================================

/// The executable part of a slash command or sub-command.
#[derive(Clone, Default)]
pub(crate) struct Leaf {
    pub(crate) options: Vec<CommandOption>,
    pub(crate) handler: Option<BoxedHandler<SlashCommandContext>>,
}

impl Leaf {
    fn is_empty(&self) -> bool {
        self.options.is_empty() && self.handler.is_none()
    }
}

/// Generates `option` and `handler` for builders that own a [`Leaf`].
macro_rules! leaf_methods {
    ($builder:ty) => {
        impl $builder {
            /// Declares an option and returns the handle for reading its value.
            ///
            /// Options appear on the wire in declaration order.
            pub fn option<O: IntoOption>(&mut self, option: O) -> O::Handle {
                let (schema, handle) = option.into_option();
                self.leaf.options.push(schema);
                handle
            }

            /// Sets the handler, replacing any previous one.
            pub fn handler<F, Fut, R>(&mut self, handler: F) -> &mut Self
            where
                F: Fn(SlashCommandContext) -> Fut + Send + Sync + 'static,
                Fut: Future<Output = R> + Send + 'static,
                R: IntoHandlerResult,
            {
                self.leaf.handler = Some(into_handler(handler));
                self
            }
        }
    };
}

// ============================================================================
// SlashCommandBuilder
// ============================================================================

/// Builder for a top-level slash command.
#[derive(Clone)]
pub struct SlashCommandBuilder {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) name_localizations: Localizations,
    pub(crate) description_localizations: Localizations,
    pub(crate) permissions: Permissions,
    pub(crate) leaf: Leaf,
    pub(crate) children: Vec<Child>,
}

/// A sub-command or group nested under a slash command, in declaration order.
#[derive(Clone)]
pub(crate) enum Child {
    Subcommand(SubcommandBuilder),
    Group(GroupBuilder),
}

impl Child {
    pub(crate) fn name(&self) -> &str {
        match self {
            Self::Subcommand(sub) => &sub.name,
            Self::Group(group) => &group.name,
        }
    }
}

impl SlashCommandBuilder {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            name_localizations: Localizations::new(),
            description_localizations: Localizations::new(),
            permissions: Permissions::default(),
            leaf: Leaf::default(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the command declares neither a handler nor options
    /// of its own.
    pub(crate) fn is_container(&self) -> bool {
        self.leaf.is_empty()
    }

    /// Declares a sub-command directly under this command.
    pub fn subcommand(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        init: impl FnOnce(&mut SubcommandBuilder),
    ) -> &mut Self {
        let mut sub = SubcommandBuilder::new(name, description);
        init(&mut sub);
        self.children.push(Child::Subcommand(sub));
        self
    }

    /// Declares a sub-command group.
    pub fn group(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        init: impl FnOnce(&mut GroupBuilder),
    ) -> &mut Self {
        let mut group = GroupBuilder::new(name, description);
        init(&mut group);
        self.children.push(Child::Group(group));
        self
    }

    pub fn name_localizations(&mut self, localizations: Localizations) -> &mut Self {
        self.name_localizations = localizations;
        self
    }

    pub fn description_localizations(&mut self, localizations: Localizations) -> &mut Self {
        self.description_localizations = localizations;
        self
    }

    /// Restricts the command to members holding every permission in `bits`.
    pub fn default_member_permissions(&mut self, bits: u64) -> &mut Self {
        self.permissions.default_member_permissions = Some(bits);
        self
    }

    /// Marks the command as age-restricted.
    pub fn nsfw(&mut self, nsfw: bool) -> &mut Self {
        self.permissions.nsfw = nsfw;
        self
    }

    /// Hides the command from direct messages.
    pub fn guild_only(&mut self) -> &mut Self {
        self.permissions.guild_only = true;
        self
    }
}

leaf_methods!(SlashCommandBuilder);

// ============================================================================
// Sub-commands and groups
// ============================================================================

/// Builder for a sub-command.
#[derive(Clone)]
pub struct SubcommandBuilder {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) name_localizations: Localizations,
    pub(crate) description_localizations: Localizations,
    pub(crate) leaf: Leaf,
}

impl SubcommandBuilder {
    fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            name_localizations: Localizations::new(),
            description_localizations: Localizations::new(),
            leaf: Leaf::default(),
        }
    }

    pub fn name_localizations(&mut self, localizations: Localizations) -> &mut Self {
        self.name_localizations = localizations;
        self
    }

    pub fn description_localizations(&mut self, localizations: Localizations) -> &mut Self {
        self.description_localizations = localizations;
        self
    }
}

leaf_methods!(SubcommandBuilder);

/// Builder for a sub-command group.
#[derive(Clone)]
pub struct GroupBuilder {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) name_localizations: Localizations,
    pub(crate) description_localizations: Localizations,
    pub(crate) subcommands: Vec<SubcommandBuilder>,
}

impl GroupBuilder {
    fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            name_localizations: Localizations::new(),
            description_localizations: Localizations::new(),
            subcommands: Vec::new(),
        }
    }

    /// Declares a sub-command inside this group.
    pub fn subcommand(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        init: impl FnOnce(&mut SubcommandBuilder),
    ) -> &mut Self {
        let mut sub = SubcommandBuilder::new(name, description);
        init(&mut sub);
        self.subcommands.push(sub);
        self
    }

    pub fn name_localizations(&mut self, localizations: Localizations) -> &mut Self {
        self.name_localizations = localizations;
        self
    }

    pub fn description_localizations(&mut self, localizations: Localizations) -> &mut Self {
        self.description_localizations = localizations;
        self
    }
}

// ============================================================================
// Context-menu commands
// ============================================================================

/// Command-level access settings shared by every command kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Permissions {
    pub(crate) default_member_permissions: Option<u64>,
    pub(crate) guild_only: bool,
    pub(crate) nsfw: bool,
}

/// Marker for the context type served by a context-menu command.
pub trait ContextMenu: Send + 'static {
    const COMMAND_TYPE: CommandType;
}

impl ContextMenu for UserCommandContext {
    const COMMAND_TYPE: CommandType = CommandType::User;
}

impl ContextMenu for MessageCommandContext {
    const COMMAND_TYPE: CommandType = CommandType::Message;
}

/// Builder for a user or message context-menu command.
///
/// Context-menu names are shown verbatim in the client, so unlike slash
/// command names they may contain spaces and capitals.
pub struct ContextCommandBuilder<C> {
    pub(crate) name: String,
    pub(crate) name_localizations: Localizations,
    pub(crate) permissions: Permissions,
    pub(crate) handler: BoxedHandler<C>,
    _context: PhantomData<fn(C)>,
}

impl<C> Clone for ContextCommandBuilder<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            name_localizations: self.name_localizations.clone(),
            permissions: self.permissions,
            handler: self.handler.clone(),
            _context: PhantomData,
        }
    }
}

impl<C: ContextMenu> ContextCommandBuilder<C> {
    pub fn new<F, Fut, R>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoHandlerResult,
    {
        Self {
            name: name.into(),
            name_localizations: Localizations::new(),
            permissions: Permissions::default(),
            handler: into_handler(handler),
            _context: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_localizations(&mut self, localizations: Localizations) -> &mut Self {
        self.name_localizations = localizations;
        self
    }

    /// Restricts the command to members holding every permission in `bits`.
    pub fn default_member_permissions(&mut self, bits: u64) -> &mut Self {
        self.permissions.default_member_permissions = Some(bits);
        self
    }

    pub fn nsfw(&mut self, nsfw: bool) -> &mut Self {
        self.permissions.nsfw = nsfw;
        self
    }

    /// Hides the command from direct messages.
    pub fn guild_only(&mut self) -> &mut Self {
        self.permissions.guild_only = true;
        self
    }
}

pub type UserCommandBuilder = ContextCommandBuilder<UserCommandContext>;
pub type MessageCommandBuilder = ContextCommandBuilder<MessageCommandContext>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{integer, string};

    #[test]
    fn test_leaf_declaration_order() {
        let mut cmd = SlashCommandBuilder::new("roll", "Roll dice");
        let _sides = cmd.option(integer("sides", "Sides"));
        let _label = cmd.option(string("label", "Label").optional());
        cmd.handler(|_ctx| async {});

        let names: Vec<_> = cmd.leaf.options.iter().map(CommandOption::name).collect();
        assert_eq!(names, ["sides", "label"]);
        assert!(cmd.leaf.handler.is_some());
        assert!(!cmd.is_container());
    }

    #[test]
    fn test_nested_declaration() {
        let mut cmd = SlashCommandBuilder::new("admin", "Administration");
        cmd.subcommand("ping", "Ping", |sub| {
            sub.handler(|_ctx| async {});
        })
        .group("roles", "Roles", |group| {
            group.subcommand("add", "Add", |_| {});
            group.subcommand("remove", "Remove", |_| {});
        });

        assert!(cmd.is_container());
        let names: Vec<_> = cmd.children.iter().map(Child::name).collect();
        assert_eq!(names, ["ping", "roles"]);
        let Child::Group(group) = &cmd.children[1] else {
            panic!("second child is a group");
        };
        assert_eq!(group.subcommands.len(), 2);
    }

    #[test]
    fn test_context_command_settings() {
        let mut cmd = UserCommandBuilder::new("Show Avatar", |_ctx: UserCommandContext| async {});
        cmd.guild_only().default_member_permissions(8);

        assert_eq!(cmd.name(), "Show Avatar");
        assert!(cmd.permissions.guild_only);
        assert_eq!(cmd.permissions.default_member_permissions, Some(8));
    }
}
