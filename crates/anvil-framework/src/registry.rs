//! The command registry and its compiler.
//!
//! A [`CommandRegistry`] collects declarations from any number of call sites
//! and is compiled once into the wire definitions to register and a
//! [`CommandListener`] holding every route. Compilation validates the whole
//! declaration set and fails on the first configuration mistake; nothing is
//! produced in that case.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use anvil_core::{CommandData, CommandType, OptionData, OptionType};
use tracing::{debug, info, warn};

use crate::command::{
    Child, ContextCommandBuilder, ContextMenu, Leaf, MessageCommandBuilder, Permissions,
    SlashCommandBuilder, SubcommandBuilder, UserCommandBuilder,
};
use crate::context::{MessageCommandContext, UserCommandContext};
use crate::error::{SchemaError, SchemaResult};
use crate::handler::{BoxedHandler, IntoHandlerResult};
use crate::listener::CommandListener;
use crate::option::{CommandOption, MAX_CHOICES, MAX_OPTIONS};
use crate::routing::{AutoCompleteKey, CommandKey, RoutingTable, SlashRoute};

/// Longest accepted command or option name, in characters.
pub const MAX_NAME_LENGTH: usize = 32;

// ============================================================================
// CommandRegistry
// ============================================================================

/// Collects command declarations.
///
/// ```rust,ignore
/// let mut registry = CommandRegistry::new();
/// registry.register(fun::commands).register(admin::commands);
/// let CompiledCommands { commands, listener } = registry.compile()?;
/// ```
#[derive(Clone, Default)]
pub struct CommandRegistry {
    slash: Vec<SlashCommandBuilder>,
    users: Vec<UserCommandBuilder>,
    messages: Vec<MessageCommandBuilder>,
    order: Vec<Declared>,
}

/// Position of one declaration in its kind's list.
#[derive(Debug, Clone, Copy)]
enum Declared {
    Slash(usize),
    User(usize),
    Message(usize),
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a declaration function against this registry.
    pub fn register(&mut self, declare: impl FnOnce(&mut Self)) -> &mut Self {
        declare(self);
        self
    }

    /// Declares a slash command.
    pub fn slash(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        init: impl FnOnce(&mut SlashCommandBuilder),
    ) -> &mut Self {
        let mut builder = SlashCommandBuilder::new(name, description);
        init(&mut builder);
        self.add(builder)
    }

    /// Adds a slash command built elsewhere.
    pub fn add(&mut self, builder: SlashCommandBuilder) -> &mut Self {
        self.order.push(Declared::Slash(self.slash.len()));
        self.slash.push(builder);
        self
    }

    /// Declares a user context-menu command and returns it for further
    /// configuration.
    pub fn user<F, Fut, R>(
        &mut self,
        name: impl Into<String>,
        handler: F,
    ) -> &mut UserCommandBuilder
    where
        F: Fn(UserCommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoHandlerResult,
    {
        let index = self.users.len();
        self.order.push(Declared::User(index));
        self.users.push(ContextCommandBuilder::new(name, handler));
        &mut self.users[index]
    }

    /// Declares a message context-menu command and returns it for further
    /// configuration.
    pub fn message<F, Fut, R>(
        &mut self,
        name: impl Into<String>,
        handler: F,
    ) -> &mut MessageCommandBuilder
    where
        F: Fn(MessageCommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoHandlerResult,
    {
        let index = self.messages.len();
        self.order.push(Declared::Message(index));
        self.messages.push(ContextCommandBuilder::new(name, handler));
        &mut self.messages[index]
    }

    /// Number of declared top-level commands.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Validates every declaration and builds the wire definitions and
    /// routes.
    ///
    /// Compiling the same registry twice yields equal definitions and equal
    /// routing keys.
    pub fn compile(&self) -> SchemaResult<CompiledCommands> {
        let mut compiler = Compiler::default();
        let mut commands = Vec::with_capacity(self.order.len());

        for declared in &self.order {
            let data = match *declared {
                Declared::Slash(i) => compiler.slash(&self.slash[i])?,
                Declared::User(i) => compiler.context(&self.users[i], |routes| &mut routes.users)?,
                Declared::Message(i) => {
                    compiler.context(&self.messages[i], |routes| &mut routes.messages)?
                }
            };
            commands.push(data);
        }

        let routes = compiler.routes;
        info!(
            commands = commands.len(),
            slash = routes.slash.len(),
            users = routes.users.len(),
            messages = routes.messages.len(),
            auto_completes = routes.auto_completes.len(),
            "Compiled command registry"
        );

        Ok(CompiledCommands {
            commands,
            listener: CommandListener::new(routes),
        })
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("slash", &self.slash.iter().map(SlashCommandBuilder::name).collect::<Vec<_>>())
            .field("users", &self.users.iter().map(|b| b.name()).collect::<Vec<_>>())
            .field("messages", &self.messages.iter().map(|b| b.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// The output of [`CommandRegistry::compile`].
pub struct CompiledCommands {
    /// Wire definitions, in declaration order.
    pub commands: Vec<CommandData>,
    /// The dispatcher holding every route.
    pub listener: CommandListener,
}

// ============================================================================
// Compiler
// ============================================================================

#[derive(Default)]
struct Compiler {
    routes: RoutingTable,
    slash_names: HashSet<String>,
}

impl Compiler {
    fn slash(&mut self, builder: &SlashCommandBuilder) -> SchemaResult<CommandData> {
        validate_name(&builder.name)?;
        if !self.slash_names.insert(builder.name.clone()) {
            return Err(SchemaError::DuplicateCommand(CommandKey::new(&builder.name)));
        }

        let mut data =
            CommandData::new(CommandType::ChatInput, &builder.name, &builder.description);
        data.name_localizations = builder.name_localizations.clone();
        data.description_localizations = builder.description_localizations.clone();
        apply_permissions(&mut data, builder.permissions);

        if builder.children.is_empty() {
            let key = CommandKey::new(&builder.name);
            data.options = self.leaf(&key, &builder.leaf)?;
            return Ok(data);
        }

        if !builder.is_container() {
            return Err(SchemaError::MixedCommandKinds(builder.name.clone()));
        }
        check_count(&builder.name, builder.children.len())?;
        check_unique(&builder.name, builder.children.iter().map(Child::name))?;

        for child in &builder.children {
            let option = match child {
                Child::Subcommand(sub) => {
                    let key = CommandKey::subcommand(&builder.name, &sub.name);
                    self.subcommand(key, sub)?
                }
                Child::Group(group) => {
                    validate_name(&group.name)?;
                    if group.subcommands.is_empty() {
                        return Err(SchemaError::EmptyGroup {
                            command: builder.name.clone(),
                            group: group.name.clone(),
                        });
                    }

                    let path = format!("{} {}", builder.name, group.name);
                    check_count(&path, group.subcommands.len())?;
                    check_unique(&path, group.subcommands.iter().map(|s| s.name.as_str()))?;

                    let mut option = OptionData::new(
                        OptionType::SubCommandGroup,
                        &group.name,
                        &group.description,
                    );
                    option.name_localizations = group.name_localizations.clone();
                    option.description_localizations = group.description_localizations.clone();
                    for sub in &group.subcommands {
                        let key = CommandKey::grouped(&builder.name, &group.name, &sub.name);
                        option.options.push(self.subcommand(key, sub)?);
                    }
                    option
                }
            };
            data.options.push(option);
        }

        Ok(data)
    }

    fn subcommand(&mut self, key: CommandKey, sub: &SubcommandBuilder) -> SchemaResult<OptionData> {
        validate_name(&sub.name)?;
        let mut option = OptionData::new(OptionType::SubCommand, &sub.name, &sub.description);
        option.name_localizations = sub.name_localizations.clone();
        option.description_localizations = sub.description_localizations.clone();
        option.options = self.leaf(&key, &sub.leaf)?;
        Ok(option)
    }

    /// Validates a leaf's options, routes its handler and auto-complete
    /// handlers, and returns the option definitions.
    fn leaf(&mut self, key: &CommandKey, leaf: &Leaf) -> SchemaResult<Vec<OptionData>> {
        let path = key.to_string();
        let Some(handler) = &leaf.handler else {
            return Err(SchemaError::MissingHandler(path));
        };

        check_count(&path, leaf.options.len())?;
        check_unique(&path, leaf.options.iter().map(CommandOption::name))?;

        let mut seen_optional = false;
        for option in &leaf.options {
            validate_option(&path, option)?;
            if option.is_required() && seen_optional {
                return Err(SchemaError::RequiredAfterOptional {
                    command: path,
                    option: option.name().to_string(),
                });
            }
            seen_optional |= !option.is_required();
        }

        if self.routes.slash.contains_key(key) {
            return Err(SchemaError::DuplicateCommand(key.clone()));
        }

        for option in &leaf.options {
            if let Some(handler) = option.auto_complete_handler() {
                let ac_key = AutoCompleteKey::new(key.clone(), option.name());
                debug!(route = %ac_key, "Routing auto-complete handler");
                self.routes
                    .auto_completes
                    .insert(ac_key, Arc::clone(handler));
            }
        }

        self.routes.slash.insert(
            key.clone(),
            SlashRoute {
                options: leaf.options.iter().cloned().collect(),
                handler: Arc::clone(handler),
            },
        );
        debug!(command = %key, options = leaf.options.len(), "Routing slash command");

        Ok(leaf.options.iter().map(CommandOption::build).collect())
    }

    fn context<C, F>(
        &mut self,
        builder: &ContextCommandBuilder<C>,
        table: F,
    ) -> SchemaResult<CommandData>
    where
        C: ContextMenu,
        F: FnOnce(&mut RoutingTable) -> &mut HashMap<String, BoxedHandler<C>>,
    {
        let kind = C::COMMAND_TYPE;
        let length = builder.name.chars().count();
        if length == 0 || length > MAX_NAME_LENGTH {
            return Err(SchemaError::InvalidName {
                name: builder.name.clone(),
                reason: "context-menu names must be 1 to 32 characters long",
            });
        }

        let routes = table(&mut self.routes);
        if routes.contains_key(&builder.name) {
            return Err(SchemaError::DuplicateContextCommand {
                kind,
                name: builder.name.clone(),
            });
        }
        routes.insert(builder.name.clone(), Arc::clone(&builder.handler));
        debug!(command = %builder.name, %kind, "Routing context-menu command");

        let mut data = CommandData::new(kind, &builder.name, "");
        data.name_localizations = builder.name_localizations.clone();
        apply_permissions(&mut data, builder.permissions);
        Ok(data)
    }
}

fn apply_permissions(data: &mut CommandData, permissions: Permissions) {
    data.default_member_permissions = permissions
        .default_member_permissions
        .map(|bits| bits.to_string());
    if permissions.guild_only {
        data.dm_permission = Some(false);
    }
    data.nsfw = permissions.nsfw;
}

// ============================================================================
// Validation
// ============================================================================

/// Checks a slash command, group, sub-command, or option name.
///
/// Names are 1 to 32 characters of lowercase letters, digits, `-` and `_`.
pub fn validate_name(name: &str) -> SchemaResult<()> {
    let invalid = |reason| {
        Err(SchemaError::InvalidName {
            name: name.to_string(),
            reason,
        })
    };

    let length = name.chars().count();
    if length == 0 {
        return invalid("name is empty");
    }
    if length > MAX_NAME_LENGTH {
        return invalid("name is longer than 32 characters");
    }
    if name.chars().any(char::is_uppercase) {
        return invalid("name contains uppercase letters");
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return invalid("name may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}

fn validate_option(command: &str, option: &CommandOption) -> SchemaResult<()> {
    validate_name(option.name())?;

    if let Some(label) = option.unencodable.first() {
        return Err(SchemaError::UnencodableChoice {
            command: command.to_string(),
            option: option.name().to_string(),
            choice: label.clone(),
        });
    }

    let choices = option.choices();
    if choices.is_empty() {
        return Ok(());
    }

    let kind = option.option_type();
    if !kind.supports_choices() {
        return Err(SchemaError::ChoicesNotSupported {
            command: command.to_string(),
            option: option.name().to_string(),
            kind,
        });
    }
    if choices.len() > MAX_CHOICES {
        return Err(SchemaError::TooManyChoices {
            command: command.to_string(),
            option: option.name().to_string(),
            count: choices.len(),
        });
    }
    if let Some(choice) = choices.iter().find(|c| !c.value.fits(kind)) {
        return Err(SchemaError::ChoiceTypeMismatch {
            command: command.to_string(),
            option: option.name().to_string(),
            choice: choice.name.clone(),
            expected: kind,
        });
    }

    if option.auto_complete {
        warn!(
            command,
            option = option.name(),
            "Option has both choices and auto-complete; auto-complete is disabled"
        );
    }
    Ok(())
}

fn check_count(command: &str, count: usize) -> SchemaResult<()> {
    if count > MAX_OPTIONS {
        return Err(SchemaError::TooManyOptions {
            command: command.to_string(),
            count,
        });
    }
    Ok(())
}

fn check_unique<'a>(command: &str, names: impl Iterator<Item = &'a str>) -> SchemaResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(SchemaError::DuplicateOption {
                command: command.to_string(),
                option: name.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{OptionBuilder, choice_option, integer, option, string};
    use anvil_core::{Choice, ChoiceValue, Role, User};
    use anvil_macros::CommandChoice;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, CommandChoice)]
    enum Size {
        Small,
        #[choice(name = "Big")]
        Large,
    }

    fn sample() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.slash("roll", "Roll dice", |cmd| {
            cmd.option(integer("sides", "Sides").range(2, 100));
            cmd.option(choice_option::<Size>("size", "Dice size").optional());
            cmd.handler(|_ctx| async {});
        });
        registry.slash("admin", "Administration", |cmd| {
            cmd.guild_only().default_member_permissions(8);
            cmd.subcommand("ping", "Ping", |sub| {
                sub.handler(|_ctx| async {});
            });
            cmd.group("roles", "Roles", |group| {
                group.subcommand("add", "Add a role", |sub| {
                    sub.option(option::<User>("user", "Member"));
                    sub.option(option::<Role>("role", "Role"));
                    sub.handler(|_ctx| async {});
                });
            });
        });
        registry.slash("fruit", "Pick a fruit", |cmd| {
            cmd.option(string("kind", "Fruit").auto_complete(|_| [("Apple", "apple")]));
            cmd.handler(|_ctx| async {});
        });
        registry.user("Show Avatar", |_ctx| async {});
        registry.message("Quote", |_ctx| async {});
        registry
    }

    #[test]
    fn test_compile_definitions() {
        let compiled = sample().compile().unwrap();
        let names: Vec<_> = compiled.commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["roll", "admin", "fruit", "Show Avatar", "Quote"]);

        let roll = &compiled.commands[0];
        assert_eq!(roll.kind, CommandType::ChatInput);
        assert_eq!(roll.options.len(), 2);
        assert!(roll.options[0].required);
        assert!(!roll.options[1].required);
        assert_eq!(roll.options[1].choices.len(), 2);
        assert_eq!(roll.options[1].choices[1].name, "Big");
        assert_eq!(
            roll.options[1].choices[1].value,
            ChoiceValue::String("\"Large\"".into())
        );

        let admin = &compiled.commands[1];
        assert_eq!(admin.dm_permission, Some(false));
        assert_eq!(admin.default_member_permissions.as_deref(), Some("8"));
        assert_eq!(admin.options[0].kind, OptionType::SubCommand);
        assert_eq!(admin.options[1].kind, OptionType::SubCommandGroup);
        assert_eq!(admin.options[1].options[0].options.len(), 2);

        assert!(compiled.commands[2].options[0].autocomplete);
        assert_eq!(compiled.commands[3].kind, CommandType::User);
        assert_eq!(compiled.commands[4].kind, CommandType::Message);
    }

    #[test]
    fn test_compile_routes() {
        let compiled = sample().compile().unwrap();
        let routes = compiled.listener.routes();

        assert!(routes.slash(&CommandKey::new("roll")).is_some());
        assert!(routes.slash(&CommandKey::subcommand("admin", "ping")).is_some());
        assert!(routes.slash(&CommandKey::grouped("admin", "roles", "add")).is_some());
        assert!(routes.slash(&CommandKey::new("admin")).is_none());
        assert!(routes.user("Show Avatar").is_some());
        assert!(routes.message("Quote").is_some());
        assert_eq!(
            routes.auto_complete_keys(),
            [&AutoCompleteKey::new(CommandKey::new("fruit"), "kind")]
        );
    }

    #[test]
    fn test_compile_is_idempotent() {
        let registry = sample();
        let first = registry.compile().unwrap();
        let second = registry.compile().unwrap();

        assert_eq!(first.commands, second.commands);
        let (a, b) = (first.listener.routes(), second.listener.routes());
        assert_eq!(a.slash_keys(), b.slash_keys());
        assert_eq!(a.user_names(), b.user_names());
        assert_eq!(a.message_names(), b.message_names());
        assert_eq!(a.auto_complete_keys(), b.auto_complete_keys());
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let mut registry = CommandRegistry::new();
        registry.slash("ping", "Ping", |cmd| {
            cmd.handler(|_ctx| async {});
        });
        registry.slash("ping", "Ping again", |cmd| {
            cmd.handler(|_ctx| async {});
        });
        assert_eq!(
            registry.compile().err(),
            Some(SchemaError::DuplicateCommand(CommandKey::new("ping")))
        );

        let mut registry = CommandRegistry::new();
        registry.slash("admin", "Administration", |cmd| {
            cmd.subcommand("kick", "Kick", |sub| {
                sub.handler(|_ctx| async {});
            });
            cmd.subcommand("kick", "Kick again", |sub| {
                sub.handler(|_ctx| async {});
            });
        });
        assert!(matches!(
            registry.compile(),
            Err(SchemaError::DuplicateOption { option, .. }) if option == "kick"
        ));

        let mut registry = CommandRegistry::new();
        registry.user("Inspect", |_ctx| async {});
        registry.user("Inspect", |_ctx| async {});
        registry.message("Inspect", |_ctx| async {});
        assert_eq!(
            registry.compile().err(),
            Some(SchemaError::DuplicateContextCommand {
                kind: CommandType::User,
                name: "Inspect".into(),
            })
        );
    }

    fn compile_one(init: impl FnOnce(&mut SlashCommandBuilder)) -> Option<SchemaError> {
        let mut registry = CommandRegistry::new();
        registry.slash("cmd", "A command", init);
        registry.compile().err()
    }

    #[test]
    fn test_schema_mistakes() {
        assert_eq!(
            compile_one(|_| {}),
            Some(SchemaError::MissingHandler("cmd".into()))
        );
        assert_eq!(
            compile_one(|cmd| {
                cmd.option(integer("a", "A").optional());
                cmd.option(integer("b", "B"));
                cmd.handler(|_ctx| async {});
            }),
            Some(SchemaError::RequiredAfterOptional {
                command: "cmd".into(),
                option: "b".into(),
            })
        );
        assert!(matches!(
            compile_one(|cmd| {
                cmd.option(integer("a", "A"));
                cmd.option(string("a", "A again"));
                cmd.handler(|_ctx| async {});
            }),
            Some(SchemaError::DuplicateOption { .. })
        ));
        assert_eq!(
            compile_one(|cmd| {
                cmd.handler(|_ctx| async {});
                cmd.subcommand("sub", "Sub", |sub| {
                    sub.handler(|_ctx| async {});
                });
            }),
            Some(SchemaError::MixedCommandKinds("cmd".into()))
        );
        assert!(matches!(
            compile_one(|cmd| {
                cmd.group("empty", "Nothing here", |_| {});
            }),
            Some(SchemaError::EmptyGroup { .. })
        ));
        assert!(matches!(
            compile_one(|cmd| {
                cmd.option(integer("Count", "Uppercase"));
                cmd.handler(|_ctx| async {});
            }),
            Some(SchemaError::InvalidName { .. })
        ));
        assert!(matches!(
            compile_one(|cmd| {
                let mut flag = option::<bool>("flag", "A flag");
                flag.schema_mut().push_choice(Choice::new("yes", "y"));
                cmd.option(flag);
                cmd.handler(|_ctx| async {});
            }),
            Some(SchemaError::ChoicesNotSupported { kind: OptionType::Boolean, .. })
        ));
        assert!(matches!(
            compile_one(|cmd| {
                let mut n = option::<i64>("n", "A number");
                n.schema_mut().push_choice(Choice::new("half", 0.5));
                cmd.option(n);
                cmd.handler(|_ctx| async {});
            }),
            Some(SchemaError::ChoiceTypeMismatch { expected: OptionType::Integer, .. })
        ));
        assert!(matches!(
            compile_one(|cmd| {
                cmd.option(integer("n", "A number").choices((0..26).map(|i| (format!("c{i}"), i))));
                cmd.handler(|_ctx| async {});
            }),
            Some(SchemaError::TooManyChoices { count: 26, .. })
        ));
    }

    #[test]
    fn test_choices_take_precedence_over_auto_complete() {
        let mut registry = CommandRegistry::new();
        registry.slash("pick", "Pick", |cmd| {
            cmd.option(
                string("fruit", "Fruit")
                    .choice("Apple", "apple")
                    .auto_complete(|_| [("Banana", "banana")]),
            );
            cmd.handler(|_ctx| async {});
        });

        let compiled = registry.compile().unwrap();
        let option = &compiled.commands[0].options[0];
        assert!(!option.autocomplete);
        assert_eq!(option.choices[0].value, ChoiceValue::String("apple".into()));
        assert!(compiled.listener.routes().auto_complete_keys().is_empty());
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("roll-dice_2").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"a".repeat(33)).is_err());
        assert!(validate_name("has space").is_err());
        assert!(validate_name("Roll").is_err());
    }
}
