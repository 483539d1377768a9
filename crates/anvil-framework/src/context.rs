//! Invocation contexts handed to handlers.
//!
//! One context is created per incoming event and owned by the single
//! invocation it belongs to:
//!
//! - [`SlashCommandContext`]: the event, the client, and every declared
//!   option parsed into a [`ParsedValue`]. Typed access goes through
//!   [`SlashCommandContext::value`] with the handle returned when the option
//!   was declared.
//! - [`UserCommandContext`] / [`MessageCommandContext`]: the event and the
//!   client.
//! - [`AutoCompleteContext`]: the request and the client, for raw
//!   auto-complete handlers.

use std::collections::HashMap;

use anvil_core::{
    ApiResult, AutoCompleteEvent, BoxedClient, Choice, InteractionInfo, Message,
    MessageContextEvent, SlashCommandEvent, User, UserContextEvent,
};
use tracing::error;

use crate::error::{OptionError, OptionResult};
use crate::option::{CommandOption, ReadOption};
use crate::value::ParsedValue;

// =============================================================================
// SlashCommandContext
// =============================================================================

/// The context of one slash command invocation.
pub struct SlashCommandContext {
    event: SlashCommandEvent,
    client: BoxedClient,
    values: HashMap<String, Option<ParsedValue>>,
}

impl SlashCommandContext {
    /// Creates a context with no parsed options.
    pub fn new(event: SlashCommandEvent, client: BoxedClient) -> Self {
        Self {
            event,
            client,
            values: HashMap::new(),
        }
    }

    /// Parses every declared option of the invoked command.
    ///
    /// Options absent from the event are recorded as absent, so typed access
    /// can tell "not sent" apart from "not declared".
    pub fn parse_options(&mut self, options: &[CommandOption]) -> OptionResult<()> {
        for option in options {
            let value = option.parse(&self.event)?;
            self.values.insert(option.name().to_string(), value);
        }
        Ok(())
    }

    /// Reads the typed value of a declared option.
    ///
    /// Required options yield the value itself and fail with
    /// [`OptionError::Missing`] if it was not sent; optional options yield
    /// `None` instead.
    ///
    /// ```rust,ignore
    /// let sides = cmd.option(integer("sides", "Number of sides"));
    /// cmd.handler(move |ctx| {
    ///     let sides = ctx.value(&sides);
    ///     async move {
    ///         let sides = sides?;
    ///         ctx.reply(&format!("d{sides}")).await
    ///     }
    /// });
    /// ```
    pub fn value<O: ReadOption>(&self, option: &O) -> OptionResult<O::Output> {
        let name = option.option_name();
        let Some(raw) = self.values.get(name) else {
            error!(option = name, command = %self.event.path(), "Option read before it was parsed");
            return Err(OptionError::NotParsed(name.to_string()));
        };
        option.read(raw.as_ref())
    }

    /// Returns the parsed, unmapped value of an option by name.
    pub fn raw(&self, name: &str) -> Option<&ParsedValue> {
        self.values.get(name).and_then(Option::as_ref)
    }

    /// Returns the originating event.
    pub fn event(&self) -> &SlashCommandEvent {
        &self.event
    }

    /// Returns the client that delivered the event.
    pub fn client(&self) -> &BoxedClient {
        &self.client
    }

    /// Returns the invoking user.
    pub fn user(&self) -> &User {
        &self.event.info.user
    }

    /// Answers the invocation with a text message.
    pub async fn reply(&self, content: &str) -> ApiResult<()> {
        self.client.reply(&self.event.info, content).await
    }
}

impl std::fmt::Debug for SlashCommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlashCommandContext")
            .field("command", &self.event.path())
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Context-menu contexts
// =============================================================================

/// The context of one user context-menu invocation.
pub struct UserCommandContext {
    event: UserContextEvent,
    client: BoxedClient,
}

impl UserCommandContext {
    pub fn new(event: UserContextEvent, client: BoxedClient) -> Self {
        Self { event, client }
    }

    pub fn event(&self) -> &UserContextEvent {
        &self.event
    }

    /// The user the menu was opened on.
    pub fn target(&self) -> &User {
        &self.event.target
    }

    pub fn client(&self) -> &BoxedClient {
        &self.client
    }

    /// Answers the invocation with a text message.
    pub async fn reply(&self, content: &str) -> ApiResult<()> {
        self.client.reply(&self.event.info, content).await
    }
}

/// The context of one message context-menu invocation.
pub struct MessageCommandContext {
    event: MessageContextEvent,
    client: BoxedClient,
}

impl MessageCommandContext {
    pub fn new(event: MessageContextEvent, client: BoxedClient) -> Self {
        Self { event, client }
    }

    pub fn event(&self) -> &MessageContextEvent {
        &self.event
    }

    /// The message the menu was opened on.
    pub fn target(&self) -> &Message {
        &self.event.target
    }

    pub fn client(&self) -> &BoxedClient {
        &self.client
    }

    /// Answers the invocation with a text message.
    pub async fn reply(&self, content: &str) -> ApiResult<()> {
        self.client.reply(&self.event.info, content).await
    }
}

// =============================================================================
// AutoCompleteContext
// =============================================================================

/// The context of one auto-complete request.
pub struct AutoCompleteContext {
    event: AutoCompleteEvent,
    client: BoxedClient,
}

impl AutoCompleteContext {
    pub fn new(event: AutoCompleteEvent, client: BoxedClient) -> Self {
        Self { event, client }
    }

    pub fn event(&self) -> &AutoCompleteEvent {
        &self.event
    }

    pub fn info(&self) -> &InteractionInfo {
        &self.event.info
    }

    /// The partial input of the focused option.
    pub fn input(&self) -> &str {
        &self.event.focused.value
    }

    pub fn client(&self) -> &BoxedClient {
        &self.client
    }

    /// Sends suggestions for the focused option.
    pub async fn reply_choices(&self, choices: &[Choice]) -> ApiResult<()> {
        self.client.reply_choices(&self.event.info, choices).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{IntoOption, integer, option, string};
    use anvil_core::{
        ApiError, Client, CommandData, CommandScope, OptionMapping, OptionType, Snowflake,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    struct NullClient;

    #[async_trait]
    impl Client for NullClient {
        fn application_id(&self) -> Snowflake {
            Snowflake(1)
        }

        async fn replace_commands(&self, _: &CommandScope, _: &[CommandData]) -> ApiResult<()> {
            Err(ApiError::NotConnected)
        }

        async fn reply(&self, _: &InteractionInfo, _: &str) -> ApiResult<()> {
            Ok(())
        }

        async fn reply_choices(&self, _: &InteractionInfo, _: &[Choice]) -> ApiResult<()> {
            Ok(())
        }
    }

    fn context(event: SlashCommandEvent) -> SlashCommandContext {
        SlashCommandContext::new(event, Arc::new(NullClient))
    }

    #[test]
    fn test_required_and_optional_access() {
        let (count_schema, count) = integer("count", "How many").into_option();
        let (note_schema, note) = string("note", "Extra text").optional().into_option();

        let event = SlashCommandEvent::new(InteractionInfo::default(), "repeat")
            .with_option(OptionMapping::new("count", OptionType::Integer, json!(3)));
        let mut ctx = context(event);
        ctx.parse_options(&[count_schema, note_schema]).unwrap();

        assert_eq!(ctx.value(&count).unwrap(), 3);
        assert_eq!(ctx.value(&note).unwrap(), None);
        assert_eq!(ctx.raw("count"), Some(&ParsedValue::Integer(3)));
    }

    #[test]
    fn test_missing_required_value() {
        let (schema, flag) = option::<bool>("flag", "A flag").into_option();
        let mut ctx = context(SlashCommandEvent::new(InteractionInfo::default(), "toggle"));
        ctx.parse_options(&[schema]).unwrap();

        assert_eq!(ctx.value(&flag), Err(OptionError::Missing("flag".into())));
    }

    #[test]
    fn test_unparsed_option() {
        let (_, other) = option::<bool>("other", "Elsewhere").into_option();
        let ctx = context(SlashCommandEvent::new(InteractionInfo::default(), "toggle"));

        assert_eq!(ctx.value(&other), Err(OptionError::NotParsed("other".into())));
    }
}
