//! The typed option model.
//!
//! An option is declared once with a builder and registered on a command,
//! which returns a handle for reading its value inside the handler:
//!
//! ```rust,ignore
//! use anvil::prelude::*;
//!
//! commands.slash("roll", "Roll some dice", |cmd| {
//!     let sides = cmd.option(integer("sides", "Number of sides").range(2, 100));
//!     let count = cmd.option(option::<i64>("count", "How many dice").optional());
//!     let coin = cmd.option(choice_option::<Coin>("coin", "Also flip a coin").optional());
//!
//!     cmd.handler(move |ctx| {
//!         let values = (ctx.value(&sides), ctx.value(&count), ctx.value(&coin));
//!         async move {
//!             let (sides, count, coin) = (values.0?, values.1?.unwrap_or(1), values.2?);
//!             // ...
//!             Ok::<_, BoxError>(())
//!         }
//!     });
//! });
//! ```
//!
//! # Layers
//!
//! - [`CommandOption`]: the erased schema node (wire type, constraints,
//!   choices, localizations, auto-complete behavior). It builds the wire
//!   definition and parses the raw value out of an event.
//! - [`TypedOption<T>`] / [`NullableOption<T>`]: a schema node plus the
//!   value pipeline that turns a [`ParsedValue`] into `T`. Required options
//!   read as `T`, optional ones as `Option<T>`.
//! - Specialized builders ([`StringOption`], [`NumberOption`],
//!   [`ChannelOption`], [`ChoiceOption`]) wrap a `TypedOption` and add the
//!   methods that only make sense for their wire type.

use std::future::Future;
use std::sync::Arc;

use anvil_core::{
    ChannelType, Choice, CommandChoice, Localizations, Number, OptionData, OptionType,
    SlashCommandEvent,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::context::AutoCompleteContext;
use crate::error::{OptionError, OptionResult};
use crate::handler::{BoxedHandler, IntoHandlerResult, into_handler};
use crate::value::{OptionKind, ParsedValue};

/// Most choices one option may carry.
pub const MAX_CHOICES: usize = 25;

/// Most options one command may declare.
pub const MAX_OPTIONS: usize = 25;

// ============================================================================
// CommandOption - the erased schema node
// ============================================================================

/// A single declarative option, independent of the Rust type it decodes to.
#[derive(Clone)]
pub struct CommandOption {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) option_type: OptionType,
    pub(crate) required: bool,
    pub(crate) auto_complete: bool,
    pub(crate) auto_complete_handler: Option<BoxedHandler<AutoCompleteContext>>,
    pub(crate) min_value: Option<Number>,
    pub(crate) max_value: Option<Number>,
    pub(crate) min_length: Option<u16>,
    pub(crate) max_length: Option<u16>,
    pub(crate) choices: Vec<Choice>,
    /// Labels of choices whose value could not be encoded.
    pub(crate) unencodable: Vec<String>,
    pub(crate) channel_types: Vec<ChannelType>,
    pub(crate) name_localizations: Localizations,
    pub(crate) description_localizations: Localizations,
}

impl CommandOption {
    /// Creates a required option with no constraints.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        option_type: OptionType,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            option_type,
            required: true,
            auto_complete: false,
            auto_complete_handler: None,
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            choices: Vec::new(),
            unencodable: Vec::new(),
            channel_types: Vec::new(),
            name_localizations: Localizations::new(),
            description_localizations: Localizations::new(),
        }
    }

    /// Rebuilds this node with a new `required` flag, moving every other
    /// field over.
    pub(crate) fn with_required(self, required: bool) -> Self {
        Self {
            name: self.name,
            description: self.description,
            option_type: self.option_type,
            required,
            auto_complete: self.auto_complete,
            auto_complete_handler: self.auto_complete_handler,
            min_value: self.min_value,
            max_value: self.max_value,
            min_length: self.min_length,
            max_length: self.max_length,
            choices: self.choices,
            unencodable: self.unencodable,
            channel_types: self.channel_types,
            name_localizations: self.name_localizations,
            description_localizations: self.description_localizations,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Returns `true` if the wire definition will request auto-complete.
    ///
    /// Choices take precedence: an option with choices never auto-completes.
    pub fn has_auto_complete(&self) -> bool {
        self.auto_complete && self.option_type.supports_choices() && self.choices.is_empty()
    }

    /// The handler routed for auto-complete requests on this option, if any.
    pub fn auto_complete_handler(&self) -> Option<&BoxedHandler<AutoCompleteContext>> {
        self.auto_complete_handler
            .as_ref()
            .filter(|_| self.has_auto_complete())
    }

    // ------------------------------------------------------------------------
    // Configuration. Constraints that do not apply to the wire type are kept
    // but left out of the wire definition.
    // ------------------------------------------------------------------------

    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    /// Sets numeric bounds. Only used by integer and number options.
    pub fn set_range(&mut self, min: Option<Number>, max: Option<Number>) {
        self.min_value = min;
        self.max_value = max;
    }

    /// Sets text length bounds. Only used by string options.
    pub fn set_length(&mut self, min: Option<u16>, max: Option<u16>) {
        self.min_length = min;
        self.max_length = max;
    }

    /// Restricts selectable channel kinds. Only used by channel options.
    pub fn set_channel_types(&mut self, types: Vec<ChannelType>) {
        self.channel_types = types;
    }

    /// Appends a choice. Label uniqueness is not checked.
    pub fn push_choice(&mut self, choice: Choice) {
        self.choices.push(choice);
    }

    pub fn set_auto_complete(&mut self, enabled: bool) {
        self.auto_complete = enabled;
    }

    /// Routes auto-complete requests on this option to `handler` and turns
    /// the auto-complete flag on.
    pub fn set_auto_complete_handler(&mut self, handler: BoxedHandler<AutoCompleteContext>) {
        self.auto_complete = true;
        self.auto_complete_handler = Some(handler);
    }

    pub fn set_name_localizations(&mut self, localizations: Localizations) {
        self.name_localizations = localizations;
    }

    pub fn set_description_localizations(&mut self, localizations: Localizations) {
        self.description_localizations = localizations;
    }

    // ------------------------------------------------------------------------
    // Parse / build
    // ------------------------------------------------------------------------

    /// Extracts this option's raw value from an event.
    ///
    /// Returns `Ok(None)` if the event carries no entry for this option.
    pub fn parse(&self, event: &SlashCommandEvent) -> OptionResult<Option<ParsedValue>> {
        event
            .option(&self.name)
            .map(|mapping| ParsedValue::from_mapping(mapping, &event.resolved))
            .transpose()
    }

    /// Builds the wire definition.
    pub fn build(&self) -> OptionData {
        let mut data = OptionData::new(self.option_type, &self.name, &self.description);
        data.required = self.required;
        data.autocomplete = self.has_auto_complete();
        data.name_localizations = self.name_localizations.clone();
        data.description_localizations = self.description_localizations.clone();

        if self.option_type.is_numeric() {
            data.min_value = self.min_value;
            data.max_value = self.max_value;
        }

        if self.option_type == OptionType::String {
            data.min_length = self.min_length;
            data.max_length = self.max_length;
        }

        if self.option_type.supports_choices() {
            data.choices = self.choices.clone();
        }

        if self.option_type == OptionType::Channel {
            data.channel_types = self.channel_types.clone();
        }

        data
    }
}

impl std::fmt::Debug for CommandOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandOption")
            .field("name", &self.name)
            .field("type", &self.option_type)
            .field("required", &self.required)
            .field("choices", &self.choices.len())
            .field("auto_complete", &self.auto_complete)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Value pipeline
// ============================================================================

/// Turns an option's parsed value into its typed value. The first argument is
/// the option name, for error reporting.
pub(crate) type Pipeline<T> =
    Arc<dyn Fn(&str, Option<&ParsedValue>) -> OptionResult<Option<T>> + Send + Sync>;

pub(crate) fn pipeline<T, F>(f: F) -> Pipeline<T>
where
    F: Fn(&str, Option<&ParsedValue>) -> OptionResult<Option<T>> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn kind_pipeline<T: OptionKind>() -> Pipeline<T> {
    pipeline(|name, raw| match raw {
        None => Ok(None),
        Some(value) => T::from_parsed(value)
            .map(Some)
            .ok_or_else(|| OptionError::TypeMismatch {
                option: name.to_string(),
                expected: T::OPTION_TYPE,
                found: value.option_type(),
            }),
    })
}

// ============================================================================
// TypedOption / NullableOption
// ============================================================================

/// A required option whose value reads as `T`.
pub struct TypedOption<T> {
    pub(crate) option: CommandOption,
    pipeline: Pipeline<T>,
}

impl<T> Clone for TypedOption<T> {
    fn clone(&self) -> Self {
        Self {
            option: self.option.clone(),
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

impl<T: OptionKind> TypedOption<T> {
    /// Creates a required option of `T`'s wire type.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::from_parts(
            CommandOption::new(name, description, T::OPTION_TYPE),
            kind_pipeline(),
        )
    }
}

impl<T: Send + Sync + 'static> TypedOption<T> {
    pub(crate) fn from_parts(option: CommandOption, pipeline: Pipeline<T>) -> Self {
        Self { option, pipeline }
    }

    /// The underlying schema node.
    pub fn schema(&self) -> &CommandOption {
        &self.option
    }

    /// Marks the option as required. Options are required by default.
    pub fn required(mut self) -> Self {
        self.option.required = true;
        self
    }

    /// Turns this into an optional option reading as `Option<T>`.
    pub fn optional(self) -> NullableOption<T> {
        NullableOption {
            option: self.option.with_required(false),
            pipeline: self.pipeline,
        }
    }

    /// Appends a mapping step that also sees absence.
    pub fn map<R, F>(self, f: F) -> TypedOption<R>
    where
        F: Fn(Option<T>) -> R + Send + Sync + 'static,
        R: Send + Sync + 'static,
    {
        let prev = self.pipeline;
        TypedOption::from_parts(
            self.option,
            pipeline(move |name, raw| Ok(Some(f(prev(name, raw)?)))),
        )
    }

    /// Appends a mapping step that requires a value.
    ///
    /// Fails with [`OptionError::UnexpectedAbsent`] if the value is absent
    /// when the pipeline runs.
    pub fn map_nonnull<R, F>(self, f: F) -> TypedOption<R>
    where
        F: Fn(T) -> R + Send + Sync + 'static,
        R: Send + Sync + 'static,
    {
        let prev = self.pipeline;
        TypedOption::from_parts(
            self.option,
            pipeline(move |name, raw| match prev(name, raw)? {
                Some(value) => Ok(Some(f(value))),
                None => Err(OptionError::UnexpectedAbsent(name.to_string())),
            }),
        )
    }

    /// Appends a fallible mapping step. Absence passes through.
    pub fn try_map<R, E, F>(self, f: F) -> TypedOption<R>
    where
        F: Fn(T) -> Result<R, E> + Send + Sync + 'static,
        E: std::fmt::Display,
        R: Send + Sync + 'static,
    {
        let prev = self.pipeline;
        TypedOption::from_parts(self.option, try_step(prev, f))
    }
}

/// An optional option whose value reads as `Option<T>`.
pub struct NullableOption<T> {
    pub(crate) option: CommandOption,
    pipeline: Pipeline<T>,
}

impl<T> Clone for NullableOption<T> {
    fn clone(&self) -> Self {
        Self {
            option: self.option.clone(),
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

impl<T: Send + Sync + 'static> NullableOption<T> {
    /// The underlying schema node.
    pub fn schema(&self) -> &CommandOption {
        &self.option
    }

    /// Turns this into a required option reading as `T`.
    pub fn required(self) -> TypedOption<T> {
        TypedOption::from_parts(self.option.with_required(true), self.pipeline)
    }

    pub fn optional(self) -> Self {
        self
    }

    /// Appends a mapping step. Absence passes through without calling `f`.
    pub fn map<R, F>(self, f: F) -> NullableOption<R>
    where
        F: Fn(T) -> R + Send + Sync + 'static,
        R: Send + Sync + 'static,
    {
        let prev = self.pipeline;
        NullableOption {
            option: self.option,
            pipeline: pipeline(move |name, raw| Ok(prev(name, raw)?.map(&f))),
        }
    }

    /// Appends a mapping step that requires a value, yielding a required
    /// option.
    ///
    /// Fails with [`OptionError::UnexpectedAbsent`] if the value is absent
    /// when the pipeline runs.
    pub fn map_nonnull<R, F>(self, f: F) -> TypedOption<R>
    where
        F: Fn(T) -> R + Send + Sync + 'static,
        R: Send + Sync + 'static,
    {
        let prev = self.pipeline;
        TypedOption::from_parts(
            self.option,
            pipeline(move |name, raw| match prev(name, raw)? {
                Some(value) => Ok(Some(f(value))),
                None => Err(OptionError::UnexpectedAbsent(name.to_string())),
            }),
        )
    }

    /// Appends a fallible mapping step. Absence passes through.
    pub fn try_map<R, E, F>(self, f: F) -> NullableOption<R>
    where
        F: Fn(T) -> Result<R, E> + Send + Sync + 'static,
        E: std::fmt::Display,
        R: Send + Sync + 'static,
    {
        let prev = self.pipeline;
        NullableOption {
            option: self.option,
            pipeline: try_step(prev, f),
        }
    }
}

fn try_step<T, R, E, F>(prev: Pipeline<T>, f: F) -> Pipeline<R>
where
    T: 'static,
    F: Fn(T) -> Result<R, E> + Send + Sync + 'static,
    E: std::fmt::Display,
{
    pipeline(move |name, raw| match prev(name, raw)? {
        Some(value) => f(value).map(Some).map_err(|e| OptionError::Invalid {
            option: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(None),
    })
}

// ============================================================================
// Reading values
// ============================================================================

/// A handle that reads a typed value out of parsed options.
pub trait ReadOption {
    /// What the handler receives.
    type Output;

    /// The option this handle reads.
    fn option_name(&self) -> &str;

    /// Runs the pipeline over the parsed value.
    fn read(&self, raw: Option<&ParsedValue>) -> OptionResult<Self::Output>;
}

impl<T> ReadOption for TypedOption<T> {
    type Output = T;

    fn option_name(&self) -> &str {
        &self.option.name
    }

    fn read(&self, raw: Option<&ParsedValue>) -> OptionResult<T> {
        let name = self.option_name();
        (self.pipeline)(name, raw)?.ok_or_else(|| OptionError::Missing(name.to_string()))
    }
}

impl<T> ReadOption for NullableOption<T> {
    type Output = Option<T>;

    fn option_name(&self) -> &str {
        &self.option.name
    }

    fn read(&self, raw: Option<&ParsedValue>) -> OptionResult<Option<T>> {
        (self.pipeline)(self.option_name(), raw)
    }
}

// ============================================================================
// IntoOption - registering on a command
// ============================================================================

/// Anything that can be declared as an option of a command.
pub trait IntoOption {
    /// The handle returned to the declaring code.
    type Handle: ReadOption + Clone + Send + Sync + 'static;

    /// Splits into the schema node and the read handle.
    fn into_option(self) -> (CommandOption, Self::Handle);
}

impl<T: Send + Sync + 'static> IntoOption for TypedOption<T> {
    type Handle = TypedOption<T>;

    fn into_option(self) -> (CommandOption, Self::Handle) {
        (self.option.clone(), self)
    }
}

impl<T: Send + Sync + 'static> IntoOption for NullableOption<T> {
    type Handle = NullableOption<T>;

    fn into_option(self) -> (CommandOption, Self::Handle) {
        (self.option.clone(), self)
    }
}

// ============================================================================
// OptionBuilder - configuration shared by every builder
// ============================================================================

/// Chainable configuration available on every option builder.
pub trait OptionBuilder: Sized {
    fn schema_mut(&mut self) -> &mut CommandOption;

    /// Sets localized names.
    fn name_localizations(mut self, localizations: Localizations) -> Self {
        self.schema_mut().set_name_localizations(localizations);
        self
    }

    /// Sets localized descriptions.
    fn description_localizations(mut self, localizations: Localizations) -> Self {
        self.schema_mut().set_description_localizations(localizations);
        self
    }

    /// Requests auto-complete without routing a handler.
    fn auto_complete_flag(mut self, enabled: bool) -> Self {
        self.schema_mut().set_auto_complete(enabled);
        self
    }

    /// Routes auto-complete requests to a raw handler that replies itself.
    fn on_auto_complete<F, Fut, R>(mut self, handler: F) -> Self
    where
        F: Fn(AutoCompleteContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoHandlerResult,
    {
        self.schema_mut()
            .set_auto_complete_handler(into_handler(handler));
        self
    }

    /// Routes auto-complete requests to a function returning
    /// `(label, value)` suggestions.
    ///
    /// Values are converted by their runtime type: integers and floats
    /// become numeric suggestions, text becomes text. Any other value fails
    /// the request with [`AutoCompleteError::UnsupportedValue`].
    ///
    /// [`AutoCompleteError::UnsupportedValue`]: crate::error::AutoCompleteError::UnsupportedValue
    fn auto_complete<F, I, K, V>(self, suggest: F) -> Self
    where
        F: Fn(&AutoCompleteContext) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoChoiceValue,
    {
        self.on_auto_complete(move |ctx: AutoCompleteContext| {
            let choices = suggestions(suggest(&ctx));
            async move { reply_suggestions(&ctx, choices?).await }
        })
    }
}

impl<T> OptionBuilder for TypedOption<T> {
    fn schema_mut(&mut self) -> &mut CommandOption {
        &mut self.option
    }
}

impl<T> OptionBuilder for NullableOption<T> {
    fn schema_mut(&mut self) -> &mut CommandOption {
        &mut self.option
    }
}

/// Implements the shared surface of a specialized builder wrapping a
/// `TypedOption<$value>` in a field named `inner`.
macro_rules! forward_typed {
    (impl[$($gen:tt)*] $builder:ty => $value:ty) => {
        impl<$($gen)*> $builder {
            /// The underlying schema node.
            pub fn schema(&self) -> &$crate::option::CommandOption {
                self.inner.schema()
            }

            /// Marks the option as required. Options are required by default.
            pub fn required(mut self) -> Self {
                self.inner = self.inner.required();
                self
            }

            /// Turns this into an optional option reading as `Option<_>`.
            pub fn optional(self) -> $crate::option::NullableOption<$value> {
                self.inner.optional()
            }

            /// See [`TypedOption::map`](crate::option::TypedOption::map).
            pub fn map<R, F>(self, f: F) -> $crate::option::TypedOption<R>
            where
                F: Fn(Option<$value>) -> R + Send + Sync + 'static,
                R: Send + Sync + 'static,
            {
                self.inner.map(f)
            }

            /// See [`TypedOption::map_nonnull`](crate::option::TypedOption::map_nonnull).
            pub fn map_nonnull<R, F>(self, f: F) -> $crate::option::TypedOption<R>
            where
                F: Fn($value) -> R + Send + Sync + 'static,
                R: Send + Sync + 'static,
            {
                self.inner.map_nonnull(f)
            }

            /// See [`TypedOption::try_map`](crate::option::TypedOption::try_map).
            pub fn try_map<R, E, F>(self, f: F) -> $crate::option::TypedOption<R>
            where
                F: Fn($value) -> Result<R, E> + Send + Sync + 'static,
                E: std::fmt::Display,
                R: Send + Sync + 'static,
            {
                self.inner.try_map(f)
            }

            /// Drops the specialized methods.
            pub fn into_typed(self) -> $crate::option::TypedOption<$value> {
                self.inner
            }
        }

        impl<$($gen)*> $crate::option::OptionBuilder for $builder {
            fn schema_mut(&mut self) -> &mut $crate::option::CommandOption {
                &mut self.inner.option
            }
        }

        impl<$($gen)*> $crate::option::IntoOption for $builder {
            type Handle = $crate::option::TypedOption<$value>;

            fn into_option(self) -> ($crate::option::CommandOption, Self::Handle) {
                self.inner.into_option()
            }
        }
    };
}

mod auto_complete;
mod channel;
mod choice;
mod number;
mod string;

pub use auto_complete::{IntoChoiceValue, MAX_SUGGESTIONS, reply_suggestions, suggestions};
pub use channel::ChannelOption;
pub use choice::{ChoiceOption, decode_choice, encode_choice};
pub use number::NumberOption;
pub use string::StringOption;

// ============================================================================
// Constructors
// ============================================================================

/// Declares a required option of any supported type.
///
/// The wire type follows from `T` (see [`OptionKind`]).
pub fn option<T: OptionKind>(
    name: impl Into<String>,
    description: impl Into<String>,
) -> TypedOption<T> {
    TypedOption::new(name, description)
}

/// Declares a required text option.
pub fn string(name: impl Into<String>, description: impl Into<String>) -> StringOption {
    StringOption::new(name, description)
}

/// Declares a required integer option.
pub fn integer(name: impl Into<String>, description: impl Into<String>) -> NumberOption<i64> {
    NumberOption::new(name, description)
}

/// Declares a required floating-point option.
pub fn number(name: impl Into<String>, description: impl Into<String>) -> NumberOption<f64> {
    NumberOption::new(name, description)
}

/// Declares a required channel option.
pub fn channel(name: impl Into<String>, description: impl Into<String>) -> ChannelOption {
    ChannelOption::new(name, description)
}

/// Declares a required option carrying any serializable value as text.
pub fn serializable<T>(name: impl Into<String>, description: impl Into<String>) -> ChoiceOption<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    ChoiceOption::new(name, description)
}

/// Declares a required option offering every member of `E` as a choice.
pub fn choice_option<E: CommandChoice>(
    name: impl Into<String>,
    description: impl Into<String>,
) -> ChoiceOption<E> {
    ChoiceOption::with_members(name, description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anvil_core::{InteractionInfo, OptionMapping};
    use serde_json::json;

    fn event_with(options: Vec<OptionMapping>) -> SlashCommandEvent {
        let mut event = SlashCommandEvent::new(InteractionInfo::default(), "test");
        event.options = options;
        event
    }

    fn read<H: ReadOption>(
        schema: &CommandOption,
        handle: &H,
        event: &SlashCommandEvent,
    ) -> OptionResult<H::Output> {
        let raw = schema.parse(event)?;
        handle.read(raw.as_ref())
    }

    #[test]
    fn test_required_value_parses() {
        let (schema, handle) = option::<String>("word", "A word").into_option();
        let event = event_with(vec![OptionMapping::new("word", OptionType::String, json!("hi"))]);
        assert_eq!(read(&schema, &handle, &event).unwrap(), "hi");
    }

    #[test]
    fn test_optional_absent_is_none() {
        let (schema, handle) = option::<i64>("n", "A number").optional().into_option();
        assert!(!schema.is_required());
        assert_eq!(read(&schema, &handle, &event_with(vec![])).unwrap(), None);
    }

    #[test]
    fn test_type_mismatch() {
        let (schema, handle) = option::<bool>("flag", "A flag").into_option();
        let event = event_with(vec![OptionMapping::new("flag", OptionType::String, json!("yes"))]);
        assert!(matches!(
            read(&schema, &handle, &event),
            Err(OptionError::TypeMismatch {
                expected: OptionType::Boolean,
                found: OptionType::String,
                ..
            })
        ));
    }

    #[test]
    fn test_map_sees_absence() {
        let (schema, handle) = option::<i64>("n", "A number")
            .map(|n| n.unwrap_or(10) * 2)
            .into_option();
        assert_eq!(read(&schema, &handle, &event_with(vec![])).unwrap(), 20);
    }

    #[test]
    fn test_nullable_map_passes_absence_through() {
        let (schema, handle) = option::<i64>("n", "A number")
            .optional()
            .map(|n| n + 1)
            .into_option();
        assert_eq!(read(&schema, &handle, &event_with(vec![])).unwrap(), None);

        let event = event_with(vec![OptionMapping::new("n", OptionType::Integer, json!(4))]);
        assert_eq!(read(&schema, &handle, &event).unwrap(), Some(5));
    }

    #[test]
    fn test_map_nonnull_fails_fast() {
        let (schema, handle) = option::<i64>("n", "A number")
            .optional()
            .map_nonnull(|n| n.to_string())
            .into_option();
        assert_eq!(
            read(&schema, &handle, &event_with(vec![])),
            Err(OptionError::UnexpectedAbsent("n".into()))
        );
    }

    #[test]
    fn test_try_map_rejects() {
        let (schema, handle) = option::<String>("hex", "A hex number")
            .try_map(|s| u32::from_str_radix(&s, 16))
            .into_option();
        let ok = event_with(vec![OptionMapping::new("hex", OptionType::String, json!("ff"))]);
        assert_eq!(read(&schema, &handle, &ok).unwrap(), 255);

        let bad = event_with(vec![OptionMapping::new("hex", OptionType::String, json!("zz"))]);
        assert!(matches!(read(&schema, &handle, &bad), Err(OptionError::Invalid { .. })));
    }

    #[test]
    fn test_optional_round_trip_keeps_configuration() {
        let typed = integer("n", "A number")
            .range(1, 10)
            .name_localizations(anvil_core::localizations([(anvil_core::Locale::German, "zahl")]));
        let schema = typed.optional().required().schema().clone();

        assert!(schema.is_required());
        let data = schema.build();
        assert_eq!(data.min_value, Some(Number::Integer(1)));
        assert_eq!(data.name_localizations.len(), 1);
    }

    #[test]
    fn test_constraints_ignored_for_other_types() {
        let mut schema = CommandOption::new("flag", "A flag", OptionType::Boolean);
        schema.set_range(Some(Number::Integer(1)), None);
        schema.set_length(Some(1), Some(2));
        schema.set_channel_types(vec![ChannelType::GuildText]);
        schema.push_choice(Choice::new("yes", "y"));

        let data = schema.build();
        assert_eq!(data.min_value, None);
        assert_eq!(data.min_length, None);
        assert!(data.channel_types.is_empty());
        assert!(data.choices.is_empty());
    }

    #[test]
    fn test_choices_suppress_auto_complete() {
        let opt = string("fruit", "A fruit")
            .choice("Apple", "apple")
            .auto_complete(|_| [("Banana", "banana")]);
        assert!(!opt.schema().has_auto_complete());
        assert!(opt.schema().auto_complete_handler().is_none());
        assert!(!opt.schema().build().autocomplete);

        let opt = string("fruit", "A fruit").auto_complete(|_| [("Banana", "banana")]);
        assert!(opt.schema().build().autocomplete);
        assert!(opt.schema().auto_complete_handler().is_some());
        assert!(opt.schema().build().choices.is_empty());
    }
}
