//! Error types for the Anvil framework.

use anvil_core::{ApiError, CommandType, OptionType};
use thiserror::Error;

use crate::routing::CommandKey;

/// A type-erased error returned by a handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ============================================================================
// OptionError - decoding and typed access, scoped to one invocation
// ============================================================================

/// Errors raised while turning an invocation's raw options into typed values.
///
/// These fail the single invocation they occur in and never affect the
/// listener.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionError {
    /// The option was never parsed into this context. This means the handle
    /// belongs to a different command than the one being handled.
    #[error("option '{0}' was not parsed for this invocation")]
    NotParsed(String),

    /// A required option carried no value.
    #[error("required option '{0}' has no value")]
    Missing(String),

    /// A `map_nonnull` step received an absent value.
    #[error("option '{0}' is absent but its mapping requires a value")]
    UnexpectedAbsent(String),

    /// The delivered wire type does not convert to the declared type.
    #[error("option '{option}' expected a {expected} value, got {found}")]
    TypeMismatch {
        /// Option name.
        option: String,
        /// Declared wire type.
        expected: OptionType,
        /// Delivered wire type.
        found: OptionType,
    },

    /// The raw payload does not have the shape its wire type promises.
    #[error("option '{option}' carried a malformed value: {reason}")]
    Malformed {
        /// Option name.
        option: String,
        /// What was wrong.
        reason: String,
    },

    /// Text could not be decoded into the option's structured type.
    #[error("option '{option}' could not be decoded: {reason}")]
    Decode {
        /// Option name.
        option: String,
        /// Decoder message.
        reason: String,
    },

    /// A `try_map` step rejected the value.
    #[error("option '{option}' was rejected: {reason}")]
    Invalid {
        /// Option name.
        option: String,
        /// Message of the mapping step.
        reason: String,
    },
}

impl OptionError {
    pub(crate) fn malformed(option: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            option: option.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for option decoding.
pub type OptionResult<T> = Result<T, OptionError>;

// ============================================================================
// SchemaError - configuration mistakes caught at compile time
// ============================================================================

/// Configuration errors detected while compiling declared commands.
///
/// These are programmer mistakes; a registry that fails to compile produces
/// no definitions and no listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two slash-command leaves resolve to the same routing key, or two
    /// top-level slash commands share a name.
    #[error("slash command '{0}' is declared more than once")]
    DuplicateCommand(CommandKey),

    /// Two context-menu commands of the same kind share a name.
    #[error("{kind} context command '{name}' is declared more than once")]
    DuplicateContextCommand {
        /// User or message.
        kind: CommandType,
        /// Command name.
        name: String,
    },

    /// Two options (or sub-commands) of one command share a name.
    #[error("'{command}' declares '{option}' more than once")]
    DuplicateOption {
        /// Command path.
        command: String,
        /// Repeated name.
        option: String,
    },

    /// Choices were attached to a wire type that cannot carry them.
    #[error("option '{option}' of '{command}' is a {kind} option and cannot have choices")]
    ChoicesNotSupported {
        /// Command path.
        command: String,
        /// Option name.
        option: String,
        /// The option's wire type.
        kind: OptionType,
    },

    /// A choice value does not match the option's wire type.
    #[error("choice '{choice}' of option '{option}' in '{command}' is not a {expected} value")]
    ChoiceTypeMismatch {
        /// Command path.
        command: String,
        /// Option name.
        option: String,
        /// Choice label.
        choice: String,
        /// The option's wire type.
        expected: OptionType,
    },

    /// A choice value could not be encoded as text.
    #[error("choice '{choice}' of option '{option}' in '{command}' could not be encoded")]
    UnencodableChoice {
        /// Command path.
        command: String,
        /// Option name.
        option: String,
        /// Choice label.
        choice: String,
    },

    /// More choices than the remote side accepts.
    #[error(
        "option '{option}' of '{command}' has {count} choices (at most {max} allowed)",
        max = crate::option::MAX_CHOICES
    )]
    TooManyChoices {
        /// Command path.
        command: String,
        /// Option name.
        option: String,
        /// Declared choice count.
        count: usize,
    },

    /// More options than the remote side accepts.
    #[error(
        "'{command}' has {count} options (at most {max} allowed)",
        max = crate::option::MAX_OPTIONS
    )]
    TooManyOptions {
        /// Command path.
        command: String,
        /// Declared option count.
        count: usize,
    },

    /// A required option follows an optional one.
    #[error("required option '{option}' of '{command}' follows an optional option")]
    RequiredAfterOptional {
        /// Command path.
        command: String,
        /// Offending option name.
        option: String,
    },

    /// A command declares both its own options or handler and sub-commands.
    #[error("'{0}' mixes options or a handler with sub-commands")]
    MixedCommandKinds(String),

    /// A sub-command group has no sub-commands.
    #[error("group '{group}' of '{command}' has no sub-commands")]
    EmptyGroup {
        /// Command name.
        command: String,
        /// Group name.
        group: String,
    },

    /// A command or option name is not accepted by the remote side.
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A leaf command has no handler.
    #[error("'{0}' has no handler")]
    MissingHandler(String),
}

/// Result type for schema compilation.
pub type SchemaResult<T> = Result<T, SchemaError>;

// ============================================================================
// AutoCompleteError
// ============================================================================

/// Errors raised while answering an auto-complete request.
#[derive(Debug, Clone, Error)]
pub enum AutoCompleteError {
    /// A suggestion value is neither a number nor text.
    #[error("unsupported auto-complete value for '{label}': {value}")]
    UnsupportedValue {
        /// Suggestion label.
        label: String,
        /// Rendered value.
        value: String,
    },

    /// Sending the suggestions failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}
