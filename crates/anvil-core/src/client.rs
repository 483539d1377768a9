//! The client trait.
//!
//! A [`Client`] is the external collaborator that owns the connection to the
//! remote API. It delivers interaction events to the command listener and
//! accepts the calls the command layer needs: replacing the registered
//! command set and answering interactions. Concrete implementations live
//! outside this workspace.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::event::InteractionInfo;
use crate::model::{Choice, CommandData, Snowflake};

/// The target of a command registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "id")]
pub enum CommandScope {
    /// Visible everywhere the application is installed.
    Global,
    /// Visible only in one guild.
    Guild(Snowflake),
}

impl fmt::Display for CommandScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Guild(id) => write!(f, "guild:{id}"),
        }
    }
}

/// The API surface the command layer calls.
///
/// # Example
///
/// ```rust,ignore
/// struct MyClient { /* connection state */ }
///
/// #[async_trait]
/// impl Client for MyClient {
///     fn application_id(&self) -> Snowflake { self.app_id }
///
///     async fn replace_commands(
///         &self,
///         scope: &CommandScope,
///         commands: &[CommandData],
///     ) -> ApiResult<()> {
///         self.put(scope, commands).await
///     }
///
///     // ...
/// }
/// ```
#[async_trait]
pub trait Client: Send + Sync + 'static {
    /// The application this client acts for.
    fn application_id(&self) -> Snowflake;

    /// Replaces every command registered under `scope` with `commands`.
    ///
    /// This is a full replace: commands absent from the list are removed.
    async fn replace_commands(&self, scope: &CommandScope, commands: &[CommandData])
    -> ApiResult<()>;

    /// Answers an interaction with a text message.
    async fn reply(&self, interaction: &InteractionInfo, content: &str) -> ApiResult<()>;

    /// Answers an auto-complete request with suggestions.
    async fn reply_choices(&self, interaction: &InteractionInfo, choices: &[Choice])
    -> ApiResult<()>;
}

/// A shared, type-erased client.
pub type BoxedClient = Arc<dyn Client>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_display() {
        assert_eq!(CommandScope::Global.to_string(), "global");
        assert_eq!(CommandScope::Guild(Snowflake(9)).to_string(), "guild:9");
    }
}
