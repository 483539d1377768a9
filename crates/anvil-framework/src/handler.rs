//! Handler system for the Anvil framework.
//!
//! A handler is any async function taking one context value. The context type
//! picks the command kind the handler serves:
//!
//! | Context | Registered through |
//! |---------|--------------------|
//! | [`SlashCommandContext`](crate::context::SlashCommandContext) | slash commands and sub-commands |
//! | [`UserCommandContext`](crate::context::UserCommandContext) | user context-menu commands |
//! | [`MessageCommandContext`](crate::context::MessageCommandContext) | message context-menu commands |
//! | [`AutoCompleteContext`](crate::context::AutoCompleteContext) | raw auto-complete handlers |
//!
//! Handlers may return `()` or `Result<(), E>` for any error convertible into
//! [`BoxError`]. Errors are logged by the listener and never reach other
//! invocations.
//!
//! ```rust,ignore
//! async fn ping(ctx: SlashCommandContext) -> Result<(), ApiError> {
//!     ctx.reply("pong").await
//! }
//!
//! commands.slash("ping", "Check latency", |cmd| {
//!     cmd.handler(ping);
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

pub use futures::future::BoxFuture;

use crate::error::BoxError;

/// The outcome of one handler invocation.
pub type HandlerResult = Result<(), BoxError>;

// ============================================================================
// IntoHandlerResult - Handle handler return values
// ============================================================================

/// Return types a handler may have.
pub trait IntoHandlerResult: Send + 'static {
    fn into_handler_result(self) -> HandlerResult;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> HandlerResult {
        Ok(())
    }
}

impl<E> IntoHandlerResult for Result<(), E>
where
    E: Into<BoxError> + Send + 'static,
{
    fn into_handler_result(self) -> HandlerResult {
        self.map_err(Into::into)
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// An async function from a context `C` to a handler result.
///
/// Implemented for every `Fn(C) -> impl Future` whose output implements
/// [`IntoHandlerResult`].
pub trait Handler<C>: Send + Sync + 'static {
    /// Invokes the handler with a fresh context.
    fn call(&self, ctx: C) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut, R, C> Handler<C> for F
where
    F: Fn(C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoHandlerResult,
    C: Send + 'static,
{
    fn call(&self, ctx: C) -> BoxFuture<'static, HandlerResult> {
        let fut = (self)(ctx);
        Box::pin(async move { fut.await.into_handler_result() })
    }
}

/// A type-erased handler stored in routing tables.
pub type BoxedHandler<C> = Arc<dyn Handler<C>>;

/// Erases a handler function.
pub fn into_handler<C, H>(handler: H) -> BoxedHandler<C>
where
    H: Handler<C>,
    C: Send + 'static,
{
    Arc::new(handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_unit_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handler = into_handler(move |n: usize| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(n, Ordering::SeqCst);
            }
        });

        handler.call(2).await.unwrap();
        handler.call(3).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_error_handler() {
        let handler = into_handler(|n: u32| async move {
            if n == 0 {
                Err("zero")
            } else {
                Ok(())
            }
        });

        assert!(handler.call(1).await.is_ok());
        let err = handler.call(0).await.unwrap_err();
        assert_eq!(err.to_string(), "zero");
    }

    #[test]
    fn test_handler_outside_runtime() {
        let handler = into_handler(|s: String| async move { s.parse::<u8>().map(|_| ()) });

        assert!(tokio_test::block_on(handler.call("7".into())).is_ok());
        assert!(tokio_test::block_on(handler.call("x".into())).is_err());
    }
}
