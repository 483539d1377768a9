//! The dispatch engine.
//!
//! [`CommandListener`] resolves the routing key of each incoming interaction
//! and hands the matching handler to a shared [`TaskTracker`]. Dispatch never
//! waits for the handler: it schedules the task and returns whether a route
//! matched.
//!
//! Every handler task is supervised on its own. An error or a panic is caught
//! at the task boundary, logged, and reported to the optional failure hook;
//! sibling tasks and the listener keep running. Events without a route are
//! dropped, since the remote side may still list commands this process no
//! longer declares.

use std::convert::Infallible;
use std::fmt;
use std::future::{Future, Ready, ready};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};

use anvil_core::{
    AutoCompleteEvent, BoxedClient, InteractionEvent, MessageContextEvent, SlashCommandEvent,
    UserContextEvent,
};
use futures::FutureExt;
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tower::Service;
use tracing::{Instrument, debug, error, info_span, trace, warn};

use crate::context::{
    AutoCompleteContext, MessageCommandContext, SlashCommandContext, UserCommandContext,
};
use crate::handler::{BoxedHandler, HandlerResult};
use crate::option::CommandOption;
use crate::routing::{AutoCompleteKey, CommandKey, RoutingTable};

/// Called once for every failed or panicked handler.
pub type FailureHook = Arc<dyn Fn(&FailureReport) + Send + Sync>;

/// Describes one failed handler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    /// Interaction kind, e.g. `slash_command`.
    pub kind: &'static str,
    /// The routing key that matched, rendered as text.
    pub route: String,
    /// The error or panic message.
    pub error: String,
    /// `true` if the handler panicked rather than returning an error.
    pub panicked: bool,
}

// ============================================================================
// CommandListener
// ============================================================================

/// Routes interactions to handlers.
///
/// Cloning is cheap; clones share the routing table and the task tracker.
#[derive(Clone)]
pub struct CommandListener {
    routes: Arc<RoutingTable>,
    tracker: TaskTracker,
    on_failure: Option<FailureHook>,
}

impl CommandListener {
    pub(crate) fn new(routes: RoutingTable) -> Self {
        Self {
            routes: Arc::new(routes),
            tracker: TaskTracker::new(),
            on_failure: None,
        }
    }

    /// Sets a hook observing handler failures.
    pub fn with_failure_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&FailureReport) + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(hook));
        self
    }

    /// The compiled routes.
    pub fn routes(&self) -> &RoutingTable {
        &self.routes
    }

    /// Number of handler tasks still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    pub fn is_closed(&self) -> bool {
        self.tracker.is_closed()
    }

    /// Stops accepting events and waits for every running handler.
    pub async fn shutdown(&self) {
        self.tracker.close();
        debug!(in_flight = self.tracker.len(), "Waiting for command handlers");
        self.tracker.wait().await;
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Dispatches any interaction. Returns `true` if a handler was scheduled.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, event: InteractionEvent, client: BoxedClient) -> bool {
        match event {
            InteractionEvent::SlashCommand(e) => self.on_slash_command(e, client),
            InteractionEvent::UserContext(e) => self.on_user_context(e, client),
            InteractionEvent::MessageContext(e) => self.on_message_context(e, client),
            InteractionEvent::AutoComplete(e) => self.on_auto_complete(e, client),
        }
    }

    pub fn on_slash_command(&self, event: SlashCommandEvent, client: BoxedClient) -> bool {
        let key = CommandKey::from_slash(&event);
        let Some(route) = self.routes.slash(&key) else {
            trace!(command = %key, "No slash command registered, dropping event");
            return false;
        };

        let options = Arc::clone(&route.options);
        let handler = Arc::clone(&route.handler);
        self.spawn(
            "slash_command",
            key.to_string(),
            run_slash(options, handler, event, client),
        )
    }

    pub fn on_user_context(&self, event: UserContextEvent, client: BoxedClient) -> bool {
        let Some(handler) = self.routes.user(&event.name) else {
            trace!(command = %event.name, "No user command registered, dropping event");
            return false;
        };

        let handler = Arc::clone(handler);
        let route = event.name.clone();
        self.spawn(
            "user_context",
            route,
            run(handler, UserCommandContext::new(event, client)),
        )
    }

    pub fn on_message_context(&self, event: MessageContextEvent, client: BoxedClient) -> bool {
        let Some(handler) = self.routes.message(&event.name) else {
            trace!(command = %event.name, "No message command registered, dropping event");
            return false;
        };

        let handler = Arc::clone(handler);
        let route = event.name.clone();
        self.spawn(
            "message_context",
            route,
            run(handler, MessageCommandContext::new(event, client)),
        )
    }

    pub fn on_auto_complete(&self, event: AutoCompleteEvent, client: BoxedClient) -> bool {
        let key = AutoCompleteKey::from_event(&event);
        let Some(handler) = self.routes.auto_complete(&key) else {
            trace!(route = %key, "No auto-complete handler registered, dropping event");
            return false;
        };

        let handler = Arc::clone(handler);
        self.spawn(
            "auto_complete",
            key.to_string(),
            run(handler, AutoCompleteContext::new(event, client)),
        )
    }

    /// Schedules one supervised handler task.
    fn spawn<F>(&self, kind: &'static str, route: String, task: F) -> bool
    where
        F: Future<Output = HandlerResult> + Send + 'static,
    {
        if self.tracker.is_closed() {
            warn!(kind, route = %route, "Listener is shut down, dropping event");
            return false;
        }
        let Ok(runtime) = Handle::try_current() else {
            error!(kind, route = %route, "Dispatch called outside a tokio runtime");
            return false;
        };

        debug!(kind, route = %route, "Dispatching interaction");
        let span = info_span!("interaction", kind, route = %route);
        let on_failure = self.on_failure.clone();

        let supervised = async move {
            let (message, panicked) = match AssertUnwindSafe(task).catch_unwind().await {
                Ok(Ok(())) => return,
                Ok(Err(e)) => {
                    warn!(error = %e, "Command handler failed");
                    (e.to_string(), false)
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(panic = %message, "Command handler panicked");
                    (message, true)
                }
            };

            if let Some(hook) = on_failure {
                hook(&FailureReport {
                    kind,
                    route,
                    error: message,
                    panicked,
                });
            }
        };

        self.tracker.spawn_on(supervised.instrument(span), &runtime);
        true
    }
}

async fn run_slash(
    options: Arc<[CommandOption]>,
    handler: BoxedHandler<SlashCommandContext>,
    event: SlashCommandEvent,
    client: BoxedClient,
) -> HandlerResult {
    let mut ctx = SlashCommandContext::new(event, client);
    ctx.parse_options(&options)?;
    handler.call(ctx).await
}

async fn run<C: Send + 'static>(handler: BoxedHandler<C>, ctx: C) -> HandlerResult {
    handler.call(ctx).await
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl fmt::Debug for CommandListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandListener")
            .field("routes", &self.routes)
            .field("in_flight", &self.tracker.len())
            .field("closed", &self.tracker.is_closed())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tower integration
// ============================================================================

/// One interaction together with the client that delivered it.
pub struct Interaction {
    pub event: InteractionEvent,
    pub client: BoxedClient,
}

impl Interaction {
    pub fn new(event: impl Into<InteractionEvent>, client: BoxedClient) -> Self {
        Self {
            event: event.into(),
            client,
        }
    }
}

/// Dispatch as a tower service, so middleware can sit in front of the
/// listener. The response tells whether a handler was scheduled.
impl Service<Interaction> for CommandListener {
    type Response = bool;
    type Error = Infallible;
    type Future = Ready<Result<bool, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Interaction) -> Self::Future {
        ready(Ok(self.dispatch(req.event, req.client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::option::{OptionBuilder, integer, string};
    use crate::registry::CommandRegistry;
    use anvil_core::{
        ApiError, ApiResult, Choice, ChoiceValue, Client, CommandData, CommandScope,
        FocusedOption, InteractionInfo, Message, OptionMapping, OptionType, Snowflake, User,
    };
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    #[derive(Default)]
    struct RecordingClient {
        replies: Mutex<Vec<String>>,
        suggestions: Mutex<Vec<Vec<Choice>>>,
    }

    #[async_trait]
    impl Client for RecordingClient {
        fn application_id(&self) -> Snowflake {
            Snowflake(1)
        }

        async fn replace_commands(&self, _: &CommandScope, _: &[CommandData]) -> ApiResult<()> {
            Err(ApiError::NotConnected)
        }

        async fn reply(&self, _: &InteractionInfo, content: &str) -> ApiResult<()> {
            self.replies.lock().push(content.to_string());
            Ok(())
        }

        async fn reply_choices(&self, _: &InteractionInfo, choices: &[Choice]) -> ApiResult<()> {
            self.suggestions.lock().push(choices.to_vec());
            Ok(())
        }
    }

    fn slash(name: &str) -> SlashCommandEvent {
        SlashCommandEvent::new(InteractionInfo::default(), name)
    }

    #[tokio::test]
    async fn test_slash_dispatch_reads_options() {
        let mut registry = CommandRegistry::new();
        registry.slash("roll", "Roll dice", |cmd| {
            let sides = cmd.option(integer("sides", "Sides").range(1, 10));
            cmd.handler(move |ctx| {
                let sides = ctx.value(&sides);
                async move {
                    ctx.reply(&format!("d{}", sides?)).await?;
                    Ok::<_, BoxError>(())
                }
            });
        });
        let listener = registry.compile().unwrap().listener;
        let client = Arc::new(RecordingClient::default());

        let event =
            slash("roll").with_option(OptionMapping::new("sides", OptionType::Integer, json!(5)));
        assert!(listener.on_slash_command(event, client.clone()));
        listener.shutdown().await;

        assert_eq!(*client.replies.lock(), ["d5"]);
    }

    #[tokio::test]
    async fn test_dispatch_isolation() {
        let completed = Arc::new(AtomicUsize::new(0));
        let failures = Arc::new(Mutex::new(Vec::new()));

        let mut registry = CommandRegistry::new();
        registry.slash("boom", "Always panics", |cmd| {
            cmd.handler(|_ctx| -> futures::future::Ready<()> { panic!("boom") });
        });
        registry.slash("fail", "Always fails", |cmd| {
            cmd.handler(|_ctx| async { Err::<(), _>(ApiError::Timeout) });
        });
        let counter = Arc::clone(&completed);
        registry.slash("ok", "Always works", move |cmd| {
            cmd.handler(move |_ctx| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            });
        });

        let seen = Arc::clone(&failures);
        let listener = registry
            .compile()
            .unwrap()
            .listener
            .with_failure_hook(move |report| seen.lock().push(report.clone()));
        let client: BoxedClient = Arc::new(RecordingClient::default());

        assert!(listener.on_slash_command(slash("boom"), client.clone()));
        assert!(listener.on_slash_command(slash("fail"), client.clone()));
        assert!(listener.on_slash_command(slash("ok"), client.clone()));
        assert!(listener.on_slash_command(slash("ok"), client.clone()));
        listener.shutdown().await;

        assert_eq!(completed.load(Ordering::SeqCst), 2);
        let mut failures = failures.lock().clone();
        failures.sort_by(|a, b| a.route.cmp(&b.route));
        assert_eq!(failures.len(), 2);
        assert_eq!((failures[0].route.as_str(), failures[0].panicked), ("boom", true));
        assert_eq!(failures[0].error, "boom");
        assert_eq!((failures[1].route.as_str(), failures[1].panicked), ("fail", false));
    }

    #[tokio::test]
    async fn test_listener_survives_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut registry = CommandRegistry::new();
        registry.slash("flaky", "Fails every other call", move |cmd| {
            cmd.handler(move |_ctx| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n % 2 == 0 {
                        panic!("flaky");
                    }
                }
            });
        });
        let listener = registry.compile().unwrap().listener;
        let client: BoxedClient = Arc::new(RecordingClient::default());

        for _ in 0..4 {
            assert!(listener.on_slash_command(slash("flaky"), client.clone()));
        }
        listener.shutdown().await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_decode_failure_is_contained() {
        let failures = Arc::new(AtomicUsize::new(0));
        let mut registry = CommandRegistry::new();
        registry.slash("count", "Count", |cmd| {
            let n = cmd.option(integer("n", "A number"));
            cmd.handler(move |ctx| {
                let n = ctx.value(&n);
                async move { n.map(|_| ()) }
            });
        });
        let seen = Arc::clone(&failures);
        let listener = registry
            .compile()
            .unwrap()
            .listener
            .with_failure_hook(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        let client: BoxedClient = Arc::new(RecordingClient::default());

        let bad =
            slash("count").with_option(OptionMapping::new("n", OptionType::Integer, json!("x")));
        assert!(listener.on_slash_command(bad, client.clone()));
        listener.shutdown().await;
        assert_eq!(failures.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_auto_complete_flow() {
        let mut registry = CommandRegistry::new();
        registry.slash("fruit", "Pick a fruit", |cmd| {
            cmd.option(
                integer("kind", "Fruit")
                    .auto_complete(|_| [("Apple", 1), ("Banana", 2)]),
            );
            cmd.handler(|_ctx| async {});
        });
        let listener = registry.compile().unwrap().listener;
        let client = Arc::new(RecordingClient::default());

        let focused = FocusedOption {
            name: "kind".into(),
            kind: OptionType::Integer,
            value: "a".into(),
        };
        let event = AutoCompleteEvent::new(InteractionInfo::default(), "fruit", focused);
        assert!(listener.on_auto_complete(event, client.clone()));
        listener.shutdown().await;

        let sent = client.suggestions.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            [
                Choice::new("Apple", ChoiceValue::Integer(1)),
                Choice::new("Banana", ChoiceValue::Integer(2)),
            ]
        );
    }

    #[tokio::test]
    async fn test_raw_auto_complete_handler() {
        let mut registry = CommandRegistry::new();
        registry.slash("search", "Search", |cmd| {
            cmd.option(string("query", "Query").on_auto_complete(|ctx| async move {
                let echo = Choice::new(ctx.input(), ctx.input());
                ctx.reply_choices(&[echo]).await
            }));
            cmd.handler(|_ctx| async {});
        });
        let listener = registry.compile().unwrap().listener;
        let client = Arc::new(RecordingClient::default());

        let focused = FocusedOption {
            name: "query".into(),
            kind: OptionType::String,
            value: "rust".into(),
        };
        let event = AutoCompleteEvent::new(InteractionInfo::default(), "search", focused);
        assert!(listener.on_auto_complete(event, client.clone()));
        listener.shutdown().await;

        assert_eq!(client.suggestions.lock()[0][0].name, "rust");
    }

    #[tokio::test]
    async fn test_unmatched_events_are_dropped() {
        let mut registry = CommandRegistry::new();
        registry.slash("ping", "Ping", |cmd| {
            cmd.handler(|_ctx| async {});
        });
        let listener = registry.compile().unwrap().listener;
        let client: BoxedClient = Arc::new(RecordingClient::default());

        assert!(!listener.on_slash_command(slash("stale"), client.clone()));
        assert!(!listener.on_slash_command(
            slash("ping").with_path(None, Some("sub")),
            client.clone()
        ));
        let user = UserContextEvent {
            info: InteractionInfo::default(),
            name: "Unknown".into(),
            target: User::default(),
        };
        assert!(!listener.dispatch(user.into(), client.clone()));
        assert_eq!(listener.in_flight(), 0);

        assert!(listener.on_slash_command(slash("ping"), client.clone()));
        listener.shutdown().await;
    }

    #[tokio::test]
    async fn test_context_menu_dispatch() {
        let mut registry = CommandRegistry::new();
        registry.user("Greet", |ctx: UserCommandContext| async move {
            let text = format!("hello {}", ctx.target().username);
            ctx.reply(&text).await
        });
        registry.message("Echo", |ctx: MessageCommandContext| async move {
            let text = ctx.target().content.clone();
            ctx.reply(&text).await
        });
        let listener = registry.compile().unwrap().listener;
        let client = Arc::new(RecordingClient::default());

        let user = UserContextEvent {
            info: InteractionInfo::default(),
            name: "Greet".into(),
            target: User {
                username: "ferris".into(),
                ..User::default()
            },
        };
        let message = MessageContextEvent {
            info: InteractionInfo::default(),
            name: "Echo".into(),
            target: Message {
                content: "hi".into(),
                ..Message::default()
            },
        };
        assert!(listener.dispatch(user.into(), client.clone()));
        assert!(listener.dispatch(message.into(), client.clone()));
        listener.shutdown().await;

        let mut replies = client.replies.lock().clone();
        replies.sort();
        assert_eq!(replies, ["hello ferris", "hi"]);
    }

    #[tokio::test]
    async fn test_closed_listener_rejects_events() {
        let mut registry = CommandRegistry::new();
        registry.slash("ping", "Ping", |cmd| {
            cmd.handler(|_ctx| async {});
        });
        let listener = registry.compile().unwrap().listener;
        listener.shutdown().await;

        assert!(listener.is_closed());
        let client: BoxedClient = Arc::new(RecordingClient::default());
        assert!(!listener.on_slash_command(slash("ping"), client));
    }

    #[test]
    fn test_dispatch_without_runtime() {
        let mut registry = CommandRegistry::new();
        registry.slash("ping", "Ping", |cmd| {
            cmd.handler(|_ctx| async {});
        });
        let listener = registry.compile().unwrap().listener;
        let client: BoxedClient = Arc::new(RecordingClient::default());

        assert!(!listener.on_slash_command(slash("ping"), client));
    }

    #[tokio::test]
    async fn test_tower_service() {
        let mut registry = CommandRegistry::new();
        registry.slash("ping", "Ping", |cmd| {
            cmd.handler(|ctx| async move { ctx.reply("pong").await });
        });
        let listener = registry.compile().unwrap().listener;
        let client = Arc::new(RecordingClient::default());

        let scheduled = listener
            .clone()
            .oneshot(Interaction::new(slash("ping"), client.clone()))
            .await
            .unwrap();
        assert!(scheduled);
        listener.shutdown().await;
        assert_eq!(*client.replies.lock(), ["pong"]);
    }
}
