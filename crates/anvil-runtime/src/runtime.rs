//! Command runtime: compile, register, listen.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use anvil_runtime::CommandRuntime;
//!
//! // Loads anvil.toml from the current directory if present
//! let runtime = CommandRuntime::new();
//!
//! runtime.register(|registry| {
//!     registry.slash("ping", "Check the bot is alive", |cmd| {
//!         cmd.handler(|ctx| async move { ctx.reply("pong").await });
//!     });
//! })?;
//!
//! let listener = runtime.start(client.clone()).await?;
//! // feed events from the client into `listener.dispatch(..)`
//! runtime.shutdown().await;
//! ```

use std::future::Future;
use std::path::Path;

use anvil_core::{BoxedClient, CommandData, InteractionEvent};
use anvil_framework::{
    CommandListener, CommandRegistry, CompiledCommands, FailureHook, FailureReport,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tracing::{debug, error, info, warn};

use crate::config::{AnvilConfig, ConfigLoader, ConfigResult};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Owns the command registry and the lifecycle of its listener.
///
/// Commands are declared with [`register`](Self::register) before the
/// runtime starts. [`start`](Self::start) compiles them, replaces the
/// registered set in every configured scope, and returns the listener;
/// [`listen`](Self::listen) does the same without touching registrations.
pub struct CommandRuntime {
    config: AnvilConfig,
    registry: Mutex<CommandRegistry>,
    listener: Mutex<Option<CommandListener>>,
    on_failure: Mutex<Option<FailureHook>>,
    starting: AtomicBool,
}

/// Held while a start is in progress; releases the claim on drop.
struct StartClaim<'a>(&'a AtomicBool);

impl Drop for StartClaim<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CommandRuntime {
    /// Creates a runtime from the default configuration sources.
    ///
    /// Falls back to defaults if the configuration cannot be loaded.
    pub fn new() -> Self {
        let config = ConfigLoader::new().load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config ({e}), using defaults");
            AnvilConfig::default()
        });

        Self::from_config(&config)
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime and initializes logging from `config`.
    pub fn from_config(config: &AnvilConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            registration = ?config.registration.scope,
            "Runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
            registry: Mutex::new(CommandRegistry::new()),
            listener: Mutex::new(None),
            on_failure: Mutex::new(None),
            starting: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &AnvilConfig {
        &self.config
    }

    /// Declares commands. Fails once the runtime has started or is starting.
    pub fn register(&self, declare: impl FnOnce(&mut CommandRegistry)) -> RuntimeResult<()> {
        if self.is_running() || self.starting.load(Ordering::Acquire) {
            return Err(RuntimeError::AlreadyStarted);
        }
        self.registry.lock().register(declare);
        Ok(())
    }

    /// Sets a hook observing handler failures on the listener built by the
    /// next start.
    pub fn on_failure<F>(&self, hook: F)
    where
        F: Fn(&FailureReport) + Send + Sync + 'static,
    {
        *self.on_failure.lock() = Some(Arc::new(hook));
    }

    /// Returns `true` while a listener is live.
    pub fn is_running(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// The live listener, if started.
    pub fn listener(&self) -> Option<CommandListener> {
        self.listener.lock().clone()
    }

    /// Compiles the registered commands without starting.
    pub fn definitions(&self) -> RuntimeResult<Vec<CommandData>> {
        Ok(self.registry.lock().compile()?.commands)
    }

    fn compile(&self) -> RuntimeResult<CompiledCommands> {
        let mut compiled = self.registry.lock().compile()?;
        if let Some(hook) = self.on_failure.lock().clone() {
            compiled.listener = compiled.listener.with_failure_hook(move |report| hook(report));
        }
        Ok(compiled)
    }

    /// Claims the start slot. A claim made after another start has installed
    /// its listener sees it running, since the listener is installed before
    /// that claim is released.
    fn claim_start(&self) -> RuntimeResult<StartClaim<'_>> {
        if self
            .starting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(RuntimeError::AlreadyStarted);
        }
        let claim = StartClaim(&self.starting);
        if self.is_running() {
            return Err(RuntimeError::AlreadyStarted);
        }
        Ok(claim)
    }

    fn install(&self, listener: CommandListener) -> RuntimeResult<CommandListener> {
        let mut slot = self.listener.lock();
        if slot.is_some() {
            return Err(RuntimeError::AlreadyStarted);
        }
        *slot = Some(listener.clone());
        Ok(listener)
    }

    /// Compiles the registered commands, submits them to every configured
    /// scope, and returns the listener.
    ///
    /// Each scope is a full replace. When registration is disabled in the
    /// configuration this behaves like [`listen`](Self::listen).
    ///
    /// Concurrent calls are rejected with [`RuntimeError::AlreadyStarted`]
    /// before any registration is submitted.
    pub async fn start(&self, client: BoxedClient) -> RuntimeResult<CommandListener> {
        let _claim = self.claim_start()?;
        let CompiledCommands { commands, listener } = self.compile()?;

        if self.config.registration.enabled {
            for scope in self.config.registration.scopes() {
                client
                    .replace_commands(&scope, &commands)
                    .await
                    .map_err(|source| RuntimeError::Registration { scope, source })?;
                info!(scope = %scope, commands = commands.len(), "Registered commands");
            }
        } else {
            info!("Command registration disabled, listening only");
        }

        let listener = self.install(listener)?;
        info!(routes = listener.routes().len(), "Runtime started");
        Ok(listener)
    }

    /// Compiles the registered commands and returns the listener without
    /// submitting any registration.
    pub fn listen(&self) -> RuntimeResult<CommandListener> {
        let _claim = self.claim_start()?;
        let CompiledCommands { listener, .. } = self.compile()?;
        let listener = self.install(listener)?;
        info!(routes = listener.routes().len(), "Listening for interactions");
        Ok(listener)
    }

    /// Dispatches an event through the live listener.
    ///
    /// Returns `false` if the runtime is not started or nothing matched.
    pub fn dispatch(&self, event: InteractionEvent, client: BoxedClient) -> bool {
        match self.listener() {
            Some(listener) => listener.dispatch(event, client),
            None => {
                warn!(kind = event.kind_name(), "Interaction received before start, dropping");
                false
            }
        }
    }

    /// Closes the listener and waits for running handlers.
    pub async fn shutdown(&self) {
        let Some(listener) = self.listener.lock().take() else {
            warn!("Runtime is not running");
            return;
        };

        info!("Stopping command runtime");
        listener.shutdown().await;
        info!("Runtime stopped");
    }

    /// Starts, then runs until Ctrl+C or SIGTERM.
    pub async fn run(&self, client: BoxedClient) -> RuntimeResult<()> {
        self.start(client).await?;
        info!("Anvil runtime is now running. Press Ctrl+C to stop.");
        wait_for_shutdown().await;
        self.shutdown().await;
        Ok(())
    }

    /// Starts, then runs until `shutdown` completes.
    pub async fn run_until<F>(&self, client: BoxedClient, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        self.start(client).await?;
        shutdown.await;
        self.shutdown().await;
        Ok(())
    }
}

impl Default for CommandRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRuntime")
            .field("registry", &*self.registry.lock())
            .field("running", &self.is_running())
            .finish()
    }
}

/// Waits for Ctrl+C or, on unix, SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
                return;
            }
            Err(e) => debug!(error = %e, "SIGTERM handler unavailable"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`CommandRuntime`] with custom configuration sources.
///
/// ```rust,ignore
/// let runtime = CommandRuntime::builder()
///     .config_file("config/anvil.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    pub fn merge(mut self, config: AnvilConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    pub fn build(self) -> ConfigResult<CommandRuntime> {
        let config = self.config_loader.load()?;
        Ok(CommandRuntime::from_config(&config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RegistrationConfig, RegistrationScope};
    use anvil_core::{
        ApiError, ApiResult, Choice, Client, CommandScope, InteractionInfo, SlashCommandEvent,
        Snowflake,
    };
    use async_trait::async_trait;

    #[derive(Default)]
    struct MockClient {
        registrations: Mutex<Vec<(CommandScope, Vec<String>)>>,
        replies: Mutex<Vec<String>>,
        reject: bool,
    }

    #[async_trait]
    impl Client for MockClient {
        fn application_id(&self) -> Snowflake {
            Snowflake(1)
        }

        async fn replace_commands(
            &self,
            scope: &CommandScope,
            commands: &[CommandData],
        ) -> ApiResult<()> {
            if self.reject {
                return Err(ApiError::Rejected {
                    status: 403,
                    message: "Missing Access".into(),
                });
            }
            tokio::task::yield_now().await;
            let names = commands.iter().map(|c| c.name.clone()).collect();
            self.registrations.lock().push((*scope, names));
            Ok(())
        }

        async fn reply(&self, _: &InteractionInfo, content: &str) -> ApiResult<()> {
            self.replies.lock().push(content.to_string());
            Ok(())
        }

        async fn reply_choices(&self, _: &InteractionInfo, _: &[Choice]) -> ApiResult<()> {
            Ok(())
        }
    }

    fn runtime(registration: RegistrationConfig) -> CommandRuntime {
        let runtime = CommandRuntime::from_config(&AnvilConfig {
            registration,
            ..Default::default()
        });
        runtime
            .register(|registry| {
                registry.slash("ping", "Ping", |cmd| {
                    cmd.handler(|ctx| async move { ctx.reply("pong").await });
                });
                registry.slash("fail", "Always fails", |cmd| {
                    cmd.handler(|_ctx| async { Err::<(), _>("boom") });
                });
            })
            .unwrap();
        runtime
    }

    fn slash(name: &str) -> InteractionEvent {
        SlashCommandEvent::new(InteractionInfo::default(), name).into()
    }

    #[tokio::test]
    async fn test_start_registers_globally_and_dispatches() {
        let runtime = runtime(RegistrationConfig::default());
        let client = Arc::new(MockClient::default());

        runtime.start(client.clone()).await.unwrap();
        assert!(runtime.is_running());
        assert_eq!(
            *client.registrations.lock(),
            [(CommandScope::Global, vec!["ping".to_string(), "fail".to_string()])]
        );

        assert!(runtime.dispatch(slash("ping"), client.clone()));
        assert!(!runtime.dispatch(slash("unknown"), client.clone()));
        runtime.shutdown().await;

        assert!(!runtime.is_running());
        assert_eq!(*client.replies.lock(), ["pong"]);
    }

    #[tokio::test]
    async fn test_start_replaces_each_guild() {
        let runtime = runtime(RegistrationConfig {
            scope: RegistrationScope::Guilds,
            guilds: vec![Snowflake(10), Snowflake(20)],
            ..Default::default()
        });
        let client = Arc::new(MockClient::default());

        runtime.start(client.clone()).await.unwrap();

        let scopes: Vec<_> = client.registrations.lock().iter().map(|(s, _)| *s).collect();
        assert_eq!(
            scopes,
            [
                CommandScope::Guild(Snowflake(10)),
                CommandScope::Guild(Snowflake(20))
            ]
        );
    }

    #[tokio::test]
    async fn test_registration_disabled() {
        let runtime = runtime(RegistrationConfig {
            enabled: false,
            ..Default::default()
        });
        let client = Arc::new(MockClient::default());

        let listener = runtime.start(client.clone()).await.unwrap();
        assert!(client.registrations.lock().is_empty());
        assert_eq!(listener.routes().slash_keys().len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_registration_leaves_runtime_stopped() {
        let runtime = runtime(RegistrationConfig::default());
        let client = Arc::new(MockClient {
            reject: true,
            ..Default::default()
        });

        let err = runtime.start(client).await.unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Registration {
                scope: CommandScope::Global,
                source: ApiError::Rejected { status: 403, .. }
            }
        ));
        assert!(!runtime.is_running());
    }

    #[tokio::test]
    async fn test_schema_error_surfaces() {
        let runtime = runtime(RegistrationConfig::default());
        runtime
            .register(|registry| {
                registry.slash("ping", "Again", |cmd| {
                    cmd.handler(|_ctx| async {});
                });
            })
            .unwrap();

        let err = runtime.start(Arc::new(MockClient::default())).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Schema(_)));
        assert!(runtime.definitions().is_err());
    }

    #[tokio::test]
    async fn test_lifecycle_guards() {
        let runtime = runtime(RegistrationConfig::default());
        let client = Arc::new(MockClient::default());

        assert!(!runtime.dispatch(slash("ping"), client.clone()));

        runtime.listen().unwrap();
        assert!(matches!(runtime.listen(), Err(RuntimeError::AlreadyStarted)));
        assert!(matches!(
            runtime.start(client.clone()).await,
            Err(RuntimeError::AlreadyStarted)
        ));
        assert!(matches!(
            runtime.register(|_| {}),
            Err(RuntimeError::AlreadyStarted)
        ));
        assert!(client.registrations.lock().is_empty());

        runtime.shutdown().await;
        runtime.listen().unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_start_registers_once() {
        let runtime = runtime(RegistrationConfig::default());
        let client = Arc::new(MockClient::default());

        let (first, second) = tokio::join!(
            runtime.start(client.clone()),
            runtime.start(client.clone())
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(RuntimeError::AlreadyStarted)));
        assert_eq!(client.registrations.lock().len(), 1);
        assert!(runtime.is_running());

        runtime.shutdown().await;
        assert!(runtime.start(client.clone()).await.is_ok());
        assert_eq!(client.registrations.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_hook_reaches_listener() {
        let runtime = runtime(RegistrationConfig::default());
        let failures = Arc::new(Mutex::new(Vec::new()));
        let sink = failures.clone();
        runtime.on_failure(move |report| sink.lock().push(report.route.clone()));

        let client = Arc::new(MockClient::default());
        runtime.listen().unwrap();
        assert!(runtime.dispatch(slash("fail"), client));
        runtime.shutdown().await;

        assert_eq!(*failures.lock(), ["fail"]);
    }

    #[tokio::test]
    async fn test_run_until() {
        let runtime = runtime(RegistrationConfig::default());
        let client = Arc::new(MockClient::default());

        runtime.run_until(client.clone(), async {}).await.unwrap();

        assert_eq!(client.registrations.lock().len(), 1);
        assert!(!runtime.is_running());
    }
}
