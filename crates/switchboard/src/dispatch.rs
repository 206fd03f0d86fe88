//! Registration-time builder and the immutable dispatcher it produces.

use std::{fmt, sync::Arc};

use futures::{pin_mut, Stream, StreamExt};
use switchboard_contract::{CommandSchema, CommandScope, Interaction, InteractionKind, Message};
use tracing::{debug, warn};

use crate::{
    args::CommandArgs,
    command::{Command, CommandHandler, HandlerResult},
    config::SwitchboardConfig,
    error::SwitchboardError,
    marshal::{marshal, resolve_message},
    reconcile::{reconcile, ReconcileReport},
    registry::CommandRegistry,
    remote::RemoteCommandClient,
    resolver::EntityResolver,
};

/// Collects commands before the dispatcher is attached to an event source.
///
/// Slash handlers take exactly three parameters: the session, the interaction, and a
/// [`CommandArgs`] shape. The handler shape is checked by the compiler, so a handler missing its
/// argument parameter is rejected before anything can be dispatched:
///
/// ```compile_fail
/// use switchboard::{
///     CommandScope, HandlerResult, Interaction, NoopEntityResolver, SwitchboardBuilder,
/// };
///
/// fn two_params(_: &NoopEntityResolver, _: &Interaction) -> HandlerResult {
///     Ok(())
/// }
///
/// let mut builder = SwitchboardBuilder::<NoopEntityResolver>::new();
/// builder.add_slash("ping", "Ping", CommandScope::Global, two_params);
/// ```
///
/// A well-formed registration:
///
/// ```
/// use switchboard::{CommandScope, Interaction, NoopEntityResolver, SwitchboardBuilder};
///
/// # fn main() -> Result<(), switchboard::SwitchboardError> {
/// let mut builder = SwitchboardBuilder::<NoopEntityResolver>::new();
/// builder.add_slash(
///     "ping",
///     "Replies with pong",
///     CommandScope::Global,
///     |_: &NoopEntityResolver, _: &Interaction, _: ()| Ok(()),
/// )?;
/// let switchboard = builder.build();
/// assert_eq!(switchboard.registry().len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct SwitchboardBuilder<S> {
    registry: CommandRegistry<S>,
    config: SwitchboardConfig,
}

impl<S> Default for SwitchboardBuilder<S> {
    fn default() -> Self {
        Self::with_config(SwitchboardConfig::default())
    }
}

impl<S> SwitchboardBuilder<S> {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder using `config`.
    pub fn with_config(config: SwitchboardConfig) -> Self {
        Self {
            registry: CommandRegistry::new(),
            config,
        }
    }
}

impl<S: 'static> SwitchboardBuilder<S> {
    /// Registers a slash command whose options are derived from `A`.
    ///
    /// # Errors
    ///
    /// Returns a derivation error for an invalid argument shape or name, and
    /// [`SwitchboardError::DuplicateCommand`] when the name is taken in `scope`.
    pub fn add_slash<A, F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        scope: CommandScope,
        handler: F,
    ) -> Result<&mut Self, SwitchboardError>
    where
        A: CommandArgs + 'static,
        F: Fn(&S, &Interaction, A) -> HandlerResult + Send + Sync + 'static,
    {
        let command = Command::slash(
            name.into(),
            description.into(),
            scope,
            handler,
            self.config.require_descriptions,
        )?;
        self.add_command(command)
    }

    /// Registers a message context-menu command.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchboardError::InvalidName`] or [`SwitchboardError::DuplicateCommand`].
    pub fn add_message<F>(
        &mut self,
        name: impl Into<String>,
        scope: CommandScope,
        handler: F,
    ) -> Result<&mut Self, SwitchboardError>
    where
        F: Fn(&S, &Interaction, Message) -> HandlerResult + Send + Sync + 'static,
    {
        let command = Command::message(name.into(), scope, handler)?;
        self.add_command(command)
    }

    fn add_command(&mut self, command: Command<S>) -> Result<&mut Self, SwitchboardError> {
        self.registry.add(command)?;
        Ok(self)
    }

    /// Freezes the registry. No command can be added afterwards.
    pub fn build(self) -> Switchboard<S> {
        debug!(commands = self.registry.len(), "switchboard built");
        Switchboard {
            inner: Arc::new(SwitchboardInner {
                registry: self.registry,
                config: self.config,
            }),
        }
    }
}

struct SwitchboardInner<S> {
    registry: CommandRegistry<S>,
    config: SwitchboardConfig,
}

/// Immutable dispatcher over a frozen registry. Clones share the same registry.
pub struct Switchboard<S> {
    inner: Arc<SwitchboardInner<S>>,
}

impl<S> Clone for Switchboard<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for Switchboard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Switchboard")
            .field("registry", &self.inner.registry)
            .field("config", &self.inner.config)
            .finish()
    }
}

/// Outcome counts of [`Switchboard::serve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    /// Interactions dispatched successfully.
    pub handled: usize,
    /// Interactions whose dispatch failed.
    pub failed: usize,
}

impl<S> Switchboard<S> {
    /// Registered commands.
    pub fn registry(&self) -> &CommandRegistry<S> {
        &self.inner.registry
    }

    /// Active configuration.
    pub fn config(&self) -> &SwitchboardConfig {
        &self.inner.config
    }

    /// Schemas of every registered command, ordered by scope, then name.
    pub fn schemas(&self) -> Vec<CommandSchema> {
        self.inner.registry.iter().map(Command::to_schema).collect()
    }

    /// Pushes the registry to the remote platform using the configured strategy.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchboardError::Reconcile`] for the first failed remote call.
    pub async fn reconcile<C>(&self, client: &C) -> Result<ReconcileReport, SwitchboardError>
    where
        C: RemoteCommandClient + ?Sized,
    {
        reconcile(&self.inner.registry, client, self.inner.config.strategy).await
    }
}

impl<S: EntityResolver> Switchboard<S> {
    /// Routes one interaction to its command and invokes the handler.
    ///
    /// # Errors
    ///
    /// Returns a routing error when the interaction cannot be matched to a command, a
    /// marshalling error when its options cannot be converted, or
    /// [`SwitchboardError::Handler`] when the handler fails. The handler is not invoked
    /// unless routing and marshalling succeed.
    pub fn dispatch(&self, session: &S, interaction: &Interaction) -> Result<(), SwitchboardError> {
        if interaction.kind != InteractionKind::ApplicationCommand {
            return Err(SwitchboardError::UnsupportedInteractionKind {
                kind: interaction.kind,
            });
        }
        let data = interaction
            .data
            .as_ref()
            .ok_or_else(|| SwitchboardError::MissingCommandData {
                interaction_id: interaction.id.clone(),
            })?;

        let scope = interaction.scope();
        let command = self
            .inner
            .registry
            .find_kind(&data.name, &scope, data.kind)?;
        debug!(
            interaction = %interaction.id,
            command = %command.name(),
            scope = %command.scope(),
            "dispatching interaction"
        );

        match command.handler() {
            CommandHandler::Slash { fields, invoke, .. } => {
                let values = marshal(session, interaction, data, fields)?;
                invoke(session, interaction, values)
            }
            CommandHandler::Message { invoke } => {
                let message = resolve_message(data)?;
                invoke(session, interaction, message).map_err(|message| {
                    SwitchboardError::Handler {
                        command: command.name().to_string(),
                        message,
                    }
                })
            }
        }
    }

    /// Dispatches every interaction from `events` until the stream ends.
    ///
    /// A failed dispatch is logged and counted; it never stops the loop.
    pub async fn serve<St>(&self, session: &S, events: St) -> ServeSummary
    where
        St: Stream<Item = Interaction>,
    {
        pin_mut!(events);
        let mut summary = ServeSummary::default();
        while let Some(interaction) = events.next().await {
            match self.dispatch(session, &interaction) {
                Ok(()) => summary.handled += 1,
                Err(err) => {
                    warn!(
                        interaction = %interaction.id,
                        class = ?err.class(),
                        error = %err,
                        "dispatch failed"
                    );
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}
