//! Remote command client contracts and adapters.

use std::{
    collections::{BTreeMap, BTreeSet},
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use switchboard_contract::{
    CommandSchema, CommandScope, GuildId, RemoteCommand, RemoteCommandId, RemoteCommandSnapshot,
};

use crate::error::RemoteError;

/// Object-safe boxed future used by [`RemoteCommandClient`].
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Platform API for reading and mutating registered application commands.
pub trait RemoteCommandClient: Send + Sync {
    /// Creates a command in `scope`, replacing any command of the same name and type.
    fn create_command<'a>(
        &'a self,
        scope: &'a CommandScope,
        schema: &'a CommandSchema,
    ) -> RemoteFuture<'a, Result<RemoteCommandId, RemoteError>>;

    /// Replaces every command in `scope` with `schemas`.
    fn bulk_overwrite<'a>(
        &'a self,
        scope: &'a CommandScope,
        schemas: &'a [CommandSchema],
    ) -> RemoteFuture<'a, Result<Vec<RemoteCommand>, RemoteError>>;

    /// Lists the commands currently stored in `scope`.
    fn list_commands<'a>(
        &'a self,
        scope: &'a CommandScope,
    ) -> RemoteFuture<'a, Result<RemoteCommandSnapshot, RemoteError>>;

    /// Deletes one command from `scope`.
    fn delete_command<'a>(
        &'a self,
        scope: &'a CommandScope,
        id: &'a RemoteCommandId,
    ) -> RemoteFuture<'a, Result<(), RemoteError>>;

    /// Lists the guilds the application can register commands in.
    fn list_accessible_scopes<'a>(&'a self) -> RemoteFuture<'a, Result<Vec<GuildId>, RemoteError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Client that stores nothing and accepts every mutation.
pub struct NoopRemoteCommands;

impl RemoteCommandClient for NoopRemoteCommands {
    fn create_command<'a>(
        &'a self,
        _scope: &'a CommandScope,
        schema: &'a CommandSchema,
    ) -> RemoteFuture<'a, Result<RemoteCommandId, RemoteError>> {
        Box::pin(async move { Ok(RemoteCommandId::new(schema.name.clone())) })
    }

    fn bulk_overwrite<'a>(
        &'a self,
        _scope: &'a CommandScope,
        _schemas: &'a [CommandSchema],
    ) -> RemoteFuture<'a, Result<Vec<RemoteCommand>, RemoteError>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn list_commands<'a>(
        &'a self,
        scope: &'a CommandScope,
    ) -> RemoteFuture<'a, Result<RemoteCommandSnapshot, RemoteError>> {
        Box::pin(async move {
            Ok(RemoteCommandSnapshot {
                scope: scope.clone(),
                commands: Vec::new(),
            })
        })
    }

    fn delete_command<'a>(
        &'a self,
        _scope: &'a CommandScope,
        _id: &'a RemoteCommandId,
    ) -> RemoteFuture<'a, Result<(), RemoteError>> {
        Box::pin(async { Ok(()) })
    }

    fn list_accessible_scopes<'a>(&'a self) -> RemoteFuture<'a, Result<Vec<GuildId>, RemoteError>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

/// One call received by [`MemoryRemoteCommands`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    /// `create_command` for the named command.
    Create {
        /// Target scope.
        scope: CommandScope,
        /// Command name.
        name: String,
    },
    /// `bulk_overwrite` with `count` schemas.
    BulkOverwrite {
        /// Target scope.
        scope: CommandScope,
        /// Batch size.
        count: usize,
    },
    /// `list_commands`.
    List {
        /// Listed scope.
        scope: CommandScope,
    },
    /// `delete_command`.
    Delete {
        /// Target scope.
        scope: CommandScope,
        /// Deleted id.
        id: RemoteCommandId,
    },
    /// `list_accessible_scopes`.
    ListScopes,
}

#[derive(Debug, Default)]
struct RemoteState {
    next_id: u64,
    guilds: BTreeSet<GuildId>,
    commands: BTreeMap<CommandScope, Vec<RemoteCommand>>,
    calls: Vec<RemoteCall>,
    failing_creates: BTreeSet<String>,
}

impl RemoteState {
    fn allocate_id(&mut self) -> RemoteCommandId {
        self.next_id = self.next_id.saturating_add(1);
        RemoteCommandId::new(self.next_id.to_string())
    }

    fn existing_id(&self, scope: &CommandScope, schema: &CommandSchema) -> Option<RemoteCommandId> {
        self.commands.get(scope).and_then(|commands| {
            commands
                .iter()
                .find(|command| same_command(&command.schema, schema))
                .map(|command| command.id.clone())
        })
    }
}

fn same_command(left: &CommandSchema, right: &CommandSchema) -> bool {
    left.name == right.name && left.kind == right.kind
}

fn stored(scope: &CommandScope, schema: &CommandSchema) -> CommandSchema {
    CommandSchema {
        scope: scope.clone(),
        ..schema.clone()
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory platform model shared between clones.
///
/// Creating a command upserts by name and type, bulk overwrite replaces the whole scope, and ids
/// are allocated monotonically. Every call is recorded for inspection.
pub struct MemoryRemoteCommands {
    inner: Arc<Mutex<RemoteState>>,
}

impl MemoryRemoteCommands {
    /// Creates a model where the application can access `guilds`.
    pub fn with_guilds<I, G>(guilds: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<String>,
    {
        let remote = Self::default();
        remote.state().guilds = guilds.into_iter().map(GuildId::new).collect();
        remote
    }

    /// Stores `schema` in `scope` without recording a call, as if registered earlier.
    pub fn seed(&self, scope: &CommandScope, schema: CommandSchema) -> RemoteCommandId {
        let mut state = self.state();
        let id = state.allocate_id();
        state
            .commands
            .entry(scope.clone())
            .or_default()
            .push(RemoteCommand {
                id: id.clone(),
                schema: stored(scope, &schema),
            });
        id
    }

    /// Makes every later `create_command` for `name` fail.
    pub fn fail_create(&self, name: impl Into<String>) {
        self.state().failing_creates.insert(name.into());
    }

    /// Current commands in `scope`.
    pub fn snapshot(&self, scope: &CommandScope) -> RemoteCommandSnapshot {
        RemoteCommandSnapshot {
            scope: scope.clone(),
            commands: self
                .state()
                .commands
                .get(scope)
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state().calls.clone()
    }

    fn state(&self) -> MutexGuard<'_, RemoteState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RemoteCommandClient for MemoryRemoteCommands {
    fn create_command<'a>(
        &'a self,
        scope: &'a CommandScope,
        schema: &'a CommandSchema,
    ) -> RemoteFuture<'a, Result<RemoteCommandId, RemoteError>> {
        Box::pin(async move {
            let mut state = self.state();
            state.calls.push(RemoteCall::Create {
                scope: scope.clone(),
                name: schema.name.clone(),
            });
            if state.failing_creates.contains(&schema.name) {
                return Err(RemoteError::new(format!(
                    "create `{}` rejected",
                    schema.name
                )));
            }

            let id = match state.existing_id(scope, schema) {
                Some(id) => id,
                None => state.allocate_id(),
            };
            let commands = state.commands.entry(scope.clone()).or_default();
            commands.retain(|command| !same_command(&command.schema, schema));
            commands.push(RemoteCommand {
                id: id.clone(),
                schema: stored(scope, schema),
            });
            Ok(id)
        })
    }

    fn bulk_overwrite<'a>(
        &'a self,
        scope: &'a CommandScope,
        schemas: &'a [CommandSchema],
    ) -> RemoteFuture<'a, Result<Vec<RemoteCommand>, RemoteError>> {
        Box::pin(async move {
            let mut state = self.state();
            state.calls.push(RemoteCall::BulkOverwrite {
                scope: scope.clone(),
                count: schemas.len(),
            });

            let mut replacement = Vec::with_capacity(schemas.len());
            for schema in schemas {
                let id = match state.existing_id(scope, schema) {
                    Some(id) => id,
                    None => state.allocate_id(),
                };
                replacement.push(RemoteCommand {
                    id,
                    schema: stored(scope, schema),
                });
            }
            state.commands.insert(scope.clone(), replacement.clone());
            Ok(replacement)
        })
    }

    fn list_commands<'a>(
        &'a self,
        scope: &'a CommandScope,
    ) -> RemoteFuture<'a, Result<RemoteCommandSnapshot, RemoteError>> {
        Box::pin(async move {
            self.state().calls.push(RemoteCall::List {
                scope: scope.clone(),
            });
            Ok(self.snapshot(scope))
        })
    }

    fn delete_command<'a>(
        &'a self,
        scope: &'a CommandScope,
        id: &'a RemoteCommandId,
    ) -> RemoteFuture<'a, Result<(), RemoteError>> {
        Box::pin(async move {
            let mut state = self.state();
            state.calls.push(RemoteCall::Delete {
                scope: scope.clone(),
                id: id.clone(),
            });
            let commands = state.commands.entry(scope.clone()).or_default();
            let before = commands.len();
            commands.retain(|command| &command.id != id);
            if commands.len() == before {
                return Err(RemoteError::new(format!(
                    "unknown command id `{}` in {scope}",
                    id.as_str()
                )));
            }
            Ok(())
        })
    }

    fn list_accessible_scopes<'a>(&'a self) -> RemoteFuture<'a, Result<Vec<GuildId>, RemoteError>> {
        Box::pin(async move {
            let mut state = self.state();
            state.calls.push(RemoteCall::ListScopes);
            Ok(state.guilds.iter().cloned().collect())
        })
    }
}
