//! Command registry keyed by scope and name.

use std::collections::{BTreeMap, BTreeSet};

use switchboard_contract::{CommandScope, CommandType};
use tracing::debug;

use crate::{command::Command, error::SwitchboardError};

/// Registry key. Ordering is scope first, then name, so iteration is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CommandKey {
    scope: CommandScope,
    name: String,
}

impl CommandKey {
    fn new(name: &str, scope: &CommandScope) -> Self {
        Self {
            scope: scope.clone(),
            name: name.to_string(),
        }
    }
}

/// Registered commands, unique per `(name, scope)`.
pub struct CommandRegistry<S> {
    commands: BTreeMap<CommandKey, Command<S>>,
}

impl<S> Default for CommandRegistry<S> {
    fn default() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }
}

impl<S> Clone for CommandRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
        }
    }
}

impl<S> std::fmt::Debug for CommandRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.commands.values()).finish()
    }
}

impl<S> CommandRegistry<S> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchboardError::DuplicateCommand`] when the `(name, scope)` pair is taken.
    pub fn add(&mut self, command: Command<S>) -> Result<(), SwitchboardError> {
        let key = CommandKey::new(command.name(), command.scope());
        if self.commands.contains_key(&key) {
            return Err(SwitchboardError::DuplicateCommand {
                name: key.name,
                scope: key.scope,
            });
        }
        debug!(
            command = %key.name,
            scope = %key.scope,
            kind = ?command.command_type(),
            options = command.options().len(),
            "registered command"
        );
        self.commands.insert(key, command);
        Ok(())
    }

    /// Finds the command serving `name` for an interaction in `scope`.
    ///
    /// The exact scope wins; otherwise a global command of the same name answers from any scope.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchboardError::UnknownCommand`] when neither lookup matches.
    pub fn find(&self, name: &str, scope: &CommandScope) -> Result<&Command<S>, SwitchboardError> {
        self.commands
            .get(&CommandKey::new(name, scope))
            .or_else(|| {
                self.commands
                    .get(&CommandKey::new(name, &CommandScope::Global))
            })
            .ok_or_else(|| SwitchboardError::UnknownCommand {
                name: name.to_string(),
                scope: scope.clone(),
            })
    }

    /// Like [`CommandRegistry::find`], but only commands of `kind` match. An exact-scope command
    /// of another type does not shadow a global command of the requested type.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchboardError::UnknownCommand`] when no command of `kind` answers.
    pub fn find_kind(
        &self,
        name: &str,
        scope: &CommandScope,
        kind: CommandType,
    ) -> Result<&Command<S>, SwitchboardError> {
        [scope, &CommandScope::Global]
            .into_iter()
            .filter_map(|candidate| self.get(name, candidate))
            .find(|command| command.command_type() == kind)
            .ok_or_else(|| SwitchboardError::UnknownCommand {
                name: name.to_string(),
                scope: scope.clone(),
            })
    }

    /// Command registered under exactly `(name, scope)`, without the global fallback.
    pub fn get(&self, name: &str, scope: &CommandScope) -> Option<&Command<S>> {
        self.commands.get(&CommandKey::new(name, scope))
    }

    /// Whether a command is registered under exactly `(name, scope)`.
    pub fn exists(&self, name: &str, scope: &CommandScope) -> bool {
        self.get(name, scope).is_some()
    }

    /// Commands ordered by scope, then name.
    pub fn iter(&self) -> impl Iterator<Item = &Command<S>> {
        self.commands.values()
    }

    /// Commands registered in exactly `scope`, ordered by name.
    pub fn in_scope<'a>(&'a self, scope: &'a CommandScope) -> impl Iterator<Item = &'a Command<S>> {
        self.commands
            .iter()
            .filter(move |(key, _)| &key.scope == scope)
            .map(|(_, command)| command)
    }

    /// Distinct scopes holding at least one command.
    pub fn scopes(&self) -> BTreeSet<CommandScope> {
        self.commands.keys().map(|key| key.scope.clone()).collect()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
