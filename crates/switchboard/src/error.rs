//! Error taxonomy shared by registration, dispatch, and reconciliation.

use switchboard_contract::{CommandScope, InteractionKind, OptionKind};
use thiserror::Error;

/// Failure reported by a [`crate::RemoteCommandClient`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    /// Human-readable message.
    pub message: String,
}

impl RemoteError {
    /// Creates a remote error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Coarse classification of a [`SwitchboardError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Structural problem detected while registering a command.
    Derivation,
    /// A received or default value could not be converted for one dispatch.
    Marshalling,
    /// The interaction could not be routed to a command.
    Routing,
    /// The command handler itself reported a failure.
    Handler,
    /// A remote call failed while synchronizing commands.
    Reconciliation,
    /// Configuration could not be loaded.
    Configuration,
}

/// Errors produced by the switchboard engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SwitchboardError {
    /// An argument field uses a type with no option-kind mapping.
    #[error("argument `{field}` has unsupported type `{type_name}`")]
    UnsupportedArgumentType {
        /// Offending field.
        field: String,
        /// Declared type name.
        type_name: String,
    },
    /// An argument field has no description but the platform requires one.
    #[error("argument `{field}` has no description")]
    MissingDescription {
        /// Offending field.
        field: String,
    },
    /// Two argument fields map to the same option name.
    #[error("option `{name}` is declared more than once")]
    DuplicateOption {
        /// Lowercased option name.
        name: String,
    },
    /// A command or option name is not accepted by the platform.
    #[error("invalid name `{name}`: {reason}")]
    InvalidName {
        /// Offending name.
        name: String,
        /// Why the name was rejected.
        reason: &'static str,
    },
    /// An argument shape reads its values under names or types its fields do not declare.
    #[error("arguments of command `{command}` disagree with their fields at `{field}`: {reason}")]
    ShapeMismatch {
        /// Command name.
        command: String,
        /// Field name as read or declared.
        field: String,
        /// What disagrees.
        reason: String,
    },
    /// An absent field has a default but its kind has no default-parsing rule.
    #[error("argument `{field}` of kind {kind} cannot have a default value")]
    UnsupportedDefaultType {
        /// Offending field.
        field: String,
        /// Field kind.
        kind: OptionKind,
    },
    /// A default literal could not be parsed for its kind.
    #[error("default `{literal}` for argument `{field}` is invalid: {reason}")]
    InvalidDefault {
        /// Offending field.
        field: String,
        /// Declared literal.
        literal: String,
        /// Parser message.
        reason: String,
    },
    /// A required field was neither supplied nor given a default.
    #[error("required option `{field}` was not supplied")]
    MissingOption {
        /// Missing field.
        field: String,
    },
    /// The platform sent a different kind than the field declares.
    #[error("option `{field}` expected kind {expected}, received {received}")]
    OptionKindMismatch {
        /// Offending field.
        field: String,
        /// Declared kind.
        expected: OptionKind,
        /// Received kind.
        received: OptionKind,
    },
    /// The raw option value does not have the shape its kind requires.
    #[error("option `{field}` carries a malformed {kind} value")]
    InvalidOptionValue {
        /// Offending field.
        field: String,
        /// Received kind.
        kind: OptionKind,
    },
    /// An entity id could not be resolved from the interaction or the session.
    #[error("option `{field}` references unknown {kind} `{id}`")]
    UnresolvedEntity {
        /// Offending field.
        field: String,
        /// Entity kind.
        kind: OptionKind,
        /// Entity id.
        id: String,
    },
    /// A marshalled value does not fit the Rust type requested by the argument shape.
    #[error("argument `{field}` does not fit type `{expected}`")]
    ArgumentMismatch {
        /// Offending field.
        field: String,
        /// Requested type.
        expected: String,
    },
    /// A message command was invoked without a resolvable target message.
    #[error("message command `{command}` has no target message")]
    MissingTarget {
        /// Command name.
        command: String,
    },
    /// A command with the same name is already registered in the scope.
    #[error("command `{name}` already exists in {scope}")]
    DuplicateCommand {
        /// Command name.
        name: String,
        /// Registration scope.
        scope: CommandScope,
    },
    /// No registered command matches the interaction.
    #[error("unknown command `{name}` in {scope}")]
    UnknownCommand {
        /// Requested name.
        name: String,
        /// Interaction scope.
        scope: CommandScope,
    },
    /// The interaction kind is not handled by the dispatcher.
    #[error("unsupported interaction kind {kind:?}")]
    UnsupportedInteractionKind {
        /// Received kind.
        kind: InteractionKind,
    },
    /// An application-command interaction arrived without command data.
    #[error("interaction `{interaction_id}` carries no command data")]
    MissingCommandData {
        /// Interaction id.
        interaction_id: String,
    },
    /// The handler returned an error.
    #[error("command `{command}` failed: {message}")]
    Handler {
        /// Command name.
        command: String,
        /// Handler message.
        message: String,
    },
    /// A remote call failed during reconciliation.
    #[error(
        "remote call failed in {scope} for {}: {source}",
        .command.as_deref().unwrap_or("the whole scope")
    )]
    Reconcile {
        /// Scope being reconciled.
        scope: CommandScope,
        /// Command being created or deleted. `None` for listing and bulk calls.
        command: Option<String>,
        /// Underlying remote failure.
        #[source]
        source: RemoteError,
    },
    /// Configuration could not be parsed.
    #[error("invalid switchboard config: {message}")]
    Config {
        /// Parser message.
        message: String,
    },
}

impl SwitchboardError {
    /// Classifies the error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedArgumentType { .. }
            | Self::MissingDescription { .. }
            | Self::DuplicateOption { .. }
            | Self::InvalidName { .. }
            | Self::ShapeMismatch { .. } => ErrorClass::Derivation,
            Self::UnsupportedDefaultType { .. }
            | Self::InvalidDefault { .. }
            | Self::MissingOption { .. }
            | Self::OptionKindMismatch { .. }
            | Self::InvalidOptionValue { .. }
            | Self::UnresolvedEntity { .. }
            | Self::ArgumentMismatch { .. }
            | Self::MissingTarget { .. } => ErrorClass::Marshalling,
            Self::DuplicateCommand { .. }
            | Self::UnknownCommand { .. }
            | Self::UnsupportedInteractionKind { .. }
            | Self::MissingCommandData { .. } => ErrorClass::Routing,
            Self::Handler { .. } => ErrorClass::Handler,
            Self::Reconcile { .. } => ErrorClass::Reconciliation,
            Self::Config { .. } => ErrorClass::Configuration,
        }
    }
}
