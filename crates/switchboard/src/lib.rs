//! Typed slash and message command dispatch for a chat-platform bot.
//!
//! Commands are registered on a [`SwitchboardBuilder`], which derives each slash command's option
//! schema from its argument shape up front. [`SwitchboardBuilder::build`] freezes the registry
//! into a [`Switchboard`] that routes inbound [`Interaction`]s to handlers and reconciles the
//! registered commands with the remote platform through a [`RemoteCommandClient`].

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod args;
mod command;
mod config;
mod dispatch;
mod error;
mod mapper;
mod marshal;
mod reconcile;
mod registry;
mod remote;
mod resolver;
mod schema;

pub use args::{ArgField, ArgType, ArgValue, ArgValues, CommandArgs};
pub use command::{Command, HandlerResult};
pub use config::{ReconcileStrategy, SwitchboardConfig};
pub use dispatch::{ServeSummary, Switchboard, SwitchboardBuilder};
pub use error::{ErrorClass, RemoteError, SwitchboardError};
pub use mapper::{map_type, DeclaredType, MappedKind, UnsupportedType};
pub use marshal::{marshal, resolve_message};
pub use reconcile::{reconcile, ReconcileReport, ReconciledCommand};
pub use registry::CommandRegistry;
pub use remote::{
    MemoryRemoteCommands, NoopRemoteCommands, RemoteCall, RemoteCommandClient, RemoteFuture,
};
pub use resolver::{EntityResolver, MemoryEntityCache, NoopEntityResolver};
pub use schema::{derive_options, derive_schema};
pub use switchboard_contract::{
    Attachment, Channel, CommandData, CommandOptionSchema, CommandSchema, CommandScope,
    CommandType, GuildId, Interaction, InteractionKind, InteractionOption, Message, OptionKind,
    RemoteCommand, RemoteCommandId, RemoteCommandSnapshot, ResolvedData, Role, User,
};
