//! Shared command-schema and interaction contracts used by the switchboard engine and by remote
//! platform clients.
//!
//! This crate is intentionally transport-agnostic. It defines serializable command schemas,
//! inbound interaction payloads, resolved platform entities, and remote command descriptors
//! without depending on the dispatch engine or any HTTP/gateway client.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Guild (tenant) identifier as issued by the platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildId(String);

impl GuildId {
    /// Creates a guild identifier from trusted caller input.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Remote visibility domain of a command.
///
/// Scopes order with [`CommandScope::Global`] first and guilds by id, which keeps reconciliation
/// output stable. An empty guild id anywhere a scope is built, including deserialization, yields
/// [`CommandScope::Global`].
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", from = "ScopeRepr")]
pub enum CommandScope {
    /// Command visible in every guild and in direct messages.
    #[default]
    Global,
    /// Command visible only inside one guild.
    Guild {
        /// Owning guild identifier.
        guild_id: GuildId,
    },
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum ScopeRepr {
    Global,
    Guild { guild_id: GuildId },
}

impl From<ScopeRepr> for CommandScope {
    fn from(repr: ScopeRepr) -> Self {
        match repr {
            ScopeRepr::Global => Self::Global,
            ScopeRepr::Guild { guild_id } => Self::from_guild_id(guild_id.as_str()),
        }
    }
}

impl CommandScope {
    /// Builds a guild scope. An empty id yields [`CommandScope::Global`].
    pub fn guild(guild_id: impl Into<String>) -> Self {
        let guild_id: String = guild_id.into();
        Self::from_guild_id(&guild_id)
    }

    /// Maps a raw guild id to a scope, treating the empty string as [`CommandScope::Global`].
    pub fn from_guild_id(raw: &str) -> Self {
        if raw.is_empty() {
            Self::Global
        } else {
            Self::Guild {
                guild_id: GuildId::new(raw),
            }
        }
    }

    /// Same scope with an empty guild id folded into [`CommandScope::Global`].
    ///
    /// Needed for scopes built directly from the `Guild` variant.
    pub fn normalized(self) -> Self {
        match self {
            Self::Guild { guild_id } if guild_id.as_str().is_empty() => Self::Global,
            scope => scope,
        }
    }

    /// Whether this is the global scope.
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }

    /// Returns the guild id for guild scopes.
    pub fn guild_id(&self) -> Option<&GuildId> {
        match self {
            Self::Global => None,
            Self::Guild { guild_id } => Some(guild_id),
        }
    }
}

impl fmt::Display for CommandScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Guild { guild_id } => write!(f, "guild:{}", guild_id.as_str()),
        }
    }
}

/// Kind of one command option, as surfaced in the platform's command picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionKind {
    /// Free text.
    String,
    /// Whole number.
    Integer,
    /// True or false.
    Boolean,
    /// Double-precision number.
    Number,
    /// Platform user.
    User,
    /// Guild channel.
    Channel,
    /// Guild role.
    Role,
    /// Uploaded file.
    Attachment,
}

impl OptionKind {
    /// Platform wire code for this kind.
    pub fn code(self) -> u8 {
        match self {
            Self::String => 3,
            Self::Integer => 4,
            Self::Boolean => 5,
            Self::User => 6,
            Self::Channel => 7,
            Self::Role => 8,
            Self::Number => 10,
            Self::Attachment => 11,
        }
    }

    /// Parses a platform wire code. Sub-command and mentionable codes are not supported.
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            3 => Self::String,
            4 => Self::Integer,
            5 => Self::Boolean,
            6 => Self::User,
            7 => Self::Channel,
            8 => Self::Role,
            10 => Self::Number,
            11 => Self::Attachment,
            _ => return None,
        })
    }

    /// Whether values of this kind are platform entities resolved by id.
    pub fn is_entity(self) -> bool {
        matches!(
            self,
            Self::User | Self::Channel | Self::Role | Self::Attachment
        )
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::User => "user",
            Self::Channel => "channel",
            Self::Role => "role",
            Self::Attachment => "attachment",
        };
        f.write_str(label)
    }
}

/// One declared, typed argument of a slash command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOptionSchema {
    /// Lowercase option name.
    pub name: String,
    /// Option kind.
    pub kind: OptionKind,
    /// Picker description.
    pub description: String,
    /// Whether the platform requires the user to supply this option.
    pub required: bool,
    /// Inclusive lower bound, present only for unsigned integer fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
}

/// Kind of application command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandType {
    /// Slash command typed into the chat input.
    ChatInput,
    /// Context-menu action on a message.
    Message,
}

impl CommandType {
    /// Platform wire code for this command type.
    pub fn code(self) -> u8 {
        match self {
            Self::ChatInput => 1,
            Self::Message => 3,
        }
    }
}

/// Full declarative description of a command as sent to the remote platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSchema {
    /// Command name.
    pub name: String,
    /// Command description. Empty for message commands.
    pub description: String,
    /// Visibility scope.
    pub scope: CommandScope,
    /// Command type.
    pub kind: CommandType,
    /// Ordered option list. Empty for message commands.
    #[serde(default)]
    pub options: Vec<CommandOptionSchema>,
}

/// Kind of inbound interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionKind {
    /// Platform health check.
    Ping,
    /// User invoked an application command.
    ApplicationCommand,
    /// User clicked a message component.
    MessageComponent,
    /// Platform requested autocomplete choices.
    Autocomplete,
    /// User submitted a modal.
    ModalSubmit,
}

/// Platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id.
    pub id: String,
    /// Unique username.
    pub username: String,
    /// Optional display name.
    #[serde(default)]
    pub global_name: Option<String>,
    /// Whether the user is a bot account.
    #[serde(default)]
    pub bot: bool,
}

/// Guild channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel id.
    pub id: String,
    /// Channel name, when known.
    #[serde(default)]
    pub name: Option<String>,
    /// Owning guild, when known.
    #[serde(default)]
    pub guild_id: Option<GuildId>,
}

/// Guild role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role id.
    pub id: String,
    /// Role name.
    pub name: String,
    /// RGB color.
    #[serde(default)]
    pub color: u32,
    /// Sort position.
    #[serde(default)]
    pub position: i32,
}

/// Uploaded file attached to an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment id.
    pub id: String,
    /// Original file name.
    pub filename: String,
    /// Download URL.
    pub url: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// MIME type, when reported.
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message id.
    pub id: String,
    /// Channel the message was posted in.
    pub channel_id: String,
    /// Text content.
    #[serde(default)]
    pub content: String,
    /// Message author, when known.
    #[serde(default)]
    pub author: Option<User>,
    /// Files attached to the message.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Entities the platform resolved and attached to an interaction, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedData {
    /// Resolved users.
    #[serde(default)]
    pub users: BTreeMap<String, User>,
    /// Resolved channels.
    #[serde(default)]
    pub channels: BTreeMap<String, Channel>,
    /// Resolved roles.
    #[serde(default)]
    pub roles: BTreeMap<String, Role>,
    /// Resolved messages.
    #[serde(default)]
    pub messages: BTreeMap<String, Message>,
    /// Resolved attachments.
    #[serde(default)]
    pub attachments: BTreeMap<String, Attachment>,
}

/// One option value received with an interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionOption {
    /// Option name.
    pub name: String,
    /// Option kind reported by the platform.
    pub kind: OptionKind,
    /// Raw value. Entity kinds carry the entity id as a string.
    pub value: Value,
}

/// Command payload of an application-command interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandData {
    /// Invoked command name.
    pub name: String,
    /// Invoked command type.
    pub kind: CommandType,
    /// Supplied option values in the order the platform sent them.
    #[serde(default)]
    pub options: Vec<InteractionOption>,
    /// Entities referenced by the options or the target.
    #[serde(default)]
    pub resolved: ResolvedData,
    /// Target entity id for context-menu commands.
    #[serde(default)]
    pub target_id: Option<String>,
}

/// Inbound interaction event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Interaction id.
    pub id: String,
    /// Interaction kind.
    pub kind: InteractionKind,
    /// Guild the interaction happened in. Absent or empty for direct messages.
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    /// Command payload for application-command interactions.
    #[serde(default)]
    pub data: Option<CommandData>,
}

impl Interaction {
    /// Scope the interaction was issued from.
    pub fn scope(&self) -> CommandScope {
        self.guild_id
            .as_ref()
            .map(|guild_id| CommandScope::from_guild_id(guild_id.as_str()))
            .unwrap_or_default()
    }
}

/// Platform-assigned command identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteCommandId(String);

impl RemoteCommandId {
    /// Creates a remote identifier from platform output.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One command as currently stored by the remote platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCommand {
    /// Platform-assigned identifier.
    pub id: RemoteCommandId,
    /// Stored schema.
    pub schema: CommandSchema,
}

/// Read-only view of the remote commands for one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCommandSnapshot {
    /// Snapshot scope.
    pub scope: CommandScope,
    /// Remote commands in that scope.
    pub commands: Vec<RemoteCommand>,
}

impl RemoteCommandSnapshot {
    /// Returns the set of command names present in this scope.
    pub fn names(&self) -> BTreeSet<&str> {
        self.commands
            .iter()
            .map(|command| command.schema.name.as_str())
            .collect()
    }
}
