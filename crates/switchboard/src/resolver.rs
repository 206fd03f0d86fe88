//! Session-side entity lookup used when an interaction does not carry resolved entity data.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use switchboard_contract::{Channel, GuildId, Role, User};

/// Session capability for resolving platform entities by id.
///
/// Every method defaults to "not found", so a session type only overrides what its cache holds.
pub trait EntityResolver {
    /// Looks up a user.
    fn user(&self, _id: &str) -> Option<User> {
        None
    }

    /// Looks up a channel.
    fn channel(&self, _id: &str) -> Option<Channel> {
        None
    }

    /// Looks up a role within a guild.
    fn role(&self, _guild_id: Option<&GuildId>, _id: &str) -> Option<Role> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Resolver that never finds anything; interactions must carry their own resolved data.
pub struct NoopEntityResolver;

impl EntityResolver for NoopEntityResolver {}

#[derive(Debug, Default)]
struct EntityCacheState {
    users: HashMap<String, User>,
    channels: HashMap<String, Channel>,
    roles: HashMap<(Option<GuildId>, String), Role>,
}

#[derive(Debug, Clone, Default)]
/// In-memory entity cache shared between clones, mirroring a gateway session's state cache.
pub struct MemoryEntityCache {
    inner: Arc<RwLock<EntityCacheState>>,
}

impl MemoryEntityCache {
    /// Caches a user.
    pub fn insert_user(&self, user: User) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .users
            .insert(user.id.clone(), user);
    }

    /// Caches a channel.
    pub fn insert_channel(&self, channel: Channel) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .channels
            .insert(channel.id.clone(), channel);
    }

    /// Caches a role for `guild_id`.
    pub fn insert_role(&self, guild_id: Option<GuildId>, role: Role) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .roles
            .insert((guild_id, role.id.clone()), role);
    }
}

impl EntityResolver for MemoryEntityCache {
    fn user(&self, id: &str) -> Option<User> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .users
            .get(id)
            .cloned()
    }

    fn channel(&self, id: &str) -> Option<Channel> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .channels
            .get(id)
            .cloned()
    }

    fn role(&self, guild_id: Option<&GuildId>, id: &str) -> Option<Role> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .roles
            .get(&(guild_id.cloned(), id.to_string()))
            .cloned()
    }
}
