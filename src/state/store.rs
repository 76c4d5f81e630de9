//! The connection-scoped state arena.

use std::collections::{BTreeMap, HashMap};

use crate::casemap::CaseMapping;
use crate::error::StateError;

use super::channel::ChannelInfo;
use super::client::ClientInfo;

/// The result of a successful [`StateStore::rename_client`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameOutcome {
    /// The display nickname before the change.
    pub old_nick: String,
    /// Display names of every channel holding a membership for the client,
    /// in store (folded-key) order.
    pub channels: Vec<String>,
    /// Whether old and new nickname fold to the same key.
    pub case_only: bool,
}

/// Canonical collections of known clients and channels, keyed by case-folded
/// identifier under the currently negotiated [`CaseMapping`].
///
/// `BTreeMap`s keep iteration deterministic, so replaying the same line
/// sequence produces the same event sequence.
#[derive(Clone, Debug, Default)]
pub struct StateStore {
    casemapping: CaseMapping,
    clients: BTreeMap<String, ClientInfo>,
    channels: BTreeMap<String, ChannelInfo>,
    local_nick: String,
}

impl StateStore {
    /// Create a store using the given folding rule, tracking `local_nick` as
    /// the connection's own user.
    pub fn new(casemapping: CaseMapping, local_nick: impl Into<String>) -> Self {
        Self {
            casemapping,
            clients: BTreeMap::new(),
            channels: BTreeMap::new(),
            local_nick: local_nick.into(),
        }
    }

    /// The folding rule currently in force.
    pub fn casemapping(&self) -> CaseMapping {
        self.casemapping
    }

    /// Fold an identifier under the current rule.
    pub fn fold(&self, name: &str) -> String {
        self.casemapping.to_lower(name)
    }

    /// The connection's own current nickname.
    pub fn local_nick(&self) -> &str {
        &self.local_nick
    }

    pub(crate) fn set_local_nick(&mut self, nick: impl Into<String>) {
        self.local_nick = nick.into();
    }

    /// Whether `name` folds to the local user's key.
    pub fn is_local(&self, name: &str) -> bool {
        self.casemapping.eq(name, &self.local_nick)
    }

    /// Swap the folding rule and re-derive every key in the store. This is
    /// the only rekey point; cached keys elsewhere are the caller's problem.
    ///
    /// A rule that folds more aggressively can land two previously distinct
    /// entries on one key. The later entry wins; the display names of the
    /// entries lost to such merges are returned so the caller can surface
    /// them.
    pub fn set_casemapping(&mut self, rule: CaseMapping) -> Vec<String> {
        if rule == self.casemapping {
            return Vec::new();
        }
        self.casemapping = rule;

        let mut merged = Vec::new();
        let mut key_map: HashMap<String, String> = HashMap::new();
        let old_clients = std::mem::take(&mut self.clients);
        for (old_key, client) in old_clients {
            let new_key = rule.to_lower(client.nickname());
            key_map.insert(old_key, new_key.clone());
            if let Some(lost) = self.clients.insert(new_key, client) {
                merged.push(lost.nickname().to_owned());
            }
        }

        let old_channels = std::mem::take(&mut self.channels);
        for (_, mut channel) in old_channels {
            channel.rekey_clients(&key_map);
            let new_key = rule.to_lower(channel.name());
            if let Some(lost) = self.channels.insert(new_key, channel) {
                merged.push(lost.name().to_owned());
            }
        }

        merged
    }

    // --- clients -----------------------------------------------------------

    /// Insert a client under the fold of its nickname.
    pub fn add_client(&mut self, client: ClientInfo) {
        let key = self.fold(client.nickname());
        self.clients.insert(key, client);
    }

    /// Remove a client by nickname. No-op when absent.
    pub fn remove_client(&mut self, nickname: &str) {
        let key = self.fold(nickname);
        self.clients.remove(&key);
    }

    /// Look up a client by nickname, case-insensitively.
    pub fn find_client(&self, nickname: &str) -> Option<&ClientInfo> {
        self.clients.get(&self.fold(nickname))
    }

    pub(crate) fn find_client_mut(&mut self, nickname: &str) -> Option<&mut ClientInfo> {
        let key = self.fold(nickname);
        self.clients.get_mut(&key)
    }

    /// Iterate known clients in key order.
    pub fn clients(&self) -> impl Iterator<Item = &ClientInfo> {
        self.clients.values()
    }

    /// Re-key the client from `old` to `new` in the global table and in every
    /// channel membership table, as one logical operation.
    ///
    /// When old and new fold identically this is a display-name update and
    /// always succeeds. Otherwise the destination key must be free: a rename
    /// onto a distinct client fails with [`StateError::RenameCollision`] and
    /// applies no part of the change.
    pub fn rename_client(&mut self, old: &str, new: &str) -> Result<RenameOutcome, StateError> {
        let old_key = self.fold(old);
        let new_key = self.fold(new);
        let case_only = old_key == new_key;

        if !case_only && self.clients.contains_key(&new_key) {
            return Err(StateError::RenameCollision {
                old: old.to_owned(),
                new: new.to_owned(),
            });
        }

        let mut client = match self.clients.remove(&old_key) {
            Some(c) => c,
            None => return Err(StateError::UnknownClient(old.to_owned())),
        };
        let old_nick = client.nickname().to_owned();
        client.set_nickname(new);
        self.clients.insert(new_key.clone(), client);

        let mut channels = Vec::new();
        for channel in self.channels.values_mut() {
            let present = if case_only {
                channel.client(&old_key).is_some()
            } else {
                channel.rename_client(&old_key, &new_key)
            };
            if present {
                channels.push(channel.name().to_owned());
            }
        }

        if self.casemapping.eq(&old_nick, &self.local_nick) {
            self.local_nick = new.to_owned();
        }

        Ok(RenameOutcome {
            old_nick,
            channels,
            case_only,
        })
    }

    /// Drop a client that is provably stale: not the local user and a member
    /// of no known channel. Returns whether it was removed.
    pub(crate) fn collect_if_stale(&mut self, nickname: &str) -> bool {
        let key = self.fold(nickname);
        if !self.clients.contains_key(&key) || self.is_local(nickname) {
            return false;
        }
        if self.channels.values().any(|c| c.client(&key).is_some()) {
            return false;
        }
        self.clients.remove(&key);
        true
    }

    // --- channels ----------------------------------------------------------

    /// Insert a channel under the fold of its name.
    pub fn add_channel(&mut self, channel: ChannelInfo) {
        let key = self.fold(channel.name());
        self.channels.insert(key, channel);
    }

    /// Remove a channel by name. No-op when absent.
    pub fn remove_channel(&mut self, name: &str) {
        let key = self.fold(name);
        self.channels.remove(&key);
    }

    /// Look up a channel by name, case-insensitively.
    pub fn find_channel(&self, name: &str) -> Option<&ChannelInfo> {
        self.channels.get(&self.fold(name))
    }

    pub(crate) fn find_channel_mut(&mut self, name: &str) -> Option<&mut ChannelInfo> {
        let key = self.fold(name);
        self.channels.get_mut(&key)
    }

    /// Iterate known channels in key order.
    pub fn channels(&self) -> impl Iterator<Item = &ChannelInfo> {
        self.channels.values()
    }

    pub(crate) fn channels_mut(&mut self) -> impl Iterator<Item = &mut ChannelInfo> {
        self.channels.values_mut()
    }

    /// Look up one membership: the given client within the given channel.
    pub fn find_channel_client(
        &self,
        channel: &str,
        nickname: &str,
    ) -> Option<&super::ChannelClientInfo> {
        let key = self.fold(nickname);
        self.find_channel(channel)?.client(&key)
    }
}
