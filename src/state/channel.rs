//! Per-channel state and memberships.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::mode::ChannelMode;

/// One user's membership of one channel: the link between a
/// [`ClientInfo`](super::ClientInfo) and a [`ChannelInfo`], carrying the
/// per-channel prefix modes (operator, voice, ...).
///
/// Owned by its channel; references the client by folded-nickname key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelClientInfo {
    client_key: String,
    modes: BTreeSet<ChannelMode>,
}

impl ChannelClientInfo {
    /// Create a membership for the client stored under `client_key`.
    pub fn new(client_key: impl Into<String>) -> Self {
        Self {
            client_key: client_key.into(),
            modes: BTreeSet::new(),
        }
    }

    /// The folded key of the member client in the store.
    pub fn client_key(&self) -> &str {
        &self.client_key
    }

    pub(crate) fn set_client_key(&mut self, key: impl Into<String>) {
        self.client_key = key.into();
    }

    /// The prefix modes this member holds in the channel.
    pub fn modes(&self) -> &BTreeSet<ChannelMode> {
        &self.modes
    }

    /// Whether the member holds the given prefix mode.
    pub fn has_mode(&self, mode: ChannelMode) -> bool {
        self.modes.contains(&mode)
    }

    pub(crate) fn set_mode(&mut self, mode: ChannelMode, on: bool) {
        if on {
            self.modes.insert(mode);
        } else {
            self.modes.remove(&mode);
        }
    }
}

/// One joined or otherwise known channel.
///
/// Membership keys are case-folded nicknames; the store re-derives them on a
/// casemapping change or a nick rename. All key arguments to the methods
/// below are expected pre-folded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelInfo {
    name: String,
    password: String,
    modes: BTreeSet<ChannelMode>,
    /// Values of parameterized modes that are currently set (key, limit).
    mode_params: BTreeMap<ChannelMode, String>,
    /// List-mode entries (ban masks and friends), in arrival order.
    lists: BTreeMap<ChannelMode, Vec<String>>,
    clients: BTreeMap<String, ChannelClientInfo>,
    /// Caller-attached data; the engine never interprets it.
    pub extensions: HashMap<String, String>,
}

impl ChannelInfo {
    /// Create a channel with the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The channel's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The channel password. Empty until learned.
    pub fn password(&self) -> &str {
        &self.password
    }

    pub(crate) fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// The boolean channel mode flags currently set.
    pub fn modes(&self) -> &BTreeSet<ChannelMode> {
        &self.modes
    }

    /// Whether the given flag mode is set.
    pub fn has_mode(&self, mode: ChannelMode) -> bool {
        self.modes.contains(&mode)
    }

    pub(crate) fn set_mode(&mut self, mode: ChannelMode, on: bool) {
        if on {
            self.modes.insert(mode);
        } else {
            self.modes.remove(&mode);
        }
    }

    /// The value of a parameterized mode (key, limit), if set.
    pub fn mode_param(&self, mode: ChannelMode) -> Option<&str> {
        self.mode_params.get(&mode).map(String::as_str)
    }

    pub(crate) fn set_mode_param(&mut self, mode: ChannelMode, value: Option<String>) {
        match value {
            Some(v) => {
                self.mode_params.insert(mode, v);
            }
            None => {
                self.mode_params.remove(&mode);
            }
        }
    }

    /// The entries of a list mode (e.g. the ban list).
    pub fn list_entries(&self, mode: ChannelMode) -> &[String] {
        self.lists.get(&mode).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn add_list_entry(&mut self, mode: ChannelMode, mask: String) {
        let entries = self.lists.entry(mode).or_default();
        if !entries.iter().any(|m| m == &mask) {
            entries.push(mask);
        }
    }

    pub(crate) fn remove_list_entry(&mut self, mode: ChannelMode, mask: &str) {
        if let Some(entries) = self.lists.get_mut(&mode) {
            entries.retain(|m| m != mask);
        }
    }

    /// Look up one membership by folded nickname key.
    pub fn client(&self, key: &str) -> Option<&ChannelClientInfo> {
        self.clients.get(key)
    }

    pub(crate) fn client_mut(&mut self, key: &str) -> Option<&mut ChannelClientInfo> {
        self.clients.get_mut(key)
    }

    /// Iterate memberships in key order.
    pub fn clients(&self) -> impl Iterator<Item = &ChannelClientInfo> {
        self.clients.values()
    }

    /// Number of known members.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub(crate) fn add_client(&mut self, key: String, client: ChannelClientInfo) {
        self.clients.insert(key, client);
    }

    pub(crate) fn remove_client(&mut self, key: &str) -> Option<ChannelClientInfo> {
        self.clients.remove(key)
    }

    /// Move a membership from `old_key` to `new_key`, preserving its modes.
    /// No-op when `old_key` has no membership.
    pub(crate) fn rename_client(&mut self, old_key: &str, new_key: &str) -> bool {
        match self.clients.remove(old_key) {
            Some(mut membership) => {
                membership.set_client_key(new_key);
                self.clients.insert(new_key.to_owned(), membership);
                true
            }
            None => false,
        }
    }

    pub(crate) fn rekey_clients(&mut self, key_map: &HashMap<String, String>) {
        let old = std::mem::take(&mut self.clients);
        for (key, mut membership) in old {
            let new_key = key_map.get(&key).cloned().unwrap_or(key);
            membership.set_client_key(new_key.clone());
            self.clients.insert(new_key, membership);
        }
    }
}
