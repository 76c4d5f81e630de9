//! Per-client state.

use std::collections::{BTreeSet, HashMap};

use crate::mode::UserMode;
use crate::prefix::Source;

/// One known user on the network.
///
/// Owned exclusively by the [`StateStore`](super::StateStore); channel
/// memberships refer to it by folded-nickname key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientInfo {
    nickname: String,
    username: String,
    hostname: String,
    hostmask: String,
    modes: BTreeSet<UserMode>,
    /// Caller-attached data; the engine never interprets it.
    pub extensions: HashMap<String, String>,
}

impl ClientInfo {
    /// Create a client known only by nickname.
    pub fn new(nickname: impl Into<String>) -> Self {
        let nickname = nickname.into();
        Self {
            hostmask: nickname.clone(),
            nickname,
            ..Self::default()
        }
    }

    /// Create a client from a raw hostmask (`nick!user@host` or a subset).
    pub fn from_hostmask(mask: &str) -> Self {
        let mut client = match Source::parse(mask) {
            Source::User(nick, user, host) => Self {
                nickname: nick,
                username: user,
                hostname: host,
                ..Self::default()
            },
            Source::Server(name) => Self::new(name),
        };
        client.hostmask = mask.to_owned();
        client
    }

    /// The current display nickname.
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Update the display nickname. Keying is the store's concern; see
    /// [`StateStore::rename_client`](super::StateStore::rename_client).
    pub(crate) fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.nickname = nickname.into();
    }

    /// The username (ident), empty when unknown.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The hostname, empty when unknown.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// The raw hostmask as last seen on the wire.
    pub fn hostmask(&self) -> &str {
        &self.hostmask
    }

    /// Refresh username/hostname/hostmask from a full hostmask, e.g. when a
    /// previously NAMES-populated client speaks for the first time.
    pub fn update_from_hostmask(&mut self, mask: &str) {
        if let Source::User(_, user, host) = Source::parse(mask) {
            if !user.is_empty() {
                self.username = user;
            }
            if !host.is_empty() {
                self.hostname = host;
            }
        }
        if mask.contains('!') {
            self.hostmask = mask.to_owned();
        }
    }

    /// The user mode flags currently set.
    pub fn modes(&self) -> &BTreeSet<UserMode> {
        &self.modes
    }

    /// Whether the given user mode flag is set.
    pub fn has_mode(&self, mode: UserMode) -> bool {
        self.modes.contains(&mode)
    }

    pub(crate) fn set_mode(&mut self, mode: UserMode, on: bool) {
        if on {
            self.modes.insert(mode);
        } else {
            self.modes.remove(&mode);
        }
    }
}
