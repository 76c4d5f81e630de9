//! Message source (prefix) parsing.
//!
//! The `:`-prefixed source of a server line is either a server name or a
//! `nick!user@host` hostmask. The distinction matters for actor attribution:
//! mode changes replayed by the server carry no acting peer.

/// The parsed source of a server line.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    /// A server name (contains a dot, no `!`/`@` user parts).
    Server(String),
    /// A user hostmask: (nickname, username, hostname).
    User(String, String, String),
}

impl Source {
    /// Parse a source string leniently; components are not validated.
    pub fn parse(s: &str) -> Self {
        #[derive(Copy, Clone, PartialEq)]
        enum Part {
            Name,
            User,
            Host,
        }

        let mut name = String::new();
        let mut user = String::new();
        let mut host = String::new();
        let mut part = Part::Name;
        let mut is_server = false;

        for c in s.chars() {
            if c == '.' && part == Part::Name {
                is_server = true;
            }
            match c {
                '!' if part == Part::Name => {
                    is_server = false;
                    part = Part::User;
                }
                '@' if part != Part::Host => {
                    is_server = false;
                    part = Part::Host;
                }
                _ => match part {
                    Part::Name => name.push(c),
                    Part::User => user.push(c),
                    Part::Host => host.push(c),
                },
            }
        }

        if is_server {
            Self::Server(name)
        } else {
            Self::User(name, user, host)
        }
    }

    /// The nickname, when the source is a user hostmask.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Self::User(nick, _, _) if !nick.is_empty() => Some(nick),
            _ => None,
        }
    }

    /// The username, when present.
    pub fn user(&self) -> Option<&str> {
        match self {
            Self::User(_, user, _) if !user.is_empty() => Some(user),
            _ => None,
        }
    }

    /// The hostname, when present.
    pub fn host(&self) -> Option<&str> {
        match self {
            Self::User(_, _, host) if !host.is_empty() => Some(host),
            _ => None,
        }
    }

    /// Whether this source names a peer rather than a server.
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User(..))
    }
}

/// Extract the nickname portion of a raw hostmask, i.e. everything before
/// the first `!` (or the whole string when no user part is present).
pub fn mask_nick(mask: &str) -> &str {
    mask.split(['!', '@']).next().unwrap_or(mask)
}
