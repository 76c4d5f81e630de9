//! Structured events published by the engine.
//!
//! Events are owned snapshots: they carry names and text, never references
//! into the state store, so queued bus delivery can outlive any particular
//! store mutation.

use chrono::{DateTime, Utc};

use crate::error::ErrorSeverity;

/// Identifies the engine instance that published an event, so one listener
/// can serve several connections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParserId(pub u64);

/// Verbosity of a [`EventKind::DebugInfo`] event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DebugLevel {
    /// Engine-internal trace detail.
    Info,
    /// A dropped or suspicious line worth surfacing.
    Warning,
}

/// One published event: the envelope ties the payload to its originating
/// engine and the dispatch timestamp of the line that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// The engine that published this event.
    pub parser: ParserId,
    /// Timestamp of the dispatch call that produced the event.
    pub time: DateTime<Utc>,
    /// The event payload.
    pub kind: EventKind,
}

/// The payload of an [`Event`].
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum EventKind {
    /// A client changed nickname (client-scoped, fired once per change,
    /// after all channel-scoped events).
    NickChanged {
        /// The nickname after the change.
        nick: String,
        /// The nickname before the change.
        old_nick: String,
    },
    /// A member of `channel` changed nickname (one per shared channel).
    ChannelNickChanged {
        /// The channel observing the change.
        channel: String,
        /// The nickname after the change.
        nick: String,
        /// The nickname before the change.
        old_nick: String,
    },
    /// A client's user modes changed.
    UserModeChanged {
        /// The affected client.
        nick: String,
        /// The full delta string as received (e.g. `+iw`).
        modes: String,
        /// Hostmask of the acting peer; `None` for server-originated or
        /// replayed changes.
        actor: Option<String>,
    },
    /// A channel's modes changed (flags, parameters, or lists).
    ChannelModeChanged {
        /// The affected channel.
        channel: String,
        /// The full delta string as received (e.g. `-v+b nick mask`).
        modes: String,
        /// Hostmask of the acting peer; `None` for server-originated.
        actor: Option<String>,
    },
    /// A member's prefix modes within a channel changed.
    ChannelUserModeChanged {
        /// The channel in which the change applies.
        channel: String,
        /// The affected member.
        nick: String,
        /// The single delta applied to this member (e.g. `+o`).
        modes: String,
        /// Hostmask of the acting peer; `None` for server-originated.
        actor: Option<String>,
    },
    /// A client quit the network (client-scoped, after channel-scoped).
    Quit {
        /// The quitting client's nickname.
        nick: String,
        /// The quitting client's hostmask.
        hostmask: String,
        /// The quit reason, possibly empty.
        reason: String,
    },
    /// A member of `channel` quit (one per shared channel).
    ChannelQuit {
        /// The channel observing the quit.
        channel: String,
        /// The quitting member's nickname.
        nick: String,
        /// The quit reason, possibly empty.
        reason: String,
    },
    /// A client joined a channel.
    ChannelJoin {
        /// The joined channel.
        channel: String,
        /// The joining client's nickname.
        nick: String,
    },
    /// A client left a channel.
    ChannelPart {
        /// The parted channel.
        channel: String,
        /// The parting client's nickname.
        nick: String,
        /// The part reason, possibly empty.
        reason: String,
    },
    /// A client was kicked from a channel.
    ChannelKick {
        /// The channel the kick happened in.
        channel: String,
        /// The kicked client's nickname.
        nick: String,
        /// Hostmask of the kicker.
        kicked_by: String,
        /// The kick reason, possibly empty.
        reason: String,
    },
    /// The server rejected registration pending a password (numeric 464).
    PasswordRequired,
    /// Registration completed (numeric 001).
    ServerReady,
    /// A plain message addressed to us.
    PrivateMessage {
        /// The message body.
        message: String,
        /// Hostmask of the sender.
        host: String,
    },
    /// A CTCP ACTION addressed to us.
    PrivateAction {
        /// The action body.
        message: String,
        /// Hostmask of the sender.
        host: String,
    },
    /// A non-action CTCP addressed to us.
    PrivateCtcp {
        /// The CTCP verb.
        kind: String,
        /// The CTCP payload, possibly empty.
        message: String,
        /// Hostmask of the sender.
        host: String,
    },
    /// A plain notice addressed to us.
    PrivateNotice {
        /// The notice body.
        message: String,
        /// Hostmask of the sender.
        host: String,
    },
    /// A CTCP reply (CTCP inside a NOTICE) addressed to us.
    PrivateCtcpReply {
        /// The CTCP verb.
        kind: String,
        /// The reply payload, possibly empty.
        message: String,
        /// Hostmask of the sender.
        host: String,
    },
    /// A plain message to a channel we know.
    ChannelMessage {
        /// The target channel.
        channel: String,
        /// The message body.
        message: String,
        /// Hostmask of the sender.
        host: String,
    },
    /// A CTCP ACTION to a channel we know.
    ChannelAction {
        /// The target channel.
        channel: String,
        /// The action body.
        message: String,
        /// Hostmask of the sender.
        host: String,
    },
    /// A non-action CTCP to a channel we know.
    ChannelCtcp {
        /// The target channel.
        channel: String,
        /// The CTCP verb.
        kind: String,
        /// The CTCP payload, possibly empty.
        message: String,
        /// Hostmask of the sender.
        host: String,
    },
    /// A CTCP reply (CTCP inside a NOTICE) to a channel we know.
    ChannelCtcpReply {
        /// The target channel.
        channel: String,
        /// The CTCP verb.
        kind: String,
        /// The reply payload, possibly empty.
        message: String,
        /// Hostmask of the sender.
        host: String,
    },
    /// A plain notice to a channel we know.
    ChannelNotice {
        /// The target channel.
        channel: String,
        /// The notice body.
        message: String,
        /// Hostmask of the sender.
        host: String,
    },
    /// Engine-internal diagnostics surfaced to listeners.
    DebugInfo {
        /// Verbosity of the information.
        level: DebugLevel,
        /// Human-readable description.
        message: String,
    },
    /// A protocol or state-consistency failure.
    ProtocolError {
        /// How badly the session is affected.
        severity: ErrorSeverity,
        /// Human-readable description.
        message: String,
        /// The offending raw line, when one exists.
        raw_line: Option<String>,
    },
}

impl EventKind {
    /// Whether this event reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::ProtocolError { .. })
    }

    /// Whether this event reports a fatal (entity-scoped) failure.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ProtocolError {
                severity: ErrorSeverity::Fatal,
                ..
            }
        )
    }
}
