//! PRIVMSG and NOTICE: message classification and delivery events.

use crate::ctcp::Ctcp;
use crate::error::HandlerError;
use crate::events::{DebugLevel, EventKind};
use crate::line::Line;
use crate::prefix::mask_nick;

use super::{Context, Handler, HandlerResult};

const CHANNEL_SIGILS: &[char] = &['#', '&', '+', '!'];

/// Classifies a message body and publishes exactly one event for it.
///
/// A body is plain text, an action (a CTCP whose verb is in the configured
/// action set), or a generic CTCP. The action classification only applies to
/// PRIVMSG; a CTCP inside a NOTICE is a CTCP reply regardless of verb.
pub struct MessageHandler {
    notice: bool,
}

impl MessageHandler {
    /// A handler for PRIVMSG lines.
    pub fn privmsg() -> Self {
        Self { notice: false }
    }

    /// A handler for NOTICE lines.
    pub fn notice() -> Self {
        Self { notice: true }
    }
}

impl Handler for MessageHandler {
    fn handle(&mut self, ctx: &mut Context<'_>, line: &Line<'_>) -> HandlerResult {
        let command = if self.notice { "NOTICE" } else { "PRIVMSG" };
        let target = line
            .arg(0)
            .ok_or_else(|| HandlerError::NeedMoreParams {
                command: command.to_owned(),
            })?
            .to_owned();
        let body = line.arg(1).unwrap_or("").to_owned();
        let host = line.source.unwrap_or("").to_owned();

        // A full hostmask on a known sender refreshes its record.
        if host.contains('!') {
            if let Some(client) = ctx.state.find_client_mut(mask_nick(&host)) {
                client.update_from_hostmask(&host);
            }
        }

        let channel = if target.starts_with(CHANNEL_SIGILS) {
            match ctx.state.find_channel(&target) {
                Some(chan) => Some(chan.name().to_owned()),
                None => {
                    ctx.publish(EventKind::DebugInfo {
                        level: DebugLevel::Warning,
                        message: format!("{command} for unknown channel {target}"),
                    });
                    return Ok(());
                }
            }
        } else {
            None
        };

        let ctcp = Ctcp::parse(&body).map(|c| (c.verb.to_owned(), c.payload.to_owned()));
        let kind = match (channel, ctcp, self.notice) {
            // Plain traffic.
            (None, None, false) => EventKind::PrivateMessage {
                message: body,
                host,
            },
            (None, None, true) => EventKind::PrivateNotice {
                message: body,
                host,
            },
            (Some(channel), None, false) => EventKind::ChannelMessage {
                channel,
                message: body,
                host,
            },
            (Some(channel), None, true) => EventKind::ChannelNotice {
                channel,
                message: body,
                host,
            },
            // CTCP inside a PRIVMSG: action or generic.
            (None, Some((verb, payload)), false) => {
                if ctx.config.is_action_verb(&verb) {
                    EventKind::PrivateAction {
                        message: payload,
                        host,
                    }
                } else {
                    EventKind::PrivateCtcp {
                        kind: verb,
                        message: payload,
                        host,
                    }
                }
            }
            (Some(channel), Some((verb, payload)), false) => {
                if ctx.config.is_action_verb(&verb) {
                    EventKind::ChannelAction {
                        channel,
                        message: payload,
                        host,
                    }
                } else {
                    EventKind::ChannelCtcp {
                        channel,
                        kind: verb,
                        message: payload,
                        host,
                    }
                }
            }
            // CTCP inside a NOTICE is always a reply.
            (None, Some((verb, payload)), true) => EventKind::PrivateCtcpReply {
                kind: verb,
                message: payload,
                host,
            },
            (Some(channel), Some((verb, payload)), true) => EventKind::ChannelCtcpReply {
                channel,
                kind: verb,
                message: payload,
                host,
            },
        };

        ctx.publish(kind);
        Ok(())
    }
}
