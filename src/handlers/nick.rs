//! NICK: a client changed nickname.

use crate::error::StateError;
use crate::events::EventKind;
use crate::line::Line;
use crate::prefix::mask_nick;

use super::{Context, Handler, HandlerResult};

/// Applies a nickname change atomically across the global client table and
/// every channel membership, then publishes the channel-scoped events
/// followed by the single client-scoped event.
pub struct NickHandler;

impl Handler for NickHandler {
    fn handle(&mut self, ctx: &mut Context<'_>, line: &Line<'_>) -> HandlerResult {
        let Some(source) = line.source else {
            return Ok(());
        };
        let old_nick = mask_nick(source);
        let Some(new_nick) = line.last() else {
            return Ok(());
        };

        let outcome = match ctx.state.rename_client(old_nick, new_nick) {
            Ok(outcome) => outcome,
            // A NICK for a client we never learned about is not an error.
            Err(StateError::UnknownClient(_)) => return Ok(()),
            // Rename collision: fatal for this client, state untouched.
            Err(err) => return Err(err.into()),
        };

        // All rekeys happened before any event fires.
        for channel in &outcome.channels {
            ctx.publish(EventKind::ChannelNickChanged {
                channel: channel.clone(),
                nick: new_nick.to_owned(),
                old_nick: outcome.old_nick.clone(),
            });
        }
        ctx.publish(EventKind::NickChanged {
            nick: new_nick.to_owned(),
            old_nick: outcome.old_nick,
        });

        Ok(())
    }
}
