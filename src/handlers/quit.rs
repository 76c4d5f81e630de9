//! QUIT: a client left the network.

use crate::events::EventKind;
use crate::line::Line;
use crate::prefix::mask_nick;

use super::{Context, Handler, HandlerResult};

/// Removes the quitting client and its memberships, publishing one
/// channel-scoped quit per shared channel followed by the client-scoped
/// quit. A local quit additionally discards every channel — the connection
/// context is gone.
pub struct QuitHandler;

impl Handler for QuitHandler {
    fn handle(&mut self, ctx: &mut Context<'_>, line: &Line<'_>) -> HandlerResult {
        let Some(source) = line.source else {
            return Ok(());
        };
        let nick_ref = mask_nick(source);
        let Some(client) = ctx.state.find_client(nick_ref) else {
            return Ok(());
        };
        let nick = client.nickname().to_owned();
        let hostmask = client.hostmask().to_owned();
        let reason = line.last().unwrap_or("").to_owned();

        let key = ctx.state.fold(&nick);
        let mut shared = Vec::new();
        for channel in ctx.state.channels_mut() {
            if channel.remove_client(&key).is_some() {
                shared.push(channel.name().to_owned());
            }
        }

        for channel in shared {
            ctx.publish(EventKind::ChannelQuit {
                channel,
                nick: nick.clone(),
                reason: reason.clone(),
            });
        }

        let is_local = ctx.state.is_local(&nick);
        ctx.state.remove_client(&nick);
        if is_local {
            let names: Vec<String> =
                ctx.state.channels().map(|c| c.name().to_owned()).collect();
            for name in names {
                ctx.state.remove_channel(&name);
            }
        }

        ctx.publish(EventKind::Quit {
            nick,
            hostmask,
            reason,
        });
        Ok(())
    }
}
