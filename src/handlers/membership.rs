//! Channel membership: JOIN, PART, KICK and the 353 name-list numeric.

use crate::error::HandlerError;
use crate::events::EventKind;
use crate::line::Line;
use crate::mode::ChannelMode;
use crate::prefix::mask_nick;
use crate::state::{ChannelClientInfo, ChannelInfo, ClientInfo};

use super::{Context, Handler, HandlerResult};

/// Upsert a client record from a message source. A full hostmask refreshes
/// the stored user/host fields; a bare nick only ensures the record exists.
fn upsert_client(ctx: &mut Context<'_>, mask: &str) {
    let nick = mask_nick(mask);
    if let Some(client) = ctx.state.find_client_mut(nick) {
        client.update_from_hostmask(mask);
    } else if mask.contains('!') {
        ctx.state.add_client(ClientInfo::from_hostmask(mask));
    } else {
        ctx.state.add_client(ClientInfo::new(nick));
    }
}

/// Drop a channel and garbage-collect clients that were only known through
/// it. Used when the local client leaves a channel by any means.
fn discard_channel(ctx: &mut Context<'_>, name: &str) {
    let members: Vec<String> = ctx
        .state
        .find_channel(name)
        .map(|c| c.clients().map(|m| m.client_key().to_owned()).collect())
        .unwrap_or_default();
    ctx.state.remove_channel(name);
    for key in members {
        ctx.state.collect_if_stale(&key);
    }
}

/// JOIN: a client entered a channel.
///
/// A local join creates the channel record; a remote join to a channel the
/// store does not know is ignored, since only joined channels are tracked.
pub struct JoinHandler;

impl Handler for JoinHandler {
    fn handle(&mut self, ctx: &mut Context<'_>, line: &Line<'_>) -> HandlerResult {
        let Some(source) = line.source else {
            return Ok(());
        };
        let name = line
            .arg(0)
            .ok_or_else(|| HandlerError::NeedMoreParams { command: "JOIN".to_owned() })?
            .to_owned();
        let nick = mask_nick(source).to_owned();

        if ctx.state.find_channel(&name).is_none() {
            if !ctx.state.is_local(&nick) {
                // Not a channel we are on; learning the joiner would leave
                // an unreclaimable record with no membership.
                return Ok(());
            }
            ctx.state.add_channel(ChannelInfo::new(&name));
        }

        upsert_client(ctx, source);

        let key = ctx.state.fold(&nick);
        let channel = match ctx.state.find_channel_mut(&name) {
            Some(channel) => channel,
            None => return Ok(()),
        };
        if channel.client(&key).is_some() {
            // Replayed join, membership already known.
            return Ok(());
        }
        channel.add_client(key.clone(), ChannelClientInfo::new(key));
        let channel = channel.name().to_owned();

        ctx.publish(EventKind::ChannelJoin { channel, nick });
        Ok(())
    }
}

/// PART: a client left a channel of its own accord.
pub struct PartHandler;

impl Handler for PartHandler {
    fn handle(&mut self, ctx: &mut Context<'_>, line: &Line<'_>) -> HandlerResult {
        let Some(source) = line.source else {
            return Ok(());
        };
        let name = line
            .arg(0)
            .ok_or_else(|| HandlerError::NeedMoreParams { command: "PART".to_owned() })?
            .to_owned();
        let reason = line.arg(1).unwrap_or("").to_owned();
        let nick = mask_nick(source).to_owned();

        let key = ctx.state.fold(&nick);
        let channel = match ctx.state.find_channel_mut(&name) {
            Some(channel) => channel,
            None => return Ok(()),
        };
        if channel.remove_client(&key).is_none() {
            return Ok(());
        }
        let channel = channel.name().to_owned();

        ctx.publish(EventKind::ChannelPart {
            channel: channel.clone(),
            nick: nick.clone(),
            reason,
        });

        if ctx.state.is_local(&nick) {
            discard_channel(ctx, &channel);
        } else {
            ctx.state.collect_if_stale(&nick);
        }
        Ok(())
    }
}

/// KICK: a client was forcibly removed from a channel.
pub struct KickHandler;

impl Handler for KickHandler {
    fn handle(&mut self, ctx: &mut Context<'_>, line: &Line<'_>) -> HandlerResult {
        let name = line
            .arg(0)
            .ok_or_else(|| HandlerError::NeedMoreParams { command: "KICK".to_owned() })?
            .to_owned();
        let victim = line
            .arg(1)
            .ok_or_else(|| HandlerError::NeedMoreParams { command: "KICK".to_owned() })?
            .to_owned();
        let reason = line.arg(2).unwrap_or("").to_owned();
        let kicked_by = line.source.unwrap_or("").to_owned();

        let key = ctx.state.fold(&victim);
        let channel = match ctx.state.find_channel_mut(&name) {
            Some(channel) => channel,
            None => return Ok(()),
        };
        if channel.remove_client(&key).is_none() {
            return Ok(());
        }
        let channel = channel.name().to_owned();

        ctx.publish(EventKind::ChannelKick {
            channel: channel.clone(),
            nick: victim.clone(),
            kicked_by,
            reason,
        });

        if ctx.state.is_local(&victim) {
            discard_channel(ctx, &channel);
        } else {
            ctx.state.collect_if_stale(&victim);
        }
        Ok(())
    }
}

/// 353 RPL_NAMREPLY: seed memberships and status prefixes for a channel.
///
/// Each name may carry stacked status symbols (`@+nick` under multi-prefix)
/// and, under userhost-in-names, a full hostmask. The reply is silent: it
/// describes state that existed before we could observe it.
pub struct NamesHandler;

impl Handler for NamesHandler {
    fn handle(&mut self, ctx: &mut Context<'_>, line: &Line<'_>) -> HandlerResult {
        // :server 353 me ( "=" / "*" / "@" ) channel :names
        let Some(name) = line.arg(2) else {
            return Err(HandlerError::NeedMoreParams { command: "353".to_owned() });
        };
        let name = name.to_owned();
        if ctx.state.find_channel(&name).is_none() {
            return Ok(());
        }
        let names = line.arg(3).unwrap_or("").to_owned();

        for token in names.split_ascii_whitespace() {
            let mut modes = Vec::new();
            let mut rest = token;
            while let Some(symbol) = rest.chars().next() {
                match ChannelMode::from_prefix_symbol(symbol) {
                    Some(mode) => {
                        modes.push(mode);
                        rest = &rest[symbol.len_utf8()..];
                    }
                    None => break,
                }
            }
            if rest.is_empty() {
                continue;
            }

            upsert_client(ctx, rest);
            let key = ctx.state.fold(mask_nick(rest));
            let Some(channel) = ctx.state.find_channel_mut(&name) else {
                return Ok(());
            };
            if channel.client(&key).is_none() {
                channel.add_client(key.clone(), ChannelClientInfo::new(key.clone()));
            }
            if let Some(member) = channel.client_mut(&key) {
                for mode in modes {
                    member.set_mode(mode, true);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testutil::Rig;

    #[test]
    fn test_remote_join_known_channel() {
        let mut rig = Rig::new();
        rig.client("me!m@host").channel("#a", &["me"]);

        rig.run(&mut JoinHandler, ":alice!a@here JOIN #a").unwrap();

        assert_eq!(
            rig.take_events(),
            vec![EventKind::ChannelJoin {
                channel: "#a".into(),
                nick: "alice".into(),
            }]
        );
        assert!(rig.state.find_channel_client("#a", "alice").is_some());
        assert_eq!(rig.state.find_client("alice").unwrap().hostname(), "here");
    }

    #[test]
    fn test_local_join_creates_channel() {
        let mut rig = Rig::new();
        rig.client("me!m@host");
        rig.run(&mut JoinHandler, ":me!m@host JOIN :#new").unwrap();
        assert!(rig.state.find_channel("#new").is_some());
        assert!(rig.state.find_channel_client("#new", "me").is_some());
    }

    #[test]
    fn test_remote_join_unknown_channel_ignored() {
        let mut rig = Rig::new();
        rig.run(&mut JoinHandler, ":alice!a@h JOIN #elsewhere")
            .unwrap();
        assert!(rig.state.find_channel("#elsewhere").is_none());
        // No orphan client record either: nothing would ever reclaim it.
        assert!(rig.state.find_client("alice").is_none());
        assert!(rig.take_events().is_empty());
    }

    #[test]
    fn test_part_removes_membership() {
        let mut rig = Rig::new();
        rig.client("me!m@h").client("alice!a@h");
        rig.channel("#a", &["me", "alice"]);

        rig.run(&mut PartHandler, ":alice!a@h PART #a :bye").unwrap();

        assert_eq!(
            rig.take_events(),
            vec![EventKind::ChannelPart {
                channel: "#a".into(),
                nick: "alice".into(),
                reason: "bye".into(),
            }]
        );
        assert!(rig.state.find_channel_client("#a", "alice").is_none());
        // alice is no longer visible anywhere, so the record is collected
        assert!(rig.state.find_client("alice").is_none());
    }

    #[test]
    fn test_local_part_discards_channel() {
        let mut rig = Rig::new();
        rig.client("me!m@h").client("alice!a@h");
        rig.channel("#a", &["me", "alice"]);

        rig.run(&mut PartHandler, ":me!m@h PART #a").unwrap();

        assert!(rig.state.find_channel("#a").is_none());
        assert!(rig.state.find_client("alice").is_none());
        assert!(rig.state.find_client("me").is_some());
    }

    #[test]
    fn test_kick_attributes_kicker() {
        let mut rig = Rig::new();
        rig.client("me!m@h").client("alice!a@h").client("bob!b@h");
        rig.channel("#a", &["me", "alice", "bob"]);

        rig.run(&mut KickHandler, ":bob!b@h KICK #a Alice :flooding")
            .unwrap();

        assert_eq!(
            rig.take_events(),
            vec![EventKind::ChannelKick {
                channel: "#a".into(),
                nick: "Alice".into(),
                kicked_by: "bob!b@h".into(),
                reason: "flooding".into(),
            }]
        );
        assert!(rig.state.find_channel_client("#a", "alice").is_none());
    }

    #[test]
    fn test_local_kick_discards_channel() {
        let mut rig = Rig::new();
        rig.client("me!m@h").client("op!o@h");
        rig.channel("#a", &["me", "op"]);

        rig.run(&mut KickHandler, ":op!o@h KICK #a me :out").unwrap();

        assert!(rig.state.find_channel("#a").is_none());
    }

    #[test]
    fn test_names_seeds_members_and_prefixes() {
        let mut rig = Rig::new();
        rig.client("me!m@h").channel("#a", &["me"]);

        rig.run(
            &mut NamesHandler,
            ":irc.example.com 353 me = #a :me @+alice bob!b@host",
        )
        .unwrap();

        assert!(rig.take_events().is_empty());
        let alice = rig.state.find_channel_client("#a", "alice").unwrap();
        assert!(alice.has_mode(ChannelMode::Oper));
        assert!(alice.has_mode(ChannelMode::Voice));
        // userhost-in-names masks populate the client record
        assert_eq!(rig.state.find_client("bob").unwrap().hostname(), "host");
        assert!(rig
            .state
            .find_channel_client("#a", "bob")
            .map_or(false, |m| m.modes().is_empty()));
    }

    #[test]
    fn test_names_unknown_channel_ignored() {
        let mut rig = Rig::new();
        rig.run(&mut NamesHandler, ":srv 353 me = #x :@alice").unwrap();
        assert!(rig.state.find_client("alice").is_none());
    }
}
