//! MODE: channel and user mode changes.

use crate::error::{HandlerError, StateError};
use crate::events::{DebugLevel, EventKind};
use crate::line::Line;
use crate::mode::{ChannelMode, Mode, ModeClass};

use super::{actor_of, Context, Handler, HandlerResult};

/// Channel name sigils. Anything else is a nick.
const CHANNEL_SIGILS: &[char] = &['#', '&', '+', '!'];

/// Applies mode deltas to the store.
///
/// Channel deltas fan out per class: status prefixes update the membership
/// and publish one event per affected member, list modes edit the mask
/// lists, parameterized modes record their argument, and plain flags toggle.
/// A single summary event with the raw delta text closes each change.
pub struct ModeHandler;

impl ModeHandler {
    fn channel_mode(
        &self,
        ctx: &mut Context<'_>,
        line: &Line<'_>,
        target: &str,
    ) -> HandlerResult {
        let pieces: Vec<&str> = line.params[1..].to_vec();
        let deltas = Mode::parse_channel(&pieces)?;
        let actor = actor_of(line);

        let name = ctx
            .state
            .find_channel(target)
            .ok_or_else(|| StateError::UnknownChannel(target.to_owned()))?
            .name()
            .to_owned();

        // Queries and no-ops (bare list letters, status changes for absent
        // members) must not produce a change event.
        let mut applied = false;
        for delta in &deltas {
            let mode = *delta.mode();
            let adding = delta.is_plus();
            match mode.class() {
                ModeClass::Prefix => {
                    let Some(nick) = delta.arg() else { continue };
                    let nick = nick.to_owned();
                    let key = ctx.state.fold(&nick);
                    let Some(channel) = ctx.state.find_channel_mut(&name) else {
                        continue;
                    };
                    let Some(member) = channel.client_mut(&key) else {
                        ctx.publish(EventKind::DebugInfo {
                            level: DebugLevel::Warning,
                            message: format!(
                                "status change for {nick} who is not on {name}"
                            ),
                        });
                        continue;
                    };
                    member.set_mode(mode, adding);
                    applied = true;
                    ctx.publish(EventKind::ChannelUserModeChanged {
                        channel: name.clone(),
                        nick,
                        modes: format!(
                            "{}{}",
                            if adding { '+' } else { '-' },
                            mode.letter()
                        ),
                        actor: actor.clone(),
                    });
                }
                ModeClass::List => {
                    // A bare list letter is a query, not a change.
                    let Some(mask) = delta.arg() else { continue };
                    let mask = mask.to_owned();
                    let Some(channel) = ctx.state.find_channel_mut(&name) else {
                        continue;
                    };
                    if adding {
                        channel.add_list_entry(mode, mask);
                    } else {
                        channel.remove_list_entry(mode, &mask);
                    }
                    applied = true;
                }
                ModeClass::Param | ModeClass::ParamWhenSet => {
                    let arg = delta.arg().map(str::to_owned);
                    let Some(channel) = ctx.state.find_channel_mut(&name) else {
                        continue;
                    };
                    if adding {
                        if mode == ChannelMode::Key {
                            channel.set_password(arg.clone().unwrap_or_default());
                        }
                        channel.set_mode_param(mode, arg);
                        channel.set_mode(mode, true);
                    } else {
                        if mode == ChannelMode::Key {
                            channel.set_password("");
                        }
                        channel.set_mode_param(mode, None);
                        channel.set_mode(mode, false);
                    }
                    applied = true;
                }
                ModeClass::Flag => {
                    if let Some(channel) = ctx.state.find_channel_mut(&name) {
                        channel.set_mode(mode, adding);
                        applied = true;
                    }
                }
            }
        }

        if applied {
            ctx.publish(EventKind::ChannelModeChanged {
                channel: name,
                modes: pieces.join(" "),
                actor,
            });
        }
        Ok(())
    }

    fn user_mode(&self, ctx: &mut Context<'_>, line: &Line<'_>, target: &str) -> HandlerResult {
        let pieces: Vec<&str> = line.params[1..].to_vec();
        let deltas = Mode::parse_user(&pieces)?;
        let actor = actor_of(line);

        let client = ctx
            .state
            .find_client_mut(target)
            .ok_or_else(|| StateError::UnknownClient(target.to_owned()))?;
        for delta in &deltas {
            client.set_mode(*delta.mode(), delta.is_plus());
        }
        let nick = client.nickname().to_owned();

        ctx.publish(EventKind::UserModeChanged {
            nick,
            modes: pieces.join(" "),
            actor,
        });
        Ok(())
    }
}

impl Handler for ModeHandler {
    fn handle(&mut self, ctx: &mut Context<'_>, line: &Line<'_>) -> HandlerResult {
        let target = line
            .arg(0)
            .ok_or_else(|| HandlerError::NeedMoreParams {
                command: "MODE".to_owned(),
            })?
            .to_owned();
        if line.params.len() < 2 {
            // `MODE target` with no delta is a query we never send; a server
            // echoing one carries nothing to apply.
            return Ok(());
        }

        if target.starts_with(CHANNEL_SIGILS) {
            self.channel_mode(ctx, line, &target)
        } else {
            self.user_mode(ctx, line, &target)
        }
    }
}
