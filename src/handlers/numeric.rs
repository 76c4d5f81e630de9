//! Registration and server-feature numerics: 001, 005 and 464.

use crate::casemap::CaseMapping;
use crate::events::{DebugLevel, EventKind};
use crate::line::Line;
use crate::state::ClientInfo;

use super::{Context, Handler, HandlerResult};

/// 001 RPL_WELCOME: registration completed.
///
/// The first parameter is our nickname as the server recorded it, which may
/// differ from what we asked for. It becomes the canonical local nick.
pub struct WelcomeHandler;

impl Handler for WelcomeHandler {
    fn handle(&mut self, ctx: &mut Context<'_>, line: &Line<'_>) -> HandlerResult {
        *ctx.registered = true;

        if let Some(nick) = line.arg(0) {
            if ctx.state.find_client(nick).is_none() {
                ctx.state.add_client(ClientInfo::new(nick));
            }
            ctx.state.set_local_nick(nick);
        }

        ctx.publish(EventKind::ServerReady);
        Ok(())
    }
}

/// 005 RPL_ISUPPORT: server feature advertisement.
///
/// Only `CASEMAPPING` is acted on; switching the folding rule rekeys the
/// whole store. Everything else passes through untouched, the embedding
/// application can parse the raw line itself if it cares.
pub struct IsupportHandler;

impl Handler for IsupportHandler {
    fn handle(&mut self, ctx: &mut Context<'_>, line: &Line<'_>) -> HandlerResult {
        // :server 005 me TOKEN TOKEN=VALUE ... :are supported by this server
        let count = line.params.len();
        if count < 3 {
            return Ok(());
        }
        for token in &line.params[1..count - 1] {
            let Some(value) = token.strip_prefix("CASEMAPPING=") else {
                continue;
            };
            match CaseMapping::from_isupport(value) {
                Some(rule) => {
                    for lost in ctx.state.set_casemapping(rule) {
                        ctx.publish(EventKind::DebugInfo {
                            level: DebugLevel::Warning,
                            message: format!(
                                "casemapping change merged {lost} into an existing entry"
                            ),
                        });
                    }
                }
                None => ctx.publish(EventKind::DebugInfo {
                    level: DebugLevel::Warning,
                    message: format!("unrecognized CASEMAPPING {value}, keeping current rule"),
                }),
            }
        }
        Ok(())
    }
}

/// 464 ERR_PASSWDMISMATCH: the server wants a connection password.
pub struct PasswordRequiredHandler;

impl Handler for PasswordRequiredHandler {
    fn handle(&mut self, ctx: &mut Context<'_>, _line: &Line<'_>) -> HandlerResult {
        ctx.publish(EventKind::PasswordRequired);
        Ok(())
    }
}
