//! CAP: pre-registration capability negotiation.

use crate::caps::CapNegotiator;
use crate::line::Line;

use super::{Context, Handler, HandlerResult};

/// Feeds `CAP ... LS` listings into the negotiator and transmits whatever
/// it produces. Only LS is handled; ACK/NAK bookkeeping is left to the
/// embedding application. Post-registration CAP traffic is ignored.
pub struct CapHandler {
    negotiator: CapNegotiator,
}

impl CapHandler {
    /// A handler requesting any of `supported` the server offers.
    pub fn new(supported: Vec<String>) -> Self {
        Self {
            negotiator: CapNegotiator::new(supported),
        }
    }
}

impl Handler for CapHandler {
    fn handle(&mut self, ctx: &mut Context<'_>, line: &Line<'_>) -> HandlerResult {
        if *ctx.registered {
            return Ok(());
        }
        // :server CAP <target> LS [*] :<caps>
        let Some(subcommand) = line.arg(1) else {
            return Ok(());
        };
        if !subcommand.eq_ignore_ascii_case("LS") {
            return Ok(());
        }

        let has_continuation = line.arg(2) == Some("*");
        let caps = if has_continuation {
            line.arg(3).unwrap_or("")
        } else {
            line.arg(2).unwrap_or("")
        };

        for out in self.negotiator.on_listing(caps, has_continuation) {
            ctx.send_line(&out);
        }
        Ok(())
    }
}
