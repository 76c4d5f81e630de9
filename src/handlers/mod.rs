//! Command handlers and the dispatch registry.
//!
//! Each handler owns the semantics of one protocol command or numeric: it
//! reads tokens, mutates the [`StateStore`], and publishes events. The
//! registry maps command tokens to handlers; several handlers may share one
//! token and run in registration order. A token with no handler is ignored —
//! unknown commands and numerics must never abort the stream.

mod cap;
mod membership;
mod message;
mod mode;
mod nick;
mod numeric;
mod quit;

pub use cap::CapHandler;
pub use membership::{JoinHandler, KickHandler, NamesHandler, PartHandler};
pub use message::MessageHandler;
pub use mode::ModeHandler;
pub use nick::NickHandler;
pub use numeric::{IsupportHandler, PasswordRequiredHandler, WelcomeHandler};
pub use quit::QuitHandler;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::bus::EventBus;
use crate::config::EngineConfig;
use crate::error::HandlerError;
use crate::events::{Event, EventKind, ParserId};
use crate::line::Line;
use crate::state::StateStore;

/// Where handlers put raw outbound lines (e.g. `CAP REQ :multi-prefix`).
/// The transport owns framing and the line delimiter.
pub trait LineSink: Send {
    /// Queue one raw line for transmission.
    fn send_line(&mut self, line: &str);
}

impl LineSink for Vec<String> {
    fn send_line(&mut self, line: &str) {
        self.push(line.to_owned());
    }
}

impl LineSink for std::sync::mpsc::Sender<String> {
    fn send_line(&mut self, line: &str) {
        let _ = self.send(line.to_owned());
    }
}

/// Everything a handler may touch while processing one line.
pub struct Context<'a> {
    /// The connection's state store.
    pub state: &'a mut StateStore,
    /// Engine configuration.
    pub config: &'a EngineConfig,
    /// Sink for raw outbound lines.
    pub out: &'a mut dyn LineSink,
    /// The raw line being processed, for error reporting.
    pub raw: &'a str,
    /// Timestamp of the dispatch call.
    pub time: DateTime<Utc>,
    /// Whether registration (numeric 001) has completed.
    pub registered: &'a mut bool,
    pub(crate) bus: &'a EventBus,
    pub(crate) parser: ParserId,
}

impl Context<'_> {
    /// Publish one event, stamped with this dispatch's time and engine id.
    pub fn publish(&self, kind: EventKind) {
        self.bus.publish(Event {
            parser: self.parser,
            time: self.time,
            kind,
        });
    }

    /// Queue one raw outbound line.
    pub fn send_line(&mut self, line: &str) {
        self.out.send_line(line);
    }
}

/// Result type for command handlers. Errors are converted to protocol-error
/// events by the registry; they never reach the caller of `dispatch`.
pub type HandlerResult = Result<(), HandlerError>;

/// Trait implemented by all command handlers.
pub trait Handler: Send {
    /// Handle one tokenized line.
    fn handle(&mut self, ctx: &mut Context<'_>, line: &Line<'_>) -> HandlerResult;
}

/// Registry of command handlers, keyed by command token.
///
/// Alphabetic tokens match case-insensitively (keys are uppercased);
/// numerics match exactly.
pub struct Registry {
    handlers: HashMap<String, Vec<Box<dyn Handler>>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// A registry with the engine's stock handlers registered.
    pub fn with_defaults(config: &EngineConfig) -> Self {
        let mut registry = Self::new();

        registry.register("NICK", Box::new(NickHandler));
        registry.register("QUIT", Box::new(QuitHandler));
        registry.register("JOIN", Box::new(JoinHandler));
        registry.register("PART", Box::new(PartHandler));
        registry.register("KICK", Box::new(KickHandler));
        registry.register("MODE", Box::new(ModeHandler));
        registry.register("PRIVMSG", Box::new(MessageHandler::privmsg()));
        registry.register("NOTICE", Box::new(MessageHandler::notice()));
        registry.register("CAP", Box::new(CapHandler::new(config.request_caps.clone())));
        registry.register("001", Box::new(WelcomeHandler));
        registry.register("005", Box::new(IsupportHandler));
        registry.register("353", Box::new(NamesHandler));
        registry.register("464", Box::new(PasswordRequiredHandler));

        registry
    }

    /// Register a handler for a command token. Several handlers may share a
    /// token; they run in registration order.
    pub fn register(&mut self, token: &str, handler: Box<dyn Handler>) {
        self.handlers
            .entry(token.to_ascii_uppercase())
            .or_default()
            .push(handler);
    }

    /// Number of handlers registered for a token.
    pub fn handler_count(&self, token: &str) -> usize {
        self.handlers
            .get(&token.to_ascii_uppercase())
            .map_or(0, Vec::len)
    }

    /// Run every handler registered for the line's command token.
    ///
    /// Handler errors become protocol-error events and do not stop later
    /// handlers for the same token.
    pub fn dispatch(&mut self, ctx: &mut Context<'_>, line: &Line<'_>) {
        let key = line.command.to_ascii_uppercase();
        let Some(handlers) = self.handlers.get_mut(&key) else {
            // Forward compatibility: unknown commands and numerics are not
            // an error.
            trace!(target: "ircflow", command = %line.command, "no handler registered");
            return;
        };

        for handler in handlers {
            if let Err(err) = handler.handle(ctx, line) {
                ctx.publish(EventKind::ProtocolError {
                    severity: err.severity(),
                    message: err.to_string(),
                    raw_line: Some(ctx.raw.to_owned()),
                });
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// The actor attribution for a mode change: the acting peer's hostmask, or
/// `None` when the change came from the server or a topology replay.
pub(crate) fn actor_of(line: &Line<'_>) -> Option<String> {
    match line.parsed_source() {
        Some(source) if source.is_user() => line.source.map(str::to_owned),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use crate::bus::DeliveryMode;
    use crate::casemap::CaseMapping;
    use crate::state::{ChannelClientInfo, ChannelInfo, ClientInfo};
    use std::sync::{Arc, Mutex};

    /// A one-handler harness: store, bus with a recording listener, and an
    /// outbound line buffer.
    pub(crate) struct Rig {
        pub config: EngineConfig,
        pub state: StateStore,
        pub out: Vec<String>,
        pub registered: bool,
        bus: EventBus,
        seen: Arc<Mutex<Vec<EventKind>>>,
    }

    impl Rig {
        pub fn new() -> Self {
            let bus = EventBus::new(DeliveryMode::Sync);
            let seen = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&seen);
            bus.add_listener(Arc::new(move |e: &Event| {
                sink.lock().unwrap().push(e.kind.clone());
            }));
            Self {
                config: EngineConfig::default(),
                state: StateStore::new(CaseMapping::Rfc1459, "me"),
                out: Vec::new(),
                registered: true,
                bus,
                seen,
            }
        }

        /// Seed a known client from a hostmask.
        pub fn client(&mut self, mask: &str) -> &mut Self {
            self.state.add_client(ClientInfo::from_hostmask(mask));
            self
        }

        /// Seed a channel with memberships for already-known nicks.
        pub fn channel(&mut self, name: &str, members: &[&str]) -> &mut Self {
            let mut chan = ChannelInfo::new(name);
            for nick in members {
                let key = self.state.fold(nick);
                chan.add_client(key.clone(), ChannelClientInfo::new(key));
            }
            self.state.add_channel(chan);
            self
        }

        /// Tokenize `raw` and run it through `handler`.
        pub fn run(&mut self, handler: &mut dyn Handler, raw: &str) -> HandlerResult {
            let line = Line::tokenize(raw).expect("test line must tokenize");
            let mut ctx = Context {
                state: &mut self.state,
                config: &self.config,
                out: &mut self.out,
                raw,
                time: Utc::now(),
                registered: &mut self.registered,
                bus: &self.bus,
                parser: ParserId(0),
            };
            handler.handle(&mut ctx, &line)
        }

        /// Events recorded so far, clearing the record.
        pub fn take_events(&self) -> Vec<EventKind> {
            std::mem::take(&mut self.seen.lock().unwrap())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::DeliveryMode;
    use crate::casemap::CaseMapping;

    struct Counter(std::sync::Arc<std::sync::atomic::AtomicU32>);

    impl Handler for Counter {
        fn handle(&mut self, _ctx: &mut Context<'_>, _line: &Line<'_>) -> HandlerResult {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    fn run_line(registry: &mut Registry, raw: &str) {
        let config = EngineConfig::default();
        let bus = EventBus::new(DeliveryMode::Sync);
        let mut state = StateStore::new(CaseMapping::Rfc1459, "me");
        let mut out: Vec<String> = Vec::new();
        let mut registered = false;
        let mut ctx = Context {
            state: &mut state,
            config: &config,
            out: &mut out,
            raw,
            time: Utc::now(),
            registered: &mut registered,
            bus: &bus,
            parser: ParserId(0),
        };
        let line = Line::tokenize(raw).unwrap();
        registry.dispatch(&mut ctx, &line);
    }

    #[test]
    fn test_multiple_handlers_run_in_order() {
        let count = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
        let mut registry = Registry::new();
        registry.register("FOO", Box::new(Counter(count.clone())));
        registry.register("foo", Box::new(Counter(count.clone())));
        assert_eq!(registry.handler_count("Foo"), 2);

        run_line(&mut registry, "FOO");
        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unknown_command_ignored() {
        let mut registry = Registry::new();
        // Must not panic or error.
        run_line(&mut registry, "WHOWAS someone");
        run_line(&mut registry, "999 x :unknown numeric");
    }

    #[test]
    fn test_alphabetic_lookup_case_insensitive() {
        let count = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
        let mut registry = Registry::new();
        registry.register("privmsg", Box::new(Counter(count.clone())));
        run_line(&mut registry, "PRIVMSG #x :hi");
        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_actor_attribution() {
        let line = Line::tokenize(":nick!u@h MODE #x +o nick").unwrap();
        assert_eq!(actor_of(&line), Some("nick!u@h".to_owned()));

        let line = Line::tokenize(":irc.example.com MODE #x +nt").unwrap();
        assert_eq!(actor_of(&line), None);

        let line = Line::tokenize("MODE #x +nt").unwrap();
        assert_eq!(actor_of(&line), None);
    }
}
