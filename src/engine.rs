//! The protocol engine: one instance per server connection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::bus::{EventBus, Listener};
use crate::config::EngineConfig;
use crate::error::ErrorSeverity;
use crate::events::{Event, EventKind, ParserId};
use crate::handlers::{Context, LineSink, Registry};
use crate::line::Line;
use crate::state::{ClientInfo, StateStore};

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(0);

/// A sans-IO IRC client engine.
///
/// The embedding application owns the socket. It feeds received lines to
/// [`Engine::dispatch`] together with a sink for outbound lines; the engine
/// tokenizes, updates its [`StateStore`], and publishes events. Two engines
/// never share state, and every event carries the id of the engine that
/// produced it.
pub struct Engine {
    id: ParserId,
    config: EngineConfig,
    state: StateStore,
    registry: Registry,
    bus: EventBus,
    registered: bool,
}

impl Engine {
    /// Create an engine with the stock handler set.
    pub fn new(config: EngineConfig) -> Self {
        let mut state = StateStore::new(config.casemapping, &config.nickname);
        state.add_client(ClientInfo::new(&config.nickname));
        let registry = Registry::with_defaults(&config);
        let bus = EventBus::new(config.delivery);
        Self {
            id: ParserId(NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed)),
            config,
            state,
            registry,
            bus,
            registered: false,
        }
    }

    /// This engine's id, stamped on every event it publishes.
    pub fn id(&self) -> ParserId {
        self.id
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read access to the connection state.
    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Whether registration (numeric 001) has completed.
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Subscribe a listener to this engine's events.
    pub fn add_listener(&self, listener: Arc<dyn Listener>) {
        self.bus.add_listener(listener);
    }

    /// Register an extra handler for a command token, alongside the stock
    /// ones. Handlers for a token run in registration order.
    pub fn register_handler(&mut self, token: &str, handler: Box<dyn crate::handlers::Handler>) {
        self.registry.register(token, handler);
    }

    /// Process one received line, stamped with the current time.
    pub fn dispatch(&mut self, raw: &str, out: &mut dyn LineSink) {
        self.dispatch_at(raw, Utc::now(), out);
    }

    /// Process one received line with an explicit timestamp.
    ///
    /// A line that does not tokenize produces a warning-severity protocol
    /// error event and nothing else; the stream continues.
    pub fn dispatch_at(&mut self, raw: &str, time: DateTime<Utc>, out: &mut dyn LineSink) {
        let raw = raw.trim_end_matches(&['\r', '\n'][..]);
        if raw.is_empty() {
            return;
        }

        let Some(line) = Line::tokenize(raw) else {
            debug!(target: "ircflow", %raw, "undispatchable line");
            self.bus.publish(Event {
                parser: self.id,
                time,
                kind: EventKind::ProtocolError {
                    severity: ErrorSeverity::Warning,
                    message: "line did not tokenize".to_owned(),
                    raw_line: Some(raw.to_owned()),
                },
            });
            return;
        };

        let mut ctx = Context {
            state: &mut self.state,
            config: &self.config,
            out,
            raw,
            time,
            registered: &mut self.registered,
            bus: &self.bus,
            parser: self.id,
        };
        self.registry.dispatch(&mut ctx, &line);
    }
}
