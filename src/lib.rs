//! # ircflow
//!
//! A sans-IO IRC client protocol engine: feed it received lines, get back
//! state updates, events, and lines to transmit.
//!
//! ## Features
//!
//! - Zero-copy line tokenization (prefix, command, up to 15 parameters)
//! - Per-command handlers behind a pluggable dispatch registry
//! - Case-folded client/channel/membership tracking with `ascii`,
//!   `rfc1459` and `strict-rfc1459` casemapping, switchable mid-session
//! - Typed user and channel mode deltas, including status prefixes
//! - CTCP and action demultiplexing for PRIVMSG/NOTICE
//! - Automatic one-shot capability negotiation (`CAP LS` → `REQ` → `END`)
//! - An event bus with synchronous or queued delivery and panic-isolated
//!   listeners
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use ircflow::{Engine, EngineConfig, Event};
//!
//! let mut engine = Engine::new(EngineConfig {
//!     nickname: "flow".to_owned(),
//!     ..EngineConfig::default()
//! });
//! engine.add_listener(Arc::new(|event: &Event| {
//!     println!("{:?}", event.kind);
//! }));
//!
//! // The application owns the socket; `out` collects lines to send.
//! let mut out: Vec<String> = Vec::new();
//! engine.dispatch(":irc.example.com 001 flow :Welcome\r\n", &mut out);
//! engine.dispatch(":flow!u@host JOIN #rust\r\n", &mut out);
//! assert!(engine.state().find_channel("#Rust").is_some());
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod bus;
pub mod caps;
pub mod casemap;
pub mod config;
pub mod ctcp;
pub mod engine;
pub mod error;
pub mod events;
pub mod handlers;
pub mod line;
pub mod mode;
pub mod prefix;
pub mod state;

pub use bus::{DeliveryMode, EventBus, Listener};
pub use caps::{CapNegotiator, NegotiationState};
pub use casemap::CaseMapping;
pub use config::EngineConfig;
pub use ctcp::Ctcp;
pub use engine::Engine;
pub use error::{ErrorSeverity, HandlerError, ModeParseError, StateError};
pub use events::{DebugLevel, Event, EventKind, ParserId};
pub use handlers::{Context, Handler, LineSink, Registry};
pub use line::Line;
pub use mode::{ChannelMode, Mode, ModeClass, UserMode};
pub use prefix::Source;
pub use state::{ChannelClientInfo, ChannelInfo, ClientInfo, RenameOutcome, StateStore};
