//! Mode-letter semantics and delta-string parsing.
//!
//! IRC mode changes arrive as compact delta strings (`+o nick`, `-v+b mask`).
//! Each letter belongs to a semantic class: boolean flag, parameterized,
//! list-type, or membership prefix. Handlers use the parsed deltas to mutate
//! the state store and publish one event per logical MODE line.

mod parse;
mod types;

pub use self::types::{ChannelMode, Mode, ModeClass, ModeType, UserMode};
