//! Error types for the engine.
//!
//! Failures never cross the dispatch boundary: every error defined here is
//! converted into a structured event at the point of detection. The enums
//! exist so handlers and the state store can use `Result` + `?` internally
//! and so events can carry a typed severity.

use thiserror::Error;

/// How broadly a reported protocol error damages the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// Recoverable: the offending line was dropped, the stream continues.
    Warning,
    /// Fatal to the affected entity: the specific mutation was rejected, but
    /// the connection and unrelated state remain usable.
    Fatal,
}

/// State-store consistency failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StateError {
    /// A rename would clobber a distinct client at the destination key.
    #[error("nick change from {old} to {new} would overwrite existing client")]
    RenameCollision {
        /// The nickname being renamed.
        old: String,
        /// The occupied destination nickname.
        new: String,
    },

    /// An operation referenced a client that the store does not know.
    #[error("unknown client: {0}")]
    UnknownClient(String),

    /// An operation referenced a channel that the store does not know.
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
}

/// Mode delta-string parse failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModeParseError {
    /// The delta string did not open with `+` or `-`.
    #[error("mode string must start with + or -, found {found:?}")]
    MissingDirection {
        /// The character found instead of a direction sign.
        found: char,
    },

    /// A letter required an argument that was not supplied.
    #[error("mode '{letter}' requires an argument but none provided")]
    MissingArgument {
        /// The letter missing its argument.
        letter: char,
    },

    /// Arguments were left over after all letters were resolved.
    #[error("unused arguments after mode string")]
    TrailingArguments,
}

/// Errors a command handler can surface to the dispatcher.
///
/// The dispatcher converts these into protocol-error events; they never
/// propagate to the caller of `dispatch`.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum HandlerError {
    /// The line was missing parameters the command requires.
    #[error("not enough parameters for {command}")]
    NeedMoreParams {
        /// The command that was short on parameters.
        command: String,
    },

    /// A state mutation was rejected.
    #[error(transparent)]
    State(#[from] StateError),

    /// The line carried an unparseable mode string.
    #[error(transparent)]
    Mode(#[from] ModeParseError),
}

impl HandlerError {
    /// The severity of the event this error should surface as.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NeedMoreParams { .. } | Self::Mode(_) => ErrorSeverity::Warning,
            Self::State(_) => ErrorSeverity::Fatal,
        }
    }
}
