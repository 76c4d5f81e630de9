//! Mode delta-string parsing.

use std::iter::Peekable;

use crate::error::ModeParseError;

use super::types::{ChannelMode, Mode, ModeType, UserMode};

impl Mode<UserMode> {
    /// Parse user mode pieces like `["+iw"]` into a list of deltas.
    pub fn parse_user(pieces: &[&str]) -> Result<Vec<Mode<UserMode>>, ModeParseError> {
        parse_deltas(pieces)
    }
}

impl Mode<ChannelMode> {
    /// Parse channel mode pieces like `["-v+b", "nick", "mask"]`.
    pub fn parse_channel(pieces: &[&str]) -> Result<Vec<Mode<ChannelMode>>, ModeParseError> {
        parse_deltas(pieces)
    }
}

/// Consume the argument for one letter, honoring its class and direction.
fn resolve_arg<'a, T, I>(
    mode: &T,
    letter: char,
    adding: bool,
    args: &mut Peekable<I>,
) -> Result<Option<String>, ModeParseError>
where
    T: ModeType,
    I: Iterator<Item = &'a str>,
{
    if !mode.takes_arg(adding) {
        return Ok(None);
    }

    match args.next() {
        Some(arg) => Ok(Some(arg.to_owned())),
        // A bare list mode (`MODE #chan +b`) is a query, not an error.
        None if mode.is_list_mode() => Ok(None),
        None => Err(ModeParseError::MissingArgument { letter }),
    }
}

fn parse_deltas<T>(pieces: &[&str]) -> Result<Vec<Mode<T>>, ModeParseError>
where
    T: ModeType,
{
    let mut deltas = Vec::new();

    let Some((first, rest)) = pieces.split_first() else {
        return Ok(deltas);
    };

    let mut args = rest.iter().copied().peekable();
    let mut adding = match first.chars().next() {
        Some('+') | None => true,
        Some('-') => false,
        // A delta string must open with a direction sign.
        Some(c) => return Err(ModeParseError::MissingDirection { found: c }),
    };

    for c in first.chars() {
        match c {
            '+' => adding = true,
            '-' => adding = false,
            _ => {
                let mode = T::from_char(c);
                let arg = resolve_arg(&mode, c, adding, &mut args)?;
                deltas.push(if adding {
                    Mode::Plus(mode, arg)
                } else {
                    Mode::Minus(mode, arg)
                });
            }
        }
    }

    if args.peek().is_some() {
        return Err(ModeParseError::TrailingArguments);
    }

    Ok(deltas)
}
