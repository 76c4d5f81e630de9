//! Wire-grammar tokenizer.
//!
//! Splits a raw server line into its ordered tokens: optional `:`-prefixed
//! source, the command token (alphabetic name or exactly three digits),
//! space-delimited middle parameters, and an optional `:`-prefixed trailing
//! parameter that may contain spaces. Borrowed slices throughout; nothing is
//! allocated on the dispatch hot path.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::opt,
    error::ErrorKind,
    sequence::preceded,
    IResult,
};
use smallvec::SmallVec;

use crate::prefix::Source;

/// Parse the source (the part after `:` and before the first space).
fn parse_source(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// Parse the command token (1*letter or exactly 3 digits).
fn parse_command(input: &str) -> IResult<&str, &str> {
    let (rest, cmd) = take_while1(char::is_alphanumeric)(input)?;

    let alphabetic = cmd.bytes().all(|b| b.is_ascii_alphabetic());
    let numeric = cmd.len() == 3 && cmd.bytes().all(|b| b.is_ascii_digit());
    if !alphabetic && !numeric {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::AlphaNumeric,
        )));
    }

    Ok((rest, cmd))
}

/// Parse the parameters, including the trailing parameter.
///
/// Each parameter is introduced by one or more spaces (runs collapse into a
/// single separator). A `:` opens the trailing parameter, which runs to the
/// line delimiter and may contain spaces. At most 15 parameters are taken,
/// per RFC 2812.
fn parse_params(input: &str) -> SmallVec<[&str; 15]> {
    let mut params: SmallVec<[&str; 15]> = SmallVec::new();
    let mut rest = input;

    while params.len() < 15 && rest.starts_with(' ') {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() || rest.starts_with('\r') || rest.starts_with('\n') {
            break;
        }

        if let Some(trailing) = rest.strip_prefix(':') {
            let end = trailing.find(['\r', '\n']).unwrap_or(trailing.len());
            params.push(&trailing[..end]);
            break;
        }

        let end = rest.find([' ', '\r', '\n']).unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    params
}

fn parse_line(input: &str) -> IResult<&str, Line<'_>> {
    let (input, source) = opt(parse_source)(input)?;
    let (input, _) = space0(input)?;
    let (input, command) = parse_command(input)?;
    let params = parse_params(input);

    Ok((
        "",
        Line {
            source,
            command,
            params,
        },
    ))
}

/// One tokenized server line, borrowing from the raw input.
#[derive(Clone, Debug, PartialEq)]
pub struct Line<'a> {
    /// The raw source string (without the leading `:`), if present.
    pub source: Option<&'a str>,
    /// The command token: an alphabetic command name or a 3-digit numeric.
    pub command: &'a str,
    /// Parameters in wire order; the trailing parameter, if any, is last.
    pub params: SmallVec<[&'a str; 15]>,
}

impl<'a> Line<'a> {
    /// Tokenize a raw line. `None` for lines with no parseable command token;
    /// the dispatcher reports those as recoverable parse warnings.
    pub fn tokenize(input: &'a str) -> Option<Self> {
        match parse_line(input) {
            Ok((_, line)) => Some(line),
            Err(_) => None,
        }
    }

    /// The nth parameter, if present.
    pub fn arg(&self, n: usize) -> Option<&'a str> {
        self.params.get(n).copied()
    }

    /// The last parameter. For most commands this is the trailing text.
    pub fn last(&self) -> Option<&'a str> {
        self.params.last().copied()
    }

    /// Whether the command token is a 3-digit numeric reply.
    pub fn is_numeric(&self) -> bool {
        self.command.len() == 3 && self.command.chars().all(|c| c.is_ascii_digit())
    }

    /// Parse the source into a [`Source`], if one is present.
    pub fn parsed_source(&self) -> Option<Source> {
        self.source.map(Source::parse)
    }

    /// The nickname of the sending peer, if the source is a user hostmask.
    pub fn source_nick(&self) -> Option<String> {
        self.parsed_source()
            .and_then(|s| s.nick().map(str::to_owned))
    }
}
