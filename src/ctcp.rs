//! CTCP (Client-to-Client Protocol) demultiplexing.
//!
//! CTCP embeds structured sub-messages inside ordinary PRIVMSG/NOTICE bodies
//! between `\x01` delimiter bytes. The engine only needs to classify: a body
//! is either plain text, an action (a configured verb, normally `ACTION`),
//! or a generic CTCP carrying verb and payload. Exactly one classification
//! applies per body.

/// The CTCP delimiter character (`\x01`).
pub const CTCP_DELIM: char = '\x01';

/// A CTCP sub-message split out of a message body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// The CTCP verb, as sent (case preserved).
    pub verb: &'a str,
    /// The payload following the verb, empty when none was sent.
    pub payload: &'a str,
}

impl<'a> Ctcp<'a> {
    /// Parse a CTCP sub-message from a PRIVMSG/NOTICE body.
    ///
    /// Returns `None` if the body is not CTCP-wrapped. Some clients omit the
    /// trailing delimiter; that form is accepted.
    pub fn parse(text: &'a str) -> Option<Self> {
        let text = text.strip_prefix(CTCP_DELIM)?;
        let text = text.strip_suffix(CTCP_DELIM).unwrap_or(text);

        if text.is_empty() {
            return None;
        }

        let (verb, payload) = match text.find(' ') {
            Some(pos) => (&text[..pos], &text[pos + 1..]),
            None => (text, ""),
        };

        Some(Self { verb, payload })
    }

    /// Check whether a message body starts a CTCP sub-message.
    #[inline]
    pub fn is_ctcp(text: &str) -> bool {
        text.starts_with(CTCP_DELIM)
    }
}
