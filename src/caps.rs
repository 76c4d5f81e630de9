//! Automatic capability negotiation.
//!
//! A small state machine that runs only before registration completes. It
//! answers the server's capability listing (`CAP ... LS`) by requesting each
//! capability this client supports, then terminates negotiation once the
//! listing ends. After that it goes quiet for the rest of the session: the
//! embedding application is assumed to manage capabilities itself.
//!
//! Requests go out one per line. Some servers reject batched `CAP REQ`s, so
//! they are never coalesced.

/// Where automatic negotiation currently stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NegotiationState {
    /// No capability listing has been seen yet.
    #[default]
    NotStarted,
    /// A multi-line listing is in progress; more lines are expected.
    AwaitingList,
    /// Negotiation ended (`CAP END` sent). Further listings are ignored.
    Done,
}

/// The one-shot CAP negotiation machine.
#[derive(Clone, Debug)]
pub struct CapNegotiator {
    state: NegotiationState,
    supported: Vec<String>,
}

impl CapNegotiator {
    /// Create a negotiator that will request any of `supported` the server
    /// offers.
    pub fn new(supported: Vec<String>) -> Self {
        Self {
            state: NegotiationState::NotStarted,
            supported,
        }
    }

    /// The current state.
    pub fn state(&self) -> NegotiationState {
        self.state
    }

    /// Feed one capability-listing line.
    ///
    /// `caps` is the space-separated token list; `has_continuation` is true
    /// when the line carried the multi-line marker (`*`) and more listing
    /// lines follow. Returns the raw lines to transmit, in order; the final
    /// listing line yields exactly one trailing `CAP END`.
    pub fn on_listing(&mut self, caps: &str, has_continuation: bool) -> Vec<String> {
        if self.state == NegotiationState::Done {
            return Vec::new();
        }

        let mut out = Vec::new();
        for cap in caps.split_whitespace() {
            if self
                .supported
                .iter()
                .any(|s| s.eq_ignore_ascii_case(cap))
            {
                out.push(format!("CAP REQ :{cap}"));
            }
        }

        if has_continuation {
            self.state = NegotiationState::AwaitingList;
        } else {
            self.state = NegotiationState::Done;
            out.push("CAP END".to_owned());
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn negotiator() -> CapNegotiator {
        CapNegotiator::new(vec!["multi-prefix".into(), "tsirc".into()])
    }

    #[test]
    fn test_single_listing_requests_then_ends() {
        let mut neg = negotiator();
        let out = neg.on_listing("multi-prefix tsirc unknown-cap", false);
        assert_eq!(
            out,
            vec![
                "CAP REQ :multi-prefix".to_string(),
                "CAP REQ :tsirc".to_string(),
                "CAP END".to_string(),
            ]
        );
        assert_eq!(neg.state(), NegotiationState::Done);
    }

    #[test]
    fn test_done_ignores_further_listings() {
        let mut neg = negotiator();
        let _ = neg.on_listing("multi-prefix tsirc unknown-cap", false);
        let out = neg.on_listing("multi-prefix tsirc unknown-cap", false);
        assert!(out.is_empty());
        assert_eq!(neg.state(), NegotiationState::Done);
    }

    #[test]
    fn test_multiline_listing() {
        let mut neg = negotiator();
        let out = neg.on_listing("multi-prefix", true);
        assert_eq!(out, vec!["CAP REQ :multi-prefix".to_string()]);
        assert_eq!(neg.state(), NegotiationState::AwaitingList);

        let out = neg.on_listing("tsirc sasl", false);
        assert_eq!(
            out,
            vec!["CAP REQ :tsirc".to_string(), "CAP END".to_string()]
        );
        assert_eq!(neg.state(), NegotiationState::Done);
    }

    #[test]
    fn test_case_insensitive_matching() {
        let mut neg = negotiator();
        let out = neg.on_listing("MULTI-PREFIX", false);
        assert_eq!(
            out,
            vec!["CAP REQ :MULTI-PREFIX".to_string(), "CAP END".to_string()]
        );
    }

    #[test]
    fn test_empty_listing_still_ends() {
        let mut neg = negotiator();
        let out = neg.on_listing("", false);
        assert_eq!(out, vec!["CAP END".to_string()]);
        assert_eq!(neg.state(), NegotiationState::Done);
    }
}
