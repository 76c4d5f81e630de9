//! IRC case-mapping rules.
//!
//! IRC compares nicknames and channel names case-insensitively, but the exact
//! folding rule is server-defined and announced via ISUPPORT `CASEMAPPING`.
//! RFC 1459 additionally treats `[]\~` as the uppercase forms of `{}|^`; the
//! "strict" variant excludes the `~`/`^` pair, and `ascii` folds letters only.
//!
//! The active rule can change mid-session. Every collection keyed by folded
//! names must be re-derived after a change; see
//! [`StateStore::set_casemapping`](crate::state::StateStore::set_casemapping).

use std::fmt;

/// A server-negotiable case-folding rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseMapping {
    /// `A-Z` fold to `a-z` only.
    Ascii,
    /// RFC 1459: `[]\~` additionally fold to `{}|^`. The most common rule
    /// and the default when the server announces nothing.
    #[default]
    Rfc1459,
    /// Like [`CaseMapping::Rfc1459`] but without the `~` → `^` pair.
    StrictRfc1459,
}

impl CaseMapping {
    /// Resolve an ISUPPORT `CASEMAPPING=` value. Unknown values yield `None`
    /// and the caller keeps the current rule.
    pub fn from_isupport(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "ascii" => Some(Self::Ascii),
            "rfc1459" => Some(Self::Rfc1459),
            "strict-rfc1459" => Some(Self::StrictRfc1459),
            _ => None,
        }
    }

    /// Convert a single character to its folded form under this rule.
    #[inline]
    pub const fn lower_char(self, c: char) -> char {
        match (self, c) {
            (Self::Rfc1459 | Self::StrictRfc1459, '[') => '{',
            (Self::Rfc1459 | Self::StrictRfc1459, ']') => '}',
            (Self::Rfc1459 | Self::StrictRfc1459, '\\') => '|',
            (Self::Rfc1459, '~') => '^',
            (_, 'A'..='Z') => (c as u8 + 32) as char,
            _ => c,
        }
    }

    /// Convert a string to its canonical folded form under this rule.
    pub fn to_lower(self, s: &str) -> String {
        s.chars().map(|c| self.lower_char(c)).collect()
    }

    /// Compare two strings case-insensitively under this rule.
    pub fn eq(self, a: &str, b: &str) -> bool {
        if a.len() != b.len() {
            return false;
        }
        a.chars()
            .zip(b.chars())
            .all(|(ca, cb)| self.lower_char(ca) == self.lower_char(cb))
    }
}

impl fmt::Display for CaseMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ascii => "ascii",
            Self::Rfc1459 => "rfc1459",
            Self::StrictRfc1459 => "strict-rfc1459",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rfc1459_lower_char() {
        let m = CaseMapping::Rfc1459;
        assert_eq!(m.lower_char('A'), 'a');
        assert_eq!(m.lower_char('Z'), 'z');
        assert_eq!(m.lower_char('['), '{');
        assert_eq!(m.lower_char(']'), '}');
        assert_eq!(m.lower_char('\\'), '|');
        assert_eq!(m.lower_char('~'), '^');
        assert_eq!(m.lower_char('0'), '0');
        assert_eq!(m.lower_char('#'), '#');
    }

    #[test]
    fn test_strict_keeps_tilde() {
        let m = CaseMapping::StrictRfc1459;
        assert_eq!(m.lower_char('['), '{');
        assert_eq!(m.lower_char('\\'), '|');
        assert_eq!(m.lower_char('~'), '~');
    }

    #[test]
    fn test_ascii_folds_letters_only() {
        let m = CaseMapping::Ascii;
        assert_eq!(m.to_lower("Nick[1]"), "nick[1]");
        assert!(!m.eq("nick[1]", "nick{1}"));
        assert!(m.eq("Nick", "nICK"));
    }

    #[test]
    fn test_to_lower() {
        assert_eq!(CaseMapping::Rfc1459.to_lower("#Channel[1]"), "#channel{1}");
        assert_eq!(CaseMapping::Rfc1459.to_lower("Nick\\Away~"), "nick|away^");
    }

    #[test]
    fn test_eq() {
        assert!(CaseMapping::Rfc1459.eq("#channel[1]", "#CHANNEL{1}"));
        assert!(CaseMapping::Rfc1459.eq("nick\\test", "NICK|TEST"));
        assert!(!CaseMapping::Rfc1459.eq("hello", "world"));
        assert!(!CaseMapping::Rfc1459.eq("short", "longer"));
    }

    #[test]
    fn test_from_isupport() {
        assert_eq!(CaseMapping::from_isupport("ascii"), Some(CaseMapping::Ascii));
        assert_eq!(
            CaseMapping::from_isupport("RFC1459"),
            Some(CaseMapping::Rfc1459)
        );
        assert_eq!(
            CaseMapping::from_isupport("strict-rfc1459"),
            Some(CaseMapping::StrictRfc1459)
        );
        assert_eq!(CaseMapping::from_isupport("rfc7613"), None);
    }

    proptest! {
        // fold(a) == fold(b) is an equivalence, and eq agrees with it.
        #[test]
        fn prop_eq_matches_fold(a in "\\PC{0,24}", b in "\\PC{0,24}") {
            for m in [CaseMapping::Ascii, CaseMapping::Rfc1459, CaseMapping::StrictRfc1459] {
                prop_assert_eq!(m.eq(&a, &b), m.to_lower(&a) == m.to_lower(&b));
                prop_assert_eq!(m.eq(&a, &b), m.eq(&b, &a));
            }
        }

        #[test]
        fn prop_fold_idempotent(a in "\\PC{0,24}") {
            for m in [CaseMapping::Ascii, CaseMapping::Rfc1459, CaseMapping::StrictRfc1459] {
                let once = m.to_lower(&a);
                prop_assert_eq!(m.to_lower(&once), once.clone());
                prop_assert!(m.eq(&a, &once));
            }
        }
    }
}
