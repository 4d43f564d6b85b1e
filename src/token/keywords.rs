//! Keyword table
//!
//! Lookup structures derived from [`TokenKind::KEYWORDS`] for one
//! [`LanguageProfile`]: text to kind, kind to text, and the keyword texts
//! grouped by length (longest first) for longest-match scanning.
//!
//! Tables are immutable once built. The two standard profiles are built lazily
//! once per process and shared.

use super::TokenKind;
use crate::profile::LanguageProfile;
use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

static EXTENDED: Lazy<Arc<KeywordTable>> =
    Lazy::new(|| Arc::new(KeywordTable::build(LanguageProfile::extended())));

static CORE: Lazy<Arc<KeywordTable>> =
    Lazy::new(|| Arc::new(KeywordTable::build(LanguageProfile::core())));

#[derive(Debug)]
pub struct KeywordTable {
    profile: LanguageProfile,
    by_text: FxHashMap<&'static str, TokenKind>,
    by_length: Vec<(usize, FxHashSet<&'static str>)>,
    max_len: usize,
}

impl KeywordTable {
    /// Table for `profile`, shared when the profile is one of the standard ones.
    pub fn for_profile(profile: LanguageProfile) -> Arc<KeywordTable> {
        if profile == LanguageProfile::extended() {
            EXTENDED.clone()
        } else if profile == LanguageProfile::core() {
            CORE.clone()
        } else {
            Arc::new(Self::build(profile))
        }
    }

    fn build(profile: LanguageProfile) -> Self {
        let mut by_text = FxHashMap::default();
        let mut grouped: FxHashMap<usize, FxHashSet<&'static str>> = FxHashMap::default();

        for &kind in TokenKind::KEYWORDS {
            let enabled = match kind {
                TokenKind::TypeSampler | TokenKind::TypeTexture2D => profile.extended_types,
                TokenKind::Arrow => profile.arrow_functions,
                _ => true,
            };
            if !enabled {
                continue;
            }
            let text = kind.as_str();
            by_text.insert(text, kind);
            grouped.entry(text.len()).or_default().insert(text);
        }

        let mut by_length: Vec<_> = grouped.into_iter().collect();
        by_length.sort_by(|a, b| b.0.cmp(&a.0));
        let max_len = by_length.first().map(|(len, _)| *len).unwrap_or(0);

        Self {
            profile,
            by_text,
            by_length,
            max_len,
        }
    }

    pub fn profile(&self) -> LanguageProfile {
        self.profile
    }

    /// Keyword kind spelled exactly `text`, if any.
    pub fn kind_of(&self, text: &str) -> Option<TokenKind> {
        self.by_text.get(text).copied()
    }

    /// Spelling of `kind` if it is a keyword in this profile.
    pub fn text_of(&self, kind: TokenKind) -> Option<&'static str> {
        let text = kind.as_str();
        (self.kind_of(text) == Some(kind)).then_some(text)
    }

    /// Length of the longest keyword.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Keyword lengths present in the table, longest first.
    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.by_length.iter().map(|(len, _)| *len)
    }

    /// Whether `text` is a keyword of exactly `len` characters.
    pub fn contains(&self, len: usize, text: &str) -> bool {
        self.by_length
            .iter()
            .find(|(l, _)| *l == len)
            .map(|(_, set)| set.contains(text))
            .unwrap_or(false)
    }

    /// Whether a token of `kind` splits identifiers in this profile.
    pub fn is_separator_kind(&self, kind: TokenKind) -> bool {
        kind.is_punctuation()
            || (self.profile.arithmetic_separators && kind.is_arithmetic_separator())
    }

    /// Whether the raw character `c` splits identifiers in this profile.
    pub fn is_separator_char(&self, c: char) -> bool {
        if c.is_whitespace() {
            return true;
        }
        let mut buf = [0u8; 4];
        self.kind_of(c.encode_utf8(&mut buf))
            .map(|kind| self.is_separator_kind(kind))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lengths_are_longest_first() {
        let table = KeywordTable::for_profile(LanguageProfile::extended());
        let lengths: Vec<_> = table.lengths().collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
        assert_eq!(table.max_len(), lengths[0]);
        assert_eq!(table.max_len(), "@Fragment".len());
    }

    #[test]
    fn test_bidirectional_lookup() {
        let table = KeywordTable::for_profile(LanguageProfile::extended());
        for &kind in TokenKind::KEYWORDS {
            let text = table.text_of(kind).expect("every keyword is enabled");
            assert_eq!(table.kind_of(text), Some(kind));
        }
    }

    #[test]
    fn test_core_profile_drops_extras() {
        let table = KeywordTable::for_profile(LanguageProfile::core());
        assert_eq!(table.kind_of("sampler"), None);
        assert_eq!(table.kind_of("texture2D"), None);
        assert_eq!(table.kind_of("->"), None);
        assert_eq!(table.kind_of("sampler2D"), Some(TokenKind::TypeSampler2D));
    }

    #[test]
    fn test_separators_follow_profile() {
        let extended = KeywordTable::for_profile(LanguageProfile::extended());
        let core = KeywordTable::for_profile(LanguageProfile::core());
        for c in ['(', ')', '{', '}', '[', ']', ',', ';', '.', ' ', '\t', '\n'] {
            assert!(extended.is_separator_char(c));
            assert!(core.is_separator_char(c));
        }
        for c in ['+', '-', '*', '/', '='] {
            assert!(extended.is_separator_char(c));
            assert!(!core.is_separator_char(c));
        }
        assert!(!extended.is_separator_char('a'));
        assert!(!extended.is_separator_char('<'));
    }

    #[test]
    fn test_standard_tables_are_shared() {
        let a = KeywordTable::for_profile(LanguageProfile::default());
        let b = KeywordTable::for_profile(LanguageProfile::extended());
        assert!(Arc::ptr_eq(&a, &b));
    }
}
