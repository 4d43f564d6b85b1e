//! Lexer
//!
//!     Turns source text into a [`TokenStream`]. Lexing never fails: anything
//!     that is not a keyword, number or string becomes an `Unknown` token and the
//!     parser decides whether it makes sense.
//!
//! The Two Passes
//!
//!     1. The raw pass (see [raw](raw)) uses logos to split the text into single
//!        characters tagged with their line and column, quoted strings, and gaps
//!        (whitespace and comments).
//!
//!     2. The scanner walks the raw stream from the front. Gaps are skipped and
//!        strings are emitted as `StringLiteral`. Otherwise it tries the keyword
//!        table longest-first: a candidate of length `n` is accepted when it is
//!        a keyword and either is itself a separator (punctuation, or an
//!        arithmetic operator when the profile says so) or is followed by a
//!        separator, a gap or the end of input. That boundary rule keeps `int`
//!        from matching the front of `int2` or `integer`. When no keyword
//!        matches, a leading digit starts a number (`digits[.digits]`) and
//!        anything else runs up to the next separator as an identifier.

pub(crate) mod raw;

use crate::profile::LanguageProfile;
use crate::span::Span;
use crate::token::{KeywordTable, Token, TokenKind, TokenStream};
use log::debug;
use raw::Raw;
use std::sync::Arc;

/// Lex `text` with the default language profile.
pub fn lex(file: &str, text: &str) -> TokenStream {
    Lexer::default().tokenize(file, text)
}

#[derive(Debug, Clone)]
pub struct Lexer {
    table: Arc<KeywordTable>,
}

impl Lexer {
    pub fn new(profile: LanguageProfile) -> Self {
        Self::with_table(KeywordTable::for_profile(profile))
    }

    pub fn with_table(table: Arc<KeywordTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    pub fn tokenize(&self, file: &str, text: &str) -> TokenStream {
        let file: Arc<str> = Arc::from(file);
        let raw = raw::materialize(&file, text);
        let mut tokens = TokenStream::new();
        let mut pos = 0;

        while pos < raw.len() {
            match &raw[pos] {
                Raw::Gap => pos += 1,
                Raw::Str(value, span) => {
                    tokens.push_back(Token::new(TokenKind::StringLiteral, value.clone(), span.clone()));
                    pos += 1;
                }
                Raw::Char(c, _) => {
                    let (token, consumed) = match self.match_keyword(&raw[pos..]) {
                        Some(found) => found,
                        None if c.is_ascii_digit() => self.scan_number(&raw[pos..]),
                        None => self.scan_identifier(&raw[pos..]),
                    };
                    tokens.push_back(token);
                    pos += consumed;
                }
            }
        }

        debug!("lexed {} tokens from {}", tokens.len(), file);
        tokens
    }

    fn match_keyword(&self, raw: &[Raw]) -> Option<(Token, usize)> {
        let candidate: Vec<(char, &Span)> = raw
            .iter()
            .take(self.table.max_len())
            .map_while(|r| match r {
                Raw::Char(c, span) => Some((*c, span)),
                _ => None,
            })
            .collect();

        for len in self.table.lengths() {
            if len > candidate.len() {
                continue;
            }
            let text: String = candidate[..len].iter().map(|(c, _)| *c).collect();
            if !self.table.contains(len, &text) {
                continue;
            }
            let Some(kind) = self.table.kind_of(&text) else {
                continue;
            };
            if self.table.is_separator_kind(kind) || self.is_boundary(raw.get(len)) {
                let span = merge_spans(candidate[..len].iter().map(|(_, s)| *s));
                return Some((Token::new(kind, text, span), len));
            }
        }

        None
    }

    fn scan_number(&self, raw: &[Raw]) -> (Token, usize) {
        let mut text = String::new();
        let mut spans = Vec::new();
        let mut seen_dot = false;

        for r in raw {
            let Raw::Char(c, span) = r else { break };
            if c.is_ascii_digit() || (*c == '.' && !seen_dot) {
                seen_dot |= *c == '.';
                text.push(*c);
                spans.push(span);
            } else {
                break;
            }
        }

        let consumed = text.chars().count();
        (
            Token::new(TokenKind::Numeric, text, merge_spans(spans.into_iter())),
            consumed,
        )
    }

    fn scan_identifier(&self, raw: &[Raw]) -> (Token, usize) {
        let mut text = String::new();
        let mut spans = Vec::new();

        for (i, r) in raw.iter().enumerate() {
            let Raw::Char(c, span) = r else { break };
            if i > 0 && self.table.is_separator_char(*c) {
                break;
            }
            text.push(*c);
            spans.push(span);
        }

        let consumed = spans.len();
        let kind = self.table.kind_of(&text).unwrap_or(TokenKind::Unknown);
        (Token::new(kind, text, merge_spans(spans.into_iter())), consumed)
    }

    /// Whether `next` ends a keyword: end of input, a gap, a string or a
    /// separator character.
    fn is_boundary(&self, next: Option<&Raw>) -> bool {
        match next {
            None | Some(Raw::Gap) | Some(Raw::Str(..)) => true,
            Some(Raw::Char(c, _)) => self.table.is_separator_char(*c),
        }
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new(LanguageProfile::default())
    }
}

fn merge_spans<'a>(mut spans: impl Iterator<Item = &'a Span>) -> Span {
    let first = spans.next().cloned().unwrap_or_default();
    spans.fold(first, |acc, span| acc.merge(span))
}
