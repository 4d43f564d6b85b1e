//! Token stream
//!
//!     The parser never indexes into its input. It looks at, removes and
//!     re-inserts tokens at either end of a [`TokenStream`], and isolates
//!     sub-expressions by slicing a bracket-balanced run off the front into a new,
//!     independent stream (see [`TokenStream::slice_scoped`]). Each slice is then
//!     parsed on its own, so there is no shared cursor to keep in sync.

use super::{Token, TokenKind};
use crate::error::ParseError;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: VecDeque<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn front(&self) -> Option<&Token> {
        self.tokens.front()
    }

    pub fn back(&self) -> Option<&Token> {
        self.tokens.back()
    }

    /// Token after the front one.
    pub fn second(&self) -> Option<&Token> {
        self.tokens.get(1)
    }

    pub fn front_is(&self, kind: TokenKind) -> bool {
        self.front().is_some_and(|t| t.kind == kind)
    }

    pub fn front_is_any(&self, kinds: &[TokenKind]) -> bool {
        self.front().is_some_and(|t| kinds.contains(&t.kind))
    }

    pub fn back_is(&self, kind: TokenKind) -> bool {
        self.back().is_some_and(|t| t.kind == kind)
    }

    pub fn pop_front(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    pub fn pop_back(&mut self) -> Option<Token> {
        self.tokens.pop_back()
    }

    pub fn push_front(&mut self, token: Token) {
        self.tokens.push_front(token);
    }

    pub fn push_back(&mut self, token: Token) {
        self.tokens.push_back(token);
    }

    /// The front token, provided it has kind `kind`.
    pub fn expect_front(&self, kind: TokenKind) -> Result<&Token, ParseError> {
        self.expect_front_any(&[kind])
    }

    /// The front token, provided its kind is one of `kinds`.
    pub fn expect_front_any(&self, kinds: &[TokenKind]) -> Result<&Token, ParseError> {
        match self.front() {
            Some(token) if kinds.contains(&token.kind) => Ok(token),
            Some(token) => Err(ParseError::unexpected(kinds, token)),
            None => Err(ParseError::end(kinds)),
        }
    }

    /// The back token, provided it has kind `kind`.
    pub fn expect_back(&self, kind: TokenKind) -> Result<&Token, ParseError> {
        self.expect_back_any(&[kind])
    }

    /// The back token, provided its kind is one of `kinds`.
    pub fn expect_back_any(&self, kinds: &[TokenKind]) -> Result<&Token, ParseError> {
        match self.back() {
            Some(token) if kinds.contains(&token.kind) => Ok(token),
            Some(token) => Err(ParseError::unexpected(kinds, token)),
            None => Err(ParseError::end(kinds)),
        }
    }

    /// Remove and return the front token if it has kind `kind`, otherwise fail
    /// without consuming anything.
    pub fn take_front(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        self.take_front_any(&[kind])
    }

    pub fn take_front_any(&mut self, kinds: &[TokenKind]) -> Result<Token, ParseError> {
        self.expect_front_any(kinds)?;
        self.pop_front().ok_or_else(|| ParseError::end(kinds))
    }

    pub fn take_back(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        self.expect_back(kind)?;
        self.pop_back().ok_or_else(|| ParseError::end(&[kind]))
    }

    /// Remove and return the front token whatever it is.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.pop_front().ok_or_else(|| ParseError::end(&[]))
    }

    /// Slice a bracket-balanced run off the front of the stream.
    ///
    /// Tokens are moved into the result until a token whose kind is in `targets`
    /// is met at nesting depth zero. Depth starts at `initial_depth`; every
    /// opening bracket raises it and every closing bracket lowers it *before*
    /// the target check, so a closing bracket can end its own group. The target
    /// stays at the front of `self` unless `include_target` moves it into the
    /// result. Without a target the whole stream is consumed.
    pub fn slice_scoped(
        &mut self,
        targets: &[TokenKind],
        initial_depth: i32,
        include_target: bool,
    ) -> TokenStream {
        let mut result = TokenStream::new();
        let mut depth = initial_depth;

        while let Some(front) = self.front() {
            if front.kind.opens_scope() {
                depth += 1;
            } else if front.kind.closes_scope() {
                depth -= 1;
            }

            if depth == 0 && targets.contains(&front.kind) {
                if include_target {
                    if let Some(token) = self.pop_front() {
                        result.push_back(token);
                    }
                }
                break;
            }

            if let Some(token) = self.pop_front() {
                result.push_back(token);
            }
        }

        result
    }

    /// Shorthand for [`slice_scoped`](Self::slice_scoped) at depth zero, leaving
    /// the target in place.
    pub fn slice_until(&mut self, target: TokenKind) -> TokenStream {
        self.slice_scoped(&[target], 0, false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }

    pub fn into_vec(self) -> Vec<Token> {
        self.tokens.into()
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into(),
        }
    }
}

impl FromIterator<Token> for TokenStream {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TokenStream {
    type Item = Token;
    type IntoIter = std::collections::vec_deque::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;
    use TokenKind::*;

    fn stream(kinds: &[TokenKind]) -> TokenStream {
        kinds
            .iter()
            .map(|&k| Token::new(k, k.as_str(), Span::default()))
            .collect()
    }

    #[test]
    fn test_expect_reports_found_token() {
        let s = stream(&[Comma]);
        let err = s.expect_front(StatementEnd).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { kind: Comma, .. }
        ));
        assert!(matches!(
            TokenStream::new().expect_back(Comma),
            Err(ParseError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_take_front_only_consumes_on_match() {
        let mut s = stream(&[OpenParen, CloseParen]);
        assert!(s.take_front(CloseParen).is_err());
        assert_eq!(s.len(), 2);
        assert_eq!(s.take_front(OpenParen).unwrap().kind, OpenParen);
        assert_eq!(s.take_back(CloseParen).unwrap().kind, CloseParen);
        assert!(s.is_empty());
    }

    #[test]
    fn test_slice_skips_nested_targets() {
        // a , f ( b , c ) , d
        let mut s = stream(&[Unknown, Comma, Unknown, OpenParen, Unknown, Comma, Unknown, CloseParen, Comma, Unknown]);
        let first = s.slice_until(Comma);
        assert_eq!(first.kinds(), vec![Unknown]);
        s.take_front(Comma).unwrap();
        let second = s.slice_until(Comma);
        assert_eq!(second.len(), 6);
        assert!(s.front_is(Comma));
    }

    #[test]
    fn test_slice_with_leading_open_bracket_stops_at_its_close() {
        // ( a ( b ) ) ;
        let mut s = stream(&[OpenParen, Unknown, OpenParen, Unknown, CloseParen, CloseParen, StatementEnd]);
        let group = s.slice_until(CloseParen);
        assert_eq!(group.len(), 5);
        assert_eq!(s.kinds(), vec![CloseParen, StatementEnd]);
    }

    #[test]
    fn test_slice_from_inside_group() {
        // a ) ;  with the opening paren already consumed
        let mut s = stream(&[Unknown, CloseParen, StatementEnd]);
        let inner = s.slice_scoped(&[CloseParen], 1, false);
        assert_eq!(inner.kinds(), vec![Unknown]);
        assert!(s.front_is(CloseParen));
    }

    #[test]
    fn test_slice_include_target() {
        let mut s = stream(&[Unknown, StatementEnd, Unknown]);
        let statement = s.slice_scoped(&[StatementEnd], 0, true);
        assert_eq!(statement.kinds(), vec![Unknown, StatementEnd]);
        assert_eq!(s.kinds(), vec![Unknown]);
    }

    #[test]
    fn test_slice_without_target_drains() {
        let mut s = stream(&[Unknown, Unknown]);
        let all = s.slice_until(StatementEnd);
        assert_eq!(all.len(), 2);
        assert!(s.is_empty());
    }
}
