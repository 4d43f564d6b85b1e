//! Raw character pass
//!
//! logos splits the source into whitespace runs, comments, quoted strings and
//! single characters. Comments and strings are finished by callbacks so that an
//! unterminated one simply runs to end of input. Byte offsets are converted to
//! 1-based line/column positions here; nothing after this pass sees offsets.

use crate::span::Span;
use logos::Logos;
use std::sync::Arc;

#[derive(Logos, Debug, Clone, PartialEq)]
pub(crate) enum RawToken {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[token("//", line_comment)]
    #[token("/*", block_comment)]
    Comment,

    #[token("\"", |lex| quoted(lex, '"'))]
    #[token("'", |lex| quoted(lex, '\''))]
    Quoted(String),

    #[regex(r#"[^ \t\r\n\f"']"#)]
    Char,
}

fn line_comment(lex: &mut logos::Lexer<RawToken>) -> bool {
    let rest = lex.remainder();
    let end = rest.find('\n').unwrap_or(rest.len());
    lex.bump(end);
    true
}

fn block_comment(lex: &mut logos::Lexer<RawToken>) -> bool {
    let rest = lex.remainder();
    let end = rest.find("*/").map(|i| i + 2).unwrap_or(rest.len());
    lex.bump(end);
    true
}

fn quoted(lex: &mut logos::Lexer<RawToken>, quote: char) -> String {
    let rest = lex.remainder();
    match rest.find(quote) {
        Some(i) => {
            let value = rest[..i].to_string();
            lex.bump(i + quote.len_utf8());
            value
        }
        None => {
            let value = rest.to_string();
            lex.bump(rest.len());
            value
        }
    }
}

/// One element of the raw stream.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Raw {
    Char(char, Span),
    Str(String, Span),
    /// Whitespace or a comment.
    Gap,
}

/// Tracks the line/column of a byte offset while offsets only move forward.
struct Cursor<'a> {
    source: &'a str,
    offset: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            col: 1,
        }
    }

    fn advance_to(&mut self, offset: usize) -> (u32, u32) {
        if offset > self.offset {
            for c in self.source[self.offset..offset].chars() {
                if c == '\n' {
                    self.line += 1;
                    self.col = 1;
                } else {
                    self.col += 1;
                }
            }
            self.offset = offset;
        }
        (self.line, self.col)
    }
}

/// Materialize `source` as the raw stream.
pub(crate) fn materialize(file: &Arc<str>, source: &str) -> Vec<Raw> {
    let mut lexer = RawToken::lexer(source);
    let mut cursor = Cursor::new(source);
    let mut raw = Vec::new();

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let (line, col) = cursor.advance_to(range.start);

        match result {
            Ok(RawToken::Whitespace) | Ok(RawToken::Comment) => raw.push(Raw::Gap),
            Ok(RawToken::Quoted(value)) => {
                let (start_line, start_col) = cursor.advance_to(range.start + 1);
                let (end_line, end_col) = cursor.advance_to(range.start + 1 + value.len());
                let span = Span::new(file.clone(), start_line, start_col, end_line, end_col);
                raw.push(Raw::Str(value, span));
            }
            Ok(RawToken::Char) | Err(_) => {
                for (i, c) in lexer.slice().chars().enumerate() {
                    raw.push(Raw::Char(c, Span::point(file.clone(), line, col + i as u32)));
                }
            }
        }
    }

    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(raw: &[Raw]) -> String {
        raw.iter()
            .filter_map(|r| match r {
                Raw::Char(c, _) => Some(*c),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_positions_are_one_based() {
        let raw = materialize(&Arc::from("f"), "ab\n c");
        let spans: Vec<_> = raw
            .iter()
            .filter_map(|r| match r {
                Raw::Char(c, span) => Some((*c, span.start_line, span.start_col)),
                _ => None,
            })
            .collect();
        assert_eq!(spans, vec![('a', 1, 1), ('b', 1, 2), ('c', 2, 2)]);
    }

    #[test]
    fn test_comments_become_gaps() {
        let raw = materialize(&Arc::from("f"), "a// note\nb/* x\ny */c");
        assert_eq!(chars(&raw), "abc");
    }

    #[test]
    fn test_unterminated_block_comment_runs_to_end() {
        let raw = materialize(&Arc::from("f"), "a /* never closed");
        assert_eq!(chars(&raw), "a");
    }

    #[test]
    fn test_quoted_strings() {
        let raw = materialize(&Arc::from("f"), r#"x "a/b.ash" 'c'"#);
        let strings: Vec<_> = raw
            .iter()
            .filter_map(|r| match r {
                Raw::Str(s, span) => Some((s.clone(), span.start_col, span.end_col)),
                _ => None,
            })
            .collect();
        assert_eq!(
            strings,
            vec![("a/b.ash".to_string(), 4, 11), ("c".to_string(), 14, 15)]
        );
    }
}
