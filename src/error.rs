//! Error types for every compiler phase.
//!
//! The lexer is total and has no error type. Parsing, include expansion, sizing
//! and generation each fail with their own enum; [`CompileError`] wraps them for
//! callers that run the whole pipeline.

use crate::span::Span;
use crate::token::{Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("{span}: expected {expected} but found '{found}'")]
    UnexpectedToken {
        expected: String,
        found: String,
        kind: TokenKind,
        span: Span,
    },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: String },
    #[error("{span}: unknown primary token '{text}'")]
    UnknownPrimary { text: String, span: Span },
    #[error("{span}: unexpected token '{text}'")]
    UnexpectedStatement { text: String, span: Span },
    #[error("{span}: invalid array size '{text}'")]
    InvalidCount { text: String, span: Span },
}

impl ParseError {
    pub(crate) fn unexpected(expected: &[TokenKind], token: &Token) -> Self {
        ParseError::UnexpectedToken {
            expected: describe(expected),
            found: token.text.clone(),
            kind: token.kind,
            span: token.span.clone(),
        }
    }

    pub(crate) fn end(expected: &[TokenKind]) -> Self {
        ParseError::UnexpectedEnd {
            expected: describe(expected),
        }
    }

    pub(crate) fn unknown_primary(token: &Token) -> Self {
        ParseError::UnknownPrimary {
            text: token.text.clone(),
            span: token.span.clone(),
        }
    }

    pub(crate) fn unexpected_statement(token: &Token) -> Self {
        ParseError::UnexpectedStatement {
            text: token.text.clone(),
            span: token.span.clone(),
        }
    }

    /// Location of the offending token, if there was one.
    pub fn span(&self) -> Option<&Span> {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnknownPrimary { span, .. }
            | ParseError::UnexpectedStatement { span, .. }
            | ParseError::InvalidCount { span, .. } => Some(span),
            ParseError::UnexpectedEnd { .. } => None,
        }
    }
}

fn describe(kinds: &[TokenKind]) -> String {
    match kinds {
        [] => "a token".to_string(),
        [one] => one.to_string(),
        many => {
            let names: Vec<_> = many.iter().map(|k| k.to_string()).collect();
            format!("one of {}", names.join(", "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeError {
    #[error("struct reference '{0}' is not bound")]
    UnboundStruct(String),
    #[error("type '{0}' has no layout size")]
    NoLayoutSize(String),
    #[error("'{0}' is a runtime-sized array")]
    RuntimeArray(String),
    #[error("struct '{0}' contains itself")]
    Recursive(String),
    #[error("size of '{0}' does not fit in 64 bits")]
    Overflow(String),
    #[error("{0} nodes have no size")]
    NotSized(&'static str),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    #[error("the '!' operator is not supported")]
    UnsupportedNot,
    #[error("cannot generate {0} in this position")]
    Unexpected(&'static str),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no source registered for {0}")]
    Missing(String),
}

#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("while including {target}: {source}")]
    Load {
        target: String,
        #[source]
        source: LoadError,
    },
    #[error("while parsing {target}: {source}")]
    Parse {
        target: String,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Include(#[from] IncludeError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}
