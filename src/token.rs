//! Tokens
//!
//!     A [`Token`] is a classified slice of source text: its [`TokenKind`], the
//!     text it was built from (quotes removed for string literals) and the
//!     [`Span`] it covers.
//!
//!     Keyword kinds know their own spelling through [`TokenKind::as_str`], which
//!     makes the kind <-> text mapping a single table. [`KeywordTable`] derives
//!     the per-profile lookup structures from it, and [`TokenStream`] is the
//!     double-ended queue the parser consumes.

pub mod keywords;
pub mod stream;

pub use keywords::KeywordTable;
pub use stream::TokenStream;

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Assign,
    Access,
    OpAnd,
    OpOr,
    OpNot,
    OpIncrement,
    OpDecrement,
    OpAddAssign,
    OpSubtractAssign,
    OpDivideAssign,
    OpMultiplyAssign,
    OpAdd,
    OpSubtract,
    OpDivide,
    OpMultiply,
    OpMod,
    OpEqual,
    OpNotEqual,
    OpLess,
    OpGreater,
    OpLessEqual,
    OpGreaterEqual,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Comma,
    StatementEnd,
    Return,
    For,
    Continue,
    Break,
    Struct,
    TypeFloat,
    TypeFloat2,
    TypeFloat3,
    TypeFloat4,
    TypeInt,
    TypeInt2,
    TypeInt3,
    TypeInt4,
    TypeMat3,
    TypeMat4,
    TypeBoolean,
    TypeVoid,
    TypeSampler2D,
    TypeSampler,
    TypeTexture2D,
    TypeBuffer,
    DataIn,
    DataOut,
    Layout,
    Uniform,
    ReadOnly,
    Discard,
    Include,
    Define,
    Const,
    PushConstant,
    If,
    Else,
    Conditional,
    Colon,
    Arrow,
    VertexScope,
    FragmentScope,
    /// Identifier or any other run of characters that is not a keyword.
    Unknown,
    Numeric,
    StringLiteral,
}

impl TokenKind {
    /// Every kind that has a fixed spelling.
    pub const KEYWORDS: &'static [TokenKind] = &[
        TokenKind::Assign,
        TokenKind::Access,
        TokenKind::OpAnd,
        TokenKind::OpOr,
        TokenKind::OpNot,
        TokenKind::OpIncrement,
        TokenKind::OpDecrement,
        TokenKind::OpAddAssign,
        TokenKind::OpSubtractAssign,
        TokenKind::OpDivideAssign,
        TokenKind::OpMultiplyAssign,
        TokenKind::OpAdd,
        TokenKind::OpSubtract,
        TokenKind::OpDivide,
        TokenKind::OpMultiply,
        TokenKind::OpMod,
        TokenKind::OpEqual,
        TokenKind::OpNotEqual,
        TokenKind::OpLess,
        TokenKind::OpGreater,
        TokenKind::OpLessEqual,
        TokenKind::OpGreaterEqual,
        TokenKind::OpenBrace,
        TokenKind::CloseBrace,
        TokenKind::OpenParen,
        TokenKind::CloseParen,
        TokenKind::OpenBracket,
        TokenKind::CloseBracket,
        TokenKind::Comma,
        TokenKind::StatementEnd,
        TokenKind::Return,
        TokenKind::For,
        TokenKind::Continue,
        TokenKind::Break,
        TokenKind::Struct,
        TokenKind::TypeFloat,
        TokenKind::TypeFloat2,
        TokenKind::TypeFloat3,
        TokenKind::TypeFloat4,
        TokenKind::TypeInt,
        TokenKind::TypeInt2,
        TokenKind::TypeInt3,
        TokenKind::TypeInt4,
        TokenKind::TypeMat3,
        TokenKind::TypeMat4,
        TokenKind::TypeBoolean,
        TokenKind::TypeVoid,
        TokenKind::TypeSampler2D,
        TokenKind::TypeSampler,
        TokenKind::TypeTexture2D,
        TokenKind::TypeBuffer,
        TokenKind::DataIn,
        TokenKind::DataOut,
        TokenKind::Layout,
        TokenKind::Uniform,
        TokenKind::ReadOnly,
        TokenKind::Discard,
        TokenKind::Include,
        TokenKind::Define,
        TokenKind::Const,
        TokenKind::PushConstant,
        TokenKind::If,
        TokenKind::Else,
        TokenKind::Conditional,
        TokenKind::Colon,
        TokenKind::Arrow,
        TokenKind::VertexScope,
        TokenKind::FragmentScope,
    ];

    /// Source spelling of a keyword kind, or a descriptive name for the
    /// open-ended kinds.
    pub fn as_str(self) -> &'static str {
        use TokenKind::*;
        match self {
            Assign => "=",
            Access => ".",
            OpAnd => "&&",
            OpOr => "||",
            OpNot => "!",
            OpIncrement => "++",
            OpDecrement => "--",
            OpAddAssign => "+=",
            OpSubtractAssign => "-=",
            OpDivideAssign => "/=",
            OpMultiplyAssign => "*=",
            OpAdd => "+",
            OpSubtract => "-",
            OpDivide => "/",
            OpMultiply => "*",
            OpMod => "%",
            OpEqual => "==",
            OpNotEqual => "!=",
            OpLess => "<",
            OpGreater => ">",
            OpLessEqual => "<=",
            OpGreaterEqual => ">=",
            OpenBrace => "{",
            CloseBrace => "}",
            OpenParen => "(",
            CloseParen => ")",
            OpenBracket => "[",
            CloseBracket => "]",
            Comma => ",",
            StatementEnd => ";",
            Return => "return",
            For => "for",
            Continue => "continue",
            Break => "break",
            Struct => "struct",
            TypeFloat => "float",
            TypeFloat2 => "float2",
            TypeFloat3 => "float3",
            TypeFloat4 => "float4",
            TypeInt => "int",
            TypeInt2 => "int2",
            TypeInt3 => "int3",
            TypeInt4 => "int4",
            TypeMat3 => "mat3",
            TypeMat4 => "mat4",
            TypeBoolean => "bool",
            TypeVoid => "void",
            TypeSampler2D => "sampler2D",
            TypeSampler => "sampler",
            TypeTexture2D => "texture2D",
            TypeBuffer => "buffer",
            DataIn => "in",
            DataOut => "out",
            Layout => "layout",
            Uniform => "uniform",
            ReadOnly => "readonly",
            Discard => "discard",
            Include => "#include",
            Define => "#define",
            Const => "const",
            PushConstant => "push",
            If => "if",
            Else => "else",
            Conditional => "?",
            Colon => ":",
            Arrow => "->",
            VertexScope => "@Vertex",
            FragmentScope => "@Fragment",
            Unknown => "identifier",
            Numeric => "number",
            StringLiteral => "string",
        }
    }

    /// Whether this kind has a fixed spelling.
    pub fn is_keyword(self) -> bool {
        !matches!(
            self,
            TokenKind::Unknown | TokenKind::Numeric | TokenKind::StringLiteral
        )
    }

    /// Kinds that name a built-in (non-struct) declaration type.
    pub fn is_type(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            TypeFloat
                | TypeFloat2
                | TypeFloat3
                | TypeFloat4
                | TypeInt
                | TypeInt2
                | TypeInt3
                | TypeInt4
                | TypeMat3
                | TypeMat4
                | TypeBoolean
                | TypeVoid
                | TypeSampler2D
                | TypeSampler
                | TypeTexture2D
                | TypeBuffer
        )
    }

    /// Punctuation that always splits identifiers.
    pub fn is_punctuation(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            OpenBrace
                | CloseBrace
                | OpenParen
                | CloseParen
                | OpenBracket
                | CloseBracket
                | Comma
                | StatementEnd
                | Access
        )
    }

    /// Operators that split identifiers when the profile asks for it.
    pub fn is_arithmetic_separator(self) -> bool {
        use TokenKind::*;
        matches!(self, OpAdd | OpSubtract | OpMultiply | OpDivide | Assign)
    }

    /// Brackets that open a nesting level for scoped slicing.
    pub fn opens_scope(self) -> bool {
        matches!(
            self,
            TokenKind::OpenBrace | TokenKind::OpenParen | TokenKind::OpenBracket
        )
    }

    /// Brackets that close a nesting level for scoped slicing.
    pub fn closes_scope(self) -> bool {
        matches!(
            self,
            TokenKind::CloseBrace | TokenKind::CloseParen | TokenKind::CloseBracket
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_keyword() {
            write!(f, "'{}'", self.as_str())
        } else {
            f.write_str(self.as_str())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_spellings_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for kind in TokenKind::KEYWORDS {
            assert!(kind.is_keyword());
            assert!(seen.insert(kind.as_str()), "duplicate spelling for {:?}", kind);
        }
    }

    #[test]
    fn test_scope_brackets() {
        assert!(TokenKind::OpenParen.opens_scope());
        assert!(TokenKind::CloseBracket.closes_scope());
        assert!(!TokenKind::Comma.opens_scope());
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenKind::StatementEnd.to_string(), "';'");
        assert_eq!(TokenKind::Unknown.to_string(), "identifier");
    }
}
