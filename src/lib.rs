//! # ashl
//!
//! A compiler from the ashl shader language to GLSL.
//!
//! One ashl file holds every stage of an effect. Global declarations are shared,
//! and `@Vertex { ... }` / `@Fragment { ... }` blocks hold what belongs to one
//! stage only. Compiling a file produces one GLSL module per stage.
//!
//! ## Pipeline
//!
//!     text --lex--> TokenStream --parse--> Module
//!          --expand_includes--> --bind_references--> --extract_stage--> stage Module
//!          --generate_glsl--> GLSL
//!
//! Each phase is a plain function over an [`Ast`] arena, so the phases can also
//! be run one at a time. [`Compiler`] runs them all.
//!
//! ## Language profile
//!
//! [`LanguageProfile`] switches the optional parts of the language (extra types,
//! arithmetic operators as separators, arrow function bodies). Everything is on
//! by default.

pub mod ast;
pub mod error;
pub mod formats;
pub mod glsl;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod passes;
pub mod pipeline;
pub mod profile;
pub mod span;
pub mod stage;
pub mod token;

pub use ast::{Ast, AstSnapshot, Node, NodeId, Stage};
pub use error::{CompileError, GenerateError, IncludeError, LoadError, ParseError, SizeError};
pub use formats::{FormatError, FormatRegistry, Formatter};
pub use glsl::generate_glsl;
pub use lexer::{lex, Lexer};
pub use loader::{FsLoader, MemoryLoader, SourceLoader};
pub use parser::{parse, Parser};
pub use passes::{bind_references, expand_includes, expand_named_scope_includes};
pub use pipeline::{Compilation, CompiledShader, Compiler, StageOutput};
pub use profile::LanguageProfile;
pub use span::Span;
pub use stage::extract_stage;
pub use token::{Token, TokenKind, TokenStream};
