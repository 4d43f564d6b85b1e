//! Language profile
//!
//! The language exists in two flavours that differ only in a handful of
//! switches. Rather than two lexers and two parsers, one profile value carries
//! the switches and every stage reads what it needs from it.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LanguageProfile {
    /// Adds the `sampler` and `texture2D` type keywords.
    pub extended_types: bool,
    /// Makes `+ - * / =` split identifiers and keywords like punctuation does.
    pub arithmetic_separators: bool,
    /// Enables `->` and single-expression function bodies.
    pub arrow_functions: bool,
}

impl LanguageProfile {
    /// Every switch on. This is the default.
    pub const fn extended() -> Self {
        Self {
            extended_types: true,
            arithmetic_separators: true,
            arrow_functions: true,
        }
    }

    /// The smaller dialect: no extra types, no arrow bodies, arithmetic operators
    /// are ordinary characters.
    pub const fn core() -> Self {
        Self {
            extended_types: false,
            arithmetic_separators: false,
            arrow_functions: false,
        }
    }
}

impl Default for LanguageProfile {
    fn default() -> Self {
        Self::extended()
    }
}
