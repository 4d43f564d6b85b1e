//! Semantic passes
//!
//!     Both passes run on a parsed module, in place, before stage extraction:
//!
//!         1. [`expand_includes`] splices included files into the statement lists.
//!         2. [`bind_references`] attaches struct-typed declarations to their
//!            struct definitions.
//!
//!     Binding must come second: structs defined in included files only become
//!     visible once they are spliced in.

mod includes;
mod references;

pub use includes::{expand_includes, expand_named_scope_includes, IncludeExpander};
pub use references::bind_references;
