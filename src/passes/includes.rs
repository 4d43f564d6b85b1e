//! Include expansion
//!
//! Statements are scanned front to back. An include is resolved to a canonical
//! identity; a new identity is read, lexed and parsed, and its top-level
//! statements replace the include and are scanned next, so nested includes are
//! expanded too. An identity seen before in the same expansion is dropped, which
//! makes repeated and cyclic includes harmless.
//!
//! Named scopes at module level are expanded with the module's identity set.
//! Statements spliced into a named scope are not searched for further named
//! scopes.

use crate::ast::{Ast, Node, NodeId};
use crate::error::IncludeError;
use crate::lexer::Lexer;
use crate::loader::SourceLoader;
use crate::parser::Parser;
use log::{debug, trace};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Expand every include in `module` and in its named scopes.
pub fn expand_includes(
    ast: &mut Ast,
    module: NodeId,
    loader: &dyn SourceLoader,
    lexer: &Lexer,
) -> Result<(), IncludeError> {
    let mut expander = IncludeExpander::new(loader, lexer);
    expander.expand_module(ast, module)?;
    debug!("expanded {} include(s)", expander.included_count());
    Ok(())
}

/// Expand the includes of one named scope on its own, with a fresh identity set.
pub fn expand_named_scope_includes(
    ast: &mut Ast,
    named_scope: NodeId,
    loader: &dyn SourceLoader,
    lexer: &Lexer,
) -> Result<(), IncludeError> {
    IncludeExpander::new(loader, lexer).expand_named_scope(ast, named_scope)
}

/// Include expansion state for one compilation.
pub struct IncludeExpander<'a> {
    loader: &'a dyn SourceLoader,
    lexer: &'a Lexer,
    included: FxHashSet<String>,
}

impl<'a> IncludeExpander<'a> {
    pub fn new(loader: &'a dyn SourceLoader, lexer: &'a Lexer) -> Self {
        Self {
            loader,
            lexer,
            included: FxHashSet::default(),
        }
    }

    /// Number of distinct files spliced in so far.
    pub fn included_count(&self) -> usize {
        self.included.len()
    }

    pub fn is_included(&self, identity: &str) -> bool {
        self.included.contains(identity)
    }

    pub fn expand_module(&mut self, ast: &mut Ast, module: NodeId) -> Result<(), IncludeError> {
        let pending = ast.statements(module).to_vec();
        let expanded = self.expand_statements(ast, pending, true)?;
        if let Node::Module { statements } = &mut ast[module] {
            *statements = expanded;
        }
        Ok(())
    }

    pub fn expand_named_scope(
        &mut self,
        ast: &mut Ast,
        named_scope: NodeId,
    ) -> Result<(), IncludeError> {
        let Node::NamedScope { scope, .. } = ast[named_scope] else {
            return Ok(());
        };

        let pending = ast.statements(scope).to_vec();
        let expanded = self.expand_statements(ast, pending, false)?;
        if let Node::Scope { statements } = &mut ast[scope] {
            *statements = expanded;
        }
        Ok(())
    }

    fn expand_statements(
        &mut self,
        ast: &mut Ast,
        pending: Vec<NodeId>,
        descend: bool,
    ) -> Result<Vec<NodeId>, IncludeError> {
        let mut pending: VecDeque<NodeId> = pending.into();
        let mut statements = Vec::with_capacity(pending.len());

        while let Some(id) = pending.pop_front() {
            match &ast[id] {
                Node::Include {
                    source_file,
                    target,
                } => {
                    let (source_file, target) = (source_file.clone(), target.clone());
                    let spliced = self.load(ast, &source_file, &target)?;
                    for statement in spliced.into_iter().rev() {
                        pending.push_front(statement);
                    }
                }
                Node::NamedScope { .. } if descend => {
                    self.expand_named_scope(ast, id)?;
                    statements.push(id);
                }
                _ => statements.push(id),
            }
        }

        Ok(statements)
    }

    /// Top-level statements of `target`, or nothing if it was already included.
    fn load(
        &mut self,
        ast: &mut Ast,
        source_file: &str,
        target: &str,
    ) -> Result<Vec<NodeId>, IncludeError> {
        let load_error = |source| IncludeError::Load {
            target: target.to_string(),
            source,
        };

        let identity = self
            .loader
            .resolve_include_path(source_file, target)
            .map_err(load_error)?;
        if !self.included.insert(identity.clone()) {
            trace!("skipping {}, already included", identity);
            return Ok(Vec::new());
        }

        let text = self.loader.read_file(&identity).map_err(load_error)?;
        let tokens = self.lexer.tokenize(&identity, &text);
        let module = Parser::new(ast, self.lexer.table().profile())
            .parse_module(tokens)
            .map_err(|source| IncludeError::Parse {
                target: identity.clone(),
                source,
            })?;

        trace!("included {} from {}", identity, source_file);
        Ok(ast.statements(module).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::loader::MemoryLoader;
    use crate::parser::parse;
    use crate::profile::LanguageProfile;

    fn module(ast: &mut Ast, file: &str, source: &str) -> NodeId {
        parse(ast, lex(file, source)).unwrap()
    }

    fn kinds(ast: &Ast, id: NodeId) -> Vec<&'static str> {
        ast.statements(id).iter().map(|s| ast[*s].kind_name()).collect()
    }

    #[test]
    fn test_include_is_spliced_in_place() {
        let loader = MemoryLoader::new().with_file("lib.ash", "struct S { float a; };\n#define N 2;");
        let lexer = Lexer::new(LanguageProfile::default());
        let mut ast = Ast::new();
        let root = module(&mut ast, "main.ash", "#include \"lib.ash\"\nvoid main() { }");

        expand_includes(&mut ast, root, &loader, &lexer).unwrap();
        assert_eq!(kinds(&ast, root), vec!["Struct", "Define", "Function"]);
    }

    #[test]
    fn test_repeated_and_cyclic_includes_appear_once() {
        let loader = MemoryLoader::new()
            .with_file("a.ash", "#include \"b.ash\"\nstruct A { float x; };")
            .with_file("b.ash", "#include \"a.ash\"\nstruct B { float y; };");
        let lexer = Lexer::new(LanguageProfile::default());
        let mut ast = Ast::new();
        let root = module(
            &mut ast,
            "main.ash",
            "#include \"a.ash\"\n#include \"b.ash\"\n#include \"a.ash\"",
        );

        expand_includes(&mut ast, root, &loader, &lexer).unwrap();
        assert_eq!(kinds(&ast, root), vec!["Struct", "Struct"]);
    }

    #[test]
    fn test_named_scopes_share_identity_set() {
        let loader = MemoryLoader::new().with_file("common.ash", "struct C { float x; };");
        let lexer = Lexer::new(LanguageProfile::default());
        let mut ast = Ast::new();
        let root = module(
            &mut ast,
            "main.ash",
            "#include \"common.ash\"\n@Vertex { #include \"common.ash\" }",
        );

        expand_includes(&mut ast, root, &loader, &lexer).unwrap();
        let statements = ast.statements(root).to_vec();
        assert_eq!(kinds(&ast, root), vec!["Struct", "NamedScope"]);
        let Node::NamedScope { scope, .. } = ast[statements[1]] else {
            panic!("expected named scope");
        };
        assert!(ast.statements(scope).is_empty());
    }

    #[test]
    fn test_isolated_named_scope_uses_fresh_set() {
        let loader = MemoryLoader::new().with_file("common.ash", "struct C { float x; };");
        let lexer = Lexer::new(LanguageProfile::default());
        let mut ast = Ast::new();
        let root = module(&mut ast, "main.ash", "@Fragment { #include \"common.ash\" }");
        let named = ast.statements(root)[0];

        expand_named_scope_includes(&mut ast, named, &loader, &lexer).unwrap();
        let Node::NamedScope { scope, .. } = ast[named] else {
            panic!("expected named scope");
        };
        assert_eq!(kinds(&ast, scope), vec!["Struct"]);
    }

    #[test]
    fn test_missing_include_reports_target() {
        let loader = MemoryLoader::new();
        let lexer = Lexer::new(LanguageProfile::default());
        let mut ast = Ast::new();
        let root = module(&mut ast, "main.ash", "#include \"gone.ash\"");

        let err = expand_includes(&mut ast, root, &loader, &lexer).unwrap_err();
        assert!(matches!(err, IncludeError::Load { ref target, .. } if target == "gone.ash"));
    }
}
