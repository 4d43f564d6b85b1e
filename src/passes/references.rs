//! Struct reference binding
//!
//! A single breadth-first walk over everything reachable from the root,
//! children queued left to right. Struct definitions are registered by name as
//! they are dequeued, first definition winning. A struct-typed declaration is
//! bound to whatever is registered under its struct name at the moment it is
//! dequeued.
//!
//! Registration and lookup share the one walk, so binding depends on visit
//! order. A declaration nested no deeper than a later struct definition still
//! binds (`uniform Light light;` before `struct Light`, both at module level,
//! since the struct is dequeued before the layout's declaration). A declaration
//! dequeued before its struct, for instance one at module level whose struct is
//! defined inside a named scope, stays unbound and sizing it fails with
//! [`SizeError::UnboundStruct`](crate::error::SizeError::UnboundStruct).

use crate::ast::{Ast, Declaration, DeclarationType, Node, NodeId};
use log::{debug, trace};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Bind struct-typed declarations under `root`. Returns how many were bound.
pub fn bind_references(ast: &mut Ast, root: NodeId) -> usize {
    let mut registry: FxHashMap<String, NodeId> = FxHashMap::default();
    let mut visited: FxHashSet<NodeId> = FxHashSet::default();
    let mut queue = VecDeque::from([root]);
    let mut bound = 0;

    while let Some(id) = queue.pop_front() {
        // a bound self-referencing struct lists itself as a descendant
        if !visited.insert(id) {
            continue;
        }

        match &mut ast[id] {
            Node::Struct { name, .. } => {
                registry.entry(name.clone()).or_insert(id);
            }
            Node::Declaration(Declaration {
                ty:
                    DeclarationType::Struct {
                        struct_name,
                        binding,
                    },
                name,
                ..
            }) => {
                if let Some(&definition) = registry.get(struct_name.as_str()) {
                    *binding = Some(definition);
                    bound += 1;
                    trace!("bound '{}' to struct {}", name, struct_name);
                } else {
                    trace!("'{}' of type {} left unbound", name, struct_name);
                }
            }
            _ => {}
        }

        queue.extend(ast.children(id));
    }

    debug!("bound {} struct reference(s)", bound);
    bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn bound_structs(ast: &Ast, root: NodeId) -> Vec<(String, bool)> {
        let mut found = Vec::new();
        let mut stack = vec![root];
        let mut seen = FxHashSet::default();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(Declaration {
                ty: DeclarationType::Struct { binding, .. },
                name,
                ..
            }) = ast.declaration(id)
            {
                found.push((name.clone(), binding.is_some()));
            }
            stack.extend(ast.children(id).into_iter().rev());
        }
        found
    }

    fn bind(source: &str) -> (Ast, NodeId, usize) {
        let mut ast = Ast::new();
        let root = parse(&mut ast, lex("t.ash", source)).unwrap();
        let count = bind_references(&mut ast, root);
        (ast, root, count)
    }

    #[test]
    fn test_binds_after_definition() {
        let (ast, root, count) = bind(
            "struct Light { float4 color; };\nlayout(set = 0) uniform Light lights[4];",
        );
        assert_eq!(count, 1);
        assert_eq!(bound_structs(&ast, root), vec![("lights".to_string(), true)]);
        let layout = ast.statements(root)[1];
        assert_eq!(ast.size_of(layout), Ok(64));
    }

    #[test]
    fn test_same_level_forward_reference_binds() {
        let (ast, root, count) = bind(
            "layout(set = 0) uniform Light light;\nstruct Light { float4 color; };",
        );
        assert_eq!(count, 1);
        assert_eq!(bound_structs(&ast, root), vec![("light".to_string(), true)]);
        let layout = ast.statements(root)[0];
        assert_eq!(ast.size_of(layout), Ok(16));
    }

    #[test]
    fn test_struct_reached_later_stays_unbound() {
        let (ast, root, count) = bind(
            "layout(set = 0) uniform Light light;\n@Fragment { struct Light { float4 color; }; }",
        );
        assert_eq!(count, 0);
        assert_eq!(bound_structs(&ast, root), vec![("light".to_string(), false)]);
    }

    #[test]
    fn test_shallowest_definition_wins() {
        let (ast, root, count) = bind(
            "@Vertex { struct S { float4 a; }; }\nstruct S { float a; };\npush() { S s; };",
        );
        assert_eq!(count, 1);
        let push = ast.statements(root)[2];
        assert_eq!(ast.size_of(push), Ok(4));
    }

    #[test]
    fn test_binds_inside_functions_and_named_scopes() {
        let (ast, root, count) = bind(
            "struct Q { float2 size; };\n@Vertex { void main() { Q q = get(); } }",
        );
        assert_eq!(count, 1);
        assert_eq!(bound_structs(&ast, root), vec![("q".to_string(), true)]);
    }

    #[test]
    fn test_self_reference_terminates() {
        let (ast, root, count) = bind("struct Node { float v; Node next; };");
        assert_eq!(count, 1);
        let def = ast.statements(root)[0];
        assert!(ast.size_of(def).is_err());
    }
}
