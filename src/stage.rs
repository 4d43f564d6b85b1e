//! Stage extraction
//!
//! A stage module is the source module with its named scopes resolved: global
//! statements stay where they are, a named scope for the requested stage is
//! replaced by its statements, and named scopes for other stages are dropped.
//! The new module refers to the same statement nodes as the source module.

use crate::ast::{Ast, Node, NodeId, Stage};
use log::debug;

/// Allocate a module holding the statements of `module` that belong to `stage`.
pub fn extract_stage(ast: &mut Ast, module: NodeId, stage: Stage) -> NodeId {
    let statements = stage_statements(ast, module, stage);
    debug!("{} stage has {} statement(s)", stage, statements.len());
    ast.alloc(Node::Module { statements })
}

fn stage_statements(ast: &Ast, module: NodeId, stage: Stage) -> Vec<NodeId> {
    let source = ast.statements(module);
    let mut statements = Vec::with_capacity(source.len());

    for &id in source {
        match ast[id] {
            Node::NamedScope {
                stage: scope_stage,
                scope,
            } => {
                if scope_stage == stage {
                    statements.extend_from_slice(ast.statements(scope));
                }
            }
            _ => statements.push(id),
        }
    }

    statements
}
