//! Abstract syntax tree
//!
//!     Nodes live in an [`Ast`] arena and refer to each other by [`NodeId`]. The
//!     tree is owned top-down from a `Module` node. The one exception is the
//!     struct binding on a struct-typed declaration, which is a plain id pointing
//!     at a `Struct` node elsewhere in the same arena and owns nothing.
//!
//!     Using an arena lets the passes work the way the pipeline needs:
//!         - include expansion splices statement ids into a module in place,
//!         - reference binding rewrites declaration nodes in place,
//!         - stage extraction builds a new module that shares statement ids with
//!           the source module instead of copying subtrees.
//!
//!     Node behaviour is written as exhaustive matches over [`Node`]: children in
//!     [node](node), structural hashing in [hash](hash), byte sizes in
//!     [size](size) and serializable snapshots in [snapshot](snapshot).

pub mod hash;
pub mod node;
pub mod size;
pub mod snapshot;

pub use node::{
    BinaryOperator, Declaration, DeclarationType, Direction, LayoutKind, Node, PrimitiveType,
    Stage, Tag, FLAT_HINT, HINT_PREFIX,
};
pub use snapshot::AstSnapshot;

use std::fmt;
use std::ops::{Index, IndexMut};

/// Handle to a node stored in an [`Ast`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Arena holding every node of one compilation.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `node` and return its handle.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of `id` in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self[id].children()
    }

    /// Statement list of a module or scope node, empty for anything else.
    pub fn statements(&self, id: NodeId) -> &[NodeId] {
        match &self[id] {
            Node::Module { statements } | Node::Scope { statements } => statements,
            _ => &[],
        }
    }

    /// Copy the subtree under `id` into fresh nodes and return the new root.
    /// Struct bindings in the copy still point at the original struct nodes.
    pub fn duplicate(&mut self, id: NodeId) -> NodeId {
        let mut node = self[id].clone();
        node.replace_children(|child| self.duplicate(child));
        self.alloc(node)
    }

    /// The declaration payload of `id`, if it is a declaration node.
    pub fn declaration(&self, id: NodeId) -> Option<&Declaration> {
        match &self[id] {
            Node::Declaration(decl) => Some(decl),
            _ => None,
        }
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }
}

impl IndexMut<NodeId> for Ast {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_returns_sequential_ids() {
        let mut ast = Ast::new();
        let a = ast.alloc(Node::NoOp);
        let b = ast.alloc(Node::Identifier("x".into()));
        assert_eq!(a.to_raw(), 0);
        assert_eq!(b.to_raw(), 1);
        assert_eq!(ast.len(), 2);
        assert_eq!(ast[b], Node::Identifier("x".into()));
        assert!(ast.get(NodeId::from_raw(9)).is_none());
    }

    #[test]
    fn test_children_in_source_order() {
        let mut ast = Ast::new();
        let cond = ast.alloc(Node::BoolLiteral(true));
        let then_scope = ast.alloc(Node::Scope { statements: vec![] });
        let otherwise = ast.alloc(Node::Scope { statements: vec![] });
        let node = ast.alloc(Node::If {
            condition: cond,
            then_scope,
            else_branch: Some(otherwise),
        });
        assert_eq!(ast.children(node), vec![cond, then_scope, otherwise]);
    }

    #[test]
    fn test_duplicate_allocates_a_fresh_subtree() {
        let mut ast = Ast::new();
        let def = ast.alloc(Node::Struct {
            name: "S".into(),
            members: vec![],
        });
        let decl = ast.alloc(Node::Declaration(Declaration {
            ty: DeclarationType::Struct {
                struct_name: "S".into(),
                binding: Some(def),
            },
            name: "s".into(),
            count: 1,
        }));
        let field = ast.alloc(Node::Identifier("x".into()));
        let access = ast.alloc(Node::Access {
            left: decl,
            right: field,
        });

        let copy = ast.duplicate(access);
        assert_ne!(copy, access);
        assert_eq!(ast.len(), 7);
        let Node::Access { left, right } = ast[copy].clone() else {
            panic!("expected access");
        };
        assert_ne!(left, decl);
        assert_ne!(right, field);
        assert_eq!(ast[left], ast[decl]);
        assert_eq!(ast[right], Node::Identifier("x".into()));
        assert_eq!(ast.structural_hash(copy), ast.structural_hash(access));
    }

    #[test]
    fn test_struct_declaration_lists_binding_only_when_bound() {
        let mut ast = Ast::new();
        let def = ast.alloc(Node::Struct {
            name: "S".into(),
            members: vec![],
        });
        let decl = ast.alloc(Node::Declaration(Declaration {
            ty: DeclarationType::Struct {
                struct_name: "S".into(),
                binding: None,
            },
            name: "s".into(),
            count: 1,
        }));
        assert!(ast.children(decl).is_empty());

        if let Node::Declaration(Declaration {
            ty: DeclarationType::Struct { binding, .. },
            ..
        }) = &mut ast[decl]
        {
            *binding = Some(def);
        }
        assert_eq!(ast.children(decl), vec![def]);
    }
}
